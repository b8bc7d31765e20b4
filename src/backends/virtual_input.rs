//! In-memory device.
//!
//! [`VirtualDevice`] has no transport. It counts lifecycle calls, records rumble
//! commands, and can be told to fail any operation, which makes it the device
//! of choice for demos and for exercising manager policy.

use crate::device::{Device, DeviceCore, RumbleDevice, RumbleMotor};
use crate::error::{IoError, Result};
use crate::event::InputKind;
use crate::metadata::DeviceMeta;

#[derive(Debug, Default)]
struct Faults {
    open: Option<String>,
    update: Option<String>,
    close: Option<String>,
    rumble: Option<String>,
}

#[derive(Debug, Default)]
pub struct VirtualDevice {
    name: String,
    core: DeviceCore,
    faults: Faults,
    pending: Vec<InputKind>,
    published: Vec<InputKind>,
    rumbles: Vec<(RumbleMotor, u8)>,
    open_calls: usize,
    update_calls: usize,
    close_calls: usize,
}

impl VirtualDevice {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Make every following `open()` fail with `message`.
    pub fn fail_open(&mut self, message: &str) {
        self.faults.open = Some(message.to_string());
    }

    /// Make every following `update()` on an open device fail with `message`.
    pub fn fail_update(&mut self, message: &str) {
        self.faults.update = Some(message.to_string());
    }

    pub fn fail_close(&mut self, message: &str) {
        self.faults.close = Some(message.to_string());
    }

    pub fn fail_rumble(&mut self, message: &str) {
        self.faults.rumble = Some(message.to_string());
    }

    /// Remove all injected failures.
    pub fn heal(&mut self) {
        self.faults = Faults::default();
    }

    /// Queue an input change; it becomes visible on the next enabled `update()`.
    pub fn feed(&mut self, event: InputKind) {
        self.pending.push(event);
    }

    /// Convenience method to set an axis value.
    pub fn set_axis(&mut self, axis: u16, value: f32) {
        self.feed(InputKind::AxisMoved { axis, value });
    }

    pub fn press_button(&mut self, button: u16) {
        self.feed(InputKind::ButtonPressed { button });
    }

    pub fn release_button(&mut self, button: u16) {
        self.feed(InputKind::ButtonReleased { button });
    }

    /// Every rumble command received, oldest first.
    pub fn rumbles(&self) -> &[(RumbleMotor, u8)] {
        &self.rumbles
    }

    /// Number of `open()` calls, successful or not.
    pub fn open_calls(&self) -> usize {
        self.open_calls
    }

    /// Number of `update()` calls, including ones rejected because the device was closed.
    pub fn update_calls(&self) -> usize {
        self.update_calls
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls
    }

    fn check(&self, fault: &Option<String>) -> Result<()> {
        match fault {
            Some(message) => Err(IoError::new(&self.name, message.as_str())),
            None => Ok(()),
        }
    }
}

impl Device for VirtualDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn core(&self) -> &DeviceCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DeviceCore {
        &mut self.core
    }

    fn open(&mut self) -> Result<()> {
        self.open_calls += 1;
        self.check(&self.faults.open)?;
        self.core.mark_open();
        Ok(())
    }

    fn update(&mut self) -> Result<()> {
        self.update_calls += 1;
        self.core.ensure_open(&self.name)?;
        self.check(&self.faults.update)?;
        if self.core.is_enabled() {
            self.published.append(&mut self.pending);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.close_calls += 1;
        self.check(&self.faults.close)?;
        self.core.mark_closed();
        Ok(())
    }

    fn drain_events(&mut self) -> Vec<InputKind> {
        std::mem::take(&mut self.published)
    }

    fn metadata(&self) -> DeviceMeta {
        DeviceMeta {
            bus: Some("virtual".into()),
            product_string: Some(self.name.clone()),
            path: Some(format!("virtual:{}", self.name)),
            ..DeviceMeta::default()
        }
    }
}

impl RumbleDevice for VirtualDevice {
    fn rumble(&mut self, motor: RumbleMotor, intensity: u8) -> Result<()> {
        self.check(&self.faults.rumble)?;
        self.rumbles.push((motor, intensity));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_before_open_fails_and_stays_closed() {
        let mut dev = VirtualDevice::new("v");
        let err = dev.update().unwrap_err();
        assert_eq!(err, IoError::not_open("v"));
        assert!(!dev.is_open());
    }

    #[test]
    fn update_after_close_fails() {
        let mut dev = VirtualDevice::new("v");
        dev.open().unwrap();
        dev.close().unwrap();
        assert!(dev.update().is_err());
        assert!(!dev.is_open());
    }

    #[test]
    fn failed_open_leaves_device_closed() {
        let mut dev = VirtualDevice::new("v");
        dev.fail_open("no such device");
        assert_eq!(dev.open().unwrap_err().message(), "no such device");
        assert!(!dev.is_open());

        dev.heal();
        dev.open().unwrap();
        assert!(dev.is_open());
    }

    #[test]
    fn disabled_device_holds_back_events() {
        let mut dev = VirtualDevice::new("v");
        dev.open().unwrap();
        dev.set_enabled(false);
        dev.press_button(3);
        dev.update().unwrap();
        assert!(dev.drain_events().is_empty());

        dev.set_enabled(true);
        dev.update().unwrap();
        assert_eq!(dev.drain_events(), vec![InputKind::ButtonPressed { button: 3 }]);
    }
}
