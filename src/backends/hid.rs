//! `hidapi` transports.
//!
//! [`HidInputDevice`] is a generic USB HID input device addressed by VID/PID
//! (and optionally serial number). The OS handle is acquired in `open()` and
//! dropped in `close()`; `update()` drains pending input reports without
//! blocking and keeps the most recent one.
//!
//! [`HidRumblePad`] wraps a [`HidInputDevice`] for wired Xbox 360 style pads,
//! which accept the 8-byte rumble output report
//! `[0x00, 0x08, 0x00, strong, weak, 0x00, 0x00, 0x00]`.
//!
//! This module does **not** enumerate devices; the host decides what to open.

use crate::device::{Device, DeviceCore, RumbleDevice, RumbleMotor};
use crate::error::{IoError, Result};
use crate::metadata::DeviceMeta;
use hidapi::{HidApi, HidDevice};

/// Default input report buffer size.
const DEFAULT_REPORT_LEN: usize = 64;

/// Maximum number of reports drained per `update()` call.
///
/// Keeps one chatty device from starving the rest of the cycle.
const MAX_REPORTS_PER_UPDATE: usize = 32;

pub struct HidInputDevice {
    name: String,
    vendor_id: u16,
    product_id: u16,
    serial: Option<String>,
    core: DeviceCore,
    handle: Option<HidDevice>,
    buf: Vec<u8>,
    latest: Vec<u8>,
}

impl HidInputDevice {
    pub fn new(name: &str, vendor_id: u16, product_id: u16) -> Self {
        Self {
            name: name.to_string(),
            vendor_id,
            product_id,
            serial: None,
            core: DeviceCore::new(),
            handle: None,
            buf: vec![0u8; DEFAULT_REPORT_LEN],
            latest: Vec::new(),
        }
    }

    /// Pick a specific unit when several share the same VID/PID.
    pub fn with_serial(mut self, serial: &str) -> Self {
        self.serial = Some(serial.to_string());
        self
    }

    pub fn with_report_len(mut self, len: usize) -> Self {
        self.buf = vec![0u8; len.max(1)];
        self
    }

    /// Most recent input report read by `update()` (empty before the first one).
    pub fn latest_report(&self) -> &[u8] {
        &self.latest
    }

    fn io_err(&self, what: &str, err: impl std::fmt::Display) -> IoError {
        IoError::new(&self.name, format!("{what}: {err}"))
    }

    /// Send an output report. The device must be open.
    pub fn write_report(&mut self, report: &[u8]) -> Result<()> {
        self.core.ensure_open(&self.name)?;
        let Some(handle) = self.handle.as_ref() else {
            return Err(IoError::not_open(&self.name));
        };
        match handle.write(report) {
            Ok(n) if n == report.len() => Ok(()),
            Ok(n) => Err(IoError::new(
                &self.name,
                format!("short write: {n} of {} bytes", report.len()),
            )),
            Err(e) => Err(self.io_err("write failed", e)),
        }
    }
}

impl Device for HidInputDevice {
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
        let api =
            HidApi::new_without_enumerate().map_err(|e| self.io_err("hidapi init failed", e))?;
        let opened = match &self.serial {
            Some(serial) => api.open_serial(self.vendor_id, self.product_id, serial),
            None => api.open(self.vendor_id, self.product_id),
        };
        let device = opened.map_err(|e| {
            self.io_err(
                &format!(
                    "failed to open {:04x}:{:04x}",
                    self.vendor_id, self.product_id
                ),
                e,
            )
        })?;
        // Updates run inside the scheduler cycle, so reads must not block.
        device
            .set_blocking_mode(false)
            .map_err(|e| self.io_err("failed to set non-blocking mode", e))?;

        tracing::debug!(
            device = %self.name,
            vid = self.vendor_id,
            pid = self.product_id,
            "opened HID device"
        );
        self.handle = Some(device);
        self.core.mark_open();
        Ok(())
    }

    fn update(&mut self) -> Result<()> {
        self.core.ensure_open(&self.name)?;
        if !self.core.is_enabled() {
            return Ok(());
        }
        let Some(handle) = self.handle.as_ref() else {
            return Err(IoError::not_open(&self.name));
        };

        for _ in 0..MAX_REPORTS_PER_UPDATE {
            match handle.read(&mut self.buf) {
                Ok(0) => break,
                Ok(n) => {
                    self.latest.clear();
                    self.latest.extend_from_slice(&self.buf[..n]);
                }
                Err(e) => return Err(IoError::new(&self.name, format!("read failed: {e}"))),
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.handle.take().is_some() {
            tracing::debug!(device = %self.name, "closed HID device");
        }
        self.core.mark_closed();
        Ok(())
    }

    fn metadata(&self) -> DeviceMeta {
        DeviceMeta {
            bus: Some("usb".into()),
            vid: Some(self.vendor_id),
            pid: Some(self.product_id),
            product_string: Some(self.name.clone()),
            serial_number: self.serial.clone(),
            path: None,
        }
    }
}

/// Build the Xbox 360 wired rumble output report.
fn xbox360_rumble_report(strong: u8, weak: u8) -> [u8; 8] {
    [0x00, 0x08, 0x00, strong, weak, 0x00, 0x00, 0x00]
}

/// Result of a close that first tried to stop the motors: a failure to release
/// the handle wins, otherwise the stop failure is reported.
fn close_after_stop(stopped: Result<()>, closed: Result<()>) -> Result<()> {
    closed.and(stopped)
}

/// Wired Xbox 360 style pad over `hidapi`.
///
/// Each motor is commanded independently; the report always carries both, so
/// the last level of the other motor is resent.
pub struct HidRumblePad {
    inner: HidInputDevice,
    strong: u8,
    weak: u8,
}

impl HidRumblePad {
    pub fn new(inner: HidInputDevice) -> Self {
        Self {
            inner,
            strong: 0,
            weak: 0,
        }
    }

    pub fn input(&self) -> &HidInputDevice {
        &self.inner
    }

    /// Current `(strong, weak)` motor levels.
    pub fn motor_levels(&self) -> (u8, u8) {
        (self.strong, self.weak)
    }
}

impl Device for HidRumblePad {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn core(&self) -> &DeviceCore {
        self.inner.core()
    }

    fn core_mut(&mut self) -> &mut DeviceCore {
        self.inner.core_mut()
    }

    fn open(&mut self) -> Result<()> {
        self.inner.open()
    }

    fn update(&mut self) -> Result<()> {
        self.inner.update()
    }

    fn close(&mut self) -> Result<()> {
        let stopped = if self.inner.is_open() && (self.strong != 0 || self.weak != 0) {
            self.inner.write_report(&xbox360_rumble_report(0, 0))
        } else {
            Ok(())
        };
        self.strong = 0;
        self.weak = 0;
        // The handle is released even if the motors could not be stopped.
        close_after_stop(stopped, self.inner.close())
    }

    fn metadata(&self) -> DeviceMeta {
        self.inner.metadata()
    }
}

impl RumbleDevice for HidRumblePad {
    fn rumble(&mut self, motor: RumbleMotor, intensity: u8) -> Result<()> {
        let (strong, weak) = match motor {
            RumbleMotor::Strong => (intensity, self.weak),
            RumbleMotor::Weak => (self.strong, intensity),
        };
        self.inner.write_report(&xbox360_rumble_report(strong, weak))?;
        self.strong = strong;
        self.weak = weak;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rumble_report_layout() {
        assert_eq!(
            xbox360_rumble_report(0xFF, 0x10),
            [0x00, 0x08, 0x00, 0xFF, 0x10, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn closed_device_rejects_update_without_touching_hid() {
        let mut dev = HidInputDevice::new("wheel", 0x046d, 0xc24f);
        let err = dev.update().unwrap_err();
        assert_eq!(err, IoError::not_open("wheel"));
        assert!(!dev.is_open());
    }

    #[test]
    fn closed_pad_rejects_rumble() {
        let mut pad = HidRumblePad::new(HidInputDevice::new("pad", 0x045e, 0x028e));
        assert!(pad.rumble(RumbleMotor::Strong, 0xFF).is_err());
        assert_eq!(pad.motor_levels(), (0, 0));
    }

    #[test]
    fn close_is_idempotent() {
        let mut dev = HidInputDevice::new("wheel", 0x046d, 0xc24f);
        dev.close().unwrap();
        dev.close().unwrap();
        assert!(!dev.is_open());
    }

    #[test]
    fn failed_motor_stop_is_reported_after_release() {
        let stop_err = IoError::new("pad", "write failed");
        let close_err = IoError::new("pad", "release failed");

        assert_eq!(close_after_stop(Ok(()), Ok(())), Ok(()));
        assert_eq!(
            close_after_stop(Err(stop_err.clone()), Ok(())),
            Err(stop_err.clone())
        );
        assert_eq!(
            close_after_stop(Err(stop_err), Err(close_err.clone())),
            Err(close_err)
        );
    }

    #[test]
    fn pad_close_without_running_motors_is_ok() {
        let mut pad = HidRumblePad::new(HidInputDevice::new("pad", 0x045e, 0x028e));
        assert!(pad.close().is_ok());
        assert_eq!(pad.motor_levels(), (0, 0));
    }
}
