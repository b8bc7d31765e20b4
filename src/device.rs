//! Device capability traits.
//!
//! Every managed device implements [`Device`]; controllers with haptic motors
//! additionally implement [`RumbleDevice`]. The capability set is chosen when a
//! device is registered with the [`DeviceManager`](crate::manager::DeviceManager),
//! which never downcasts.
//!
//! # Shared fields
//! `delay` and `enabled` live in a [`DeviceCore`] embedded in each device. They
//! are written by the manager's broadcast setters; what they *mean* is up to
//! the transport (a device may skip its transport read while disabled, or use
//! `delay` for latency compensation).
//!
//! # Threading
//! Devices are driven from a single scheduler thread. Nothing here is
//! synchronized; a host that calls into the manager from several threads must
//! serialize those calls itself.

use crate::error::{IoError, Result};
use crate::event::InputKind;
use crate::metadata::DeviceMeta;
use std::time::Duration;

/// State every device carries regardless of transport.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceCore {
    delay: Duration,
    enabled: bool,
    open: bool,
}

impl Default for DeviceCore {
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            enabled: true,
            open: false,
        }
    }
}

impl DeviceCore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    #[inline]
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Record a successful `open()`. Only the owning device should call this.
    pub fn mark_open(&mut self) {
        self.open = true;
    }

    /// Record a `close()`. Only the owning device should call this.
    pub fn mark_closed(&mut self) {
        self.open = false;
    }

    /// Fails with [`IoError::not_open`] unless the device is open.
    ///
    /// Transports call this first thing in `update()` so a closed device never
    /// touches its transport.
    pub fn ensure_open(&self, origin: &str) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(IoError::not_open(origin))
        }
    }
}

/// An input device with an open / update / close lifecycle.
pub trait Device {
    /// Human-readable name, used as the origin tag of this device's failures.
    fn name(&self) -> &str;

    fn core(&self) -> &DeviceCore;
    fn core_mut(&mut self) -> &mut DeviceCore;

    /// Acquire the underlying resource. Sets the open flag on success.
    fn open(&mut self) -> Result<()>;

    /// Refresh the device's input snapshot.
    ///
    /// Must fail with [`IoError::not_open`] without touching the transport when
    /// the device is not open, and must leave the open flag unchanged.
    fn update(&mut self) -> Result<()>;

    /// Release the underlying resource.
    fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool {
        self.core().is_open()
    }

    fn delay(&self) -> Duration {
        self.core().delay()
    }

    fn set_delay(&mut self, delay: Duration) {
        self.core_mut().set_delay(delay);
    }

    fn is_enabled(&self) -> bool {
        self.core().is_enabled()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.core_mut().set_enabled(enabled);
    }

    /// Input deltas gathered by previous `update()` calls. Drains the buffer.
    fn drain_events(&mut self) -> Vec<InputKind> {
        Vec::new()
    }

    fn metadata(&self) -> DeviceMeta {
        DeviceMeta::default()
    }
}

/// Motor channel selector for [`RumbleDevice::rumble`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RumbleMotor {
    /// Low-frequency, heavy motor (left on Xbox-style pads).
    Strong,
    /// High-frequency, light motor (right on Xbox-style pads).
    Weak,
}

/// A device that can drive haptic motors.
pub trait RumbleDevice: Device {
    /// Set `motor` to `intensity` (`0x00` = off, `0xFF` = full).
    fn rumble(&mut self, motor: RumbleMotor, intensity: u8) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_defaults() {
        let core = DeviceCore::new();
        assert_eq!(core.delay(), Duration::ZERO);
        assert!(core.is_enabled());
        assert!(!core.is_open());
    }

    #[test]
    fn ensure_open_tracks_open_flag() {
        let mut core = DeviceCore::new();
        assert_eq!(core.ensure_open("x"), Err(IoError::not_open("x")));
        core.mark_open();
        assert!(core.ensure_open("x").is_ok());
        core.mark_closed();
        assert!(core.ensure_open("x").is_err());
    }
}
