//! Reference transports for `devrig`.
//!
//! Implementations of [`Device`](crate::device::Device) and
//! [`RumbleDevice`](crate::device::RumbleDevice) the manager can drive out of
//! the box. The manager itself never depends on any of them.
//!
//! # Feature flags
//! - **`hid`** (default): `hidapi` devices addressed by VID/PID, including
//!   wired Xbox 360 style pads with rumble.
//! - Windows builds additionally get XInput pads.
//!
//! [`virtual_input`] is always available.

#[cfg(feature = "hid")]
#[cfg_attr(docsrs, doc(cfg(feature = "hid")))]
pub mod hid;

pub mod virtual_input;

#[cfg(target_os = "windows")]
#[cfg_attr(docsrs, doc(cfg(target_os = "windows")))]
pub mod windows;
