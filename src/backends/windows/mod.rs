#![cfg(target_os = "windows")]

//! Windows transports.
//!
//! - **XInput** controllers (slots 0–3) as rumble-capable devices.
//!
//! Most users should not interact with these modules directly beyond
//! constructing a pad and registering it with the
//! [`DeviceManager`](crate::manager::DeviceManager).

pub mod xinput;

pub use xinput::XInputPad;
