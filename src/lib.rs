//! devrig — lifecycle manager for simulation input devices.
//!
//! A [`DeviceManager`] holds shared handles to input devices and fans three
//! scheduler entry points out to all of them, in registration order:
//! [`open_all`](DeviceManager::open_all) once at startup,
//! [`update_all`](DeviceManager::update_all) every period and
//! [`close_all`](DeviceManager::close_all) once at shutdown. Each phase has its
//! own [`FailurePolicy`] flag deciding whether a device's [`IoError`] is logged
//! and skipped or returned to the caller.
//!
//! Rumble-capable devices are registered separately and driven together with
//! [`rumble_all`](DeviceManager::rumble_all).

pub mod backends;
pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod manager;
pub mod metadata;
pub mod observer;

pub use config::{FailurePolicy, JobSchedule, ManagerConfig};
pub use device::*;
pub use error::{ConfigError, IoError, Result};
pub use event::*;
pub use manager::*;
pub use metadata::DeviceMeta;
pub use observer::{FailureObserver, Phase, PhaseFilter, TracingObserver, LOG_TAG};
