//! The device manager.
//!
//! [`DeviceManager`] fans each lifecycle call out to its registered devices in
//! registration order:
//!
//! - [`open_all`](DeviceManager::open_all) once at startup,
//! - [`update_all`](DeviceManager::update_all) every scheduler period,
//! - [`close_all`](DeviceManager::close_all) once at shutdown,
//!
//! plus [`rumble_all`](DeviceManager::rumble_all) and the broadcast setters on
//! demand. Each batch call checks the [`FailurePolicy`] flag for its phase: when
//! set, a failing device is reported to the [`FailureObserver`] and the loop
//! moves on; when clear, the failure is returned immediately and the remaining
//! devices are left untouched for this call.
//!
//! Devices are shared, not owned: registration takes an `Rc<RefCell<_>>` and
//! identity is the allocation address, so registering the same handle twice is
//! a no-op.
//!
//! ```
//! use devrig::backends::virtual_input::VirtualDevice;
//! use devrig::DeviceManager;
//! use std::{cell::RefCell, rc::Rc};
//!
//! let stick = Rc::new(RefCell::new(VirtualDevice::new("stick")));
//! let pad = Rc::new(RefCell::new(VirtualDevice::new("pad")));
//!
//! let mut mgr = DeviceManager::new();
//! mgr.register(stick.clone());
//! mgr.register_rumble(pad.clone());
//!
//! mgr.open_all().expect("open");
//! mgr.update_all().expect("update");
//! mgr.rumble_all(true).expect("rumble");
//! mgr.close_all().expect("close");
//! ```

use crate::config::{FailurePolicy, JobSchedule, ManagerConfig};
use crate::device::{Device, RumbleDevice, RumbleMotor};
use crate::error::{IoError, Result};
use crate::event::InputKind;
use crate::metadata::DeviceMeta;
use crate::observer::{FailureObserver, Phase, TracingObserver, LOG_TAG};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Shared handle to a registered device.
pub type SharedDevice = Rc<RefCell<dyn Device>>;

/// Shared handle to a registered rumble-capable device.
pub type SharedRumbleDevice = Rc<RefCell<dyn RumbleDevice>>;

/// Origin tag for failures the manager raises itself.
const MANAGER_ORIGIN: &str = "DeviceManager";

/// Identity of a shared device: the address of its `RefCell`, metadata stripped.
#[inline]
fn identity<T: ?Sized>(handle: &Rc<RefCell<T>>) -> *const () {
    Rc::as_ptr(handle) as *const ()
}

/// One row of [`DeviceManager::report`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeviceReport {
    pub name: String,
    pub open: bool,
    pub enabled: bool,
    pub delay_secs: f64,
    pub rumble: bool,
    pub meta: DeviceMeta,
}

pub struct DeviceManager {
    devices: Vec<SharedDevice>,
    rumble_devices: Vec<SharedRumbleDevice>,
    policy: FailurePolicy,
    schedule: JobSchedule,
    observer: Box<dyn FailureObserver>,
}

impl Default for DeviceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceManager {
    /// Manager with the default policy and schedule, logging through `tracing`.
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        Self {
            devices: Vec::new(),
            rumble_devices: Vec::new(),
            policy: config.policy,
            schedule: config.schedule,
            observer: Box::new(TracingObserver::new()),
        }
    }

    /// Replace the observer that receives caught failures.
    pub fn with_observer(mut self, observer: impl FailureObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn set_observer(&mut self, observer: impl FailureObserver + 'static) {
        self.observer = Box::new(observer);
    }

    // ---------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------

    /// Append `device` unless this exact handle is already registered.
    pub fn register(&mut self, device: SharedDevice) {
        if self.contains(&device) {
            return;
        }
        tracing::debug!(device = %device_name(&device), "registered device");
        self.devices.push(device);
    }

    /// Register a rumble-capable device in both collections.
    ///
    /// A handle already in the rumble collection is ignored. Otherwise it is
    /// appended there, and to the device collection unless it was already
    /// registered through [`register`](Self::register).
    pub fn register_rumble<R>(&mut self, device: Rc<RefCell<R>>)
    where
        R: RumbleDevice + 'static,
    {
        self.register_shared_rumble(device);
    }

    /// [`register_rumble`](Self::register_rumble) for a handle that is already
    /// type-erased, e.g. one taken from another manager's
    /// [`rumble_devices`](Self::rumble_devices).
    pub fn register_shared_rumble(&mut self, device: SharedRumbleDevice) {
        if self.contains_rumble(&device) {
            return;
        }
        let as_device: SharedDevice = device.clone();
        tracing::debug!(device = %device_name(&as_device), "registered rumble device");
        if !self.contains(&as_device) {
            self.devices.push(as_device);
        }
        self.rumble_devices.push(device);
    }

    /// Whether `device` is registered (by identity).
    pub fn contains<T: ?Sized>(&self, device: &Rc<RefCell<T>>) -> bool {
        let id = identity(device);
        self.devices.iter().any(|d| identity(d) == id)
    }

    /// Whether `device` is registered as rumble-capable (by identity).
    pub fn contains_rumble<T: ?Sized>(&self, device: &Rc<RefCell<T>>) -> bool {
        let id = identity(device);
        self.rumble_devices.iter().any(|d| identity(d) == id)
    }

    pub fn devices(&self) -> &[SharedDevice] {
        &self.devices
    }

    pub fn rumble_devices(&self) -> &[SharedRumbleDevice] {
        &self.rumble_devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn rumble_len(&self) -> usize {
        self.rumble_devices.len()
    }

    // ---------------------------------------------------------------------
    // Policy and schedule
    // ---------------------------------------------------------------------

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: FailurePolicy) {
        self.policy = policy;
    }

    pub fn catch_open_failures(&self) -> bool {
        self.policy.catch_open_failures
    }

    pub fn set_catch_open_failures(&mut self, catch: bool) {
        self.policy.catch_open_failures = catch;
    }

    pub fn catch_update_failures(&self) -> bool {
        self.policy.catch_update_failures
    }

    pub fn set_catch_update_failures(&mut self, catch: bool) {
        self.policy.catch_update_failures = catch;
    }

    pub fn catch_close_failures(&self) -> bool {
        self.policy.catch_close_failures
    }

    pub fn set_catch_close_failures(&mut self, catch: bool) {
        self.policy.catch_close_failures = catch;
    }

    /// Scheduling parameters for the host's jobs.
    pub fn schedule(&self) -> &JobSchedule {
        &self.schedule
    }

    // ---------------------------------------------------------------------
    // Batch operations
    // ---------------------------------------------------------------------

    /// Open every device. Propagates the first failure unless
    /// `catch_open_failures` is set.
    pub fn open_all(&mut self) -> Result<()> {
        run_batch(
            &self.devices,
            Phase::Open,
            self.policy.catch_open_failures,
            self.observer.as_mut(),
            |d| d.open(),
        )?;
        tracing::debug!(devices = self.devices.len(), "open_all finished");
        Ok(())
    }

    /// Update every device. Failures are logged and skipped by default.
    pub fn update_all(&mut self) -> Result<()> {
        run_batch(
            &self.devices,
            Phase::Update,
            self.policy.catch_update_failures,
            self.observer.as_mut(),
            |d| d.update(),
        )
    }

    /// Close every device. Failures are logged and skipped by default.
    pub fn close_all(&mut self) -> Result<()> {
        run_batch(
            &self.devices,
            Phase::Close,
            self.policy.catch_close_failures,
            self.observer.as_mut(),
            |d| d.close(),
        )?;
        tracing::debug!(devices = self.devices.len(), "close_all finished");
        Ok(())
    }

    /// Drive the strong motor of every rumble device fully on or off.
    ///
    /// Follows `catch_update_failures`.
    pub fn rumble_all(&mut self, should_rumble: bool) -> Result<()> {
        let intensity = if should_rumble { 0xFF } else { 0x00 };
        run_batch(
            &self.rumble_devices,
            Phase::Rumble,
            self.policy.catch_update_failures,
            self.observer.as_mut(),
            |d| d.rumble(RumbleMotor::Strong, intensity),
        )
    }

    /// Set `delay` on every device.
    ///
    /// A device that is borrowed elsewhere at the time of the call is skipped
    /// with a warning and keeps its previous value; call again once the
    /// borrow is released.
    pub fn set_delay(&mut self, delay: Duration) {
        self.broadcast(|d| d.set_delay(delay));
    }

    /// Set `enabled` on every device.
    ///
    /// Borrowed devices are skipped the same way as in [`set_delay`](Self::set_delay).
    pub fn set_enabled(&mut self, enabled: bool) {
        self.broadcast(|d| d.set_enabled(enabled));
    }

    fn broadcast(&mut self, mut apply: impl FnMut(&mut dyn Device)) {
        for device in &self.devices {
            match device.try_borrow_mut() {
                Ok(mut d) => apply(&mut *d),
                Err(_) => tracing::warn!("{LOG_TAG} skipped busy device during broadcast"),
            }
        }
    }

    // ---------------------------------------------------------------------
    // Inspection
    // ---------------------------------------------------------------------

    /// Collect buffered input deltas from every device, tagged by device name.
    pub fn drain_events(&mut self) -> Vec<(String, InputKind)> {
        let mut out = Vec::new();
        for device in &self.devices {
            if let Ok(mut d) = device.try_borrow_mut() {
                let name = d.name().to_string();
                out.extend(d.drain_events().into_iter().map(|ev| (name.clone(), ev)));
            }
        }
        out
    }

    /// Status of every registered device. Devices currently borrowed elsewhere
    /// are left out.
    pub fn report(&self) -> Vec<DeviceReport> {
        self.devices
            .iter()
            .filter_map(|device| {
                let d = device.try_borrow().ok()?;
                Some(DeviceReport {
                    name: d.name().to_string(),
                    open: d.is_open(),
                    enabled: d.is_enabled(),
                    delay_secs: d.delay().as_secs_f64(),
                    rumble: self.contains_rumble(device),
                    meta: d.metadata(),
                })
            })
            .collect()
    }

    pub fn report_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.report())
    }
}

/// Apply `op` to each item in order under one phase's catch policy.
fn run_batch<T: ?Sized>(
    items: &[Rc<RefCell<T>>],
    phase: Phase,
    catch: bool,
    observer: &mut dyn FailureObserver,
    mut op: impl FnMut(&mut T) -> Result<()>,
) -> Result<()> {
    for item in items {
        let outcome = match item.try_borrow_mut() {
            Ok(mut d) => op(&mut *d),
            Err(_) => Err(IoError::new(MANAGER_ORIGIN, "device is busy")),
        };
        if let Err(err) = outcome {
            if !catch {
                return Err(err);
            }
            observer.on_failure(phase, &err);
        }
    }
    Ok(())
}

fn device_name(device: &SharedDevice) -> String {
    device
        .try_borrow()
        .map(|d| d.name().to_string())
        .unwrap_or_default()
}
