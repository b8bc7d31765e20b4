//! Input deltas.
//!
//! Devices may buffer small, device-agnostic changes ([`InputKind`]) while they
//! are updated; the manager hands them out through
//! [`DeviceManager::drain_events`](crate::manager::DeviceManager::drain_events).
//!
//! ## Value conventions
//! - **Axes:** normalized to `[-1.0, 1.0]`.
//! - **Buttons:** press/release edges.
//! - **Hats (POV/D-pad):** `-1` = neutral, `0..7` = 8-way directions (Up = 0, clockwise).

/// Per-device input change.
///
/// The `axis`/`button`/`hat` indices are device-local channel indices.
#[derive(Clone, Debug, PartialEq)]
pub enum InputKind {
    /// A continuous channel changed.
    AxisMoved { axis: u16, value: f32 },

    /// A button transitioned to pressed.
    ButtonPressed { button: u16 },

    /// A button transitioned to released.
    ButtonReleased { button: u16 },

    /// A hat (POV/D-pad) changed.
    ///
    /// `value`: `-1` = neutral, `0..7` = directions (Up = 0, clockwise).
    HatChanged { hat: u16, value: i16 },
}
