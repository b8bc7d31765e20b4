#![cfg(target_os = "windows")]

//! XInput controller.
//!
//! [`XInputPad`] drives one XInput slot (0–3) as a [`RumbleDevice`]:
//! - `open()` succeeds only if a controller is connected to the slot,
//! - `update()` reads `XInputGetState` and buffers input deltas,
//! - `rumble()` maps [`RumbleMotor::Strong`] to the left (low-frequency) motor
//!   and [`RumbleMotor::Weak`] to the right one,
//! - `close()` stops both motors.
//!
//! # Channel conventions
//! - Axes `0..6`: LX, LY (inverted, up = -1), RX, RY (inverted), LT, RT, all in `[-1, 1]`
//! - Buttons `0..10`: A, B, X, Y, LB, RB, Back, Start, LThumb, RThumb
//! - Hat `0`: DPad, `-1` neutral, `0..7` clockwise from Up

use crate::device::{Device, DeviceCore, RumbleDevice, RumbleMotor};
use crate::error::{IoError, Result};
use crate::event::InputKind;
use crate::metadata::DeviceMeta;

// Windows XInput FFI.
use windows_sys::Win32::UI::Input::XboxController::*;

const MAX_AXES: usize = 6;

/// Return value of the XInput calls on success.
const ERROR_SUCCESS: u32 = 0;

const BUTTON_MAP: &[(u16, u16)] = &[
    (XINPUT_GAMEPAD_A, 0),
    (XINPUT_GAMEPAD_B, 1),
    (XINPUT_GAMEPAD_X, 2),
    (XINPUT_GAMEPAD_Y, 3),
    (XINPUT_GAMEPAD_LEFT_SHOULDER, 4),
    (XINPUT_GAMEPAD_RIGHT_SHOULDER, 5),
    (XINPUT_GAMEPAD_BACK, 6),
    (XINPUT_GAMEPAD_START, 7),
    (XINPUT_GAMEPAD_LEFT_THUMB, 8),
    (XINPUT_GAMEPAD_RIGHT_THUMB, 9),
];

pub struct XInputPad {
    slot: u32,
    name: String,
    core: DeviceCore,
    last_packet: u32,
    last_axes: [f32; MAX_AXES],
    last_buttons: u16,
    last_hat: i16,
    motors: (u16, u16),
    events: Vec<InputKind>,
}

impl XInputPad {
    /// Pad bound to `slot` (`0..4`).
    pub fn new(slot: u32) -> Self {
        Self {
            slot,
            name: format!("XInput Controller {slot}"),
            core: DeviceCore::new(),
            last_packet: 0,
            last_axes: [0.0; MAX_AXES],
            last_buttons: 0,
            last_hat: -1,
            motors: (0, 0),
            events: Vec::new(),
        }
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }

    fn read_state(&self) -> Result<XINPUT_STATE> {
        // FFI struct: must be manually zeroed
        let mut state: XINPUT_STATE = unsafe { std::mem::zeroed() };
        let res = unsafe { XInputGetState(self.slot, &mut state) };
        if res == ERROR_SUCCESS {
            Ok(state)
        } else {
            Err(IoError::new(
                &self.name,
                format!("no controller in slot {} (error {res})", self.slot),
            ))
        }
    }

    fn set_motors(&mut self, left: u16, right: u16) -> Result<()> {
        let vibration = XINPUT_VIBRATION {
            wLeftMotorSpeed: left,
            wRightMotorSpeed: right,
        };
        let res = unsafe { XInputSetState(self.slot, &vibration) };
        if res != ERROR_SUCCESS {
            return Err(IoError::new(
                &self.name,
                format!("XInputSetState failed (error {res})"),
            ));
        }
        self.motors = (left, right);
        Ok(())
    }

    /// Map `[-32768, 32767]` to `[-1, 1]`.
    #[inline]
    fn normalize_thumb(v: i16) -> f32 {
        if v >= 0 {
            (v as f32) / 32767.0
        } else {
            (v as f32) / 32768.0
        }
    }

    /// Map `0..255` to `[-1, 1]` (released = -1).
    #[inline]
    fn normalize_trigger(v: u8) -> f32 {
        (v as f32) / 255.0 * 2.0 - 1.0
    }

    /// DPad bits to hat value: -1 neutral, 0 up, clockwise to 7 up-left.
    fn compute_hat(buttons: u16) -> i16 {
        let up = buttons & XINPUT_GAMEPAD_DPAD_UP != 0;
        let down = buttons & XINPUT_GAMEPAD_DPAD_DOWN != 0;
        let left = buttons & XINPUT_GAMEPAD_DPAD_LEFT != 0;
        let right = buttons & XINPUT_GAMEPAD_DPAD_RIGHT != 0;

        match (up, down, left, right) {
            (true, false, false, false) => 0,
            (true, false, false, true) => 1,
            (false, false, false, true) => 2,
            (false, true, false, true) => 3,
            (false, true, false, false) => 4,
            (false, true, true, false) => 5,
            (false, false, true, false) => 6,
            (true, false, true, false) => 7,
            // neutral, or conflicting up+down / left+right
            _ => -1,
        }
    }

    fn push_deltas(&mut self, gp: &XINPUT_GAMEPAD) {
        let new_axes = [
            Self::normalize_thumb(gp.sThumbLX),
            -Self::normalize_thumb(gp.sThumbLY),
            Self::normalize_thumb(gp.sThumbRX),
            -Self::normalize_thumb(gp.sThumbRY),
            Self::normalize_trigger(gp.bLeftTrigger),
            Self::normalize_trigger(gp.bRightTrigger),
        ];
        for (i, &v) in new_axes.iter().enumerate() {
            if (v - self.last_axes[i]).abs() > 0.001 {
                self.last_axes[i] = v;
                self.events.push(InputKind::AxisMoved {
                    axis: i as u16,
                    value: v,
                });
            }
        }

        let buttons: u16 = gp.wButtons;
        let changed = buttons ^ self.last_buttons;
        for &(mask, idx) in BUTTON_MAP {
            if changed & mask != 0 {
                if buttons & mask != 0 {
                    self.events.push(InputKind::ButtonPressed { button: idx });
                } else {
                    self.events.push(InputKind::ButtonReleased { button: idx });
                }
            }
        }
        self.last_buttons = buttons;

        let hat = Self::compute_hat(buttons);
        if hat != self.last_hat {
            self.last_hat = hat;
            self.events.push(InputKind::HatChanged { hat: 0, value: hat });
        }
    }
}

impl Device for XInputPad {
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
        let state = self.read_state()?;
        self.last_packet = state.dwPacketNumber;
        self.push_deltas(&state.Gamepad);
        self.core.mark_open();
        tracing::debug!(slot = self.slot, "opened XInput controller");
        Ok(())
    }

    fn update(&mut self) -> Result<()> {
        self.core.ensure_open(&self.name)?;
        if !self.core.is_enabled() {
            return Ok(());
        }
        let state = self.read_state()?;
        // Unchanged packet number means unchanged state.
        if state.dwPacketNumber == self.last_packet {
            return Ok(());
        }
        self.last_packet = state.dwPacketNumber;
        self.push_deltas(&state.Gamepad);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.core.is_open() {
            return Ok(());
        }
        let stopped = if self.motors != (0, 0) {
            self.set_motors(0, 0)
        } else {
            Ok(())
        };
        self.core.mark_closed();
        stopped
    }

    fn drain_events(&mut self) -> Vec<InputKind> {
        std::mem::take(&mut self.events)
    }

    fn metadata(&self) -> DeviceMeta {
        DeviceMeta {
            bus: Some("xinput".into()),
            vid: Some(0x045e),
            pid: None,
            product_string: Some(self.name.clone()),
            serial_number: None,
            path: Some(format!("xinput:{}", self.slot)),
        }
    }
}

impl RumbleDevice for XInputPad {
    fn rumble(&mut self, motor: RumbleMotor, intensity: u8) -> Result<()> {
        self.core.ensure_open(&self.name)?;
        // 0..255 -> 0..65535
        let speed = u16::from(intensity) * 257;
        let (left, right) = match motor {
            RumbleMotor::Strong => (speed, self.motors.1),
            RumbleMotor::Weak => (self.motors.0, speed),
        };
        self.set_motors(left, right)
    }
}
