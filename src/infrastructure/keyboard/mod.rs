//! Global modifier-key state via device_query.
//!
//! The device handle is opened per read: the underlying display connection
//! is not shareable across threads, and the watcher task needs a
//! `Send + Sync` source. A failed open surfaces as an error for the caller
//! to log and keep polling, never as a panic.

use device_query::{DeviceQuery, DeviceState, Keycode};
use log::debug;

use crate::error::{AppError, Result};
use crate::interface::{ModifierState, ModifierStateSource};

pub struct DeviceQueryModifierSource;

impl DeviceQueryModifierSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DeviceQueryModifierSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ModifierStateSource for DeviceQueryModifierSource {
    fn read(&self) -> Result<ModifierState> {
        // checked_new, not new: the constructor panics when the display
        // connection cannot be opened
        let device = DeviceState::checked_new()
            .ok_or_else(|| AppError::unsupported("no input device connection available"))?;
        let keys = device.get_keys();

        let state = ModifierState {
            command: keys.contains(&Keycode::LMeta) || keys.contains(&Keycode::RMeta),
            option: keys.contains(&Keycode::LAlt) || keys.contains(&Keycode::RAlt),
        };

        if state.chord_held() {
            debug!("Modifier chord held");
        }

        Ok(state)
    }
}
