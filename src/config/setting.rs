use super::utils::get_setting_path;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

// Global settings instance
pub static SETTING: Lazy<RwLock<Setting>> = Lazy::new(|| RwLock::new(Setting::default()));

// Automatic copy-paste settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoPasteSetting {
    // Seconds to wait between items in a batch run.
    // The runner clamps this to [0.5, 60] on every step.
    pub copy_interval_secs: f64,
    // Polling cadence of the global hotkey listener (milliseconds)
    #[serde(default = "default_hotkey_poll_ms")]
    pub hotkey_poll_ms: u64,
}

fn default_hotkey_poll_ms() -> u64 {
    100
}

// Page rendering settings, consumed by the external renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSetting {
    // Resolution for page-to-image rendering
    pub dpi: u32,
}

// Main settings struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub auto_paste: AutoPasteSetting,
    pub render: RenderSetting,
}

impl Default for Setting {
    fn default() -> Self {
        Self {
            auto_paste: AutoPasteSetting {
                copy_interval_secs: 4.0,
                hotkey_poll_ms: 100,
            },
            render: RenderSetting { dpi: 300 },
        }
    }
}

impl Setting {
    /// Get a clone of the current global settings.
    pub fn get_instance() -> Self {
        SETTING.read().unwrap().clone()
    }

    /// Load settings.
    ///
    /// Loads from the given path when provided, otherwise from the default
    /// config directory. A missing file yields the defaults, which are
    /// written back so the file exists for the next run.
    pub fn load(setting_path: Option<PathBuf>) -> Result<Self> {
        let path = if let Some(path) = setting_path {
            path
        } else {
            get_setting_path()?
        };

        if let Ok(setting_str) = fs::read_to_string(&path) {
            let setting: Setting =
                serde_json::from_str(&setting_str).with_context(|| "Failed to parse settings file")?;

            // Update the global instance
            SETTING.write().unwrap().clone_from(&setting);

            Ok(setting)
        } else {
            let default_setting = Setting::default();
            default_setting.save(Some(path))?;
            Ok(default_setting)
        }
    }

    /// Save settings.
    ///
    /// Saves to the given path when provided, otherwise to the default
    /// config directory. Parent directories are created as needed.
    pub fn save(&self, setting_path: Option<PathBuf>) -> Result<()> {
        let path = if let Some(path) = setting_path {
            path
        } else {
            get_setting_path()?
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let setting_str = serde_json::to_string_pretty(self)?;
        fs::write(&path, setting_str)
            .with_context(|| format!("Failed to write settings file {:?}", path))?;

        // Keep the global instance in sync
        SETTING.write().unwrap().clone_from(self);

        Ok(())
    }
}
