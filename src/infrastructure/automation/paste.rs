//! Synthetic paste delivery through the OS input-synthesis facility.
//!
//! The paste command is handed to whichever application holds input focus;
//! the pipeline cannot verify it landed and must not attempt to. Delivery
//! runs under a bounded timeout so a hung automation service cannot stall
//! a batch run.
//!
//! On macOS this requires the user to grant automation/accessibility
//! permission; a denial surfaces as an `Automation` error, not a crash.

use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::process::Command;

use crate::error::{AppError, Result};
use crate::interface::PasteInjector;

/// Upper bound on one synthetic-paste delivery.
const PASTE_TIMEOUT: Duration = Duration::from_secs(5);

#[cfg(target_os = "macos")]
const PASTE_SCRIPT: &str = r#"tell application "System Events" to keystroke "v" using command down"#;

pub struct OsPasteInjector;

impl OsPasteInjector {
    pub fn new() -> Self {
        Self
    }

    #[cfg(target_os = "macos")]
    fn command() -> Result<Command> {
        let mut cmd = Command::new("osascript");
        cmd.arg("-e").arg(PASTE_SCRIPT);
        Ok(cmd)
    }

    #[cfg(target_os = "linux")]
    fn command() -> Result<Command> {
        let mut cmd = Command::new("xdotool");
        cmd.args(["key", "--clearmodifiers", "ctrl+v"]);
        Ok(cmd)
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    fn command() -> Result<Command> {
        Err(AppError::unsupported(
            "no input-synthesis facility on this platform",
        ))
    }
}

impl Default for OsPasteInjector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PasteInjector for OsPasteInjector {
    async fn trigger_paste(&self) -> Result<()> {
        let mut cmd = Self::command()?;

        let output = tokio::time::timeout(PASTE_TIMEOUT, cmd.output())
            .await
            .map_err(|_| {
                AppError::timeout(format!(
                    "paste delivery exceeded {}s",
                    PASTE_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e| AppError::automation(format!("failed to spawn paste command: {}", e)))?;

        classify(output)
    }
}

/// Map the command outcome onto the error taxonomy. A non-zero exit means
/// the automation facility refused delivery (commonly a missing
/// accessibility permission).
fn classify(output: Output) -> Result<()> {
    if output.status.success() {
        debug!("Paste command delivered");
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(AppError::automation(format!(
            "paste command exited with {}: {}",
            output.status,
            stderr.trim()
        )))
    }
}
