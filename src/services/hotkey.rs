//! Global hotkey detection.
//!
//! A background task polls the OS modifier-key state on a fixed cadence and
//! emits an event on the rising edge of the Command+Option chord. The event
//! is delivered over a channel drained by the owning context; the polling
//! task itself never touches shared pipeline state.
//!
//! Detection is edge-triggered: holding the chord across many poll ticks
//! fires exactly one event, on the not-held to held transition.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::interface::{ModifierState, ModifierStateSource};

/// Default polling cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Bound on how long `stop_listening` waits for the loop to exit.
const STOP_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyEvent {
    ChordPressed,
}

pub struct HotkeyWatcher {
    source: Arc<dyn ModifierStateSource>,
    sender: mpsc::Sender<HotkeyEvent>,
    poll_interval: Duration,
    is_running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl HotkeyWatcher {
    pub fn new(source: Arc<dyn ModifierStateSource>, sender: mpsc::Sender<HotkeyEvent>) -> Self {
        Self {
            source,
            sender,
            poll_interval: DEFAULT_POLL_INTERVAL,
            is_running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Begin the background polling loop. A no-op when already running.
    pub fn start_listening(&mut self) {
        if self
            .is_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let source = self.source.clone();
        let sender = self.sender.clone();
        let poll_interval = self.poll_interval;
        let is_running = self.is_running.clone();

        self.handle = Some(tokio::spawn(async move {
            let mut was_held = false;

            while is_running.load(Ordering::SeqCst) {
                match read_state(source.as_ref()) {
                    Ok(state) => {
                        let held = state.chord_held();
                        if held && !was_held {
                            info!("Hotkey chord detected");
                            if let Err(e) = sender.try_send(HotkeyEvent::ChordPressed) {
                                warn!("Dropping hotkey event: {}", e);
                            }
                        }
                        was_held = held;
                    }
                    // Transient read failures must not abort the listener
                    Err(e) => warn!("Failed to read modifier state: {}", e),
                }

                tokio::time::sleep(poll_interval).await;
            }
        }));

        info!(
            "Hotkey listener started (polling every {:?})",
            self.poll_interval
        );
    }

    /// Signal the loop to end and wait (bounded) for it to exit.
    ///
    /// Always safe to call, running or not.
    pub async fn stop_listening(&mut self) {
        self.is_running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.handle.take() {
            match tokio::time::timeout(STOP_TIMEOUT, handle).await {
                Ok(Ok(())) => info!("Hotkey listener stopped"),
                Ok(Err(e)) => warn!("Hotkey listener task failed: {}", e),
                Err(_) => warn!("Hotkey listener did not stop within {:?}", STOP_TIMEOUT),
            }
        }
    }

    pub fn is_listening(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }
}

/// One poll-tick read. A panic inside the platform adapter would unwind the
/// spawned loop and silently end chord delivery, so it is contained here and
/// reported as an error like any failed read.
fn read_state(source: &dyn ModifierStateSource) -> crate::error::Result<ModifierState> {
    std::panic::catch_unwind(AssertUnwindSafe(|| source.read()))
        .unwrap_or_else(|_| Err(AppError::internal("modifier state read panicked")))
}
