//! pagepaste binary
//!
//! Headless orchestrator: creates the per-session scratch directory,
//! listens for the global Command+Option chord and, on each press, drains a
//! fresh snapshot of the scratch directory through the clipboard into the
//! focused application. An external renderer (or the user) drops image
//! files into the printed scratch path.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use log::{error, info, warn};
use tokio::signal;
use tokio::sync::mpsc;

use pagepaste::config::{Setting, SETTING};
use pagepaste::infrastructure::assets::AssetStore;
use pagepaste::infrastructure::automation::OsPasteInjector;
use pagepaste::infrastructure::clipboard::SystemClipboardWriter;
use pagepaste::infrastructure::keyboard::DeviceQueryModifierSource;
use pagepaste::services::{AutoPasteService, HotkeyEvent, HotkeyWatcher};

#[derive(Parser, Debug)]
#[command(name = "pagepaste", version, about = "Batch clipboard automation for rendered document pages")]
struct Cli {
    /// Seconds between items in a batch run (persisted to the settings file)
    #[arg(long)]
    interval: Option<f64>,

    /// Page range to hand to the renderer, e.g. "1,3,5-7,10"
    #[arg(long)]
    pages: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut setting = Setting::load(None)?;
    if let Some(interval) = cli.interval {
        setting.auto_paste.copy_interval_secs = interval;
        setting.save(None)?;
        info!("Copy interval set to {}s", interval);
    }

    if let Some(range) = cli.pages.as_deref() {
        let pages = pagepaste::models::parse_page_range(range)?;
        info!(
            "Pages selected for rendering: {:?} (dpi {})",
            pages, setting.render.dpi
        );
    }

    let mut store = AssetStore::new();
    let scratch = store.create_scratch_dir()?.to_path_buf();
    info!("Drop rendered page images into: {}", scratch.display());
    info!("Press Command+Option in any application to start pasting");

    let clipboard = Arc::new(SystemClipboardWriter::new()?);
    let paste = Arc::new(OsPasteInjector::new());
    let runner = Arc::new(AutoPasteService::new(clipboard, paste));

    let (event_tx, mut event_rx) = mpsc::channel(8);
    let mut watcher = HotkeyWatcher::new(Arc::new(DeviceQueryModifierSource::new()), event_tx)
        .with_poll_interval(std::time::Duration::from_millis(
            setting.auto_paste.hotkey_poll_ms,
        ));
    watcher.start_listening();

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => break,
            event = event_rx.recv() => match event {
                Some(HotkeyEvent::ChordPressed) => on_chord(&mut store, &runner),
                None => break,
            },
        }
    }

    shutdown(watcher, &runner, &mut store).await;
    Ok(())
}

/// Hotkey handler: fresh directory snapshot, then start a run. Overlapping
/// chord presses are rejected by the runner itself.
fn on_chord(store: &mut AssetStore, runner: &AutoPasteService) {
    let assets = store.list_assets();
    info!("Scratch directory holds {}", store.describe());

    let started = runner.start(assets, || {
        SETTING.read().unwrap().auto_paste.copy_interval_secs
    });
    if !started {
        warn!("Batch run not started");
    }
}

async fn shutdown(mut watcher: HotkeyWatcher, runner: &AutoPasteService, store: &mut AssetStore) {
    info!("Shutting down");

    watcher.stop_listening().await;

    if runner.is_processing() {
        match runner.cancel().await {
            Some(report) => info!("Cancelled in-flight run: {}", report),
            None => error!("In-flight run could not be cancelled cleanly"),
        }
    }

    store.teardown();
}
