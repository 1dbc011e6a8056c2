//! Sequential batch copy-and-paste over a fixed asset snapshot.
//!
//! One run drains its snapshot through the clipboard one item at a time:
//! copy, wait a fixed settle delay, synthetic paste, then wait the
//! user-configured interval before the next item. The interval acts as a
//! debounce so the destination application can absorb the previous paste
//! before the clipboard is overwritten.
//!
//! States are `Idle -> Processing -> Idle`; completion and cancellation
//! both return to `Idle`. At most one run is active at a time; a start
//! request during a run is rejected, not queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{error, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::interface::{ClipboardImageWriter, PasteInjector};
use crate::models::{Asset, BatchReport};

/// Inter-item delay bounds (seconds).
pub const MIN_INTERVAL_SECS: f64 = 0.5;
pub const MAX_INTERVAL_SECS: f64 = 60.0;

/// Minimum assumed latency for a clipboard write to become visible to the
/// OS before the synthetic paste fires. Not configurable.
const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Pause after the last item before returning to idle.
const GRACE_DELAY: Duration = Duration::from_millis(1000);

/// Clamp a requested inter-item interval into the supported range.
pub fn clamp_interval(secs: f64) -> f64 {
    if !secs.is_finite() {
        warn!("Interval is not a number, using minimum");
        return MIN_INTERVAL_SECS;
    }
    if secs < MIN_INTERVAL_SECS {
        warn!("Interval below {}s, clamped", MIN_INTERVAL_SECS);
        MIN_INTERVAL_SECS
    } else if secs > MAX_INTERVAL_SECS {
        warn!("Interval above {}s, clamped", MAX_INTERVAL_SECS);
        MAX_INTERVAL_SECS
    } else {
        secs
    }
}

struct ActiveRun {
    token: CancellationToken,
    handle: JoinHandle<BatchReport>,
}

/// The batch-processing state machine.
pub struct AutoPasteService {
    clipboard: Arc<dyn ClipboardImageWriter>,
    paste: Arc<dyn PasteInjector>,
    is_processing: Arc<AtomicBool>,
    run: Mutex<Option<ActiveRun>>,
    progress_tx: watch::Sender<Option<BatchReport>>,
}

impl AutoPasteService {
    pub fn new(clipboard: Arc<dyn ClipboardImageWriter>, paste: Arc<dyn PasteInjector>) -> Self {
        let (progress_tx, _) = watch::channel(None);
        Self {
            clipboard,
            paste,
            is_processing: Arc::new(AtomicBool::new(false)),
            run: Mutex::new(None),
            progress_tx,
        }
    }

    /// Start a run over a snapshot of assets.
    ///
    /// Rejected (returns false, logs a warning) while a run is in flight or
    /// when the snapshot is empty. The in-flight snapshot and cursor are
    /// never touched by a rejected start. The first item is processed
    /// immediately; only gaps between items are delayed.
    ///
    /// `delay_provider` is re-read on every step, so changing the
    /// configured interval mid-run takes effect on the next item.
    pub fn start<F>(&self, assets: Vec<Asset>, delay_provider: F) -> bool
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        if assets.is_empty() {
            warn!("No image assets to process, run not started");
            return false;
        }

        if self
            .is_processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("A batch run is already in progress, start rejected");
            return false;
        }

        info!("Starting batch run over {} assets", assets.len());

        let token = CancellationToken::new();
        let handle = tokio::spawn(run_batch(
            self.clipboard.clone(),
            self.paste.clone(),
            assets,
            delay_provider,
            token.clone(),
            self.is_processing.clone(),
            self.progress_tx.clone(),
        ));

        *self.run.lock().unwrap() = Some(ActiveRun { token, handle });
        true
    }

    /// Cancel the in-flight run, if any.
    ///
    /// The pending timer is actively cancelled and the run task awaited, so
    /// no further clipboard call executes after this returns. Reports how
    /// many snapshot items were completed versus total.
    pub async fn cancel(&self) -> Option<BatchReport> {
        let active = self.run.lock().unwrap().take()?;

        active.token.cancel();
        match active.handle.await {
            Ok(report) => {
                if !report.is_complete() {
                    info!("Batch run cancelled: {}", report);
                }
                Some(report)
            }
            Err(e) => {
                error!("Batch run task failed: {}", e);
                None
            }
        }
    }

    /// Whether a run is currently `Processing`.
    pub fn is_processing(&self) -> bool {
        self.is_processing.load(Ordering::SeqCst)
    }

    /// Observe per-item progress and the final report of the current run.
    pub fn subscribe(&self) -> watch::Receiver<Option<BatchReport>> {
        self.progress_tx.subscribe()
    }
}

async fn run_batch<F>(
    clipboard: Arc<dyn ClipboardImageWriter>,
    paste: Arc<dyn PasteInjector>,
    assets: Vec<Asset>,
    delay_provider: F,
    token: CancellationToken,
    is_processing: Arc<AtomicBool>,
    progress_tx: watch::Sender<Option<BatchReport>>,
) -> BatchReport
where
    F: Fn() -> f64 + Send + Sync + 'static,
{
    let mut report = BatchReport::new(assets.len());
    progress_tx.send_replace(Some(report.clone()));

    for (index, asset) in assets.iter().enumerate() {
        if index > 0 {
            let delay = clamp_interval(delay_provider());
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(Duration::from_secs_f64(delay)) => {}
            }
        }

        if token.is_cancelled() {
            break;
        }

        info!(
            "Processing image {}/{}: {}",
            index + 1,
            report.total,
            asset.file_name()
        );

        match clipboard.copy_image(asset.path()) {
            Ok(()) => {
                // Let the clipboard write propagate before pasting
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(SETTLE_DELAY) => {}
                }

                if let Err(e) = paste.trigger_paste().await {
                    error!("Paste delivery failed for {}: {}", asset.file_name(), e);
                    report.failed += 1;
                }
            }
            Err(e) => {
                // No retry: log, count, move on
                error!("Copy failed, skipping {}: {}", asset.file_name(), e);
                report.failed += 1;
            }
        }

        report.processed += 1;
        progress_tx.send_replace(Some(report.clone()));
    }

    if report.is_complete() {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(GRACE_DELAY) => {}
        }
        info!("Batch run finished: {}", report);
    }

    is_processing.store(false, Ordering::SeqCst);
    progress_tx.send_replace(Some(report.clone()));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::time::SystemTime;
    use tokio::time::Instant;

    /// Clipboard double that records call order and can fail on chosen paths.
    struct RecordingClipboard {
        calls: Mutex<Vec<PathBuf>>,
        fail_on: Option<PathBuf>,
    }

    impl RecordingClipboard {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail_on: None,
            })
        }

        fn failing_on(path: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail_on: Some(PathBuf::from(path)),
            })
        }

        fn calls(&self) -> Vec<PathBuf> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ClipboardImageWriter for RecordingClipboard {
        fn copy_image(&self, path: &Path) -> crate::error::Result<()> {
            self.calls.lock().unwrap().push(path.to_path_buf());
            if self.fail_on.as_deref() == Some(path) {
                return Err(AppError::decode("scripted failure"));
            }
            Ok(())
        }
    }

    /// Paste double that counts deliveries.
    struct CountingPaste {
        count: Mutex<usize>,
    }

    impl CountingPaste {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                count: Mutex::new(0),
            })
        }

        fn count(&self) -> usize {
            *self.count.lock().unwrap()
        }
    }

    #[async_trait]
    impl PasteInjector for CountingPaste {
        async fn trigger_paste(&self) -> crate::error::Result<()> {
            *self.count.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn assets(names: &[&str]) -> Vec<Asset> {
        names
            .iter()
            .map(|n| Asset::new(PathBuf::from(format!("/scratch/{}", n)), SystemTime::UNIX_EPOCH, 1))
            .collect()
    }

    async fn wait_until_idle(service: &AutoPasteService) {
        while service.is_processing() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[test]
    fn test_clamp_interval() {
        assert_eq!(clamp_interval(0.1), 0.5);
        assert_eq!(clamp_interval(120.0), 60.0);
        assert_eq!(clamp_interval(4.0), 4.0);
        assert_eq!(clamp_interval(0.5), 0.5);
        assert_eq!(clamp_interval(60.0), 60.0);
        assert_eq!(clamp_interval(f64::NAN), 0.5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_processes_all_items_in_snapshot_order() {
        let clipboard = RecordingClipboard::new();
        let paste = CountingPaste::new();
        let service = AutoPasteService::new(clipboard.clone(), paste.clone());

        assert!(service.start(assets(&["a.png", "b.png", "c.png"]), || 0.5));
        assert!(service.is_processing());

        wait_until_idle(&service).await;

        let calls = clipboard.calls();
        assert_eq!(
            calls,
            vec![
                PathBuf::from("/scratch/a.png"),
                PathBuf::from("/scratch/b.png"),
                PathBuf::from("/scratch/c.png"),
            ]
        );
        assert_eq!(paste.count(), 3);

        let report = service.subscribe().borrow().clone().unwrap();
        assert_eq!(report.processed, 3);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_snapshot_is_rejected() {
        let service = AutoPasteService::new(RecordingClipboard::new(), CountingPaste::new());
        assert!(!service.start(Vec::new(), || 1.0));
        assert!(!service.is_processing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_processing_is_rejected() {
        let clipboard = RecordingClipboard::new();
        let service = AutoPasteService::new(clipboard.clone(), CountingPaste::new());

        assert!(service.start(assets(&["a.png", "b.png"]), || 2.0));
        assert!(!service.start(assets(&["x.png"]), || 2.0));

        wait_until_idle(&service).await;

        // The rejected start never touched the in-flight snapshot
        let calls = clipboard.calls();
        assert_eq!(calls.len(), 2);
        assert!(!calls.contains(&PathBuf::from("/scratch/x.png")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_failure_skips_item_and_continues() {
        let clipboard = RecordingClipboard::failing_on("/scratch/b.png");
        let paste = CountingPaste::new();
        let service = AutoPasteService::new(clipboard.clone(), paste.clone());

        service.start(assets(&["a.png", "b.png", "c.png"]), || 0.5);
        wait_until_idle(&service).await;

        assert_eq!(clipboard.calls().len(), 3);
        // No paste for the failed item
        assert_eq!(paste.count(), 2);

        let report = service.subscribe().borrow().clone().unwrap();
        assert_eq!(report.processed, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_further_clipboard_calls() {
        let clipboard = RecordingClipboard::new();
        let service = AutoPasteService::new(clipboard.clone(), CountingPaste::new());

        service.start(assets(&["a.png", "b.png", "c.png"]), || 10.0);

        // Let the first item complete, then cancel during the long gap
        tokio::time::sleep(Duration::from_millis(700)).await;
        let report = service.cancel().await.unwrap();

        assert!(!service.is_processing());
        assert_eq!(report.processed, 1);
        assert_eq!(report.total, 3);

        let after_cancel = clipboard.calls().len();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(clipboard.calls().len(), after_cancel);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_when_idle_is_safe() {
        let service = AutoPasteService::new(RecordingClipboard::new(), CountingPaste::new());
        assert!(service.cancel().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_timing() {
        let clipboard = RecordingClipboard::new();
        let service = AutoPasteService::new(clipboard.clone(), CountingPaste::new());

        let started = Instant::now();
        service.start(assets(&["a.png", "b.png", "c.png"]), || 0.5);
        wait_until_idle(&service).await;
        let elapsed = started.elapsed();

        // settle*3 + interval*2 + grace = 1.5 + 1.0 + 1.0 seconds
        assert!(elapsed >= Duration::from_millis(3500), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(4500), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_provider_reread_each_step() {
        let clipboard = RecordingClipboard::new();
        let service = AutoPasteService::new(clipboard.clone(), CountingPaste::new());

        // Interval grows after each read; the run must honor the new value
        // on the next gap rather than the value seen at start.
        let reads = Arc::new(Mutex::new(0usize));
        let reads_in_provider = reads.clone();
        let started = Instant::now();
        service.start(assets(&["a.png", "b.png", "c.png"]), move || {
            let mut reads = reads_in_provider.lock().unwrap();
            *reads += 1;
            if *reads == 1 {
                0.5
            } else {
                2.0
            }
        });
        wait_until_idle(&service).await;
        let elapsed = started.elapsed();

        assert_eq!(*reads.lock().unwrap(), 2);
        // settle*3 + 0.5 + 2.0 + grace = 5.0 seconds
        assert!(elapsed >= Duration::from_millis(4900), "elapsed {:?}", elapsed);
    }
}
