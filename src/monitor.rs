//! Polling loop that watches the current download job.
//!
//! A [`ProgressMonitor`] owns at most one recurring poll task. Every reply is
//! projected into a [`UiState`] and forwarded to a [`ProgressView`]. The loop
//! ends by itself once the job reports `finished` or `error`, or when
//! [`ProgressMonitor::stop`] is called (or the monitor is dropped).

use crate::client::StatusSource;
use crate::format::{format_size, format_speed};
use crate::models::{JobStatus, Transfer};
use crate::view::{Notice, ProgressView, StatusKind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Shortest accepted poll period; `tokio::time::interval` rejects zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Display-ready projection of one `downloading` reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressLine {
    pub percent_text: String,
    /// Bar fill in `0..=100`.
    pub percent_width: f64,
    pub size_text: String,
    pub speed_text: String,
}

impl From<&Transfer> for ProgressLine {
    fn from(transfer: &Transfer) -> Self {
        Self {
            percent_text: transfer.percentage.text(),
            percent_width: transfer.percentage.width(),
            size_text: format!(
                "{} / {}",
                format_size(transfer.downloaded_bytes),
                format_size(transfer.total_bytes)
            ),
            speed_text: format_speed(transfer.speed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum UiState {
    /// Nothing running; ready to launch a job.
    #[default]
    Idle,
    /// Polling, no progress seen yet.
    Waiting,
    Downloading(ProgressLine),
    Finished { filename: Option<String> },
    Failed { message: String },
}

#[derive(Default)]
struct Shared {
    ui: UiState,
    last_filename: Option<String>,
    /// Token of the running poll loop, if any.
    active: Option<CancellationToken>,
}

struct Inner {
    source: Arc<dyn StatusSource>,
    view: Arc<dyn ProgressView>,
    shared: Mutex<Shared>,
}

impl Inner {
    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// One poll-and-update. Transport failures are logged and otherwise ignored.
    async fn tick(&self, cancel: &CancellationToken) {
        if cancel.is_cancelled() {
            return;
        }

        let status = match self.source.fetch_status().await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Progress poll failed");
                return;
            }
        };

        let mut shared = self.shared();
        // Checked under the lock: stop() and start() cancel while holding it.
        if cancel.is_cancelled() {
            debug!("Discarding progress reply for a stopped loop");
            return;
        }

        match status {
            JobStatus::Downloading(transfer) => {
                let line = ProgressLine::from(&transfer);
                self.view.on_progress(&line);
                self.view.on_status(
                    StatusKind::Downloading,
                    &format!("Downloading... {}", line.percent_text),
                );
                shared.ui = UiState::Downloading(line);
            }
            JobStatus::Finished { filename } => {
                cancel.cancel();
                shared.active = None;
                info!(filename = filename.as_deref().unwrap_or(""), "Download finished");

                self.view.on_finished(filename.as_deref());
                self.view.on_status(StatusKind::Success, "Download complete");
                self.view
                    .notify(Notice::success("Download completed successfully!"));

                shared.last_filename = filename.clone();
                shared.ui = UiState::Finished { filename };
            }
            JobStatus::Failed { message } => {
                cancel.cancel();
                shared.active = None;
                warn!(error = %message, "Download failed");

                self.view.on_failed(&message);
                self.view.on_status(StatusKind::Error, "Download failed");
                self.view
                    .notify(Notice::error(format!("Download error: {message}")));

                shared.ui = UiState::Failed { message };
            }
            JobStatus::Other(raw) => {
                debug!(status = %raw, "Job not ready yet");
            }
        }
    }
}

async fn run_loop(inner: Arc<Inner>, period: Duration, cancel: CancellationToken) {
    // First poll one period after start.
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => inner.tick(&cancel).await,
        }
    }

    debug!("Polling loop exited");
}

/// Watches the current job. All methods take `&self`; the monitor can be
/// shared with signal handlers and the launcher.
pub struct ProgressMonitor {
    inner: Arc<Inner>,
    interval: Duration,
}

impl ProgressMonitor {
    pub fn new(
        source: Arc<dyn StatusSource>,
        view: Arc<dyn ProgressView>,
        interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                view,
                shared: Mutex::new(Shared::default()),
            }),
            interval: interval.max(MIN_INTERVAL),
        }
    }

    /// Starts polling, replacing any loop that is already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let cancel = CancellationToken::new();
        {
            let mut shared = self.inner.shared();
            if let Some(previous) = shared.active.replace(cancel.clone()) {
                previous.cancel();
                debug!("Replaced running polling loop");
            }
            shared.ui = UiState::Waiting;
            shared.last_filename = None;
        }

        info!(interval_ms = self.interval.as_millis() as u64, "Polling started");
        tokio::spawn(run_loop(Arc::clone(&self.inner), self.interval, cancel));
    }

    /// Stops polling. Does nothing if no loop is running.
    pub fn stop(&self) {
        if let Some(active) = self.inner.shared().active.take() {
            active.cancel();
            info!("Polling stopped");
        }
    }

    /// Polls once right away if a loop is running, leaving its schedule alone.
    pub async fn refresh_now(&self) {
        let active = self.inner.shared().active.clone();
        if let Some(cancel) = active {
            debug!("Out-of-band progress refresh");
            self.inner.tick(&cancel).await;
        }
    }

    /// Resolves once polling has ended and returns the final state.
    ///
    /// A loop replaced by `start()` does not count as ended; the wait carries
    /// over to the new loop.
    pub async fn wait(&self) -> UiState {
        loop {
            let active = self.inner.shared().active.clone();
            match active {
                Some(cancel) => cancel.cancelled().await,
                None => break,
            }
        }
        self.state()
    }

    /// Puts the UI back to its input state after a failed launch.
    pub fn reset(&self) {
        self.stop();
        self.inner.shared().ui = UiState::Idle;
    }

    pub fn is_active(&self) -> bool {
        self.inner.shared().active.is_some()
    }

    pub fn state(&self) -> UiState {
        self.inner.shared().ui.clone()
    }

    pub fn last_filename(&self) -> Option<String> {
        self.inner.shared().last_filename.clone()
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
