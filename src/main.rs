mod cli;
mod client;
mod config;
mod error;
mod format;
mod launcher;
mod models;
mod monitor;
mod view;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use cli::Args;
use client::JobClient;
use config::Settings;
use monitor::{ProgressMonitor, UiState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use view::{Notice, NoticeLevel, ProgressView, TerminalView};

/// Forces an out-of-band poll; `SIGUSR1` on unix.
struct RefreshSignal {
    #[cfg(unix)]
    inner: tokio::signal::unix::Signal,
}

impl RefreshSignal {
    fn new() -> Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            inner: tokio::signal::unix::signal(tokio::signal::unix::SignalKind::user_defined1())
                .context("Failed to install SIGUSR1 handler")?,
        })
    }

    async fn recv(&mut self) {
        #[cfg(unix)]
        {
            if self.inner.recv().await.is_some() {
                return;
            }
        }
        std::future::pending::<()>().await
    }
}

/// Waits for the job to end while honouring Ctrl-C and refresh requests.
async fn supervise(monitor: &ProgressMonitor) -> Result<UiState> {
    let mut refresh = RefreshSignal::new()?;

    loop {
        tokio::select! {
            state = monitor.wait() => return Ok(state),
            interrupted = tokio::signal::ctrl_c() => {
                interrupted.context("Failed to listen for Ctrl-C")?;
                monitor.stop();
                return Err(anyhow!("Interrupted before the download finished"));
            }
            _ = refresh.recv() => monitor.refresh_now().await,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ytdl_watch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let settings = Settings::from_args(&args)?;

    tracing::info!(
        server = %settings.server,
        progress = %settings.endpoints.progress,
        interval_ms = settings.interval.as_millis() as u64,
        "Connecting to download service"
    );

    let client = Arc::new(JobClient::from_settings(&settings)?);
    let view = Arc::new(TerminalView::new()?);
    let monitor = ProgressMonitor::new(client.clone(), view.clone(), settings.interval);

    match &settings.launch {
        Some(request) => {
            launcher::launch(&*client, &monitor, &*view, request)
                .await
                .context("Failed to start download")?;
        }
        None => {
            view.notify(Notice::new(NoticeLevel::Info, "Watching the current download"));
            monitor.start();
        }
    }

    match supervise(&monitor).await? {
        UiState::Finished { .. } => {
            if let Some(action) = settings.open {
                let filename = monitor.last_filename();
                launcher::open_artifact(&*client, &*view, action, filename.as_deref()).await;
            }
            Ok(())
        }
        UiState::Failed { message } => Err(anyhow!("Download failed: {}", message)),
        other => Err(anyhow!("Stopped watching before the job ended ({:?})", other)),
    }
}
