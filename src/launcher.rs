use crate::cli::ArtifactAction;
use crate::client::{ArtifactOpener, JobLauncher};
use crate::error::LaunchError;
use crate::models::StartAck;
use crate::monitor::ProgressMonitor;
use crate::view::{Notice, ProgressView, StatusKind};
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub video_url: String,
    pub format_id: String,
}

/// Starts a job and, once the service acknowledges it, starts polling.
///
/// On failure the monitor is reset to its idle state so a new launch can follow.
pub async fn launch(
    launcher: &dyn JobLauncher,
    monitor: &ProgressMonitor,
    view: &dyn ProgressView,
    request: &LaunchRequest,
) -> Result<StartAck, LaunchError> {
    if request.format_id.trim().is_empty() {
        view.notify(Notice::warning(LaunchError::MissingFormat.to_string()));
        return Err(LaunchError::MissingFormat);
    }

    monitor.stop();
    view.on_status(StatusKind::Downloading, "Downloading...");
    info!(url = %request.video_url, format = %request.format_id, "Starting download");

    match launcher
        .start_job(&request.video_url, &request.format_id)
        .await
    {
        Ok(ack) => {
            info!(filename = ack.filename.as_deref().unwrap_or(""), "Download accepted");
            monitor.start();
            view.notify(Notice::success("Download started successfully"));
            Ok(ack)
        }
        Err(e) => {
            error!(error = %e, "Download failed to start");
            view.notify(Notice::error(e.to_string()));
            monitor.reset();
            view.on_status(StatusKind::Error, "Download failed");
            Err(e.into())
        }
    }
}

/// Runs `action` on the finished artifact. Returns whether the service reported success.
pub async fn open_artifact(
    opener: &dyn ArtifactOpener,
    view: &dyn ProgressView,
    action: ArtifactAction,
    filename: Option<&str>,
) -> bool {
    let Some(filename) = filename else {
        view.notify(Notice::warning("No file to open"));
        return false;
    };

    let (done, failed) = match action {
        ArtifactAction::File => ("File opened successfully", "Failed to open file"),
        ArtifactAction::Location => ("File location opened", "Failed to open file location"),
    };

    match opener.open(action, filename).await {
        Ok(reply) if reply.is_success() => {
            view.notify(Notice::success(done));
            true
        }
        Ok(reply) => {
            view.notify(Notice::error(reply.error.unwrap_or_else(|| failed.to_string())));
            false
        }
        Err(e) => {
            warn!(error = %e, ?action, "Artifact action failed");
            view.notify(Notice::error(failed));
            false
        }
    }
}
