use clap::{Parser, ValueEnum};

/// What to do with the artifact once the job has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ArtifactAction {
    /// Open the downloaded file with its default application
    File,
    /// Reveal the downloaded file in the file manager
    Location,
}

#[derive(Parser, Debug)]
#[command(name = "ytdl-watch")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Base URL of the download service
    #[arg(short, long, env = "YTDL_SERVER", default_value = "http://127.0.0.1:5000")]
    pub server: String,

    /// Video URL to download
    #[arg(short, long, required_unless_present = "watch_only")]
    pub url: Option<String>,

    /// Format identifier to download
    #[arg(short, long, required_unless_present = "watch_only")]
    pub format: Option<String>,

    /// Attach to the job that is already running instead of starting one
    #[arg(long, conflicts_with_all = ["url", "format"])]
    pub watch_only: bool,

    /// Milliseconds between progress polls
    #[arg(short, long, default_value = "500", value_parser = clap::value_parser!(u64).range(50..=60_000))]
    pub interval_ms: u64,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// Path of the job launch endpoint
    #[arg(long, default_value = "/api/download")]
    pub download_path: String,

    /// Path of the job progress endpoint
    #[arg(long, default_value = "/api/progress")]
    pub progress_path: String,

    /// Path prefix of the open-location action
    #[arg(long, default_value = "/api/open_location")]
    pub open_location_path: String,

    /// Path prefix of the open-file action
    #[arg(long, default_value = "/api/open_file")]
    pub open_file_path: String,

    /// Action to run on the finished download
    #[arg(short, long, value_enum)]
    pub open: Option<ArtifactAction>,

    /// HTTP proxy (e.g., http://127.0.0.1:7890)
    #[arg(long)]
    pub proxy: Option<String>,
}
