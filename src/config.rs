use crate::cli::{ArtifactAction, Args};
use crate::launcher::LaunchRequest;
use anyhow::{Context, Result, bail};
use std::time::Duration;
use url::Url;

/// Endpoint paths on the download service, relative to the server URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub download: String,
    pub progress: String,
    pub open_location: String,
    pub open_file: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            download: "/api/download".to_string(),
            progress: "/api/progress".to_string(),
            open_location: "/api/open_location".to_string(),
            open_file: "/api/open_file".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: Url,
    pub endpoints: Endpoints,
    pub interval: Duration,
    pub request_timeout: Duration,
    pub proxy: Option<String>,
    /// `None` when attaching to an already running job.
    pub launch: Option<LaunchRequest>,
    pub open: Option<ArtifactAction>,
}

impl Settings {
    pub fn from_args(args: &Args) -> Result<Self> {
        let server = Url::parse(&args.server)
            .with_context(|| format!("Invalid server URL: {}", args.server))?;
        if server.cannot_be_a_base() || !matches!(server.scheme(), "http" | "https") {
            bail!("Server URL must be an http(s) URL: {}", args.server);
        }

        let launch = if args.watch_only {
            None
        } else {
            let video_url = args
                .url
                .clone()
                .context("--url is required unless --watch-only is set")?;
            Some(LaunchRequest {
                video_url,
                format_id: args.format.clone().unwrap_or_default(),
            })
        };

        Ok(Self {
            server,
            endpoints: Endpoints {
                download: absolute_path(&args.download_path),
                progress: absolute_path(&args.progress_path),
                open_location: absolute_path(&args.open_location_path),
                open_file: absolute_path(&args.open_file_path),
            },
            interval: Duration::from_millis(args.interval_ms),
            request_timeout: Duration::from_secs(args.timeout_secs),
            proxy: args.proxy.clone(),
            launch,
            open: args.open,
        })
    }
}

fn absolute_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
