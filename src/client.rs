use crate::cli::ArtifactAction;
use crate::config::{Endpoints, Settings};
use crate::error::ClientError;
use crate::models::{ActionReply, JobStatus, ProgressPayload, StartAck};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Anything that can report the status of the current job.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self) -> Result<JobStatus, ClientError>;
}

/// Starts a job on the download service.
#[async_trait]
pub trait JobLauncher: Send + Sync {
    async fn start_job(&self, video_url: &str, format_id: &str) -> Result<StartAck, ClientError>;
}

/// Runs an action against a finished artifact.
#[async_trait]
pub trait ArtifactOpener: Send + Sync {
    async fn open(
        &self,
        action: ArtifactAction,
        filename: &str,
    ) -> Result<ActionReply, ClientError>;
}

pub struct JobClient {
    client: Client,
    server: Url,
    endpoints: Endpoints,
}

impl JobClient {
    pub fn new(
        mut server: Url,
        endpoints: Endpoints,
        timeout: Duration,
        proxy: Option<&str>,
    ) -> Result<Self> {
        let mut client_builder = Client::builder().timeout(timeout);

        if let Some(proxy_url) = proxy {
            client_builder = client_builder.proxy(reqwest::Proxy::http(proxy_url)?);
        }

        let client = client_builder
            .build()
            .context("Failed to build HTTP client")?;

        // Endpoints resolve below the server path, e.g. `http://host/ytdl/`.
        if !server.path().ends_with('/') {
            let path = format!("{}/", server.path());
            server.set_path(&path);
        }

        Ok(Self {
            client,
            server,
            endpoints,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.server.clone(),
            settings.endpoints.clone(),
            settings.request_timeout,
            settings.proxy.as_deref(),
        )
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.server.join(path.trim_start_matches('/'))?)
    }

    /// Action URL with the filename as a single percent-encoded path segment.
    fn action_url(&self, action: ArtifactAction, filename: &str) -> Result<Url, ClientError> {
        let prefix = match action {
            ArtifactAction::File => &self.endpoints.open_file,
            ArtifactAction::Location => &self.endpoints.open_location,
        };
        let mut url = self.endpoint(prefix)?;
        url.path_segments_mut()
            .map_err(|_| ClientError::CannotBeABase(self.server.to_string()))?
            .pop_if_empty()
            .push(filename);
        Ok(url)
    }
}

/// Decodes a JSON body, falling back to the HTTP status when the body is unusable.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;
    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(ClientError::Status(status)),
        Err(e) => Err(ClientError::Decode(e)),
    }
}

#[async_trait]
impl StatusSource for JobClient {
    async fn fetch_status(&self) -> Result<JobStatus, ClientError> {
        let url = self.endpoint(&self.endpoints.progress)?;
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        let payload: ProgressPayload = decode(response).await?;
        debug!(status = %payload.status, "progress reply");
        Ok(payload.into())
    }
}

#[async_trait]
impl JobLauncher for JobClient {
    async fn start_job(&self, video_url: &str, format_id: &str) -> Result<StartAck, ClientError> {
        let url = self.endpoint(&self.endpoints.download)?;
        let response = self
            .client
            .post(url)
            .form(&[("url", video_url), ("format", format_id)])
            .send()
            .await?;

        let ack: StartAck = decode(response).await?;
        if ack.is_accepted() {
            Ok(ack)
        } else {
            Err(ClientError::Rejected(
                ack.error
                    .unwrap_or_else(|| "Download failed to start".to_string()),
            ))
        }
    }
}

#[async_trait]
impl ArtifactOpener for JobClient {
    async fn open(
        &self,
        action: ArtifactAction,
        filename: &str,
    ) -> Result<ActionReply, ClientError> {
        let url = self.action_url(action, filename)?;
        let response = self.client.get(url).send().await?;
        decode(response).await
    }
}
