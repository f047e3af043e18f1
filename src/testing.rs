//! Fakes shared by the unit tests.

use crate::cli::ArtifactAction;
use crate::client::{ArtifactOpener, JobLauncher, StatusSource};
use crate::error::ClientError;
use crate::models::{ActionReply, JobStatus, StartAck};
use crate::monitor::ProgressLine;
use crate::view::{Notice, ProgressView, StatusKind};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub enum Step {
    Reply(JobStatus),
    /// Transport-level failure.
    Fail,
    /// Reply after a delay, to model a slow request.
    Delayed(Duration, JobStatus),
}

/// Plays back a fixed list of poll results, then reports `not_started` forever.
pub struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn fetch_status(&self) -> Result<JobStatus, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Reply(status)) => Ok(status),
            Some(Step::Fail) => Err(ClientError::Status(StatusCode::BAD_GATEWAY)),
            Some(Step::Delayed(delay, status)) => {
                tokio::time::sleep(delay).await;
                Ok(status)
            }
            None => Ok(JobStatus::Other("not_started".to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Status(StatusKind, String),
    Progress(ProgressLine),
    Finished(Option<String>),
    Failed(String),
    Notice(Notice),
}

#[derive(Default)]
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn finished_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ViewEvent::Finished(_)))
            .count()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Notice(notice) => Some(notice),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl ProgressView for RecordingView {
    fn on_status(&self, kind: StatusKind, text: &str) {
        self.push(ViewEvent::Status(kind, text.to_string()));
    }

    fn on_progress(&self, line: &ProgressLine) {
        self.push(ViewEvent::Progress(line.clone()));
    }

    fn on_finished(&self, filename: Option<&str>) {
        self.push(ViewEvent::Finished(filename.map(str::to_string)));
    }

    fn on_failed(&self, message: &str) {
        self.push(ViewEvent::Failed(message.to_string()));
    }

    fn notify(&self, notice: Notice) {
        self.push(ViewEvent::Notice(notice));
    }
}

/// How the fake backend answers launch and action requests.
#[derive(Clone, Copy)]
pub enum Answer {
    Accept,
    Reject,
    Unreachable,
}

pub struct FakeBackend {
    answer: Answer,
    requests: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new(answer: Answer) -> Self {
        Self {
            answer,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobLauncher for FakeBackend {
    async fn start_job(&self, video_url: &str, format_id: &str) -> Result<StartAck, ClientError> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("download {video_url} {format_id}"));
        match self.answer {
            Answer::Accept => Ok(StartAck {
                status: Some("started".to_string()),
                filename: Some("/downloads/video.mp4".to_string()),
                error: None,
            }),
            Answer::Reject => Err(ClientError::Rejected("Selected format not found".to_string())),
            Answer::Unreachable => Err(ClientError::Status(StatusCode::SERVICE_UNAVAILABLE)),
        }
    }
}

#[async_trait]
impl ArtifactOpener for FakeBackend {
    async fn open(
        &self,
        action: ArtifactAction,
        filename: &str,
    ) -> Result<ActionReply, ClientError> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("{action:?} {filename}"));
        match self.answer {
            Answer::Accept => Ok(ActionReply {
                status: Some("success".to_string()),
                error: None,
            }),
            Answer::Reject => Ok(ActionReply {
                status: None,
                error: Some("Permission denied".to_string()),
            }),
            Answer::Unreachable => Err(ClientError::Status(StatusCode::SERVICE_UNAVAILABLE)),
        }
    }
}
