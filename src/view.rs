use crate::monitor::ProgressLine;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Downloading,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl NoticeLevel {
    fn marker(self) -> &'static str {
        match self {
            NoticeLevel::Success => "+",
            NoticeLevel::Error => "x",
            NoticeLevel::Warning => "!",
            NoticeLevel::Info => "i",
        }
    }

    fn default_title(self) -> &'static str {
        match self {
            NoticeLevel::Success => "Success",
            NoticeLevel::Error => "Error",
            NoticeLevel::Warning => "Warning",
            NoticeLevel::Info => "Info",
        }
    }
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            title: level.default_title().to_string(),
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }
}

/// Receives UI transitions from the monitor and the launcher.
///
/// Calls may come from the polling task, so implementations must be `Send + Sync`
/// and should not block.
pub trait ProgressView: Send + Sync {
    fn on_status(&self, kind: StatusKind, text: &str);
    fn on_progress(&self, line: &ProgressLine);
    fn on_finished(&self, filename: Option<&str>);
    fn on_failed(&self, message: &str);
    fn notify(&self, notice: Notice);
}

/// Renders the job on the terminal with a single progress bar.
pub struct TerminalView {
    bar: ProgressBar,
}

impl TerminalView {
    pub fn new() -> Result<Self> {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:28} {bar:40} {msg}")?
                .progress_chars("=>-"),
        );
        Ok(Self { bar })
    }
}

impl ProgressView for TerminalView {
    fn on_status(&self, kind: StatusKind, text: &str) {
        if kind == StatusKind::Downloading && self.bar.is_finished() {
            self.bar.reset();
        }
        self.bar.set_prefix(text.to_string());
    }

    fn on_progress(&self, line: &ProgressLine) {
        self.bar.set_position(line.percent_width.round() as u64);
        self.bar
            .set_message(format!("{} ({})", line.size_text, line.speed_text));
    }

    fn on_finished(&self, filename: Option<&str>) {
        self.bar.set_position(100);
        self.bar
            .finish_with_message(filename.unwrap_or_default().to_string());
    }

    fn on_failed(&self, message: &str) {
        self.bar.abandon_with_message(message.to_string());
    }

    fn notify(&self, notice: Notice) {
        self.bar
            .println(format!("[{}] {}: {}", notice.level.marker(), notice.title, notice.message));
    }
}
