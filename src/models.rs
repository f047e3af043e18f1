use serde::Deserialize;

/// Reply to a job launch request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartAck {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StartAck {
    pub fn is_accepted(&self) -> bool {
        matches!(self.status.as_deref(), Some("started" | "success"))
    }
}

/// Reply to an open-file / open-location request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionReply {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ActionReply {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

/// Server-reported completion, either `"45.20%"` or `45.2`.
///
/// The server value is authoritative and is never recomputed from byte counts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Percentage {
    Number(f64),
    Text(String),
}

impl Default for Percentage {
    fn default() -> Self {
        Percentage::Text("0%".to_string())
    }
}

impl Percentage {
    /// Text shown to the user.
    pub fn text(&self) -> String {
        match self {
            Percentage::Number(n) => format!("{n:.2}%"),
            Percentage::Text(s) => s.clone(),
        }
    }

    /// Bar fill in `0..=100`. Unparseable text gives `0`.
    pub fn width(&self) -> f64 {
        let value = match self {
            Percentage::Number(n) => Some(*n),
            Percentage::Text(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        };
        value
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 100.0))
            .unwrap_or(0.0)
    }
}

/// Raw body of the progress endpoint. Which fields are set depends on `status`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressPayload {
    pub status: String,
    #[serde(default)]
    pub downloaded_bytes: Option<u64>,
    #[serde(default)]
    pub total_bytes: Option<u64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub percentage: Option<Percentage>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub downloaded_bytes: u64,
    pub total_bytes: u64,
    pub speed: f64,
    pub percentage: Percentage,
}

/// One poll's worth of job state.
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Downloading(Transfer),
    Finished { filename: Option<String> },
    Failed { message: String },
    /// Any status this client does not act on, e.g. `not_started`.
    Other(String),
}

impl From<ProgressPayload> for JobStatus {
    fn from(payload: ProgressPayload) -> Self {
        match payload.status.as_str() {
            "downloading" => JobStatus::Downloading(Transfer {
                downloaded_bytes: payload.downloaded_bytes.unwrap_or(0),
                total_bytes: payload.total_bytes.unwrap_or(0),
                speed: payload.speed.unwrap_or(0.0),
                percentage: payload.percentage.unwrap_or_default(),
            }),
            "finished" => JobStatus::Finished {
                filename: payload.filename.filter(|f| !f.is_empty()),
            },
            "error" => JobStatus::Failed {
                message: payload
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| "Unknown error".to_string()),
            },
            _ => JobStatus::Other(payload.status),
        }
    }
}
