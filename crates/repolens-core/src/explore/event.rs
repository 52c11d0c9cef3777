use serde::{Deserialize, Serialize};

/// Progress step names, in the order a successful run emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Init,
    Fetched,
    Thinking,
    Plan,
    Download,
    Indexing,
    Generating,
    ReportChunk,
    Finish,
    Error,
}

impl Step {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Fetched => "fetched",
            Self::Thinking => "thinking",
            Self::Plan => "plan",
            Self::Download => "download",
            Self::Indexing => "indexing",
            Self::Generating => "generating",
            Self::ReportChunk => "report_chunk",
            Self::Finish => "finish",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One progress event of an exploration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExploreEvent {
    pub step: Step,
    pub message: String,
}

impl ExploreEvent {
    #[must_use]
    pub fn new(step: Step, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
        }
    }

    /// `finish` and `error` end the event sequence.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.step, Step::Finish | Step::Error)
    }

    /// Single-line JSON form, as streamed to transports.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
