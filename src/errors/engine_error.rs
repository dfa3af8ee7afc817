use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineErrorKind {
    Config,
    Transport,
    Timeout,
    Aborted,
    InvalidIndex,
    Internal,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineError {
    pub kind: EngineErrorKind,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub retryable: bool,
}

impl EngineError {
    pub fn new(kind: EngineErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            hint: None,
            details: None,
            retryable: matches!(kind, EngineErrorKind::Transport | EngineErrorKind::Timeout),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::Config, "CONFIG", message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::Transport, "TRANSPORT", message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::Timeout, "TIMEOUT", message)
    }

    pub fn aborted(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::Aborted, "ABORTED", message)
    }

    pub fn invalid_index(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::InvalidIndex, "INVALID_INDEX", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::Internal, "INTERNAL", message)
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for EngineError {}
