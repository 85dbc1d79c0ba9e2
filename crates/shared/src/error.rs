use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Internal,
    Unknown,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 409 | 422 => Self::Validation,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            500..=599 => Self::Internal,
            _ => Self::Unknown,
        }
    }
}

/// Problem body returned by the remote side on failed requests. Every field is
/// optional because proxies and auth layers answer with partial bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub detail: Option<String>,
    /// Message key such as `error.idexists`.
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub params: Option<String>,
}

impl ProblemDetails {
    pub fn summary(&self) -> String {
        let head = self
            .title
            .as_deref()
            .or(self.detail.as_deref())
            .unwrap_or("request failed");
        match &self.message {
            Some(key) => format!("{head} ({key})"),
            None => head.to_string(),
        }
    }
}
