use shared::error::{ErrorCode, ProblemDetails};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CityClientError {
    #[error("http transport failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {status} ({code:?}): {}", problem.summary())]
    Status {
        code: ErrorCode,
        status: u16,
        problem: ProblemDetails,
    },
    #[error("invalid logo payload: {0}")]
    InvalidLogo(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl CityClientError {
    pub fn status(status: u16, problem: ProblemDetails) -> Self {
        Self::Status {
            code: ErrorCode::from_status(status),
            status,
            problem,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Status {
                code: ErrorCode::NotFound,
                ..
            }
        )
    }
}

pub type ClientResult<T> = Result<T, CityClientError>;
