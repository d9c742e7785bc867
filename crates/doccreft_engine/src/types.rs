use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

pub type RequestId = u64;

/// One file accepted by `POST /api/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedFile {
    pub original_name: String,
    pub server_name: String,
}

/// A PDF produced by convert, merge, rotate or delete-pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfOutput {
    pub pdf_url: String,
    pub filename: String,
}

/// A JPEG produced by `POST /api/compress`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressOutput {
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    CounterLoaded(Result<u64, ApiError>),
    Uploaded {
        request_id: RequestId,
        result: Result<Vec<UploadedFile>, ApiError>,
    },
    PdfReady {
        request_id: RequestId,
        result: Result<PdfOutput, ApiError>,
    },
    Compressed {
        request_id: RequestId,
        index: usize,
        result: Result<CompressOutput, ApiError>,
    },
    Saved {
        request_id: RequestId,
        result: Result<PathBuf, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// True when the backend answered but refused the request, as opposed to
    /// the request never producing a usable answer.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self.kind,
            FailureKind::HttpStatus(_) | FailureKind::MissingField(_)
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    MissingField(&'static str),
    Io,
    TooLarge { max_bytes: u64, actual: Option<u64> },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::MissingField(field) => write!(f, "response missing `{field}`"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
        }
    }
}
