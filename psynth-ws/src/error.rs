//! Error types for psynth-ws

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::archive::ArchiveError;

/// Service error type
///
/// A session-busy `CreateSynth` is not represented here: it is a defined
/// alternate outcome of session creation and is answered with a declined
/// response envelope, not an error status.
#[derive(Debug, Error)]
pub enum SynthError {
    /// Operation requires a synth in progress and none exists
    #[error("No synth in progress")]
    NoActiveSession,

    /// Upload or resolve referenced a fingerprint that was never registered
    #[error("Unknown image fingerprint: {0}")]
    UnknownFingerprint(String),

    /// I/O, extraction, or rename failure while staging one upload.
    /// Local to the failed call; the session stays active.
    #[error("Upload staging failed: {0}")]
    UploadStagingFailed(#[source] ArchiveError),

    /// Manifest parse or packaging failure during commit.
    /// The session is always released afterwards.
    #[error("Commit failed: {0}")]
    CommitFailed(String),

    /// Malformed request (missing field, bad identifier)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// IO error outside the staging path
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntoResponse for SynthError {
    fn into_response(self) -> Response {
        let status = match self {
            SynthError::NoActiveSession
            | SynthError::UnknownFingerprint(_)
            | SynthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            SynthError::UploadStagingFailed(_)
            | SynthError::CommitFailed(_)
            | SynthError::Io(_)
            | SynthError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // The legacy clients only look at the status line; keep bodies plain text
        (status, self.to_string()).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, SynthError>;
