// Error types for paddock

use crate::session::SessionKey;
use snafu::Snafu;
use std::io;

/// Broad classification of a failure, used by the presentation layer to tell
/// "nothing to show" apart from "something broke".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    DataShape,
    NotFound,
    Config,
}

#[derive(Debug, Snafu)]
pub enum PaddockError {
    // Errors talking to remote sources
    #[snafu(display("Request to {url} failed"))]
    Transport { url: String, source: reqwest::Error },
    #[snafu(display("Request to {url} returned HTTP {status}"))]
    HttpStatus { url: String, status: u16 },
    #[snafu(display("Timeout after {seconds}s while {operation}"))]
    Timeout { operation: String, seconds: u64 },

    // Errors for data that does not have the expected shape
    #[snafu(display("Malformed response from {url}"))]
    MalformedResponse { url: String, source: reqwest::Error },
    #[snafu(display("Unexpected data shape: {reason}"))]
    DataShape { reason: String },
    #[snafu(display("Error reading session archive {path}"))]
    ArchiveDecode { path: String, source: io::Error },
    #[snafu(display("Unable to load session {key}: {reason}"))]
    SessionLoad { key: SessionKey, reason: String },

    // Lookups with nothing to show
    #[snafu(display("No session found for {key}"))]
    SessionNotFound { key: SessionKey },
    #[snafu(display("Driver {driver} has no timed laps"))]
    NoLaps { driver: String },
    #[snafu(display("No lap {lap_number} recorded for driver {driver}"))]
    LapNotFound { driver: String, lap_number: u32 },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // Errors for the archive writer
    #[snafu(display("Error writing session archive"))]
    WriterError { source: io::Error },
}

impl PaddockError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PaddockError::Transport { .. }
            | PaddockError::HttpStatus { .. }
            | PaddockError::Timeout { .. } => ErrorKind::Transport,
            PaddockError::MalformedResponse { .. }
            | PaddockError::DataShape { .. }
            | PaddockError::ArchiveDecode { .. }
            | PaddockError::SessionLoad { .. } => ErrorKind::DataShape,
            PaddockError::SessionNotFound { .. }
            | PaddockError::NoLaps { .. }
            | PaddockError::LapNotFound { .. } => ErrorKind::NotFound,
            PaddockError::NoConfigDir
            | PaddockError::ConfigIOError { .. }
            | PaddockError::ConfigSerializeError { .. }
            | PaddockError::WriterError { .. } => ErrorKind::Config,
        }
    }

    /// True when the failure means there is simply no data for the request.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
