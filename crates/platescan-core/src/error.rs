//! Error types for the platescan-core library.

use thiserror::Error;

/// Main error type for the platescan library.
#[derive(Error, Debug)]
pub enum PlatescanError {
    /// OCR backend error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Report workflow error.
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised at the OCR collaborator boundary.
///
/// These never reach the scanner: the boundary logs them and hands the
/// scanner an empty fragment list instead.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success HTTP status.
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend reported an error for the image itself.
    #[error("backend error {code}: {message}")]
    Backend { code: i32, message: String },

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// No API key was configured for the backend.
    #[error("no API key configured for the OCR backend")]
    MissingApiKey,
}

/// Errors related to report submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// No submitted image yielded a number of the primary category.
    #[error("a photo showing a {label} barcode number is required")]
    MissingPrimary { label: String },
}

/// Result type for the platescan library.
pub type Result<T> = std::result::Result<T, PlatescanError>;
