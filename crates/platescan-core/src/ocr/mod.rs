//! OCR collaborator boundary.
//!
//! The scanner never talks to an OCR backend. Detectors turn image bytes
//! into ordered text fragments, and [`detect_fragments`] folds every
//! detector failure into an empty fragment list while keeping the failure
//! text for diagnostics.

mod fixture;
mod vision;

pub use fixture::JsonFixtureDetector;
pub use vision::parse_annotate_response;
#[cfg(feature = "vision")]
pub use vision::GoogleVisionClient;

use std::future::Future;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::OcrError;

/// One OCR-detected text region.
///
/// The backend's ordering is significant: the first fragment is normally
/// the aggregate of all text on the image, followed by individual blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Raw recognized text, possibly spanning several lines.
    pub text: String,
}

impl TextFragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl From<&str> for TextFragment {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for TextFragment {
    fn from(text: String) -> Self {
        Self { text }
    }
}

/// Source of text fragments for an image.
pub trait TextDetector {
    /// Detect text in raw image bytes, preserving the backend's ordering.
    fn detect(
        &self,
        image: &[u8],
    ) -> impl Future<Output = Result<Vec<TextFragment>, OcrError>> + Send;
}

/// Fragments handed to the scanner, plus the diagnostic side channel.
#[derive(Debug, Clone, Default)]
pub struct DetectionOutcome {
    /// Detected fragments; empty when nothing was found or detection failed.
    pub fragments: Vec<TextFragment>,

    /// Failure description when the detector errored.
    pub failure: Option<String>,

    /// Time spent in the detector, in milliseconds.
    pub elapsed_ms: u64,
}

impl DetectionOutcome {
    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// Run a detector, collapsing failures into an empty fragment list.
pub async fn detect_fragments<D: TextDetector>(detector: &D, image: &[u8]) -> DetectionOutcome {
    let start = Instant::now();
    let result = detector.detect(image).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(fragments) => {
            debug!("Detected {} text fragments in {}ms", fragments.len(), elapsed_ms);
            DetectionOutcome {
                fragments,
                failure: None,
                elapsed_ms,
            }
        }
        Err(e) => {
            warn!("OCR detection failed after {}ms: {}", elapsed_ms, e);
            DetectionOutcome {
                fragments: Vec::new(),
                failure: Some(e.to_string()),
                elapsed_ms,
            }
        }
    }
}
