//! Offline detector reading previously captured OCR output.

use serde::Deserialize;

use crate::error::OcrError;

use super::{parse_annotate_response, TextDetector, TextFragment};

#[derive(Deserialize)]
#[serde(untagged)]
enum FixtureEntry {
    Text(String),
    Fragment(TextFragment),
}

/// Detector whose "image" bytes are JSON: either a saved Vision
/// `images:annotate` response or an array of fragment texts.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFixtureDetector;

impl JsonFixtureDetector {
    pub fn new() -> Self {
        Self
    }

    /// Decode fixture bytes into fragments.
    pub fn parse(bytes: &[u8]) -> Result<Vec<TextFragment>, OcrError> {
        let body = std::str::from_utf8(bytes)
            .map_err(|e| OcrError::MalformedResponse(format!("fixture is not UTF-8: {}", e)))?;

        if body.trim_start().starts_with('[') {
            let entries: Vec<FixtureEntry> = serde_json::from_str(body)
                .map_err(|e| OcrError::MalformedResponse(e.to_string()))?;
            return Ok(entries
                .into_iter()
                .map(|entry| match entry {
                    FixtureEntry::Text(text) => TextFragment::new(text),
                    FixtureEntry::Fragment(fragment) => fragment,
                })
                .collect());
        }

        parse_annotate_response(body)
    }
}

impl TextDetector for JsonFixtureDetector {
    async fn detect(&self, image: &[u8]) -> Result<Vec<TextFragment>, OcrError> {
        Self::parse(image)
    }
}
