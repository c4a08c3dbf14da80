//! Core library for nameplate barcode OCR.
//!
//! This crate provides:
//! - Identification number extraction from ordered OCR text fragments
//! - Category classification from a designated digit
//! - The OCR collaborator boundary (Google Vision text detection)
//! - The report workflow: acceptance decision and notification composition

pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod report;

pub use error::{OcrError, PlatescanError, ReportError, Result};
pub use extract::{scan_fragments, Category, ExtractionResult, FragmentScanner};
pub use models::config::{PlatescanConfig, ReportConfig, ScannerConfig, VisionConfig};
pub use models::report::{ImageAttachment, ReportForm};
pub use ocr::{detect_fragments, DetectionOutcome, JsonFixtureDetector, TextDetector, TextFragment};
#[cfg(feature = "vision")]
pub use ocr::GoogleVisionClient;
pub use report::{Acceptance, ImageScan, Notification, ReportWorkflow, Submission};
