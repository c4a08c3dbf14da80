//! Report submission workflow.
//!
//! Every photo in a submission is detected and scanned on its own. The
//! submission is accepted only when at least one photo yields a
//! primary-category number; OCR failures on individual photos count as
//! "no number" and never fail the submission by themselves.

mod notification;

pub use notification::{compose, escape_html, merge_numbers, Notification};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::ReportError;
use crate::extract::{ExtractionResult, FragmentScanner};
use crate::models::config::{PlatescanConfig, ReportConfig};
use crate::models::report::{ImageAttachment, ReportForm};
use crate::ocr::{detect_fragments, TextDetector};

/// Outcome of detecting and scanning one photo.
#[derive(Debug, Clone, Serialize)]
pub struct ImageScan {
    pub filename: String,

    /// Extracted number, absent when none was found or OCR failed.
    pub result: Option<ExtractionResult>,

    /// OCR failure, kept apart from "no number found" for diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_failure: Option<String>,

    pub fragment_count: usize,
}

/// An accepted submission's extracted numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acceptance {
    /// The number recorded for the submission: the last primary number.
    pub representative_number: String,

    /// Extracted primary numbers, in submission order.
    pub primary_numbers: Vec<String>,

    /// Extracted secondary numbers, in submission order.
    pub secondary_numbers: Vec<String>,
}

/// An accepted submission with its composed notification.
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub acceptance: Acceptance,
    pub scans: Vec<ImageScan>,
    pub notification: Notification,
}

/// Drives detection, acceptance, and notification for report submissions.
#[derive(Debug, Clone)]
pub struct ReportWorkflow {
    scanner: FragmentScanner,
    config: ReportConfig,
}

impl ReportWorkflow {
    pub fn new(config: &PlatescanConfig) -> Self {
        Self {
            scanner: FragmentScanner::new(config.scanner.clone()),
            config: config.report.clone(),
        }
    }

    /// Decide acceptance from per-image results in submission order.
    pub fn evaluate(
        &self,
        results: &[Option<ExtractionResult>],
    ) -> Result<Acceptance, ReportError> {
        let mut primary_numbers = Vec::new();
        let mut secondary_numbers = Vec::new();

        for result in results.iter().flatten() {
            let bucket = if result.category().is_primary() {
                &mut primary_numbers
            } else {
                &mut secondary_numbers
            };
            bucket.push(result.number().to_string());
        }

        let representative_number =
            primary_numbers
                .last()
                .cloned()
                .ok_or_else(|| ReportError::MissingPrimary {
                    label: self.config.primary_label.clone(),
                })?;

        Ok(Acceptance {
            representative_number,
            primary_numbers,
            secondary_numbers,
        })
    }

    /// Detect and scan each photo independently, in order.
    pub async fn scan_images<D: TextDetector>(
        &self,
        detector: &D,
        images: &[ImageAttachment],
    ) -> Vec<ImageScan> {
        let mut scans = Vec::with_capacity(images.len());

        for image in images {
            let outcome = detect_fragments(detector, &image.bytes).await;
            let result = self.scanner.scan(&outcome.fragments);

            if let Some(failure) = &outcome.failure {
                warn!("OCR failed for {}: {}", image.filename, failure);
            }

            scans.push(ImageScan {
                filename: image.filename.clone(),
                result,
                fragment_count: outcome.fragments.len(),
                ocr_failure: outcome.failure,
            });
        }

        scans
    }

    /// Run a complete submission: scan, accept or reject, compose.
    pub async fn submit<D: TextDetector>(
        &self,
        detector: &D,
        form: &ReportForm,
        images: Vec<ImageAttachment>,
    ) -> Result<Submission, ReportError> {
        let scans = self.scan_images(detector, &images).await;
        let results: Vec<Option<ExtractionResult>> =
            scans.iter().map(|scan| scan.result.clone()).collect();

        let acceptance = self.evaluate(&results)?;
        info!(
            "Accepted report {} with {} number {}",
            form.receipt_no, self.config.primary_label, acceptance.representative_number
        );

        let notification = compose(&self.config, form, &acceptance, images);

        Ok(Submission {
            acceptance,
            scans,
            notification,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use crate::extract::Category;
    use crate::ocr::{JsonFixtureDetector, TextFragment};
    use pretty_assertions::assert_eq;

    fn workflow() -> ReportWorkflow {
        ReportWorkflow::new(&PlatescanConfig::default())
    }

    fn primary(n: &str) -> Option<ExtractionResult> {
        Some(ExtractionResult::new(n, Category::Primary))
    }

    fn secondary(n: &str) -> Option<ExtractionResult> {
        Some(ExtractionResult::new(n, Category::Secondary))
    }

    fn fixture(name: &str, texts: &[&str]) -> ImageAttachment {
        ImageAttachment::new(name, serde_json::to_vec(texts).unwrap())
    }

    #[test]
    fn test_evaluate_requires_primary() {
        let err = workflow()
            .evaluate(&[None, secondary("0000000005000000000000")])
            .unwrap_err();
        assert_eq!(
            err,
            ReportError::MissingPrimary {
                label: "Chassis".to_string()
            }
        );
        assert!(workflow().evaluate(&[]).is_err());
    }

    #[test]
    fn test_evaluate_keeps_last_primary() {
        let acceptance = workflow()
            .evaluate(&[
                primary("A"),
                secondary("S"),
                None,
                primary("B"),
            ])
            .unwrap();
        assert_eq!(acceptance.representative_number, "B");
        assert_eq!(acceptance.primary_numbers, vec!["A", "B"]);
        assert_eq!(acceptance.secondary_numbers, vec!["S"]);
    }

    struct FlakyDetector;

    impl TextDetector for FlakyDetector {
        async fn detect(&self, image: &[u8]) -> Result<Vec<TextFragment>, OcrError> {
            if image == b"broken" {
                Err(OcrError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                })
            } else {
                JsonFixtureDetector::parse(image)
            }
        }
    }

    #[tokio::test]
    async fn test_submit_accepts_with_primary() {
        let form = ReportForm {
            receipt_no: "R-7".to_string(),
            ..Default::default()
        };
        let images = vec![
            fixture("module.jpg", &["MOD 0000000005000000000000"]),
            ImageAttachment::new("broken.jpg", b"broken".to_vec()),
            fixture("chassis.jpg", &["ABC", "1111111111222222222222"]),
        ];

        let submission = workflow().submit(&FlakyDetector, &form, images).await.unwrap();

        assert_eq!(
            submission.acceptance.representative_number,
            "1111111111222222222222"
        );
        assert_eq!(submission.scans.len(), 3);
        assert!(submission.scans[1].result.is_none());
        assert!(submission.scans[1].ocr_failure.is_some());
        assert_eq!(
            submission.scans[0].result.as_ref().map(|r| r.category()),
            Some(Category::Secondary)
        );
        assert_eq!(submission.notification.attachments.len(), 3);
        assert!(submission.notification.subject.ends_with("R-7"));
    }

    #[tokio::test]
    async fn test_submit_rejects_without_primary() {
        let images = vec![
            fixture("module.jpg", &["0000000005000000000000"]),
            fixture("blank.jpg", &[]),
        ];
        let result = workflow()
            .submit(&FlakyDetector, &ReportForm::default(), images)
            .await;
        assert!(matches!(result, Err(ReportError::MissingPrimary { .. })));
    }
}
