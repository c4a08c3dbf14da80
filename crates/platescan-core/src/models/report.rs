//! Report submission data models.

use serde::{Deserialize, Serialize};

/// Fields the installer fills in on the acceptance test report form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportForm {
    /// Employee number of the submitting installer.
    pub employee_id: String,

    /// Name of the submitting installer.
    pub name: String,

    /// Order receipt number; used in the notification subject.
    pub receipt_no: String,

    /// Management IP address of the installed ONU.
    pub onu_ip: String,

    /// Where the equipment was installed.
    pub install_location: String,

    /// Where the circuit breaker is.
    pub breaker_location: String,

    /// Site access procedure.
    pub access_procedure: String,

    /// Optical power reading.
    pub optical_db: String,

    /// Primary-category numbers typed in by hand.
    pub primary_numbers: Vec<String>,

    /// Secondary-category numbers typed in by hand.
    pub secondary_numbers: Vec<String>,
}

impl ReportForm {
    /// Check the form for missing information.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.receipt_no.trim().is_empty() {
            issues.push("Missing receipt number".to_string());
        }

        if self.employee_id.trim().is_empty() {
            issues.push("Missing employee ID".to_string());
        }

        if self.name.trim().is_empty() {
            issues.push("Missing name".to_string());
        }

        issues
    }
}

/// An uploaded photo, attached unchanged to the notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAttachment {
    /// Original file name.
    pub filename: String,

    /// MIME type sniffed from the content.
    pub content_type: String,

    /// Raw file bytes.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    /// Wrap uploaded bytes, detecting the image type from its magic bytes.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let content_type = image::guess_format(&bytes)
            .map(|format| format.to_mime_type())
            .unwrap_or("application/octet-stream")
            .to_string();

        Self {
            filename: filename.into(),
            content_type,
            bytes,
        }
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
