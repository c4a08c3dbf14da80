//! Configuration structures for the scanning and reporting pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{PlatescanError, Result};

/// Environment variable that overrides `vision.api_key`.
pub const API_KEY_ENV: &str = "GOOGLE_VISION_API_KEY";

/// Main configuration for platescan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatescanConfig {
    /// Number extraction and classification policy.
    pub scanner: ScannerConfig,

    /// OCR backend configuration.
    pub vision: VisionConfig,

    /// Report notification configuration.
    pub report: ReportConfig,
}

/// Identification number policy used by the fragment scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Exact number of digits an identification number has.
    pub digit_count: usize,

    /// Zero-based index of the digit that decides the category.
    pub classify_position: usize,

    /// Digit value at `classify_position` that selects the primary category.
    pub classify_trigger: char,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            digit_count: 22,
            classify_position: 9,
            classify_trigger: '1',
        }
    }
}

impl ScannerConfig {
    /// Check that the policy is internally consistent.
    pub fn validate(&self) -> Result<()> {
        if self.digit_count == 0 {
            return Err(PlatescanError::Config(
                "scanner.digit_count must be positive".to_string(),
            ));
        }
        if self.classify_position >= self.digit_count {
            return Err(PlatescanError::Config(format!(
                "scanner.classify_position ({}) must be below scanner.digit_count ({})",
                self.classify_position, self.digit_count
            )));
        }
        if !self.classify_trigger.is_ascii_digit() {
            return Err(PlatescanError::Config(format!(
                "scanner.classify_trigger must be a digit, got {:?}",
                self.classify_trigger
            )));
        }
        Ok(())
    }
}

/// Google Vision text detection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// `images:annotate` endpoint, without the key parameter.
    pub endpoint: String,

    /// API key. `GOOGLE_VISION_API_KEY` takes precedence when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl VisionConfig {
    /// Resolve the API key, preferring the environment over the file.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key_with_override(std::env::var(API_KEY_ENV).ok())
    }

    /// Pick `override_key` when it is non-blank, the configured key otherwise.
    pub fn api_key_with_override(&self, override_key: Option<String>) -> Option<String> {
        override_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone())
    }
}

/// Notification composition settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Address the report notification is sent to.
    pub recipient: String,

    /// Sender address.
    pub sender: String,

    /// Subject prefix; the receipt number is appended.
    pub subject_prefix: String,

    /// Display label for primary-category numbers.
    pub primary_label: String,

    /// Display label for secondary-category numbers.
    pub secondary_label: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            recipient: "reports@example.com".to_string(),
            sender: "platescan@example.com".to_string(),
            subject_prefix: "[Prom] Acceptance test report - ".to_string(),
            primary_label: "Chassis".to_string(),
            secondary_label: "Module".to_string(),
        }
    }
}

impl PlatescanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.scanner.validate()
    }
}
