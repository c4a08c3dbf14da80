//! CLI subcommands and the helpers they share.

pub mod config;
pub mod report;
pub mod scan;

use std::fs;
use std::path::{Path, PathBuf};

use glob::glob;
use tracing::debug;

use platescan_core::error::OcrError;
use platescan_core::{
    GoogleVisionClient, ImageAttachment, JsonFixtureDetector, PlatescanConfig, TextDetector,
    TextFragment,
};

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("platescan")
        .join("config.json")
}

/// Load the configuration from `--config`, the default file, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<PlatescanConfig> {
    if let Some(path) = config_path {
        return Ok(PlatescanConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(PlatescanConfig::from_file(&default_path)?)
    } else {
        Ok(PlatescanConfig::default())
    }
}

/// Expand file arguments, treating anything that is not an existing file
/// as a glob pattern. Order is preserved.
pub fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let path = PathBuf::from(input);
        if path.is_file() {
            files.push(path);
            continue;
        }

        let mut matched: Vec<PathBuf> = glob(input)?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matched.is_empty() {
            anyhow::bail!("No matching files found for: {}", input);
        }
        matched.sort();
        files.append(&mut matched);
    }

    Ok(files)
}

/// Read a photo from disk as an attachment.
pub fn read_attachment(path: &Path) -> anyhow::Result<ImageAttachment> {
    let bytes = fs::read(path)?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    Ok(ImageAttachment::new(filename, bytes))
}

/// The text detector selected on the command line.
pub enum Detector {
    Vision(GoogleVisionClient),
    Fixture(JsonFixtureDetector),
}

impl Detector {
    /// Use saved OCR JSON when `from_json` is set, the Vision API otherwise.
    pub fn from_args(from_json: bool, config: &PlatescanConfig) -> anyhow::Result<Self> {
        if from_json {
            return Ok(Detector::Fixture(JsonFixtureDetector::new()));
        }

        match GoogleVisionClient::new(&config.vision) {
            Ok(client) => Ok(Detector::Vision(client)),
            Err(OcrError::MissingApiKey) => anyhow::bail!(
                "No Google Vision API key. Set {} or vision.api_key in the config file.",
                platescan_core::models::config::API_KEY_ENV
            ),
            Err(e) => Err(e.into()),
        }
    }
}

impl TextDetector for Detector {
    async fn detect(&self, image: &[u8]) -> Result<Vec<TextFragment>, OcrError> {
        match self {
            Detector::Vision(client) => client.detect(image).await,
            Detector::Fixture(fixture) => fixture.detect(image).await,
        }
    }
}
