//! Scan command - extract identification numbers from photos.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info};

use platescan_core::{detect_fragments, Category, FragmentScanner};

use super::{expand_inputs, load_config, read_attachment, Detector};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Photo files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Treat inputs as saved OCR output (Vision response or JSON array of texts)
    #[arg(long)]
    from_json: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

/// Result for one photo.
#[derive(Debug, Serialize)]
struct ScanRecord {
    file: String,
    number: Option<String>,
    category: Option<Category>,
    fragments: usize,
    ocr_error: Option<String>,
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let files = expand_inputs(&args.inputs)?;
    let detector = Detector::from_args(args.from_json, &config)?;
    let scanner = FragmentScanner::new(config.scanner.clone());

    info!("Scanning {} files", files.len());

    let pb = if files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} photos")?
                .progress_chars("=>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut records = Vec::with_capacity(files.len());

    for path in &files {
        let attachment = read_attachment(path)?;
        let outcome = detect_fragments(&detector, &attachment.bytes).await;
        let result = scanner.scan(&outcome.fragments);

        debug!(
            "{}: {} fragments, OCR {}ms",
            path.display(),
            outcome.fragments.len(),
            outcome.elapsed_ms
        );

        records.push(ScanRecord {
            file: path.display().to_string(),
            number: result.as_ref().map(|r| r.number().to_string()),
            category: result.as_ref().map(|r| r.category()),
            fragments: outcome.fragments.len(),
            ocr_error: outcome.failure,
        });
        pb.inc(1);
    }

    pb.finish_and_clear();

    let output = format_records(&records, args.format, &config.report)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_records(
    records: &[ScanRecord],
    format: OutputFormat,
    labels: &platescan_core::ReportConfig,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for record in records {
                writer.serialize(record)?;
            }
            Ok(String::from_utf8(writer.into_inner()?)?)
        }
        OutputFormat::Text => {
            let lines: Vec<String> = records
                .iter()
                .map(|record| match (&record.number, record.category, &record.ocr_error) {
                    (Some(number), Some(category), _) => {
                        let label = match category {
                            Category::Primary => &labels.primary_label,
                            Category::Secondary => &labels.secondary_label,
                        };
                        format!("{}: {} ({})", record.file, number, label)
                    }
                    (_, _, Some(error)) => format!("{}: OCR failed: {}", record.file, error),
                    _ => format!("{}: no number found", record.file),
                })
                .collect();
            Ok(lines.join("\n"))
        }
    }
}
