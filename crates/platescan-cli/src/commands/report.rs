//! Report command - validate photos and compose the report notification.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::{info, warn};

use platescan_core::{
    Acceptance, ImageScan, PlatescanError, ReportForm, ReportWorkflow,
};

use super::{expand_inputs, load_config, read_attachment, Detector};

/// Arguments for the report command.
#[derive(Args)]
pub struct ReportArgs {
    /// Photo files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Order receipt number
    #[arg(long)]
    receipt_no: String,

    /// Employee number
    #[arg(long, default_value = "")]
    employee_id: String,

    /// Installer name
    #[arg(long, default_value = "")]
    name: String,

    /// ONU management IP
    #[arg(long, default_value = "")]
    onu_ip: String,

    /// Install location
    #[arg(long, default_value = "")]
    install_location: String,

    /// Circuit breaker location
    #[arg(long, default_value = "")]
    breaker_location: String,

    /// Site access procedure
    #[arg(long, default_value = "")]
    access_procedure: String,

    /// Optical power reading
    #[arg(long, default_value = "")]
    optical_db: String,

    /// Hand-entered chassis (primary) number; repeatable
    #[arg(long = "chassis", alias = "primary")]
    chassis: Vec<String>,

    /// Hand-entered module (secondary) number; repeatable
    #[arg(long = "module", alias = "secondary")]
    module: Vec<String>,

    /// Treat inputs as saved OCR output (Vision response or JSON array of texts)
    #[arg(long)]
    from_json: bool,

    /// Write the notification HTML body to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ReportArgs {
    fn form(&self) -> ReportForm {
        ReportForm {
            employee_id: self.employee_id.clone(),
            name: self.name.clone(),
            receipt_no: self.receipt_no.clone(),
            onu_ip: self.onu_ip.clone(),
            install_location: self.install_location.clone(),
            breaker_location: self.breaker_location.clone(),
            access_procedure: self.access_procedure.clone(),
            optical_db: self.optical_db.clone(),
            primary_numbers: self.chassis.clone(),
            secondary_numbers: self.module.clone(),
        }
    }
}

/// What gets printed for an accepted report.
#[derive(Serialize)]
struct ReportSummary<'a> {
    accepted: bool,
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    acceptance: &'a Acceptance,
    scans: &'a [ImageScan],
    attachments: Vec<&'a str>,
}

pub async fn run(args: ReportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let form = args.form();

    for issue in form.validate() {
        warn!("{}", issue);
    }

    let files = expand_inputs(&args.inputs)?;
    let images = files
        .iter()
        .map(|path| read_attachment(path))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let detector = Detector::from_args(args.from_json, &config)?;
    let workflow = ReportWorkflow::new(&config);

    info!("Submitting report {} with {} photos", form.receipt_no, images.len());

    let submission = match workflow.submit(&detector, &form, images).await {
        Ok(submission) => submission,
        Err(e) => {
            eprintln!("{} {}", style("✗").red(), e);
            return Err(PlatescanError::from(e).into());
        }
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &submission.notification.body)?;
        eprintln!(
            "{} Notification body written to {}",
            style("✓").green(),
            output_path.display()
        );
    }

    let notification = &submission.notification;
    let summary = ReportSummary {
        accepted: true,
        from: &notification.from,
        to: &notification.to,
        subject: &notification.subject,
        acceptance: &submission.acceptance,
        scans: &submission.scans,
        attachments: notification
            .attachments
            .iter()
            .map(|a| a.filename.as_str())
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
