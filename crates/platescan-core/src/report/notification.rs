//! Report notification composition.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::config::ReportConfig;
use crate::models::report::{ImageAttachment, ReportForm};

use super::Acceptance;

/// A composed report notification, ready for delivery.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub from: String,
    pub to: String,
    pub subject: String,
    /// HTML body.
    pub body: String,
    /// Original photos, in submission order.
    pub attachments: Vec<ImageAttachment>,
    pub created_at: DateTime<Utc>,
}

/// Escape text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Hand-entered numbers first, then extracted numbers not already listed.
pub fn merge_numbers(manual: &[String], extracted: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(manual.len() + extracted.len());
    for number in manual.iter().chain(extracted) {
        let number = number.trim();
        if !number.is_empty() && !merged.iter().any(|n| n == number) {
            merged.push(number.to_string());
        }
    }
    merged
}

fn push_field(body: &mut String, label: &str, value: &str) {
    body.push_str("<strong>");
    body.push_str(&escape_html(label));
    body.push_str(":</strong> ");
    body.push_str(&escape_html(value));
    body.push_str("<br>");
}

/// Build the notification for an accepted submission.
pub fn compose(
    config: &ReportConfig,
    form: &ReportForm,
    acceptance: &Acceptance,
    attachments: Vec<ImageAttachment>,
) -> Notification {
    let mut body = String::new();
    body.push_str("<div style='font-family: Arial, sans-serif; font-size: 14px; line-height: 1.6;'>");

    push_field(&mut body, "Employee ID", &form.employee_id);
    push_field(&mut body, "Name", &form.name);
    push_field(&mut body, "Receipt No", &form.receipt_no);
    push_field(&mut body, "ONU IP", &form.onu_ip);
    push_field(&mut body, "Install location", &form.install_location);
    push_field(&mut body, "Breaker location", &form.breaker_location);
    push_field(&mut body, "Access procedure", &form.access_procedure);
    push_field(&mut body, "Optical dB", &form.optical_db);

    let groups = [
        (
            &config.primary_label,
            merge_numbers(&form.primary_numbers, &acceptance.primary_numbers),
        ),
        (
            &config.secondary_label,
            merge_numbers(&form.secondary_numbers, &acceptance.secondary_numbers),
        ),
    ];
    for (label, numbers) in &groups {
        for (i, number) in numbers.iter().enumerate() {
            push_field(&mut body, &format!("{} #{}", label, i + 1), number);
        }
    }

    body.push_str("</div>");

    Notification {
        from: config.sender.clone(),
        to: config.recipient.clone(),
        subject: format!("{}{}", config.subject_prefix, form.receipt_no),
        body,
        attachments,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn acceptance() -> Acceptance {
        Acceptance {
            representative_number: "0000000001000000000000".to_string(),
            primary_numbers: vec!["0000000001000000000000".to_string()],
            secondary_numbers: vec!["0000000005000000000000".to_string()],
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>A & B</b>"), "&lt;b&gt;A &amp; B&lt;/b&gt;");
        assert_eq!(escape_html("it's \"x\""), "it&#39;s &quot;x&quot;");
    }

    #[test]
    fn test_merge_numbers_dedups_and_keeps_order() {
        let manual = vec!["B".to_string(), " ".to_string(), "A".to_string()];
        let extracted = vec!["A".to_string(), "C".to_string()];
        assert_eq!(merge_numbers(&manual, &extracted), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_compose_lists_numbers_by_category() {
        let config = ReportConfig::default();
        let form = ReportForm {
            employee_id: "E100".to_string(),
            name: "Kim <Lead>".to_string(),
            receipt_no: "R-42".to_string(),
            primary_numbers: vec!["0000000001999999999999".to_string()],
            ..Default::default()
        };

        let notification = compose(&config, &form, &acceptance(), Vec::new());

        assert_eq!(notification.subject, "[Prom] Acceptance test report - R-42");
        assert_eq!(notification.to, config.recipient);
        assert!(notification.body.contains("<strong>Name:</strong> Kim &lt;Lead&gt;<br>"));
        assert!(notification
            .body
            .contains("<strong>Chassis #1:</strong> 0000000001999999999999<br>"));
        assert!(notification
            .body
            .contains("<strong>Chassis #2:</strong> 0000000001000000000000<br>"));
        assert!(notification
            .body
            .contains("<strong>Module #1:</strong> 0000000005000000000000<br>"));

        let chassis = notification.body.find("Chassis #1").unwrap();
        let module = notification.body.find("Module #1").unwrap();
        assert!(chassis < module);
    }

    #[test]
    fn test_compose_keeps_attachment_order() {
        let images = vec![
            ImageAttachment::new("b.jpg", vec![1]),
            ImageAttachment::new("a.jpg", vec![2]),
        ];
        let notification = compose(
            &ReportConfig::default(),
            &ReportForm::default(),
            &acceptance(),
            images,
        );
        let names: Vec<&str> = notification
            .attachments
            .iter()
            .map(|a| a.filename.as_str())
            .collect();
        assert_eq!(names, vec!["b.jpg", "a.jpg"]);
    }
}
