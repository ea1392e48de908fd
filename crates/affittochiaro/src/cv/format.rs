//! Plain-text rendering of completeness results for the CLI and logs.

use std::fmt::Write as _;

use super::completeness::{CvCompleteness, CvSectionScore};

pub fn percent(value: u8) -> String {
    format!("{}%", value.min(100))
}

/// Fixed-width bar such as `[######----] 60%`.
pub fn progress_bar(value: u8, width: usize) -> String {
    let value = value.min(100) as usize;
    let filled = (value * width + 50) / 100;
    format!(
        "[{}{}] {}",
        "#".repeat(filled),
        "-".repeat(width - filled),
        percent(value as u8)
    )
}

/// Comma separated missing fields, or a short confirmation when the section is done.
pub fn missing_summary(section: &CvSectionScore) -> String {
    if section.missing_fields.is_empty() {
        "completo".to_string()
    } else {
        section.missing_fields.join(", ")
    }
}

/// Whole euro amount with Italian thousands separators: `€ 32.000`.
pub fn euros(amount: u32) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    format!("€ {grouped}")
}

pub fn render_summary(completeness: &CvCompleteness) -> String {
    let reliability = completeness.reliability();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Completezza CV {} | Affidabilità: {}",
        progress_bar(completeness.total, 20),
        reliability.label
    );
    for section in &completeness.sections {
        let _ = writeln!(
            out,
            "  {:<24} {:>4} (peso {:>2}%, +{:>2}) {}",
            section.label,
            percent(section.score),
            section.weight,
            section.weighted_score,
            missing_summary(section)
        );
    }

    out
}
