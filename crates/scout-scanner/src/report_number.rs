use regex::Regex;
use scout_core::ReportNumber;
use std::sync::OnceLock;
use tracing::debug;

/// Runs of 8+ digits, optionally followed by a parenthesised label.
fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d{8,})(?:\s*\(([^()]*)\))?").expect("valid report number regex")
    })
}

/// Pull every report number out of free text, in order of appearance.
pub fn extract_report_numbers(text: &str) -> Vec<ReportNumber> {
    let numbers: Vec<ReportNumber> = pattern()
        .captures_iter(text)
        .map(|caps| {
            let number = &caps[1];
            match caps.get(2) {
                Some(label) => ReportNumber::labelled(number, label.as_str()),
                None => ReportNumber::new(number),
            }
        })
        .collect();

    debug!("Extracted {} report number(s) from {:?}", numbers.len(), text);
    numbers
}
