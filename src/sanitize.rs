// src/sanitize.rs
//
// Terminal-safe rendering of strings that came from the network

use regex::Regex;
use std::sync::OnceLock;

use crate::core::ScanReport;
use crate::tls::CertificateStatus;

/// Returns a copy of the report with every remote-sourced string cleaned
///
/// The certificate issuer is attacker-controlled; without this an issuer CN
/// could carry escape sequences straight into the operator's terminal.
pub fn sanitize_report(report: &ScanReport) -> ScanReport {
    let certificate = match &report.certificate {
        CertificateStatus::Valid { issuer, expires } => CertificateStatus::Valid {
            issuer: sanitize_string(issuer),
            expires: *expires,
        },
        CertificateStatus::Invalid => CertificateStatus::Invalid,
    };

    ScanReport {
        certificate,
        ..report.clone()
    }
}

/// Strips control characters, including ESC, and surrounding whitespace
pub fn sanitize_string(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
}

fn path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(/[a-zA-Z0-9_\-\.]+){2,}").expect("path pattern is valid"))
}

/// Cleans an error message for display and redacts absolute paths
pub fn sanitize_error(error: &str) -> String {
    let filtered = sanitize_string(error);
    path_regex()
        .replace_all(&filtered, "[REDACTED_PATH]")
        .to_string()
}
