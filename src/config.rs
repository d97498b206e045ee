//! Scan configuration shared by the checkers and the scorer

use std::collections::HashSet;
use std::time::Duration;

/// Certificate issuer common names treated as free or low-trust.
///
/// Matched exactly and case-sensitively against the issuer CN.
pub const FREE_CERT_ISSUERS: &[&str] = &[
    "R12",
    "R3 DV",
    "R3 EV",
    "R3 CA",
    "R3 cross-signed",
    "let's encrypt",
    "R3",
    "R13",
    "zerossl",
    "buypass",
    "cloudflare",
    "google trust",
];

/// Timeouts and reputation data used for one scanner instance
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Timeout for the single reachability GET
    pub http_timeout: Duration,
    /// Timeout covering TCP connect and TLS handshake
    pub tls_timeout: Duration,
    /// Timeout for the WHOIS exchange, including referrals
    pub whois_timeout: Duration,
    /// Issuer common names that score as `free_ssl`
    pub free_issuers: HashSet<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(5),
            tls_timeout: Duration::from_secs(10),
            whois_timeout: Duration::from_secs(10),
            free_issuers: FREE_CERT_ISSUERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ScanConfig {
    /// Exact, case-sensitive membership test against the free-issuer set
    pub fn is_free_issuer(&self, issuer: &str) -> bool {
        self.free_issuers.contains(issuer)
    }
}
