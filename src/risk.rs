//! Additive phishing-risk scoring
//!
//! A pure function of the three check results. Each rule adds points
//! independently, nothing ever subtracts, and the verdict is a fixed
//! threshold over the total.

use serde::Serialize;
use std::fmt;

use crate::config::ScanConfig;
use crate::http::Reachability;
use crate::tls::CertificateStatus;
use crate::whois::AgeReport;

pub const FREE_SSL_POINTS: u32 = 10;
pub const INVALID_SSL_POINTS: u32 = 30;
pub const PRIVACY_POINTS: u32 = 10;
pub const NEW_DOMAIN_POINTS: u32 = 15;
pub const REDIRECT_POINTS: u32 = 3;

/// Domains younger than this many months score as `new_domain`
pub const NEW_DOMAIN_MONTHS: u32 = 12;

pub const HIGH_RISK_THRESHOLD: u32 = 20;
pub const MEDIUM_RISK_THRESHOLD: u32 = 17;

/// A triggered risk condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    FreeSsl,
    InvalidSsl,
    Privacy,
    NewDomain,
    Redirect,
    /// Never scored; names the abort path for explanations
    Unreachable,
}

impl RiskFactor {
    /// Short tag as shown to the operator
    pub fn tag(&self) -> &'static str {
        match self {
            RiskFactor::FreeSsl => "free_ssl",
            RiskFactor::InvalidSsl => "invalid_ssl",
            RiskFactor::Privacy => "privacy",
            RiskFactor::NewDomain => "new_domain",
            RiskFactor::Redirect => "redirect",
            RiskFactor::Unreachable => "unreachable",
        }
    }

    /// Points contributed when the factor is present
    pub fn points(&self) -> u32 {
        match self {
            RiskFactor::FreeSsl => FREE_SSL_POINTS,
            RiskFactor::InvalidSsl => INVALID_SSL_POINTS,
            RiskFactor::Privacy => PRIVACY_POINTS,
            RiskFactor::NewDomain => NEW_DOMAIN_POINTS,
            RiskFactor::Redirect => REDIRECT_POINTS,
            RiskFactor::Unreachable => 0,
        }
    }

    /// One-line operator explanation
    pub fn explanation(&self) -> &'static str {
        match self {
            RiskFactor::FreeSsl => "Free certificates are common in phishing campaigns",
            RiskFactor::InvalidSsl => "No valid certificate, traffic may not be encrypted",
            RiskFactor::Privacy => "Registration data is hidden or unavailable",
            RiskFactor::NewDomain => "Recently registered domains carry more risk",
            RiskFactor::Redirect => "Redirects can hide the final destination",
            RiskFactor::Unreachable => "Domain may be fake or already taken down",
        }
    }
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Three-tier outcome of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Safe,
    Medium,
    High,
}

impl Verdict {
    /// Thresholds are checked from the top down
    ///
    /// # Examples
    ///
    /// ```
    /// use phishscan::risk::Verdict;
    ///
    /// assert_eq!(Verdict::from_score(16), Verdict::Safe);
    /// assert_eq!(Verdict::from_score(17), Verdict::Medium);
    /// assert_eq!(Verdict::from_score(20), Verdict::High);
    /// ```
    pub fn from_score(score: u32) -> Self {
        if score >= HIGH_RISK_THRESHOLD {
            Verdict::High
        } else if score >= MEDIUM_RISK_THRESHOLD {
            Verdict::Medium
        } else {
            Verdict::Safe
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Verdict::High => "High risk: treat this domain as a likely phishing site",
            Verdict::Medium => "Medium risk: verify the domain manually before use",
            Verdict::Safe => "Low risk: no strong phishing indicators found",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Verdict::Safe => "Safe",
            Verdict::Medium => "Medium",
            Verdict::High => "High",
        };
        f.write_str(label)
    }
}

/// Score, triggered factors and verdict for one scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub score: u32,
    /// In rule order, each factor at most once
    pub factors: Vec<RiskFactor>,
    pub verdict: Verdict,
}

impl RiskAssessment {
    pub fn has(&self, factor: RiskFactor) -> bool {
        self.factors.contains(&factor)
    }

    /// Coarse reading of the score, independent of the verdict
    pub fn score_band(&self) -> &'static str {
        match self.score {
            0..=9 => "Minimal risk indicators detected",
            10..=19 => "Some low-risk factors present",
            20..=29 => "Multiple suspicious factors detected",
            _ => "High concentration of risk factors",
        }
    }
}

/// Scores one scan
///
/// Returns `None` when the domain was unreachable: such scans are aborted
/// before any score exists.
///
/// # Examples
///
/// ```
/// use phishscan::config::ScanConfig;
/// use phishscan::http::Reachability;
/// use phishscan::risk::{assess_risk, RiskFactor, Verdict};
/// use phishscan::tls::CertificateStatus;
///
/// let config = ScanConfig::default();
/// let assessment = assess_risk(
///     &Reachability::Reachable(200),
///     &CertificateStatus::Invalid,
///     None,
///     &config,
/// )
/// .unwrap();
///
/// assert_eq!(assessment.score, 40);
/// assert_eq!(assessment.factors, vec![RiskFactor::InvalidSsl, RiskFactor::Privacy]);
/// assert_eq!(assessment.verdict, Verdict::High);
/// ```
pub fn assess_risk(
    reachability: &Reachability,
    certificate: &CertificateStatus,
    age: Option<&AgeReport>,
    config: &ScanConfig,
) -> Option<RiskAssessment> {
    if reachability.is_unreachable() {
        return None;
    }

    let mut factors = Vec::new();

    match certificate {
        CertificateStatus::Valid { issuer, .. } if config.is_free_issuer(issuer) => {
            factors.push(RiskFactor::FreeSsl)
        }
        CertificateStatus::Valid { .. } => {}
        CertificateStatus::Invalid => factors.push(RiskFactor::InvalidSsl),
    }

    match age {
        None => factors.push(RiskFactor::Privacy),
        Some(report) if report.age_months < NEW_DOMAIN_MONTHS => {
            factors.push(RiskFactor::NewDomain)
        }
        Some(_) => {}
    }

    if matches!(reachability, Reachability::Redirect(_)) {
        factors.push(RiskFactor::Redirect);
    }

    let score = factors.iter().map(RiskFactor::points).sum();

    Some(RiskAssessment {
        score,
        factors,
        verdict: Verdict::from_score(score),
    })
}
