//! Scan pipeline: parse, probe, inspect, assess, score
//!
//! [`PhishChecker`] owns one instance of each collaborator and runs them one
//! after another for every scan. Nothing is cached or carried between scans;
//! each call to [`PhishChecker::scan`] is an independent pipeline.
//!
//! The only short-circuits are a rejected input and an unreachable domain.
//! Certificate and registration failures are absorbed into their result
//! types and scored instead.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    config::ScanConfig,
    domain::{parse_domain, DomainParseError, ParsedDomain},
    http::{HttpProbe, Reachability, ReachabilityProbe},
    risk::{assess_risk, RiskAssessment},
    tls::{inspect_certificate, CertificateSource, CertificateStatus, TlsInspector},
    whois::{domain_age, AgeReport, RegistrationLookup, WhoisClient},
};

/// Everything learned about one domain in one scan
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub scan_id: Uuid,
    pub domain: ParsedDomain,
    pub reachability: Reachability,
    pub certificate: CertificateStatus,
    /// `None` when registration data could not be obtained
    pub age: Option<AgeReport>,
    pub assessment: RiskAssessment,
}

/// How a scan ended
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// Input could not be parsed into a domain; nothing was contacted
    Rejected(DomainParseError),
    /// Reachability check failed; later checks and scoring were skipped
    Unreachable {
        scan_id: Uuid,
        domain: ParsedDomain,
        status: Option<u16>,
    },
    /// All checks ran and a score was produced
    Assessed(ScanReport),
}

/// Orchestrates the reachability, certificate and age checks
///
/// # Examples
///
/// ```no_run
/// use phishscan::config::ScanConfig;
/// use phishscan::core::{PhishChecker, ScanOutcome};
///
/// # async fn example() -> anyhow::Result<()> {
/// let checker = PhishChecker::new(ScanConfig::default())?;
///
/// if let ScanOutcome::Assessed(report) = checker.scan("https://example.com/login").await {
///     println!("{} scored {}", report.domain, report.assessment.score);
/// }
/// # Ok(())
/// # }
/// ```
pub struct PhishChecker {
    config: ScanConfig,
    reachability: Box<dyn ReachabilityProbe>,
    certificates: Box<dyn CertificateSource>,
    registrations: Box<dyn RegistrationLookup>,
}

impl PhishChecker {
    /// Creates a checker backed by live HTTP, TLS and WHOIS clients
    ///
    /// # Errors
    /// Fails if the HTTP client or the WHOIS server table cannot be set up.
    pub fn new(config: ScanConfig) -> Result<Self> {
        let reachability = HttpProbe::new(config.http_timeout)?;
        let certificates = TlsInspector::new(config.tls_timeout);
        let registrations = WhoisClient::new(config.whois_timeout)?;

        Ok(Self::with_collaborators(
            config,
            Box::new(reachability),
            Box::new(certificates),
            Box::new(registrations),
        ))
    }

    /// Creates a checker over caller-supplied collaborators
    pub fn with_collaborators(
        config: ScanConfig,
        reachability: Box<dyn ReachabilityProbe>,
        certificates: Box<dyn CertificateSource>,
        registrations: Box<dyn RegistrationLookup>,
    ) -> Self {
        Self {
            config,
            reachability,
            certificates,
            registrations,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Runs one full scan for raw operator input
    pub async fn scan(&self, input: &str) -> ScanOutcome {
        let domain = match parse_domain(input) {
            Ok(domain) => domain,
            Err(e) => {
                debug!("Rejected input {:?}: {}", input, e);
                return ScanOutcome::Rejected(e);
            }
        };

        let scan_id = Uuid::new_v4();
        info!("Scan {} started for {}", scan_id, domain);

        let reachability = self.reachability.probe(domain.as_str()).await;
        if let Reachability::Unreachable(status) = reachability {
            info!("Scan {} aborted: {} is unreachable", scan_id, domain);
            return ScanOutcome::Unreachable {
                scan_id,
                domain,
                status,
            };
        }

        let certificate = inspect_certificate(self.certificates.as_ref(), domain.as_str()).await;
        debug!("Scan {} certificate: {:?}", scan_id, certificate);

        let age = domain_age(self.registrations.as_ref(), domain.as_str()).await;
        debug!("Scan {} age: {:?}", scan_id, age);

        let Some(assessment) = assess_risk(&reachability, &certificate, age.as_ref(), &self.config)
        else {
            unreachable!("unreachable domains return before scoring");
        };
        info!(
            "Scan {} finished: score {} verdict {}",
            scan_id, assessment.score, assessment.verdict
        );

        let report = ScanReport {
            scan_id,
            domain,
            reachability,
            certificate,
            age,
            assessment,
        };
        if let Ok(json) = serde_json::to_string(&report) {
            debug!(report = %json, "Scan report");
        }
        ScanOutcome::Assessed(report)
    }
}
