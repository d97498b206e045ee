// Fake collaborators shared by the pipeline and loop tests
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use phishscan::config::ScanConfig;
use phishscan::core::PhishChecker;
use phishscan::http::{Reachability, ReachabilityProbe};
use phishscan::tls::{CertificateSource, PeerCertificate};
use phishscan::whois::{RegistrationLookup, RegistrationRecord, WhoisDate};

#[derive(Clone, Default)]
pub struct Calls(Arc<AtomicUsize>);

impl Calls {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct FakeProbe {
    pub answer: Reachability,
    pub calls: Calls,
}

#[async_trait]
impl ReachabilityProbe for FakeProbe {
    async fn probe(&self, _domain: &str) -> Reachability {
        self.calls.hit();
        self.answer
    }
}

pub struct PanickingProbe;

#[async_trait]
impl ReachabilityProbe for PanickingProbe {
    async fn probe(&self, _domain: &str) -> Reachability {
        panic!("probe exploded")
    }
}

pub struct FakeCertificates {
    pub issuer: Option<String>,
    pub calls: Calls,
}

#[async_trait]
impl CertificateSource for FakeCertificates {
    async fn fetch(&self, _domain: &str) -> Result<PeerCertificate> {
        self.calls.hit();
        let issuer = self
            .issuer
            .clone()
            .ok_or_else(|| anyhow!("certificate verify failed"))?;
        Ok(PeerCertificate {
            issuer_common_name: Some(issuer),
            not_after: "Jan  1 00:00:00 2030 GMT".to_string(),
        })
    }
}

pub struct FakeRegistry {
    /// Age in days; `None` simulates a privacy-protected or failed lookup
    pub age_days: Option<i64>,
    pub calls: Calls,
}

#[async_trait]
impl RegistrationLookup for FakeRegistry {
    async fn lookup(&self, _domain: &str) -> Result<RegistrationRecord> {
        self.calls.hit();
        let days = self.age_days.ok_or_else(|| anyhow!("no match"))?;
        let now = Utc::now().naive_utc();
        Ok(RegistrationRecord {
            created: vec![WhoisDate::Parsed(now - Duration::days(days))],
            expires: vec![WhoisDate::Parsed(now + Duration::days(365))],
        })
    }
}

pub struct Harness {
    pub checker: PhishChecker,
    pub probe_calls: Calls,
    pub cert_calls: Calls,
    pub whois_calls: Calls,
}

pub fn harness(reachability: Reachability, issuer: Option<&str>, age_days: Option<i64>) -> Harness {
    let probe_calls = Calls::default();
    let cert_calls = Calls::default();
    let whois_calls = Calls::default();

    let checker = PhishChecker::with_collaborators(
        ScanConfig::default(),
        Box::new(FakeProbe {
            answer: reachability,
            calls: probe_calls.clone(),
        }),
        Box::new(FakeCertificates {
            issuer: issuer.map(str::to_string),
            calls: cert_calls.clone(),
        }),
        Box::new(FakeRegistry {
            age_days,
            calls: whois_calls.clone(),
        }),
    );

    Harness {
        checker,
        probe_calls,
        cert_calls,
        whois_calls,
    }
}
