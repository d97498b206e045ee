//! One-shot TLS certificate inspection
//!
//! Opens a TLS session to port 443 using the bundled webpki trust roots,
//! pulls the leaf certificate and reports its issuer common name together
//! with its "not after" timestamp. Trust validation is whatever rustls does
//! by default: chain building and hostname checks, no revocation.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore, ServerName};
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};
use x509_parser::parse_x509_certificate;

pub const HTTPS_PORT: u16 = 443;

/// Textual layout of `not_after` without the trailing zone token
const NOT_AFTER_FORMAT: &str = "%b %d %H:%M:%S %Y";

/// Fields lifted from the peer's leaf certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerCertificate {
    /// Issuer CN, absent when the issuer name carries no CN attribute
    pub issuer_common_name: Option<String>,
    /// Expiry in the canonical `Mon DD HH:MM:SS YYYY GMT` form
    pub not_after: String,
}

/// Classification of the certificate probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CertificateStatus {
    Valid {
        issuer: String,
        expires: NaiveDateTime,
    },
    Invalid,
}

impl CertificateStatus {
    pub fn issuer(&self) -> Option<&str> {
        match self {
            CertificateStatus::Valid { issuer, .. } => Some(issuer),
            CertificateStatus::Invalid => None,
        }
    }
}

/// Source of peer certificates, normally a live TLS handshake
#[async_trait]
pub trait CertificateSource: Send + Sync {
    async fn fetch(&self, domain: &str) -> Result<PeerCertificate>;
}

/// Runs the probe and folds every failure into [`CertificateStatus::Invalid`]
pub async fn inspect_certificate(source: &dyn CertificateSource, domain: &str) -> CertificateStatus {
    let fetched = source.fetch(domain).await;
    if let Err(ref e) = fetched {
        warn!("Certificate probe for {} failed: {:#}", domain, e);
    }
    classify_certificate(fetched)
}

/// Turns a raw fetch result into a [`CertificateStatus`]
///
/// A missing issuer CN or an unparseable expiry is treated the same as a
/// failed handshake.
pub fn classify_certificate(fetched: Result<PeerCertificate>) -> CertificateStatus {
    let Ok(cert) = fetched else {
        return CertificateStatus::Invalid;
    };

    let Some(issuer) = cert.issuer_common_name.filter(|cn| !cn.trim().is_empty()) else {
        debug!("Certificate has no usable issuer common name");
        return CertificateStatus::Invalid;
    };

    match parse_not_after(&cert.not_after) {
        Ok(expires) => CertificateStatus::Valid { issuer, expires },
        Err(e) => {
            debug!("Rejecting certificate expiry '{}': {}", cert.not_after, e);
            CertificateStatus::Invalid
        }
    }
}

/// Parses `Jun  2 23:59:59 2025 GMT` style timestamps
///
/// The zone token is required and must be alphabetic; its value is dropped.
///
/// # Examples
///
/// ```
/// use phishscan::tls::parse_not_after;
///
/// let expires = parse_not_after("Mar  7 12:00:00 2026 GMT").unwrap();
/// assert_eq!(expires.to_string(), "2026-03-07 12:00:00");
/// ```
pub fn parse_not_after(text: &str) -> Result<NaiveDateTime> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    let [month, day, time, year, zone] = parts.as_slice() else {
        bail!("expected 5 fields, found {}", parts.len());
    };
    if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
        bail!("invalid timezone code '{}'", zone);
    }

    let joined = format!("{} {} {} {}", month, day, time, year);
    NaiveDateTime::parse_from_str(&joined, NOT_AFTER_FORMAT)
        .with_context(|| format!("unrecognised timestamp '{}'", text))
}

/// Renders a unix timestamp the way OpenSSL prints `notAfter`
pub fn format_not_after(timestamp: i64) -> Result<String> {
    let at = DateTime::<Utc>::from_timestamp(timestamp, 0)
        .ok_or_else(|| anyhow!("timestamp {} out of range", timestamp))?;
    Ok(at.format("%b %e %H:%M:%S %Y GMT").to_string())
}

/// Host part of a domain or URL: scheme and path removed
pub fn tls_host(domain: &str) -> &str {
    let without_scheme = domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
        .unwrap_or(domain);
    without_scheme.split('/').next().unwrap_or(without_scheme)
}

/// rustls-backed certificate source
pub struct TlsInspector {
    connector: TlsConnector,
    timeout: Duration,
}

impl TlsInspector {
    /// Creates an inspector trusting the Mozilla root set from webpki-roots
    pub fn new(timeout: Duration) -> Self {
        let mut roots = RootCertStore::empty();
        roots.add_trust_anchors(webpki_roots::TLS_SERVER_ROOTS.iter().map(|ta| {
            OwnedTrustAnchor::from_subject_spki_name_constraints(
                ta.subject,
                ta.spki,
                ta.name_constraints,
            )
        }));

        let config = ClientConfig::builder()
            .with_safe_defaults()
            .with_root_certificates(roots)
            .with_no_client_auth();

        Self {
            connector: TlsConnector::from(Arc::new(config)),
            timeout,
        }
    }

    async fn handshake(&self, host: &str) -> Result<PeerCertificate> {
        let server_name = ServerName::try_from(host)
            .map_err(|e| anyhow!("invalid TLS server name '{}': {}", host, e))?;

        let tcp = TcpStream::connect((host, HTTPS_PORT))
            .await
            .with_context(|| format!("Failed to connect to {}:{}", host, HTTPS_PORT))?;

        let stream = self
            .connector
            .connect(server_name, tcp)
            .await
            .context("TLS handshake failed")?;

        let (_, session) = stream.get_ref();
        let leaf = session
            .peer_certificates()
            .and_then(|certs| certs.first())
            .ok_or_else(|| anyhow!("peer sent no certificate"))?;

        let (_, cert) = parse_x509_certificate(&leaf.0)
            .map_err(|e| anyhow!("failed to parse peer certificate: {}", e))?;

        let issuer_common_name = cert
            .issuer()
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
            .filter(|cn| !cn.is_empty())
            .map(str::to_string);
        let not_after = format_not_after(cert.validity().not_after.timestamp())?;

        debug!(
            "Peer certificate for {}: issuer={:?} not_after={}",
            host, issuer_common_name, not_after
        );

        Ok(PeerCertificate {
            issuer_common_name,
            not_after,
        })
    }
}

#[async_trait]
impl CertificateSource for TlsInspector {
    async fn fetch(&self, domain: &str) -> Result<PeerCertificate> {
        let host = tls_host(domain);
        debug!("Opening TLS session to {}:{}", host, HTTPS_PORT);

        timeout(self.timeout, self.handshake(host))
            .await
            .map_err(|_| anyhow!("TLS probe to {} timed out after {:?}", host, self.timeout))?
    }
}
