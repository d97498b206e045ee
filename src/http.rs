//! Reachability probing over HTTP(S)
//!
//! This module issues exactly one GET per scan with redirect following
//! disabled, so a 3xx answer is observed rather than chased. Every transport
//! failure (DNS, connect, TLS, timeout) collapses to
//! [`Reachability::Unreachable`] with no status code.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, ClientBuilder};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of the single reachability request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum Reachability {
    /// 2xx answer
    Reachable(u16),
    /// 3xx answer, not followed
    Redirect(u16),
    /// Any other status, or `None` when no response arrived at all
    Unreachable(Option<u16>),
}

impl Reachability {
    /// Classifies a raw HTTP status code
    ///
    /// # Examples
    ///
    /// ```
    /// use phishscan::http::Reachability;
    ///
    /// assert_eq!(Reachability::from_status(204), Reachability::Reachable(204));
    /// assert_eq!(Reachability::from_status(301), Reachability::Redirect(301));
    /// assert_eq!(Reachability::from_status(503), Reachability::Unreachable(Some(503)));
    /// ```
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => Reachability::Reachable(status),
            300..=399 => Reachability::Redirect(status),
            _ => Reachability::Unreachable(Some(status)),
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Reachability::Unreachable(_))
    }

    /// Status code carried by the classification, if any
    pub fn status(&self) -> Option<u16> {
        match *self {
            Reachability::Reachable(code) | Reachability::Redirect(code) => Some(code),
            Reachability::Unreachable(code) => code,
        }
    }
}

/// Anything that can answer "does this domain respond over HTTP?"
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    /// Never fails; transport errors become [`Reachability::Unreachable`]
    async fn probe(&self, domain: &str) -> Reachability;
}

/// reqwest-backed probe with redirects disabled
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// Builds the underlying client with the given request timeout
    ///
    /// # Errors
    /// Fails only if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .redirect(Policy::none())
            .user_agent(concat!("phishscan/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Adds `https://` unless the target already names http or https
    pub fn target_url(domain: &str) -> String {
        if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{}", domain)
        }
    }
}

#[async_trait]
impl ReachabilityProbe for HttpProbe {
    async fn probe(&self, domain: &str) -> Reachability {
        let url = Self::target_url(domain);
        debug!("Sending reachability GET to {}", url);

        match self.client.get(&url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                debug!("{} answered with status {}", url, status);
                Reachability::from_status(status)
            }
            Err(e) => {
                if e.is_timeout() {
                    warn!("Reachability check for {} timed out", url);
                } else {
                    warn!("Reachability check for {} failed: {}", url, e);
                }
                Reachability::Unreachable(None)
            }
        }
    }
}
