//! Domain age assessment from WHOIS registration data
//!
//! The lookup side talks to WHOIS servers through `whois-rust` (following
//! registry referrals) and reduces the free-form answer to lists of
//! creation and expiration dates. The assessment side is a pure function of
//! those dates and the current time.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::net::IpAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, warn};
use whois_rust::{WhoIs, WhoIsLookupOptions};

/// Server table handed to whois-rust. Unknown TLDs go to IANA and are
/// followed from its referral.
const WHOIS_SERVERS: &str = r#"{
    "com": "whois.verisign-grs.com",
    "net": "whois.verisign-grs.com",
    "org": "whois.pir.org",
    "info": "whois.nic.info",
    "biz": "whois.nic.biz",
    "io": "whois.nic.io",
    "co": "whois.nic.co",
    "me": "whois.nic.me",
    "xyz": "whois.nic.xyz",
    "online": "whois.nic.online",
    "site": "whois.nic.site",
    "top": "whois.nic.top",
    "app": "whois.nic.google",
    "dev": "whois.nic.google",
    "uk": "whois.nic.uk",
    "de": "whois.denic.de",
    "fr": "whois.nic.fr",
    "nl": "whois.domain-registry.nl",
    "eu": "whois.eu",
    "ru": "whois.tcinet.ru",
    "in": "whois.registry.in",
    "au": "whois.auda.org.au",
    "ca": "whois.cira.ca",
    "_": {
        "ip": {
            "host": "whois.arin.net",
            "query": "n + $addr\r\n"
        }
    }
}"#;

/// Referral hops allowed after the first server
const WHOIS_FOLLOW: u16 = 2;

/// Calendar-naive month length used for age arithmetic
const DAYS_PER_MONTH: i64 = 30;

const CREATION_KEYS: &str = "creation date|created|created on|created date|registered|registered on|registered date|registration date|registration time|domain registration date|domain create date|domain record activated";

const EXPIRATION_KEYS: &str = "registry expiry date|registry expiration date|registrar registration expiration date|expiration date|expiration time|expiry date|expire date|expires|expires on|record expires on|domain expiration date|paid-till|renewal date";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y.%m.%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%d-%b-%Y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%d-%b-%Y", "%d.%m.%Y", "%Y.%m.%d", "%Y/%m/%d", "%d/%m/%Y", "%d %b %Y", "%b %d %Y",
];

/// One date value as found in a WHOIS answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhoisDate {
    /// Recognised and normalised to a timezone-naive timestamp
    Parsed(NaiveDateTime),
    /// Present but not recognisable as a date
    Unparsed(String),
}

impl WhoisDate {
    pub fn from_text(text: &str) -> Self {
        match parse_whois_date(text) {
            Some(at) => WhoisDate::Parsed(at),
            None => WhoisDate::Unparsed(text.to_string()),
        }
    }
}

/// Registration dates in the order the WHOIS answer listed them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationRecord {
    pub created: Vec<WhoisDate>,
    pub expires: Vec<WhoisDate>,
}

/// Qualitative age-based risk hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeRisk {
    High,
    Medium,
    Low,
}

impl AgeRisk {
    /// Under a year is high, under three years is medium
    pub fn from_months(age_months: u32) -> Self {
        match age_months {
            0..=11 => AgeRisk::High,
            12..=35 => AgeRisk::Medium,
            _ => AgeRisk::Low,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AgeRisk::High => "domain is younger than a year",
            AgeRisk::Medium => "domain is not brand new, browse cautiously",
            AgeRisk::Low => "domain has been registered for years",
        }
    }
}

impl fmt::Display for AgeRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AgeRisk::High => "High",
            AgeRisk::Medium => "Medium",
            AgeRisk::Low => "Low",
        };
        f.write_str(label)
    }
}

/// Derived registration age of a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeReport {
    pub creation_date: NaiveDateTime,
    pub expiry_date: NaiveDateTime,
    pub age_months: u32,
    pub age_years: u32,
    pub risk: AgeRisk,
}

/// Computes the age report for a registration record
///
/// Only the first listed creation and expiration values are considered; if
/// either is missing or was not a recognisable date the result is `None`.
/// Months are whole 30-day periods, years are whole 12-month periods.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use phishscan::whois::{assess_age, AgeRisk, RegistrationRecord, WhoisDate};
///
/// let at = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let record = RegistrationRecord {
///     created: vec![WhoisDate::Parsed(at(2024, 1, 1))],
///     expires: vec![WhoisDate::Parsed(at(2027, 1, 1))],
/// };
///
/// let report = assess_age(&record, at(2024, 3, 1)).unwrap();
/// assert_eq!(report.age_months, 2);
/// assert_eq!(report.risk, AgeRisk::High);
/// ```
pub fn assess_age(record: &RegistrationRecord, now: NaiveDateTime) -> Option<AgeReport> {
    let creation_date = first_timestamp(&record.created)?;
    let expiry_date = first_timestamp(&record.expires)?;

    let days = (now - creation_date).num_days();
    let age_months = u32::try_from(days.div_euclid(DAYS_PER_MONTH)).unwrap_or(0);
    let age_years = age_months / 12;

    Some(AgeReport {
        creation_date,
        expiry_date,
        age_months,
        age_years,
        risk: AgeRisk::from_months(age_months),
    })
}

fn first_timestamp(dates: &[WhoisDate]) -> Option<NaiveDateTime> {
    match dates.first()? {
        WhoisDate::Parsed(at) => Some(*at),
        WhoisDate::Unparsed(text) => {
            debug!("First registration date '{}' is not a timestamp", text);
            None
        }
    }
}

/// Looks the domain up and assesses its age against the current UTC time
///
/// Lookup failures are logged and collapse to `None`.
pub async fn domain_age(source: &dyn RegistrationLookup, domain: &str) -> Option<AgeReport> {
    let domain = registered_domain(domain);
    match source.lookup(&domain).await {
        Ok(record) => assess_age(&record, Utc::now().naive_utc()),
        Err(e) => {
            warn!("Registration lookup for {} failed: {:#}", domain, e);
            None
        }
    }
}

/// Reduces a parsed authority to the name a registry holds a record for
///
/// Userinfo and port are dropped, then subdomains are stripped against the
/// public suffix list: `login.example.co.uk:8443` becomes `example.co.uk`.
/// Hosts with no registrable part (IP literals, bare suffixes) come back
/// unchanged apart from the stripping.
pub fn registered_domain(authority: &str) -> String {
    let host = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);
    let host = if host.starts_with('[') {
        host.split_once(']').map_or(host, |(v6, _)| v6.trim_start_matches('['))
    } else {
        host.split_once(':').map_or(host, |(name, _)| name)
    };
    let host = host.trim_end_matches('.');

    if host.parse::<IpAddr>().is_ok() {
        return host.to_string();
    }
    psl::domain_str(host).unwrap_or(host).to_string()
}

/// Parses a single WHOIS date value
///
/// Offsets are dropped without conversion, keeping the wall-clock reading.
/// Date-only values land on midnight.
pub fn parse_whois_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    let text = text
        .strip_suffix("(UTC)")
        .or_else(|| text.strip_suffix("UTC"))
        .or_else(|| text.strip_suffix("GMT"))
        .map(str::trim_end)
        .unwrap_or(text);

    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.naive_local());
    }
    if let Some(at) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
    {
        return Some(at.naive_local());
    }
    if let Some(at) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return Some(at);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn creation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| field_regex(CREATION_KEYS))
}

fn expiration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| field_regex(EXPIRATION_KEYS))
}

fn field_regex(keys: &str) -> Regex {
    let pattern = format!(r"(?im)^[ \t]*(?:{})[ \t]*:[ \t]*(\S.*?)[ \t\r]*$", keys);
    Regex::new(&pattern).expect("WHOIS field pattern is valid")
}

/// Extracts creation and expiration values from raw WHOIS text
///
/// Values keep their order of appearance; repeats are collapsed.
pub fn parse_whois_text(text: &str) -> RegistrationRecord {
    RegistrationRecord {
        created: collect_dates(creation_regex(), text),
        expires: collect_dates(expiration_regex(), text),
    }
}

fn collect_dates(re: &Regex, text: &str) -> Vec<WhoisDate> {
    let mut seen: Vec<&str> = Vec::new();
    for caps in re.captures_iter(text) {
        if let Some(value) = caps.get(1).map(|m| m.as_str()) {
            if !seen.iter().any(|s| s.eq_ignore_ascii_case(value)) {
                seen.push(value);
            }
        }
    }
    seen.into_iter().map(WhoisDate::from_text).collect()
}

/// Source of domain registration data
#[async_trait]
pub trait RegistrationLookup: Send + Sync {
    async fn lookup(&self, domain: &str) -> Result<RegistrationRecord>;
}

/// WHOIS-over-TCP lookup backed by whois-rust
pub struct WhoisClient {
    whois: Arc<WhoIs>,
    timeout: Duration,
}

impl WhoisClient {
    /// Loads the embedded server table
    pub fn new(timeout: Duration) -> Result<Self> {
        let whois = WhoIs::from_string(WHOIS_SERVERS)
            .map_err(|e| anyhow!("Failed to load WHOIS server list: {:?}", e))?;

        Ok(Self {
            whois: Arc::new(whois),
            timeout,
        })
    }
}

#[async_trait]
impl RegistrationLookup for WhoisClient {
    async fn lookup(&self, domain: &str) -> Result<RegistrationRecord> {
        debug!("Querying WHOIS for {}", domain);

        let mut options = WhoIsLookupOptions::from_string(domain)
            .map_err(|e| anyhow!("Invalid WHOIS target '{}': {:?}", domain, e))?;
        options.follow = WHOIS_FOLLOW;
        options.timeout = Some(self.timeout);

        let whois = Arc::clone(&self.whois);
        let text = tokio::task::spawn_blocking(move || whois.lookup(options))
            .await
            .context("WHOIS lookup task panicked")?
            .map_err(|e| anyhow!("WHOIS lookup for {} failed: {:?}", domain, e))?;

        let record = parse_whois_text(&text);
        debug!(
            "WHOIS for {}: {} creation and {} expiration values",
            domain,
            record.created.len(),
            record.expires.len()
        );
        Ok(record)
    }
}
