use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use std::sync::Mutex;
use phishscan::whois::{
    assess_age, domain_age, registered_domain, parse_whois_date, parse_whois_text, AgeRisk, RegistrationLookup,
    RegistrationRecord, WhoisDate,
};

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn record(created: NaiveDateTime, expires: NaiveDateTime) -> RegistrationRecord {
    RegistrationRecord {
        created: vec![WhoisDate::Parsed(created)],
        expires: vec![WhoisDate::Parsed(expires)],
    }
}

const VERISIGN_SAMPLE: &str = "   Domain Name: EXAMPLE.COM\r
   Registry Domain ID: 2336799_DOMAIN_COM-VRSN\r
   Registrar WHOIS Server: whois.iana.org\r
   Updated Date: 2024-08-14T07:01:34Z\r
   Creation Date: 1995-08-14T04:00:00Z\r
   Registry Expiry Date: 2025-08-13T04:00:00Z\r
   Registrar: RESERVED-Internet Assigned Numbers Authority\r
>>> Last update of whois database: 2024-09-01T12:00:00Z <<<\r
";

#[test]
fn test_parse_verisign_answer() {
    let record = parse_whois_text(VERISIGN_SAMPLE);
    assert_eq!(
        record.created,
        vec![WhoisDate::Parsed(
            NaiveDate::from_ymd_opt(1995, 8, 14).unwrap().and_hms_opt(4, 0, 0).unwrap()
        )]
    );
    assert_eq!(
        record.expires,
        vec![WhoisDate::Parsed(
            NaiveDate::from_ymd_opt(2025, 8, 13).unwrap().and_hms_opt(4, 0, 0).unwrap()
        )]
    );
}

#[test]
fn test_parse_multiple_values_in_order() {
    let text = "created: 2001-02-03\nexpires: 2030-01-01\ncreated: 1999-01-01\npaid-till: 2031-01-01\n";
    let record = parse_whois_text(text);
    assert_eq!(
        record.created,
        vec![WhoisDate::Parsed(at(2001, 2, 3)), WhoisDate::Parsed(at(1999, 1, 1))]
    );
    assert_eq!(record.expires.len(), 2);
}

#[test]
fn test_parse_answer_without_dates() {
    let record = parse_whois_text("No match for \"NOPE-NOT-REGISTERED.COM\".\n");
    assert_eq!(record, RegistrationRecord::default());
}

#[test]
fn test_parse_whois_date_formats() {
    assert_eq!(parse_whois_date("2020-05-01"), Some(at(2020, 5, 1)));
    assert_eq!(parse_whois_date("01-May-2020"), Some(at(2020, 5, 1)));
    assert_eq!(parse_whois_date("01.05.2020"), Some(at(2020, 5, 1)));
    assert_eq!(parse_whois_date("2020.05.01"), Some(at(2020, 5, 1)));
    assert_eq!(parse_whois_date("2020-05-01 00:00:00 UTC"), Some(at(2020, 5, 1)));
    assert_eq!(parse_whois_date("2020-05-01T00:00:00.000Z"), Some(at(2020, 5, 1)));
    assert_eq!(parse_whois_date("before Aug-1996"), None);
    assert_eq!(parse_whois_date(""), None);
}

#[test]
fn test_offset_is_dropped_not_converted() {
    let parsed = parse_whois_date("2020-05-01T23:30:00+05:00").unwrap();
    assert_eq!(
        parsed,
        NaiveDate::from_ymd_opt(2020, 5, 1).unwrap().and_hms_opt(23, 30, 0).unwrap()
    );
    let parsed = parse_whois_date("2020-05-01T23:30:00-0700").unwrap();
    assert_eq!(
        parsed,
        NaiveDate::from_ymd_opt(2020, 5, 1).unwrap().and_hms_opt(23, 30, 0).unwrap()
    );
}

#[test]
fn test_age_uses_thirty_day_months() {
    let created = at(2020, 1, 1);
    let report = assess_age(&record(created, at(2030, 1, 1)), created + Duration::days(359)).unwrap();
    assert_eq!(report.age_months, 11);
    assert_eq!(report.age_years, 0);
    assert_eq!(report.risk, AgeRisk::High);

    let report = assess_age(&record(created, at(2030, 1, 1)), created + Duration::days(360)).unwrap();
    assert_eq!(report.age_months, 12);
    assert_eq!(report.age_years, 1);
    assert_eq!(report.risk, AgeRisk::Medium);
}

#[test]
fn test_age_risk_tiers() {
    assert_eq!(AgeRisk::from_months(0), AgeRisk::High);
    assert_eq!(AgeRisk::from_months(11), AgeRisk::High);
    assert_eq!(AgeRisk::from_months(12), AgeRisk::Medium);
    assert_eq!(AgeRisk::from_months(35), AgeRisk::Medium);
    assert_eq!(AgeRisk::from_months(36), AgeRisk::Low);
}

#[test]
fn test_age_partial_days_do_not_count() {
    let created = at(2020, 1, 1);
    let now = created + Duration::days(89) + Duration::hours(23);
    let report = assess_age(&record(created, at(2030, 1, 1)), now).unwrap();
    assert_eq!(report.age_months, 2);
}

#[test]
fn test_first_value_wins() {
    let record = RegistrationRecord {
        created: vec![WhoisDate::Parsed(at(2010, 1, 1)), WhoisDate::Parsed(at(2023, 1, 1))],
        expires: vec![WhoisDate::Parsed(at(2030, 1, 1))],
    };
    let report = assess_age(&record, at(2024, 1, 1)).unwrap();
    assert_eq!(report.creation_date, at(2010, 1, 1));
    assert_eq!(report.risk, AgeRisk::Low);
}

#[test]
fn test_non_timestamp_values_give_no_report() {
    let unparsed_creation = RegistrationRecord {
        created: vec![
            WhoisDate::Unparsed("before Aug-1996".to_string()),
            WhoisDate::Parsed(at(2000, 1, 1)),
        ],
        expires: vec![WhoisDate::Parsed(at(2030, 1, 1))],
    };
    assert!(assess_age(&unparsed_creation, at(2024, 1, 1)).is_none());

    let missing_expiry = RegistrationRecord {
        created: vec![WhoisDate::Parsed(at(2000, 1, 1))],
        expires: vec![],
    };
    assert!(assess_age(&missing_expiry, at(2024, 1, 1)).is_none());
}

#[test]
fn test_future_creation_date_clamps_to_zero() {
    let report = assess_age(&record(at(2025, 1, 1), at(2030, 1, 1)), at(2024, 1, 1)).unwrap();
    assert_eq!(report.age_months, 0);
    assert_eq!(report.risk, AgeRisk::High);
}

struct FailingLookup;

#[async_trait]
impl RegistrationLookup for FailingLookup {
    async fn lookup(&self, _domain: &str) -> Result<RegistrationRecord> {
        bail!("connection refused")
    }
}

struct FixedLookup(RegistrationRecord);

#[async_trait]
impl RegistrationLookup for FixedLookup {
    async fn lookup(&self, _domain: &str) -> Result<RegistrationRecord> {
        Ok(self.0.clone())
    }
}

#[tokio::test]
async fn test_domain_age_absorbs_lookup_failure() {
    assert!(domain_age(&FailingLookup, "example.com").await.is_none());
}

#[tokio::test]
async fn test_domain_age_against_current_time() {
    let now = Utc::now().naive_utc();
    let lookup = FixedLookup(record(now - Duration::days(400), now + Duration::days(400)));

    let report = domain_age(&lookup, "example.com").await.unwrap();
    assert_eq!(report.age_months, 13);
    assert_eq!(report.age_years, 1);
    assert_eq!(report.risk, AgeRisk::Medium);
}

#[derive(Default)]
struct RecordingLookup {
    queried: Mutex<Vec<String>>,
}

#[async_trait]
impl RegistrationLookup for RecordingLookup {
    async fn lookup(&self, domain: &str) -> Result<RegistrationRecord> {
        self.queried.lock().unwrap().push(domain.to_string());
        bail!("no match for {}", domain)
    }
}

#[test]
fn test_registered_domain_strips_subdomains() {
    assert_eq!(registered_domain("www.example.com"), "example.com");
    assert_eq!(registered_domain("a.b.example.co.uk"), "example.co.uk");
    assert_eq!(registered_domain("example.com"), "example.com");
    assert_eq!(registered_domain("user@login.example.co.uk:8443"), "example.co.uk");
}

#[tokio::test]
async fn test_domain_age_queries_registered_domain() {
    let lookup = RecordingLookup::default();

    domain_age(&lookup, "www.paypal.com").await;
    domain_age(&lookup, "login.example.co.uk").await;
    domain_age(&lookup, "admin@shop.example.com:8080").await;

    assert_eq!(
        *lookup.queried.lock().unwrap(),
        vec!["paypal.com", "example.co.uk", "example.com"]
    );
}
