//! Normalization of free-form operator input into a canonical domain
//!
//! Accepts bare domains (`example.com`), full URLs (`https://example.com/login`)
//! and anything in between. The authority component is extracted, checked for
//! basic structural sanity and lowercased. No network access happens here.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Scheme prepended when the input carries none
const DEFAULT_SCHEME: &str = "http://";

/// Reasons a raw input could not be turned into a [`ParsedDomain`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainParseError {
    /// Input was empty or whitespace only
    #[error("no input provided")]
    EmptyInput,

    /// The extracted authority is structurally unusable
    #[error("invalid domain format: {0}")]
    InvalidFormat(String),

    /// The input could not be split into URL components at all
    #[error("unexpected parsing error: {0}")]
    ParseError(String),
}

/// A lowercase host string with at least one dot, no empty labels and no
/// leading or trailing dot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ParsedDomain(String);

impl ParsedDomain {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParsedDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ParsedDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parses operator input into a canonical domain
///
/// # Examples
///
/// ```
/// use phishscan::domain::{parse_domain, DomainParseError};
///
/// let domain = parse_domain("  HTTPS://Example.COM/login?next=1 ").unwrap();
/// assert_eq!(domain.as_str(), "example.com");
///
/// assert_eq!(parse_domain("   "), Err(DomainParseError::EmptyInput));
/// assert!(matches!(parse_domain("localhost"), Err(DomainParseError::InvalidFormat(_))));
/// ```
pub fn parse_domain(input: &str) -> Result<ParsedDomain, DomainParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DomainParseError::EmptyInput);
    }

    let authority = if has_scheme(trimmed) {
        extract_authority(trimmed)?
    } else {
        extract_authority(&format!("{}{}", DEFAULT_SCHEME, trimmed))?
    };

    if authority.is_empty() {
        return Err(DomainParseError::InvalidFormat(
            "invalid url or domain".to_string(),
        ));
    }
    if !authority.contains('.') {
        return Err(DomainParseError::InvalidFormat(format!(
            "no dot in '{}'",
            authority
        )));
    }
    if authority.starts_with('.') || authority.ends_with('.') {
        return Err(DomainParseError::InvalidFormat(format!(
            "leading or trailing dot in '{}'",
            authority
        )));
    }
    if authority.contains("..") {
        return Err(DomainParseError::InvalidFormat(format!(
            "empty label in '{}'",
            authority
        )));
    }

    Ok(ParsedDomain(authority.to_lowercase()))
}

/// A scheme counts only when it introduces an authority (`scheme://`).
/// Inputs like `example.com:8080` are treated as bare host:port.
fn has_scheme(input: &str) -> bool {
    let Some((scheme, _)) = input.split_once("://") else {
        return false;
    };

    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Returns the `host[:port]` part (including any userinfo) of a `scheme://` URL
fn extract_authority(url: &str) -> Result<String, DomainParseError> {
    let rest = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .ok_or_else(|| DomainParseError::ParseError(format!("no scheme in '{}'", url)))?;

    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];

    if authority.chars().any(char::is_whitespace) {
        return Err(DomainParseError::ParseError(format!(
            "whitespace inside authority '{}'",
            authority
        )));
    }

    // Brackets only appear around IPv6 literals and must pair up
    let opens = authority.matches('[').count();
    let closes = authority.matches(']').count();
    if opens != closes || opens > 1 {
        return Err(DomainParseError::ParseError("Invalid IPv6 URL".to_string()));
    }

    Ok(authority.to_string())
}
