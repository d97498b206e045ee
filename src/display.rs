//! Operator-facing rendering
//!
//! Output goes through a [`Palette`], chosen once at startup: [`RichPalette`]
//! when stdout is a colour terminal, [`PlainPalette`] otherwise. The scan
//! pipeline never touches this module.

use console::{style, Term};
use std::fmt::Write as _;
use std::io;

use crate::core::{ScanOutcome, ScanReport};
use crate::domain::DomainParseError;
use crate::http::Reachability;
use crate::risk::{RiskAssessment, RiskFactor, Verdict};
use crate::sanitize::{sanitize_error, sanitize_report};
use crate::tls::CertificateStatus;
use crate::whois::AgeRisk;

const RULE_WIDTH: usize = 60;

/// Semantic colour of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Heading,
    Good,
    Caution,
    Bad,
    Muted,
    Plain,
}

/// Text styling capability
pub trait Palette: Send + Sync {
    fn paint(&self, text: &str, tone: Tone) -> String;
}

/// No escape sequences at all
pub struct PlainPalette;

impl Palette for PlainPalette {
    fn paint(&self, text: &str, _tone: Tone) -> String {
        text.to_string()
    }
}

/// ANSI styling through the `console` crate
pub struct RichPalette;

impl Palette for RichPalette {
    fn paint(&self, text: &str, tone: Tone) -> String {
        let styled = style(text).force_styling(true);
        match tone {
            Tone::Heading => styled.cyan().bold(),
            Tone::Good => styled.green(),
            Tone::Caution => styled.yellow(),
            Tone::Bad => styled.red().bold(),
            Tone::Muted => styled.dim(),
            Tone::Plain => styled,
        }
        .to_string()
    }
}

/// Rendering front end handed to the interactive loop
pub struct Screen {
    palette: Box<dyn Palette>,
    term: Term,
}

impl Screen {
    /// Picks the rich palette for colour terminals, plain otherwise
    pub fn detect() -> Self {
        let term = Term::stdout();
        let palette: Box<dyn Palette> = if term.is_term() && console::colors_enabled() {
            Box::new(RichPalette)
        } else {
            Box::new(PlainPalette)
        };
        Self { palette, term }
    }

    pub fn with_palette(palette: Box<dyn Palette>) -> Self {
        Self {
            palette,
            term: Term::stdout(),
        }
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        self.palette.paint(text, tone)
    }

    pub fn banner(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.paint(&rule, Tone::Heading));
        let _ = writeln!(out, "{}", self.paint("    PHISHING DOMAIN SCANNER", Tone::Heading));
        let _ = writeln!(out, "{}", self.paint(&rule, Tone::Heading));
        let _ = writeln!(
            out,
            "{}",
            self.paint("Enter a URL or domain to scan, 'clear' to reset, 'exit' to quit", Tone::Muted)
        );
        out
    }

    pub fn prompt(&self) -> String {
        self.paint("URL/domain> ", Tone::Caution)
    }

    pub fn goodbye(&self) -> String {
        self.paint("Goodbye. Stay safe out there.", Tone::Good)
    }

    /// Clears the terminal; a no-op when stdout is not a terminal
    pub fn clear(&self) -> io::Result<()> {
        self.term.clear_screen()
    }

    pub fn render_failure(&self, message: &str) -> String {
        self.paint(&format!("Scan failed: {}", sanitize_error(message)), Tone::Bad)
    }

    pub fn render_outcome(&self, outcome: &ScanOutcome) -> String {
        match outcome {
            ScanOutcome::Rejected(e) => self.render_rejection(e),
            ScanOutcome::Unreachable {
                scan_id,
                domain,
                status,
            } => {
                let mut out = String::new();
                let _ = writeln!(out, "{}", self.paint(&format!("Domain: {}", domain), Tone::Good));
                let _ = writeln!(out, "{}", self.paint(&format!("Scan ID: {}", scan_id), Tone::Muted));
                let detail = match status {
                    Some(code) => format!("HTTP unreachable (status {})", code),
                    None => "HTTP unreachable (no response)".to_string(),
                };
                let _ = writeln!(out, "{}", self.paint(&detail, Tone::Bad));
                let _ = writeln!(
                    out,
                    "{}",
                    self.paint("Remaining checks skipped for this domain", Tone::Bad)
                );
                let _ = writeln!(
                    out,
                    "  - {}",
                    self.paint(RiskFactor::Unreachable.explanation(), Tone::Muted)
                );
                out
            }
            ScanOutcome::Assessed(report) => self.render_report(&sanitize_report(report)),
        }
    }

    fn render_rejection(&self, error: &DomainParseError) -> String {
        self.paint(&format!("Rejected input: {}", error), Tone::Bad)
    }

    fn render_report(&self, report: &ScanReport) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.paint(&format!("Domain: {}", report.domain), Tone::Good));
        let _ = writeln!(out, "{}", self.paint(&format!("Scan ID: {}", report.scan_id), Tone::Muted));

        let _ = writeln!(out, "\n{}", self.paint("[HTTP]", Tone::Heading));
        match report.reachability {
            Reachability::Reachable(code) => {
                let _ = writeln!(out, "  {}", self.paint(&format!("Reachable (status {})", code), Tone::Good));
            }
            Reachability::Redirect(code) => {
                let _ = writeln!(
                    out,
                    "  {}",
                    self.paint(&format!("Redirects elsewhere (status {})", code), Tone::Caution)
                );
            }
            Reachability::Unreachable(_) => {}
        }

        let _ = writeln!(out, "\n{}", self.paint("[TLS]", Tone::Heading));
        match &report.certificate {
            CertificateStatus::Valid { issuer, expires } => {
                if report.assessment.has(RiskFactor::FreeSsl) {
                    let _ = writeln!(
                        out,
                        "  {}",
                        self.paint(&format!("Valid, issued by free CA '{}'", issuer), Tone::Caution)
                    );
                } else {
                    let _ = writeln!(
                        out,
                        "  {}",
                        self.paint(&format!("Valid, issued by '{}'", issuer), Tone::Good)
                    );
                }
                let _ = writeln!(out, "  Expires: {}", expires);
            }
            CertificateStatus::Invalid => {
                let _ = writeln!(
                    out,
                    "  {}",
                    self.paint("No valid certificate, connection is not trustworthy", Tone::Bad)
                );
            }
        }

        let _ = writeln!(out, "\n{}", self.paint("[WHOIS]", Tone::Heading));
        match &report.age {
            Some(age) => {
                let _ = writeln!(out, "  Created: {}", age.creation_date.date());
                let _ = writeln!(out, "  Expires: {}", age.expiry_date.date());
                let _ = writeln!(
                    out,
                    "  Age: {} years ({} months)",
                    age.age_years, age.age_months
                );
                let tone = match age.risk {
                    AgeRisk::High => Tone::Bad,
                    AgeRisk::Medium => Tone::Caution,
                    AgeRisk::Low => Tone::Good,
                };
                let _ = writeln!(
                    out,
                    "  {}",
                    self.paint(&format!("Age risk: {} ({})", age.risk, age.risk.description()), tone)
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "  {}",
                    self.paint("Registration data unavailable (privacy protected?)", Tone::Caution)
                );
            }
        }

        out.push('\n');
        out.push_str(&self.render_assessment(&report.assessment));
        out
    }

    /// Verdict line followed by the score band and per-factor explanations
    pub fn render_assessment(&self, assessment: &RiskAssessment) -> String {
        let tone = match assessment.verdict {
            Verdict::High => Tone::Bad,
            Verdict::Medium => Tone::Caution,
            Verdict::Safe => Tone::Good,
        };

        let mut out = String::new();
        let _ = writeln!(out, "{}", self.paint("[RISK]", Tone::Heading));
        let _ = writeln!(
            out,
            "  Score: {}  Verdict: {}",
            assessment.score,
            self.paint(&assessment.verdict.to_string(), tone)
        );
        let _ = writeln!(out, "  {}", self.paint(assessment.verdict.headline(), tone));
        let _ = writeln!(out, "  {}", assessment.score_band());
        for factor in &assessment.factors {
            let _ = writeln!(
                out,
                "  - {}: {}",
                self.paint(factor.tag(), Tone::Caution),
                factor.explanation()
            );
        }
        out
    }
}
