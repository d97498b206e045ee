//! Command-line definition for phishscan
//!
//! The scanner is driven interactively, so the command line carries no
//! behavioural options. clap still provides `--help` and `--version` and
//! rejects anything else with a usage error.

use clap::Parser;

/// Interactive phishing-risk scanner
///
/// Reads one URL or domain per line from standard input, checks HTTP
/// reachability, the TLS certificate and the WHOIS registration age, and
/// prints a risk verdict. Type `clear` to reset the screen and `exit` to quit.
#[derive(Debug, Parser)]
#[command(
    name = "phishscan",
    about = "Interactive phishing-risk scanner for URLs and domains",
    version
)]
pub struct Cli {}
