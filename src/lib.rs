// phishscan: heuristic phishing-risk scanner
// Exposes the scan pipeline and its components as a library

pub mod cli;
pub mod config;
pub mod core;
pub mod display;
pub mod domain;
pub mod http;
pub mod repl;
pub mod risk;
pub mod sanitize;
pub mod tls;
pub mod whois;
