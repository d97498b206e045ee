//! Interactive scan loop
//!
//! One line of input, one scan. `exit` and end of input stop the loop, `clear`
//! resets the screen, an interrupt stops the loop at the next prompt. A scan
//! that panics is reported and the loop keeps going.

use anyhow::Result;
use futures::FutureExt;
use std::future::Future;
use std::io::Write;
use std::panic::AssertUnwindSafe;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, info};

use crate::core::PhishChecker;
use crate::display::Screen;

/// What a line of input asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Exit,
    Clear,
    /// Blank line, nothing to do
    Skip,
    Scan(&'a str),
}

impl<'a> Command<'a> {
    /// Keywords are matched case-insensitively after trimming
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            Command::Skip
        } else if trimmed.eq_ignore_ascii_case("exit") {
            Command::Exit
        } else if trimmed.eq_ignore_ascii_case("clear") {
            Command::Clear
        } else {
            Command::Scan(trimmed)
        }
    }
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// Operator typed `exit`
    Requested,
    /// Input stream closed
    EndOfInput,
    /// Interrupt signal received
    Interrupted,
}

/// Drives scans until exit, end of input or interrupt
///
/// `interrupt` is polled only while waiting for input, so a scan already in
/// flight always finishes before the loop stops.
pub async fn run<R, W, I>(
    checker: &PhishChecker,
    screen: &Screen,
    input: R,
    mut out: W,
    interrupt: I,
) -> Result<LoopExit>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    I: Future,
{
    let mut lines = input.lines();
    tokio::pin!(interrupt);

    write!(out, "{}", screen.banner())?;

    let reason = 'repl: loop {
        write!(out, "\n{}", screen.prompt())?;
        out.flush()?;

        let line = tokio::select! {
            _ = &mut interrupt => break 'repl LoopExit::Interrupted,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break 'repl LoopExit::EndOfInput;
        };

        match Command::parse(&line) {
            Command::Exit => break 'repl LoopExit::Requested,
            Command::Skip => continue 'repl,
            Command::Clear => {
                if let Err(e) = screen.clear() {
                    debug!("Could not clear terminal: {}", e);
                }
                write!(out, "{}", screen.banner())?;
            }
            Command::Scan(target) => {
                let scanned = AssertUnwindSafe(checker.scan(target)).catch_unwind().await;
                match scanned {
                    Ok(outcome) => writeln!(out, "\n{}", screen.render_outcome(&outcome))?,
                    Err(panic) => {
                        let message = panic_message(panic.as_ref());
                        error!("Scan of {:?} panicked: {}", target, message);
                        writeln!(out, "\n{}", screen.render_failure(&message))?;
                    }
                }
            }
        }
    };

    info!("Interactive loop stopped: {:?}", reason);
    writeln!(out, "\n{}", screen.goodbye())?;
    out.flush()?;
    Ok(reason)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown error".to_string()
    }
}
