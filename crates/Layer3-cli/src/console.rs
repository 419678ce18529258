//! Terminal response channel
//!
//! Progress dots and the reply share one output stream (stdout by default),
//! so log lines on stderr never land in the middle of a row of dots.

use async_trait::async_trait;
use parking_lot::Mutex;
use relay_foundation::Result;
use relay_task::ResponseChannel;
use std::io::{Stdout, Write};

/// Prints progress dots and the final reply to one writer
pub struct ConsoleChannel<W: Write + Send = Stdout> {
    out: Mutex<W>,
    quiet: bool,
    dots: Mutex<bool>,
}

impl ConsoleChannel {
    pub fn new() -> Self {
        Self::with_writer(std::io::stdout(), false)
    }

    /// No progress dots
    pub fn quiet() -> Self {
        Self::with_writer(std::io::stdout(), true)
    }
}

impl Default for ConsoleChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> ConsoleChannel<W> {
    pub fn with_writer(out: W, quiet: bool) -> Self {
        Self {
            out: Mutex::new(out),
            quiet,
            dots: Mutex::new(false),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W: Write + Send> ResponseChannel for ConsoleChannel<W> {
    async fn send_reply(&self, text: &str) -> Result<()> {
        let mut out = self.out.lock();
        // finish the row of dots first
        if std::mem::take(&mut *self.dots.lock()) {
            writeln!(out)?;
        }
        writeln!(out, "{}", text)?;
        out.flush()?;
        Ok(())
    }

    async fn send_working(&self) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut out = self.out.lock();
        write!(out, ".")?;
        out.flush()?;
        *self.dots.lock() = true;
        Ok(())
    }
}
