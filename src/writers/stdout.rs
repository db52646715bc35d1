//! Standard output writer

use crate::core::error::Result;
use crate::core::writer::LogWriter;
use std::io::{self, Write};

/// Writes every line to standard output, unbuffered beyond what the process
/// stdout handle does.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutWriter;

impl StdoutWriter {
    pub fn new() -> Self {
        Self
    }
}

impl LogWriter for StdoutWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        io::stdout().lock().write_all(buf)?;
        Ok(buf.len())
    }

    fn sync(&mut self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "stdout"
    }
}
