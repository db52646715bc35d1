//! In-memory writer
//!
//! Collects every line in a shared buffer. Handy for tests and for embedding
//! the logger where output is shipped elsewhere.

use crate::core::error::Result;
use crate::core::writer::LogWriter;
use parking_lot::Mutex;
use std::sync::Arc;

/// Clones share the same buffer, so one handle can be given to the logger and
/// another kept for reading.
#[derive(Debug, Default, Clone)]
pub struct MemoryWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn contents(&self) -> Vec<u8> {
        self.buffer.lock().clone()
    }

    /// Written lines, without their trailing newlines
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.buffer.lock())
            .lines()
            .map(str::to_owned)
            .collect()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl LogWriter for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn sync(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
