//! Destination for rendered lines

use super::error::Result;

/// Opening bytes of every rendered line. Writers that rotate only start a new
/// segment in front of a write that begins with these bytes.
pub const ENTRY_MARKER: &[u8] = br#"{"time":""#;

/// A sink for complete log lines.
///
/// Writers are not required to be internally synchronized: the logger calls
/// them while holding its write mutex.
pub trait LogWriter: Send {
    fn write(&mut self, buf: &[u8]) -> Result<usize>;
    /// Flush buffered bytes down to the underlying device
    fn sync(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

impl<W: LogWriter + ?Sized> LogWriter for Box<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).write(buf)
    }

    fn sync(&mut self) -> Result<()> {
        (**self).sync()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
