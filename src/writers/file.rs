//! Single, never-rotated log file

use crate::core::error::{LoggerError, Result};
use crate::core::writer::LogWriter;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct FileWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    std: bool,
}

impl FileWriter {
    /// Open `path` for appending, creating it and its directory if needed.
    /// With `std` set every write is copied to standard output.
    pub fn open(path: impl Into<PathBuf>, std: bool) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::file_writer(path.display().to_string(), format!("Failed to open: {}", e))
            })?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            std,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogWriter for FileWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.writer.write_all(buf)?;
        if self.std {
            let _ = io::stdout().lock().write_all(buf);
        }
        Ok(buf.len())
    }

    fn sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        if self.std {
            io::stdout().flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
