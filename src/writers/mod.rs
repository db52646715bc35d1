//! Log writer implementations
//!
//! [`open_writer`] picks one from a [`LoggerConfig`]:
//!
//! | `path`                               | writer                 |
//! |--------------------------------------|------------------------|
//! | empty                                | [`StdoutWriter`]       |
//! | no date tokens, no active size limit | [`FileWriter`]         |
//! | anything else                        | [`RotatingFileWriter`] |
//!
//! Tokens are only looked for in the file name component of `path`.

pub mod file;
pub mod link;
pub mod memory;
pub mod pattern;
pub mod rotating_file;
pub mod stdout;

pub use file::FileWriter;
pub use link::LinkUpdater;
pub use memory::MemoryWriter;
pub use rotating_file::{Clock, RotateCallback, RotatingFileWriter, RotatingFileWriterBuilder};
pub use stdout::StdoutWriter;

use crate::core::config::LoggerConfig;
use crate::core::error::Result;
use crate::core::writer::LogWriter;

/// Build the writer described by `config`
///
/// # Errors
///
/// Returns error if the file, its directory or the link directory cannot be
/// created
pub fn open_writer(config: &LoggerConfig) -> Result<Box<dyn LogWriter>> {
    if config.path.is_empty() {
        return Ok(Box::new(StdoutWriter::new()));
    }

    let size_limited = pattern::has_index(&config.path) && config.maxsize > 0;
    if !size_limited && !pattern::has_date_tokens(&config.path) {
        let path = pattern::substitute_index(&config.path, 0);
        let writer = FileWriter::open(&path, config.std)?;
        if !config.link.is_empty() {
            let mut refresh = LinkUpdater::new(&config.link)?.into_callback();
            refresh(writer.path());
        }
        return Ok(Box::new(writer));
    }

    let mut builder = RotatingFileWriter::builder(config.path.as_str())
        .std(config.std)
        .max_size(config.maxsize);
    if !config.link.is_empty() {
        builder = builder.on_rotate(LinkUpdater::new(&config.link)?.into_callback());
    }
    Ok(Box::new(builder.open()?))
}
