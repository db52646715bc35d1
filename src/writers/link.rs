//! Stable symlink to the newest segment

use super::rotating_file::RotateCallback;
use crate::core::error::{LoggerError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Keeps `link` pointing at the segment most recently opened.
#[derive(Debug, Clone)]
pub struct LinkUpdater {
    link: PathBuf,
}

impl LinkUpdater {
    /// Create the updater, making sure the link's directory exists
    pub fn new(link: impl Into<PathBuf>) -> Result<Self> {
        let link = link.into();
        if let Some(parent) = link.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create link directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }
        Ok(Self { link })
    }

    pub fn link(&self) -> &Path {
        &self.link
    }

    /// Point the link at `target`. Relative targets are made absolute first.
    pub fn update(&self, target: &Path) -> io::Result<()> {
        let target = if target.is_absolute() {
            target.to_path_buf()
        } else {
            std::env::current_dir()?.join(target)
        };
        match fs::remove_file(&self.link) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
            _ => {}
        }
        symlink(&target, &self.link)
    }

    /// Wrap the updater as a post-rotation callback. Failures are reported on
    /// stderr; a stale link never stops logging.
    pub fn into_callback(self) -> RotateCallback {
        Box::new(move |segment: &Path| {
            if let Err(e) = self.update(segment) {
                eprintln!(
                    "[LOGGER WARNING] Failed to point link {} at {}: {}",
                    self.link.display(),
                    segment.display(),
                    e
                );
            }
        })
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(not(any(unix, windows)))]
fn symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "symlinks are not supported"))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_link_follows_updates() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("app-0.log");
        let second = dir.path().join("app-1.log");
        fs::write(&first, "a").unwrap();
        fs::write(&second, "b").unwrap();

        let updater = LinkUpdater::new(dir.path().join("current/app.log")).unwrap();
        updater.update(&first).unwrap();
        assert_eq!(fs::read_link(updater.link()).unwrap(), first);

        updater.update(&second).unwrap();
        assert_eq!(fs::read_to_string(updater.link()).unwrap(), "b");
    }

    #[test]
    fn test_callback_swallows_errors() {
        let dir = tempdir().unwrap();
        // a directory in the link's place cannot be removed with remove_file
        let blocked = dir.path().join("blocked");
        fs::create_dir(&blocked).unwrap();
        let mut callback = LinkUpdater::new(&blocked).unwrap().into_callback();
        callback(&dir.path().join("app-0.log"));
        assert!(blocked.is_dir());
    }
}
