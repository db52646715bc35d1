//! Caller location for entries logged with `fileline` enabled
//!
//! Resolution itself is a pluggable service: the logger only hands a
//! [`CallerLocator`] the requested depth and the `#[track_caller]` site of the
//! logging call, and writes back whatever comes out as the `name`, `file` and
//! `line` fields.

use std::panic::Location;

/// Resolved call site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub name: String,
    pub file: String,
    pub line: u32,
}

pub trait CallerLocator: Send + Sync {
    /// Resolve the caller `depth` frames above the logging call at `site`.
    fn locate(&self, depth: usize, site: &'static Location<'static>) -> Caller;
}

/// Resolves to the tracked call site. `depth` is ignored: `#[track_caller]`
/// already points at the frame that called into the logger.
#[derive(Debug, Default, Clone, Copy)]
pub struct SiteLocator;

impl CallerLocator for SiteLocator {
    fn locate(&self, _depth: usize, site: &'static Location<'static>) -> Caller {
        Caller {
            name: module_name(site.file()),
            file: site.file().to_string(),
            line: site.line(),
        }
    }
}

/// Module-style name for a source path, e.g. `src/net/conn.rs` -> `net::conn`
pub fn module_name(file: &str) -> String {
    let normalized = file.replace('\\', "/");
    let relative = match normalized.rfind("/src/") {
        Some(pos) => &normalized[pos + 5..],
        None => normalized.strip_prefix("src/").unwrap_or(&normalized),
    };
    let stem = relative.strip_suffix(".rs").unwrap_or(relative);
    let stem = stem
        .strip_suffix("/mod")
        .or_else(|| stem.strip_suffix("/lib"))
        .or_else(|| stem.strip_suffix("/main"))
        .unwrap_or(stem);
    stem.trim_start_matches('/').replace('/', "::")
}

/// Whether caller capture is on, and how many extra frames to skip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallerCapture {
    pub enabled: bool,
    pub depth: i64,
}

impl CallerCapture {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, depth: 0 }
    }

    pub fn adjust(&mut self, delta: i64) {
        self.depth = self.depth.saturating_add(delta);
    }

    /// Depth handed to the locator; never negative
    pub fn frames(&self) -> usize {
        usize::try_from(self.depth.max(0)).unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_name() {
        assert_eq!(module_name("src/net/conn.rs"), "net::conn");
        assert_eq!(module_name("src/net/mod.rs"), "net");
        assert_eq!(module_name("src/lib.rs"), "lib");
        assert_eq!(module_name("/home/u/app/src/server/handler.rs"), "server::handler");
        assert_eq!(module_name("tests\\it.rs"), "tests::it");
    }

    #[test]
    fn test_site_locator_reports_line() {
        let site = Location::caller();
        let caller = SiteLocator.locate(0, site);
        assert_eq!(caller.line, site.line());
        assert_eq!(caller.file, site.file());
    }

    #[test]
    fn test_capture_depth_never_negative() {
        let mut capture = CallerCapture::new(true);
        capture.adjust(-3);
        assert_eq!(capture.frames(), 0);
        capture.adjust(5);
        assert_eq!(capture.frames(), 2);
    }
}
