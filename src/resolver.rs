use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Verb and handler identifier chosen to open one file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FileTarget {
    pub verb: String,
    pub handler: String,
}

/// Filesystem queries needed by the sibling probe.
pub trait FileProbe {
    fn exists(&self, path: &Path) -> bool;
    /// Fully resolved long form of `path`, or `None` when it cannot be
    /// determined.
    fn canonicalize(&self, path: &Path) -> Option<PathBuf>;
}

/// Probe backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileProbe;

impl FileProbe for StdFileProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn canonicalize(&self, path: &Path) -> Option<PathBuf> {
        std::fs::canonicalize(path).ok()
    }
}

/// Picks the viewer for a document by looking for a companion file with the
/// same stem next to it.
pub struct TargetResolver {
    probe: Box<dyn FileProbe>,
    default_target: FileTarget,
    alternate_target: FileTarget,
    document_extension: String,
    sibling_extension: String,
    max_path_len: usize,
}

impl TargetResolver {
    pub fn new(settings: &Settings, probe: Box<dyn FileProbe>) -> Self {
        Self {
            probe,
            default_target: settings.default_viewer.clone(),
            alternate_target: settings.alternate_viewer.clone(),
            document_extension: settings.document_extension.clone(),
            sibling_extension: settings.sibling_extension.clone(),
            max_path_len: settings.max_path_len,
        }
    }

    pub fn resolve(&self, path: &str) -> FileTarget {
        match self.sibling_path(Path::new(path)) {
            Some(sibling) if self.probe.exists(&sibling) => {
                tracing::debug!(path, sibling = %sibling.display(), "sibling found; using alternate viewer");
                self.alternate_target.clone()
            }
            _ => self.default_target.clone(),
        }
    }

    /// Companion path to probe for, when `path` is a routable document.
    fn sibling_path(&self, path: &Path) -> Option<PathBuf> {
        let canonical = self.probe.canonicalize(path)?;
        let len = canonical.as_os_str().to_string_lossy().encode_utf16().count();
        if len > self.max_path_len {
            tracing::debug!(path = %path.display(), len, "canonical path too long; skipping sibling probe");
            return None;
        }
        let ext = extension(&canonical)?;
        if ext.len() != 3 || !ext.eq_ignore_ascii_case(&self.document_extension) {
            return None;
        }
        if canonical.extension().is_none() {
            // A bare `.pdf` name is all extension.
            return Some(canonical.with_file_name(format!(".{}", self.sibling_extension)));
        }
        Some(canonical.with_extension(&self.sibling_extension))
    }
}

/// Text after the last dot of the file name, counting a leading dot.
fn extension(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    name.rfind('.').map(|i| &name[i + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoCanonical;

    impl FileProbe for NoCanonical {
        fn exists(&self, _path: &Path) -> bool {
            true
        }

        fn canonicalize(&self, _path: &Path) -> Option<PathBuf> {
            None
        }
    }

    #[test]
    fn canonicalize_failure_keeps_default() {
        let settings = Settings::default();
        let resolver = TargetResolver::new(&settings, Box::new(NoCanonical));
        assert_eq!(resolver.resolve("doc.pdf"), settings.default_viewer);
    }

    #[test]
    fn extension_counts_a_leading_dot() {
        assert_eq!(extension(Path::new("/docs/.pdf")), Some("pdf"));
        assert_eq!(extension(Path::new("/docs/a.b.PDF")), Some("PDF"));
        assert_eq!(extension(Path::new("/docs/readme")), None);
    }
}
