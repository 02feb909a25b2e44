use crate::resolver::FileTarget;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Environment variable overriding the location of the settings file.
pub const SETTINGS_ENV: &str = "PDF_LAUNCHER_SETTINGS";
pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// Viewer used unless a sibling artifact redirects the open.
    #[serde(default = "default_viewer")]
    pub default_viewer: FileTarget,
    /// Viewer used when a sibling artifact exists next to the document.
    #[serde(default = "alternate_viewer")]
    pub alternate_viewer: FileTarget,
    /// Three letter extension of the documents this launcher routes.
    #[serde(default = "default_document_extension")]
    pub document_extension: String,
    /// Extension of the companion file whose presence selects the
    /// alternate viewer.
    #[serde(default = "default_sibling_extension")]
    pub sibling_extension: String,
    /// Canonical paths longer than this (in UTF-16 units) skip the sibling
    /// probe and use the default viewer.
    #[serde(default = "default_max_path_len")]
    pub max_path_len: usize,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file receiving log output instead of stderr.
    #[serde(default)]
    pub log_file: Option<String>,
    /// Application used for a handler identifier on platforms without
    /// registered document classes. Unmapped handlers use the system default.
    #[serde(default)]
    pub applications: HashMap<String, String>,
}

fn default_viewer() -> FileTarget {
    FileTarget {
        verb: "Open".into(),
        handler: "Acrobat.Document.DC".into(),
    }
}

fn alternate_viewer() -> FileTarget {
    FileTarget {
        verb: "open".into(),
        handler: "MiKTeX.pdf.2.9".into(),
    }
}

fn default_document_extension() -> String {
    "pdf".into()
}

fn default_sibling_extension() -> String {
    "tex".into()
}

fn default_max_path_len() -> usize {
    290
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_viewer: default_viewer(),
            alternate_viewer: alternate_viewer(),
            document_extension: default_document_extension(),
            sibling_extension: default_sibling_extension(),
            max_path_len: default_max_path_len(),
            debug_logging: false,
            log_file: None,
            applications: HashMap::new(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).with_context(|| format!("reading settings {path}")),
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("parsing settings {path}"))?;
        Ok(settings.normalized())
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Settings path from the environment, or `settings.json` beside the
    /// executable.
    pub fn default_path() -> PathBuf {
        if let Some(path) = std::env::var_os(SETTINGS_ENV) {
            return PathBuf::from(path);
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(SETTINGS_FILE)))
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE))
    }

    /// Replace extension rules that the sibling probe cannot use.
    pub fn normalized(mut self) -> Self {
        if !is_short_extension(&self.document_extension) {
            tracing::warn!(
                "document extension '{}' is not three letters; using '{}'",
                self.document_extension,
                default_document_extension()
            );
            self.document_extension = default_document_extension();
        }
        if !is_short_extension(&self.sibling_extension) {
            tracing::warn!(
                "sibling extension '{}' is not three letters; using '{}'",
                self.sibling_extension,
                default_sibling_extension()
            );
            self.sibling_extension = default_sibling_extension();
        }
        self
    }
}

fn is_short_extension(ext: &str) -> bool {
    ext.len() == 3 && ext.chars().all(|c| c.is_ascii_alphabetic())
}
