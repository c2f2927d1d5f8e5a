//! Usage file loading.
//!
//! A usage file carries the `Usage:` lines of one program and optional
//! per-key help descriptions. YAML and JSON are both accepted; the format is
//! picked from the file extension (`.json` is JSON, anything else YAML).
//!
//! # Example YAML
//!
//! ```yaml
//! usage:
//!   - "Usage: mytool [-v|--verbose] serve [--port=INT:8080] [--tls] <dir:PATH>"
//!   - "Usage: mytool init <path:PATH>"
//! docs:
//!   serve: Start the HTTP server
//!   "--port=INT:8080": TCP port to listen on
//! ```

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or saving a usage file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file declares no usage lines.
    #[error("usage file declares no usage lines")]
    Empty,
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Usage lines plus help overrides for one program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageConfig {
    /// `Usage:` lines, one per command.
    pub usage: Vec<String>,
    /// Help descriptions keyed by documentation key (`serve`,
    /// `-v, --verbose`, `--port=INT:8080`, `<dir:PATH>`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub docs: BTreeMap<String, String>,
}

impl UsageConfig {
    /// Builds a config from usage lines given on the command line.
    pub fn from_lines(usage: Vec<String>) -> Self {
        Self {
            usage,
            docs: BTreeMap::new(),
        }
    }

    /// Loads a usage file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] / [`ConfigError::Json`] if parsing fails, and
    /// [`ConfigError::Empty`] if it lists no usage lines.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let config: Self = if is_json(path) {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };

        if config.usage.is_empty() {
            return Err(ConfigError::Empty);
        }
        tracing::debug!(
            path = %path.display(),
            lines = config.usage.len(),
            docs = config.docs.len(),
            "Loaded usage file"
        );
        Ok(config)
    }

    /// Saves the config, as JSON or YAML depending on the extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be written, or a
    /// serialization error.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(std::fs::File::create(path)?);
        if is_json(path) {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_yaml::to_writer(writer, self)?;
        }
        Ok(())
    }

    /// Help overrides as ordered `(key, description)` pairs.
    pub fn doc_pairs(&self) -> Vec<(String, String)> {
        self.docs
            .iter()
            .map(|(key, desc)| (key.clone(), desc.clone()))
            .collect()
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
usage:
  - "Usage: mytool [-v|--verbose] serve [--port=INT:8080] [--tls] <dir:PATH>"
  - "Usage: mytool init <path:PATH>"
docs:
  serve: Start the HTTP server
  "--port=INT:8080": TCP port to listen on
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: UsageConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.usage.len(), 2);
        assert_eq!(config.docs["serve"], "Start the HTTP server");
        assert_eq!(config.docs["--port=INT:8080"], "TCP port to listen on");
    }

    #[test]
    fn test_docs_are_optional() {
        let config: UsageConfig =
            serde_yaml::from_str("usage:\n  - \"Usage: t <a:STR>\"\n").unwrap();
        assert!(config.docs.is_empty());
        assert!(config.doc_pairs().is_empty());
    }

    #[test]
    fn test_load_rejects_empty_usage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.yml");
        std::fs::write(&path, "usage: []\n").unwrap();

        assert!(matches!(UsageConfig::load(&path), Err(ConfigError::Empty)));
    }

    #[test]
    fn test_load_save_roundtrip_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let original: UsageConfig = serde_yaml::from_str(sample_yaml()).unwrap();

        for name in ["usage.yml", "usage.json"] {
            let path = dir.path().join(name);
            original.save(&path).unwrap();
            assert_eq!(UsageConfig::load(&path).unwrap(), original, "{name}");
        }

        let raw = std::fs::read_to_string(dir.path().join("usage.json")).unwrap();
        assert!(raw.trim_start().starts_with('{'));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            UsageConfig::load(dir.path().join("nope.yml")),
            Err(ConfigError::Io(_))
        ));
    }
}
