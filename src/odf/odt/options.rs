//! Export options.
//!
//! Every field has a default, so a YAML document only needs the keys it
//! changes:
//!
//! ```yaml
//! temp_prefix: report-
//! media_scopes: [section, header]
//! compression_level: 9
//! sync_on_close: true
//! time_budget_ms: 5000
//! disabled_parts: [styles]
//! ```

use super::media::MediaScope;
use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Options controlling how a package is assembled and published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// File name prefix of generated destinations when no path is given
    pub temp_prefix: String,
    /// Media scopes enumerated from the document, in write order
    pub media_scopes: Vec<MediaScope>,
    /// Deflate level for compressed entries (`None` = library default)
    pub compression_level: Option<i64>,
    /// Directory for the staging file; defaults to the destination's directory,
    /// or the system temp directory when no destination is given
    pub staging_dir: Option<PathBuf>,
    /// Call `fsync` on the staging file before publishing it
    pub sync_on_close: bool,
    /// Upper bound for a whole save, checked between steps
    pub time_budget_ms: Option<u64>,
    /// Part names registered but not written
    pub disabled_parts: Vec<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            temp_prefix: "longan-".to_string(),
            media_scopes: vec![MediaScope::Section],
            compression_level: None,
            staging_dir: None,
            sync_on_close: true,
            time_budget_ms: None,
            disabled_parts: Vec::new(),
        }
    }
}

impl ExportOptions {
    /// Parse options from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_saphyr::from_str(yaml)
            .map_err(|e| Error::Config(format!("Failed to parse export options: {e}")))
    }

    /// Read options from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read `{}`: {e}", path.display())))?;
        Self::from_yaml_str(&yaml)
    }

    /// Serialize options as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self)
            .map_err(|e| Error::Config(format!("Failed to serialize export options: {e}")))
    }

    /// Time budget as a [`Duration`], if one is set.
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }

    /// Set the time budget, rounded up to whole milliseconds.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        let millis = budget.as_nanos().div_ceil(1_000_000);
        self.time_budget_ms = Some(millis.try_into().unwrap_or(u64::MAX));
        self
    }

    /// Set the media scopes to enumerate.
    pub fn with_media_scopes(mut self, scopes: impl IntoIterator<Item = MediaScope>) -> Self {
        self.media_scopes = scopes.into_iter().collect();
        self
    }

    /// Disable a part by name.
    pub fn with_disabled_part(mut self, name: impl Into<String>) -> Self {
        self.disabled_parts.push(name.into());
        self
    }
}
