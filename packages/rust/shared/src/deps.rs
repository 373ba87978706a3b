//! Dependency descriptor parsing.
//!
//! A build is driven by a TOML descriptor naming the mandatory base
//! platform version and the collections to document:
//!
//! ```toml
//! base = "2.10.5"
//!
//! [collections]
//! "ns.coll" = "1.0.0"
//! "other.util" = "2.3.1"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{DocsBuildError, Result};

/// Parsed dependency descriptor for one build.
#[derive(Debug, Clone, Deserialize)]
pub struct DependencyFile {
    /// Version of the mandatory base platform artifact.
    pub base: String,
    /// Collection name -> required version.
    #[serde(default)]
    pub collections: BTreeMap<String, String>,
}

impl DependencyFile {
    /// Load and parse a descriptor from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| DocsBuildError::io(path, e))?;
        Self::parse(&content)
            .map_err(|e| DocsBuildError::deps_file(format!("{}: {e}", path.display())))
    }

    /// Parse a descriptor from TOML text.
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_base_and_collections() {
        let deps = DependencyFile::parse(
            r#"
base = "2.10.5"

[collections]
"ns.coll" = "1.0.0"
"other.util" = "2.3.1"
"#,
        )
        .expect("parse");

        assert_eq!(deps.base, "2.10.5");
        assert_eq!(deps.collections.len(), 2);
        assert_eq!(deps.collections["ns.coll"], "1.0.0");
    }

    #[test]
    fn collections_table_is_optional() {
        let deps = DependencyFile::parse(r#"base = "2.10.5""#).expect("parse");
        assert!(deps.collections.is_empty());
    }

    #[test]
    fn missing_base_is_an_error() {
        assert!(DependencyFile::parse(r#"[collections]"#).is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = DependencyFile::load(Path::new("/nonexistent/deps.toml")).unwrap_err();
        assert!(matches!(err, DocsBuildError::Io { .. }));
    }
}
