//! Core domain types for the plugindocs pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reserved artifact name for the mandatory base platform package.
pub const BASE_ARTIFACT_NAME: &str = "base";

// ---------------------------------------------------------------------------
// PluginIdentity
// ---------------------------------------------------------------------------

/// Identity of one plugin-like artifact: a (kind, name) pair.
///
/// Unique within a run and used as the join key across the acquire,
/// normalize, and render stages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PluginIdentity {
    /// Plugin kind (module, inventory, lookup, ...).
    pub kind: String,
    /// Fully qualified plugin name (e.g. `ns.coll.foo`).
    pub name: String,
}

impl PluginIdentity {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for PluginIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

// ---------------------------------------------------------------------------
// RawRecord
// ---------------------------------------------------------------------------

/// Unvalidated plugin metadata as emitted by the extractor.
///
/// The three sections map onto the documentation, examples, and
/// return-value blocks embedded in a plugin. Any of them may be missing or
/// structurally wrong; normalization decides what that means per section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    /// Primary documentation block.
    #[serde(default)]
    pub docs: serde_json::Value,
    /// Usage examples, expected to be plain text.
    #[serde(default)]
    pub examples: serde_json::Value,
    /// Return-value documentation.
    #[serde(default, rename = "return")]
    pub returns: serde_json::Value,
}

/// Raw records partitioned by plugin kind, then plugin name.
pub type RawRecordMap = BTreeMap<String, BTreeMap<String, RawRecord>>;

// ---------------------------------------------------------------------------
// Validated documentation
// ---------------------------------------------------------------------------

/// Validated, canonical form of a plugin's primary documentation section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginDocs {
    /// One-line summary, trailing period stripped.
    pub short_description: String,
    /// Long description, always a list of paragraphs.
    #[serde(default)]
    pub description: Vec<String>,
    /// Plugin authors. `["UNKNOWN"]` when the section did not name any.
    #[serde(default)]
    pub author: Vec<String>,
    /// Version the plugin first appeared in, when documented.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_added: Option<String>,
    /// Free-form usage notes.
    #[serde(default)]
    pub notes: Vec<String>,
    /// Runtime requirements.
    #[serde(default)]
    pub requirements: Vec<String>,
    /// Accepted parameters keyed by option name.
    #[serde(default)]
    pub options: BTreeMap<String, OptionDoc>,
    /// Sorted option names, precomputed for the templates.
    #[serde(default)]
    pub option_keys: Vec<String>,
}

/// Validated documentation for a single plugin option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionDoc {
    /// Option description, always a list of paragraphs.
    pub description: Vec<String>,
    /// Whether the option must be supplied.
    #[serde(default)]
    pub required: bool,
    /// Declared value type, when documented.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Default value, when documented.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Accepted values, when the option is an enumeration.
    #[serde(default)]
    pub choices: Vec<serde_json::Value>,
}

/// Validated documentation for a single return value.
///
/// `full_key` is the hierarchical key path down to this entry, so nested
/// values under `contains` can be addressed without walking the tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnDoc {
    /// Description, always a list of paragraphs.
    pub description: Vec<String>,
    /// When the value is returned (e.g. "always", "changed").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returned: Option<String>,
    /// Declared value type, when documented.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Sample value, when documented.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<serde_json::Value>,
    /// Nested return values.
    #[serde(default)]
    pub contains: BTreeMap<String, ReturnDoc>,
    /// Hierarchical key path from the top level to this entry.
    #[serde(default)]
    pub full_key: Vec<String>,
}

// ---------------------------------------------------------------------------
// NormalizedRecord
// ---------------------------------------------------------------------------

/// Validated three-section representation of one plugin, or the empty
/// placeholder used when the primary documentation could not be validated.
///
/// There is no partially-validated state for the primary section: a record
/// is either `Full` or `Empty`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NormalizedRecord {
    /// Primary documentation failed validation; only the error page can be
    /// rendered for this plugin.
    Empty,
    /// All three sections, with defaults substituted where the examples or
    /// return-value sections failed individually.
    Full {
        docs: PluginDocs,
        examples: String,
        returns: BTreeMap<String, ReturnDoc>,
    },
}

impl NormalizedRecord {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Normalized records partitioned by plugin kind, then plugin name.
pub type NormalizedRecordMap = BTreeMap<String, BTreeMap<String, NormalizedRecord>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_display_includes_kind() {
        let identity = PluginIdentity::new("module", "ns.coll.foo");
        assert_eq!(identity.to_string(), "ns.coll.foo (module)");
    }

    #[test]
    fn raw_record_tolerates_missing_sections() {
        let record: RawRecord = serde_json::from_str("{}").expect("deserialize");
        assert!(record.docs.is_null());
        assert!(record.examples.is_null());
        assert!(record.returns.is_null());
    }

    #[test]
    fn raw_record_reads_return_section() {
        let record: RawRecord =
            serde_json::from_str(r#"{"return": {"path": {"description": "x"}}}"#)
                .expect("deserialize");
        assert!(record.returns.is_object());
    }

    #[test]
    fn normalized_record_empty_state() {
        assert!(NormalizedRecord::Empty.is_empty());

        let full = NormalizedRecord::Full {
            docs: PluginDocs::default(),
            examples: String::new(),
            returns: BTreeMap::new(),
        };
        assert!(!full.is_empty());
    }
}
