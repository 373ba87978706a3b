//! Non-fatal per-plugin diagnostics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::PluginIdentity;

/// Non-fatal diagnostics keyed by plugin kind, then plugin name.
///
/// The map is append-only: entries are created by [`append`] and never
/// removed, and each plugin's messages keep their insertion order. Looking
/// up a plugin that has no diagnostics does not create its entry — absence
/// means nothing went wrong for that plugin.
///
/// [`append`]: PluginErrors::append
#[derive(Debug, Clone, Default, Serialize)]
pub struct PluginErrors {
    by_kind: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl PluginErrors {
    /// Record one diagnostic for a plugin.
    pub fn append(&mut self, identity: &PluginIdentity, message: impl Into<String>) {
        self.by_kind
            .entry(identity.kind.clone())
            .or_default()
            .entry(identity.name.clone())
            .or_default()
            .push(message.into());
    }

    /// Diagnostics recorded for one plugin, in insertion order.
    ///
    /// Returns an empty slice when none were recorded.
    pub fn for_plugin(&self, kind: &str, name: &str) -> &[String] {
        self.by_kind
            .get(kind)
            .and_then(|plugins| plugins.get(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether any diagnostics were recorded at all.
    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }

    /// Total number of diagnostic messages across all plugins.
    pub fn total(&self) -> usize {
        self.by_kind
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    /// Number of plugins with at least one diagnostic.
    pub fn plugin_count(&self) -> usize {
        self.by_kind.values().map(BTreeMap::len).sum()
    }
}
