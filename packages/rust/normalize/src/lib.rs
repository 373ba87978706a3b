//! Normalization worker pool and error aggregation.
//!
//! Raw records are validated section by section on the blocking worker
//! pool, one unit per plugin, so a single malformed plugin can neither
//! abort the batch nor stall the I/O scheduler. Per-plugin failures are
//! captured as data and funneled into [`PluginErrors`].

pub mod schema;

use tokio::task::JoinHandle;
use tracing::{info, instrument};

use plugindocs_shared::{
    NormalizedRecord, NormalizedRecordMap, PluginErrors, PluginIdentity, RawRecord, RawRecordMap,
};

use crate::schema::Section;

/// Outcome of normalizing a single plugin: the record (possibly the empty
/// placeholder) plus any diagnostics produced along the way.
///
/// Per-plugin failures travel in this type, never as errors.
#[derive(Debug, Clone)]
pub struct PluginOutcome {
    pub record: NormalizedRecord,
    pub diagnostics: Vec<String>,
}

/// Normalize one plugin's raw record.
///
/// Sections are validated in a fixed order: documentation, examples,
/// return values. A documentation failure makes the plugin unrecoverable —
/// the remaining sections are skipped, one diagnostic is recorded, and the
/// empty placeholder stands in for the record. A failure in the examples
/// or return-value section substitutes that section's default, records one
/// diagnostic, and leaves the plugin fully usable.
pub fn normalize_plugin(identity: &PluginIdentity, raw: &RawRecord) -> PluginOutcome {
    let mut diagnostics = Vec::new();

    let docs = match schema::validate_docs(&identity.kind, &raw.docs) {
        Ok(docs) => docs,
        Err(err) => {
            diagnostics.push(format!(
                "{identity}: {} section unusable: {err}",
                Section::Docs.as_str()
            ));
            return PluginOutcome {
                record: NormalizedRecord::Empty,
                diagnostics,
            };
        }
    };

    let examples = match schema::validate_examples(&raw.examples) {
        Ok(examples) => examples,
        Err(err) => {
            diagnostics.push(format!(
                "{identity}: {} section replaced with default: {err}",
                Section::Examples.as_str()
            ));
            String::new()
        }
    };

    let returns = match schema::validate_returns(&raw.returns) {
        Ok(returns) => returns,
        Err(err) => {
            diagnostics.push(format!(
                "{identity}: {} section replaced with default: {err}",
                Section::Returns.as_str()
            ));
            Default::default()
        }
    };

    PluginOutcome {
        record: NormalizedRecord::Full {
            docs,
            examples,
            returns,
        },
        diagnostics,
    }
}

/// Normalize every raw record on the blocking worker pool.
///
/// All units are submitted before any result is awaited. Identities and
/// join handles form parallel ordered lists built from a single
/// deterministic walk of the input map, so results zip back to their
/// identities by index no matter what order units finish in. The returned
/// map always holds exactly one entry per submitted plugin.
#[instrument(skip_all)]
pub async fn normalize_all(raw: &RawRecordMap) -> (NormalizedRecordMap, PluginErrors) {
    let mut identities = Vec::new();
    let mut handles = Vec::new();

    for (kind, plugins) in raw {
        for (name, record) in plugins {
            let identity = PluginIdentity::new(kind, name);
            let unit_identity = identity.clone();
            let unit_record = record.clone();
            identities.push(identity);
            handles.push(tokio::task::spawn_blocking(move || {
                normalize_plugin(&unit_identity, &unit_record)
            }));
        }
    }

    let (normalized, errors) = collect_outcomes(identities, handles).await;

    info!(
        plugins = normalized.values().map(|m| m.len()).sum::<usize>(),
        diagnostics = errors.total(),
        "normalization stage complete"
    );

    (normalized, errors)
}

/// Zip worker results back to their identities by position.
///
/// A unit that died (panicked) is recorded as a diagnostic and an empty
/// record — the same shape as a documentation validation failure — instead
/// of aborting the gather.
async fn collect_outcomes(
    identities: Vec<PluginIdentity>,
    handles: Vec<JoinHandle<PluginOutcome>>,
) -> (NormalizedRecordMap, PluginErrors) {
    let mut normalized = NormalizedRecordMap::new();
    let mut errors = PluginErrors::default();

    for (identity, handle) in identities.into_iter().zip(handles) {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(join_err) => PluginOutcome {
                record: NormalizedRecord::Empty,
                diagnostics: vec![format!(
                    "{identity}: normalization worker failed: {join_err}"
                )],
            },
        };

        for message in outcome.diagnostics {
            errors.append(&identity, message);
        }
        normalized
            .entry(identity.kind)
            .or_default()
            .insert(identity.name, outcome.record);
    }

    (normalized, errors)
}
