//! Rendered page output for plugindocs.
//!
//! One write task per plugin, all dispatched before any is awaited.
//! Failed tasks are collected into the stage summary instead of aborting
//! the batch or disappearing silently.

pub mod paths;
mod templates;

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use plugindocs_shared::{
    DocsBuildError, NormalizedRecord, NormalizedRecordMap, PluginErrors, PluginIdentity, Result,
};

pub use templates::render_page;

/// A render task that failed, kept for the final run report.
#[derive(Debug, Clone)]
pub struct RenderFailure {
    pub identity: PluginIdentity,
    pub message: String,
}

/// Summary of the render stage.
#[derive(Debug, Clone, Default)]
pub struct RenderSummary {
    /// Number of pages written.
    pub files_written: usize,
    /// Tasks whose page could not be produced or written.
    pub failures: Vec<RenderFailure>,
}

/// Render one page per plugin under `dest_root`.
///
/// Every plugin in `records` gets exactly one write task; the tasks share
/// nothing but the destination tree, where directory creation is
/// idempotent and file paths are computed solely from inputs known before
/// the stage starts. All tasks are awaited and individual failures end up
/// in the returned summary.
#[instrument(skip_all, fields(dest = %dest_root.display()))]
pub async fn render_all(
    records: &NormalizedRecordMap,
    errors: &PluginErrors,
    dest_root: &Path,
) -> RenderSummary {
    let mut identities = Vec::new();
    let mut handles = Vec::new();

    for (kind, plugins) in records {
        for (name, record) in plugins {
            let identity = PluginIdentity::new(kind, name);
            let task_identity = identity.clone();
            let task_record = record.clone();
            let diagnostics: Vec<String> = errors.for_plugin(kind, name).to_vec();
            let task_dest = dest_root.to_path_buf();
            identities.push(identity);
            handles.push(tokio::spawn(async move {
                write_page(&task_identity, &task_record, &diagnostics, &task_dest).await
            }));
        }
    }

    let mut summary = RenderSummary::default();
    for (identity, handle) in identities.into_iter().zip(handles) {
        match handle.await {
            Ok(Ok(())) => summary.files_written += 1,
            Ok(Err(err)) => {
                warn!(plugin = %identity, error = %err, "page write failed");
                summary.failures.push(RenderFailure {
                    identity,
                    message: err.to_string(),
                });
            }
            Err(join_err) => {
                warn!(plugin = %identity, error = %join_err, "render task failed");
                summary.failures.push(RenderFailure {
                    identity,
                    message: format!("render task failed: {join_err}"),
                });
            }
        }
    }

    info!(
        files_written = summary.files_written,
        failures = summary.failures.len(),
        "render stage complete"
    );

    summary
}

/// Render and write one plugin page.
///
/// Directory creation is `create_dir_all`, so concurrent tasks targeting
/// the same namespace do not conflict. An existing file at the computed
/// path is overwritten unconditionally.
async fn write_page(
    identity: &PluginIdentity,
    record: &NormalizedRecord,
    diagnostics: &[String],
    dest_root: &Path,
) -> Result<()> {
    let contents = templates::render_page(identity, record, diagnostics)?;
    let path = paths::page_path(dest_root, &identity.kind, &identity.name);

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DocsBuildError::io(parent, e))?;
    }
    tokio::fs::write(&path, contents)
        .await
        .map_err(|e| DocsBuildError::io(&path, e))?;

    debug!(path = %path.display(), "wrote plugin page");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use plugindocs_shared::PluginDocs;

    fn full_record(summary: &str) -> NormalizedRecord {
        NormalizedRecord::Full {
            docs: PluginDocs {
                short_description: summary.to_string(),
                description: vec!["Body.".to_string()],
                author: vec!["UNKNOWN".to_string()],
                ..Default::default()
            },
            examples: String::new(),
            returns: BTreeMap::new(),
        }
    }

    fn record_map(entries: &[(&str, &str, NormalizedRecord)]) -> NormalizedRecordMap {
        let mut records = NormalizedRecordMap::new();
        for (kind, name, record) in entries {
            records
                .entry(kind.to_string())
                .or_default()
                .insert(name.to_string(), record.clone());
        }
        records
    }

    #[tokio::test]
    async fn writes_one_file_per_plugin_at_the_expected_path() {
        let dest = tempfile::tempdir().expect("tempdir");
        let records = record_map(&[
            ("module", "ns.coll.foo", full_record("Manage foo")),
            ("module", "ns.coll.bar", NormalizedRecord::Empty),
            ("lookup", "other.util.find", full_record("Find things")),
        ]);

        let summary = render_all(&records, &PluginErrors::default(), dest.path()).await;

        assert_eq!(summary.files_written, 3);
        assert!(summary.failures.is_empty());
        assert!(dest.path().join("collections/ns.coll/foo_module.rst").exists());
        assert!(dest.path().join("collections/ns.coll/bar_module.rst").exists());
        assert!(dest.path().join("collections/other.util/find_lookup.rst").exists());
    }

    #[tokio::test]
    async fn empty_record_page_shows_recorded_diagnostics() {
        let dest = tempfile::tempdir().expect("tempdir");
        let identity = PluginIdentity::new("module", "ns.coll.bar");
        let mut errors = PluginErrors::default();
        errors.append(&identity, "ns.coll.bar (module): documentation section unusable");

        let records = record_map(&[("module", "ns.coll.bar", NormalizedRecord::Empty)]);
        let summary = render_all(&records, &errors, dest.path()).await;

        assert_eq!(summary.files_written, 1);
        let page = std::fs::read_to_string(
            dest.path().join("collections/ns.coll/bar_module.rst"),
        )
        .expect("read page");
        assert!(page.contains("Insufficient documentation"));
        assert!(page.contains("documentation section unusable"));
    }

    #[tokio::test]
    async fn write_failures_are_collected_not_raised() {
        let dest = tempfile::tempdir().expect("tempdir");
        // Block one namespace by planting a file where its directory goes.
        let collections = dest.path().join("collections");
        std::fs::create_dir_all(&collections).expect("create collections");
        std::fs::write(collections.join("ns.coll"), "in the way").expect("plant file");

        let records = record_map(&[
            ("module", "ns.coll.foo", full_record("Blocked")),
            ("module", "other.util.ok", full_record("Fine")),
        ]);

        let summary = render_all(&records, &PluginErrors::default(), dest.path()).await;

        assert_eq!(summary.files_written, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].identity.name, "ns.coll.foo");
        assert!(dest.path().join("collections/other.util/ok_module.rst").exists());
    }

    #[tokio::test]
    async fn existing_pages_are_overwritten() {
        let dest = tempfile::tempdir().expect("tempdir");
        let records = record_map(&[("module", "ns.coll.foo", full_record("First"))]);
        render_all(&records, &PluginErrors::default(), dest.path()).await;

        let records = record_map(&[("module", "ns.coll.foo", full_record("Second"))]);
        let summary = render_all(&records, &PluginErrors::default(), dest.path()).await;

        assert_eq!(summary.files_written, 1);
        let page = std::fs::read_to_string(
            dest.path().join("collections/ns.coll/foo_module.rst"),
        )
        .expect("read page");
        assert!(page.contains("Second"));
        assert!(!page.contains("First"));
    }
}
