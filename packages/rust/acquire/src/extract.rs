//! Raw-record extraction from installed artifacts.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, instrument};

use plugindocs_shared::{DocsBuildError, RawRecordMap, Result};

/// On-disk artifact document: collection coordinates plus the plugin
/// records it ships, partitioned by plugin kind.
#[derive(Debug, Deserialize)]
struct ArtifactDocument {
    #[serde(default)]
    collection: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    plugins: RawRecordMap,
}

/// Read every installed artifact and merge its plugin records into a
/// single kind -> name -> raw record mapping.
#[instrument(skip_all, fields(root = %installed_root.display()))]
pub async fn extract_raw_records(installed_root: &Path) -> Result<RawRecordMap> {
    let mut records = RawRecordMap::new();

    let mut entries = tokio::fs::read_dir(installed_root)
        .await
        .map_err(|e| DocsBuildError::io(installed_root, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| DocsBuildError::io(installed_root, e))?
    {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| DocsBuildError::io(&path, e))?;
        let document: ArtifactDocument = serde_json::from_str(&content).map_err(|e| {
            DocsBuildError::extract(format!("invalid artifact document {}: {e}", path.display()))
        })?;

        debug!(
            collection = %document.collection,
            version = %document.version,
            kinds = document.plugins.len(),
            "extracted artifact document"
        );

        for (kind, plugins) in document.plugins {
            records.entry(kind).or_default().extend(plugins);
        }
    }

    info!(
        kinds = records.len(),
        plugins = records.values().map(|m| m.len()).sum::<usize>(),
        "raw records extracted"
    );

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn merges_plugins_across_artifacts_by_kind() {
        let installed = tempfile::tempdir().expect("tempdir");

        std::fs::write(
            installed.path().join("ns.coll-1.0.0.json"),
            r#"{
                "collection": "ns.coll",
                "version": "1.0.0",
                "plugins": {
                    "module": {
                        "ns.coll.foo": {"docs": {"short_description": "Foo."}}
                    },
                    "lookup": {
                        "ns.coll.find": {"docs": {"short_description": "Find."}}
                    }
                }
            }"#,
        )
        .expect("write");
        std::fs::write(
            installed.path().join("other.util-2.0.0.json"),
            r#"{
                "collection": "other.util",
                "version": "2.0.0",
                "plugins": {
                    "module": {
                        "other.util.bar": {"docs": {"short_description": "Bar."}}
                    }
                }
            }"#,
        )
        .expect("write");
        // Non-JSON files in the tree are ignored.
        std::fs::write(installed.path().join("README"), "not an artifact").expect("write");

        let records = extract_raw_records(installed.path()).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records["module"].len(), 2);
        assert!(records["module"].contains_key("ns.coll.foo"));
        assert!(records["module"].contains_key("other.util.bar"));
        assert!(records["lookup"].contains_key("ns.coll.find"));
    }

    #[tokio::test]
    async fn base_artifact_without_plugins_is_fine() {
        let installed = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            installed.path().join("base-2.10.5.json"),
            r#"{"collection": "base", "version": "2.10.5"}"#,
        )
        .expect("write");

        let records = extract_raw_records(installed.path()).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn malformed_artifact_document_is_fatal() {
        let installed = tempfile::tempdir().expect("tempdir");
        std::fs::write(installed.path().join("bad.json"), "{not json").expect("write");

        let err = extract_raw_records(installed.path()).await.unwrap_err();
        assert!(matches!(err, DocsBuildError::Extract { .. }));
    }
}
