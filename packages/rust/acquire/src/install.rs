//! Artifact installation.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use plugindocs_shared::{DocsBuildError, Result};

use crate::downloader::AcquiredArtifacts;

/// Install every acquired artifact under a fresh `installed` tree inside
/// `work_root`, returning the installed root.
///
/// Installation is opaque and all-or-nothing: the first artifact that
/// fails to install fails the whole step and nothing downstream runs.
#[instrument(skip_all, fields(collections = artifacts.collections.len()))]
pub async fn install_all(artifacts: &AcquiredArtifacts, work_root: &Path) -> Result<PathBuf> {
    let installed_root = work_root.join("installed");
    tokio::fs::create_dir_all(&installed_root)
        .await
        .map_err(|e| DocsBuildError::io(&installed_root, e))?;

    install_one(&artifacts.base.path, &installed_root).await?;
    for location in artifacts.collections.values() {
        install_one(&location.path, &installed_root).await?;
    }

    info!(root = %installed_root.display(), "artifacts installed");
    Ok(installed_root)
}

async fn install_one(artifact: &Path, installed_root: &Path) -> Result<()> {
    let file_name = artifact.file_name().ok_or_else(|| {
        DocsBuildError::Install(format!(
            "artifact path {} has no file name",
            artifact.display()
        ))
    })?;
    let dest = installed_root.join(file_name);

    tokio::fs::copy(artifact, &dest).await.map_err(|e| {
        DocsBuildError::Install(format!(
            "{} -> {}: {e}",
            artifact.display(),
            dest.display()
        ))
    })?;

    debug!(artifact = %dest.display(), "installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::ArtifactLocation;
    use std::collections::BTreeMap;

    fn location(dir: &Path, name: &str, contents: &str) -> ArtifactLocation {
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("write artifact");
        ArtifactLocation {
            path,
            sha256: "0".repeat(64),
        }
    }

    #[tokio::test]
    async fn installs_base_and_collections_together() {
        let work = tempfile::tempdir().expect("tempdir");
        let downloads = work.path().join("downloads");
        std::fs::create_dir_all(&downloads).expect("downloads dir");

        let mut collections = BTreeMap::new();
        collections.insert(
            "ns.coll".to_string(),
            location(&downloads, "ns.coll-1.0.0.json", r#"{"plugins": {}}"#),
        );
        let artifacts = AcquiredArtifacts {
            base: location(&downloads, "base-2.10.5.json", r#"{"plugins": {}}"#),
            collections,
        };

        let installed_root = install_all(&artifacts, work.path()).await.unwrap();

        assert!(installed_root.join("base-2.10.5.json").exists());
        assert!(installed_root.join("ns.coll-1.0.0.json").exists());
    }

    #[tokio::test]
    async fn missing_artifact_fails_the_step() {
        let work = tempfile::tempdir().expect("tempdir");
        let artifacts = AcquiredArtifacts {
            base: ArtifactLocation {
                path: work.path().join("downloads/base-0.json"),
                sha256: "0".repeat(64),
            },
            collections: BTreeMap::new(),
        };

        let err = install_all(&artifacts, work.path()).await.unwrap_err();
        assert!(matches!(err, DocsBuildError::Install(_)));
    }
}
