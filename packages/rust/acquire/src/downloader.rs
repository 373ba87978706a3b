//! Concurrent artifact download for the acquisition stage.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};
use url::Url;

use plugindocs_shared::{BASE_ARTIFACT_NAME, DependencyFile, DocsBuildError, Result};

/// User-Agent string for registry requests.
const USER_AGENT: &str = concat!("plugindocs/", env!("CARGO_PKG_VERSION"));

/// A downloaded artifact on the local filesystem.
#[derive(Debug, Clone)]
pub struct ArtifactLocation {
    /// Where the artifact landed.
    pub path: PathBuf,
    /// SHA-256 of the downloaded bytes.
    pub sha256: String,
}

/// Everything the acquisition stage produced: the mandatory base platform
/// artifact plus one artifact per requested collection.
#[derive(Debug, Clone)]
pub struct AcquiredArtifacts {
    pub base: ArtifactLocation,
    pub collections: BTreeMap<String, ArtifactLocation>,
}

// ---------------------------------------------------------------------------
// Downloader
// ---------------------------------------------------------------------------

/// Downloads plugin artifacts from a registry over HTTP.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    registry: Url,
}

impl Downloader {
    /// Create a downloader for the given registry base URL.
    pub fn new(mut registry: Url) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                DocsBuildError::Acquisition(format!("failed to build HTTP client: {e}"))
            })?;

        // Joining relative paths needs the base to end in a slash.
        if !registry.path().ends_with('/') {
            let path = format!("{}/", registry.path());
            registry.set_path(&path);
        }

        Ok(Self { client, registry })
    }

    /// Download one artifact into `dest_dir`, returning its location.
    pub async fn download(
        &self,
        name: &str,
        version: &str,
        dest_dir: &Path,
    ) -> Result<ArtifactLocation> {
        let file_name = format!("{name}-{version}.json");
        let url = self
            .registry
            .join(&format!("{name}/{version}/{file_name}"))
            .map_err(|e| {
                DocsBuildError::Acquisition(format!("bad artifact URL for {name}: {e}"))
            })?;

        debug!(%url, "downloading artifact");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| DocsBuildError::Acquisition(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocsBuildError::Acquisition(format!("{url}: HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DocsBuildError::Acquisition(format!("{url}: body read failed: {e}")))?;

        let sha256 = {
            let mut hasher = Sha256::new();
            hasher.update(&body);
            format!("{:x}", hasher.finalize())
        };

        let path = dest_dir.join(file_name);
        tokio::fs::write(&path, &body)
            .await
            .map_err(|e| DocsBuildError::io(&path, e))?;

        debug!(path = %path.display(), size = body.len(), %sha256, "artifact downloaded");

        Ok(ArtifactLocation { path, sha256 })
    }
}

// ---------------------------------------------------------------------------
// Fan-out
// ---------------------------------------------------------------------------

/// Acquire the mandatory base artifact and every requested collection.
///
/// A fresh `downloads` tree is created under `work_root`, then one task
/// per request is dispatched before any is awaited. Acquisition is
/// all-or-nothing: the first failed request fails the stage, and a failed
/// or missing base artifact is reported as
/// [`DocsBuildError::MandatoryArtifactUnavailable`].
#[instrument(skip_all, fields(base = %deps.base, collections = deps.collections.len()))]
pub async fn acquire_all(
    downloader: &Downloader,
    deps: &DependencyFile,
    work_root: &Path,
) -> Result<AcquiredArtifacts> {
    let download_dir = work_root.join("downloads");
    tokio::fs::create_dir_all(&download_dir)
        .await
        .map_err(|e| DocsBuildError::io(&download_dir, e))?;

    // Parallel ordered lists: request names and their tasks, base first.
    let mut names: Vec<String> = Vec::with_capacity(deps.collections.len() + 1);
    let mut handles = Vec::with_capacity(deps.collections.len() + 1);

    names.push(BASE_ARTIFACT_NAME.to_string());
    handles.push(spawn_download(
        downloader,
        BASE_ARTIFACT_NAME,
        &deps.base,
        &download_dir,
    ));
    for (name, version) in &deps.collections {
        names.push(name.clone());
        handles.push(spawn_download(downloader, name, version, &download_dir));
    }

    let mut acquired: BTreeMap<String, ArtifactLocation> = BTreeMap::new();
    for (name, handle) in names.into_iter().zip(handles) {
        let outcome = match handle.await {
            Ok(result) => result,
            Err(join_err) => Err(DocsBuildError::Acquisition(format!(
                "download task for {name} failed: {join_err}"
            ))),
        };
        match outcome {
            Ok(location) => {
                acquired.insert(name, location);
            }
            Err(err) if name == BASE_ARTIFACT_NAME => {
                warn!(error = %err, "mandatory base artifact download failed");
                return Err(DocsBuildError::MandatoryArtifactUnavailable);
            }
            Err(err) => return Err(err),
        }
    }

    let base = acquired
        .remove(BASE_ARTIFACT_NAME)
        .ok_or(DocsBuildError::MandatoryArtifactUnavailable)?;

    info!(
        collections = acquired.len(),
        dir = %download_dir.display(),
        "acquisition stage complete"
    );

    Ok(AcquiredArtifacts {
        base,
        collections: acquired,
    })
}

fn spawn_download(
    downloader: &Downloader,
    name: &str,
    version: &str,
    dest_dir: &Path,
) -> tokio::task::JoinHandle<Result<ArtifactLocation>> {
    let downloader = downloader.clone();
    let name = name.to_string();
    let version = version.to_string();
    let dest_dir = dest_dir.to_path_buf();
    tokio::spawn(async move { downloader.download(&name, &version, &dest_dir).await })
}
