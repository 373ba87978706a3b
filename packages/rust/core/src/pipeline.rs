//! End-to-end docs build: deps file → acquire → install → extract →
//! normalize → render.
//!
//! Stages run as a strict batch pipeline: each stage's full task batch
//! completes before the next stage begins, and this orchestrator owns
//! every per-stage result collection.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::TempDir;
use tracing::{info, instrument};
use url::Url;

use plugindocs_acquire::{Downloader, acquire_all, extract_raw_records, install_all};
use plugindocs_normalize::normalize_all;
use plugindocs_render::{RenderFailure, render_all};
use plugindocs_shared::{DependencyFile, DocsBuildError, RawRecordMap, Result};

/// Configuration for a docs build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Dependency descriptor naming the base version and collections.
    pub deps_file: PathBuf,
    /// Destination root for the rendered pages.
    pub dest_dir: PathBuf,
    /// Artifact registry base URL.
    pub registry: Url,
    /// Working directory for downloads and installs. A temporary directory
    /// is created (and cleaned up) when unset.
    pub work_dir: Option<PathBuf>,
    /// Write the extracted raw records to this path after extraction, for
    /// later re-rendering without the acquisition stages.
    pub dump_raw: Option<PathBuf>,
    /// Tool version string.
    pub tool_version: String,
}

/// Result of a completed docs build.
#[derive(Debug)]
pub struct BuildReport {
    /// Number of plugins processed.
    pub plugin_count: usize,
    /// Number of pages written.
    pub files_written: usize,
    /// Render tasks that failed. Non-fatal, but part of the run summary.
    pub render_failures: Vec<RenderFailure>,
    /// Number of non-fatal diagnostics recorded during normalization.
    pub diagnostic_count: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new stage.
    fn stage(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, report: &BuildReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage(&self, _name: &str) {}
    fn done(&self, _report: &BuildReport) {}
}

/// Run the full docs build.
///
/// Acquisition failures are fatal and abort the run before any
/// normalization or render work starts; a missing base artifact surfaces
/// as [`DocsBuildError::MandatoryArtifactUnavailable`]. Per-plugin
/// problems never abort the run — they end up inline in the rendered
/// pages and in the report's counters.
#[instrument(skip_all, fields(deps_file = %config.deps_file.display(), dest = %config.dest_dir.display()))]
pub async fn build_docs(
    config: &BuildConfig,
    progress: &dyn ProgressReporter,
) -> Result<BuildReport> {
    let start = Instant::now();

    let deps = DependencyFile::load(&config.deps_file)?;
    info!(
        base = %deps.base,
        collections = deps.collections.len(),
        version = %config.tool_version,
        "loaded dependency file"
    );

    // Keep-alive for the scratch tree when no work dir was supplied; the
    // directory is removed when this binding drops.
    let (_scratch, work_root) = resolve_work_root(config.work_dir.as_deref())?;

    progress.stage("Acquiring artifacts");
    let downloader = Downloader::new(config.registry.clone())?;
    let artifacts = acquire_all(&downloader, &deps, &work_root).await?;

    progress.stage("Installing artifacts");
    let installed_root = install_all(&artifacts, &work_root).await?;

    progress.stage("Extracting plugin records");
    let raw = extract_raw_records(&installed_root).await?;

    if let Some(dump_path) = &config.dump_raw {
        dump_raw_records(&raw, dump_path)?;
    }

    let mut report = normalize_and_render(&raw, &config.dest_dir, progress).await?;
    report.elapsed = start.elapsed();

    info!(
        plugins = report.plugin_count,
        files_written = report.files_written,
        render_failures = report.render_failures.len(),
        diagnostics = report.diagnostic_count,
        elapsed_ms = report.elapsed.as_millis(),
        "docs build complete"
    );

    progress.done(&report);
    Ok(report)
}

/// Normalize raw records and render one page per plugin.
///
/// Exposed separately from [`build_docs`] so previously dumped raw records
/// can be re-rendered without the acquisition stages. Normalization
/// completes for every plugin before the first render task is dispatched.
pub async fn normalize_and_render(
    raw: &RawRecordMap,
    dest_dir: &Path,
    progress: &dyn ProgressReporter,
) -> Result<BuildReport> {
    let start = Instant::now();
    let plugin_count = raw.values().map(BTreeMap::len).sum();

    progress.stage("Normalizing plugin records");
    let (records, errors) = normalize_all(raw).await;

    progress.stage("Rendering pages");
    tokio::fs::create_dir_all(dest_dir)
        .await
        .map_err(|e| DocsBuildError::io(dest_dir, e))?;
    let summary = render_all(&records, &errors, dest_dir).await;

    Ok(BuildReport {
        plugin_count,
        files_written: summary.files_written,
        render_failures: summary.failures,
        diagnostic_count: errors.total(),
        elapsed: start.elapsed(),
    })
}

/// Write extracted raw records as pretty-printed JSON.
pub fn dump_raw_records(raw: &RawRecordMap, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(raw)
        .map_err(|e| DocsBuildError::extract(format!("raw record dump failed: {e}")))?;
    std::fs::write(path, json).map_err(|e| DocsBuildError::io(path, e))?;
    info!(path = %path.display(), "dumped raw records");
    Ok(())
}

/// Read back a raw-record dump written by [`dump_raw_records`].
pub fn load_raw_records(path: &Path) -> Result<RawRecordMap> {
    let content = std::fs::read_to_string(path).map_err(|e| DocsBuildError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| DocsBuildError::extract(format!("invalid raw record dump {}: {e}", path.display())))
}

fn resolve_work_root(work_dir: Option<&Path>) -> Result<(Option<TempDir>, PathBuf)> {
    match work_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| DocsBuildError::io(dir, e))?;
            Ok((None, dir.to_path_buf()))
        }
        None => {
            let scratch = TempDir::new()
                .map_err(|e| DocsBuildError::io(std::env::temp_dir(), e))?;
            let path = scratch.path().to_path_buf();
            Ok((Some(scratch), path))
        }
    }
}
