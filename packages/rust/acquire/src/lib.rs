//! Artifact acquisition for the plugindocs pipeline.
//!
//! Covers the three stages ahead of normalization: concurrent download of
//! the mandatory base artifact and all requested collections, the
//! all-or-nothing install step, and raw-record extraction.

mod downloader;
mod extract;
mod install;

pub use downloader::{AcquiredArtifacts, ArtifactLocation, Downloader, acquire_all};
pub use extract::extract_raw_records;
pub use install::install_all;
