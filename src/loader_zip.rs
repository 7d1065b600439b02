//! Zip archive loader.
//!
//! The archive is read in one blocking pass that filters out OS metadata,
//! enforces the per-file size limit and classifies each entry as text or
//! binary. Validation then runs in a fixed order and stops at the first
//! failing step: binary rejection, emptiness, component name, depth. Surviving entries are decoded on a
//! bounded set of blocking tasks and registered in archive order.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::{BinaryPolicy, LoaderConfig};
use crate::context::Context;
use crate::error::ContextError;
use crate::models::{normalize_path, path_depth, File};
use crate::text::{decode_text, is_plain_text};

/// Path fragments written by macOS Finder and Windows Explorer.
pub const SYSTEM_MARKERS: &[&str] = &["__MACOSX", ".DS_Store", "Thumbs.db"];

struct RawEntry {
    path: String,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct ArchiveScan {
    text: Vec<RawEntry>,
    binary: Vec<String>,
}

pub fn is_system_entry(path: &str) -> bool {
    SYSTEM_MARKERS.iter().any(|m| path.contains(m))
}

pub async fn load_zip(archive: &Path, config: &LoaderConfig) -> Result<Context, ContextError> {
    if !archive.exists() {
        return Err(ContextError::SourceNotFound(archive.to_path_buf()));
    }
    let name_pattern = config.name_pattern()?;
    let ignore = config.ignore_matcher()?;

    let archive_path = archive.to_path_buf();
    let task_path = archive_path.clone();
    let max_bytes = config.max_file_bytes;
    let scan = tokio::task::spawn_blocking(move || read_archive(&task_path, max_bytes))
        .await
        .map_err(|e| zip_read(&archive_path, e))??;

    if !scan.binary.is_empty() {
        match config.zip_binary_policy {
            BinaryPolicy::Reject => {
                return Err(ContextError::BinaryContent { paths: scan.binary });
            }
            BinaryPolicy::Skip => warn!(
                archive = %archive_path.display(),
                skipped = scan.binary.len(),
                "skipping binary entries"
            ),
        }
    }

    let entries = scan.text;
    let Some(first) = entries.first() else {
        return Err(ContextError::EmptyComponent);
    };

    let name = first.path.split('/').next().unwrap_or_default().to_string();
    if !name_pattern.is_match(&name) {
        return Err(ContextError::InvalidComponentName {
            name,
            pattern: config.element_name_regex.clone(),
        });
    }

    let deep: Vec<String> = entries
        .iter()
        .filter(|e| path_depth(&e.path) > config.max_file_depth)
        .map(|e| e.path.clone())
        .collect();
    if !deep.is_empty() {
        return Err(ContextError::DeepHierarchy {
            max_depth: config.max_file_depth,
            paths: deep,
        });
    }

    let files = decode_entries(entries, config.decode_concurrency).await?;

    let mut context = Context::new(name, ignore);
    for file in files {
        context.add_file(file)?;
    }

    info!(
        component = %context.name(),
        files = context.files().len(),
        "loaded component archive"
    );
    Ok(context)
}

/// Reads every entry, refusing any that decompresses past `max_bytes`.
/// Header sizes are never trusted for allocation.
fn read_archive(path: &Path, max_bytes: u64) -> Result<ArchiveScan, ContextError> {
    let file = std::fs::File::open(path).map_err(|e| zip_read(path, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| zip_read(path, e))?;

    let mut scan = ArchiveScan::default();
    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(|e| zip_read(path, e))?;
        let name = normalize_path(entry.name());
        if is_system_entry(&name) {
            debug!(entry = %name, "ignoring system entry");
            continue;
        }
        if entry.is_dir() || name.is_empty() {
            continue;
        }

        let mut bytes = Vec::new();
        entry
            .take(max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|e| zip_read(path, e))?;
        if bytes.len() as u64 > max_bytes {
            return Err(zip_read(
                path,
                format!("entry {} exceeds size limit ({} bytes)", name, max_bytes),
            ));
        }

        if is_plain_text(&bytes) {
            scan.text.push(RawEntry { path: name, bytes });
        } else {
            debug!(entry = %name, "binary entry");
            scan.binary.push(name);
        }
    }
    Ok(scan)
}

/// Decodes every entry concurrently, with at most `limit` decodes in
/// flight, and returns the files in the order the entries were given.
async fn decode_entries(entries: Vec<RawEntry>, limit: usize) -> Result<Vec<File>, ContextError> {
    let semaphore = Arc::new(Semaphore::new(limit.clamp(1, Semaphore::MAX_PERMITS)));
    let mut handles = Vec::with_capacity(entries.len());

    for entry in entries {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| ContextError::ZipDecode {
                path: entry.path.clone(),
                reason: e.to_string(),
            })?;
        let path = entry.path.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            match decode_text(&entry.bytes) {
                Ok(content) => Ok(File::new(entry.path, content)),
                Err(reason) => Err(ContextError::ZipDecode {
                    path: entry.path,
                    reason,
                }),
            }
        });
        handles.push((path, handle));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (path, handle) in handles {
        results.push(handle.await.map_err(|e| ContextError::ZipDecode {
            path,
            reason: e.to_string(),
        }));
    }

    results.into_iter().map(|r| r.and_then(|inner| inner)).collect()
}

fn zip_read(path: &Path, err: impl std::fmt::Display) -> ContextError {
    ContextError::ZipRead {
        path: PathBuf::from(path),
        reason: err.to_string(),
    }
}
