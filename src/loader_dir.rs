//! Directory loader.
//!
//! Walks a component root and registers every file under it. Depth, size
//! and binary-content violations are collected for the whole tree and
//! reported together once the walk is finished.

use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::{BinaryPolicy, LoaderConfig};
use crate::context::Context;
use crate::error::ContextError;
use crate::models::{normalize_path, File};
use crate::text::{decode_text, is_plain_text};

/// Loads the component rooted at `root` on a blocking worker thread.
pub async fn load_directory(root: &Path, config: &LoaderConfig) -> Result<Context, ContextError> {
    let root = root.to_path_buf();
    let config = config.clone();
    let task_root = root.clone();
    tokio::task::spawn_blocking(move || scan_directory(&task_root, &config))
        .await
        .map_err(|e| ContextError::io(root, std::io::Error::other(e)))?
}

/// Synchronous walk behind [`load_directory`].
pub fn scan_directory(root: &Path, config: &LoaderConfig) -> Result<Context, ContextError> {
    if !root.is_dir() {
        return Err(ContextError::SourceNotFound(root.to_path_buf()));
    }
    // The name comes from the path as given so a symlinked root keeps the
    // link's name; `.` and `..` fall back to the resolved directory.
    let canonical = root
        .canonicalize()
        .map_err(|e| ContextError::io(root, e))?;
    let name = component_name(root).or_else(|_| component_name(&canonical))?;
    let root = root.to_path_buf();

    let mut context = Context::new(name.clone(), config.ignore_matcher()?);
    let mut deep = Vec::new();
    let mut binary = Vec::new();
    let mut oversize = Vec::new();

    let walker = WalkDir::new(&root)
        .min_depth(1)
        .follow_links(config.follow_symlinks)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
            ContextError::io(path, e.into())
        })?;
        if entry.path_is_symlink() && !config.follow_symlinks {
            debug!(path = %entry.path().display(), "skipping symlink");
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(&root).unwrap_or(path);
        let rel_str = normalize_path(&format!("{}/{}", name, relative.to_string_lossy()));

        if entry.depth() > config.max_file_depth {
            debug!(path = %rel_str, depth = entry.depth(), "file exceeds max depth");
            deep.push(rel_str);
            continue;
        }

        let size = entry
            .metadata()
            .map_err(|e| ContextError::io(path, e.into()))?
            .len();
        if size > config.max_file_bytes {
            debug!(path = %rel_str, size, "file exceeds max size");
            oversize.push(rel_str);
            continue;
        }

        let bytes = std::fs::read(path).map_err(|e| ContextError::io(path, e))?;
        let content = if is_plain_text(&bytes) {
            decode_text(&bytes).ok()
        } else {
            None
        };
        let Some(content) = content else {
            match config.directory_binary_policy {
                BinaryPolicy::Reject => {
                    debug!(path = %rel_str, "binary file rejected");
                    binary.push(rel_str);
                }
                BinaryPolicy::Skip => debug!(path = %rel_str, "binary file skipped"),
            }
            continue;
        };

        context.add_file(File::new(rel_str, content))?;
    }

    if let Some(err) = ContextError::from_violations(
        config.max_file_depth,
        config.max_file_bytes,
        deep,
        binary,
        oversize,
    ) {
        return Err(err);
    }

    info!(
        component = %name,
        files = context.files().len(),
        "loaded component directory"
    );
    Ok(context)
}

fn component_name(root: &Path) -> Result<String, ContextError> {
    root.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| ContextError::UnsupportedSource(root.to_path_buf()))
}
