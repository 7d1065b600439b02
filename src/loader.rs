//! Source dispatch: picks the directory or zip loader for a path.

use std::path::Path;

use crate::config::LoaderConfig;
use crate::context::Context;
use crate::error::ContextError;
use crate::loader_dir::load_directory;
use crate::loader_zip::load_zip;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Directory,
    Zip,
}

pub fn detect_source(source: &Path) -> Result<SourceKind, ContextError> {
    if !source.exists() {
        return Err(ContextError::SourceNotFound(source.to_path_buf()));
    }
    if source.is_dir() {
        return Ok(SourceKind::Directory);
    }
    let is_zip = source
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false);
    if source.is_file() && is_zip {
        Ok(SourceKind::Zip)
    } else {
        Err(ContextError::UnsupportedSource(source.to_path_buf()))
    }
}

pub async fn load_context(source: &Path, config: &LoaderConfig) -> Result<Context, ContextError> {
    match detect_source(source)? {
        SourceKind::Directory => load_directory(source, config).await,
        SourceKind::Zip => load_zip(source, config).await,
    }
}
