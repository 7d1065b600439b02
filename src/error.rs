//! Error type returned by every context-building operation.
//!
//! Path lists are carried verbatim so callers can show them to the user
//! exactly as collected.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// The directory or archive does not exist.
    #[error("source does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The path exists but is neither a directory nor a zip archive.
    #[error("unsupported source (expected a directory or a .zip archive): {}", .0.display())]
    UnsupportedSource(PathBuf),

    #[error("files nested deeper than {max_depth} level(s):\n{}", list(.paths))]
    DeepHierarchy { max_depth: usize, paths: Vec<String> },

    #[error("binary files are not allowed:\n{}", list(.paths))]
    BinaryContent { paths: Vec<String> },

    #[error("files larger than {max_bytes} bytes:\n{}", list(.paths))]
    FileTooLarge { max_bytes: u64, paths: Vec<String> },

    /// Directory walks report every kind of violation they found together,
    /// one list per kind.
    #[error(
        "component structure is invalid{}",
        sections(.max_depth, .max_bytes, .deep, .binary, .oversize)
    )]
    Violations {
        max_depth: usize,
        max_bytes: u64,
        deep: Vec<String>,
        binary: Vec<String>,
        oversize: Vec<String>,
    },

    #[error("failed to read zip archive {}: {reason}", .path.display())]
    ZipRead { path: PathBuf, reason: String },

    #[error("failed to decode zip entry {path}: {reason}")]
    ZipDecode { path: String, reason: String },

    #[error("invalid component name '{name}' (must match {pattern})")]
    InvalidComponentName { name: String, pattern: String },

    #[error("component is empty: no text files found")]
    EmptyComponent,

    #[error("file already exists in context: {0}")]
    DuplicatePath(String),

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContextError {
    /// Paths rejected for exceeding the depth limit, whichever variant holds them.
    pub fn deep_paths(&self) -> &[String] {
        match self {
            ContextError::DeepHierarchy { paths, .. } => paths,
            ContextError::Violations { deep, .. } => deep,
            _ => &[],
        }
    }

    /// Paths rejected for exceeding the size limit, whichever variant holds them.
    pub fn oversize_paths(&self) -> &[String] {
        match self {
            ContextError::FileTooLarge { paths, .. } => paths,
            ContextError::Violations { oversize, .. } => oversize,
            _ => &[],
        }
    }

    /// Paths rejected for binary content, whichever variant holds them.
    pub fn binary_paths(&self) -> &[String] {
        match self {
            ContextError::BinaryContent { paths } => paths,
            ContextError::Violations { binary, .. } => binary,
            _ => &[],
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ContextError::Io {
            path: path.into(),
            source,
        }
    }

    /// Builds the aggregate error for a finished directory walk, if any
    /// violation was collected.
    pub(crate) fn from_violations(
        max_depth: usize,
        max_bytes: u64,
        deep: Vec<String>,
        binary: Vec<String>,
        oversize: Vec<String>,
    ) -> Option<Self> {
        let kinds = [&deep, &binary, &oversize]
            .iter()
            .filter(|l| !l.is_empty())
            .count();
        match kinds {
            0 => None,
            1 if !deep.is_empty() => Some(ContextError::DeepHierarchy {
                max_depth,
                paths: deep,
            }),
            1 if !binary.is_empty() => Some(ContextError::BinaryContent { paths: binary }),
            1 => Some(ContextError::FileTooLarge {
                max_bytes,
                paths: oversize,
            }),
            _ => Some(ContextError::Violations {
                max_depth,
                max_bytes,
                deep,
                binary,
                oversize,
            }),
        }
    }
}

fn sections(
    max_depth: &usize,
    max_bytes: &u64,
    deep: &[String],
    binary: &[String],
    oversize: &[String],
) -> String {
    let mut out = String::new();
    if !deep.is_empty() {
        out.push_str(&format!(
            "\nfiles nested deeper than {} level(s):\n{}",
            max_depth,
            list(deep)
        ));
    }
    if !binary.is_empty() {
        out.push_str(&format!("\nbinary files are not allowed:\n{}", list(binary)));
    }
    if !oversize.is_empty() {
        out.push_str(&format!(
            "\nfiles larger than {} bytes:\n{}",
            max_bytes,
            list(oversize)
        ));
    }
    out
}

fn list(paths: &[String]) -> String {
    paths
        .iter()
        .map(|p| format!("  {}", p))
        .collect::<Vec<_>>()
        .join("\n")
}
