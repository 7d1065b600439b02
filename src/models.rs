//! Core data models shared by the registry and the loaders.

/// A single text file of a component.
///
/// `path` is forward-slash separated and relative to the parent of the
/// component root, so it always starts with the component name
/// (e.g. `widget/index.js`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub path: String,
    pub content: String,
}

impl File {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: normalize_path(&path.into()),
            content: content.into(),
        }
    }

    /// Number of path separators, i.e. how far below the component root
    /// this file lives. `widget/index.js` has depth 1.
    pub fn depth(&self) -> usize {
        path_depth(&self.path)
    }
}

/// Anything that identifies a file in a registry: a path or a file record.
pub trait FileKey {
    fn file_key(&self) -> &str;
}

impl FileKey for str {
    fn file_key(&self) -> &str {
        self
    }
}

impl FileKey for String {
    fn file_key(&self) -> &str {
        self.as_str()
    }
}

impl FileKey for File {
    fn file_key(&self) -> &str {
        &self.path
    }
}

impl<T: FileKey + ?Sized> FileKey for &T {
    fn file_key(&self) -> &str {
        (**self).file_key()
    }
}

/// Converts platform separators to `/` and drops any leading `./` or `/`.
pub fn normalize_path(path: &str) -> String {
    let replaced = path.replace('\\', "/");
    let mut trimmed = replaced.as_str();
    loop {
        if let Some(rest) = trimmed.strip_prefix("./") {
            trimmed = rest;
        } else if let Some(rest) = trimmed.strip_prefix('/') {
            trimmed = rest;
        } else {
            break;
        }
    }
    trimmed.to_string()
}

pub fn path_depth(path: &str) -> usize {
    path.matches('/').count()
}
