//! Ordered file registry keyed by normalized path.
//!
//! Records are kept in a `Vec` in insertion order, with a side index from
//! path to position for constant-time lookup. Removal shifts later records
//! down and reindexes them so iteration order never changes for the files
//! that remain.

use regex::Regex;
use std::collections::HashMap;

use crate::error::ContextError;
use crate::models::{File, FileKey};

/// Selects a subset of the registry in [`FileRegistry::get_files`].
pub enum FileSelector<'a> {
    All,
    Predicate(&'a dyn Fn(&File) -> bool),
    Pattern(&'a Regex),
}

#[derive(Debug, Default, Clone)]
pub struct FileRegistry {
    files: Vec<File>,
    index: HashMap<String, usize>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `file`, failing with [`ContextError::DuplicatePath`] if a
    /// file with the same path is already registered.
    pub fn add_file(&mut self, file: File) -> Result<(), ContextError> {
        if self.index.contains_key(&file.path) {
            return Err(ContextError::DuplicatePath(file.path));
        }
        self.index.insert(file.path.clone(), self.files.len());
        self.files.push(file);
        Ok(())
    }

    /// Removes the file with the given path. Absent paths are ignored.
    pub fn remove_file<K: FileKey + ?Sized>(&mut self, key: &K) -> Option<File> {
        let pos = self.index.remove(key.file_key())?;
        let removed = self.files.remove(pos);
        for file in &self.files[pos..] {
            if let Some(i) = self.index.get_mut(&file.path) {
                *i -= 1;
            }
        }
        Some(removed)
    }

    pub fn exists_file<K: FileKey + ?Sized>(&self, key: &K) -> bool {
        self.index.contains_key(key.file_key())
    }

    pub fn get_file<K: FileKey + ?Sized>(&self, key: &K) -> Option<&File> {
        self.index.get(key.file_key()).map(|&i| &self.files[i])
    }

    /// Returns the selected files in insertion order.
    pub fn get_files(&self, selector: FileSelector<'_>) -> Vec<&File> {
        match selector {
            FileSelector::All => self.files.iter().collect(),
            FileSelector::Predicate(pred) => self.files.iter().filter(|&f| pred(f)).collect(),
            FileSelector::Pattern(re) => self.files.iter().filter(|f| re.is_match(&f.path)).collect(),
        }
    }

    pub fn files(&self) -> Vec<&File> {
        self.get_files(FileSelector::All)
    }

    pub fn files_where(&self, pred: impl Fn(&File) -> bool) -> Vec<&File> {
        self.get_files(FileSelector::Predicate(&pred))
    }

    pub fn files_matching(&self, pattern: &Regex) -> Vec<&File> {
        self.get_files(FileSelector::Pattern(pattern))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, File> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<'a> IntoIterator for &'a FileRegistry {
    type Item = &'a File;
    type IntoIter = std::slice::Iter<'a, File>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
