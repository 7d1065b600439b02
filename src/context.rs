//! The validated snapshot handed to rule checks.

use crate::error::ContextError;
use crate::ignore::IgnoreMatcher;
use crate::models::{File, FileKey};
use crate::registry::{FileRegistry, FileSelector};

#[derive(Debug, Clone)]
pub struct Context {
    name: String,
    files: FileRegistry,
    ignore: IgnoreMatcher,
}

impl Context {
    pub fn new(name: impl Into<String>, ignore: IgnoreMatcher) -> Self {
        Self {
            name: name.into(),
            files: FileRegistry::new(),
            ignore,
        }
    }

    /// Component name: the root directory name or the archive's top-level folder.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn files(&self) -> &FileRegistry {
        &self.files
    }

    pub fn files_mut(&mut self) -> &mut FileRegistry {
        &mut self.files
    }

    pub fn ignore(&self) -> &IgnoreMatcher {
        &self.ignore
    }

    pub fn add_file(&mut self, file: File) -> Result<(), ContextError> {
        self.files.add_file(file)
    }

    pub fn remove_file<K: FileKey + ?Sized>(&mut self, key: &K) -> Option<File> {
        self.files.remove_file(key)
    }

    pub fn exists_file<K: FileKey + ?Sized>(&self, key: &K) -> bool {
        self.files.exists_file(key)
    }

    pub fn get_file<K: FileKey + ?Sized>(&self, key: &K) -> Option<&File> {
        self.files.get_file(key)
    }

    pub fn get_files(&self, selector: FileSelector<'_>) -> Vec<&File> {
        self.files.get_files(selector)
    }

    pub fn is_ignore(&self, path: &str) -> bool {
        self.ignore.is_ignore(path)
    }

    /// Drops every file matched by the ignore patterns and returns their paths.
    pub fn prune_ignored(&mut self) -> Vec<String> {
        let ignored: Vec<String> = self
            .files
            .paths()
            .filter(|p| self.ignore.is_ignore(p))
            .map(str::to_string)
            .collect();
        for path in &ignored {
            self.files.remove_file(path);
        }
        ignored
    }
}
