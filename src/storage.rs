//! Durable storage for the heading override store.
//!
//! The store is persisted as one JSON object under one key. The backend only
//! moves that text in and out; parsing and recovery from corrupt data live in
//! [`crate::heading::OverrideStore`].

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// A single durable slot holding the serialized override store.
pub trait OverrideBackend {
    /// Read the stored text, or `None` if nothing has been written yet.
    fn read(&self) -> Result<Option<String>>;

    /// Replace the stored text.
    fn write(&mut self, contents: &str) -> Result<()>;
}

impl<B: OverrideBackend + ?Sized> OverrideBackend for &mut B {
    fn read(&self) -> Result<Option<String>> {
        (**self).read()
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        (**self).write(contents)
    }
}

/// Backend that keeps the text in memory. Useful for tests and for hosts
/// that persist the store themselves.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    contents: Option<String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: &str) -> Self {
        Self { contents: Some(contents.to_string()) }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl OverrideBackend for MemoryBackend {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.contents.clone())
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        self.contents = Some(contents.to_string());
        Ok(())
    }
}

/// Backend storing the text in a JSON file.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// failed write leaves the previous file intact.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OverrideBackend for JsonFileBackend {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend() {
        let mut backend = MemoryBackend::new();
        assert_eq!(backend.read().unwrap(), None);
        backend.write("{}").unwrap();
        assert_eq!(backend.read().unwrap().as_deref(), Some("{}"));
        assert_eq!(backend.contents(), Some("{}"));
    }

    #[test]
    fn test_file_backend_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("headings.json"));
        assert_eq!(backend.read().unwrap(), None);
    }

    #[test]
    fn test_file_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("headings.json");
        let mut backend = JsonFileBackend::new(&path);

        backend.write(r#"{"a.jpg":{"yaw":1.0,"pitch":2.0}}"#).unwrap();
        backend.write(r#"{"b.jpg":{"yaw":3.0,"pitch":4.0}}"#).unwrap();

        let reopened = JsonFileBackend::new(&path);
        assert_eq!(
            reopened.read().unwrap().as_deref(),
            Some(r#"{"b.jpg":{"yaw":3.0,"pitch":4.0}}"#)
        );
        assert!(!path.with_extension("json.tmp").exists());
    }
}
