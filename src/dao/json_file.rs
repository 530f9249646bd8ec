//! Values kept in a small JSON document on disk.
//!
//! The file maps namespaces to key/value objects, e.g.
//! `{"simon": {"high_score": 12}}`, so several tools can share it.

use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::storage::{PersistentStore, StorageError, StorageResult};

type Document = BTreeMap<String, BTreeMap<String, u32>>;

/// JSON file backend.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    namespace: String,
    document: Option<Document>,
}

impl JsonFileStore {
    /// Store values of `namespace` in the file at `path`.
    pub fn new(path: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            namespace: namespace.into(),
            document: None,
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> StorageResult<Document> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "score file missing; starting empty");
                return Ok(Document::new());
            }
            Err(err) => {
                return Err(StorageError::unavailable(
                    format!("failed to read `{}`", self.path.display()),
                    err,
                ));
            }
        };

        serde_json::from_slice(&raw).map_err(|err| StorageError::Corrupt {
            key: self.namespace.clone(),
            message: err.to_string(),
        })
    }

    fn write_document(&self, document: &Document) -> StorageResult<()> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|err| {
                    StorageError::unavailable(
                        format!("failed to create `{}`", parent.display()),
                        err,
                    )
                })?;
                parent
            }
            None => Path::new("."),
        };
        let write_failed = |err: io::Error| {
            StorageError::unavailable(format!("failed to write `{}`", self.path.display()), err)
        };

        let mut scratch = NamedTempFile::new_in(dir).map_err(write_failed)?;
        serde_json::to_writer_pretty(&mut scratch, document)
            .map_err(|err| StorageError::unavailable("failed to encode scores".into(), err))?;
        scratch.flush().map_err(write_failed)?;
        scratch
            .persist(&self.path)
            .map_err(|err| write_failed(err.error))?;
        Ok(())
    }
}

impl PersistentStore for JsonFileStore {
    fn open(&mut self) -> StorageResult<()> {
        let document = self.read_document()?;
        debug!(path = %self.path.display(), namespaces = document.len(), "score file opened");
        self.document = Some(document);
        Ok(())
    }

    fn load(&mut self, key: &str) -> StorageResult<Option<u32>> {
        let document = self.document.as_ref().ok_or(StorageError::NotOpen)?;
        Ok(document
            .get(&self.namespace)
            .and_then(|values| values.get(key))
            .copied())
    }

    fn save(&mut self, key: &str, value: u32) -> StorageResult<()> {
        let mut document = self.document.clone().ok_or(StorageError::NotOpen)?;
        document
            .entry(self.namespace.clone())
            .or_default()
            .insert(key.to_owned(), value);

        self.write_document(&document)?;
        self.document = Some(document);
        Ok(())
    }
}
