//! JSON file save backend: one `<slot>.json` per slot under a directory.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use maw_game::{MawSave, SaveStorage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("save slot name {0:?} is not a plain file name")]
    InvalidSlot(String),
    #[error("save file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("save file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    root: PathBuf,
}

impl JsonFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn slot_path(&self, slot: &str) -> Result<PathBuf, StorageError> {
        let plain = !slot.is_empty()
            && slot
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !plain {
            return Err(StorageError::InvalidSlot(slot.to_string()));
        }
        Ok(self.root.join(format!("{slot}.json")))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SaveStorage for JsonFileStorage {
    type Error = StorageError;

    fn save_record(&self, slot: &str, record: &MawSave) -> Result<(), Self::Error> {
        let path = self.slot_path(slot)?;
        fs::create_dir_all(&self.root)?;
        fs::write(path, serde_json::to_vec_pretty(record)?)?;
        Ok(())
    }

    fn load_record(&self, slot: &str) -> Result<Option<MawSave>, Self::Error> {
        let path = self.slot_path(slot)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn delete_record(&self, slot: &str) -> Result<(), Self::Error> {
        let path = self.slot_path(slot)?;
        match fs::remove_file(path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}
