use super::backend::StorageBackend;
use crate::error::{ListalicoError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const VALUE_EXT: &str = ".json";

/// File-per-key storage rooted at a data directory: `<root>/<key>.json`.
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn value_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}{}", key, VALUE_EXT))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(ListalicoError::Io)?;
        }
        Ok(())
    }

    fn check_key(key: &str) -> Result<()> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(ListalicoError::Store(format!("Invalid storage key: {:?}", key)));
        }
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Self::check_key(key)?;
        let path = self.value_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(ListalicoError::Io)?;
        Ok(Some(content))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        Self::check_key(key)?;
        self.ensure_dir()?;

        let tmp_file = self.root.join(format!(".{}-{}.tmp", key, Uuid::new_v4()));
        fs::write(&tmp_file, value).map_err(ListalicoError::Io)?;
        fs::rename(&tmp_file, self.value_path(key)).map_err(ListalicoError::Io)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        Self::check_key(key)?;
        let path = self.value_path(key);
        if path.exists() {
            fs::remove_file(path).map_err(ListalicoError::Io)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(ListalicoError::Io)? {
            let entry = entry.map_err(ListalicoError::Io)?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if let Some(key) = name.strip_suffix(VALUE_EXT) {
                keys.push(key.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}
