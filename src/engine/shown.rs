use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("shown-set storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("shown-set storage is not a JSON list of ids: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable memory of transaction ids whose animation already played.
pub trait ShownStore {
    fn load(&self) -> Result<HashSet<String>, StoreError>;

    fn save(&mut self, shown: &HashSet<String>) -> Result<(), StoreError>;
}

impl<S: ShownStore + ?Sized> ShownStore for Box<S> {
    fn load(&self) -> Result<HashSet<String>, StoreError> {
        (**self).load()
    }

    fn save(&mut self, shown: &HashSet<String>) -> Result<(), StoreError> {
        (**self).save(shown)
    }
}

#[derive(Clone, Debug)]
pub struct FileShownStore {
    path: PathBuf,
}

impl FileShownStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ShownStore for FileShownStore {
    fn load(&self) -> Result<HashSet<String>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(error) => return Err(error.into()),
        };

        if raw.trim().is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<String> = serde_json::from_str(&raw)?;
        Ok(ids.into_iter().collect())
    }

    fn save(&mut self, shown: &HashSet<String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut ids = shown.iter().map(String::as_str).collect::<Vec<_>>();
        ids.sort_unstable();
        let encoded = serde_json::to_vec(&ids)?;

        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, encoded)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}
