use crate::{errors::ObjectStoreError, providers::object::ObjectStore};
use async_trait::async_trait;
use std::{
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};

/// An object store backed by a directory tree: `{root}/{bucket}/{key}`.
#[derive(Clone, Debug)]
pub struct LocalObjectStore {
    bucket_dir: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl AsRef<Path>, bucket: &str) -> Self {
        Self {
            bucket_dir: root.as_ref().join(bucket),
        }
    }

    /// Resolves a key inside the bucket directory, refusing keys that climb out of it.
    fn resolve(&self, key: &str) -> Result<PathBuf, ObjectStoreError> {
        let relative = Path::new(key.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(ObjectStoreError::NotFound(key.to_string()));
        }
        Ok(self.bucket_dir.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn get_object(&self, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let path = self.resolve(key)?;
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ObjectStoreError::NotFound(key.to_string()),
            _ => ObjectStoreError::Io(e),
        })
    }
}
