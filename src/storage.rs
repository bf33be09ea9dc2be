/*!
File storage for uploaded album covers
*/
use async_std::path::PathBuf;

use crate::{crypto, Result};

#[async_trait::async_trait]
pub trait FileStore: Send + Sync {
    /// Store `bytes` under a file name derived from their contents and
    /// return that name. The same bytes always map to the same name.
    async fn write(&self, bytes: &[u8], extension: &str) -> Result<String>;
}

pub struct LocalFileStore {
    dir: PathBuf,
}

impl LocalFileStore {
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        async_std::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }
}

#[async_trait::async_trait]
impl FileStore for LocalFileStore {
    async fn write(&self, bytes: &[u8], extension: &str) -> Result<String> {
        let name = format!("{}.{}", hex::encode(crypto::hash(bytes)), extension);
        async_std::fs::write(self.dir.join(&name), bytes).await?;
        Ok(name)
    }
}
