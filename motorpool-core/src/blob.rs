use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Seam to the external blob store holding uploaded evidence (photos,
/// license scans). The engine only ever sees opaque ids.
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    async fn put(&self, content: Vec<u8>) -> Result<Uuid, BlobError>;
    async fn contains(&self, id: Uuid) -> Result<bool, BlobError>;
}

/// In-memory stand-in for the real blob store, good enough for the engine
/// and its tests.
#[derive(Default)]
pub struct MemoryEvidenceStore {
    blobs: RwLock<HashMap<Uuid, Vec<u8>>>,
}

impl MemoryEvidenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EvidenceStore for MemoryEvidenceStore {
    async fn put(&self, content: Vec<u8>) -> Result<Uuid, BlobError> {
        let id = Uuid::new_v4();
        self.blobs.write().await.insert(id, content);
        Ok(id)
    }

    async fn contains(&self, id: Uuid) -> Result<bool, BlobError> {
        Ok(self.blobs.read().await.contains_key(&id))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("Evidence store unavailable: {0}")]
    Unavailable(String),
}
