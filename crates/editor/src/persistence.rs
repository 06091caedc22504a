//! Best-effort persistence of the live project
//!
//! Storage backends implement [`ProjectStorage`], a key to JSON document
//! store. The [`Autosaver`] runs a background task that writes whatever the
//! editor hands it; a failed write is logged and never reaches the edit
//! that triggered it.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use floorgraph_core::{GraphError, GraphResult};
use floorgraph_ir::{ExportOptions, Project, export_project_with};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;

// ============================================================================
// ProjectStorage
// ============================================================================

/// Key/value store for serialized projects
pub trait ProjectStorage: Send + Sync + 'static {
    /// Fetch the document stored under `key`, `None` when absent
    fn load(&self, key: &str) -> impl Future<Output = GraphResult<Option<String>>> + Send;

    /// Store `json` under `key`, replacing any previous document
    fn save(&self, key: &str, json: String) -> impl Future<Output = GraphResult<()>> + Send;
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    /// Store documents under `dir` (created on first save)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the documents
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

impl ProjectStorage for JsonFileStorage {
    async fn load(&self, key: &str) -> GraphResult<Option<String>> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GraphError::FileRead {
                path,
                message: e.to_string(),
            }),
        }
    }

    async fn save(&self, key: &str, json: String) -> GraphResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| GraphError::DirectoryCreate {
                path: self.dir.clone(),
                message: e.to_string(),
            })?;

        // Write aside, then rename over the target
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, json)
            .await
            .map_err(|e| GraphError::FileWrite {
                path: staging.clone(),
                message: e.to_string(),
            })?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|e| GraphError::FileWrite {
                path: path.clone(),
                message: e.to_string(),
            })?;

        tracing::debug!("Persisted '{}' to {}", key, path.display());
        Ok(())
    }
}

/// In-process storage, shared between clones
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    documents: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one document
    pub fn with_document(key: impl Into<String>, json: impl Into<String>) -> Self {
        let mut documents = HashMap::new();
        documents.insert(key.into(), json.into());
        Self {
            documents: Arc::new(Mutex::new(documents)),
        }
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.documents.lock().await.len()
    }

    /// Whether nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.documents.lock().await.is_empty()
    }
}

impl ProjectStorage for MemoryStorage {
    async fn load(&self, key: &str) -> GraphResult<Option<String>> {
        Ok(self.documents.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, json: String) -> GraphResult<()> {
        self.documents.lock().await.insert(key.to_string(), json);
        Ok(())
    }
}

// ============================================================================
// Autosaver
// ============================================================================

enum SaveRequest {
    Save(Box<Project>),
    Flush(oneshot::Sender<()>),
}

/// Handle to a background task that persists projects.
///
/// Enqueueing never blocks and never fails. Bursts are coalesced: only the
/// newest queued project is written.
#[derive(Debug, Clone)]
pub struct Autosaver {
    tx: mpsc::UnboundedSender<SaveRequest>,
    key: String,
}

impl Autosaver {
    /// Spawn the save task on the current Tokio runtime.
    ///
    /// The task exits once every `Autosaver` clone has been dropped.
    pub fn spawn<S: ProjectStorage>(storage: S, key: impl Into<String>) -> (Self, JoinHandle<()>) {
        let key = key.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_saver(storage, key.clone(), rx));
        (Self { tx, key }, handle)
    }

    /// Storage key written by this saver
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Queue `project` for saving
    pub fn enqueue(&self, project: &Project) {
        if self
            .tx
            .send(SaveRequest::Save(Box::new(project.clone())))
            .is_err()
        {
            tracing::warn!("Autosave task has stopped, dropping save of '{}'", self.key);
        }
    }

    /// Wait until everything queued so far has been written (or failed)
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(SaveRequest::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

async fn run_saver<S: ProjectStorage>(
    storage: S,
    key: String,
    mut rx: mpsc::UnboundedReceiver<SaveRequest>,
) {
    tracing::debug!("Autosave task started for '{}'", key);

    while let Some(request) = rx.recv().await {
        let mut latest = None;
        let mut waiters = Vec::new();
        let mut next = Some(request);

        while let Some(request) = next {
            match request {
                SaveRequest::Save(project) => latest = Some(project),
                SaveRequest::Flush(done) => waiters.push(done),
            }
            next = rx.try_recv().ok();
        }

        if let Some(project) = latest {
            write_project(&storage, &key, &project).await;
        }
        for done in waiters {
            let _ = done.send(());
        }
    }

    tracing::debug!("Autosave task for '{}' stopped", key);
}

async fn write_project<S: ProjectStorage>(storage: &S, key: &str, project: &Project) {
    let options = ExportOptions {
        strip_images: false,
        pretty: false,
    };
    let json = match export_project_with(project, options) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Autosave of '{}' failed to serialize: {}", key, e);
            return;
        }
    };
    if let Err(e) = storage.save(key, json).await {
        tracing::error!("Autosave of '{}' failed: {}", key, e);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use floorgraph_ir::{FloorDraft, import_project};
    use tempfile::TempDir;

    /// Storage whose writes always fail
    struct BrokenStorage;

    impl ProjectStorage for BrokenStorage {
        async fn load(&self, _key: &str) -> GraphResult<Option<String>> {
            Err(GraphError::storage("broken", "unavailable"))
        }

        async fn save(&self, key: &str, _json: String) -> GraphResult<()> {
            Err(GraphError::storage(key, "disk full"))
        }
    }

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.load("k").await.unwrap(), None);
        storage.save("k", "{}".into()).await.unwrap();
        assert_eq!(storage.load("k").await.unwrap().as_deref(), Some("{}"));
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn test_json_file_storage_round_trip() {
        let temp = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(temp.path().join("store"));

        assert_eq!(storage.load("campus-map-project").await.unwrap(), None);
        storage
            .save("campus-map-project", "{\"a\":1}".into())
            .await
            .unwrap();

        let path = storage.path_for("campus-map-project");
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(
            storage.load("campus-map-project").await.unwrap().as_deref(),
            Some("{\"a\":1}")
        );
    }

    #[test]
    fn test_path_for_sanitizes_key() {
        let storage = JsonFileStorage::new("/data");
        assert_eq!(storage.path_for("../evil key"), PathBuf::from("/data/___evil_key.json"));
    }

    #[tokio::test]
    async fn test_autosaver_writes_latest() {
        let storage = MemoryStorage::new();
        let (saver, handle) = Autosaver::spawn(storage.clone(), "project");

        let mut project = Project::new("Autosaved");
        saver.enqueue(&project);
        project.add_floor(FloorDraft::new("L1"));
        saver.enqueue(&project);
        saver.flush().await;

        let json = storage.load("project").await.unwrap().unwrap();
        assert_eq!(import_project(&json).unwrap(), project);

        drop(saver);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_autosaver_survives_failing_storage() {
        let (saver, handle) = Autosaver::spawn(BrokenStorage, "project");
        saver.enqueue(&Project::default());
        saver.flush().await;
        saver.enqueue(&Project::default());
        saver.flush().await;
        drop(saver);
        handle.await.unwrap();
    }
}
