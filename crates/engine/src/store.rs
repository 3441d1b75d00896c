use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EngineError, Result};
use crate::slot::Slot;

const SAVE_CHANNEL_CAPACITY: usize = 8;

/// One persisted timeline document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTimeline {
    pub video_id: String,
    pub saved_at_ms: u64,
    pub slots: Vec<Slot>,
}

/// Persistence operations for per-video slot lists.
///
/// `save` may be called again before an earlier call returns.
pub trait SlotStore {
    /// Loads the slot list of `video_id`; an unknown video has no slots.
    fn load(&self, video_id: &str) -> Result<Vec<Slot>>;

    /// Stores a full snapshot and returns the document as accepted.
    fn save(&self, video_id: &str, slots: &[Slot]) -> Result<StoredTimeline>;
}

/// File-backed store keeping `<root>/<video_id>.json` per video.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document for `video_id`. Ids are limited to ASCII
    /// letters, digits, `-` and `_`.
    pub fn path_for(&self, video_id: &str) -> Result<PathBuf> {
        let valid = !video_id.is_empty()
            && video_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(EngineError::InvalidVideoId {
                video_id: video_id.to_owned(),
            });
        }
        Ok(self.root.join(format!("{video_id}.json")))
    }
}

impl SlotStore for JsonFileStore {
    fn load(&self, video_id: &str) -> Result<Vec<Slot>> {
        let path = self.path_for(video_id)?;
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(video_id, path = ?path, "no stored timeline");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(EngineError::StoreIo {
                    context: "failed to read timeline",
                    path,
                    source,
                });
            }
        };
        let stored: StoredTimeline = serde_json::from_str(&text)
            .map_err(|source| EngineError::StoreSerialization { path, source })?;
        Ok(stored.slots)
    }

    fn save(&self, video_id: &str, slots: &[Slot]) -> Result<StoredTimeline> {
        let path = self.path_for(video_id)?;
        std::fs::create_dir_all(&self.root).map_err(|source| EngineError::StoreIo {
            context: "failed to create store directory",
            path: self.root.clone(),
            source,
        })?;

        let stored = StoredTimeline {
            video_id: video_id.to_owned(),
            saved_at_ms: now_ms(),
            slots: slots.to_vec(),
        };
        let text = serde_json::to_string_pretty(&stored).map_err(|source| {
            EngineError::StoreSerialization {
                path: path.clone(),
                source,
            }
        })?;

        let staging = path.with_extension("json.tmp");
        std::fs::write(&staging, text).map_err(|source| EngineError::StoreIo {
            context: "failed to write timeline",
            path: staging.clone(),
            source,
        })?;
        std::fs::rename(&staging, &path).map_err(|source| EngineError::StoreIo {
            context: "failed to replace timeline",
            path: path.clone(),
            source,
        })?;

        info!(video_id, path = ?path, slot_count = slots.len(), "timeline saved");
        Ok(stored)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Snapshot handed to the save worker.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub video_id: String,
    pub revision: u64,
    pub slots: Vec<Slot>,
}

/// Outcome of one save, tagged with the revision it was requested at.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveResult {
    pub revision: u64,
    pub result: std::result::Result<StoredTimeline, String>,
}

/// Sender used to queue snapshots for the save worker.
pub type SaveRequestSender = mpsc::SyncSender<SaveRequest>;

/// Receiver the editor side reads save outcomes from.
pub type SaveResultReceiver = mpsc::Receiver<SaveResult>;

/// Runs saves on a background thread so editing never waits on I/O.
///
/// The worker exits when the request sender is dropped or the result
/// receiver hangs up.
pub fn spawn_save_worker<S>(store: S) -> (SaveRequestSender, SaveResultReceiver)
where
    S: SlotStore + Send + 'static,
{
    let (request_tx, request_rx) = mpsc::sync_channel::<SaveRequest>(SAVE_CHANNEL_CAPACITY);
    let (result_tx, result_rx) = mpsc::sync_channel::<SaveResult>(SAVE_CHANNEL_CAPACITY);

    thread::spawn(move || {
        while let Ok(request) = request_rx.recv() {
            let result = store
                .save(&request.video_id, &request.slots)
                .map_err(|error| {
                    warn!(video_id = %request.video_id, %error, "save failed");
                    error.to_string()
                });
            let outcome = SaveResult {
                revision: request.revision,
                result,
            };
            if result_tx.send(outcome).is_err() {
                return;
            }
        }
    });

    (request_tx, result_rx)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::{JsonFileStore, SaveRequest, SlotStore, spawn_save_worker};
    use crate::error::EngineError;
    use crate::slot::SlotDraft;

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "slot-store-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("system clock must be after unix epoch")
                .as_nanos()
        ))
    }

    #[test]
    fn save_then_load_returns_same_slots() {
        let store = JsonFileStore::new(scratch_dir("roundtrip"));
        let slots = vec![
            SlotDraft::new(0.0, 1.0).into_slot(1),
            SlotDraft::new(2.0, 3.5).into_slot(2),
        ];

        let stored = store.save("video-1", &slots).expect("save should succeed");
        assert_eq!(stored.video_id, "video-1");
        assert!(stored.saved_at_ms > 0);

        let loaded = store.load("video-1").expect("load should succeed");
        assert_eq!(loaded, slots);
        let _ = std::fs::remove_dir_all(store.root());
    }

    #[test]
    fn unknown_video_loads_empty() {
        let store = JsonFileStore::new(scratch_dir("missing"));
        assert!(store.load("nothing").expect("load should succeed").is_empty());
    }

    #[test]
    fn path_like_video_ids_are_rejected() {
        let store = JsonFileStore::new(scratch_dir("ids"));
        for id in ["", "../etc", "a/b", "x.json"] {
            assert!(matches!(
                store.load(id),
                Err(EngineError::InvalidVideoId { .. })
            ));
        }
    }

    #[test]
    fn worker_reports_revision_with_result() {
        let store = JsonFileStore::new(scratch_dir("worker"));
        let root = store.root().to_path_buf();
        let (tx, rx) = spawn_save_worker(store);

        tx.send(SaveRequest {
            video_id: String::from("clip"),
            revision: 7,
            slots: vec![SlotDraft::new(1.0, 2.0).into_slot(3)],
        })
        .expect("worker should accept request");
        tx.send(SaveRequest {
            video_id: String::from("bad/id"),
            revision: 8,
            slots: Vec::new(),
        })
        .expect("worker should accept request");

        let first = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("first result should arrive");
        assert_eq!(first.revision, 7);
        assert_eq!(first.result.expect("save should succeed").slots.len(), 1);

        let second = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("second result should arrive");
        assert_eq!(second.revision, 8);
        assert!(second.result.is_err());
        let _ = std::fs::remove_dir_all(root);
    }
}
