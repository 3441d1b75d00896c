use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use crate::slot::SlotId;

/// Result type used by the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by editor commands, bulk import and the slot store.
#[derive(Debug)]
pub enum EngineError {
    ImportFormat {
        reason: String,
    },
    SlotNotFound {
        id: SlotId,
    },
    InvalidVideoId {
        video_id: String,
    },
    InvalidConfig {
        reason: String,
    },
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    StoreIo {
        context: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    StoreSerialization {
        path: PathBuf,
        source: serde_json::Error,
    },
    ExportSerialization(serde_json::Error),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ImportFormat { reason } => {
                write!(f, "text is neither a JSON array nor a CSV table: {reason}")
            }
            Self::SlotNotFound { id } => write!(f, "slot not found: {id}"),
            Self::InvalidVideoId { video_id } => write!(f, "invalid video id: {video_id:?}"),
            Self::InvalidConfig { reason } => write!(f, "invalid editor config: {reason}"),
            Self::ConfigIo { path, source } => {
                write!(f, "failed to read editor config: {} ({source})", path.display())
            }
            Self::ConfigParse { path, source } => {
                write!(f, "editor config {} is not valid JSON ({source})", path.display())
            }
            Self::StoreIo {
                context,
                path,
                source,
            } => write!(f, "{context}: {} ({source})", path.display()),
            Self::StoreSerialization { path, source } => {
                write!(
                    f,
                    "timeline serialization/deserialization failed at {} ({source})",
                    path.display()
                )
            }
            Self::ExportSerialization(source) => write!(f, "slot export failed: {source}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigIo { source, .. } => Some(source),
            Self::ConfigParse { source, .. } => Some(source),
            Self::StoreIo { source, .. } => Some(source),
            Self::StoreSerialization { source, .. } => Some(source),
            Self::ExportSerialization(source) => Some(source),
            _ => None,
        }
    }
}
