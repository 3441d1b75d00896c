//! UI-agnostic slot editing engine for timed annotations on a video track.

pub mod api;
pub mod codec;
pub mod config;
pub mod error;
pub mod gesture;
pub mod palette;
pub mod playback;
pub mod slot;
pub mod store;
pub mod time;
pub mod timeline;

pub use api::{
    Command, Editor, EditorErrorEvent, EditorErrorKind, Event, SaveStatus,
};
pub use config::EditorConfig;
pub use error::{EngineError, Result};
pub use gesture::{EditorKey, GestureState, PressTarget};
pub use palette::{ColorCycle, DragPayload, Palette, PaletteChip};
pub use playback::{MediaPlayer, active_at};
pub use slot::{Category, Participants, Slot, SlotDraft, SlotId};
pub use store::{
    JsonFileStore, SaveRequest, SaveResult, SlotStore, StoredTimeline, spawn_save_worker,
};
pub use time::{MIN_LEN, SNAP_STEP, SnapGrid, TrackGeometry, format_timecode};
pub use timeline::{Boundary, DropOutcome, SlotModel};
