use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::palette::Palette;
use crate::time::{MIN_LEN, SNAP_STEP, SnapGrid};

/// Upper bound for `min_len`, in seconds.
pub const MAX_MIN_LEN: f64 = 3600.0;

/// Tunables for one editing session. Every field has a default, so a config
/// file only needs to list what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub snap_step: f64,
    pub min_len: f64,
    /// Width of the resize handle zone at each slot edge.
    pub edge_handle_px: f64,
    /// Drop previews narrower than this fall back to a default-width slot.
    pub min_preview_px: f64,
    pub default_slot_seconds: f64,
    pub nudge_step: f64,
    pub nudge_coarse_step: f64,
    pub participants: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_step: SNAP_STEP,
            min_len: MIN_LEN,
            edge_handle_px: 6.0,
            min_preview_px: 8.0,
            default_slot_seconds: 1.0,
            nudge_step: 0.1,
            nudge_coarse_step: 0.5,
            participants: Vec::new(),
        }
    }
}

impl EditorConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&text).map_err(|source| EngineError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        debug!(path = ?path, ?config, "editor config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.snap_step > 0.0 && self.snap_step.is_finite()) {
            return Err(EngineError::InvalidConfig {
                reason: format!("snap_step must be positive, got {}", self.snap_step),
            });
        }
        if !(self.min_len >= self.snap_step) {
            return Err(EngineError::InvalidConfig {
                reason: format!(
                    "min_len {} must be at least one snap step ({})",
                    self.min_len, self.snap_step
                ),
            });
        }
        if !(self.min_len <= MAX_MIN_LEN) {
            return Err(EngineError::InvalidConfig {
                reason: format!(
                    "min_len {} must not exceed {MAX_MIN_LEN} seconds",
                    self.min_len
                ),
            });
        }
        let widths = [
            ("edge_handle_px", self.edge_handle_px),
            ("min_preview_px", self.min_preview_px),
        ];
        for (name, value) in widths {
            if !(value >= 0.0) {
                return Err(EngineError::InvalidConfig {
                    reason: format!("{name} must not be negative, got {value}"),
                });
            }
        }
        let spans = [
            ("default_slot_seconds", self.default_slot_seconds),
            ("nudge_step", self.nudge_step),
            ("nudge_coarse_step", self.nudge_coarse_step),
        ];
        for (name, value) in spans {
            if !(value > 0.0 && value.is_finite()) {
                return Err(EngineError::InvalidConfig {
                    reason: format!("{name} must be positive, got {value}"),
                });
            }
        }
        Ok(())
    }

    pub fn grid(&self) -> SnapGrid {
        SnapGrid::new(self.snap_step, self.min_len)
    }

    pub fn palette(&self) -> Palette {
        Palette::new(&self.participants)
    }
}
