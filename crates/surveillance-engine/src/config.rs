//! Engine configuration: the preparation buffer and the window catalogue.
//!
//! ```toml
//! buffer_minutes = 45
//!
//! [[windows]]
//! start = "08:15"
//! end = "11:00"
//! label = "Morning"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::model::SupervisionWindow;
use crate::time::WallTime;

/// Preparation buffer used by the current exam office, in minutes.
pub const DEFAULT_BUFFER_MINUTES: u32 = 45;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minutes a supervisor must be present before an exam starts.
    pub buffer_minutes: u32,
    /// Confirmed supervision windows.
    pub windows: Vec<SupervisionWindow>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer_minutes: DEFAULT_BUFFER_MINUTES,
            windows: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// The five windows in use today with the default buffer.
    pub fn standard() -> Self {
        let window = |sh, sm, eh, em| {
            SupervisionWindow::new(WallTime::at(sh, sm), WallTime::at(eh, em))
        };
        Self {
            buffer_minutes: DEFAULT_BUFFER_MINUTES,
            windows: vec![
                window(8, 15, 11, 0),
                window(8, 15, 12, 0),
                window(12, 15, 15, 0),
                window(15, 15, 18, 0),
                window(15, 45, 18, 30),
            ],
        }
    }

    /// Parse and validate a TOML configuration.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::InvalidConfig(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Reject an empty catalogue or any inverted window.
    pub fn validate(&self) -> Result<()> {
        if self.windows.is_empty() {
            return Err(EngineError::InvalidConfig(
                "at least one supervision window is required".to_string(),
            ));
        }
        for window in &self.windows {
            window.validate()?;
        }
        Ok(())
    }
}
