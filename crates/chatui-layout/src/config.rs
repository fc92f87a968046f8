#![forbid(unsafe_code)]

//! Layout settings loaded from TOML or JSON.
//!
//! ```toml
//! # chatui-layout.toml
//! save_layout_on_exit = "all"
//! ```
//!
//! ```rust,ignore
//! let config = LayoutConfig::from_toml_file("chatui-layout.toml")?;
//! ```
//!
//! Missing keys fall back to [`LayoutConfig::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};

/// What to persist automatically at shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveLayoutOnExit {
    /// Keep whatever was saved explicitly.
    #[default]
    None,
    /// Buffer numbers only.
    Buffers,
    /// Window split tree only.
    Windows,
    /// Buffers and windows.
    All,
}

impl SaveLayoutOnExit {
    #[must_use]
    pub fn saves_buffers(self) -> bool {
        matches!(self, Self::Buffers | Self::All)
    }

    #[must_use]
    pub fn saves_windows(self) -> bool {
        matches!(self, Self::Windows | Self::All)
    }
}

/// Layout engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub save_layout_on_exit: SaveLayoutOnExit,
}

/// Errors loading a [`LayoutConfig`].
#[derive(Debug, thiserror::Error)]
pub enum LayoutConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LayoutConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, LayoutConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, LayoutConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_json_str(s: &str) -> Result<Self, LayoutConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LayoutConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }
}
