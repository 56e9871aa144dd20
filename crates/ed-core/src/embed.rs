//! Embedding options shared by every chart

use serde::{Deserialize, Serialize};

/// Options passed alongside each descriptor to the embed call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedOptions {
    /// Action menu entries
    pub actions: Actions,

    /// Renderer backend used by the collaborator
    pub renderer: RendererMode,
}

/// Toggles for the embed action menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Actions {
    pub export: bool,
    pub source: bool,
    pub compiled: bool,
    pub editor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererMode {
    Canvas,
    Svg,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            actions: Actions::default(),
            renderer: RendererMode::Canvas,
        }
    }
}

impl Default for Actions {
    fn default() -> Self {
        Self {
            export: true,
            source: false,
            compiled: false,
            editor: false,
        }
    }
}

impl Default for RendererMode {
    fn default() -> Self {
        RendererMode::Canvas
    }
}
