//! Rendering abstraction layer
//!
//! The dashboard never draws anything itself. Each chart descriptor is
//! handed to a [`Renderer`], the external collaborator that embeds it into a
//! mount point of the host page.

pub mod dispatch;
pub mod html;
pub mod json;
pub mod recording;

use std::path::PathBuf;

use async_trait::async_trait;
use ed_core::{ChartDescriptor, EmbedOptions, MountId};
use thiserror::Error;
use tokio::task::JoinError;

pub use dispatch::{ChartRenderer, DispatchMode, RenderOutcome};
pub use html::HtmlPageRenderer;
pub use json::JsonSpecRenderer;
pub use recording::{RecordedCall, RecordingRenderer};

/// Render pipeline failure
///
/// One kind of failure only: whatever went wrong, the caller learns which
/// mount it happened on and why.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("rendering #{target} failed: {reason}")]
    Pipeline { target: MountId, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("page formatting failed: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("render task failed: {0}")]
    Join(#[from] JoinError),
}

impl RenderError {
    pub fn pipeline(target: &MountId, reason: impl Into<String>) -> Self {
        RenderError::Pipeline {
            target: target.clone(),
            reason: reason.into(),
        }
    }
}

/// Result of one successful embed
#[derive(Debug, Clone, PartialEq)]
pub struct RenderHandle {
    pub target: MountId,
    /// File the chart was written to, if the renderer writes files
    pub location: Option<PathBuf>,
}

/// The external rendering collaborator
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Embed `descriptor` into the mount point `target`
    async fn embed(
        &self,
        target: &MountId,
        descriptor: &ChartDescriptor,
        options: &EmbedOptions,
    ) -> Result<RenderHandle, RenderError>;
}
