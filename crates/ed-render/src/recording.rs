//! Renderer that only records what it was asked to embed

use async_trait::async_trait;
use ed_core::{ChartDescriptor, ChartKind, EmbedOptions, MountId};
use parking_lot::Mutex;
use tracing::info;

use crate::{RenderError, RenderHandle, Renderer};

/// One embed request as received
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub target: MountId,
    pub kind: ChartKind,
    pub options: EmbedOptions,
    pub document: serde_json::Value,
}

/// Records embed requests; optionally rejects the one aimed at a given
/// mount point. Backs dry runs and tests.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Mutex<Vec<RecordedCall>>,
    fail_on: Option<MountId>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the request for `target` after recording it
    pub fn failing_on(target: MountId) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(target),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Renderer for RecordingRenderer {
    async fn embed(
        &self,
        target: &MountId,
        descriptor: &ChartDescriptor,
        options: &EmbedOptions,
    ) -> Result<RenderHandle, RenderError> {
        let document = descriptor.to_json()?;
        info!("Embed {} -> {}", descriptor.kind, target.selector());

        self.calls.lock().push(RecordedCall {
            target: target.clone(),
            kind: descriptor.kind,
            options: options.clone(),
            document,
        });

        if self.fail_on.as_ref() == Some(target) {
            return Err(RenderError::pipeline(target, "rejected by renderer"));
        }

        Ok(RenderHandle {
            target: target.clone(),
            location: None,
        })
    }
}
