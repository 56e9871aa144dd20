//! Renderer writing each chart's Vega-Lite document to its own file

use std::path::PathBuf;

use async_trait::async_trait;
use ed_core::{ChartDescriptor, EmbedOptions, MountId};
use tracing::info;

use crate::{RenderError, RenderHandle, Renderer};

/// File holding the shared embed options
pub const EMBED_OPTIONS_FILE: &str = "embed-options.json";

/// Writes `<dir>/<mount>.vl.json` per chart plus the embed options
pub struct JsonSpecRenderer {
    dir: PathBuf,
}

impl JsonSpecRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn document_path(&self, target: &MountId) -> PathBuf {
        self.dir.join(format!("{}.vl.json", target))
    }
}

#[async_trait]
impl Renderer for JsonSpecRenderer {
    async fn embed(
        &self,
        target: &MountId,
        descriptor: &ChartDescriptor,
        options: &EmbedOptions,
    ) -> Result<RenderHandle, RenderError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.document_path(target);
        tokio::fs::write(&path, serde_json::to_vec_pretty(descriptor)?).await?;
        tokio::fs::write(self.dir.join(EMBED_OPTIONS_FILE), serde_json::to_vec_pretty(options)?).await?;

        info!("Wrote {} chart to {}", descriptor.kind, path.display());
        Ok(RenderHandle {
            target: target.clone(),
            location: Some(path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChartRenderer;
    use ed_templates::DashboardTemplate;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_writes_one_document_per_chart() {
        let dir = std::env::temp_dir().join(format!("ed-render-json-{}", std::process::id()));
        let renderer = Arc::new(JsonSpecRenderer::new(&dir));
        let handles = ChartRenderer::new(DashboardTemplate::default(), renderer.clone())
            .render()
            .await
            .unwrap();

        assert_eq!(handles.len(), 4);
        let heatmap: serde_json::Value = serde_json::from_slice(
            &std::fs::read(renderer.document_path(&MountId::new("chartHeatmap"))).unwrap(),
        )
        .unwrap();
        assert_eq!(heatmap["mark"]["type"], "rect");
        assert!(dir.join(EMBED_OPTIONS_FILE).exists());

        std::fs::remove_dir_all(dir).unwrap();
    }
}
