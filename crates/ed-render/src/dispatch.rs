//! Chart dispatch: build the dashboard and hand every chart to the renderer

use std::sync::Arc;

use ed_templates::{Dashboard, DashboardTemplate};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::{RenderError, RenderHandle, Renderer};

/// How the embed requests are issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// One at a time in declaration order; the first failure stops the rest
    #[default]
    Sequential,
    /// All at once; the first failure observed is reported
    Concurrent,
}

/// What the top-level render routine ended with
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Rendered(Vec<RenderHandle>),
    Failed,
}

type FailureHook = Arc<dyn Fn(&RenderError) + Send + Sync>;

/// Builds the dashboard's charts and requests that each be rendered
pub struct ChartRenderer {
    template: DashboardTemplate,
    renderer: Arc<dyn Renderer>,
    mode: DispatchMode,
    on_failure: FailureHook,
}

impl ChartRenderer {
    pub fn new(template: DashboardTemplate, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            template,
            renderer,
            mode: DispatchMode::default(),
            on_failure: Arc::new(log_failure),
        }
    }

    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace the top-level failure handler, which logs by default
    pub fn on_failure(mut self, hook: impl Fn(&RenderError) + Send + Sync + 'static) -> Self {
        self.on_failure = Arc::new(hook);
        self
    }

    /// Render the dashboard, reporting any failure to the failure handler
    /// exactly once
    pub async fn run(&self) -> RenderOutcome {
        match self.render().await {
            Ok(handles) => {
                info!("Rendered {} charts", handles.len());
                RenderOutcome::Rendered(handles)
            }
            Err(e) => {
                (self.on_failure)(&e);
                RenderOutcome::Failed
            }
        }
    }

    /// Build the four charts and embed each of them
    pub async fn render(&self) -> Result<Vec<RenderHandle>, RenderError> {
        let dashboard = self.template.build();
        self.dispatch(&dashboard).await
    }

    pub async fn dispatch(&self, dashboard: &Dashboard) -> Result<Vec<RenderHandle>, RenderError> {
        info!("Rendering {} charts ({:?})", dashboard.charts.len(), self.mode);
        match self.mode {
            DispatchMode::Sequential => self.dispatch_sequential(dashboard).await,
            DispatchMode::Concurrent => self.dispatch_concurrent(dashboard).await,
        }
    }

    async fn dispatch_sequential(&self, dashboard: &Dashboard) -> Result<Vec<RenderHandle>, RenderError> {
        let mut handles = Vec::with_capacity(dashboard.charts.len());
        for chart in &dashboard.charts {
            debug!("Embedding {} into {}", chart.kind, chart.target.selector());
            let handle = self
                .renderer
                .embed(&chart.target, chart, &dashboard.embed_options)
                .await?;
            handles.push(handle);
        }
        Ok(handles)
    }

    async fn dispatch_concurrent(&self, dashboard: &Dashboard) -> Result<Vec<RenderHandle>, RenderError> {
        let options = Arc::new(dashboard.embed_options.clone());
        let mut tasks = JoinSet::new();

        for (idx, chart) in dashboard.charts.iter().cloned().enumerate() {
            let renderer = Arc::clone(&self.renderer);
            let options = Arc::clone(&options);
            debug!("Embedding {} into {}", chart.kind, chart.target.selector());
            tasks.spawn(async move {
                renderer
                    .embed(&chart.target, &chart, &options)
                    .await
                    .map(|handle| (idx, handle))
            });
        }

        // Drain every task so no request is cut short; keep the first failure
        let mut handles = Vec::with_capacity(dashboard.charts.len());
        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            match joined.map_err(RenderError::from).and_then(|result| result) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    debug!("Concurrent embed failed: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        handles.sort_by_key(|(idx, _)| *idx);
        Ok(handles.into_iter().map(|(_, handle)| handle).collect())
    }
}

fn log_failure(error: &RenderError) {
    error!("Dashboard rendering failed: {}", error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingRenderer;
    use ed_core::{ChartKind, EmbedOptions, MountId};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn renderer_with(recorder: Arc<RecordingRenderer>) -> ChartRenderer {
        ChartRenderer::new(DashboardTemplate::default(), recorder)
    }

    fn counting(renderer: ChartRenderer) -> (ChartRenderer, Arc<AtomicUsize>) {
        let failures = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&failures);
        let renderer = renderer.on_failure(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (renderer, failures)
    }

    #[tokio::test]
    async fn test_renders_each_chart_once_in_order() {
        let recorder = Arc::new(RecordingRenderer::new());
        let outcome = renderer_with(recorder.clone()).run().await;

        let calls = recorder.calls();
        let kinds: Vec<_> = calls.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, ChartKind::ALL.to_vec());

        let targets: HashSet<_> = calls.iter().map(|c| c.target.clone()).collect();
        assert_eq!(targets.len(), 4);
        assert!(calls.iter().all(|c| c.options == EmbedOptions::default()));

        match outcome {
            RenderOutcome::Rendered(handles) => assert_eq!(handles.len(), 4),
            RenderOutcome::Failed => panic!("rendering should succeed"),
        }
    }

    #[tokio::test]
    async fn test_sequential_failure_stops_remaining_charts() {
        let recorder = Arc::new(RecordingRenderer::failing_on(MountId::new("chartScatter")));
        let (renderer, failures) = counting(renderer_with(recorder.clone()));

        assert_eq!(renderer.run().await, RenderOutcome::Failed);
        assert_eq!(failures.load(Ordering::SeqCst), 1);

        let kinds: Vec<_> = recorder.calls().iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ChartKind::TimeSeriesLine, ChartKind::YearScatter]);
    }

    #[tokio::test]
    async fn test_failure_on_each_chart_reported_once() {
        for target in ["chartRenewablesLine", "chartScatter", "chartHeatmap", "chartDeltaBars"] {
            let recorder = Arc::new(RecordingRenderer::failing_on(MountId::new(target)));
            let (renderer, failures) = counting(renderer_with(recorder));

            assert_eq!(renderer.run().await, RenderOutcome::Failed);
            assert_eq!(failures.load(Ordering::SeqCst), 1, "failure on {}", target);
        }
    }

    #[tokio::test]
    async fn test_concurrent_issues_every_request() {
        let recorder = Arc::new(RecordingRenderer::failing_on(MountId::new("chartHeatmap")));
        let (renderer, failures) = counting(renderer_with(recorder.clone()).with_mode(DispatchMode::Concurrent));

        assert_eq!(renderer.run().await, RenderOutcome::Failed);
        assert_eq!(failures.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_concurrent_handles_keep_declaration_order() {
        let recorder = Arc::new(RecordingRenderer::new());
        let renderer = renderer_with(recorder).with_mode(DispatchMode::Concurrent);

        let handles = renderer.render().await.unwrap();
        let targets: Vec<_> = handles.into_iter().map(|h| h.target).collect();
        assert_eq!(targets, DashboardTemplate::default().config().mounts.in_order());
    }
}
