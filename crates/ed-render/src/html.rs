//! Renderer producing a standalone host page
//!
//! Embeds are collected as they arrive and laid out in mount order;
//! [`HtmlPageRenderer::finish`] writes a page with one mount element per
//! chart and a script that awaits one `vegaEmbed` call per chart, all under
//! a single `.catch`.

use std::fmt::{self, Write as _};
use std::path::PathBuf;

use async_trait::async_trait;
use ed_core::{ChartDescriptor, EmbedOptions, MountId};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::{RenderError, RenderHandle, Renderer};

const SCRIPTS: [&str; 3] = [
    "https://cdn.jsdelivr.net/npm/vega@5",
    "https://cdn.jsdelivr.net/npm/vega-lite@5",
    "https://cdn.jsdelivr.net/npm/vega-embed@6",
];

#[derive(Debug)]
struct PageEmbed {
    target: MountId,
    /// JSON string literal of the mount selector
    selector: String,
    document: String,
}

#[derive(Debug, Default)]
struct PageState {
    embeds: Vec<PageEmbed>,
    options: Option<EmbedOptions>,
}

pub struct HtmlPageRenderer {
    path: PathBuf,
    title: String,
    lang: String,
    order: Vec<MountId>,
    state: Mutex<PageState>,
}

impl HtmlPageRenderer {
    pub fn new(path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            lang: "hu".to_string(),
            order: Vec::new(),
            state: Mutex::new(PageState::default()),
        }
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Order of the charts on the page; unlisted mounts follow in arrival order
    pub fn with_mount_order(mut self, order: impl IntoIterator<Item = MountId>) -> Self {
        self.order = order.into_iter().collect();
        self
    }

    /// The page for everything embedded so far
    pub fn page(&self) -> Result<String, RenderError> {
        let state = self.state.lock();
        let options = state.options.clone().unwrap_or_default();
        let options_json = script_safe(&serde_json::to_string_pretty(&options)?);

        // Concurrent embeds arrive in any order
        let mut embeds: Vec<&PageEmbed> = state.embeds.iter().collect();
        embeds.sort_by_key(|embed| self.position(&embed.target));

        let mut html = String::new();
        self.write_page(&embeds, &options_json, &mut html)?;
        Ok(html)
    }

    fn position(&self, target: &MountId) -> usize {
        self.order
            .iter()
            .position(|mount| mount == target)
            .unwrap_or(self.order.len())
    }

    fn write_page(&self, embeds: &[&PageEmbed], options_json: &str, out: &mut String) -> fmt::Result {
        writeln!(out, "<!doctype html>")?;
        writeln!(out, "<html lang=\"{}\">", escape_html(&self.lang))?;
        writeln!(out, "<head>")?;
        writeln!(out, "  <meta charset=\"utf-8\">")?;
        writeln!(out, "  <title>{}</title>", escape_html(&self.title))?;
        for src in SCRIPTS {
            writeln!(out, "  <script src=\"{}\"></script>", src)?;
        }
        writeln!(out, "  <style>.chart {{ width: 100%; margin-bottom: 2rem; }}</style>")?;
        writeln!(out, "</head>")?;
        writeln!(out, "<body>")?;
        writeln!(out, "  <h1>{}</h1>", escape_html(&self.title))?;
        for embed in embeds {
            writeln!(out, "  <div id=\"{}\" class=\"chart\"></div>", escape_html(embed.target.as_str()))?;
        }
        writeln!(out, "  <script>")?;
        writeln!(out, "const embedOptions = {};", options_json)?;
        writeln!(out)?;
        writeln!(out, "async function render() {{")?;
        for embed in embeds {
            writeln!(out, "  await vegaEmbed({}, {}, embedOptions);", embed.selector, embed.document)?;
        }
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(out, "render().catch(console.error);")?;
        writeln!(out, "  </script>")?;
        writeln!(out, "</body>")?;
        writeln!(out, "</html>")
    }

    /// Write the page and return where it went
    pub async fn finish(&self) -> Result<PathBuf, RenderError> {
        let html = self.page()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, html).await?;
        info!("Wrote dashboard page to {}", self.path.display());
        Ok(self.path.clone())
    }
}

#[async_trait]
impl Renderer for HtmlPageRenderer {
    async fn embed(
        &self,
        target: &MountId,
        descriptor: &ChartDescriptor,
        options: &EmbedOptions,
    ) -> Result<RenderHandle, RenderError> {
        let document = script_safe(&serde_json::to_string(descriptor)?);
        let selector = serde_json::to_string(&target.selector())?;

        let mut state = self.state.lock();
        if state.embeds.iter().any(|embed| &embed.target == target) {
            return Err(RenderError::pipeline(target, "mount point already has a chart"));
        }
        let shared = state.options.get_or_insert_with(|| options.clone());
        if shared != options {
            return Err(RenderError::pipeline(target, "embed options differ between charts"));
        }
        state.embeds.push(PageEmbed {
            target: target.clone(),
            selector,
            document,
        });
        debug!("Queued {} for {}", descriptor.kind, target.selector());

        Ok(RenderHandle {
            target: target.clone(),
            location: Some(self.path.clone()),
        })
    }
}

/// Keep JSON from closing the surrounding script element
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChartRenderer, DispatchMode, RenderOutcome};
    use ed_templates::DashboardTemplate;
    use std::sync::Arc;

    const IN_ORDER: [&str; 4] = ["#chartRenewablesLine", "#chartScatter", "#chartHeatmap", "#chartDeltaBars"];

    fn page_renderer() -> Arc<HtmlPageRenderer> {
        let order = DashboardTemplate::default().config().mounts.in_order();
        Arc::new(HtmlPageRenderer::new("dist/index.html", "Energiaátmenet").with_mount_order(order))
    }

    fn embed_positions(html: &str) -> Vec<usize> {
        IN_ORDER
            .iter()
            .map(|sel| html.find(&format!("await vegaEmbed(\"{}\"", sel)).unwrap())
            .collect()
    }

    fn in_dashboard_order(html: &str) -> bool {
        let mounts: Vec<_> = IN_ORDER
            .iter()
            .map(|sel| html.find(&format!("<div id=\"{}\"", &sel[1..])).unwrap())
            .collect();
        mounts.windows(2).all(|w| w[0] < w[1]) && embed_positions(html).windows(2).all(|w| w[0] < w[1])
    }

    #[tokio::test]
    async fn test_page_has_mounts_and_embeds_in_order() {
        let page = page_renderer();
        let outcome = ChartRenderer::new(DashboardTemplate::default(), page.clone()).run().await;
        assert!(matches!(outcome, RenderOutcome::Rendered(_)));

        let html = page.page().unwrap();
        assert!(in_dashboard_order(&html));
        assert_eq!(html.matches("class=\"chart\"").count(), 4);
        assert_eq!(html.matches(".catch(").count(), 1);
        assert!(html.contains("\"renderer\": \"canvas\""));
    }

    #[tokio::test]
    async fn test_duplicate_mount_rejected() {
        let page = page_renderer();
        let template = DashboardTemplate::default();
        let dashboard = template.build();
        let chart = &dashboard.charts[0];

        page.embed(&chart.target, chart, &dashboard.embed_options).await.unwrap();
        let second = page.embed(&chart.target, chart, &dashboard.embed_options).await;
        assert!(matches!(second, Err(RenderError::Pipeline { .. })));
    }

    #[tokio::test]
    async fn test_page_order_ignores_arrival_order() {
        let page = page_renderer();
        let dashboard = DashboardTemplate::default().build();
        for chart in dashboard.charts.iter().rev() {
            page.embed(&chart.target, chart, &dashboard.embed_options).await.unwrap();
        }
        assert!(in_dashboard_order(&page.page().unwrap()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_render_keeps_page_order() {
        for _ in 0..100 {
            let page = page_renderer();
            let outcome = ChartRenderer::new(DashboardTemplate::default(), page.clone())
                .with_mode(DispatchMode::Concurrent)
                .run()
                .await;
            assert!(matches!(outcome, RenderOutcome::Rendered(_)));
            assert!(in_dashboard_order(&page.page().unwrap()));
        }
    }

    #[test]
    fn test_script_safe() {
        assert_eq!(script_safe(r#"{"a":"</script>"}"#), r#"{"a":"<\/script>"}"#);
    }

    #[tokio::test]
    async fn test_finish_writes_file() {
        let path = std::env::temp_dir()
            .join(format!("ed-render-html-{}", std::process::id()))
            .join("index.html");
        let page = Arc::new(HtmlPageRenderer::new(&path, "Energy"));
        ChartRenderer::new(DashboardTemplate::default(), page.clone())
            .render()
            .await
            .unwrap();

        let written = page.finish().await.unwrap();
        let html = std::fs::read_to_string(&written).unwrap();
        assert!(html.starts_with("<!doctype html>"));

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
