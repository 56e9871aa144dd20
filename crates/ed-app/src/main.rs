//! Main application entry point

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use arrow::record_batch::RecordBatch;
use tracing::{info, warn};

use ed_core::{ChartDescriptor, ChartKind, DashboardConfig, DataSource, Literal, Locale, MountId, ParamBindings};
use ed_data::schema::distinct_text;
use ed_data::{eval, CsvSource, SchemaCheck};
use ed_render::{
    ChartRenderer, DispatchMode, HtmlPageRenderer, JsonSpecRenderer, RecordingRenderer, RenderOutcome,
};
use ed_templates::DashboardTemplate;

mod cli;

use cli::{Command, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = match cli::parse(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {:#}\n\n{}", e, cli::USAGE);
            std::process::exit(2);
        }
    };

    let config = match &cli.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    let template = DashboardTemplate::new(config);

    match cli.command {
        Command::Help => println!("{}", cli::USAGE),
        Command::Render {
            out,
            format,
            data,
            concurrent,
        } => {
            let out = out.unwrap_or_else(|| template.config().output_dir.clone());
            let mode = if concurrent {
                DispatchMode::Concurrent
            } else {
                DispatchMode::Sequential
            };
            render(&template, &out, format, mode).await?;
            if let Some(data) = data {
                copy_data(&template, &data, &out).await?;
            }
        }
        Command::Spec { chart } => {
            let descriptor = template.chart(resolve_chart(&template, &chart)?);
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
        }
        Command::Preview { chart, data, params } => {
            let descriptor = template.chart(resolve_chart(&template, &chart)?);
            preview(&template, &descriptor, data, &params).await?;
        }
        Command::Check { data } => check(&template, data).await?,
    }

    Ok(())
}

async fn render(template: &DashboardTemplate, out: &Path, format: OutputFormat, mode: DispatchMode) -> Result<()> {
    info!("Starting dashboard render into {}", out.display());

    match format {
        OutputFormat::Html => {
            let lang = match template.config().locale {
                Locale::Hu => "hu",
                Locale::En => "en",
            };
            let page = Arc::new(
                HtmlPageRenderer::new(out.join("index.html"), template.labels().page_title)
                    .with_lang(lang)
                    .with_mount_order(template.config().mounts.in_order()),
            );
            run(template, page.clone(), mode).await?;
            let path = page.finish().await?;
            println!("{}", path.display());
        }
        OutputFormat::Json => {
            let writer = Arc::new(JsonSpecRenderer::new(out));
            run(template, writer, mode).await?;
            println!("{}", out.display());
        }
        OutputFormat::DryRun => {
            let recorder = Arc::new(RecordingRenderer::new());
            run(template, recorder.clone(), mode).await?;
            for call in recorder.calls() {
                println!("{} -> {}", call.kind, call.target.selector());
            }
        }
    }

    Ok(())
}

/// The failure itself is logged by the renderer's top-level handler
async fn run(template: &DashboardTemplate, renderer: Arc<dyn ed_render::Renderer>, mode: DispatchMode) -> Result<()> {
    match ChartRenderer::new(template.clone(), renderer).with_mode(mode).run().await {
        RenderOutcome::Rendered(_) => Ok(()),
        RenderOutcome::Failed => bail!("dashboard rendering failed"),
    }
}

/// Place the data file where the page expects it
async fn copy_data(template: &DashboardTemplate, data: &Path, out: &Path) -> Result<()> {
    let target = out.join(&template.config().data_url);
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::copy(data, &target)
        .await
        .with_context(|| format!("copying {} to {}", data.display(), target.display()))?;
    info!("Copied data to {}", target.display());
    Ok(())
}

/// Accept a chart name or the mount id it renders into
fn resolve_chart(template: &DashboardTemplate, name: &str) -> Result<ChartKind> {
    if let Ok(kind) = name.parse::<ChartKind>() {
        return Ok(kind);
    }
    template
        .config()
        .mounts
        .kind_of(&MountId::new(name))
        .ok_or_else(|| anyhow!("unknown chart: {}", name))
}

async fn load_data(template: &DashboardTemplate, data: Option<PathBuf>) -> Result<Box<dyn DataSource>> {
    let path = data.unwrap_or_else(|| PathBuf::from(&template.config().data_url));
    let source = CsvSource::new(path.clone())
        .await
        .with_context(|| format!("loading {}", path.display()))?;
    Ok(Box::new(source))
}

/// All rows of `source`, once its columns match what the charts read
async fn checked_rows(source: &dyn DataSource) -> Result<RecordBatch> {
    SchemaCheck::run(&*source.schema().await).into_result()?;
    source.query_all().await
}

async fn preview(
    template: &DashboardTemplate,
    descriptor: &ChartDescriptor,
    data: Option<PathBuf>,
    params: &[(String, String)],
) -> Result<()> {
    let source = load_data(template, data).await?;
    let batch = checked_rows(source.as_ref()).await?;

    let mut bindings = ParamBindings::defaults(&descriptor.params);
    for (name, value) in params {
        bindings.bind(&descriptor.params, name, Literal::parse(value))?;
    }
    for (name, value) in bindings.iter() {
        info!("{} = {}", name, value);
    }

    let rows = eval::preview(descriptor, &batch, &bindings)?;
    println!("{}", arrow::util::pretty::pretty_format_batches(&[rows])?);
    Ok(())
}

async fn check(template: &DashboardTemplate, data: Option<PathBuf>) -> Result<()> {
    let source = load_data(template, data).await?;
    let batch = checked_rows(source.as_ref()).await?;

    let selectable = &template.config().countries;
    let unlisted: Vec<_> = distinct_text(&batch, "country")?
        .into_iter()
        .filter(|c| !selectable.contains(c))
        .collect();
    if !unlisted.is_empty() {
        warn!(
            "Countries in the data but not in the line chart selector: {}",
            unlisted.join(", ")
        );
    }

    println!("{}: {} rows, columns ok", source.source_name(), source.row_count().await?);
    Ok(())
}
