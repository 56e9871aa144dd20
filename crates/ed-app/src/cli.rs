//! Command-line arguments

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

pub const USAGE: &str = "\
Usage: energy-dash [--config FILE] <command>

Commands:
  render  [--out DIR] [--format html|json|dry-run] [--data FILE] [--concurrent]
          Build the four charts and render them
  spec    <chart>
          Print the Vega-Lite document of one chart
  preview <chart> [--data FILE] [--param NAME=VALUE]...
          Print the rows a chart shows for the given parameter values
  check   [--data FILE]
          Verify the data file has the columns the charts read
  help    Show this message

<chart> is a chart name (line, scatter, heatmap, bars) or its mount id.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Html,
    Json,
    DryRun,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Render {
        out: Option<PathBuf>,
        format: OutputFormat,
        data: Option<PathBuf>,
        concurrent: bool,
    },
    Spec {
        chart: String,
    },
    Preview {
        chart: String,
        data: Option<PathBuf>,
        params: Vec<(String, String)>,
    },
    Check {
        data: Option<PathBuf>,
    },
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cli {
    pub config: Option<PathBuf>,
    pub command: Command,
}

pub fn parse<I>(args: I) -> Result<Cli>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().peekable();
    let mut config = None;

    while let Some(arg) = args.peek() {
        if arg == "--config" {
            args.next();
            config = Some(PathBuf::from(value(&mut args, "--config")?));
        } else {
            break;
        }
    }

    let command = match args.next().as_deref() {
        None | Some("help") | Some("--help") | Some("-h") => Command::Help,
        Some("render") => {
            let mut out = None;
            let mut format = OutputFormat::default();
            let mut data = None;
            let mut concurrent = false;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--out" => out = Some(PathBuf::from(value(&mut args, "--out")?)),
                    "--data" => data = Some(PathBuf::from(value(&mut args, "--data")?)),
                    "--concurrent" => concurrent = true,
                    "--format" => {
                        format = match value(&mut args, "--format")?.as_str() {
                            "html" => OutputFormat::Html,
                            "json" => OutputFormat::Json,
                            "dry-run" => OutputFormat::DryRun,
                            other => bail!("unknown output format: {}", other),
                        }
                    }
                    other => bail!("unexpected argument to render: {}", other),
                }
            }
            Command::Render {
                out,
                format,
                data,
                concurrent,
            }
        }
        Some("spec") => {
            let chart = args.next().ok_or_else(|| anyhow!("spec needs a chart"))?;
            if let Some(extra) = args.next() {
                bail!("unexpected argument to spec: {}", extra);
            }
            Command::Spec { chart }
        }
        Some("preview") => {
            let chart = args.next().ok_or_else(|| anyhow!("preview needs a chart"))?;
            let mut data = None;
            let mut params = Vec::new();
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--data" => data = Some(PathBuf::from(value(&mut args, "--data")?)),
                    "--param" => {
                        let raw = value(&mut args, "--param")?;
                        let (name, val) = raw
                            .split_once('=')
                            .with_context(|| format!("--param expects NAME=VALUE, got {}", raw))?;
                        params.push((name.to_string(), val.to_string()));
                    }
                    other => bail!("unexpected argument to preview: {}", other),
                }
            }
            Command::Preview { chart, data, params }
        }
        Some("check") => {
            let mut data = None;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--data" => data = Some(PathBuf::from(value(&mut args, "--data")?)),
                    other => bail!("unexpected argument to check: {}", other),
                }
            }
            Command::Check { data }
        }
        Some(other) => bail!("unknown command: {}", other),
    };

    Ok(Cli { config, command })
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next().ok_or_else(|| anyhow!("{} needs a value", flag))
}
