use crate::animate::animate;
use crate::config::load_config;
use crate::frame::{Frame, write_frame_dump};
use crate::icons::{BlankIcons, IconCatalog, IconResolver};
use crate::render::{render_svg, write_output_svg};
use crate::transition::build_layout;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "depict", version, about = "Boxes-and-arrows diagrams from a line-based command language")]
pub struct Args {
    /// Command text file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Only interpret up to the end of this (1-based) line
    #[arg(long = "line")]
    pub line: Option<usize>,

    /// Command text to animate from
    #[arg(long = "from")]
    pub from: Option<PathBuf>,

    /// Animation fraction between the --from layout and the input layout
    #[arg(long = "at")]
    pub at: Option<f32>,

    /// Directory of PNG icons, named provider/group/icon.png
    #[arg(long = "icons")]
    pub icons: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let icons: Box<dyn IconResolver> = match args.icons.as_deref() {
        Some(dir) => Box::new(IconCatalog::from_dir(dir)?),
        None => Box::new(BlankIcons),
    };

    let input = read_input(args.input.as_deref())?;
    let text = match args.line {
        Some(line) => truncate_lines(&input, line),
        None => input,
    };

    let after = build_layout(&text, &config, icons.as_ref());
    let layout = if args.from.is_some() || args.at.is_some() {
        let before_text = match args.from.as_deref() {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
            None => String::new(),
        };
        let before = build_layout(&before_text, &config, icons.as_ref());
        let fraction = args.at.unwrap_or(1.0);
        debug!(fraction, "blending layouts");
        animate(&before, &after, fraction)
    } else {
        after
    };

    let frame = Frame::from_layout(&layout);
    info!(
        nodes = frame.nodes.len(),
        connectors = frame.connectors.len(),
        "frame ready"
    );

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&frame, &config.theme, &config.render);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Json => write_frame_dump(args.output.as_deref(), &frame)?,
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(&frame, &config.theme, &config.render);
            write_png(&svg, &output, &config.render)?;
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "depict=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, render_cfg: &crate::config::RenderConfig) -> Result<()> {
    crate::render::write_output_png(svg, output, render_cfg)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _render_cfg: &crate::config::RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {ext} output"))
}

/// Keeps lines `1..=line`, as if the editor cursor sat on line `line`.
fn truncate_lines(text: &str, line: usize) -> String {
    text.lines().take(line).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_to_cursor_line() {
        let text = "add a\nadd b\nadd c\n";
        assert_eq!(truncate_lines(text, 2), "add a\nadd b");
        assert_eq!(truncate_lines(text, 0), "");
        assert_eq!(truncate_lines(text, 10), "add a\nadd b\nadd c");
    }

    #[test]
    fn parses_animation_flags() {
        let args = Args::parse_from([
            "depict", "-i", "now.txt", "--from", "then.txt", "--at", "0.25", "-e", "json",
        ]);
        assert_eq!(args.at, Some(0.25));
        assert_eq!(args.output_format, OutputFormat::Json);
        assert_eq!(args.from.as_deref(), Some(Path::new("then.txt")));
    }

    #[test]
    fn png_needs_an_output_path() {
        assert!(ensure_output(&None, "png").is_err());
    }
}
