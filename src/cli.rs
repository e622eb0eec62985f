use crate::config::{Config, load_config};
use crate::layout::compute_dashboard_layout;
use crate::layout_dump::write_layout_dump;
use crate::poll::{FileSource, Poller, StatsSource};
use crate::render::{render_svg, write_output_png, write_output_svg};
use crate::stats::{StatsPayload, parse_stats};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "netdash",
    version,
    about = "Render a live network-traffic dashboard (protocol donut, top connections, recent packets)"
)]
pub struct Args {
    /// Stats source: http(s) URL, JSON file, or '-' for stdin. Defaults to the configured endpoint.
    #[arg(short = 's', long = "source")]
    pub source: Option<String>,

    /// Output file (svg/png). Defaults to stdout for a single SVG render.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// Refresh interval in milliseconds
    #[arg(short = 'i', long = "interval")]
    pub interval_ms: Option<u64>,

    /// Fetch and render a single snapshot, then exit
    #[arg(long = "once")]
    pub once: bool,

    /// Stop after this many ticks
    #[arg(long = "ticks")]
    pub ticks: Option<u64>,

    /// Write the computed layout as JSON on every render
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

/// Where each rendered frame goes.
#[derive(Debug, Clone)]
struct Target {
    format: OutputFormat,
    output: Option<PathBuf>,
    dump: Option<PathBuf>,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;
    if let Some(interval_ms) = args.interval_ms {
        config.poll.interval_ms = interval_ms;
    }

    let target = Target {
        format: args.output_format,
        output: args.output.clone(),
        dump: args.dump_layout.clone(),
    };
    if target.format == OutputFormat::Png {
        ensure_output(&target.output, "png")?;
    }

    let source = args
        .source
        .clone()
        .unwrap_or_else(|| config.poll.endpoint.clone());

    if source == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        let payload = parse_stats(&buf)?;
        render_frame(&payload, &config, &target)?;
        tracing::info!(source = "stdin", "dashboard rendered");
        return Ok(());
    }

    let mut stats_source = open_source(&source, &config)?;
    if args.once {
        let payload = stats_source.fetch()?;
        render_frame(&payload, &config, &target)?;
        tracing::info!(source = %stats_source.describe(), "dashboard rendered");
        return Ok(());
    }

    // Continuous mode rewrites the same file every tick.
    ensure_output(&target.output, "continuous")?;
    let mut poller = Poller::new(stats_source, config.poll.interval());
    let stats = poller.run(args.ticks, |payload| {
        render_frame(payload, &config, &target)
    });
    tracing::info!(
        ticks = stats.ticks,
        successes = stats.successes,
        failures = stats.failures,
        "polling finished"
    );
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "netstat_dash=debug"
    } else {
        "netstat_dash=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

fn open_source(source: &str, config: &Config) -> Result<Box<dyn StatsSource>> {
    if is_url(source) {
        return open_http_source(source, config);
    }
    Ok(Box::new(FileSource::new(source)))
}

#[cfg(feature = "http")]
fn open_http_source(url: &str, config: &Config) -> Result<Box<dyn StatsSource>> {
    let source = crate::poll::HttpSource::new(url, config.poll.timeout())
        .with_context(|| format!("failed to set up HTTP client for {url}"))?;
    Ok(Box::new(source))
}

#[cfg(not(feature = "http"))]
fn open_http_source(url: &str, _config: &Config) -> Result<Box<dyn StatsSource>> {
    Err(anyhow::anyhow!(
        "HTTP sources require the `http` feature: {url}"
    ))
}

fn render_frame(payload: &StatsPayload, config: &Config, target: &Target) -> Result<()> {
    let layout = compute_dashboard_layout(payload, &config.theme, &config.layout);
    if let Some(path) = &target.dump {
        write_layout_dump(path, &layout)
            .with_context(|| format!("failed to write layout dump {}", path.display()))?;
    }
    let svg = render_svg(&layout, &config.theme, &config.layout);
    tracing::debug!(bytes = svg.len(), "dashboard laid out");
    match target.format {
        OutputFormat::Svg => write_output_svg(&svg, target.output.as_deref()),
        OutputFormat::Png => {
            let output = ensure_output(&target.output, "png")?;
            write_output_png(&svg, &output, &config.render)
        }
    }
}

fn ensure_output(output: &Option<PathBuf>, mode: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", mode))
}
