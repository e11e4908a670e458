//! Offline driver for the reader core.
//!
//! Loads configuration and the book library, reads a document record from
//! disk, renders it with fixed segment positions and logs the sources
//! summary and scroll map. The full snapshot is printed as JSON.

use anyhow::{Context, Result, anyhow};
use layered_reader::app::render_offline;
use layered_reader::commentary::Filter;
use layered_reader::config::load_config;
use layered_reader::document::DocumentRecord;
use layered_reader::reference::load_library;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const USAGE: &str =
    "Usage: layered-reader <document.json> [--filter NAME] [--select A-B] [--tops t1,t2,...]";

#[derive(Debug, Default)]
struct Args {
    document: PathBuf,
    filter: Option<String>,
    select: Option<(u32, u32)>,
    tops: Option<Vec<f32>>,
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args(env::args().skip(1))?;
    let config = load_config(Path::new("conf/config.toml"));
    set_log_level(reload_handle, config.log_level.as_filter_str());
    let library = load_library(Path::new(&config.library_path));
    info!(
        path = %args.document.display(),
        books = library.len(),
        level = %config.log_level,
        "Starting layered reader"
    );

    let contents = fs::read_to_string(&args.document)
        .with_context(|| format!("Failed to read {}", args.document.display()))?;
    let record: DocumentRecord = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", args.document.display()))?;

    let segment_count = record.segments().len();
    let tops = args
        .tops
        .clone()
        .unwrap_or_else(|| evenly_spaced_tops(segment_count, config.per_entry_height * 10.0));
    let mut reader = render_offline(record, config, library, tops, 800.0);
    if reader.reference().is_none() {
        return Err(anyhow!("Document has no readable reference"));
    }
    if let Some(filter) = &args.filter {
        reader.set_filter(Filter::parse(filter));
    }
    if let Some((first, last)) = args.select {
        reader.select_range(first, last);
    }

    let snapshot = reader.snapshot();
    info!(
        reference = snapshot.reference.as_deref().unwrap_or_default(),
        title = %snapshot.title,
        segments = snapshot.segments.len(),
        entries = snapshot.entries.len(),
        label = %snapshot.sidebar.count_label,
        "Rendered document"
    );
    for category in &snapshot.sources.categories {
        info!(category = %category.category, count = category.count, color = %category.color, "Sources");
    }
    info!(offsets = ?snapshot.scroll_map, "Scroll map");
    if let Some(message) = &snapshot.sidebar.empty_message {
        warn!(%message, "Sidebar is empty");
    }

    let json = serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;
    println!("{json}");
    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let document = args.next().ok_or_else(|| anyhow!(USAGE))?;
    let mut parsed = Args {
        document: PathBuf::from(document),
        ..Args::default()
    };
    if !parsed.document.exists() {
        return Err(anyhow!("File not found: {}", parsed.document.display()));
    }

    while let Some(flag) = args.next() {
        let value = args
            .next()
            .ok_or_else(|| anyhow!("Missing value for {flag}\n{USAGE}"))?;
        match flag.as_str() {
            "--filter" => parsed.filter = Some(value),
            "--select" => parsed.select = Some(parse_range(&value)?),
            "--tops" => parsed.tops = Some(parse_tops(&value)?),
            other => return Err(anyhow!("Unknown option {other}\n{USAGE}")),
        }
    }
    Ok(parsed)
}

fn parse_range(value: &str) -> Result<(u32, u32)> {
    let (first, last) = value.split_once('-').unwrap_or((value, value));
    let first = first
        .trim()
        .parse()
        .with_context(|| format!("Invalid segment range {value}"))?;
    let last = last
        .trim()
        .parse()
        .with_context(|| format!("Invalid segment range {value}"))?;
    Ok((first, last))
}

fn parse_tops(value: &str) -> Result<Vec<f32>> {
    value
        .split(',')
        .map(|top| {
            top.trim()
                .parse::<f32>()
                .with_context(|| format!("Invalid segment top {top}"))
        })
        .collect()
}

fn evenly_spaced_tops(count: usize, spacing: f32) -> Vec<f32> {
    (0..count).map(|i| i as f32 * spacing).collect()
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    warn!("Logging initialized; override level with config.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_and_tops_parse() {
        assert_eq!(parse_range("3-5").unwrap(), (3, 5));
        assert_eq!(parse_range("4").unwrap(), (4, 4));
        assert!(parse_range("a-b").is_err());
        assert_eq!(parse_tops("0, 100,250").unwrap(), vec![0.0, 100.0, 250.0]);
    }

    #[test]
    fn unknown_flags_are_rejected() {
        let file = std::env::temp_dir().join("layered_reader_args_test.json");
        fs::write(&file, "{}").unwrap();
        let args = vec![
            file.display().to_string(),
            "--bogus".to_string(),
            "1".to_string(),
        ];
        assert!(parse_args(args.into_iter()).is_err());
    }
}
