mod config;
mod sink;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use harvest_logging::{harvest_info, harvest_warn};
use log::LevelFilter;
use thread_engine::{
    DocumentLoader, FileLoader, LengthFilterClusterer, Pipeline, ThreadMarkupRenderer,
    ThreadScanner,
};

use crate::config::{load_config, AppConfig, LogTarget};
use crate::sink::StdoutSink;

/// Extract forum thread posts and publish them as rendered digests.
#[derive(Debug, Parser)]
#[command(name = "thread_harvest", version)]
struct Cli {
    /// RON config file. Defaults to ./thread_harvest.ron when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Saved thread HTML page.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Print the extracted records and scan counters as JSON instead of
    /// publishing.
    #[arg(long)]
    json: bool,

    #[arg(long, value_enum)]
    log: Option<LogTarget>,

    /// Log at debug level.
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(input) = &self.input {
            config.input = input.clone();
        }
        if let Some(log) = self.log {
            config.log_destination = log;
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    cli.apply(&mut config);

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(err) =
        harvest_logging::initialize(config.log_destination.into(), level, Some(&config.log_file))
            .context("logging setup incomplete")
    {
        eprintln!("Warning: {err:#}");
    }

    let loader = match &config.charset {
        Some(charset) => FileLoader::with_charset_hint(charset.as_str()),
        None => FileLoader::new(),
    };
    let scanner = ThreadScanner::new(config.layout.clone(), config.normalizer.clone());

    if cli.json {
        let html = loader
            .load(&config.input)
            .with_context(|| format!("failed to load {:?}", config.input))?;
        let extraction = scanner.extract_document(&html);
        println!("{}", serde_json::to_string_pretty(&extraction)?);
        return Ok(());
    }

    let sink = StdoutSink::stdout();
    let pipeline = Pipeline {
        loader: &loader,
        scanner: &scanner,
        clusterer: &LengthFilterClusterer {
            min_post_length: config.min_post_length,
        },
        renderer: &ThreadMarkupRenderer,
        sink: &sink,
        title_prefix: &config.title_prefix,
    };
    let summary = pipeline
        .run(&config.input)
        .with_context(|| format!("failed to load {:?}", config.input))?;

    harvest_info!(
        "Done: {} posts, {} clusters, {} published, {} failed",
        summary.posts,
        summary.clusters,
        summary.published,
        summary.failed
    );
    if summary.stats.skipped() > 0 {
        harvest_warn!("{} candidate nodes skipped: {:?}", summary.stats.skipped(), summary.stats);
    }
    Ok(())
}
