use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;
use harvest_logging::LogDestination;
use serde::{Deserialize, Serialize};
use thread_engine::{NormalizerConfig, ThreadLayout, DEFAULT_MIN_POST_LENGTH};

/// Looked up in the working directory when `--config` is not given.
pub const CONFIG_FILENAME: &str = "thread_harvest.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    #[default]
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub input: PathBuf,
    pub title_prefix: String,
    pub min_post_length: usize,
    /// Forces a charset instead of sniffing, e.g. `Some("shift_jis")`.
    pub charset: Option<String>,
    pub log_destination: LogTarget,
    pub log_file: PathBuf,
    pub layout: ThreadLayout,
    pub normalizer: NormalizerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/thread.html"),
            title_prefix: "【LoL】".to_string(),
            min_post_length: DEFAULT_MIN_POST_LENGTH,
            charset: None,
            log_destination: LogTarget::Terminal,
            log_file: PathBuf::from("run.log"),
            layout: ThreadLayout::default(),
            normalizer: NormalizerConfig::default(),
        }
    }
}

pub fn parse_config(content: &str) -> anyhow::Result<AppConfig> {
    ron::from_str(content).context("invalid config syntax")
}

/// An explicit path must exist. Without one, a missing default file means
/// built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<AppConfig> {
    let path = explicit.unwrap_or_else(|| Path::new(CONFIG_FILENAME));
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound && explicit.is_none() => {
            return Ok(AppConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config {path:?}"));
        }
    };
    parse_config(&content).with_context(|| format!("failed to load config {path:?}"))
}
