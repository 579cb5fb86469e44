use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cli::{Cli, Environment};
use crate::crawler::PackageManifest;

pub const DEFAULT_CACHE_DIR: &str = "/tmp/license-extractor-cache";
pub const DEFAULT_OUTPUT_FILE: &str = "LICENSES.txt";
pub const DEFAULT_CONCURRENCY: usize = 20;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Optional file configuration, deserialized from `.license-extractor/config.toml`.
#[derive(Debug, Deserialize)]
pub struct FileConfig {
    pub cache_dir: Option<PathBuf>,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Case-insensitive markers of internal, non open-source projects.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    /// Alternative header template used with `--prepend`.
    pub header_template: Option<PathBuf>,
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_exclude() -> Vec<String> {
    vec!["storify".to_string(), "livefyre".to_string()]
}

impl Default for FileConfig {
    fn default() -> Self {
        FileConfig {
            cache_dir: None,
            concurrency: DEFAULT_CONCURRENCY,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            exclude: default_exclude(),
            header_template: None,
        }
    }
}

/// Load the file configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.license-extractor/config.toml`
/// 3. `~/.config/license-extractor/config.toml`
/// 4. Built-in [`FileConfig::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<FileConfig> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".license-extractor").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("license-extractor")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(FileConfig::default())
}

fn read_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
}

/// Run-wide settings, resolved once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct Settings {
    pub dir: PathBuf,
    pub output: PathBuf,
    pub cache_dir: PathBuf,
    pub env: Environment,
    pub prepend: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub concurrency: usize,
    pub timeout: Duration,
    pub exclude: Vec<String>,
    pub header_template: Option<PathBuf>,
    pub verbose: bool,
    pub quiet: bool,
}

impl Settings {
    /// Merge CLI flags over the file configuration. Flags win.
    pub fn resolve(cli: Cli, file: FileConfig) -> Settings {
        let output = cli
            .output
            .unwrap_or_else(|| cli.dir.join(DEFAULT_OUTPUT_FILE));
        let cache_dir = cli
            .cache
            .or(file.cache_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR));

        Settings {
            dir: cli.dir,
            output,
            cache_dir,
            env: cli.env,
            prepend: cli.prepend,
            input: cli.input,
            // a ceiling of zero would never make progress
            concurrency: cli.concurrency.unwrap_or(file.concurrency).max(1),
            timeout: Duration::from_secs(file.timeout_secs),
            exclude: file.exclude,
            header_template: file.header_template,
            verbose: cli.verbose,
            quiet: cli.quiet,
        }
    }

    /// Public download URL of the output file for the selected environment.
    pub fn public_url(&self, manifest: &PackageManifest) -> String {
        let file_name = self
            .output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!(
            "{}/libs/{}/v{}/{}",
            self.env.cdn_base(),
            manifest.name,
            manifest.version,
            file_name
        )
    }
}
