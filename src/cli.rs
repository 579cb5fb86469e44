use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "license-extractor",
    about = "Resolve dependency license texts into a single attribution file",
    version
)]
pub struct Cli {
    /// Package directory to scan
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Output file [default: <dir>/LICENSES.txt]
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Cache directory for fetched license texts [default: /tmp/license-extractor-cache]
    #[arg(long, value_name = "DIR")]
    pub cache: Option<PathBuf>,

    /// Deployment environment, selects the CDN used in the prepended header
    #[arg(long, default_value = "production", value_name = "ENV")]
    pub env: Environment,

    /// File that receives the generated header prepended to its content
    #[arg(long, value_name = "FILE")]
    pub prepend: Option<PathBuf>,

    /// Pre-crawled dependency mapping (JSON) instead of walking node_modules
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Config file [default: <dir>/.license-extractor/config.toml, fallback ~/.config/license-extractor/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Maximum number of in-flight license resolutions
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// List every dependency whose license text could not be resolved
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print warnings
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Environment {
    Dev,
    Qa,
    Staging,
    Production,
}

impl Environment {
    /// CDN base URL the attribution file is published under.
    pub fn cdn_base(self) -> &'static str {
        match self {
            Environment::Dev => "https://livefyre-cdn-dev.s3.amazonaws.com",
            Environment::Qa => "https://livefyre-cdn-qa.s3.amazonaws.com",
            Environment::Staging => "https://livefyre-cdn-staging.s3.amazonaws.com",
            Environment::Production => "https://cdn.livefyre.com",
        }
    }
}
