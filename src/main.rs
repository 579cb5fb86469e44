//! `license-extractor` — collect the license text of every dependency into one file.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and merge them with the config file into
//!    one [`config::Settings`].
//! 2. Discover dependencies ([`crawler`]): a pre-crawled JSON mapping
//!    (`--input`) or a walk of `node_modules`.
//! 3. Resolve license texts with bounded concurrency ([`orchestrator`],
//!    [`resolver`]), backed by the on-disk [`cache`].
//! 4. Write the deduplicated, filtered report ([`report::text`]).
//! 5. Optionally prepend the attribution header to a file (`--prepend`).
//!
//! Unresolved dependencies are warnings only; the exit code is `0` once the
//! report is written.

mod cache;
mod cli;
mod config;
mod crawler;
mod github;
mod http;
mod license;
mod models;
mod orchestrator;
mod report;
mod resolver;

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::Parser;
use colored::Colorize;

use cache::CacheStore;
use cli::Cli;
use config::{load_config, Settings};
use crawler::json::JsonMappingCrawler;
use crawler::node::NodeModulesCrawler;
use crawler::{Crawler, PackageManifest};
use http::{HttpClient, ReqwestClient};
use report::text::{write_report, ExclusionFilter};
use resolver::LicenseResolver;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let file_config = load_config(&cli.dir, cli.config.as_deref())?;
    let settings = Settings::resolve(cli, file_config);

    let http = ReqwestClient::new(settings.timeout)?;
    extract(&settings, http).await
}

/// Run the whole pipeline against `http`.
async fn extract<H: HttpClient>(settings: &Settings, http: H) -> Result<()> {
    let mut records = match &settings.input {
        Some(input) => JsonMappingCrawler::new(input).crawl(&settings.dir)?,
        None => NodeModulesCrawler::new()?.crawl(&settings.dir)?,
    };

    if !settings.quiet {
        eprintln!(
            "  {} {} dependencies in {}",
            "→".cyan(),
            records.len(),
            settings.dir.display()
        );
    }

    let cache = CacheStore::open(&settings.cache_dir)?;
    let resolver = LicenseResolver::new(http, cache, &settings.dir)?;
    let summary = orchestrator::resolve_all(&mut records, &resolver, settings).await?;

    let exclusions = ExclusionFilter::new(&settings.exclude)?;
    let written = write_report(&settings.output, &records, &exclusions)?;

    if let Some(target) = &settings.prepend {
        let manifest = PackageManifest::load(&settings.dir)?;
        let template = report::header::load_template(settings.header_template.as_deref())?;
        let header = report::header::render(
            &template,
            chrono::Local::now().year(),
            &settings.public_url(&manifest),
        );
        report::header::prepend(target, &header)
            .with_context(|| format!("Failed to prepend header to {}", target.display()))?;
    }

    if !settings.quiet {
        report::terminal::render(&records, &summary, &settings.output, written, settings.verbose);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;
    use crate::http::stub::StubClient;
    use tempfile::TempDir;

    struct Workspace {
        dir: TempDir,
        cache: TempDir,
    }

    impl Workspace {
        fn new(mapping: &str) -> Self {
            let dir = TempDir::new().unwrap();
            std::fs::write(dir.path().join("deps.json"), mapping).unwrap();
            std::fs::write(
                dir.path().join("package.json"),
                r#"{ "name": "widget", "version": "1.2.3" }"#,
            )
            .unwrap();
            Self {
                dir,
                cache: TempDir::new().unwrap(),
            }
        }

        fn settings(&self, extra: &[&str]) -> Settings {
            let dir = self.dir.path().to_string_lossy().into_owned();
            let input = self.dir.path().join("deps.json").to_string_lossy().into_owned();
            let cache = self.cache.path().to_string_lossy().into_owned();
            let mut args = vec![
                "license-extractor",
                "--quiet",
                "--dir",
                &dir,
                "--input",
                &input,
                "--cache",
                &cache,
            ];
            args.extend_from_slice(extra);
            Settings::resolve(Cli::parse_from(args), FileConfig::default())
        }

        fn output(&self) -> String {
            std::fs::read_to_string(self.dir.path().join("LICENSES.txt")).unwrap()
        }
    }

    const HOMEPAGE_MAPPING: &str = r#"{
  "a@1.0.0": {
    "repository": "https://github.com/x/a",
    "licenseUrl": "https://github.com/x/a",
    "licenses": "MIT"
  }
}"#;

    #[tokio::test]
    async fn test_end_to_end_homepage_guess() {
        let ws = Workspace::new(HOMEPAGE_MAPPING);
        let http = StubClient::new()
            .with_text("https://github.com/x/a/raw/HEAD/LICENSE", "MIT License text");

        extract(&ws.settings(&[]), http).await.unwrap();

        assert_eq!(
            ws.output(),
            "Project: a\nURL: https://github.com/x/a\nLicense: MIT\n\nMIT License text\n\n"
        );
    }

    #[tokio::test]
    async fn test_warm_cache_output_is_identical() {
        let ws = Workspace::new(
            r#"{
  "a@1.0.0": { "repository": "https://github.com/x/a", "licenseUrl": "https://github.com/x/a", "licenses": "unknown" },
  "b@1.0.0": { "repository": "https://github.com/x/b", "licenseUrl": "https://github.com/x/b/blob/main/COPYING", "licenses": "ISC" },
  "a@2.0.0": { "repository": "https://github.com/x/a", "licenseUrl": "https://github.com/x/a", "licenses": "MIT" },
  "internal@1.0.0": { "repository": "https://github.com/livefyre/internal", "licenseUrl": "https://github.com/livefyre/internal", "licenses": "UNLICENSED" }
}"#,
        );
        let cold = StubClient::new()
            .with_text(
                "https://github.com/x/a/raw/HEAD/LICENSE",
                "Permission is hereby granted, free of charge, to any person",
            )
            .with_text("https://github.com/x/b/raw/main/COPYING", "ISC text");

        extract(&ws.settings(&[]), cold).await.unwrap();
        let first = ws.output();

        let warm = StubClient::new();
        extract(&ws.settings(&[]), warm).await.unwrap();
        let second = ws.output();

        assert_eq!(first, second);
        assert!(first.starts_with("Project: a\nURL: https://github.com/x/a\nLicense: MIT\n\n"));
        assert_eq!(first.matches("Project: ").count(), 2);
        assert!(!first.contains("internal"));
    }

    #[tokio::test]
    async fn test_prepend_header() {
        let ws = Workspace::new(HOMEPAGE_MAPPING);
        let bundle = ws.dir.path().join("bundle.js");
        std::fs::write(&bundle, "var x = 1;\n").unwrap();
        let bundle_arg = bundle.to_string_lossy().into_owned();

        extract(
            &ws.settings(&["--prepend", &bundle_arg, "--env", "dev"]),
            StubClient::new(),
        )
        .await
        .unwrap();

        let content = std::fs::read_to_string(&bundle).unwrap();
        let year = chrono::Local::now().year().to_string();
        assert!(content.contains(&year));
        assert!(content.contains(
            "https://livefyre-cdn-dev.s3.amazonaws.com/libs/widget/v1.2.3/LICENSES.txt"
        ));
        assert!(content.ends_with("*/\nvar x = 1;\n"));
        assert!(!content.contains("{{"));
    }

    #[tokio::test]
    async fn test_unresolved_dependency_still_reported() {
        let ws = Workspace::new(HOMEPAGE_MAPPING);

        extract(&ws.settings(&[]), StubClient::new()).await.unwrap();

        assert_eq!(
            ws.output(),
            "Project: a\nURL: https://github.com/x/a\nLicense: MIT\n\n\n\n"
        );
    }
}
