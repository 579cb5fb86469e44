use std::pin::pin;

use anyhow::Result;
use colored::Colorize;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Settings;
use crate::http::HttpClient;
use crate::models::{DependencyRecord, LicenseSource};
use crate::resolver::LicenseResolver;

/// Per-source counts of a finished resolution pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolutionSummary {
    pub total: usize,
    pub local_file: usize,
    pub cache: usize,
    pub network: usize,
    pub no_license_url: usize,
    pub unresolved: usize,
}

impl ResolutionSummary {
    fn count(&mut self, source: LicenseSource) {
        self.total += 1;
        match source {
            LicenseSource::LocalFile => self.local_file += 1,
            LicenseSource::Cache => self.cache += 1,
            LicenseSource::Network => self.network += 1,
            LicenseSource::NoLicenseUrl => self.no_license_url += 1,
            LicenseSource::Unresolved => self.unresolved += 1,
        }
    }

    pub fn resolved(&self) -> usize {
        self.local_file + self.cache + self.network
    }
}

/// Resolve every record with at most `settings.concurrency` resolutions in flight.
///
/// All futures are polled on the calling task. Completes once every record is
/// resolved or given up on; individual failures only produce warnings.
pub async fn resolve_all<H: HttpClient>(
    records: &mut [DependencyRecord],
    resolver: &LicenseResolver<H>,
    settings: &Settings,
) -> Result<ResolutionSummary> {
    let pb = if !settings.quiet {
        let pb = ProgressBar::new(records.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut summary = ResolutionSummary::default();

    let mut results = pin!(stream::iter(records.iter_mut())
        .map(move |record| async move {
            let outcome = resolver.resolve(record).await;
            let label = if record.repository.is_empty() {
                record.key.clone()
            } else {
                record.repository.clone()
            };
            (label, outcome)
        })
        .buffer_unordered(settings.concurrency));

    while let Some((label, outcome)) = results.next().await {
        summary.count(outcome.source);
        pb.inc(1);

        if settings.verbose {
            for failure in &outcome.failures {
                pb.suspend(|| {
                    eprintln!(
                        "  {} {} {}: {}",
                        "·".dimmed(),
                        label,
                        failure.target.dimmed(),
                        failure.error
                    )
                });
            }
        }

        if matches!(
            outcome.source,
            LicenseSource::Unresolved | LicenseSource::NoLicenseUrl
        ) {
            pb.suspend(|| {
                eprintln!(
                    "{} Could not resolve license text for {}",
                    "warning:".yellow().bold(),
                    label
                )
            });
        }
    }

    pb.finish_with_message("Done");

    Ok(summary)
}
