//! Per-dependency license text resolution.
//!
//! Strategies run in a fixed order and the first one that produces text wins:
//!
//! 1. no declared license URL → nothing to resolve
//! 2. local license file
//! 3. cache entry for (dependency, declared URL)
//! 4. repository homepage → guess conventional file names (GitHub only)
//! 5. direct GET of the declared URL (`/blob/` rewritten to `/raw/` on GitHub)
//!
//! Every failure is contained in the returned [`Outcome`]; nothing here aborts the run.

use std::path::{Path, PathBuf};

use anyhow::Result;
use thiserror::Error;

use crate::cache::CacheStore;
use crate::github::{https_scheme, is_homepage, GithubUrls};
use crate::http::HttpClient;
use crate::license::detect::LicenseDetector;
use crate::models::{DependencyRecord, LicenseSource, UNKNOWN_LICENSE};

/// Why a single resolution attempt did not produce text.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("cannot read local license file: {0}")]
    LocalFile(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("not plain text ({})", .0.as_deref().unwrap_or("no content-type"))]
    ContentType(Option<String>),
    #[error("empty body")]
    EmptyBody,
    #[error("cannot write cache entry: {0}")]
    CacheWrite(String),
}

/// A failed attempt and what it was aimed at (path or URL).
#[derive(Debug)]
pub struct Failure {
    pub target: String,
    pub error: AttemptError,
}

/// Result of resolving one record.
#[derive(Debug)]
pub struct Outcome {
    pub source: LicenseSource,
    pub failures: Vec<Failure>,
}

#[derive(Debug, Clone, Copy)]
enum Strategy {
    LocalFile,
    Cache,
    GithubHomepage,
    DirectUrl,
}

const STRATEGIES: [Strategy; 4] = [
    Strategy::LocalFile,
    Strategy::Cache,
    Strategy::GithubHomepage,
    Strategy::DirectUrl,
];

struct Found {
    text: String,
    url: Option<String>,
    source: LicenseSource,
}

enum Step {
    Found(Found),
    /// Strategy does not apply or failed; try the next one.
    Next,
    /// Strategy applied and no later strategy may run.
    Stop,
}

pub struct LicenseResolver<H: HttpClient> {
    http: H,
    cache: CacheStore,
    detector: LicenseDetector,
    github: GithubUrls,
    /// Base for relative local license file paths.
    root: PathBuf,
}

impl<H: HttpClient> LicenseResolver<H> {
    pub fn new(http: H, cache: CacheStore, root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            http,
            cache,
            detector: LicenseDetector::new()?,
            github: GithubUrls::new()?,
            root: root.into(),
        })
    }

    #[cfg(test)]
    pub fn http_client(&self) -> &H {
        &self.http
    }

    /// Resolve `record.license_text` in place.
    pub async fn resolve(&self, record: &mut DependencyRecord) -> Outcome {
        let mut failures = Vec::new();

        let Some(license_url) = record.license_url.clone() else {
            record.source = LicenseSource::NoLicenseUrl;
            return Outcome {
                source: record.source,
                failures,
            };
        };

        for strategy in STRATEGIES {
            match self.attempt(strategy, record, &license_url, &mut failures).await {
                Step::Found(found) => {
                    self.apply(record, &license_url, found, &mut failures).await;
                    break;
                }
                Step::Next => continue,
                Step::Stop => break,
            }
        }

        if !record.is_resolved() {
            record.source = LicenseSource::Unresolved;
        }

        Outcome {
            source: record.source,
            failures,
        }
    }

    async fn attempt(
        &self,
        strategy: Strategy,
        record: &DependencyRecord,
        license_url: &str,
        failures: &mut Vec<Failure>,
    ) -> Step {
        match strategy {
            Strategy::LocalFile => {
                let Some(file) = record.license_file.as_deref() else {
                    return Step::Next;
                };
                match self.read_local(file).await {
                    Ok(text) => Step::Found(Found {
                        text,
                        url: None,
                        source: LicenseSource::LocalFile,
                    }),
                    Err(error) => {
                        failures.push(Failure {
                            target: file.display().to_string(),
                            error,
                        });
                        Step::Next
                    }
                }
            }
            Strategy::Cache => {
                let key = CacheStore::key(&record.key, license_url);
                match self.cache.get(&key).await {
                    Some(text) if !text.is_empty() => Step::Found(Found {
                        text,
                        url: None,
                        source: LicenseSource::Cache,
                    }),
                    _ => Step::Next,
                }
            }
            Strategy::GithubHomepage => {
                if !is_homepage(license_url, &record.repository) {
                    return Step::Next;
                }
                // homepage URLs are never fetched directly
                if !self.github.is_github(license_url) {
                    return Step::Stop;
                }
                for candidate in self.github.raw_candidates(&https_scheme(license_url)) {
                    match self.fetch_text(&candidate).await {
                        Ok(text) => {
                            return Step::Found(Found {
                                text,
                                url: Some(candidate),
                                source: LicenseSource::Network,
                            })
                        }
                        Err(error) => failures.push(Failure {
                            target: candidate,
                            error,
                        }),
                    }
                }
                Step::Stop
            }
            Strategy::DirectUrl => {
                let url = if self.github.is_github(license_url) {
                    self.github.blob_to_raw(license_url)
                } else {
                    license_url.to_string()
                };
                match self.fetch_text(&url).await {
                    Ok(text) => Step::Found(Found {
                        text,
                        url: Some(url),
                        source: LicenseSource::Network,
                    }),
                    Err(error) => {
                        failures.push(Failure { target: url, error });
                        Step::Stop
                    }
                }
            }
        }
    }

    async fn apply(
        &self,
        record: &mut DependencyRecord,
        license_url: &str,
        found: Found,
        failures: &mut Vec<Failure>,
    ) {
        if found.source == LicenseSource::Network {
            let key = CacheStore::key(&record.key, license_url);
            if let Err(e) = self.cache.put(&key, &found.text).await {
                failures.push(Failure {
                    target: self.cache.dir().join(&key).display().to_string(),
                    error: AttemptError::CacheWrite(format!("{e:#}")),
                });
            }
        }

        // cache hits are classified like network text so warm and cold runs agree
        let fetched = matches!(found.source, LicenseSource::Network | LicenseSource::Cache);
        if fetched && record.licenses == UNKNOWN_LICENSE {
            record.licenses = self.detector.detect(&found.text);
        }

        record.resolved_license_url = found.url;
        record.license_text = Some(found.text);
        record.source = found.source;
    }

    async fn read_local(&self, file: &Path) -> Result<String, AttemptError> {
        let bytes = tokio::fs::read(self.root.join(file))
            .await
            .map_err(|e| AttemptError::LocalFile(e.to_string()))?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }

    /// One GET; success needs status 200, a `text/plain` content type and a body.
    async fn fetch_text(&self, url: &str) -> Result<String, AttemptError> {
        let response = self
            .http
            .get(url)
            .await
            .map_err(|e| AttemptError::Transport(format!("{e:#}")))?;

        if response.status != 200 {
            return Err(AttemptError::Status(response.status));
        }
        let plain = response
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("text/plain"));
        if !plain {
            return Err(AttemptError::ContentType(response.content_type));
        }
        if response.body.is_empty() {
            return Err(AttemptError::EmptyBody);
        }
        Ok(response.body)
    }
}
