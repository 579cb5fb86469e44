use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::models::{DependencyRecord, UNKNOWN_LICENSE};

/// One entry of an npm-license-crawler style mapping.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CrawlEntry {
    #[serde(default)]
    licenses: Option<Value>,
    #[serde(default)]
    repository: Option<String>,
    #[serde(default)]
    license_url: Option<String>,
    #[serde(default)]
    license_file: Option<PathBuf>,
}

/// Reads a pre-crawled JSON mapping, keeping the file's key order.
pub struct JsonMappingCrawler {
    path: PathBuf,
}

impl JsonMappingCrawler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl super::Crawler for JsonMappingCrawler {
    fn crawl(&self, _dir: &Path) -> Result<Vec<DependencyRecord>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        parse_mapping(&content)
            .with_context(|| format!("Invalid dependency mapping {}", self.path.display()))
    }
}

fn parse_mapping(content: &str) -> Result<Vec<DependencyRecord>> {
    let map: Map<String, Value> = serde_json::from_str(content)?;
    let mut records = Vec::with_capacity(map.len());

    for (key, value) in map {
        let entry: CrawlEntry =
            serde_json::from_value(value).with_context(|| format!("entry {key}"))?;

        let mut record = DependencyRecord::new(
            key,
            licenses_to_string(entry.licenses.as_ref()),
            entry.repository.unwrap_or_default(),
        );
        record.license_url = entry.license_url.filter(|u| !u.is_empty());
        record.license_file = entry.license_file;
        records.push(record);
    }

    Ok(records)
}

/// `"MIT"` stays as is, `["MIT", "Apache-2.0"]` becomes `"MIT,Apache-2.0"`.
fn licenses_to_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(","),
        _ => UNKNOWN_LICENSE.to_string(),
    }
}
