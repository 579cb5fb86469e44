//! Dependency discovery.
//!
//! - [`json`] — reads an already crawled `name@version` → metadata mapping.
//! - [`node`] — walks `node_modules` and reads each package's `package.json`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::DependencyRecord;

pub mod json;
pub mod node;

pub trait Crawler {
    /// Produce the dependency records of the package at `dir`, in report order.
    fn crawl(&self, dir: &Path) -> Result<Vec<DependencyRecord>>;
}

/// The `name` and `version` fields of the scanned package's `package.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
}

impl PackageManifest {
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join("package.json");
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid package manifest {}", path.display()))
    }
}
