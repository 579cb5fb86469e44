use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use regex::Regex;
use serde_json::Value;

use crate::models::{DependencyRecord, UNKNOWN_LICENSE};

/// Walks `node_modules` (scoped and nested) and reads every `package.json`.
pub struct NodeModulesCrawler {
    github_ssh: Regex,
    shorthand: Regex,
}

impl NodeModulesCrawler {
    pub fn new() -> Result<Self> {
        Ok(Self {
            github_ssh: Regex::new(r"^(?:ssh://)?git@github\.com[:/](.+)$")?,
            // "owner/repo" or "github:owner/repo"
            shorthand: Regex::new(r"^(?:github:)?([\w.-]+/[\w.-]+)$")?,
        })
    }

    fn walk(
        &self,
        root: &Path,
        node_modules: &Path,
        out: &mut BTreeMap<String, DependencyRecord>,
    ) -> Result<()> {
        let Ok(entries) = std::fs::read_dir(node_modules) else {
            return Ok(());
        };

        let mut dirs: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            // linked packages may point back up the tree
            .filter(|e| e.file_type().is_ok_and(|t| t.is_dir() && !t.is_symlink()))
            .map(|e| e.path())
            .collect();
        dirs.sort();

        for dir in dirs {
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if name.starts_with('.') {
                continue;
            }

            // "@scope" directories hold the actual packages one level down
            if name.starts_with('@') {
                self.walk(root, &dir, out)?;
                continue;
            }

            if let Some(record) = self.read_package(root, &dir) {
                out.entry(record.key.clone()).or_insert(record);
            }
            self.walk(root, &dir.join("node_modules"), out)?;
        }

        Ok(())
    }

    fn read_package(&self, root: &Path, pkg_dir: &Path) -> Option<DependencyRecord> {
        let content = std::fs::read_to_string(pkg_dir.join("package.json")).ok()?;
        let json: Value = serde_json::from_str(&content).ok()?;

        let name = json.get("name")?.as_str()?;
        let version = json.get("version").and_then(|v| v.as_str()).unwrap_or("0.0.0");

        let repository = json
            .get("repository")
            .and_then(|r| r.as_str().or_else(|| r.get("url").and_then(|u| u.as_str())))
            .map(|r| self.normalize_repository(r))
            .unwrap_or_default();

        let license_file = find_license_file(pkg_dir).map(|file| {
            pkg_dir
                .strip_prefix(root)
                .unwrap_or(pkg_dir)
                .join(file)
        });

        let mut record =
            DependencyRecord::new(format!("{name}@{version}"), read_licenses(&json), repository);

        if !record.repository.is_empty() {
            record.license_url = Some(match license_file.as_ref().and_then(|f| f.file_name()) {
                Some(file) => format!(
                    "{}/blob/master/{}",
                    record.repository,
                    file.to_string_lossy()
                ),
                None => record.repository.clone(),
            });
        }
        record.license_file = license_file;

        Some(record)
    }

    /// Bring the usual `repository` spellings to a browsable `https://` URL.
    fn normalize_repository(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        let stripped = trimmed.strip_prefix("git+").unwrap_or(trimmed);

        let url = if let Some(caps) = self.github_ssh.captures(stripped) {
            format!("https://github.com/{}", &caps[1])
        } else if let Some(caps) = self.shorthand.captures(stripped) {
            format!("https://github.com/{}", &caps[1])
        } else if let Some(rest) = stripped.strip_prefix("git://") {
            format!("https://{rest}")
        } else if let Some(rest) = stripped.strip_prefix("http://") {
            format!("https://{rest}")
        } else {
            stripped.to_string()
        };

        url.trim_end_matches('/').trim_end_matches(".git").to_string()
    }
}

impl super::Crawler for NodeModulesCrawler {
    fn crawl(&self, dir: &Path) -> Result<Vec<DependencyRecord>> {
        let mut found = BTreeMap::new();
        self.walk(dir, &dir.join("node_modules"), &mut found)?;
        Ok(found.into_values().collect())
    }
}

/// `license`, `licenses: [..]` and the legacy `{ "type": .. }` object forms.
fn read_licenses(json: &Value) -> String {
    let type_or_str = |v: &Value| -> Option<String> {
        v.as_str()
            .or_else(|| v.get("type").and_then(|t| t.as_str()))
            .map(str::to_string)
    };

    if let Some(license) = json.get("license").and_then(type_or_str) {
        return license;
    }

    let joined: Vec<String> = json
        .get("licenses")
        .and_then(|l| l.as_array())
        .map(|items| items.iter().filter_map(type_or_str).collect())
        .unwrap_or_default();

    if joined.is_empty() {
        UNKNOWN_LICENSE.to_string()
    } else {
        joined.join(",")
    }
}

fn find_license_file(pkg_dir: &Path) -> Option<String> {
    let mut names: Vec<String> = std::fs::read_dir(pkg_dir)
        .ok()?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| {
            let lower = n.to_lowercase();
            lower.starts_with("license") || lower.starts_with("licence") || lower.starts_with("copying")
        })
        .collect();
    names.sort();
    names.into_iter().next()
}
