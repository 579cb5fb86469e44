use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};

use crate::models::DependencyRecord;

/// Matches internal, non open-source projects by repository URL or key.
pub struct ExclusionFilter {
    pattern: Option<Regex>,
}

impl ExclusionFilter {
    /// Case-insensitive substring match against any of `markers`.
    pub fn new(markers: &[String]) -> Result<Self> {
        let alternatives: Vec<String> = markers
            .iter()
            .filter(|m| !m.is_empty())
            .map(|m| regex::escape(m))
            .collect();
        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }
        let pattern = RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn is_excluded(&self, record: &DependencyRecord) -> bool {
        self.pattern.as_ref().is_some_and(|re| {
            re.is_match(&record.repository) || re.is_match(&record.key)
        })
    }
}

/// Records that make it into the report: excluded ones dropped, then the
/// first record of every project kept, in input order.
pub fn select<'a>(
    records: &'a [DependencyRecord],
    exclusions: &ExclusionFilter,
) -> Vec<&'a DependencyRecord> {
    let mut seen: HashSet<&str> = HashSet::new();
    records
        .iter()
        .filter(|r| !exclusions.is_excluded(r))
        .filter(|r| seen.insert(r.project_name()))
        .collect()
}

/// One report block:
///
/// ```text
/// Project: <name>
/// URL: <repository>
/// License: <licenses>
///
/// <text>
///
/// ```
pub fn render_block(record: &DependencyRecord) -> String {
    format!(
        "Project: {}\nURL: {}\nLicense: {}\n\n{}\n\n",
        record.project_name(),
        record.repository,
        record.licenses,
        record.license_text.as_deref().unwrap_or("")
    )
}

pub fn assemble(records: &[DependencyRecord], exclusions: &ExclusionFilter) -> String {
    select(records, exclusions)
        .into_iter()
        .map(render_block)
        .collect()
}

/// Write the assembled report to `path`, returning the number of projects written.
pub fn write_report(
    path: &Path,
    records: &[DependencyRecord],
    exclusions: &ExclusionFilter,
) -> Result<usize> {
    let report = assemble(records, exclusions);
    std::fs::write(path, report)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(select(records, exclusions).len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn default_filter() -> ExclusionFilter {
        ExclusionFilter::new(&["storify".to_string(), "livefyre".to_string()]).unwrap()
    }

    fn rec(key: &str, repo: &str, text: Option<&str>) -> DependencyRecord {
        let mut r = DependencyRecord::new(key, "MIT", repo);
        r.license_text = text.map(str::to_string);
        r
    }

    #[test]
    fn test_block_layout() {
        let r = rec("a@1.0.0", "https://github.com/x/a", Some("MIT License text"));
        assert_eq!(
            render_block(&r),
            "Project: a\nURL: https://github.com/x/a\nLicense: MIT\n\nMIT License text\n\n"
        );
    }

    #[test]
    fn test_unresolved_block_has_empty_text() {
        let r = rec("a@1.0.0", "https://github.com/x/a", None);
        assert_eq!(
            render_block(&r),
            "Project: a\nURL: https://github.com/x/a\nLicense: MIT\n\n\n\n"
        );
    }

    #[test]
    fn test_first_version_wins() {
        let records = vec![
            rec("foo@1.0.0", "https://github.com/x/foo", Some("one")),
            rec("bar@1.0.0", "https://github.com/x/bar", Some("bar")),
            rec("foo@2.0.0", "https://github.com/x/foo", Some("two")),
        ];
        let out = assemble(&records, &default_filter());
        assert_eq!(out.matches("Project: foo\n").count(), 1);
        assert!(out.contains("\n\none\n\n"));
        assert!(!out.contains("two"));
        // input order is kept
        assert!(out.find("Project: foo").unwrap() < out.find("Project: bar").unwrap());
    }

    #[test]
    fn test_exclusion_is_case_insensitive() {
        let records = vec![
            rec("a@1.0.0", "https://github.com/Livefyre/a", Some("text")),
            rec("b@1.0.0", "https://github.com/STORIFY/b", Some("text")),
            rec("storify-client@1.0.0", "https://github.com/x/c", Some("text")),
            rec("d@1.0.0", "https://github.com/x/d", Some("text")),
        ];
        let out = assemble(&records, &default_filter());
        assert_eq!(out, "Project: d\nURL: https://github.com/x/d\nLicense: MIT\n\ntext\n\n");
    }

    #[test]
    fn test_excluded_record_does_not_claim_project() {
        let records = vec![
            rec("foo@1.0.0", "https://github.com/livefyre/foo", Some("internal")),
            rec("foo@2.0.0", "https://github.com/x/foo", Some("public")),
        ];
        let out = assemble(&records, &default_filter());
        assert!(out.contains("public"));
        assert!(!out.contains("internal"));
    }

    #[test]
    fn test_empty_marker_list_excludes_nothing() {
        let filter = ExclusionFilter::new(&[]).unwrap();
        let r = rec("a@1.0.0", "https://github.com/livefyre/a", None);
        assert!(!filter.is_excluded(&r));
    }

    #[test]
    fn test_write_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("LICENSES.txt");
        let records = vec![
            rec("a@1.0.0", "https://github.com/x/a", Some("A")),
            rec("a@1.1.0", "https://github.com/x/a", Some("A2")),
        ];
        let written = write_report(&path, &records, &default_filter()).unwrap();
        assert_eq!(written, 1);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Project: a\nURL: https://github.com/x/a\nLicense: MIT\n\nA\n\n"
        );
    }
}
