use std::path::Path;

use anyhow::{Context, Result};

/// Built-in header template with `{{year}}` and `{{url}}` placeholders.
pub const DEFAULT_TEMPLATE: &str = include_str!("../../assets/header.txt");

/// Substitute the first `{{year}}` and the first `{{url}}` in `template`.
pub fn render(template: &str, year: i32, url: &str) -> String {
    template
        .replacen("{{year}}", &year.to_string(), 1)
        .replacen("{{url}}", url, 1)
}

/// Load the template at `path`, or the built-in one.
pub fn load_template(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read header template {}", p.display())),
        None => Ok(DEFAULT_TEMPLATE.to_string()),
    }
}

/// Rewrite `target` as `header` followed by its previous content.
pub fn prepend(target: &Path, header: &str) -> Result<()> {
    let existing = std::fs::read(target)
        .with_context(|| format!("Failed to read {}", target.display()))?;
    let mut content = Vec::with_capacity(header.len() + existing.len());
    content.extend_from_slice(header.as_bytes());
    content.extend_from_slice(&existing);
    std::fs::write(target, content)
        .with_context(|| format!("Failed to write {}", target.display()))
}
