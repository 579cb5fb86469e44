use anyhow::Result;
use regex::Regex;

/// Conventional license file names tried, in order, at a repository root.
pub const LICENSE_CANDIDATES: [&str; 4] = ["LICENSE", "LICENSE.md", "license", "license.md"];

/// `HEAD` resolves to the repository's default branch.
const DEFAULT_REF: &str = "HEAD";

/// URL rewriting for GitHub-hosted repositories.
pub struct GithubUrls {
    host: Regex,
    root: Regex,
}

impl GithubUrls {
    pub fn new() -> Result<Self> {
        Ok(Self {
            host: Regex::new(r"github\.com")?,
            root: Regex::new(r"^(https?://github\.com/[^/]+/[^/#?]+)")?,
        })
    }

    pub fn is_github(&self, url: &str) -> bool {
        self.host.is_match(url)
    }

    /// `https://github.com/owner/repo/tree/x` → `https://github.com/owner/repo`.
    pub fn repo_root(&self, url: &str) -> Option<String> {
        self.root
            .captures(url)
            .map(|caps| caps[1].trim_end_matches(".git").to_string())
    }

    /// Raw-content URLs for each of [`LICENSE_CANDIDATES`] on the default branch.
    pub fn raw_candidates(&self, url: &str) -> Vec<String> {
        let Some(root) = self.repo_root(url) else {
            return Vec::new();
        };
        LICENSE_CANDIDATES
            .iter()
            .map(|file| format!("{root}/raw/{DEFAULT_REF}/{file}"))
            .collect()
    }

    /// Rewrite a `/blob/` page URL to its `/raw/` content URL.
    pub fn blob_to_raw(&self, url: &str) -> String {
        url.replacen("/blob/", "/raw/", 1)
    }
}

/// `git://host/path` → `https://host/path`; other URLs are returned unchanged.
pub fn https_scheme(url: &str) -> String {
    match url.strip_prefix("git://") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    }
}

/// True when the declared license URL is just the repository homepage.
/// `git://` and `https://` spellings compare equal on either side.
pub fn is_homepage(license_url: &str, repository: &str) -> bool {
    https_scheme(license_url) == https_scheme(repository)
}
