use std::path::PathBuf;

/// Marker used for dependencies whose license metadata could not be determined.
/// Classification of fetched text only triggers on this exact value.
pub const UNKNOWN_LICENSE: &str = "unknown";

/// One dependency of the scanned package, keyed by `name@version`.
#[derive(Debug, Clone)]
pub struct DependencyRecord {
    pub key: String,
    /// Declared license identifier(s); overwritten by the classifier when
    /// the declared value is [`UNKNOWN_LICENSE`] and text was found.
    pub licenses: String,
    pub repository: String,
    pub license_url: Option<String>,
    /// License file path, relative to the scanned directory.
    pub license_file: Option<PathBuf>,
    pub license_text: Option<String>,
    pub resolved_license_url: Option<String>,
    pub source: LicenseSource,
}

impl DependencyRecord {
    pub fn new(key: impl Into<String>, licenses: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            licenses: licenses.into(),
            repository: repository.into(),
            license_url: None,
            license_file: None,
            license_text: None,
            resolved_license_url: None,
            source: LicenseSource::Unresolved,
        }
    }

    /// Project identity: the key with its version suffix removed.
    ///
    /// Scoped names keep their leading `@` (`@scope/pkg@1.0.0` → `@scope/pkg`).
    pub fn project_name(&self) -> &str {
        match self.key.rfind('@') {
            Some(idx) if idx > 0 => &self.key[..idx],
            _ => &self.key,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.license_text.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Where a record's license text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseSource {
    LocalFile,
    Cache,
    Network,
    /// No declared license URL; nothing was attempted.
    NoLicenseUrl,
    Unresolved,
}

impl std::fmt::Display for LicenseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseSource::LocalFile => write!(f, "local file"),
            LicenseSource::Cache => write!(f, "cache"),
            LicenseSource::Network => write!(f, "network"),
            LicenseSource::NoLicenseUrl => write!(f, "no license url"),
            LicenseSource::Unresolved => write!(f, "unresolved"),
        }
    }
}
