//! Gate configuration.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name given to check runs this gate creates.
pub const DEFAULT_CHECK_NAME: &str = "ESLint";

/// Extensions linted when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".js", ".jsx", ".ts", ".tsx"];

/// Ignore file read from the repository root when none is configured.
pub const DEFAULT_IGNORE_FILE: &str = ".eslintignore";

/// Everything one gate invocation needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Pull request number.
    pub pr_number: u64,

    /// Name of an existing in-progress check run to reuse.
    pub check_name: Option<String>,

    /// Extensions (with leading dot) eligible for linting.
    pub extensions: BTreeSet<String>,

    /// Ignore file, relative to `root` unless absolute.
    pub ignore_file: PathBuf,

    /// Repository checkout root.
    pub root: PathBuf,
}

impl GateConfig {
    pub fn new(pr_number: u64) -> Self {
        Self {
            pr_number,
            check_name: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            ignore_file: PathBuf::from(DEFAULT_IGNORE_FILE),
            root: PathBuf::from("."),
        }
    }

    /// Set the reusable check-run name. Blank names count as unset.
    pub fn with_check_name(mut self, name: Option<String>) -> Self {
        self.check_name = name.filter(|n| !n.trim().is_empty());
        self
    }

    /// Replace the allowed extensions. A missing leading dot is added.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().to_string())
            .filter(|e| !e.is_empty())
            .map(|e| if e.starts_with('.') { e } else { format!(".{e}") })
            .collect();
        self
    }

    pub fn with_ignore_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignore_file = path.into();
        self
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Ignore file resolved against the root.
    pub fn ignore_file_path(&self) -> PathBuf {
        resolve(&self.root, &self.ignore_file)
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
