//! Lint target selection.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::ChangedFile;

/// Paths handed to the lint engine, in pull request order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LintTargetList(Vec<String>);

impl LintTargetList {
    pub fn paths(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

/// Extension of the final path segment, dot included.
///
/// A leading dot does not start an extension: `.eslintrc` has none,
/// `.eslintrc.js` has `.js`.
pub fn extension_of(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&name[idx..]),
    }
}

/// Keep each changed file whose extension is allowed and which is not
/// excluded.
pub fn select(
    changed: &[ChangedFile],
    allow_extensions: &BTreeSet<String>,
    excluded: &BTreeSet<String>,
) -> LintTargetList {
    LintTargetList(
        changed
            .iter()
            .filter(|file| {
                extension_of(&file.path).is_some_and(|ext| allow_extensions.contains(ext))
                    && !excluded.contains(&file.path)
            })
            .map(|file| file.path.clone())
            .collect(),
    )
}
