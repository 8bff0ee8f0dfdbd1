//! Ignore-file patterns and their expansion against the repository tree.
//!
//! An ignore file holds one glob per line. Lines are trimmed, a single
//! leading `/` is stripped so the pattern anchors at the repository root,
//! and blank lines are dropped. There is no comment or negation syntax.
//!
//! Matching uses shell-glob rules: `*` and `?` stay within one path
//! segment, `**` crosses segments, `[...]` classes are supported and dotfiles
//! are not special. A path is matched when the path itself or one of its
//! ancestor directories matches a pattern, so `/dist` covers `dist/index.js`.
//! A line that is not a valid glob is matched as a literal path.
//!
//! [`PatternMatcher::matches`] walks the whole checkout, `node_modules`
//! included. The gate only needs to know which changed files are ignored, so
//! it uses [`excluded_among`], which stats the candidates instead.

use std::collections::BTreeSet;
use std::path::Path;

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::GateError;
use crate::model::ChangedFile;

/// Ordered glob patterns parsed from an ignore file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnorePatternSet {
    patterns: Vec<String>,
}

impl IgnorePatternSet {
    /// Parse ignore-file contents.
    pub fn parse(contents: &str) -> Self {
        let patterns = contents
            .lines()
            .map(|line| {
                let line = line.trim();
                line.strip_prefix('/').unwrap_or(line)
            })
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { patterns }
    }

    /// Read and parse the ignore file at `path`.
    ///
    /// A missing file yields an empty set.
    pub fn load(path: &Path) -> Result<Self, GateError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(Self::parse(&contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No ignore file");
                Ok(Self::default())
            }
            Err(source) => Err(GateError::IgnoreFile {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Compiled ignore patterns.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    set: GlobSet,
}

impl PatternMatcher {
    pub fn new(patterns: &IgnorePatternSet) -> Result<Self, GateError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns.patterns() {
            // `dist/` names the directory; ancestor matching does the rest.
            let trimmed = pattern.trim_end_matches('/');
            let trimmed = if trimmed.is_empty() { pattern.as_str() } else { trimmed };
            let glob = match compile(trimmed) {
                Ok(glob) => glob,
                Err(err) => {
                    warn!(pattern = %pattern, error = %err, "Invalid ignore pattern, matching it literally");
                    compile(&globset::escape(trimmed)).map_err(|source| GateError::Pattern {
                        pattern: pattern.clone(),
                        source,
                    })?
                }
            };
            builder.add(glob);
        }
        let set = builder.build().map_err(|source| GateError::Pattern {
            pattern: patterns.patterns().join(", "),
            source,
        })?;
        Ok(Self { set })
    }

    /// Whether a repository-relative, `/`-separated path is ignored.
    pub fn is_match(&self, path: &str) -> bool {
        if self.set.is_empty() {
            return false;
        }
        path.match_indices('/')
            .map(|(idx, _)| &path[..idx])
            .chain(std::iter::once(path))
            .any(|candidate| self.set.is_match(candidate))
    }

    /// Every file under `root` that is ignored, as repository-relative
    /// `/`-separated paths.
    pub fn matches(&self, root: &Path) -> Result<BTreeSet<String>, GateError> {
        let mut matched = BTreeSet::new();
        if self.set.is_empty() {
            return Ok(matched);
        }

        let walker = WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != ".git");

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_dir() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if self.is_match(&relative) {
                matched.insert(relative);
            }
        }

        Ok(matched)
    }

    /// The subset of `candidates` that exists as a non-directory under
    /// `root` and is ignored. Agrees with [`Self::matches`] on every
    /// candidate without reading any directory.
    pub fn matches_among(&self, root: &Path, candidates: &[ChangedFile]) -> BTreeSet<String> {
        if self.set.is_empty() {
            return BTreeSet::new();
        }
        candidates
            .iter()
            .map(|file| file.path.as_str())
            .filter(|path| !path.split('/').any(|segment| segment == ".git"))
            .filter(|path| self.is_match(path))
            .filter(|path| {
                std::fs::symlink_metadata(root.join(path)).is_ok_and(|meta| !meta.is_dir())
            })
            .map(str::to_string)
            .collect()
    }
}

fn compile(pattern: &str) -> Result<Glob, globset::Error> {
    GlobBuilder::new(pattern).literal_separator(true).build()
}

/// Expand `patterns` against the tree at `root`.
pub fn match_patterns(
    patterns: &IgnorePatternSet,
    root: &Path,
) -> Result<BTreeSet<String>, GateError> {
    PatternMatcher::new(patterns)?.matches(root)
}

/// Load the ignore file and expand it against `root`.
///
/// An absent ignore file excludes nothing.
pub fn excluded_paths(ignore_file: &Path, root: &Path) -> Result<BTreeSet<String>, GateError> {
    let patterns = IgnorePatternSet::load(ignore_file)?;
    if patterns.is_empty() {
        return Ok(BTreeSet::new());
    }
    let excluded = match_patterns(&patterns, root)?;
    debug!(
        patterns = patterns.patterns().len(),
        excluded = excluded.len(),
        "Expanded ignore patterns"
    );
    Ok(excluded)
}

/// Load the ignore file and return which of `changed` it excludes.
///
/// Same answer as intersecting [`excluded_paths`] with `changed`.
pub fn excluded_among(
    ignore_file: &Path,
    root: &Path,
    changed: &[ChangedFile],
) -> Result<BTreeSet<String>, GateError> {
    let patterns = IgnorePatternSet::load(ignore_file)?;
    if patterns.is_empty() {
        return Ok(BTreeSet::new());
    }
    let excluded = PatternMatcher::new(&patterns)?.matches_among(root, changed);
    debug!(
        patterns = patterns.patterns().len(),
        excluded = excluded.len(),
        "Matched ignore patterns against changed files"
    );
    Ok(excluded)
}
