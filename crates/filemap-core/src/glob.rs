//! Glob resolution
//!
//! Matching itself sits behind [`GlobEngine`] so callers can substitute
//! their own primitive. [`FsGlob`] is the default: it walks the directory
//! named by the pattern's literal prefix with `walkdir` and tests every
//! entry with a `globset` matcher.
//!
//! [`resolve`] layers the mapping semantics on top of the engine:
//! `!` exclusions, the `filter` predicate, the `nonull` fallback and
//! first-seen deduplication.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::hooks::Filter;

/// Options passed through to the matching primitive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Let wildcards match path components starting with `.`
    pub dot: bool,
}

/// Pattern matching primitive
pub trait GlobEngine: Send + Sync {
    /// Return the paths under `cwd` matching `pattern`, relative to `cwd`,
    /// with `/` separators, in a stable order. No match yields an empty list.
    fn matches(&self, pattern: &str, cwd: &Path, options: MatchOptions) -> Result<Vec<String>>;
}

/// Filesystem-backed glob engine. Results are sorted lexically.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsGlob;

impl GlobEngine for FsGlob {
    fn matches(&self, pattern: &str, cwd: &Path, options: MatchOptions) -> Result<Vec<String>> {
        if pattern.is_empty() {
            return Ok(vec![]);
        }

        let segments: Vec<&str> = pattern.split('/').collect();
        let literal_len = segments.iter().take_while(|s| !is_glob(s)).count();

        if literal_len == segments.len() {
            let exists = cwd.join(pattern).symlink_metadata().is_ok();
            return Ok(if exists { vec![pattern.to_string()] } else { vec![] });
        }

        let prefix = segments[..literal_len].join("/");
        let rest = segments[literal_len..].join("/");
        let walk_root = match (literal_len, prefix.is_empty()) {
            (0, _) => cwd.to_path_buf(),
            (_, true) => PathBuf::from("/"),
            (_, false) => cwd.join(&prefix),
        };
        if !walk_root.is_dir() {
            return Ok(vec![]);
        }

        let matcher = GlobBuilder::new(&rest)
            .literal_separator(true)
            .build()
            .map_err(|source| Error::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?
            .compile_matcher();
        let rest_segments: Vec<&str> = rest.split('/').collect();

        let mut walker = WalkDir::new(&walk_root).min_depth(1).sort_by_file_name();
        if !rest.contains("**") {
            walker = walker.max_depth(segments.len() - literal_len);
        }

        let mut found = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(
                        "Skipping unreadable path while matching '{}': {}",
                        pattern,
                        err
                    );
                    continue;
                }
            };
            let Ok(relative) = entry.path().strip_prefix(&walk_root) else {
                continue;
            };
            let components: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            if !options.dot && !dot_components_named(&rest_segments, &components) {
                continue;
            }
            let relative = components.join("/");
            if !matcher.is_match(&relative) {
                continue;
            }
            found.push(match (literal_len, prefix.is_empty()) {
                (0, _) => relative,
                (_, true) => format!("/{relative}"),
                (_, false) => format!("{prefix}/{relative}"),
            });
        }
        found.sort();
        Ok(found)
    }
}

fn is_glob(segment: &str) -> bool {
    segment.contains(['*', '?', '[', '{'])
}

/// Whether every dot-component of `components` lines up with a pattern
/// segment that itself starts with `.`. Components covered by `**` never do.
fn dot_components_named(pattern: &[&str], components: &[String]) -> bool {
    let first_globstar = pattern.iter().position(|s| *s == "**");
    let last_globstar = pattern.iter().rposition(|s| *s == "**");

    components.iter().enumerate().all(|(i, component)| {
        if !component.starts_with('.') {
            return true;
        }
        let segment = match (first_globstar, last_globstar) {
            (Some(head), Some(last)) if i >= head => {
                let tail = pattern.len() - last - 1;
                let from_end = components.len() - i;
                (from_end <= tail).then(|| pattern[pattern.len() - from_end])
            }
            _ => pattern.get(i).copied(),
        };
        segment.is_some_and(|s| s.starts_with('.'))
    })
}

/// Resolver settings for one raw mapping
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions<'a> {
    /// Directory patterns are matched in, relative to the base directory
    pub cwd: Option<&'a str>,
    /// Keep non-matching patterns literally
    pub nonull: bool,
    /// Let wildcards match dot-files
    pub dot: bool,
    /// Predicate applied to every match
    pub filter: Option<&'a Filter>,
}

/// Resolve `patterns` in order into a deduplicated list of paths.
///
/// Matches are relative to `cwd` when set, else to `base_dir`. A pattern
/// starting with `!` removes its matches from what has been collected so
/// far. With `nonull`, a non-exclusion pattern matching nothing contributes
/// itself verbatim.
pub fn resolve(
    engine: &dyn GlobEngine,
    base_dir: &Path,
    patterns: &[String],
    options: &ResolveOptions<'_>,
) -> Result<Vec<String>> {
    let root = match options.cwd {
        Some(cwd) => base_dir.join(cwd),
        None => base_dir.to_path_buf(),
    };
    let match_options = MatchOptions { dot: options.dot };

    let mut resolved: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for pattern in patterns {
        let (exclude, glob) = match pattern.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, pattern.as_str()),
        };

        let mut matches = engine.matches(glob, &root, match_options)?;
        if let Some(filter) = options.filter {
            matches.retain(|m| filter.keep(&root.join(m)));
        }
        tracing::debug!("Pattern '{}' matched {} paths", pattern, matches.len());

        if exclude {
            // the pattern text also removes a literal kept by `nonull`
            let excluded: HashSet<&str> = matches
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(glob))
                .collect();
            resolved.retain(|path| !excluded.contains(path.as_str()));
            seen.retain(|path| !excluded.contains(path.as_str()));
            continue;
        }

        if matches.is_empty() {
            if options.nonull {
                matches.push(pattern.clone());
            } else {
                tracing::debug!("Dropping pattern '{}' with no matches", pattern);
            }
        }

        for path in matches {
            if seen.insert(path.clone()) {
                resolved.push(path);
            }
        }
    }

    Ok(resolved)
}
