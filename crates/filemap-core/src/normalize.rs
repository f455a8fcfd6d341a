//! Normalization pipeline
//!
//! ```text
//! raw value ──▶ classify ──▶ raw mappings ──▶ resolve globs ──┬──▶ entries
//!                                                  (expand)   └──▶ one entry per match
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::expand::{self, ExpandOptions};
use crate::glob::{self, FsGlob, GlobEngine, ResolveOptions};
use crate::hooks::{FilterHook, HookRegistry, RenameHook};
use crate::options::{EXPAND_ONLY_KEYS, MappingOptions};
use crate::shape::{FileSpec, RawMapping};

/// One normalized source/destination mapping
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedEntry {
    /// Destination path
    pub dest: String,

    /// Resolved source paths (or literal patterns under `nonull`)
    pub src: Vec<String>,

    /// Extra properties copied from the input
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// Original fragment this entry came from; entries expanded from the
    /// same fragment share one allocation
    pub orig: Arc<Value>,
}

/// Normalizes file specifications against a base directory
#[derive(Clone)]
pub struct Normalizer {
    base_dir: PathBuf,
    dot: bool,
    engine: Arc<dyn GlobEngine>,
    hooks: HookRegistry,
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("base_dir", &self.base_dir)
            .field("dot", &self.dot)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// Normalizer rooted at the process working directory
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            dot: false,
            engine: Arc::new(FsGlob),
            hooks: HookRegistry::default(),
        }
    }

    /// Directory that patterns without `cwd` are matched in
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Default for the `dot` option
    pub fn with_dot(mut self, dot: bool) -> Self {
        self.dot = dot;
        self
    }

    /// Replace the matching primitive
    pub fn with_glob_engine(mut self, engine: impl GlobEngine + 'static) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    /// Register a rename hook referenced as `rename: <name>`
    pub fn with_rename_hook(mut self, name: impl Into<String>, hook: impl RenameHook + 'static) -> Self {
        self.hooks.register_rename(name, hook);
        self
    }

    /// Register a filter hook referenced as `filter: <name>`
    pub fn with_filter_hook(mut self, name: impl Into<String>, hook: impl FilterHook + 'static) -> Self {
        self.hooks.register_filter(name, hook);
        self
    }

    /// Base directory patterns are matched in
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Normalize one target's file specification.
    ///
    /// `key` is the target name; for the compact form it is also the
    /// destination.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let entries = Normalizer::new()
    ///     .with_base_dir("./project")
    ///     .normalize(&json!({"src": ["src/*.js"], "dest": "dist/built.js"}), "build")?;
    /// assert_eq!(entries[0].dest, "dist/built.js");
    /// ```
    pub fn normalize(&self, value: &Value, key: &str) -> Result<Vec<NormalizedEntry>> {
        let spec = FileSpec::classify(value, key)?;
        tracing::debug!("Target '{}' uses the {} form", key, spec.shape_name());

        let mut entries = Vec::new();
        for raw in spec.into_raw_mappings(key)? {
            self.assemble(raw, key, &mut entries)?;
        }
        tracing::debug!("Target '{}' normalized to {} entries", key, entries.len());
        Ok(entries)
    }

    fn assemble(&self, raw: RawMapping, target: &str, out: &mut Vec<NormalizedEntry>) -> Result<()> {
        let options = MappingOptions::from_props(&raw.props, &self.hooks, target)?;
        let resolve_options = ResolveOptions {
            cwd: options.cwd.as_deref(),
            // expand mode never keeps literal patterns
            nonull: options.nonull && !options.expand,
            dot: options.dot.unwrap_or(self.dot),
            filter: options.filter.as_ref(),
        };
        let matched = glob::resolve(
            self.engine.as_ref(),
            &self.base_dir,
            &raw.src,
            &resolve_options,
        )?;

        if !options.expand {
            out.push(NormalizedEntry {
                dest: raw.dest,
                src: matched,
                extra: raw.props,
                orig: raw.orig,
            });
            return Ok(());
        }

        let extra: Map<String, Value> = raw
            .props
            .into_iter()
            .filter(|(k, _)| !EXPAND_ONLY_KEYS.contains(&k.as_str()))
            .collect();
        let base = expand::dest_base(&raw.dest);
        let expand_options = ExpandOptions::from(&options);

        for relative in matched {
            let dest = expand::destination(&base, &relative, &expand_options, target)?;
            let src = expand::source_path(options.cwd.as_deref(), &relative);
            tracing::debug!("Expanded '{}' -> '{}'", src, dest);
            out.push(NormalizedEntry {
                dest,
                src: vec![src],
                extra: extra.clone(),
                orig: Arc::clone(&raw.orig),
            });
        }
        Ok(())
    }
}

/// Normalize against the process working directory with default settings.
pub fn normalize(value: &Value, key: &str) -> Result<Vec<NormalizedEntry>> {
    Normalizer::new().normalize(value, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Engine answering from a fixed table, to pin ordering independent of disk
    struct TableGlob(Vec<(&'static str, Vec<&'static str>)>);

    impl GlobEngine for TableGlob {
        fn matches(&self, pattern: &str, _cwd: &Path, _: glob::MatchOptions) -> Result<Vec<String>> {
            Ok(self
                .0
                .iter()
                .find(|(p, _)| *p == pattern)
                .map(|(_, m)| m.iter().map(|s| s.to_string()).collect())
                .unwrap_or_default())
        }
    }

    fn normalizer() -> Normalizer {
        Normalizer::new().with_glob_engine(TableGlob(vec![
            ("b*", vec!["b2", "b1"]),
            ("a*", vec!["a1"]),
            ("*", vec!["a1", "b1", "b2"]),
        ]))
    }

    #[test]
    fn test_engine_order_is_kept() {
        let out = normalizer().normalize(&json!(["b*", "a*", "*"]), "out").unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].src, vec!["b2", "b1", "a1"]);
    }

    #[test]
    fn test_expand_shares_orig() {
        let value = json!({"src": "*", "dest": "d", "expand": true, "keep": 1});
        let out = normalizer().normalize(&value, "t").unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.windows(2).all(|w| Arc::ptr_eq(&w[0].orig, &w[1].orig)));
        let dests: Vec<&str> = out.iter().map(|e| e.dest.as_str()).collect();
        assert_eq!(dests, vec!["d/a1", "d/b1", "d/b2"]);
        assert!(out.iter().all(|e| e.src.len() == 1));
        assert_eq!(out[0].extra, *json!({"keep": 1}).as_object().unwrap());
    }

    #[test]
    fn test_expand_ignores_nonull() {
        let value = json!({"src": "zzz*", "dest": "d/", "expand": true, "nonull": true});
        let out = normalizer().normalize(&value, "t").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let value = json!({"src": "a*", "dest": "out.js", "foo": 123});
        let out = normalizer().normalize(&value, "t").unwrap();
        let serialized = serde_json::to_value(&out[0]).unwrap();
        assert_eq!(
            serialized,
            json!({"dest": "out.js", "src": ["a1"], "foo": 123, "orig": value})
        );
    }

    #[test]
    fn test_unknown_hook_names_target() {
        let value = json!({"src": "a*", "dest": "d/", "expand": true, "rename": "missing"});
        let err = normalizer().normalize(&value, "scripts").unwrap_err();
        assert!(err.to_string().contains("scripts"));
    }
}
