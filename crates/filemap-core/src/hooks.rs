//! Rename and filter strategies
//!
//! Expand mode may route every computed destination through a rename
//! strategy, and the resolver may drop matches with a filter predicate.
//! Configuration files cannot carry code, so both are referenced by name
//! and looked up in a [`HookRegistry`] owned by the normalizer:
//!
//! ```yaml
//! files:
//!   - expand: true
//!     src: ["src/*.js"]
//!     dest: dist/
//!     rename: minify                        # registered hook
//!     filter: isFile                        # built-in predicate
//!   - expand: true
//!     src: ["assets/*"]
//!     dest: dist/
//!     rename:
//!       template: "{{ dest_base }}static/{{ dest_path }}"
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{Error, HookError, Result};
use crate::patterns::kind_of;

/// Computes a final destination from a destination base and a relative path.
///
/// Implementations may have side effects. Errors are propagated to the
/// caller of the normalizer as-is and are never retried.
pub trait RenameHook: Send + Sync {
    /// Return the destination for `dest_path` under `dest_base`
    fn rename(&self, dest_base: &str, dest_path: &str) -> std::result::Result<String, HookError>;
}

impl<F> RenameHook for F
where
    F: Fn(&str, &str) -> std::result::Result<String, HookError> + Send + Sync,
{
    fn rename(&self, dest_base: &str, dest_path: &str) -> std::result::Result<String, HookError> {
        self(dest_base, dest_path)
    }
}

/// Decides whether a matched path is kept.
pub trait FilterHook: Send + Sync {
    /// `path` is the match joined with the effective working directory
    fn keep(&self, path: &Path) -> bool;
}

impl<F> FilterHook for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn keep(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Named hooks available to configuration
#[derive(Clone, Default)]
pub struct HookRegistry {
    renames: HashMap<String, Arc<dyn RenameHook>>,
    filters: HashMap<String, Arc<dyn FilterHook>>,
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut renames: Vec<_> = self.renames.keys().collect();
        let mut filters: Vec<_> = self.filters.keys().collect();
        renames.sort();
        filters.sort();
        f.debug_struct("HookRegistry")
            .field("renames", &renames)
            .field("filters", &filters)
            .finish()
    }
}

impl HookRegistry {
    /// Register a rename hook under `name`, replacing any previous one
    pub fn register_rename(&mut self, name: impl Into<String>, hook: impl RenameHook + 'static) {
        self.renames.insert(name.into(), Arc::new(hook));
    }

    /// Register a filter hook under `name`, replacing any previous one
    pub fn register_filter(&mut self, name: impl Into<String>, hook: impl FilterHook + 'static) {
        self.filters.insert(name.into(), Arc::new(hook));
    }

    /// Resolve a `rename` option value.
    pub fn renamer(&self, value: &Value, target: &str) -> Result<Renamer> {
        match value {
            Value::String(name) => self
                .renames
                .get(name)
                .map(|hook| Renamer::Hook(Arc::clone(hook)))
                .ok_or_else(|| Error::UnknownHook {
                    kind: "rename",
                    name: name.clone(),
                    target: target.to_string(),
                }),
            Value::Object(map) => match map.get("template") {
                Some(Value::String(template)) => Ok(Renamer::Template(template.clone())),
                _ => Err(Error::InvalidFileSpec {
                    target: target.to_string(),
                    message: "`rename` object must carry a string `template`".to_string(),
                }),
            },
            other => Err(Error::InvalidFileSpec {
                target: target.to_string(),
                message: format!(
                    "`rename` must be a hook name or {{template: ...}}, found {}",
                    kind_of(other)
                ),
            }),
        }
    }

    /// Resolve a `filter` option value.
    ///
    /// Built-in predicate names take precedence over registered hooks.
    pub fn filter(&self, value: &Value, target: &str) -> Result<Filter> {
        let Value::String(name) = value else {
            return Err(Error::InvalidFileSpec {
                target: target.to_string(),
                message: format!("`filter` must be a name, found {}", kind_of(value)),
            });
        };
        match name.as_str() {
            "isFile" => Ok(Filter::IsFile),
            "isDirectory" => Ok(Filter::IsDirectory),
            "isSymbolicLink" => Ok(Filter::IsSymbolicLink),
            _ => self
                .filters
                .get(name)
                .map(|hook| Filter::Hook(Arc::clone(hook)))
                .ok_or_else(|| Error::UnknownHook {
                    kind: "filter",
                    name: name.clone(),
                    target: target.to_string(),
                }),
        }
    }
}

/// A resolved rename strategy
#[derive(Clone)]
pub enum Renamer {
    /// Registered hook
    Hook(Arc<dyn RenameHook>),
    /// `minijinja` template with `dest_base` and `dest_path` in scope
    Template(String),
}

impl fmt::Debug for Renamer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hook(_) => f.write_str("Renamer::Hook(..)"),
            Self::Template(t) => f.debug_tuple("Renamer::Template").field(t).finish(),
        }
    }
}

impl Renamer {
    /// Apply the strategy. Hook errors are wrapped without modification.
    pub fn apply(&self, dest_base: &str, dest_path: &str, target: &str) -> Result<String> {
        match self {
            Self::Hook(hook) => hook
                .rename(dest_base, dest_path)
                .map_err(|source| Error::Rename {
                    target: target.to_string(),
                    dest_path: dest_path.to_string(),
                    source,
                }),
            Self::Template(template) => {
                let env = minijinja::Environment::new();
                let rendered = env.render_str(
                    template,
                    minijinja::context! { dest_base => dest_base, dest_path => dest_path },
                )?;
                Ok(rendered)
            }
        }
    }
}

/// A resolved match filter
#[derive(Clone)]
pub enum Filter {
    /// Keep regular files
    IsFile,
    /// Keep directories
    IsDirectory,
    /// Keep symbolic links (not followed)
    IsSymbolicLink,
    /// Registered predicate
    Hook(Arc<dyn FilterHook>),
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IsFile => f.write_str("Filter::IsFile"),
            Self::IsDirectory => f.write_str("Filter::IsDirectory"),
            Self::IsSymbolicLink => f.write_str("Filter::IsSymbolicLink"),
            Self::Hook(_) => f.write_str("Filter::Hook(..)"),
        }
    }
}

impl Filter {
    /// Whether `path` passes the filter. Unreadable paths never pass a
    /// built-in predicate.
    pub fn keep(&self, path: &Path) -> bool {
        match self {
            Self::IsFile => path.metadata().is_ok_and(|m| m.is_file()),
            Self::IsDirectory => path.metadata().is_ok_and(|m| m.is_dir()),
            Self::IsSymbolicLink => path
                .symlink_metadata()
                .is_ok_and(|m| m.file_type().is_symlink()),
            Self::Hook(hook) => hook.keep(path),
        }
    }
}
