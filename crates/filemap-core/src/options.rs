//! Mapping options carried on object-shaped file specifications
//!
//! Options live next to `src` and `dest` in the same object. Every other key
//! is an extra property and is copied onto the normalized entries.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::hooks::{Filter, HookRegistry, Renamer};
use crate::patterns::kind_of;

/// Keys that describe the mapping itself and never appear as extras
pub const MAPPING_KEYS: &[&str] = &["src", "dest"];

/// Keys removed from entries produced by expand mode
pub const EXPAND_ONLY_KEYS: &[&str] = &["expand", "cwd", "flatten", "rename", "ext", "extDot"];

/// Which dot starts the extension replaced by `ext`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtDot {
    /// First dot of the file name (`a.min.js` → `a` + ext)
    #[default]
    First,
    /// Last dot of the file name (`a.min.js` → `a.min` + ext)
    Last,
}

/// Options with reserved meaning, parsed from a mapping object
#[derive(Debug, Clone, Default)]
pub struct MappingOptions {
    /// Directory patterns are matched in, relative to the normalizer base
    pub cwd: Option<String>,
    /// Derive one destination per matched source
    pub expand: bool,
    /// Keep only the file name when deriving destinations
    pub flatten: bool,
    /// Keep non-matching patterns literally
    pub nonull: bool,
    /// Let wildcards match dot-files; `None` defers to the normalizer
    pub dot: Option<bool>,
    /// Replacement extension for derived destinations
    pub ext: Option<String>,
    /// Where the replaced extension starts
    pub ext_dot: ExtDot,
    /// Predicate applied to every match
    pub filter: Option<Filter>,
    /// Strategy applied to derived destinations
    pub rename: Option<Renamer>,
}

impl MappingOptions {
    /// Parse reserved options out of `props`, resolving named hooks.
    pub fn from_props(props: &Map<String, Value>, hooks: &HookRegistry, target: &str) -> Result<Self> {
        let ext_dot = match props.get("extDot") {
            None | Some(Value::Null) => ExtDot::First,
            Some(Value::String(s)) if s == "first" => ExtDot::First,
            Some(Value::String(s)) if s == "last" => ExtDot::Last,
            Some(other) => {
                return Err(invalid(
                    target,
                    format!("`extDot` must be \"first\" or \"last\", found {other}"),
                ));
            }
        };

        Ok(Self {
            cwd: string_opt(props, "cwd", target)?,
            expand: bool_opt(props, "expand", target)?.unwrap_or(false),
            flatten: bool_opt(props, "flatten", target)?.unwrap_or(false),
            nonull: bool_opt(props, "nonull", target)?.unwrap_or(false),
            dot: bool_opt(props, "dot", target)?,
            ext: string_opt(props, "ext", target)?,
            ext_dot,
            filter: match props.get("filter") {
                None | Some(Value::Null) => None,
                Some(value) => Some(hooks.filter(value, target)?),
            },
            rename: match props.get("rename") {
                None | Some(Value::Null) => None,
                Some(value) => Some(hooks.renamer(value, target)?),
            },
        })
    }
}

fn bool_opt(props: &Map<String, Value>, key: &str, target: &str) -> Result<Option<bool>> {
    match props.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(invalid(
            target,
            format!("`{key}` must be a boolean, found {}", kind_of(other)),
        )),
    }
}

fn string_opt(props: &Map<String, Value>, key: &str, target: &str) -> Result<Option<String>> {
    match props.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(invalid(
            target,
            format!("`{key}` must be a string, found {}", kind_of(other)),
        )),
    }
}

fn invalid(target: &str, message: String) -> Error {
    Error::InvalidFileSpec {
        target: target.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("Expected object"),
        }
    }

    #[test]
    fn test_defaults() {
        let opts = MappingOptions::from_props(&Map::new(), &HookRegistry::default(), "t").unwrap();
        assert!(!opts.expand);
        assert!(!opts.flatten);
        assert!(!opts.nonull);
        assert!(opts.cwd.is_none());
        assert!(opts.dot.is_none());
        assert_eq!(opts.ext_dot, ExtDot::First);
        assert!(opts.filter.is_none());
        assert!(opts.rename.is_none());
    }

    #[test]
    fn test_parse_all_options() {
        let p = props(json!({
            "expand": true,
            "cwd": "src",
            "flatten": true,
            "nonull": true,
            "dot": true,
            "ext": ".min.js",
            "extDot": "last",
            "filter": "isFile",
            "rename": {"template": "{{ dest_base }}{{ dest_path }}"},
            "foo": 123
        }));
        let opts = MappingOptions::from_props(&p, &HookRegistry::default(), "t").unwrap();
        assert!(opts.expand);
        assert!(opts.flatten);
        assert!(opts.nonull);
        assert_eq!(opts.cwd.as_deref(), Some("src"));
        assert_eq!(opts.dot, Some(true));
        assert_eq!(opts.ext.as_deref(), Some(".min.js"));
        assert_eq!(opts.ext_dot, ExtDot::Last);
        assert!(matches!(opts.filter, Some(Filter::IsFile)));
        assert!(matches!(opts.rename, Some(Renamer::Template(_))));
    }

    #[test]
    fn test_null_means_unset() {
        let p = props(json!({"nonull": null, "cwd": null}));
        let opts = MappingOptions::from_props(&p, &HookRegistry::default(), "t").unwrap();
        assert!(!opts.nonull);
        assert!(opts.cwd.is_none());
    }

    #[test]
    fn test_wrong_types_are_rejected() {
        let hooks = HookRegistry::default();
        assert!(MappingOptions::from_props(&props(json!({"expand": "yes"})), &hooks, "t").is_err());
        assert!(MappingOptions::from_props(&props(json!({"cwd": 1})), &hooks, "t").is_err());
        assert!(MappingOptions::from_props(&props(json!({"extDot": "middle"})), &hooks, "t").is_err());
    }
}
