//! File specification shapes
//!
//! A target's files may be declared in several forms:
//!
//! ```yaml
//! # compact: the target key is the destination
//! dist/built.js: src/*.js
//!
//! # explicit object
//! build:
//!   src: [src/*.js]
//!   dest: dist/built.js
//!
//! # files keyed by destination
//! build:
//!   files:
//!     dist/a.js: src/a/*.js
//!     dist/b.js: [src/b/*.js]
//!
//! # files as a list of single-key objects and/or explicit objects
//! build:
//!   files:
//!     - dist/a.js: src/a/*.js
//!     - { src: [src/b/*.js], dest: dist/b.js, expand: true }
//! ```
//!
//! [`FileSpec::classify`] inspects the raw value once and returns a tagged
//! variant; [`FileSpec::into_raw_mappings`] turns it into [`RawMapping`]s
//! with flattened patterns and provenance attached.

use std::sync::Arc;

use serde_json::{Map, Value, json};

use crate::error::{Error, Result};
use crate::options::MAPPING_KEYS;
use crate::patterns::{flatten, kind_of};

/// Target-level key holding task options, never part of a mapping
const OPTIONS_KEY: &str = "options";

/// Provenance key of an assembled entry
const ORIG_KEY: &str = "orig";

/// A classified file specification, borrowing from the raw value
#[derive(Debug, Clone)]
pub enum FileSpec<'a> {
    /// Bare patterns; the target key is the destination
    Compact {
        /// Destination (the target key)
        dest: &'a str,
        /// Pattern or nested pattern list
        src: &'a Value,
    },

    /// `{src, dest, ...}`
    Explicit(ExplicitMapping<'a>),

    /// `{files: {dest: patterns, ...}}`
    FilesMap {
        /// Destination → patterns, in declaration order
        files: &'a Map<String, Value>,
        /// Other target-level keys, applied to every mapping
        defaults: Map<String, Value>,
    },

    /// `{files: [...]}`
    FilesList {
        /// List items, nested lists already flattened
        items: Vec<FilesItem<'a>>,
        /// Other target-level keys, applied to every mapping
        defaults: Map<String, Value>,
    },
}

/// One element of a `files` list
#[derive(Debug, Clone)]
pub enum FilesItem<'a> {
    /// `{src, dest, ...}`
    Explicit(ExplicitMapping<'a>),
    /// `{dest: patterns}`, one mapping per key
    DestPairs(&'a Map<String, Value>),
}

/// An explicit `{src, dest, ...}` object
#[derive(Debug, Clone, Copy)]
pub struct ExplicitMapping<'a> {
    value: &'a Value,
    map: &'a Map<String, Value>,
}

/// A mapping with flattened (still unresolved) patterns
#[derive(Debug, Clone, PartialEq)]
pub struct RawMapping {
    /// Declared destination
    pub dest: String,
    /// Flattened source patterns
    pub src: Vec<String>,
    /// Every other key: options plus extra properties
    pub props: Map<String, Value>,
    /// The original fragment, or its minimal reconstruction
    pub orig: Arc<Value>,
}

impl<'a> FileSpec<'a> {
    /// Classify `value`. `key` is the target name, which doubles as the
    /// destination for the compact form.
    pub fn classify(value: &'a Value, key: &'a str) -> Result<Self> {
        let Value::Object(map) = value else {
            return Ok(Self::Compact { dest: key, src: value });
        };

        match map.get("files") {
            Some(Value::Array(items)) => {
                let mut flat = Vec::new();
                collect_items(items, key, &mut flat)?;
                return Ok(Self::FilesList {
                    items: flat,
                    defaults: defaults(map),
                });
            }
            Some(Value::Object(files)) => {
                return Ok(Self::FilesMap {
                    files,
                    defaults: defaults(map),
                });
            }
            Some(other) => {
                return Err(invalid(
                    key,
                    format!("`files` must be a list or an object, found {}", kind_of(other)),
                ));
            }
            None => {}
        }

        if map.contains_key("src") || map.contains_key("dest") {
            return ExplicitMapping::new(value, map, key).map(Self::Explicit);
        }

        Err(invalid(
            key,
            "expected patterns, an object with `src` and `dest`, or an object with `files`"
                .to_string(),
        ))
    }

    /// Short name of the shape, for logging
    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::Compact { .. } => "compact",
            Self::Explicit(_) => "explicit",
            Self::FilesMap { .. } => "files-map",
            Self::FilesList { .. } => "files-list",
        }
    }

    /// Convert into raw mappings in declaration order.
    pub fn into_raw_mappings(self, target: &str) -> Result<Vec<RawMapping>> {
        match self {
            Self::Compact { dest, src } => Ok(vec![reconstructed(dest, src, Map::new(), target)?]),
            Self::Explicit(explicit) => Ok(vec![explicit.into_raw(&Map::new(), target)?]),
            Self::FilesMap { files, defaults } => files
                .iter()
                .map(|(dest, src)| reconstructed(dest, src, defaults.clone(), target))
                .collect(),
            Self::FilesList { items, defaults } => {
                let mut raw = Vec::new();
                for item in items {
                    match item {
                        FilesItem::Explicit(explicit) => {
                            raw.push(explicit.into_raw(&defaults, target)?);
                        }
                        FilesItem::DestPairs(pairs) => {
                            for (dest, src) in pairs {
                                raw.push(reconstructed(dest, src, defaults.clone(), target)?);
                            }
                        }
                    }
                }
                Ok(raw)
            }
        }
    }
}

impl<'a> ExplicitMapping<'a> {
    fn new(value: &'a Value, map: &'a Map<String, Value>, target: &str) -> Result<Self> {
        match (map.get("src"), map.get("dest")) {
            (Some(_), Some(Value::String(_))) => Ok(Self { value, map }),
            (Some(_), Some(other)) => Err(invalid(
                target,
                format!("`dest` must be a string, found {}", kind_of(other)),
            )),
            _ => Err(invalid(
                target,
                "an explicit mapping needs both `src` and `dest`".to_string(),
            )),
        }
    }

    /// Destination as declared
    pub fn dest(&self) -> &'a str {
        self.map.get("dest").and_then(Value::as_str).unwrap_or_default()
    }

    fn into_raw(self, defaults: &Map<String, Value>, target: &str) -> Result<RawMapping> {
        let src = match self.map.get("src") {
            Some(patterns) => flatten(patterns, target)?,
            None => Vec::new(),
        };

        let mut props: Map<String, Value> = self
            .map
            .iter()
            .filter(|(k, _)| is_extra(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (k, v) in defaults {
            if !props.contains_key(k) {
                props.insert(k.clone(), v.clone());
            }
        }

        Ok(RawMapping {
            dest: self.dest().to_string(),
            src,
            props,
            orig: Arc::new(self.value.clone()),
        })
    }
}

fn collect_items<'a>(items: &'a [Value], target: &str, out: &mut Vec<FilesItem<'a>>) -> Result<()> {
    for item in items {
        match item {
            Value::Array(nested) => collect_items(nested, target, out)?,
            Value::Object(map) if map.contains_key("src") || map.contains_key("dest") => {
                out.push(FilesItem::Explicit(ExplicitMapping::new(item, map, target)?));
            }
            Value::Object(map) => out.push(FilesItem::DestPairs(map)),
            other => {
                return Err(invalid(
                    target,
                    format!("`files` list items must be objects, found {}", kind_of(other)),
                ));
            }
        }
    }
    Ok(())
}

fn reconstructed(
    dest: &str,
    src: &Value,
    props: Map<String, Value>,
    target: &str,
) -> Result<RawMapping> {
    let src = flatten(src, target)?;
    Ok(RawMapping {
        dest: dest.to_string(),
        orig: Arc::new(json!({ "dest": dest, "src": src })),
        src,
        props,
    })
}

fn defaults(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter(|(k, _)| k.as_str() != "files" && is_extra(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn is_extra(key: &str) -> bool {
    key != OPTIONS_KEY && key != ORIG_KEY && !MAPPING_KEYS.contains(&key)
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
    use rstest::rstest;

    fn raw(value: &Value, key: &str) -> Vec<RawMapping> {
        FileSpec::classify(value, key)
            .unwrap()
            .into_raw_mappings(key)
            .unwrap()
    }

    #[rstest]
    #[case(json!("src/*.js"), "compact")]
    #[case(json!([["a"], "b"]), "compact")]
    #[case(json!({"src": "a", "dest": "b"}), "explicit")]
    #[case(json!({"files": {"b": "a"}}), "files-map")]
    #[case(json!({"files": [{"b": "a"}]}), "files-list")]
    #[case(json!({"files": [], "src": "ignored"}), "files-list")]
    fn test_classify(#[case] value: Value, #[case] shape: &str) {
        let spec = FileSpec::classify(&value, "t").unwrap();
        assert_eq!(spec.shape_name(), shape);
    }

    #[test]
    fn test_compact_reconstructs_orig() {
        let value = json!([["src/*1.js"], ["src/*2.js"]]);
        let out = raw(&value, "dist/built.js");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dest, "dist/built.js");
        assert_eq!(out[0].src, vec!["src/*1.js", "src/*2.js"]);
        assert_eq!(
            *out[0].orig,
            json!({"dest": "dist/built.js", "src": ["src/*1.js", "src/*2.js"]})
        );
        assert!(out[0].props.is_empty());
    }

    #[test]
    fn test_explicit_keeps_value_as_orig() {
        let value = json!({"src": ["a.js"], "dest": "out.js", "nonull": true, "foo": 1, "options": {"x": 1}});
        let out = raw(&value, "ignored");
        assert_eq!(out[0].dest, "out.js");
        assert_eq!(*out[0].orig, value);
        assert_eq!(out[0].props, *json!({"nonull": true, "foo": 1}).as_object().unwrap());
    }

    #[test]
    fn test_files_map_preserves_declaration_order() {
        let value = json!({"files": {"z.js": "p1", "a.js": ["p2", ["p3"]], "m.js": "p4"}});
        let out = raw(&value, "ignored");
        let dests: Vec<&str> = out.iter().map(|m| m.dest.as_str()).collect();
        assert_eq!(dests, vec!["z.js", "a.js", "m.js"]);
        assert_eq!(out[1].src, vec!["p2", "p3"]);
        assert_eq!(*out[1].orig, json!({"dest": "a.js", "src": ["p2", "p3"]}));
    }

    #[test]
    fn test_files_list_mixes_forms() {
        let value = json!({
            "files": [
                {"a.js": "p1"},
                [{"src": ["p2"], "dest": "b.js", "bar": null}],
                {"c.js": "p3", "d.js": "p4"}
            ]
        });
        let out = raw(&value, "ignored");
        let dests: Vec<&str> = out.iter().map(|m| m.dest.as_str()).collect();
        assert_eq!(dests, vec!["a.js", "b.js", "c.js", "d.js"]);
        assert_eq!(*out[0].orig, json!({"dest": "a.js", "src": ["p1"]}));
        assert_eq!(*out[1].orig, json!({"src": ["p2"], "dest": "b.js", "bar": null}));
        assert_eq!(out[1].props.get("bar"), Some(&Value::Null));
    }

    #[test]
    fn test_target_level_defaults() {
        let value = json!({
            "nonull": true,
            "options": {"banner": "x"},
            "files": [
                {"a.js": "p1"},
                {"src": "p2", "dest": "b.js", "nonull": false}
            ]
        });
        let out = raw(&value, "ignored");
        assert_eq!(out[0].props.get("nonull"), Some(&json!(true)));
        assert_eq!(out[1].props.get("nonull"), Some(&json!(false)));
        assert!(out.iter().all(|m| !m.props.contains_key("options")));
        // reconstructed orig never carries defaults
        assert_eq!(*out[0].orig, json!({"dest": "a.js", "src": ["p1"]}));
    }

    #[test]
    fn test_entry_keys_never_become_defaults() {
        let value = json!({
            "src": "stale",
            "dest": "stale.js",
            "orig": {"x": 1},
            "foo": 1,
            "files": [{"dest": "out.js", "src": "p1", "orig": "inner"}, {"a.js": "p2"}]
        });
        let out = raw(&value, "ignored");
        assert_eq!(out[0].src, vec!["p1"]);
        assert_eq!(out[0].props, *json!({"foo": 1}).as_object().unwrap());
        assert_eq!(out[1].props, *json!({"foo": 1}).as_object().unwrap());
        assert_eq!(*out[0].orig, value["files"][0]);
    }

    #[rstest]
    #[case(json!({"src": "a"}))]
    #[case(json!({"dest": "a"}))]
    #[case(json!({"src": "a", "dest": 3}))]
    #[case(json!({"files": "nope"}))]
    #[case(json!({"files": ["nope"]}))]
    #[case(json!({"files": [{"dest": "x"}]}))]
    #[case(json!({"unrelated": true}))]
    fn test_unrecognized_shapes(#[case] value: Value) {
        let err = FileSpec::classify(&value, "build").unwrap_err();
        match err {
            Error::InvalidFileSpec { target, .. } => assert_eq!(target, "build"),
            other => panic!("Expected InvalidFileSpec, got {other:?}"),
        }
    }

    #[rstest]
    #[case(json!(5))]
    #[case(json!({"files": {"a.js": 5}}))]
    fn test_bad_patterns_fail_on_conversion(#[case] value: Value) {
        let spec = FileSpec::classify(&value, "build").unwrap();
        assert!(spec.into_raw_mappings("build").is_err());
    }
}
