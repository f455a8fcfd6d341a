//! Source pattern flattening
//!
//! Source patterns may be written as a single string or as arbitrarily
//! nested lists of strings:
//!
//! ```yaml
//! src:
//!   - src/*1.js
//!   - - - src/*2.js
//! ```
//!
//! Before matching, every such value is flattened into one ordered list.
//! Duplicates are kept here; the resolver deduplicates matches.

use serde_json::Value;

use crate::error::{Error, Result};

/// Flatten a pattern value into an ordered list of pattern strings.
///
/// `target` names the target being normalized and only appears in errors.
pub fn flatten(value: &Value, target: &str) -> Result<Vec<String>> {
    let mut out = Vec::new();
    flatten_into(value, target, &mut out)?;
    Ok(out)
}

fn flatten_into(value: &Value, target: &str, out: &mut Vec<String>) -> Result<()> {
    match value {
        Value::String(pattern) => out.push(pattern.clone()),
        Value::Array(items) => {
            for item in items {
                flatten_into(item, target, out)?;
            }
        }
        other => {
            return Err(Error::InvalidFileSpec {
                target: target.to_string(),
                message: format!(
                    "source patterns must be strings or lists of strings, found {}",
                    kind_of(other)
                ),
            });
        }
    }
    Ok(())
}

/// Human readable name of a JSON value's kind, for diagnostics.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
