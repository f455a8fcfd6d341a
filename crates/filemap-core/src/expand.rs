//! Destination derivation for expand mode
//!
//! Every source matched under `cwd` gets its own destination:
//!
//! ```text
//! dest: dist/   cwd: src   match: lib/a.js
//!   relative        lib/a.js
//!   flatten         a.js
//!   ext: .min.js    a.min.js
//!   rename          rename("dist/", "a.min.js")   or   "dist/" + "a.min.js"
//! ```

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use crate::error::Result;
use crate::hooks::Renamer;
use crate::options::{ExtDot, MappingOptions};

static EXT_FIRST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\.[^/]*)?$").expect("valid extension regex"));

static EXT_LAST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\.[^/.]*)?$").expect("valid extension regex"));

/// Settings that shape derived destinations
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandOptions<'a> {
    /// Keep only the final path segment
    pub flatten: bool,
    /// Replacement extension
    pub ext: Option<&'a str>,
    /// Where the replaced extension starts
    pub ext_dot: ExtDot,
    /// Strategy receiving `(dest_base, dest_path)`
    pub rename: Option<&'a Renamer>,
}

impl<'a> From<&'a MappingOptions> for ExpandOptions<'a> {
    fn from(options: &'a MappingOptions) -> Self {
        Self {
            flatten: options.flatten,
            ext: options.ext.as_deref(),
            ext_dot: options.ext_dot,
            rename: options.rename.as_ref(),
        }
    }
}

/// Treat `dest` as a directory base: non-empty bases end with `/`.
pub fn dest_base(dest: &str) -> String {
    let dest = dest.replace('\\', "/");
    if dest.is_empty() || dest.ends_with('/') {
        dest
    } else {
        format!("{dest}/")
    }
}

/// Compute the destination for one cwd-relative match.
///
/// `dest_base` should come from [`dest_base`]. Rename errors are returned
/// untouched inside [`crate::Error::Rename`].
pub fn destination(
    dest_base: &str,
    relative: &str,
    options: &ExpandOptions<'_>,
    target: &str,
) -> Result<String> {
    let mut dest_path = if options.flatten {
        basename(relative).to_string()
    } else {
        relative.to_string()
    };

    if let Some(ext) = options.ext {
        let pattern = match options.ext_dot {
            ExtDot::First => &*EXT_FIRST,
            ExtDot::Last => &*EXT_LAST,
        };
        dest_path = pattern.replace(&dest_path, NoExpand(ext)).into_owned();
    }

    let dest = match options.rename {
        Some(renamer) => renamer.apply(dest_base, &dest_path, target)?,
        None => format!("{dest_base}{dest_path}"),
    };
    Ok(dest.replace('\\', "/"))
}

/// Source path reported on an expanded entry: the match joined with `cwd`.
pub fn source_path(cwd: Option<&str>, relative: &str) -> String {
    match cwd.map(|c| c.trim_start_matches("./").trim_end_matches('/')) {
        None | Some("") | Some(".") => relative.to_string(),
        Some(cwd) => format!("{cwd}/{relative}"),
    }
}

fn basename(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
}
