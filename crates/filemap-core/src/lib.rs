//! filemap Core Library
//!
//! This crate turns a task target's declarative file specification into a
//! canonical, ordered list of source/destination mappings:
//! - Shape classification of the supported specification forms
//! - Pattern flattening and glob resolution
//! - Expand mode destination derivation
//! - Project configuration loading
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Shape    │────▶│    Glob     │────▶│   Expand    │────▶│   Entries   │
//! │  classify   │     │  resolver   │     │   mapper    │     │ (dest, src) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use filemap_core::Normalizer;
//! use serde_json::json;
//!
//! let entries = Normalizer::new().normalize(
//!     &json!({"files": [{"expand": true, "cwd": "src", "src": ["*.js"], "dest": "dist/"}]}),
//!     "build",
//! )?;
//! for entry in &entries {
//!     println!("{} <- {:?}", entry.dest, entry.src);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod expand;
pub mod glob;
pub mod hooks;
pub mod normalize;
pub mod options;
pub mod patterns;
pub mod shape;

pub use config::{Config, ProjectConfig};
pub use error::{Error, HookError, Result};
pub use glob::{FsGlob, GlobEngine, MatchOptions};
pub use hooks::{FilterHook, RenameHook};
pub use normalize::{NormalizedEntry, Normalizer, normalize};
pub use shape::FileSpec;
