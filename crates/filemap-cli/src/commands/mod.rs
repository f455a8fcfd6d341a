//! CLI command implementations

pub mod normalize;
pub mod targets;
pub mod validate;
