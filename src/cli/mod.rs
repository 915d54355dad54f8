//! healthcheck Command Line Interface.
//!
//! Shared pieces of the `healthcheck` binary: persistent preferences,
//! output rendering and input loading.

pub mod config;
pub mod output;

pub use config::*;
pub use output::*;

use serde_json::Value;
use std::path::Path;

use crate::config::ThresholdDefaults;
use crate::error::{Error, Result};
use crate::facts::RawFacts;
use crate::view::Target;

/// Read a JSON document from a file, or stdin when the path is `-`
pub fn read_json(path: &Path) -> Result<Value> {
    let content = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin())?
    } else {
        std::fs::read_to_string(path).map_err(|e| Error::Io(format!("{}: {}", path.display(), e)))?
    };
    Ok(serde_json::from_str(&content)?)
}

/// Load device facts
pub fn load_facts(path: &Path) -> Result<RawFacts> {
    RawFacts::from_value(read_json(path)?)
}

/// Load a target (check list or wrapper)
pub fn load_target(path: &Path) -> Result<Target> {
    Target::from_value(read_json(path)?)
}

/// Resolve the default-threshold store.
///
/// A file replaces the built-in table; `HEALTHCHECK_*` variables are
/// applied on top either way.
pub fn load_defaults(path: Option<&Path>) -> Result<ThresholdDefaults> {
    let defaults = match path {
        Some(path) => ThresholdDefaults::load(path)?.with_env_overrides()?,
        None => ThresholdDefaults::from_env()?,
    };
    defaults.validate()?;
    Ok(defaults)
}
