use std::{fs, path::Path};

use anyhow::Context;
use level_schema::LevelDefinition;

pub mod catalog;

pub use catalog::{get_level, list_levels, next_level};

pub fn load_level_json_from_path(path: impl AsRef<Path>) -> anyhow::Result<LevelDefinition> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("failed to read level: {}", path.display()))?;
    let level: LevelDefinition = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse level json: {}", path.display()))?;
    Ok(level)
}

pub fn load_level_json_from_str(json: &str) -> anyhow::Result<LevelDefinition> {
    let level: LevelDefinition = serde_json::from_str(json).context("failed to parse level json")?;
    Ok(level)
}
