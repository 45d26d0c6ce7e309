//! Levels shipped with the game.

use anyhow::Context;
use level_schema::LevelDefinition;

const BUILTIN_LEVELS: [(&str, &str); 5] = [
    ("1", include_str!("levels/level_1.json")),
    ("2", include_str!("levels/level_2.json")),
    ("3", include_str!("levels/level_3.json")),
    ("4", include_str!("levels/level_4.json")),
    ("5", include_str!("levels/level_5.json")),
];

fn parse_builtin(id: &str, json: &str) -> anyhow::Result<LevelDefinition> {
    serde_json::from_str(json).with_context(|| format!("built-in level {id} is malformed"))
}

/// All built-in levels in play order.
pub fn list_levels() -> anyhow::Result<Vec<LevelDefinition>> {
    BUILTIN_LEVELS
        .iter()
        .map(|(id, json)| parse_builtin(id, json))
        .collect()
}

pub fn get_level(id: &str) -> anyhow::Result<Option<LevelDefinition>> {
    BUILTIN_LEVELS
        .iter()
        .find(|(level_id, _)| *level_id == id)
        .map(|(level_id, json)| parse_builtin(level_id, json))
        .transpose()
}

/// The level after `current_id`. An unknown id maps to the first level and
/// the last level maps to itself.
pub fn next_level(current_id: &str) -> anyhow::Result<LevelDefinition> {
    let index = match BUILTIN_LEVELS.iter().position(|(id, _)| *id == current_id) {
        Some(index) => (index + 1).min(BUILTIN_LEVELS.len() - 1),
        None => 0,
    };
    let (id, json) = BUILTIN_LEVELS[index];
    parse_builtin(id, json)
}
