//! Ability roster loading

use super::ConfigError;
use crate::ability::{AbilityBehavior, AbilityDef};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Container for ability definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilitiesConfig {
    #[serde(rename = "abilities")]
    pub abilities: Vec<AbilityDef>,
}

/// Load ability definitions from a TOML file
pub fn load_ability_configs(path: &Path) -> Result<HashMap<String, AbilityDef>, ConfigError> {
    let config: AbilitiesConfig = super::load_toml(path)?;
    into_map(config)
}

/// Load ability definitions from a TOML string
pub fn parse_ability_configs(content: &str) -> Result<HashMap<String, AbilityDef>, ConfigError> {
    let config: AbilitiesConfig = super::parse_toml(content)?;
    into_map(config)
}

fn into_map(config: AbilitiesConfig) -> Result<HashMap<String, AbilityDef>, ConfigError> {
    let mut map = HashMap::new();
    for ability in config.abilities {
        let id = ability.id.clone();
        if map.insert(id.clone(), ability).is_some() {
            return Err(ConfigError::ValidationError(format!(
                "duplicate ability id '{id}'"
            )));
        }
    }
    Ok(map)
}

/// Get the default ability roster
pub fn default_abilities() -> HashMap<String, AbilityDef> {
    let toml = include_str!("../../config/abilities.toml");
    parse_ability_configs(toml).unwrap_or_else(|_| {
        let mut map = HashMap::new();
        map.insert(
            "swift_strike".to_string(),
            AbilityDef {
                id: "swift_strike".to_string(),
                name: "Swift Strike".to_string(),
                cooldown_ticks: 60,
                crit_chance: 5.0,
                behavior: AbilityBehavior::Strike {
                    base_damage: 10.0,
                    range: 20.0,
                },
            },
        );
        map
    })
}
