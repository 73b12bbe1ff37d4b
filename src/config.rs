use crate::decklist::{DeckRules, TagRules};
use crate::simulation::SimulationConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Pipeline settings. Every field has a default, so a config file only
/// needs the values it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    /// Overrides `<data_dir>/carddata/carddata.txt`
    pub card_data: Option<PathBuf>,
    /// Overrides `<data_dir>/decklists`
    pub decklists_dir: Option<PathBuf>,
    pub min_main_deck: u32,
    pub max_reserve: u32,
    pub tags: TagRules,
    pub simulation: SimulationConfig,
}

impl Default for Config {
    fn default() -> Self {
        let rules = DeckRules::default();
        Config {
            data_dir: PathBuf::from("data"),
            card_data: None,
            decklists_dir: None,
            min_main_deck: rules.min_main,
            max_reserve: rules.max_reserve,
            tags: TagRules::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&content)?;
        log::debug!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load `path` if given, else use the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Config::default()),
        }
    }

    pub fn card_data_path(&self) -> PathBuf {
        self.card_data
            .clone()
            .unwrap_or_else(|| self.data_dir.join("carddata").join("carddata.txt"))
    }

    pub fn decklists_dir(&self) -> PathBuf {
        self.decklists_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("decklists"))
    }

    pub fn tables_dir(&self) -> PathBuf {
        self.data_dir.join("tables")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.data_dir.join("output")
    }

    pub fn deck_rules(&self) -> DeckRules {
        DeckRules {
            min_main: self.min_main_deck,
            max_reserve: self.max_reserve,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::CyclerLogic;

    #[test]
    fn test_default_paths() {
        let config = Config::default();
        assert_eq!(config.card_data_path(), PathBuf::from("data/carddata/carddata.txt"));
        assert_eq!(config.decklists_dir(), PathBuf::from("data/decklists"));
        assert_eq!(config.tables_dir(), PathBuf::from("data/tables"));
        assert_eq!(config.output_dir(), PathBuf::from("data/output"));
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{
            "data_dir": "fixtures",
            "decklists_dir": "fixtures/decklists",
            "simulation": { "cycler_logic": "keep", "n_simulations": 500 },
            "tags": { "emperors": ["Nero"] }
        }"#;
        let config: Config = serde_json::from_str(json).expect("config should parse");
        assert_eq!(config.decklists_dir(), PathBuf::from("fixtures/decklists"));
        assert_eq!(config.card_data_path(), PathBuf::from("fixtures/carddata/carddata.txt"));
        assert_eq!(config.simulation.cycler_logic, CyclerLogic::Keep);
        assert_eq!(config.simulation.n_simulations, 500);
        assert_eq!(config.simulation.hand_size, 8);
        assert_eq!(config.tags.emperors, vec!["Nero".to_string()]);
        assert_eq!(config.tags.matthew_prefixes, vec!["Matthew".to_string()]);
        assert_eq!(config.deck_rules().min_main, 50);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Config::load("does/not/exist.json"),
            Err(ConfigError::IoError(_))
        ));
    }
}
