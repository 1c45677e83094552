use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

/// Root configuration structure, deserialized from `.allergen-mappr/config.toml`.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Collection policy for `--fetch` runs.
    pub collection: CollectionConfig,
}

/// Controls how many records are fetched and what counts as usable.
#[derive(Debug, Deserialize)]
pub struct CollectionConfig {
    /// Target number of records carrying at least one allergen declaration.
    #[serde(default = "default_with_allergens")]
    pub with_allergens: usize,
    /// Target number of strictly allergen-free records.
    #[serde(default = "default_without_allergens")]
    pub without_allergens: usize,
    /// Records requested per API page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Minimum ingredient-text length for a record to be kept.
    #[serde(default = "default_min_ingredient_chars")]
    pub min_ingredient_chars: usize,
    /// Seconds to wait between page requests (the API is rate limited).
    #[serde(default = "default_request_delay_secs")]
    pub request_delay_secs: u64,
    /// Per-allergen-tag targets for the with-allergens set, keyed by Open
    /// Food Facts tag (e.g. `"en:milk"`). Ordered map so collection order is
    /// stable run to run.
    #[serde(default)]
    pub targets: BTreeMap<String, usize>,
}

fn default_with_allergens() -> usize {
    150
}

fn default_without_allergens() -> usize {
    50
}

fn default_page_size() -> usize {
    50
}

fn default_min_ingredient_chars() -> usize {
    10
}

fn default_request_delay_secs() -> u64 {
    2
}

impl Default for Config {
    /// Built-in collection policy used when no config file is found.
    ///
    /// Per-tag targets spread the with-allergens set across allergen types
    /// instead of letting the most common declarations dominate. Gluten is
    /// kept low since it co-occurs with most other declarations anyway.
    fn default() -> Self {
        let mut targets = BTreeMap::new();
        targets.insert("en:milk".to_string(), 20);
        targets.insert("en:eggs".to_string(), 18);
        targets.insert("en:peanuts".to_string(), 15);
        targets.insert("en:nuts".to_string(), 12);
        targets.insert("en:fish".to_string(), 12);
        targets.insert("en:crustaceans".to_string(), 10);
        targets.insert("en:soybeans".to_string(), 15);
        targets.insert("en:sesame-seeds".to_string(), 12);
        targets.insert("en:mustard".to_string(), 8);
        targets.insert("en:celery".to_string(), 8);
        targets.insert("en:lupin".to_string(), 5);
        targets.insert("en:molluscs".to_string(), 5);
        targets.insert("en:gluten".to_string(), 10);

        Config {
            collection: CollectionConfig {
                with_allergens: default_with_allergens(),
                without_allergens: default_without_allergens(),
                page_size: default_page_size(),
                min_ingredient_chars: default_min_ingredient_chars(),
                request_delay_secs: default_request_delay_secs(),
                targets,
            },
        }
    }
}

/// Load the collection configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<working_dir>/.allergen-mappr/config.toml`
/// 3. `~/.config/allergen-mappr/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(working_dir: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        let content = std::fs::read_to_string(path)?;
        return Ok(toml::from_str(&content)?);
    }

    let local_config = working_dir.join(".allergen-mappr").join("config.toml");
    if local_config.exists() {
        let content = std::fs::read_to_string(&local_config)?;
        return Ok(toml::from_str(&content)?);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("allergen-mappr")
            .join("config.toml");
        if home_config.exists() {
            let content = std::fs::read_to_string(&home_config)?;
            return Ok(toml::from_str(&content)?);
        }
    }

    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_targets_sum_to_with_allergens() {
        let cfg = Config::default();
        let total: usize = cfg.collection.targets.values().sum();
        assert_eq!(total, cfg.collection.with_allergens);
    }

    #[test]
    fn test_parse_partial_toml_uses_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [collection]
            with_allergens = 30
            "#,
        )
        .unwrap();

        assert_eq!(cfg.collection.with_allergens, 30);
        assert_eq!(cfg.collection.without_allergens, 50);
        assert_eq!(cfg.collection.page_size, 50);
        assert!(cfg.collection.targets.is_empty());
    }

    #[test]
    fn test_parse_targets_table() {
        let cfg: Config = toml::from_str(
            r#"
            [collection]

            [collection.targets]
            "en:milk" = 5
            "en:fish" = 3
            "#,
        )
        .unwrap();

        assert_eq!(cfg.collection.targets.get("en:milk"), Some(&5));
        assert_eq!(cfg.collection.targets.get("en:fish"), Some(&3));
    }
}
