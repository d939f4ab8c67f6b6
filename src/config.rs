//! Configuration management module
//!
//! YAML file (explicit path, else `<config dir>/selfheal/config.yaml`),
//! then `SELFHEAL_*` environment overrides, then validation.

use std::path::{Path, PathBuf};

use action_locator::ResolverConfig;
use element_repository::RepositoryPolicy;
use serde::{Deserialize, Serialize};

use crate::errors::SelfHealError;

pub const ENV_MAX_AGE_MS: &str = "SELFHEAL_MAX_AGE_MS";
pub const ENV_VISUAL_THRESHOLD: &str = "SELFHEAL_VISUAL_THRESHOLD";
pub const ENV_SIZE_TOLERANCE: &str = "SELFHEAL_SIZE_TOLERANCE";
pub const ENV_ENABLE_VISION: &str = "SELFHEAL_ENABLE_VISION";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub repository: RepositoryPolicy,
    pub resolver: ResolverConfig,
    pub log_level: String,
    /// Attach the template-matching vision backend to the visual strategy
    pub enable_vision: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repository: RepositoryPolicy::default(),
            resolver: ResolverConfig::default(),
            log_level: "info".to_string(),
            enable_vision: false,
        }
    }
}

impl Config {
    /// `<config dir>/selfheal/config.yaml`, when the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("selfheal");
        path.push("config.yaml");
        Some(path)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, SelfHealError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, SelfHealError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    pub fn to_yaml(&self) -> Result<String, SelfHealError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Apply `SELFHEAL_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<(), SelfHealError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), SelfHealError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_MAX_AGE_MS) {
            self.repository.max_age_ms = parse_override(ENV_MAX_AGE_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_VISUAL_THRESHOLD) {
            self.resolver.visual_threshold = parse_override(ENV_VISUAL_THRESHOLD, &value)?;
        }
        if let Some(value) = lookup(ENV_SIZE_TOLERANCE) {
            self.resolver.size_tolerance = parse_override(ENV_SIZE_TOLERANCE, &value)?;
        }
        if let Some(value) = lookup(ENV_ENABLE_VISION) {
            self.enable_vision = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(SelfHealError::InvalidOverride {
                        key: ENV_ENABLE_VISION.to_string(),
                        value,
                    })
                }
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SelfHealError> {
        self.resolver
            .validate()
            .map_err(SelfHealError::InvalidConfig)?;
        if self.repository.max_age_ms == 0 {
            return Err(SelfHealError::InvalidConfig(
                "repository.max_age_ms must be > 0".to_string(),
            ));
        }
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(SelfHealError::InvalidConfig(format!(
                "unknown log_level '{}'",
                self.log_level
            )));
        }
        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, SelfHealError> {
    value
        .trim()
        .parse()
        .map_err(|_| SelfHealError::InvalidOverride {
            key: key.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "enable_vision: true\nresolver:\n  visual_threshold: 0.9\nrepository:\n  max_age_ms: 60000"
        )
        .unwrap();

        let config = Config::load_from_path(file.path()).unwrap();
        assert!(config.enable_vision);
        assert_eq!(config.resolver.visual_threshold, 0.9);
        assert_eq!(config.resolver.size_tolerance, 0.2);
        assert_eq!(config.repository.max_age_ms, 60_000);
        assert_eq!(config.repository.max_text_len, 100);
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> = [
            (ENV_MAX_AGE_MS, "1000"),
            (ENV_VISUAL_THRESHOLD, "0.95"),
            (ENV_ENABLE_VISION, "yes"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides_from(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.repository.max_age_ms, 1000);
        assert_eq!(config.resolver.visual_threshold, 0.95);
        assert_eq!(config.resolver.size_tolerance, 0.2);
        assert!(config.enable_vision);
    }

    #[test]
    fn bad_override_is_reported() {
        let mut config = Config::default();
        let err = config
            .apply_overrides_from(|key| (key == ENV_SIZE_TOLERANCE).then(|| "wide".to_string()))
            .unwrap_err();
        assert!(matches!(err, SelfHealError::InvalidOverride { .. }));
    }

    #[test]
    fn validation_rejects_out_of_range() {
        let mut config = Config::default();
        config.resolver.visual_threshold = 1.2;
        assert!(matches!(
            config.validate(),
            Err(SelfHealError::InvalidConfig(_))
        ));

        let mut config = Config::default();
        config.log_level = "loud".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn yaml_round_trip_is_stable() {
        let config = Config::default();
        let yaml = config.to_yaml().unwrap();
        assert_eq!(Config::from_yaml(&yaml).unwrap(), config);
    }
}
