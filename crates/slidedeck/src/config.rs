use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::deck::{AspectRatio, CONTROLS_HIDE_DELAY, DEFAULT_TRANSITION_DURATION, TransitionKind};

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "slidedeck";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<ControlsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precache: Option<PrecacheConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect: Option<String>,

    /// 1-based
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_slide: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_after_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrecacheConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<bool>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `slidedeck config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("using default config: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# slidedeck configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.theme" => {
                match value {
                    "light" | "dark" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'."),
                }
                self.defaults_mut().theme = Some(value.to_string());
            }
            "defaults.transition" => {
                if TransitionKind::parse_optional(value).is_err() {
                    anyhow::bail!(
                        "Invalid transition: {value}. Must be 'fade', 'slide', 'zoom', or 'none'."
                    );
                }
                self.defaults_mut().transition = Some(value.to_string());
            }
            "defaults.transition_ms" => {
                let ms = parse_positive(key, value)?;
                self.defaults_mut().transition_ms = Some(ms);
            }
            "defaults.aspect" => {
                match value {
                    "16:9" | "4:3" | "16:10" => {}
                    _ => anyhow::bail!(
                        "Invalid aspect ratio: {value}. Must be '16:9', '4:3', or '16:10'."
                    ),
                }
                self.defaults_mut().aspect = Some(value.to_string());
            }
            "defaults.start_slide" => {
                let slide = parse_positive(key, value)?;
                self.defaults_mut().start_slide = Some(slide as usize);
            }
            "controls.hide_after_ms" => {
                let ms = parse_positive(key, value)?;
                self.controls
                    .get_or_insert_with(ControlsConfig::default)
                    .hide_after_ms = Some(ms);
            }
            "precache.background" => {
                let background = value.parse::<bool>().map_err(|_| {
                    anyhow::anyhow!("Invalid precache.background: {value}. Must be 'true' or 'false'.")
                })?;
                self.precache
                    .get_or_insert_with(PrecacheConfig::default)
                    .background = Some(background);
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: defaults.theme, defaults.transition, \
                 defaults.transition_ms, defaults.aspect, defaults.start_slide, \
                 controls.hide_after_ms, precache.background"
            ),
        }
        Ok(())
    }

    fn defaults_mut(&mut self) -> &mut DefaultsConfig {
        self.defaults.get_or_insert_with(DefaultsConfig::default)
    }

    fn defaults(&self) -> Option<&DefaultsConfig> {
        self.defaults.as_ref()
    }

    pub fn default_theme(&self) -> Option<&str> {
        self.defaults().and_then(|d| d.theme.as_deref())
    }

    pub fn default_transition(&self) -> Option<&str> {
        self.defaults().and_then(|d| d.transition.as_deref())
    }

    pub fn transition_duration(&self) -> Duration {
        self.defaults()
            .and_then(|d| d.transition_ms)
            .map_or(DEFAULT_TRANSITION_DURATION, Duration::from_millis)
    }

    pub fn default_aspect(&self) -> Option<AspectRatio> {
        let aspect = self.defaults()?.aspect.as_deref()?;
        match aspect.parse() {
            Ok(aspect) => Some(aspect),
            Err(e) => {
                tracing::warn!("ignoring configured aspect: {e}");
                None
            }
        }
    }

    /// 0-based start index from `defaults.start_slide`.
    pub fn start_index(&self) -> Option<usize> {
        self.defaults()
            .and_then(|d| d.start_slide)
            .map(|n| n.saturating_sub(1))
    }

    pub fn controls_hide_delay(&self) -> Duration {
        self.controls
            .as_ref()
            .and_then(|c| c.hide_after_ms)
            .map_or(CONTROLS_HIDE_DELAY, Duration::from_millis)
    }

    pub fn background_precache(&self) -> bool {
        self.precache
            .as_ref()
            .and_then(|p| p.background)
            .unwrap_or(true)
    }
}

fn parse_positive(key: &str, value: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => anyhow::bail!("Invalid {key}: {value}. Must be a positive integer."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::default();
        assert_eq!(config.transition_duration(), DEFAULT_TRANSITION_DURATION);
        assert_eq!(config.controls_hide_delay(), Duration::from_secs(2));
        assert!(config.background_precache());
        assert!(config.start_index().is_none());
        assert!(config.default_aspect().is_none());
    }

    #[test]
    fn test_set_validates_values() {
        let mut config = Config::default();
        config.set("defaults.theme", "dark").unwrap();
        config.set("defaults.transition", "zoom").unwrap();
        config.set("defaults.transition", "none").unwrap();
        config.set("defaults.transition_ms", "450").unwrap();
        config.set("defaults.start_slide", "3").unwrap();
        config.set("controls.hide_after_ms", "500").unwrap();
        config.set("precache.background", "false").unwrap();

        assert!(config.set("defaults.theme", "neon").is_err());
        assert!(config.set("defaults.transition", "spin").is_err());
        assert!(config.set("defaults.transition_ms", "0").is_err());
        assert!(config.set("defaults.aspect", "21:9").is_err());
        assert!(config.set("precache.background", "maybe").is_err());
        assert!(config.set("no.such.key", "1").is_err());

        assert_eq!(config.default_theme(), Some("dark"));
        assert_eq!(config.default_transition(), Some("none"));
        assert_eq!(config.transition_duration(), Duration::from_millis(450));
        assert_eq!(config.start_index(), Some(2));
        assert_eq!(config.controls_hide_delay(), Duration::from_millis(500));
        assert!(!config.background_precache());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(FILENAME);

        let mut config = Config::default();
        config.set("defaults.aspect", "4:3").unwrap();
        config.set("controls.hide_after_ms", "1500").unwrap();
        config.save_to(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# slidedeck configuration"));

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.default_aspect().map(|a| a.to_string()), Some("4:3".to_string()));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join(FILENAME)).unwrap_err();
        assert!(err.to_string().contains("No config found"));
    }
}
