use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be positive")]
    NotPositive { field: &'static str },
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageKeys {
    pub color: String,
    pub stroke_width: String,
    pub snapshot: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            color: "drawarea.color".to_string(),
            stroke_width: "drawarea.lineWidth".to_string(),
            snapshot: "drawarea.canvas".to_string(),
        }
    }
}

/// Session defaults. Every field may be overridden from a partial JSON object.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub default_color: String,
    pub default_stroke_width: u32,
    pub font: String,
    pub erase_size: u32,
    pub save_interval_ms: u32,
    pub keys: StorageKeys,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_color: "Ivory".to_string(),
            default_stroke_width: 3,
            font: "30px Arial".to_string(),
            erase_size: 80,
            save_interval_ms: 1000,
            keys: StorageKeys::default(),
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_stroke_width == 0 {
            return Err(ConfigError::NotPositive {
                field: "defaultStrokeWidth",
            });
        }
        if self.erase_size == 0 {
            return Err(ConfigError::NotPositive { field: "eraseSize" });
        }
        if self.save_interval_ms == 0 {
            return Err(ConfigError::NotPositive {
                field: "saveIntervalMs",
            });
        }
        Ok(())
    }
}
