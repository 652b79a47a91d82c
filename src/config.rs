use crate::capture;
use crate::error::{Result, TnfScanError};
use crate::handoff;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub xml_filename: String,
    pub capture_dir_name: String,
    pub mark_shot_enabled: bool,
    pub automation_stage_timeout_seconds: u64,
    pub automation_render_wait_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| TnfScanError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("tnf-scan").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            xml_filename: handoff::DEFAULT_XML_FILENAME.into(),
            capture_dir_name: capture::DEFAULT_CAPTURE_DIR.into(),
            mark_shot_enabled: true,
            automation_stage_timeout_seconds: 30,
            automation_render_wait_seconds: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();
        assert_eq!(config.xml_filename, "next_capture_folder.xml");
        assert_eq!(config.capture_dir_name, "Capture");
        assert!(config.mark_shot_enabled);
        assert_eq!(config.automation_stage_timeout_seconds, 30);
        assert_eq!(config.automation_render_wait_seconds, 5);
    }

    #[test]
    fn test_config_roundtrip_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.xml_filename, config.xml_filename);
        assert_eq!(restored.capture_dir_name, config.capture_dir_name);
    }
}
