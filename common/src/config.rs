// Configuration management with layered configuration (file, env)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub agent: AgentSettings,
    pub repository: RepositorySettings,
    pub observability: ObservabilitySettings,
}

/// Settings for the schedule agent itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Name of the backing database the agent sweeps
    pub database: String,
    /// Path under which schedule items are discovered
    pub schedule_root: String,
    /// How often the host loop triggers a sweep (in seconds)
    pub poll_interval_seconds: u64,
    /// Emit info-level activity logs; errors are logged regardless
    #[serde(default = "default_log_activity")]
    pub log_activity: bool,
}

fn default_log_activity() -> bool {
    true
}

/// Settings for the backing item repositories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    /// Database name -> seed file path (JSON item tree)
    pub databases: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilitySettings {
    pub log_level: String,
}

impl Settings {
    /// Load configuration with layered precedence: defaults -> file -> env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment-specific configuration
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if self.agent.database.is_empty() {
            return Err("Agent database name cannot be empty".to_string());
        }
        if self.agent.schedule_root.is_empty() {
            return Err("Agent schedule_root cannot be empty".to_string());
        }
        if !self.agent.schedule_root.starts_with('/') {
            return Err("Agent schedule_root must be an absolute item path".to_string());
        }
        if self.agent.poll_interval_seconds == 0 {
            return Err("Agent poll_interval_seconds must be greater than 0".to_string());
        }
        if self.observability.log_level.is_empty() {
            return Err("Observability log_level cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            agent: AgentSettings {
                database: "master".to_string(),
                schedule_root: "/system/tasks/schedules".to_string(),
                poll_interval_seconds: 60,
                log_activity: true,
            },
            repository: RepositorySettings {
                databases: HashMap::from([(
                    "master".to_string(),
                    "config/schedules.json".to_string(),
                )]),
            },
            observability: ObservabilitySettings {
                log_level: "info".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_catches_empty_database() {
        let mut settings = Settings::default();
        settings.agent.database = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_relative_schedule_root() {
        let mut settings = Settings::default();
        settings.agent.schedule_root = "system/tasks".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_zero_poll_interval() {
        let mut settings = Settings::default();
        settings.agent.poll_interval_seconds = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_log_activity_defaults_on() {
        let json = serde_json::json!({
            "database": "master",
            "schedule_root": "/system/tasks/schedules",
            "poll_interval_seconds": 60
        });
        let agent: AgentSettings = serde_json::from_value(json).unwrap();
        assert!(agent.log_activity);
    }
}
