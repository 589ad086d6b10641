use serde::{Deserialize, Serialize};

use crate::providers::RetryPolicy;
use crate::scoring::ScoringPolicy;
use crate::session::SessionOptions;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub scoring: ScoringPolicy,

    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default)]
    pub progress: ProgressConfig,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            session: SessionConfig::default(),
            scoring: ScoringPolicy::default(),
            retry: RetryPolicy::default(),
            progress: ProgressConfig::default(),
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.max_hearts == 0 {
            return Err(ConfigError::ValidationError(
                "session.max_hearts must be > 0".to_string(),
            ));
        }
        if self.session.starting_hearts > self.session.max_hearts {
            return Err(ConfigError::ValidationError(
                "session.starting_hearts must not exceed session.max_hearts".to_string(),
            ));
        }
        if self.session.timer_budget_secs == 0 {
            return Err(ConfigError::ValidationError(
                "session.timer_budget_secs must be > 0".to_string(),
            ));
        }
        if self.session.exercises_per_lesson == 0 {
            return Err(ConfigError::ValidationError(
                "session.exercises_per_lesson must be > 0".to_string(),
            ));
        }
        if self.scoring.speed_divisor == 0 {
            return Err(ConfigError::ValidationError(
                "scoring.speed_divisor must be > 0".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be > 0".to_string(),
            ));
        }
        if self.retry.base_backoff_ms > self.retry.max_backoff_ms {
            return Err(ConfigError::ValidationError(
                "retry.base_backoff_ms must not exceed retry.max_backoff_ms".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_hearts")]
    pub starting_hearts: u32,
    #[serde(default = "default_hearts")]
    pub max_hearts: u32,
    /// Countdown budget when timer mode is on.
    #[serde(default = "default_timer_budget_secs")]
    pub timer_budget_secs: u32,
    /// Exercises requested per generated lesson.
    #[serde(default = "default_exercises_per_lesson")]
    pub exercises_per_lesson: u32,
}

fn default_hearts() -> u32 {
    5
}
fn default_timer_budget_secs() -> u32 {
    120
}
fn default_exercises_per_lesson() -> u32 {
    5
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            starting_hearts: default_hearts(),
            max_hearts: default_hearts(),
            timer_budget_secs: default_timer_budget_secs(),
            exercises_per_lesson: default_exercises_per_lesson(),
        }
    }
}

impl SessionConfig {
    /// Session options for a learner who does or does not play against the clock.
    pub fn options(&self, timer_enabled: bool) -> SessionOptions {
        SessionOptions {
            starting_hearts: self.starting_hearts,
            timer_budget_secs: timer_enabled.then_some(self.timer_budget_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_daily_goal")]
    pub daily_goal: u32,
    #[serde(default = "default_streak_freeze_cost")]
    pub streak_freeze_cost: u32,
}

fn default_daily_goal() -> u32 {
    50
}
fn default_streak_freeze_cost() -> u32 {
    50
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            daily_goal: default_daily_goal(),
            streak_freeze_cost: default_streak_freeze_cost(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    ParseError(String),
    #[error("failed to serialize config: {0}")]
    SerializeError(String),
    #[error("config validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0.0");
        assert_eq!(config.session.starting_hearts, 5);
        assert_eq!(config.session.timer_budget_secs, 120);
        assert_eq!(config.scoring.base_xp, 5);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.progress.streak_freeze_cost, 50);
    }

    #[test]
    fn test_config_from_json_minimal() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_from_json_with_overrides() {
        let json = r#"{
            "session": { "timer_budget_secs": 90 },
            "scoring": { "xp_per_correct": 3 },
            "progress": { "daily_goal": 100 }
        }"#;
        let config = Config::from_json(json).unwrap();
        assert_eq!(config.session.timer_budget_secs, 90);
        assert_eq!(config.session.max_hearts, 5);
        assert_eq!(config.scoring.xp_per_correct, 3);
        assert_eq!(config.scoring.base_xp, 5);
        assert_eq!(config.progress.daily_goal, 100);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let parsed = Config::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_validate_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validate_hearts() {
        let mut config = Config::default();
        config.session.starting_hearts = 7;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("starting_hearts"));
    }

    #[test]
    fn test_config_validate_zero_divisor() {
        let mut config = Config::default();
        config.scoring.speed_divisor = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_session_options_follow_timer_flag() {
        let session = SessionConfig::default();
        assert_eq!(session.options(false).timer_budget_secs, None);
        assert_eq!(session.options(true).timer_budget_secs, Some(120));
    }

    #[test]
    fn test_config_parse_error() {
        assert!(matches!(
            Config::from_json("{ nope"),
            Err(ConfigError::ParseError(_))
        ));
    }
}
