//! Configuration management for the Nexuz game core
//!
//! TOML file, `NEXUZ_*` environment overrides, validation and defaults.

use crate::errors::{ConfigurationError, NexuzResult};
use crate::games::settlement::CreditFailurePolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NexuzConfig {
    pub games: GamesConfig,
    pub settlement: SettlementConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamesConfig {
    /// Smallest bet accepted by any game
    pub min_bet: u64,
    pub wheel: WheelConfig,
    pub dice: RevealConfig,
    pub slots: RevealConfig,
    pub crash: CrashConfig,
}

impl Default for GamesConfig {
    fn default() -> Self {
        Self {
            min_bet: 1,
            wheel: WheelConfig::default(),
            dice: RevealConfig { reveal_ms: 1_000 },
            slots: RevealConfig { reveal_ms: 2_000 },
            crash: CrashConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    /// Fixed price of one spin
    pub spin_cost: u64,
    pub reveal_ms: u64,
    /// Whole turns the wheel makes before settling
    pub full_turns: u32,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            spin_cost: 100,
            reveal_ms: 5_000,
            full_turns: 5,
        }
    }
}

/// Cosmetic delay between the draw and the reveal
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub reveal_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self { reveal_ms: 1_000 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrashConfig {
    pub tick_interval_ms: u64,
    /// Simulated seconds for the multiplier to gain 1.00
    pub seconds_per_unit: f64,
}

impl Default for CrashConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            seconds_per_unit: 3.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    pub credit_failure_policy: CreditFailurePolicy,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration loader with environment variable support
#[derive(Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> NexuzResult<NexuzConfig> {
        let mut config = match self.config_path {
            Some(ref path) => self.load_from_file(path)?,
            None => NexuzConfig::default(),
        };

        self.apply_env_overrides(&mut config)?;
        self.validate(&config)?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> NexuzResult<NexuzConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    fn apply_env_overrides(&self, config: &mut NexuzConfig) -> NexuzResult<()> {
        if let Ok(level) = env::var("NEXUZ_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(value) = env::var("NEXUZ_MIN_BET") {
            config.games.min_bet = parse_env("NEXUZ_MIN_BET", value, "Invalid bet amount")?;
        }
        if let Ok(value) = env::var("NEXUZ_WHEEL_SPIN_COST") {
            config.games.wheel.spin_cost =
                parse_env("NEXUZ_WHEEL_SPIN_COST", value, "Invalid spin cost")?;
        }
        if let Ok(value) = env::var("NEXUZ_CRASH_TICK_MS") {
            config.games.crash.tick_interval_ms =
                parse_env("NEXUZ_CRASH_TICK_MS", value, "Invalid tick interval")?;
        }
        if let Ok(value) = env::var("NEXUZ_CREDIT_RETRIES") {
            let max_attempts: u32 = parse_env("NEXUZ_CREDIT_RETRIES", value, "Invalid attempt count")?;
            config.settlement.credit_failure_policy = if max_attempts == 0 {
                CreditFailurePolicy::Surface
            } else {
                CreditFailurePolicy::RetryBeforeNextRound {
                    max_attempts,
                    backoff_ms: 250,
                }
            };
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self, config: &NexuzConfig) -> NexuzResult<()> {
        let games = &config.games;

        if games.min_bet == 0 {
            return Err(invalid("games.min_bet", "0", "Minimum bet must be positive"));
        }

        if games.wheel.spin_cost < games.min_bet {
            return Err(invalid(
                "games.wheel.spin_cost",
                &games.wheel.spin_cost.to_string(),
                "Spin cost cannot be below the minimum bet",
            ));
        }

        if games.crash.tick_interval_ms == 0 {
            return Err(invalid(
                "games.crash.tick_interval_ms",
                "0",
                "Tick interval cannot be zero",
            ));
        }

        let rate = games.crash.seconds_per_unit;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(invalid(
                "games.crash.seconds_per_unit",
                &rate.to_string(),
                "Rate must be a positive number of seconds",
            ));
        }

        if let CreditFailurePolicy::RetryBeforeNextRound { max_attempts: 0, .. } =
            config.settlement.credit_failure_policy
        {
            return Err(invalid(
                "settlement.credit_failure_policy.max_attempts",
                "0",
                "At least one attempt is required",
            ));
        }

        if config.logging.level.trim().is_empty() {
            return Err(ConfigurationError::MissingRequired("logging.level".to_string()).into());
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, config: &NexuzConfig, path: &str) -> NexuzResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into())
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> crate::errors::NexuzError {
    ConfigurationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

fn parse_env<T: std::str::FromStr>(field: &str, value: String, reason: &str) -> NexuzResult<T> {
    value.trim().parse().map_err(|_| {
        ConfigurationError::InvalidValue {
            field: field.to_string(),
            value,
            reason: reason.to_string(),
        }
        .into()
    })
}

/// Builder pattern for creating configurations
pub struct ConfigBuilder {
    config: NexuzConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: NexuzConfig::default(),
        }
    }

    pub fn games(mut self, games: GamesConfig) -> Self {
        self.config.games = games;
        self
    }

    pub fn credit_failure_policy(mut self, policy: CreditFailurePolicy) -> Self {
        self.config.settlement.credit_failure_policy = policy;
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    /// Zero every reveal delay; handy for tests and batch play
    pub fn instant_reveals(mut self) -> Self {
        self.config.games.wheel.reveal_ms = 0;
        self.config.games.dice.reveal_ms = 0;
        self.config.games.slots.reveal_ms = 0;
        self
    }

    pub fn build(self) -> NexuzConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config(path: &str) -> NexuzResult<()> {
    ConfigLoader::new().save(&NexuzConfig::default(), path)
}
