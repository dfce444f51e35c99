//! Configuration management for the KnightCycle rewards engine
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides such as `KC__POLICY__PREMIUM_BONUS_POINTS`

use config::{Environment, File, FileFormat};
use serde::Deserialize;
use shared::{validate_point_rate, validate_reward_policy, RateTable, RewardPolicy};

use crate::error::{EngineError, EngineResult};

/// Main engine configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Premium thresholds and bonus
    pub policy: RewardPolicy,

    /// Points per kg by material kind
    #[serde(default = "RateTable::standard")]
    pub rates: RateTable,

    /// Collection scheduling configuration
    pub schedule: ScheduleConfig,

    /// Log output configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleConfig {
    /// Working days before a collection to send the WTN reminder
    pub wtn_reminder_lead_days: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,

    /// Default filter when RUST_LOG is unset
    pub filter: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> EngineResult<Self> {
        let environment = std::env::var("KC_ENVIRONMENT").unwrap_or_else(|_| "development".into());
        Self::build(&environment, None)
    }

    /// Build configuration with an optional inline TOML layer applied after
    /// the config file and before environment variables
    pub fn build(environment: &str, overrides: Option<&str>) -> EngineResult<Self> {
        let mut builder = config::Config::builder()
            // Start with default values
            .set_default("environment", environment)?
            .set_default("policy.premium_parcel_threshold", 10)?
            .set_default("policy.premium_weight_threshold_kg", "25")?
            .set_default("policy.premium_bonus_points", 500)?
            .set_default("policy.reject_unknown_materials", false)?
            .set_default("schedule.wtn_reminder_lead_days", 3)?
            .set_default("logging.json", false)?
            .set_default("logging.filter", "kc_engine=info,engine=info")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false));

        if let Some(toml) = overrides {
            builder = builder.add_source(File::from_str(toml, FileFormat::Toml));
        }

        let config: Config = builder
            // Override with environment variables (KC__SECTION__KEY)
            .add_source(
                Environment::with_prefix("KC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject policies and rates the calculator would misapply
    pub fn validate(&self) -> EngineResult<()> {
        validate_reward_policy(&self.policy)
            .map_err(|msg| EngineError::validation("policy", msg))?;

        for (kind, rate) in self.rates.iter() {
            validate_point_rate(rate)
                .map_err(|msg| EngineError::validation(format!("rates.{}", kind), msg))?;
        }

        if self.rates.is_empty() {
            return Err(EngineError::validation("rates", "At least one material rate is required"));
        }

        Ok(())
    }
}
