use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::{HorizonParams, PlanSettings};

#[derive(Debug, Clone)]
pub struct Config {
    pub horizon: HorizonParams,
    pub plan: PlanSettings,
    pub output_format: OutputFormat,
    /// Trade ids that already exist and must not be reissued.
    pub seed_ids: Vec<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let horizon_count: usize = parse_or(&env_map, "HORIZON_COUNT", "1", "a positive integer")?;
        if horizon_count == 0 {
            return Err(ConfigError::InvalidValue(
                "HORIZON_COUNT".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let horizon = HorizonParams {
            fee_hedging_coefficient: parse_or(
                &env_map,
                "FEE_HEDGING_COEFFICIENT",
                "1",
                "a number",
            )?,
            portfolio_pump: parse_or(&env_map, "PORTFOLIO_PUMP", "0", "a number")?,
            symbol_count: parse_or(&env_map, "SYMBOL_COUNT", "1", "a non-negative integer")?,
            coefficient_k: parse_or(&env_map, "COEFFICIENT_K", "0", "a number")?,
            fee_spread: parse_or(&env_map, "FEE_SPREAD", "0", "a number")?,
            delta_time: parse_or(&env_map, "DELTA_TIME", "1", "a number")?,
            surplus_rate: parse_or(&env_map, "SURPLUS_RATE", "0", "a number")?,
            horizon_count,
            generate_stop_losses: parse_bool(&env_map, "GENERATE_STOP_LOSSES")?,
            allow_short_trades: parse_bool(&env_map, "ALLOW_SHORT_TRADES")?,
            max_risk: parse_or(&env_map, "MAX_RISK", "0", "a number")?,
            min_risk: parse_or(&env_map, "MIN_RISK", "0", "a number")?,
            future_trade_count: parse_or(
                &env_map,
                "FUTURE_TRADE_COUNT",
                "0",
                "a non-negative integer",
            )?,
            stop_loss_fraction: parse_or(&env_map, "STOP_LOSS_FRACTION", "1", "a number")?,
            stop_loss_hedge_count: parse_or(
                &env_map,
                "STOP_LOSS_HEDGE_COUNT",
                "0",
                "a non-negative integer",
            )?,
        };

        let plan = PlanSettings {
            risk_coefficient: parse_or(&env_map, "RISK_COEFFICIENT", "0", "a number")?,
            exit_fraction: parse_or(&env_map, "EXIT_FRACTION", "1", "a number")?,
            entry_steepness: parse_or(&env_map, "ENTRY_STEEPNESS", "6", "a number")?,
            exit_steepness: parse_or(&env_map, "EXIT_STEEPNESS", "4", "a number")?,
            range_above: parse_or(&env_map, "RANGE_ABOVE", "0", "a number")?,
            range_below: parse_or(&env_map, "RANGE_BELOW", "0", "a number")?,
            downtrend_count: parse_or(&env_map, "DOWNTREND_COUNT", "0", "a non-negative integer")?,
            available_capital: parse_or(&env_map, "AVAILABLE_CAPITAL", "0", "a number")?,
        };

        let output_format = match env_map
            .get("OUTPUT_FORMAT")
            .map(|s| s.as_str())
            .unwrap_or("json")
        {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            other => {
                return Err(ConfigError::InvalidValue(
                    "OUTPUT_FORMAT".to_string(),
                    format!("must be json or csv, got {}", other),
                ))
            }
        };

        let seed_ids = parse_seed_ids_from_map(&env_map)?;

        Ok(Config {
            horizon,
            plan,
            output_format,
            seed_ids,
        })
    }
}

fn parse_or<T: FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: &str,
    expected: &str,
) -> Result<T, ConfigError> {
    env_map
        .get(key)
        .map(|s| s.trim())
        .unwrap_or(default)
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(key.to_string(), format!("must be {}", expected)))
}

fn parse_bool(env_map: &HashMap<String, String>, key: &str) -> Result<bool, ConfigError> {
    match env_map
        .get(key)
        .map(|s| s.trim().to_ascii_lowercase())
        .as_deref()
    {
        None | Some("") | Some("0") | Some("false") => Ok(false),
        Some("1") | Some("true") => Ok(true),
        Some(other) => Err(ConfigError::InvalidValue(
            key.to_string(),
            format!("must be true or false, got {}", other),
        )),
    }
}

fn parse_seed_ids_from_map(env_map: &HashMap<String, String>) -> Result<Vec<u64>, ConfigError> {
    let (key, content) = if let Some(ids) = env_map.get("SEED_IDS") {
        ("SEED_IDS", ids.replace(',', "\n"))
    } else if let Some(file_path) = env_map.get("SEED_IDS_FILE") {
        let content = std::fs::read_to_string(file_path).map_err(|_| {
            ConfigError::InvalidValue(
                "SEED_IDS_FILE".to_string(),
                "file not found or unreadable".to_string(),
            )
        })?;
        ("SEED_IDS_FILE", content)
    } else {
        return Ok(Vec::new());
    };

    content
        .lines()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), format!("invalid id {}", s))
            })
        })
        .collect()
}
