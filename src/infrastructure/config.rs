use crate::domain::catalog::default_spots;
use crate::domain::models::{CarType, ParkingSpot};
use anyhow::{Context, Result, bail};
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_PAYMENT_DELAY_MS: u64 = 1500;
const DEFAULT_MAX_HOURS: u32 = 24;
/// Longest booking an operator may allow: thirty days.
const MAX_HOURS_LIMIT: u32 = 720;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingConfig {
    pub discounted_car_type: CarType,
    pub max_hours: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            discounted_car_type: CarType::Electric,
            max_hours: DEFAULT_MAX_HOURS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub payment_delay: Duration,
    pub pricing: PricingConfig,
    pub spots_file: Option<PathBuf>,
    pub cors_origin: Option<String>,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            storage: StorageBackend::Memory,
            payment_delay: Duration::from_millis(DEFAULT_PAYMENT_DELAY_MS),
            pricing: PricingConfig::default(),
            spots_file: None,
            cors_origin: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let storage = match lookup("PARKEASY_STORAGE").as_deref().map(str::trim) {
            None | Some("") | Some("memory") => StorageBackend::Memory,
            Some(path) => StorageBackend::File(PathBuf::from(path)),
        };

        let payment_delay_ms = parse_or(
            &lookup,
            "PARKEASY_PAYMENT_DELAY_MS",
            DEFAULT_PAYMENT_DELAY_MS,
        )?;

        let max_hours = parse_or(&lookup, "PARKEASY_MAX_HOURS", DEFAULT_MAX_HOURS)?;
        if max_hours == 0 || max_hours > MAX_HOURS_LIMIT {
            bail!("PARKEASY_MAX_HOURS must be between 1 and {MAX_HOURS_LIMIT}");
        }

        let discounted_car_type = match lookup("PARKEASY_DISCOUNTED_CAR_TYPE") {
            Some(raw) => raw
                .parse::<CarType>()
                .map_err(|e| anyhow::anyhow!("Invalid PARKEASY_DISCOUNTED_CAR_TYPE: {e}"))?,
            None => defaults.pricing.discounted_car_type,
        };

        let config = Self {
            host: lookup("PARKEASY_HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PARKEASY_PORT", DEFAULT_PORT)?,
            storage,
            payment_delay: Duration::from_millis(payment_delay_ms),
            pricing: PricingConfig {
                discounted_car_type,
                max_hours,
            },
            spots_file: lookup("PARKEASY_SPOTS_FILE").map(PathBuf::from),
            cors_origin: lookup("PARKEASY_CORS_ORIGIN").filter(|o| !o.trim().is_empty()),
            log_level: lookup("PARKEASY_LOG_LEVEL").unwrap_or(defaults.log_level),
        };
        debug!(?config, "Configuration resolved");
        Ok(config)
    }

    /// Spot catalog from `spots_file`, or the built-in lot.
    pub fn load_spots(&self) -> Result<Vec<ParkingSpot>> {
        let Some(path) = &self.spots_file else {
            return Ok(default_spots());
        };
        info!("Loading spot catalog from {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read spot catalog: {}", path.display()))?;
        let spots: Vec<ParkingSpot> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse spot catalog: {}", path.display()))?;
        Ok(spots)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {key} value {raw:?}: {e}")),
        None => Ok(default),
    }
}
