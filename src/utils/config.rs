use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::models::bill::{
    PricingPolicy, RestaurantInfo, DEFAULT_SERVICE_CHARGE_RATE, DEFAULT_TAX_RATE,
};
use crate::services::checkout_service::{CheckoutSettings, DEFAULT_TABLE_COUNT};
use crate::storage::repositories::DEFAULT_CART_KEY;

#[derive(Debug, Clone)]
pub struct Config {
    pub storage_dir: PathBuf,
    pub storage_key: String,
    pub tax_rate: f64,
    pub service_charge_rate: f64,
    pub table_count: u32,
    pub payment_delay: Duration,
    pub restaurant: RestaurantInfo,
    pub log_level: String,
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(".restaurant-cart"),
            storage_key: DEFAULT_CART_KEY.to_string(),
            tax_rate: DEFAULT_TAX_RATE,
            service_charge_rate: DEFAULT_SERVICE_CHARGE_RATE,
            table_count: DEFAULT_TABLE_COUNT,
            payment_delay: Duration::from_millis(1500),
            restaurant: RestaurantInfo::default(),
            log_level: "info".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        let defaults = Config::default();

        let config = Config {
            storage_dir: env::var("CART_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            storage_key: env::var("CART_STORAGE_KEY").unwrap_or(defaults.storage_key),
            tax_rate: parse_var("TAX_RATE", defaults.tax_rate)?,
            service_charge_rate: parse_var("SERVICE_CHARGE_RATE", defaults.service_charge_rate)?,
            table_count: parse_var("TABLE_COUNT", defaults.table_count)?,
            payment_delay: Duration::from_millis(parse_var(
                "PAYMENT_DELAY_MS",
                defaults.payment_delay.as_millis() as u64,
            )?),
            restaurant: RestaurantInfo {
                name: env::var("RESTAURANT_NAME").unwrap_or(defaults.restaurant.name),
                address: env::var("RESTAURANT_ADDRESS").unwrap_or(defaults.restaurant.address),
                phone: env::var("RESTAURANT_PHONE").unwrap_or(defaults.restaurant.phone),
                gstin: env::var("RESTAURANT_GSTIN").ok().filter(|g| !g.trim().is_empty()),
            },
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            environment: env::var("APP_ENV").unwrap_or(defaults.environment),
        };

        config.validate()?;
        tracing::debug!("Config: successfully loaded for {} environment", config.environment);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.storage_key.trim().is_empty()
            || self
                .storage_key
                .contains(|c: char| c == '/' || c == '\\' || c == '.')
        {
            return Err(anyhow::anyhow!(
                "CART_STORAGE_KEY must be a non-empty name without path separators or dots"
            ));
        }

        for (name, rate) in [
            ("TAX_RATE", self.tax_rate),
            ("SERVICE_CHARGE_RATE", self.service_charge_rate),
        ] {
            if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
                return Err(anyhow::anyhow!("{} must be between 0 and 1, got {}", name, rate));
            }
        }

        if self.table_count == 0 {
            return Err(anyhow::anyhow!("TABLE_COUNT must be at least 1"));
        }

        if self.restaurant.name.trim().is_empty() {
            return Err(anyhow::anyhow!("RESTAURANT_NAME must not be empty"));
        }

        if self.is_production() && self.payment_delay.is_zero() {
            return Err(anyhow::anyhow!("PAYMENT_DELAY_MS must be non-zero in production"));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            pricing: PricingPolicy {
                tax_rate: self.tax_rate,
                service_charge_rate: self.service_charge_rate,
            },
            restaurant: self.restaurant.clone(),
            table_count: self.table_count,
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value '{}': {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}
