use std::path::PathBuf;

use engine::{
    DEFAULT_FUEL_CONSUMPTION_L_PER_100KM, DEFAULT_FUEL_PRICE_PER_LITER,
    DEFAULT_SERVICE_COST_PER_KM, DEFAULT_TAX_RESIDENCY, DEFAULT_TOLL_COST_PER_KM,
};
use serde::Deserialize;

use crate::{cli::Cli, error::Result};

const DEFAULT_CONFIG_PATH: &str = "config/freightcalc";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: String,
    pub data_dir: PathBuf,
    pub rate: RateSettings,
    pub defaults: TripDefaults,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            data_dir: PathBuf::from("data"),
            rate: RateSettings::default(),
            defaults: TripDefaults::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for RateSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.nbp.pl".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Prefilled cost parameters for `calc` and `save`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TripDefaults {
    pub fuel_price: f64,
    pub toll_cost: f64,
    pub service_cost: f64,
    pub fuel_consumption: f64,
    pub tax_residency: String,
}

impl Default for TripDefaults {
    fn default() -> Self {
        Self {
            fuel_price: DEFAULT_FUEL_PRICE_PER_LITER,
            toll_cost: DEFAULT_TOLL_COST_PER_KM,
            service_cost: DEFAULT_SERVICE_COST_PER_KM,
            fuel_consumption: DEFAULT_FUEL_CONSUMPTION_L_PER_100KM,
            tax_residency: DEFAULT_TAX_RESIDENCY.to_string(),
        }
    }
}

/// Layers the config file, `FREIGHTCALC_*` variables and CLI overrides.
pub fn load(cli: &Cli) -> Result<Settings> {
    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(
        config::Environment::with_prefix("FREIGHTCALC")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );
    let mut settings: Settings = builder.build()?.try_deserialize()?;

    if let Some(data_dir) = &cli.data_dir {
        settings.data_dir = data_dir.clone();
    }
    if let Some(level) = &cli.log_level {
        settings.log_level = level.clone();
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn missing_file_yields_defaults_and_cli_wins() {
        let cli = Cli::try_parse_from([
            "freightcalc",
            "--config",
            "does/not/exist",
            "--log-level",
            "debug",
            "taxes",
        ])
        .unwrap();
        let settings = load(&cli).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.defaults.fuel_consumption, 30.0);
        assert_eq!(settings.defaults.tax_residency, "Polska");
        assert_eq!(settings.rate.timeout_secs, 10);
    }
}
