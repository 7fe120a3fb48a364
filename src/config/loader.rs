//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the payroll and
//! tariff tables from YAML files.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::types::{PayrollConfig, TarifConfig};

/// Loads and provides access to the calculator configuration.
///
/// The tables are read once at startup and never mutated afterwards; the
/// loader is shared behind an `Arc` by the HTTP layer.
///
/// # Directory Structure
///
/// ```text
/// config/de2025/
/// ├── payroll.yaml   # Contribution rates, ceilings, church tax by state
/// └── tarif.yaml     # Wage table and bonus parameters
/// ```
///
/// # Example
///
/// ```no_run
/// use finance_suite::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/de2025").unwrap();
/// let base = loader.tarif().base_wage("EG 1", "Grundentgelt").unwrap();
/// println!("EG 1 base wage: {}", base);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    payroll: PayrollConfig,
    tarif: TarifConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if either file is missing, contains invalid YAML, or
    /// fails validation (e.g. the T-ZUG B reference group is not in the
    /// wage table).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use finance_suite::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/de2025")?;
    /// # Ok::<(), finance_suite::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let payroll = Self::load_yaml::<PayrollConfig>(&path.join("payroll.yaml"))?;
        let tarif = Self::load_yaml::<TarifConfig>(&path.join("tarif.yaml"))?;

        let loader = Self::from_parts(payroll, tarif)?;
        info!(
            config_dir = %path.display(),
            payroll = %loader.payroll.version,
            tarif = %loader.tarif.name,
            wage_groups = loader.tarif.wage_table.len(),
            "Loaded calculator configuration"
        );
        Ok(loader)
    }

    /// Builds a loader from already parsed tables, validating both.
    pub fn from_parts(payroll: PayrollConfig, tarif: TarifConfig) -> EngineResult<Self> {
        payroll.validate()?;
        tarif.validate()?;
        Ok(Self { payroll, tarif })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the payroll parameters.
    pub fn payroll(&self) -> &PayrollConfig {
        &self.payroll
    }

    /// Returns the tariff table.
    pub fn tarif(&self) -> &TarifConfig {
        &self.tarif
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn config_path() -> &'static str {
        "./config/de2025"
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.tarif().name, "IG Metall NRW 2025");
        assert_eq!(loader.tarif().wage_table.len(), 14);
        assert_eq!(loader.tarif().standard_weekly_hours, Decimal::from(35));
        assert_eq!(loader.tarif().christmas_bonus_tenure_months, 36);
    }

    #[test]
    fn test_payroll_ceilings_loaded_correctly() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let social = &loader.payroll().social_insurance;

        assert_eq!(social.ceiling_health_care, Decimal::new(551250, 2));
        assert_eq!(social.ceiling_pension_unemployment, Decimal::from(8050));
        assert_eq!(social.health_general, Decimal::new(146, 3));
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("payroll.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }
}
