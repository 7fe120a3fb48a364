//! Configuration loading and management for the finance suite.
//!
//! Two kinds of configuration exist:
//! - immutable calculator tables (payroll parameters, wage schedule) loaded
//!   from YAML files by [`ConfigLoader`], and
//! - process settings (bind address, database URL, retry policy) read from the
//!   environment by [`ServerConfig`].
//!
//! # Example
//!
//! ```no_run
//! use finance_suite::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/de2025").unwrap();
//! println!("Loaded tariff: {}", config.tarif().name);
//! ```

mod loader;
mod server;
mod types;

pub use loader::ConfigLoader;
pub use server::ServerConfig;
pub use types::{PayrollConfig, SocialInsuranceRates, TarifConfig, TaxAllowances, WageKey};
