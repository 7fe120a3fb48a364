//! Configuration types for the payroll and tariff calculators.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

use crate::error::{EngineError, EngineResult};

/// Social insurance contribution rates and monthly ceilings.
///
/// Rates are total rates; employer and employee each carry half, except for
/// the childless care surcharge which the employee carries alone.
#[derive(Debug, Clone, Deserialize)]
pub struct SocialInsuranceRates {
    /// General health insurance rate (e.g. 0.146).
    pub health_general: Decimal,
    /// Average additional health contribution used when a request omits it.
    pub health_additional_default: Decimal,
    /// Care insurance base rate.
    pub care_base: Decimal,
    /// Care insurance surcharge for childless employees.
    pub care_childless_surcharge: Decimal,
    /// Pension insurance rate.
    pub pension: Decimal,
    /// Unemployment insurance rate.
    pub unemployment: Decimal,
    /// Monthly contribution ceiling for health and care insurance.
    pub ceiling_health_care: Decimal,
    /// Monthly contribution ceiling for pension and unemployment insurance.
    pub ceiling_pension_unemployment: Decimal,
}

/// Flat allowances deducted from annual gross pay before income tax.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxAllowances {
    /// Flat work-expense allowance (Werbungskostenpauschale).
    pub work_expense_allowance: Decimal,
    /// Flat special-expense allowance (Sonderausgabenpauschale).
    pub special_expense_allowance: Decimal,
    /// Cap on deductible social contributions as a fraction of annual gross.
    pub provision_cap_rate: Decimal,
}

/// Payroll configuration from payroll.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollConfig {
    /// Human-readable name of the parameter set.
    pub name: String,
    /// Version or effective date of the parameter set.
    pub version: String,
    /// Social insurance rates and ceilings.
    pub social_insurance: SocialInsuranceRates,
    /// Flat tax allowances.
    pub allowances: TaxAllowances,
    /// Church tax rate keyed by federal state code.
    pub church_tax: HashMap<String, Decimal>,
}

impl PayrollConfig {
    /// Returns the church tax rate for a federal state.
    ///
    /// Returns `UnknownFederalState` if the state code has no entry.
    pub fn church_tax_rate(&self, state: &str) -> EngineResult<Decimal> {
        self.church_tax
            .get(state)
            .copied()
            .ok_or_else(|| EngineError::UnknownFederalState {
                code: state.to_string(),
            })
    }

    pub(crate) fn validate(&self) -> EngineResult<()> {
        let social = &self.social_insurance;
        let rates = [
            ("social_insurance.health_general", social.health_general),
            ("social_insurance.care_base", social.care_base),
            ("social_insurance.pension", social.pension),
            ("social_insurance.unemployment", social.unemployment),
            ("social_insurance.ceiling_health_care", social.ceiling_health_care),
            (
                "social_insurance.ceiling_pension_unemployment",
                social.ceiling_pension_unemployment,
            ),
            ("allowances.provision_cap_rate", self.allowances.provision_cap_rate),
        ];
        for (key, value) in rates {
            if value.is_sign_negative() {
                return Err(EngineError::InvalidConfig {
                    key: key.to_string(),
                    message: format!("must not be negative, got {}", value),
                });
            }
        }
        if self.church_tax.is_empty() {
            return Err(EngineError::InvalidConfig {
                key: "church_tax".to_string(),
                message: "at least one federal state is required".to_string(),
            });
        }
        Ok(())
    }
}

/// A (wage group, step) key into the wage table.
#[derive(Debug, Clone, Deserialize)]
pub struct WageKey {
    /// Wage group, e.g. "EG 8".
    pub group: String,
    /// Step within the group, e.g. "Grundentgelt".
    pub step: String,
}

/// Tariff configuration from tarif.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct TarifConfig {
    /// Human-readable name of the agreement.
    pub name: String,
    /// Version or effective date of the schedule.
    pub version: String,
    /// Weekly hours the table's monthly wages are based on.
    pub standard_weekly_hours: Decimal,
    /// Tenure in months from which the higher Christmas bonus rate applies.
    pub christmas_bonus_tenure_months: u32,
    /// Wage group whose base wage T-ZUG B is computed from.
    pub tzug_b_reference: WageKey,
    /// Monthly base wage by group and step.
    pub wage_table: BTreeMap<String, BTreeMap<String, Decimal>>,
}

impl TarifConfig {
    /// Looks up the monthly base wage for a wage group and step.
    ///
    /// # Errors
    ///
    /// - `UnknownWageGroup` if the group is not in the table
    /// - `UnknownStep` if the group exists but does not define the step
    pub fn base_wage(&self, group: &str, step: &str) -> EngineResult<Decimal> {
        let steps = self
            .wage_table
            .get(group)
            .ok_or_else(|| EngineError::UnknownWageGroup {
                code: group.to_string(),
            })?;

        steps
            .get(step)
            .copied()
            .ok_or_else(|| EngineError::UnknownStep {
                group: group.to_string(),
                step: step.to_string(),
            })
    }

    /// Returns the base wage T-ZUG B is computed from.
    pub fn tzug_b_reference_wage(&self) -> EngineResult<Decimal> {
        self.base_wage(&self.tzug_b_reference.group, &self.tzug_b_reference.step)
    }

    pub(crate) fn validate(&self) -> EngineResult<()> {
        if self.standard_weekly_hours <= Decimal::ZERO {
            return Err(EngineError::InvalidConfig {
                key: "standard_weekly_hours".to_string(),
                message: "must be positive".to_string(),
            });
        }
        self.tzug_b_reference_wage()
            .map_err(|err| EngineError::InvalidConfig {
                key: "tzug_b_reference".to_string(),
                message: err.to_string(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARIF_YAML: &str = include_str!("../../config/de2025/tarif.yaml");
    const PAYROLL_YAML: &str = include_str!("../../config/de2025/payroll.yaml");

    fn tarif() -> TarifConfig {
        serde_yaml::from_str(TARIF_YAML).unwrap()
    }

    #[test]
    fn test_base_wage_lookup() {
        let config = tarif();
        assert_eq!(
            config.base_wage("EG 1", "Grundentgelt").unwrap(),
            Decimal::new(270500, 2)
        );
        assert_eq!(
            config.base_wage("EG 13", "nach 18. Monat").unwrap(),
            Decimal::new(519050, 2)
        );
    }

    #[test]
    fn test_unknown_group_and_step_are_distinct_errors() {
        let config = tarif();
        assert!(matches!(
            config.base_wage("EG 99", "Grundentgelt"),
            Err(EngineError::UnknownWageGroup { .. })
        ));
        assert!(matches!(
            config.base_wage("EG 12", "Grundentgelt"),
            Err(EngineError::UnknownStep { .. })
        ));
    }

    #[test]
    fn test_tzug_b_reference_is_eg8() {
        assert_eq!(tarif().tzug_b_reference_wage().unwrap(), Decimal::from(3196));
    }

    #[test]
    fn test_church_tax_rates() {
        let config: PayrollConfig = serde_yaml::from_str(PAYROLL_YAML).unwrap();
        assert_eq!(config.church_tax.len(), 16);
        assert_eq!(config.church_tax_rate("BY").unwrap(), Decimal::new(9, 2));
        assert_eq!(config.church_tax_rate("NW").unwrap(), Decimal::new(8, 2));
        assert!(matches!(
            config.church_tax_rate("XX"),
            Err(EngineError::UnknownFederalState { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_missing_reference_group() {
        let mut config = tarif();
        config.tzug_b_reference.group = "EG 42".to_string();
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig { .. })
        ));
    }
}
