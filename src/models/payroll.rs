//! Payroll calculator models.
//!
//! This module contains the input and result types of the gross-to-net and
//! net-to-gross calculations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The period a payroll amount refers to.
///
/// # Example
///
/// ```
/// use finance_suite::models::PayPeriod;
///
/// let period: PayPeriod = serde_json::from_str("\"yearly\"").unwrap();
/// assert_eq!(period, PayPeriod::Yearly);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayPeriod {
    /// Amounts are per month.
    #[default]
    Monthly,
    /// Amounts are per year.
    Yearly,
}

/// Input to the payroll calculator.
///
/// For net-to-gross requests `gross` carries the target net amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollInput {
    /// Gross pay in the given period.
    pub gross: Decimal,
    /// Whether `gross` is monthly or yearly.
    #[serde(default)]
    pub period: PayPeriod,
    /// Income tax class (1-6). Classes 3, 5 and 6 adjust the tax.
    #[serde(default = "default_tax_class")]
    pub tax_class: u8,
    /// Married filers get the higher solidarity surcharge exemption.
    #[serde(default)]
    pub married: bool,
    /// Two-letter federal state code, determines the church tax rate.
    #[serde(default = "default_federal_state")]
    pub federal_state: String,
    /// Whether church tax is due.
    #[serde(default)]
    pub church: bool,
    /// Childless employees pay the care insurance surcharge.
    #[serde(default = "default_childless")]
    pub childless: bool,
    /// Additional health insurance contribution rate. Falls back to the
    /// configured average when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_kv: Option<Decimal>,
}

fn default_tax_class() -> u8 {
    1
}

fn default_federal_state() -> String {
    "NW".to_string()
}

fn default_childless() -> bool {
    true
}

impl PayrollInput {
    /// Creates an input with the default parameters for the given gross pay.
    pub fn new(gross: Decimal) -> Self {
        Self {
            gross,
            period: PayPeriod::Monthly,
            tax_class: default_tax_class(),
            married: false,
            federal_state: default_federal_state(),
            church: false,
            childless: default_childless(),
            additional_kv: None,
        }
    }

    /// Returns a copy of this input with a different gross amount.
    pub fn with_gross(&self, gross: Decimal) -> Self {
        Self {
            gross,
            ..self.clone()
        }
    }
}

/// Result of a gross-to-net calculation.
///
/// `net` and the tax fields are expressed in the requested period; social
/// insurance contributions are always monthly figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollResult {
    /// Net pay.
    pub net: Decimal,
    /// Income tax.
    pub income_tax: Decimal,
    /// Solidarity surcharge.
    pub solidarity: Decimal,
    /// Church tax.
    pub church_tax: Decimal,
    /// Employee health insurance contribution.
    pub health_employee: Decimal,
    /// Employer health insurance contribution.
    pub health_employer: Decimal,
    /// Employee care insurance contribution.
    pub care_employee: Decimal,
    /// Employer care insurance contribution.
    pub care_employer: Decimal,
    /// Employee pension insurance contribution.
    pub pension_employee: Decimal,
    /// Employer pension insurance contribution.
    pub pension_employer: Decimal,
    /// Employee unemployment insurance contribution.
    pub unemployment_employee: Decimal,
    /// Employer unemployment insurance contribution.
    pub unemployment_employer: Decimal,
}

impl PayrollResult {
    /// Sum of the employee's tax deductions.
    pub fn total_taxes(&self) -> Decimal {
        self.income_tax + self.solidarity + self.church_tax
    }

    /// Sum of the employee's social insurance contributions.
    pub fn total_employee_contributions(&self) -> Decimal {
        self.health_employee + self.care_employee + self.pension_employee + self.unemployment_employee
    }
}

/// Result of a net-to-gross search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetToGrossResult {
    /// Estimated gross pay that yields the target net.
    pub gross: Decimal,
    /// The full payroll result at the estimated gross.
    pub result: PayrollResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_on_deserialize() {
        let input: PayrollInput = serde_json::from_str(r#"{"gross": 4000}"#).unwrap();
        assert_eq!(input, PayrollInput::new(Decimal::from(4000)));
    }

    #[test]
    fn test_unknown_period_rejected() {
        let result: Result<PayrollInput, _> =
            serde_json::from_str(r#"{"gross": 4000, "period": "weekly"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_gross_accepts_string_and_number() {
        let from_str: PayrollInput = serde_json::from_str(r#"{"gross": "4000.50"}"#).unwrap();
        let from_num: PayrollInput = serde_json::from_str(r#"{"gross": 4000.50}"#).unwrap();
        assert_eq!(from_str.gross, from_num.gross);
    }
}
