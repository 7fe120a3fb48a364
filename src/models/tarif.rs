//! Tariff calculator models.
//!
//! Field names on the wire follow the German terms of the wage agreement
//! (`entgeltgruppe`, `monatsgesamt`, ...); the Rust names are English.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Input to the tariff calculator.
///
/// All percentages are given in percent (e.g. `72.0` for 72%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TarifInput {
    /// Wage group, e.g. "EG 5".
    #[serde(rename = "entgeltgruppe")]
    pub wage_group: String,
    /// Step within the wage group, e.g. "Grundentgelt".
    #[serde(rename = "stufe")]
    pub step: String,
    /// Contractual weekly hours.
    #[serde(rename = "wochenstunden", default = "default_weekly_hours")]
    pub weekly_hours: Decimal,
    /// Performance allowance (Leistungszulage).
    #[serde(rename = "leistungszulage_pct", default)]
    pub performance_allowance_pct: Decimal,
    /// Any other allowance.
    #[serde(rename = "sonstige_zulage_pct", default)]
    pub other_allowance_pct: Decimal,
    /// T-ZUG B, relative to the reference group's base wage.
    #[serde(rename = "tzug_b_pct", default = "default_tzug_b_pct")]
    pub tzug_b_pct: Decimal,
    /// Holiday pay (Urlaubsgeld).
    #[serde(rename = "urlaubsgeld_pct", default = "default_holiday_pay_pct")]
    pub holiday_pay_pct: Decimal,
    /// Transformation pay (Transformationsgeld).
    #[serde(rename = "transformationsgeld_pct", default = "default_transformation_pay_pct")]
    pub transformation_pay_pct: Decimal,
    /// T-ZUG A.
    #[serde(rename = "tzug_a_pct", default = "default_tzug_a_pct")]
    pub tzug_a_pct: Decimal,
    /// Christmas bonus before the tenure threshold.
    #[serde(rename = "weihnachtsgeld_pct_base", default = "default_christmas_base_pct")]
    pub christmas_bonus_base_pct: Decimal,
    /// Christmas bonus from the tenure threshold on.
    #[serde(rename = "weihnachtsgeld_pct_max", default = "default_christmas_max_pct")]
    pub christmas_bonus_max_pct: Decimal,
    /// Months of employment with the company.
    #[serde(rename = "betriebszugehoerigkeit_monate", default)]
    pub tenure_months: u32,
    /// Whether transformation pay is taken as money.
    #[serde(rename = "include_transformationsgeld", default = "default_true")]
    pub include_transformation_pay: bool,
}

fn default_weekly_hours() -> Decimal {
    dec!(35)
}

fn default_tzug_b_pct() -> Decimal {
    dec!(18.5)
}

fn default_holiday_pay_pct() -> Decimal {
    dec!(72.0)
}

fn default_transformation_pay_pct() -> Decimal {
    dec!(18.4)
}

fn default_tzug_a_pct() -> Decimal {
    dec!(27.5)
}

fn default_christmas_base_pct() -> Decimal {
    dec!(25.0)
}

fn default_christmas_max_pct() -> Decimal {
    dec!(55.0)
}

fn default_true() -> bool {
    true
}

impl TarifInput {
    /// Creates an input for the given group and step with default percentages.
    pub fn new(wage_group: impl Into<String>, step: impl Into<String>) -> Self {
        Self {
            wage_group: wage_group.into(),
            step: step.into(),
            weekly_hours: default_weekly_hours(),
            performance_allowance_pct: Decimal::ZERO,
            other_allowance_pct: Decimal::ZERO,
            tzug_b_pct: default_tzug_b_pct(),
            holiday_pay_pct: default_holiday_pay_pct(),
            transformation_pay_pct: default_transformation_pay_pct(),
            tzug_a_pct: default_tzug_a_pct(),
            christmas_bonus_base_pct: default_christmas_base_pct(),
            christmas_bonus_max_pct: default_christmas_max_pct(),
            tenure_months: 0,
            include_transformation_pay: true,
        }
    }
}

/// Result of the tariff calculation. All amounts are rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TarifResult {
    /// Base wage scaled to the contractual hours.
    #[serde(rename = "monatsgrund")]
    pub monthly_base: Decimal,
    /// Sum of the percentage allowances.
    #[serde(rename = "zulagen")]
    pub allowances: Decimal,
    /// Monthly base plus allowances.
    #[serde(rename = "monatsgesamt")]
    pub monthly_total: Decimal,
    /// T-ZUG B, paid once a year.
    #[serde(rename = "tzug_b")]
    pub tzug_b: Decimal,
    /// Holiday pay, paid once a year.
    #[serde(rename = "urlaubsgeld")]
    pub holiday_pay: Decimal,
    /// Transformation pay, zero when excluded.
    #[serde(rename = "transformationsgeld")]
    pub transformation_pay: Decimal,
    /// T-ZUG A, paid once a year.
    #[serde(rename = "tzug_a")]
    pub tzug_a: Decimal,
    /// Christmas bonus, paid once a year.
    #[serde(rename = "weihnachtsgeld")]
    pub christmas_bonus: Decimal,
    /// Twelve monthly totals plus every bonus.
    #[serde(rename = "jahresentgelt")]
    pub annual_total: Decimal,
}

/// One calendar month of the yearly pay schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBreakdown {
    /// German month name.
    #[serde(rename = "Monat")]
    pub month: String,
    /// Gross pay in that month.
    #[serde(rename = "Brutto")]
    pub gross: Decimal,
    /// Comma-separated labels of the paid components.
    #[serde(rename = "Bestandteile")]
    pub components: String,
}
