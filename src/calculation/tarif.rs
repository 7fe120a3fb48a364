//! Collective wage agreement calculation.
//!
//! This module computes monthly pay and the annual one-off payments of the
//! IG Metall NRW agreement from a wage group, a step and the contractual
//! weekly hours.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::TarifConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{TarifInput, TarifResult};

use super::round_money;

const HUNDRED: Decimal = dec!(100);
const MONTHS: Decimal = dec!(12);

/// Hours in a week; the upper bound for contractual weekly hours.
pub const MAX_WEEKLY_HOURS: Decimal = dec!(168);
/// Largest accepted magnitude of any percentage input.
pub const MAX_PERCENT: Decimal = dec!(1000);

/// Unrounded intermediate figures of a tariff calculation.
///
/// The monthly breakdown needs the same figures as [`calculate`]; both work
/// from this struct so they can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TarifFigures {
    pub monthly_base: Decimal,
    pub allowances: Decimal,
    pub monthly_total: Decimal,
    pub tzug_b: Decimal,
    pub holiday_pay: Decimal,
    pub transformation_pay: Decimal,
    pub tzug_a: Decimal,
    pub christmas_bonus: Decimal,
}

impl TarifFigures {
    fn bonuses(&self) -> Decimal {
        self.tzug_b + self.holiday_pay + self.transformation_pay + self.tzug_a + self.christmas_bonus
    }

    fn annual_total(&self) -> Decimal {
        self.monthly_total * MONTHS + self.bonuses()
    }

    pub(crate) fn rounded(&self) -> TarifResult {
        TarifResult {
            monthly_base: round_money(self.monthly_base),
            allowances: round_money(self.allowances),
            monthly_total: round_money(self.monthly_total),
            tzug_b: round_money(self.tzug_b),
            holiday_pay: round_money(self.holiday_pay),
            transformation_pay: round_money(self.transformation_pay),
            tzug_a: round_money(self.tzug_a),
            christmas_bonus: round_money(self.christmas_bonus),
            annual_total: round_money(self.annual_total()),
        }
    }
}

fn percent(amount: Decimal, pct: Decimal) -> Decimal {
    amount * pct / HUNDRED
}

fn validate(input: &TarifInput) -> EngineResult<()> {
    if input.weekly_hours < Decimal::ZERO || input.weekly_hours > MAX_WEEKLY_HOURS {
        return Err(EngineError::invalid_input(
            "wochenstunden",
            format!(
                "must be between 0 and {}, got {}",
                MAX_WEEKLY_HOURS, input.weekly_hours
            ),
        ));
    }

    let percentages = [
        ("leistungszulage_pct", input.performance_allowance_pct),
        ("sonstige_zulage_pct", input.other_allowance_pct),
        ("tzug_b_pct", input.tzug_b_pct),
        ("urlaubsgeld_pct", input.holiday_pay_pct),
        ("transformationsgeld_pct", input.transformation_pay_pct),
        ("tzug_a_pct", input.tzug_a_pct),
        ("weihnachtsgeld_pct_base", input.christmas_bonus_base_pct),
        ("weihnachtsgeld_pct_max", input.christmas_bonus_max_pct),
    ];
    for (field, pct) in percentages {
        if pct.abs() > MAX_PERCENT {
            return Err(EngineError::invalid_input(
                field,
                format!("must be within ±{}, got {}", MAX_PERCENT, pct),
            ));
        }
    }
    Ok(())
}

pub(crate) fn compute(input: &TarifInput, config: &TarifConfig) -> EngineResult<TarifFigures> {
    validate(input)?;

    let table_wage = config.base_wage(&input.wage_group, &input.step)?;
    let hours_factor = input.weekly_hours / config.standard_weekly_hours;

    let monthly_base = table_wage * hours_factor;
    let allowances = percent(monthly_base, input.performance_allowance_pct)
        + percent(monthly_base, input.other_allowance_pct);
    let monthly_total = monthly_base + allowances;

    // T-ZUG B follows the reference group, not the employee's own group.
    let tzug_b = percent(config.tzug_b_reference_wage()?, input.tzug_b_pct) * hours_factor;
    let holiday_pay = percent(monthly_total, input.holiday_pay_pct);
    let transformation_pay = if input.include_transformation_pay {
        percent(monthly_total, input.transformation_pay_pct)
    } else {
        Decimal::ZERO
    };
    let tzug_a = percent(monthly_total, input.tzug_a_pct);

    let christmas_pct = if input.tenure_months >= config.christmas_bonus_tenure_months {
        input.christmas_bonus_max_pct
    } else {
        input.christmas_bonus_base_pct
    };
    let christmas_bonus = percent(monthly_total, christmas_pct);

    Ok(TarifFigures {
        monthly_base,
        allowances,
        monthly_total,
        tzug_b,
        holiday_pay,
        transformation_pay,
        tzug_a,
        christmas_bonus,
    })
}

/// Computes monthly pay, the five annual bonuses and the annual total.
///
/// # Errors
///
/// - `UnknownWageGroup` if the wage group is not in the table
/// - `UnknownStep` if the step is not defined for the group
/// - `InvalidInput` if the weekly hours are outside `0..=168` or a
///   percentage exceeds ±[`MAX_PERCENT`]
///
/// # Example
///
/// ```no_run
/// use finance_suite::calculation::calculate_tarif;
/// use finance_suite::config::ConfigLoader;
/// use finance_suite::models::TarifInput;
///
/// let config = ConfigLoader::load("./config/de2025")?;
/// let result = calculate_tarif(&TarifInput::new("EG 1", "Grundentgelt"), config.tarif())?;
/// println!("Annual pay: {}", result.annual_total);
/// # Ok::<(), finance_suite::error::EngineError>(())
/// ```
pub fn calculate_tarif(input: &TarifInput, config: &TarifConfig) -> EngineResult<TarifResult> {
    compute(input, config).map(|figures| figures.rounded())
}
