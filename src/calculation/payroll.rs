//! Gross-to-net payroll calculation.
//!
//! This module computes the statutory deductions of a German employee
//! (social insurance, income tax, solidarity surcharge, church tax) and
//! solves the inverse problem of finding the gross pay for a target net.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::config::PayrollConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{NetToGrossResult, PayPeriod, PayrollInput, PayrollResult};

use super::income_tax::{income_tax, solidarity_surcharge};
use super::round_money;

/// Number of bisection steps used by [`net_to_gross`].
pub const NET_TO_GROSS_ITERATIONS: u32 = 25;

/// Largest accepted gross (or target net) amount.
///
/// Keeps every intermediate product well inside `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// Largest accepted additional health insurance rate (100%).
pub const MAX_ADDITIONAL_KV: Decimal = Decimal::ONE;

const MONTHS: Decimal = dec!(12);
const TWO: Decimal = dec!(2);

/// Employee and employer shares of the four social insurances, per month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Contributions {
    health_employee: Decimal,
    health_employer: Decimal,
    care_employee: Decimal,
    care_employer: Decimal,
    pension_employee: Decimal,
    pension_employer: Decimal,
    unemployment_employee: Decimal,
    unemployment_employer: Decimal,
}

impl Contributions {
    fn employee_total(&self) -> Decimal {
        self.health_employee + self.care_employee + self.pension_employee + self.unemployment_employee
    }
}

fn social_contributions(
    monthly_gross: Decimal,
    additional_kv: Decimal,
    childless: bool,
    config: &PayrollConfig,
) -> Contributions {
    let rates = &config.social_insurance;
    let health_care_base = monthly_gross.min(rates.ceiling_health_care);
    let pension_base = monthly_gross.min(rates.ceiling_pension_unemployment);

    // The additional contribution is split like the general rate.
    let health = health_care_base * (rates.health_general + additional_kv) / TWO;
    let care = health_care_base * rates.care_base / TWO;
    let care_surcharge = if childless {
        health_care_base * rates.care_childless_surcharge
    } else {
        Decimal::ZERO
    };
    let pension = pension_base * rates.pension / TWO;
    let unemployment = pension_base * rates.unemployment / TWO;

    Contributions {
        health_employee: health,
        health_employer: health,
        care_employee: care + care_surcharge,
        care_employer: care,
        pension_employee: pension,
        pension_employer: pension,
        unemployment_employee: unemployment,
        unemployment_employer: unemployment,
    }
}

/// Applies the tax class adjustment to the annual income tax.
///
/// Class 3 taxes half the income and doubles the result (splitting); classes
/// 5 and 6 carry a 20% and 30% markup. Other classes are unchanged.
fn annual_income_tax(taxable_income: Decimal, tax_class: u8) -> Decimal {
    match tax_class {
        3 => TWO * income_tax(taxable_income / TWO),
        5 => income_tax(taxable_income) * dec!(1.20),
        6 => income_tax(taxable_income) * dec!(1.30),
        _ => income_tax(taxable_income),
    }
}

fn validate(input: &PayrollInput) -> EngineResult<()> {
    if input.gross < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "gross",
            format!("must not be negative, got {}", input.gross),
        ));
    }
    if input.gross > MAX_AMOUNT {
        return Err(EngineError::invalid_input(
            "gross",
            format!("must not exceed {}, got {}", MAX_AMOUNT, input.gross),
        ));
    }
    if let Some(rate) = input.additional_kv {
        if rate < Decimal::ZERO || rate > MAX_ADDITIONAL_KV {
            return Err(EngineError::invalid_input(
                "additional_kv",
                format!("must be between 0 and {}, got {}", MAX_ADDITIONAL_KV, rate),
            ));
        }
    }
    Ok(())
}

/// Computes net pay and all deductions for a gross pay.
///
/// # Errors
///
/// - `InvalidInput` if `gross` is negative or above [`MAX_AMOUNT`], or
///   `additional_kv` is outside `0..=1`
/// - `UnknownFederalState` if the state code has no church tax rate
///
/// # Example
///
/// ```no_run
/// use finance_suite::calculation::gross_to_net;
/// use finance_suite::config::ConfigLoader;
/// use finance_suite::models::PayrollInput;
/// use rust_decimal::Decimal;
///
/// let config = ConfigLoader::load("./config/de2025")?;
/// let result = gross_to_net(&PayrollInput::new(Decimal::from(4000)), config.payroll())?;
/// assert!(result.net < Decimal::from(4000));
/// # Ok::<(), finance_suite::error::EngineError>(())
/// ```
pub fn gross_to_net(input: &PayrollInput, config: &PayrollConfig) -> EngineResult<PayrollResult> {
    validate(input)?;
    let church_rate = config.church_tax_rate(&input.federal_state)?;

    let monthly_gross = match input.period {
        PayPeriod::Monthly => input.gross,
        PayPeriod::Yearly => input.gross / MONTHS,
    };
    let annual_gross = monthly_gross * MONTHS;

    let additional_kv = input
        .additional_kv
        .unwrap_or(config.social_insurance.health_additional_default);
    let contributions = social_contributions(monthly_gross, additional_kv, input.childless, config);

    // Deductible social contributions are capped at a share of annual gross.
    let allowances = &config.allowances;
    let provision = (contributions.employee_total() * MONTHS)
        .min(allowances.provision_cap_rate * annual_gross);
    let taxable_income = annual_gross
        - provision
        - allowances.work_expense_allowance
        - allowances.special_expense_allowance;

    let tax_annual = annual_income_tax(taxable_income, input.tax_class);
    let tax_monthly = tax_annual / MONTHS;
    let solidarity_monthly = solidarity_surcharge(tax_annual, input.married) / MONTHS;
    let church_monthly = if input.church {
        tax_monthly * church_rate
    } else {
        Decimal::ZERO
    };

    let deductions =
        tax_monthly + solidarity_monthly + church_monthly + contributions.employee_total();
    let net_monthly = monthly_gross - deductions;

    debug!(
        monthly_gross = %monthly_gross,
        taxable_income = %taxable_income,
        tax_annual = %tax_annual,
        tax_class = input.tax_class,
        "Computed gross-to-net"
    );

    let per_period = |monthly: Decimal| match input.period {
        PayPeriod::Monthly => round_money(monthly),
        PayPeriod::Yearly => round_money(monthly * MONTHS),
    };

    Ok(PayrollResult {
        net: per_period(net_monthly),
        income_tax: match input.period {
            PayPeriod::Monthly => round_money(tax_monthly),
            PayPeriod::Yearly => round_money(tax_annual),
        },
        solidarity: per_period(solidarity_monthly),
        church_tax: per_period(church_monthly),
        health_employee: round_money(contributions.health_employee),
        health_employer: round_money(contributions.health_employer),
        care_employee: round_money(contributions.care_employee),
        care_employer: round_money(contributions.care_employer),
        pension_employee: round_money(contributions.pension_employee),
        pension_employer: round_money(contributions.pension_employer),
        unemployment_employee: round_money(contributions.unemployment_employee),
        unemployment_employer: round_money(contributions.unemployment_employer),
    })
}

/// Finds the gross pay that yields a target net pay.
///
/// `params.gross` is the target net. The search bisects `[0, 3 × target]`
/// for exactly [`NET_TO_GROSS_ITERATIONS`] steps and returns the upper bound
/// rounded to cents, together with the full result at that gross.
///
/// # Errors
///
/// Same as [`gross_to_net`].
pub fn net_to_gross(params: &PayrollInput, config: &PayrollConfig) -> EngineResult<NetToGrossResult> {
    let target = params.gross;
    validate(params)?;

    let mut low = Decimal::ZERO;
    let mut high = target * dec!(3);
    for _ in 0..NET_TO_GROSS_ITERATIONS {
        let mid = (low + high) / TWO;
        let result = gross_to_net(&params.with_gross(mid), config)?;
        if result.net > target {
            high = mid;
        } else {
            low = mid;
        }
    }

    let gross = round_money(high);
    let result = gross_to_net(&params.with_gross(gross), config)?;
    debug!(target = %target, gross = %gross, net = %result.net, "Solved net-to-gross");

    Ok(NetToGrossResult { gross, result })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use proptest::prelude::*;

    fn config() -> PayrollConfig {
        ConfigLoader::load("./config/de2025")
            .expect("Failed to load config")
            .payroll()
            .clone()
    }

    fn monthly(gross: Decimal) -> PayrollInput {
        PayrollInput::new(gross)
    }

    /// 7e27, close to the top of `Decimal`'s range.
    fn huge() -> Decimal {
        Decimal::from_i128_with_scale(7 * 10i128.pow(27), 0)
    }

    #[test]
    fn test_default_single_4000_monthly() {
        let result = gross_to_net(&monthly(dec!(4000)), &config()).unwrap();

        assert_eq!(result.net, dec!(2603.00));
        assert_eq!(result.income_tax, dec!(535.00));
        assert_eq!(result.solidarity, dec!(0.00));
        assert_eq!(result.church_tax, dec!(0.00));
        // (14.6% + 2.5%) / 2 of 4000
        assert_eq!(result.health_employee, dec!(342.00));
        assert_eq!(result.health_employer, dec!(342.00));
        // 1.8% + 0.6% childless surcharge
        assert_eq!(result.care_employee, dec!(96.00));
        assert_eq!(result.care_employer, dec!(72.00));
        assert_eq!(result.pension_employee, dec!(372.00));
        assert_eq!(result.unemployment_employee, dec!(52.00));
    }

    #[test]
    fn test_class_3_with_church_tax_in_bavaria() {
        let mut input = monthly(dec!(4000));
        input.tax_class = 3;
        input.church = true;
        input.federal_state = "BY".to_string();

        let result = gross_to_net(&input, &config()).unwrap();

        assert_eq!(result.income_tax, dec!(214.46));
        assert_eq!(result.church_tax, dec!(19.30));
        assert_eq!(result.net, dec!(2904.23));
    }

    #[test]
    fn test_yearly_period_reports_annual_figures() {
        let mut input = monthly(dec!(48000));
        input.period = PayPeriod::Yearly;

        let result = gross_to_net(&input, &config()).unwrap();

        assert_eq!(result.net, dec!(31236.04));
        assert_eq!(result.income_tax, dec!(6419.96));
        // Contributions stay monthly.
        assert_eq!(result.health_employee, dec!(342.00));
    }

    #[test]
    fn test_contribution_ceilings_and_class_6() {
        let mut input = monthly(dec!(10000));
        input.tax_class = 6;
        input.married = true;

        let result = gross_to_net(&input, &config()).unwrap();

        assert_eq!(result.health_employee, dec!(471.32));
        assert_eq!(result.care_employee, dec!(132.30));
        assert_eq!(result.care_employer, dec!(99.23));
        assert_eq!(result.pension_employee, dec!(748.65));
        assert_eq!(result.unemployment_employee, dec!(104.65));
        assert_eq!(result.income_tax, dec!(3424.79));
        assert_eq!(result.solidarity, dec!(188.36));
        assert_eq!(result.net, dec!(4929.92));
    }

    #[test]
    fn test_parents_pay_no_care_surcharge() {
        let mut input = monthly(dec!(4000));
        input.childless = false;

        let result = gross_to_net(&input, &config()).unwrap();
        assert_eq!(result.care_employee, result.care_employer);
    }

    #[test]
    fn test_zero_gross_yields_zero() {
        let result = gross_to_net(&monthly(Decimal::ZERO), &config()).unwrap();
        assert_eq!(result.net, Decimal::ZERO);
        assert_eq!(result.total_taxes(), Decimal::ZERO);
    }

    #[test]
    fn test_negative_gross_rejected() {
        let result = gross_to_net(&monthly(dec!(-1)), &config());
        assert!(matches!(
            result,
            Err(EngineError::InvalidInput { ref field, .. }) if field == "gross"
        ));
    }

    #[test]
    fn test_unknown_federal_state_rejected() {
        let mut input = monthly(dec!(4000));
        input.federal_state = "XX".to_string();

        let result = gross_to_net(&input, &config());
        assert!(matches!(result, Err(EngineError::UnknownFederalState { .. })));
    }

    #[test]
    fn test_net_to_gross_finds_gross() {
        let result = net_to_gross(&monthly(dec!(3000)), &config()).unwrap();

        assert_eq!(result.gross, dec!(4753.51));
        assert_eq!(result.result.net, dec!(3000.00));
    }

    #[test]
    fn test_huge_amounts_rejected() {
        let config = config();
        for gross in [dec!(1000000000000.01), huge()] {
            let result = gross_to_net(&monthly(gross), &config);
            assert!(matches!(
                result,
                Err(EngineError::InvalidInput { ref field, .. }) if field == "gross"
            ));
            assert!(net_to_gross(&monthly(gross), &config).is_err());
        }

        let mut yearly = monthly(huge());
        yearly.period = PayPeriod::Yearly;
        assert!(gross_to_net(&yearly, &config).is_err());

        assert!(gross_to_net(&monthly(MAX_AMOUNT), &config).is_ok());
        assert!(net_to_gross(&monthly(MAX_AMOUNT), &config).is_ok());
    }

    #[test]
    fn test_additional_kv_out_of_range_rejected() {
        let mut input = monthly(dec!(4000));
        input.additional_kv = Some(huge());

        let result = gross_to_net(&input, &config());
        assert!(matches!(
            result,
            Err(EngineError::InvalidInput { ref field, .. }) if field == "additional_kv"
        ));
    }

    // The solidarity surcharge jumps at the end of its clawback band, so net
    // pay falls slightly as gross rises past it. Two grosses share one net
    // there and the bisection settles on the higher one.
    #[test]
    fn test_net_to_gross_past_solidarity_clawback_band() {
        let config = config();
        let mut input = monthly(dec!(9716));
        input.tax_class = 3;

        let net = gross_to_net(&input, &config).unwrap().net;
        assert_eq!(net, dec!(6529.44));

        let solved = net_to_gross(&input.with_gross(net), &config).unwrap();
        assert_eq!(solved.gross, dec!(9848.66));
        assert!((solved.result.net - net).abs() <= dec!(0.01));
    }

    #[test]
    fn test_net_to_gross_of_zero() {
        let result = net_to_gross(&monthly(Decimal::ZERO), &config()).unwrap();
        assert_eq!(result.gross, Decimal::ZERO);
    }

    #[test]
    fn test_tax_class_adjustments() {
        assert_eq!(annual_income_tax(dec!(40000), 1), income_tax(dec!(40000)));
        assert_eq!(annual_income_tax(dec!(40000), 2), income_tax(dec!(40000)));
        assert_eq!(
            annual_income_tax(dec!(40000), 3),
            dec!(2) * income_tax(dec!(20000))
        );
        assert_eq!(
            annual_income_tax(dec!(40000), 5),
            income_tax(dec!(40000)) * dec!(1.2)
        );
        assert_eq!(
            annual_income_tax(dec!(40000), 6),
            income_tax(dec!(40000)) * dec!(1.3)
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_net_never_exceeds_gross(
            cents in 0i64..5_000_000,
            tax_class in 1u8..=6,
            church: bool,
            childless: bool,
        ) {
            let mut input = monthly(Decimal::new(cents, 2));
            input.tax_class = tax_class;
            input.church = church;
            input.childless = childless;

            let result = gross_to_net(&input, &config()).unwrap();

            prop_assert!(result.net <= input.gross);
            for deduction in [
                result.income_tax,
                result.solidarity,
                result.church_tax,
                result.health_employee,
                result.care_employee,
                result.pension_employee,
                result.unemployment_employee,
            ] {
                prop_assert!(deduction >= Decimal::ZERO);
            }
        }

        #[test]
        fn prop_net_to_gross_hits_target_net(gross in 1000i64..20_000, tax_class in 1u8..=6) {
            let config = config();
            let mut input = monthly(Decimal::from(gross));
            input.tax_class = tax_class;

            let net = gross_to_net(&input, &config).unwrap().net;
            let solved = net_to_gross(&input.with_gross(net), &config).unwrap();

            // The solved gross need not equal `gross` near the solidarity
            // clawback band, but its net must match.
            prop_assert!(
                (solved.result.net - net).abs() <= dec!(0.01),
                "gross {} -> net {} -> gross {} -> net {}",
                gross,
                net,
                solved.gross,
                solved.result.net
            );
        }
    }
}
