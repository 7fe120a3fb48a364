//! Calculation logic for the finance suite.
//!
//! This module contains the pure calculators: the income tax and solidarity
//! surcharge formulas, the gross-to-net payroll calculation with its inverse,
//! and the wage agreement calculation with its monthly schedule.

mod breakdown;
mod income_tax;
mod payroll;
mod tarif;

use rust_decimal::{Decimal, RoundingStrategy};

pub use breakdown::{MONTH_NAMES, REGULAR_PAY_LABEL, monthly_breakdown};
pub use income_tax::{
    BASIC_ALLOWANCE, SOLIDARITY_CLAWBACK_BAND, SOLIDARITY_CLAWBACK_RATE,
    SOLIDARITY_EXEMPTION_MARRIED, SOLIDARITY_EXEMPTION_SINGLE, SOLIDARITY_RATE, ZONE1_END,
    ZONE2_END, ZONE3_END, income_tax, solidarity_surcharge,
};
pub use payroll::{MAX_AMOUNT, NET_TO_GROSS_ITERATIONS, gross_to_net, net_to_gross};
pub use tarif::{MAX_PERCENT, MAX_WEEKLY_HOURS, calculate_tarif};

/// Rounds a monetary amount to cents, halves away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_halves_away_from_zero() {
        assert_eq!(round_money(dec!(743.875)), dec!(743.88));
        assert_eq!(round_money(dec!(0.125)), dec!(0.13));
        assert_eq!(round_money(dec!(-0.125)), dec!(-0.13));
        assert_eq!(round_money(dec!(1.004)), dec!(1.00));
    }
}
