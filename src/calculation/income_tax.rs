//! Income tax and solidarity surcharge formulas.
//!
//! The 2025 German income tax schedule (§ 32a EStG) is a piecewise function
//! of the taxable income (zvE) with a basic allowance, two progressive zones
//! with quadratic formulas, and two linear top zones. The coefficients are
//! fixed by statute; each zone meets the next at its boundary.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Taxable income up to which no income tax is due.
pub const BASIC_ALLOWANCE: Decimal = dec!(12096);
/// Upper end of the first progressive zone.
pub const ZONE1_END: Decimal = dec!(17443);
/// Upper end of the second progressive zone.
pub const ZONE2_END: Decimal = dec!(68480);
/// Upper end of the 42% zone; 45% applies above.
pub const ZONE3_END: Decimal = dec!(277825);

/// Annual income tax up to which no solidarity surcharge is due (single).
pub const SOLIDARITY_EXEMPTION_SINGLE: Decimal = dec!(19950);
/// Annual income tax up to which no solidarity surcharge is due (married).
pub const SOLIDARITY_EXEMPTION_MARRIED: Decimal = dec!(39900);
/// Full solidarity surcharge rate.
pub const SOLIDARITY_RATE: Decimal = dec!(0.055);
/// Rate applied to the excess over the exemption inside the clawback zone.
pub const SOLIDARITY_CLAWBACK_RATE: Decimal = dec!(0.19945);
/// Width of the clawback zone past the exemption.
pub const SOLIDARITY_CLAWBACK_BAND: Decimal = dec!(1000);

const TEN_THOUSAND: Decimal = dec!(10000);

/// Computes the annual income tax for a taxable income.
///
/// Negative incomes are clamped to zero.
///
/// # Example
///
/// ```
/// use finance_suite::calculation::income_tax;
/// use rust_decimal::Decimal;
///
/// assert_eq!(income_tax(Decimal::from(12_000)), Decimal::ZERO);
/// assert!(income_tax(Decimal::from(40_000)) > Decimal::ZERO);
/// ```
pub fn income_tax(taxable_income: Decimal) -> Decimal {
    let zve = taxable_income.max(Decimal::ZERO);

    if zve <= BASIC_ALLOWANCE {
        Decimal::ZERO
    } else if zve <= ZONE1_END {
        let y = (zve - BASIC_ALLOWANCE) / TEN_THOUSAND;
        (dec!(932.3) * y + dec!(1400)) * y
    } else if zve <= ZONE2_END {
        let z = (zve - ZONE1_END) / TEN_THOUSAND;
        (dec!(176.64) * z + dec!(2397)) * z + dec!(1015.13)
    } else if zve <= ZONE3_END {
        dec!(0.42) * zve - dec!(10911.92)
    } else {
        dec!(0.45) * zve - dec!(19246.67)
    }
}

/// Computes the annual solidarity surcharge on an annual income tax.
///
/// Nothing is due up to the exemption. Within the first
/// [`SOLIDARITY_CLAWBACK_BAND`] past it the surcharge is the lesser of
/// 19.945% of the excess and the full 5.5% rate; beyond that the full rate
/// applies.
pub fn solidarity_surcharge(tax: Decimal, married: bool) -> Decimal {
    let exemption = if married {
        SOLIDARITY_EXEMPTION_MARRIED
    } else {
        SOLIDARITY_EXEMPTION_SINGLE
    };

    if tax <= exemption {
        return Decimal::ZERO;
    }

    let excess = tax - exemption;
    let full = SOLIDARITY_RATE * tax;
    if excess < SOLIDARITY_CLAWBACK_BAND {
        (SOLIDARITY_CLAWBACK_RATE * excess).min(full)
    } else {
        full
    }
}
