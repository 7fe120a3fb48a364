//! Twelve-month pay schedule of the wage agreement.

use rust_decimal::Decimal;

use crate::config::TarifConfig;
use crate::error::EngineResult;
use crate::models::{MonthlyBreakdown, TarifInput};

use super::round_money;
use super::tarif::compute;

/// Calendar month names as shown in the schedule.
pub const MONTH_NAMES: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

/// Label of the regular monthly pay.
pub const REGULAR_PAY_LABEL: &str = "Grund-/Zulagen";

/// Builds the gross pay of every calendar month, January first.
///
/// Every month pays the rounded monthly total. One-off payments fall into
/// fixed months: T-ZUG B in February, holiday pay in June, T-ZUG A and
/// transformation pay in July, the Christmas bonus in November.
///
/// # Errors
///
/// Same as [`calculate_tarif`](super::calculate_tarif).
pub fn monthly_breakdown(
    input: &TarifInput,
    config: &TarifConfig,
) -> EngineResult<Vec<MonthlyBreakdown>> {
    let result = compute(input, config)?.rounded();
    let base = result.monthly_total;

    let breakdown = MONTH_NAMES
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let mut extras: Vec<(&str, Decimal)> = Vec::new();
            match index + 1 {
                2 => extras.push(("T-ZUG B", result.tzug_b)),
                6 => extras.push(("Urlaubsgeld", result.holiday_pay)),
                7 => {
                    extras.push(("T-ZUG A", result.tzug_a));
                    if !result.transformation_pay.is_zero() {
                        extras.push(("Transformationsgeld", result.transformation_pay));
                    }
                }
                11 => extras.push(("Weihnachtsgeld", result.christmas_bonus)),
                _ => {}
            }

            let gross = base + extras.iter().map(|(_, amount)| *amount).sum::<Decimal>();
            let components = std::iter::once(REGULAR_PAY_LABEL)
                .chain(extras.iter().map(|(label, _)| *label))
                .collect::<Vec<_>>()
                .join(", ");

            MonthlyBreakdown {
                month: (*name).to_string(),
                gross: round_money(gross),
                components,
            }
        })
        .collect();

    Ok(breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::calculate_tarif;
    use crate::config::ConfigLoader;
    use rust_decimal_macros::dec;

    fn config() -> TarifConfig {
        ConfigLoader::load("./config/de2025")
            .expect("Failed to load config")
            .tarif()
            .clone()
    }

    #[test]
    fn test_twelve_months_in_calendar_order() {
        let months = monthly_breakdown(&TarifInput::new("EG 1", "Grundentgelt"), &config()).unwrap();

        let names: Vec<&str> = months.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(names, MONTH_NAMES.to_vec());
    }

    #[test]
    fn test_bonus_months() {
        let months = monthly_breakdown(&TarifInput::new("EG 1", "Grundentgelt"), &config()).unwrap();

        assert_eq!(months[0].gross, dec!(2705.00));
        assert_eq!(months[0].components, "Grund-/Zulagen");
        assert_eq!(months[1].gross, dec!(3296.26));
        assert_eq!(months[1].components, "Grund-/Zulagen, T-ZUG B");
        assert_eq!(months[5].gross, dec!(4652.60));
        assert_eq!(months[5].components, "Grund-/Zulagen, Urlaubsgeld");
        assert_eq!(months[6].gross, dec!(3946.60));
        assert_eq!(
            months[6].components,
            "Grund-/Zulagen, T-ZUG A, Transformationsgeld"
        );
        assert_eq!(months[10].gross, dec!(3381.25));
        assert_eq!(months[10].components, "Grund-/Zulagen, Weihnachtsgeld");
    }

    #[test]
    fn test_july_without_transformation_pay() {
        let mut input = TarifInput::new("EG 1", "Grundentgelt");
        input.include_transformation_pay = false;

        let months = monthly_breakdown(&input, &config()).unwrap();

        assert_eq!(months[6].gross, dec!(3448.88));
        assert_eq!(months[6].components, "Grund-/Zulagen, T-ZUG A");
    }

    #[test]
    fn test_breakdown_sums_to_rounded_annual_components() {
        let input = TarifInput::new("EG 9", "Grundentgelt");
        let result = calculate_tarif(&input, &config()).unwrap();
        let months = monthly_breakdown(&input, &config()).unwrap();

        let total: Decimal = months.iter().map(|m| m.gross).sum();
        let expected = result.monthly_total * dec!(12)
            + result.tzug_b
            + result.holiday_pay
            + result.transformation_pay
            + result.tzug_a
            + result.christmas_bonus;
        assert_eq!(total, expected);
    }
}
