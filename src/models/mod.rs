//! Core data models for the finance suite.
//!
//! This module contains the domain models shared by the calculators, the
//! stores and the HTTP layer.

mod audit;
mod finance;
mod payroll;
mod tarif;

pub use audit::ActionLog;
pub use finance::{CellUpdate, Direction, FinanceCell, MAX_REVISION, RowMeta};
pub use payroll::{NetToGrossResult, PayPeriod, PayrollInput, PayrollResult};
pub use tarif::{MonthlyBreakdown, TarifInput, TarifResult};
