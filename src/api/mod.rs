//! HTTP API module for the Finance Suite.
//!
//! This module provides the REST endpoints for the payroll and tariff
//! calculators, the finance table, settings persistence and the service
//! banner.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::{create_router, SERVICE_NAME};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
