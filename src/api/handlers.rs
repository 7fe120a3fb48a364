//! HTTP request handlers for the Finance Suite API.
//!
//! This module contains the handler functions for all API endpoints. Every
//! handler tags its log lines with a fresh correlation id and, on success,
//! queues an action log entry for the background worker.

use std::time::Instant;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::calculation::{calculate_tarif, gross_to_net, monthly_breakdown, net_to_gross};
use crate::error::EngineError;
use crate::models::{CellUpdate, Direction, PayrollInput, RowMeta, TarifInput};

use super::request::{json_rejection, path_rejection};
use super::response::ApiErrorResponse;
use super::state::AppState;

/// Name reported by the service banner at `/`.
pub const SERVICE_NAME: &str = "Finance Suite API";

/// Creates the application router.
///
/// The banner is served at `/`; every other route is nested under `prefix`
/// (use `/` or an empty prefix to mount them at the root).
pub fn create_router(state: AppState, prefix: &str) -> Router {
    let api = Router::new()
        .route("/payroll/gross-to-net", post(gross_to_net_handler))
        .route("/payroll/net-to-gross", post(net_to_gross_handler))
        .route("/tarif/estimate", post(tarif_estimate_handler))
        .route("/tarif/breakdown", post(tarif_breakdown_handler))
        .route("/finance/cell", post(save_cell_handler))
        .route("/finance/row", post(save_row_handler))
        .route("/finance/row/:year/:row", delete(delete_row_handler))
        .route(
            "/finance/revision/:year/:direction",
            post(shift_revision_handler),
        )
        .route("/finance/:year", get(get_cells_handler))
        .route("/finance/:year/rows", get(get_rows_handler))
        .route("/finance/:year/reset", delete(reset_year_handler))
        .route(
            "/settings/:group",
            get(get_settings_handler).post(save_settings_handler),
        );

    let router = Router::new().route("/", get(root_handler));
    let router = if prefix.is_empty() || prefix == "/" {
        router.merge(api)
    } else {
        router.nest(prefix, api)
    };
    router.with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, error: EngineError) -> Response {
    if error.is_invalid_input() {
        warn!(correlation_id = %correlation_id, error = %error, "Rejected request");
    } else {
        error!(correlation_id = %correlation_id, error = %error, "Request failed");
    }
    ApiErrorResponse::from(error).into_response()
}

fn parse_body<T>(
    correlation_id: Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, Response> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        let error = json_rejection(rejection);
        warn!(
            correlation_id = %correlation_id,
            code = %error.code,
            error = %error.message,
            "Invalid request body"
        );
        ApiErrorResponse::bad_request(error).into_response()
    })
}

fn parse_path<T>(
    correlation_id: Uuid,
    path: Result<Path<T>, PathRejection>,
) -> Result<T, Response> {
    path.map(|Path(params)| params).map_err(|rejection| {
        let error = path_rejection(rejection);
        warn!(
            correlation_id = %correlation_id,
            error = %error.message,
            "Invalid path parameters"
        );
        ApiErrorResponse::bad_request(error).into_response()
    })
}

/// Queues an action log entry. A full or closed queue never blocks or fails
/// the request that triggered it.
fn audit(state: &AppState, correlation_id: Uuid, action: &str, info: Value) {
    if let Err(err) = state.tasks().record(action, info) {
        warn!(
            correlation_id = %correlation_id,
            action = action,
            error = %err,
            "Action log entry dropped"
        );
    }
}

/// Handler for GET /.
async fn root_handler() -> Response {
    json_response(StatusCode::OK, json!({ "message": SERVICE_NAME }))
}

/// Handler for POST /payroll/gross-to-net.
async fn gross_to_net_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayrollInput>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let input = match parse_body(correlation_id, payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    match gross_to_net(&input, state.config().payroll()) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                gross = %input.gross,
                tax_class = input.tax_class,
                net = %result.net,
                duration_us = start_time.elapsed().as_micros(),
                "Gross-to-net calculated"
            );
            audit(
                &state,
                correlation_id,
                "payroll_gross_to_net",
                json!({
                    "gross": input.gross,
                    "period": input.period,
                    "tax_class": input.tax_class,
                    "net": result.net,
                }),
            );
            json_response(StatusCode::OK, result)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /payroll/net-to-gross.
///
/// The `gross` field of the body carries the target net pay.
async fn net_to_gross_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayrollInput>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let input = match parse_body(correlation_id, payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    match net_to_gross(&input, state.config().payroll()) {
        Ok(estimate) => {
            info!(
                correlation_id = %correlation_id,
                target_net = %input.gross,
                gross = %estimate.gross,
                duration_us = start_time.elapsed().as_micros(),
                "Net-to-gross estimated"
            );
            audit(
                &state,
                correlation_id,
                "payroll_net_to_gross",
                json!({
                    "target_net": input.gross,
                    "period": input.period,
                    "gross": estimate.gross,
                }),
            );
            json_response(StatusCode::OK, estimate)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /tarif/estimate.
async fn tarif_estimate_handler(
    State(state): State<AppState>,
    payload: Result<Json<TarifInput>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let input = match parse_body(correlation_id, payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    match calculate_tarif(&input, state.config().tarif()) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                wage_group = %input.wage_group,
                step = %input.step,
                annual_total = %result.annual_total,
                "Tariff calculated"
            );
            audit(
                &state,
                correlation_id,
                "tarif_estimate",
                json!({
                    "entgeltgruppe": input.wage_group,
                    "stufe": input.step,
                    "jahresentgelt": result.annual_total,
                }),
            );
            json_response(StatusCode::OK, result)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /tarif/breakdown.
async fn tarif_breakdown_handler(
    State(state): State<AppState>,
    payload: Result<Json<TarifInput>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let input = match parse_body(correlation_id, payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    match monthly_breakdown(&input, state.config().tarif()) {
        Ok(months) => {
            info!(
                correlation_id = %correlation_id,
                wage_group = %input.wage_group,
                step = %input.step,
                "Monthly breakdown calculated"
            );
            audit(
                &state,
                correlation_id,
                "tarif_breakdown",
                json!({ "entgeltgruppe": input.wage_group, "stufe": input.step }),
            );
            json_response(StatusCode::OK, months)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /finance/:year.
async fn get_cells_handler(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let year = match parse_path(correlation_id, path) {
        Ok(year) => year,
        Err(response) => return response,
    };

    match state.database().finance().get_cells(year).await {
        Ok(cells) => {
            let revision = cells.first().map_or(0, |cell| cell.revision);
            info!(
                correlation_id = %correlation_id,
                year = year,
                revision = revision,
                cells = cells.len(),
                "Finance table loaded"
            );
            audit(
                &state,
                correlation_id,
                "finance_get",
                json!({ "year": year, "revision": revision }),
            );
            json_response(StatusCode::OK, cells)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /finance/cell.
async fn save_cell_handler(
    State(state): State<AppState>,
    payload: Result<Json<CellUpdate>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let update = match parse_body(correlation_id, payload) {
        Ok(update) => update,
        Err(response) => return response,
    };

    match state.database().finance().upsert_cell(&update).await {
        Ok(cell) => {
            info!(
                correlation_id = %correlation_id,
                year = cell.year,
                row = cell.row,
                col = cell.col,
                revision = cell.revision,
                "Cell saved"
            );
            audit(
                &state,
                correlation_id,
                "finance_save_cell",
                json!({
                    "year": cell.year,
                    "row": cell.row,
                    "col": cell.col,
                    "revision": cell.revision,
                    "value": cell.value,
                }),
            );
            json_response(StatusCode::OK, cell)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /finance/revision/:year/:direction.
async fn shift_revision_handler(
    State(state): State<AppState>,
    path: Result<Path<(i64, String)>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (year, direction) = match parse_path(correlation_id, path) {
        Ok(params) => params,
        Err(response) => return response,
    };
    let direction: Direction = match direction.parse() {
        Ok(direction) => direction,
        Err(err) => return error_response(correlation_id, err),
    };

    match state
        .database()
        .finance()
        .shift_revision(year, direction)
        .await
    {
        Ok(revision) => {
            info!(
                correlation_id = %correlation_id,
                year = year,
                direction = %direction,
                revision = revision,
                "Revision shifted"
            );
            audit(
                &state,
                correlation_id,
                "finance_shift_revision",
                json!({ "year": year, "direction": direction.to_string(), "revision": revision }),
            );
            json_response(StatusCode::OK, revision)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /finance/:year/rows.
async fn get_rows_handler(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let year = match parse_path(correlation_id, path) {
        Ok(year) => year,
        Err(response) => return response,
    };

    match state.database().finance().get_rows(year).await {
        Ok(rows) => {
            info!(correlation_id = %correlation_id, year = year, rows = rows.len(), "Rows loaded");
            audit(
                &state,
                correlation_id,
                "finance_get_rows",
                json!({ "year": year, "rows": rows.len() }),
            );
            json_response(StatusCode::OK, rows)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /finance/row.
async fn save_row_handler(
    State(state): State<AppState>,
    payload: Result<Json<RowMeta>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let meta = match parse_body(correlation_id, payload) {
        Ok(meta) => meta,
        Err(response) => return response,
    };

    match state.database().finance().upsert_row(&meta).await {
        Ok(stored) => {
            info!(
                correlation_id = %correlation_id,
                year = stored.year,
                row = stored.row,
                "Row metadata saved"
            );
            audit(
                &state,
                correlation_id,
                "finance_save_row",
                json!({ "year": stored.year, "row": stored.row, "deleted": stored.deleted }),
            );
            json_response(StatusCode::OK, stored)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for DELETE /finance/row/:year/:row.
async fn delete_row_handler(
    State(state): State<AppState>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (year, row) = match parse_path(correlation_id, path) {
        Ok(params) => params,
        Err(response) => return response,
    };

    match state.database().finance().delete_row(year, row).await {
        Ok(()) => {
            info!(correlation_id = %correlation_id, year = year, row = row, "Row deleted");
            audit(
                &state,
                correlation_id,
                "finance_delete_row",
                json!({ "year": year, "row": row }),
            );
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for DELETE /finance/:year/reset.
///
/// Responds as soon as the reset is queued; the worker performs it.
async fn reset_year_handler(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let year = match parse_path(correlation_id, path) {
        Ok(year) => year,
        Err(response) => return response,
    };

    match state.tasks().reset_year(year).await {
        Ok(_completion) => {
            info!(correlation_id = %correlation_id, year = year, "Year reset queued");
            audit(
                &state,
                correlation_id,
                "finance_reset_year",
                json!({ "year": year }),
            );
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /settings/:group.
async fn get_settings_handler(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let group = match parse_path(correlation_id, path) {
        Ok(group) => group,
        Err(response) => return response,
    };

    match state.database().settings().get(&group).await {
        Ok(payload) => {
            info!(correlation_id = %correlation_id, group = %group, "Settings loaded");
            audit(&state, correlation_id, "settings_get", json!({ "group": group }));
            json_response(StatusCode::OK, payload)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /settings/:group.
async fn save_settings_handler(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let group = match parse_path(correlation_id, path) {
        Ok(group) => group,
        Err(response) => return response,
    };
    let payload = match parse_body(correlation_id, payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    let keys = payload.len();
    match state
        .database()
        .settings()
        .save(&group, Value::Object(payload))
        .await
    {
        Ok(saved) => {
            info!(correlation_id = %correlation_id, group = %group, keys = keys, "Settings saved");
            audit(
                &state,
                correlation_id,
                "settings_save",
                json!({ "group": group, "keys": keys }),
            );
            json_response(StatusCode::OK, saved)
        }
        Err(err) => error_response(correlation_id, err),
    }
}
