use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use priceforge_core::PricingError;

pub fn pricing_error_to_response(err: PricingError) -> axum::response::Response {
    let message = err.to_string();
    let (status, code) = match &err {
        PricingError::InvalidScope(_) => (StatusCode::BAD_REQUEST, "invalid_scope"),
        PricingError::InvalidPrice(_) => (StatusCode::BAD_REQUEST, "invalid_price"),
        PricingError::EmptyUpdate => (StatusCode::BAD_REQUEST, "empty_update"),
        PricingError::InvalidExpiry(_) => (StatusCode::BAD_REQUEST, "invalid_expiry"),
        PricingError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
        PricingError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
    };

    if err.is_client_error() {
        tracing::debug!(error = %message, code, "rejected request");
    } else if status.is_server_error() {
        tracing::error!(error = %message, "price store failure");
    }
    json_error(status, code, message)
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
