use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::dto::{self, ChannelQuery, PricesQuery, UpdatePriceRequest};
use crate::app::errors;
use crate::app::services::AppPriceService;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_prices).put(update_price))
        .route("/:store/:sku", get(get_price))
}

pub async fn update_price(
    Extension(prices): Extension<Arc<AppPriceService>>,
    body: Result<Json<UpdatePriceRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_request", rejection.body_text());
        }
    };
    let update = match body.into_update() {
        Ok(u) => u,
        Err(e) => return errors::pricing_error_to_response(e),
    };

    match prices.apply_update(&update) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::pricing_error_to_response(e),
    }
}

pub async fn list_prices(
    Extension(prices): Extension<Arc<AppPriceService>>,
    Query(query): Query<PricesQuery>,
) -> axum::response::Response {
    let channel = query.channel();
    let found = match prices.effective_prices(channel, &query.store, &query.skus()) {
        Ok(found) => found,
        Err(e) => return errors::pricing_error_to_response(e),
    };

    if found.is_empty() {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "no price found");
    }
    (StatusCode::OK, Json(dto::prices_response(channel, &query.store, &found))).into_response()
}

pub async fn get_price(
    Extension(prices): Extension<Arc<AppPriceService>>,
    Path((store, sku)): Path<(String, String)>,
    Query(query): Query<ChannelQuery>,
) -> axum::response::Response {
    let channel = dto::normalize_channel(query.channel);
    match prices.effective_price(channel.as_deref(), &store, &sku) {
        Ok(price) => {
            let detail = dto::price_detail(channel.as_deref(), &store, &sku, &price);
            (StatusCode::OK, Json(detail)).into_response()
        }
        Err(e) => errors::pricing_error_to_response(e),
    }
}
