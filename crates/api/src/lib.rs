//! HTTP API: routing and request/response mapping around the price service.

pub mod app;
pub mod middleware;
