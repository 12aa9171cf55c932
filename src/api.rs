pub mod auth;
pub mod public;
pub mod settings;
pub mod swagger_main;
#[cfg(test)]
pub mod test_util;

use crate::routing_utils::{BasicErrorResponse, ExtraInfo, Json};
use crate::{SharedData, logging};
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::error;

/// Assembles every route, the fallbacks and the request tracing into one application router
pub fn build_router(shared_data: Arc<SharedData>) -> Router {
    let router = Router::new()
        .merge(auth::auth_routes())
        .merge(settings::settings_routes())
        .merge(public::public_routes())
        .merge(swagger_main::build_documentation())
        .fallback(url_not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(shared_data);

    logging::attach_tracing_http(router)
}

async fn url_not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "url not found!")
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else {
        "unknown panic".to_owned()
    };
    error!("Request handler panicked: {message}");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(BasicErrorResponse {
            error_code: "internal_error".into(),
            error_description: "The server hit an unexpected problem".into(),
            extra_info: Some(ExtraInfo::Message(message)),
        }),
    )
        .into_response()
}
