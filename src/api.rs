pub mod swagger_main;
pub mod todo;

#[cfg(test)]
pub mod test_util;

use crate::dto;
use crate::logging;
use crate::routing_utils::{self, Json};
use crate::SharedData;
use axum::Router;
use axum::extract::{DefaultBodyLimit, OriginalUri};
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::get;
use chrono::Utc;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use utoipa::OpenApi;

/// Path the todo router is mounted under
pub const TODOS_PATH: &str = "/todos";
/// Path serving the Swagger UI
pub const DOCS_PATH: &str = "/swagger-ui";
/// Largest request body accepted, matching the usual default for JSON APIs
const REQUEST_BODY_LIMIT: usize = 100 * 1024;

#[derive(OpenApi)]
#[openapi(paths(service_info))]
/// Defines the OpenAPI documentation for the service root
pub struct RootApi;

/// Assembles the whole HTTP application: routes, the 404 fallback, and the middleware pipeline
/// (request tracing, CORS, terminal error rendering, panic recovery, body size limit).
pub fn build_router(shared_data: Arc<SharedData>) -> Router {
    let runtime_mode = shared_data.runtime_mode;

    let router = Router::new()
        .route("/", get(service_info).fallback(route_not_found))
        .route(&format!("{TODOS_PATH}/"), todo::todo_collection_routes())
        .nest(TODOS_PATH, todo::todo_routes())
        .fallback(route_not_found)
        .with_state(shared_data)
        .merge(swagger_main::build_documentation())
        .layer(DefaultBodyLimit::max(REQUEST_BODY_LIMIT))
        .layer(CatchPanicLayer::custom(routing_utils::panic_response))
        .layer(middleware::from_fn_with_state(
            runtime_mode,
            routing_utils::render_unhandled_errors,
        ))
        .layer(cors_layer());

    logging::attach_tracing_http(router)
}

/// Accepts requests from any origin, credentials included. A wildcard origin can't be combined
/// with credentials, so the caller's origin, method and headers are echoed back instead.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "The service is up", body = dto::ServiceInfo),
    ),
)]
/// Reports that the service is running along with the resources it offers
async fn service_info() -> Json<dto::ServiceInfo> {
    Json(dto::ServiceInfo {
        message: "The todo service is running.".into(),
        timestamp: Utc::now(),
        endpoints: dto::EndpointDirectory {
            todos: TODOS_PATH.into(),
            docs: DOCS_PATH.into(),
        },
    })
}

/// Answers every request no route or method matched
pub(crate) async fn route_not_found(OriginalUri(uri): OriginalUri) -> (StatusCode, Json<dto::RouteNotFound>) {
    (
        StatusCode::NOT_FOUND,
        Json(dto::RouteNotFound {
            error: "The requested path could not be found.".into(),
            path: uri.path().to_owned(),
        }),
    )
}
