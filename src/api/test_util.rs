use crate::app_env::RuntimeMode;
use crate::{SharedData, db, persistence};
use axum::Router;
use axum::body::{self, Body};
use axum::http::Request;
use axum::response::Response;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower::ServiceExt;

/// Used in tests to both extract the raw bytes from the HTTP response body and then deserialize them into the
/// requested type. Will panic and fail the test if either step fails somehow.
pub async fn deserialize_body<T: DeserializeOwned>(response_body: body::Body) -> T {
    let bytes = body::to_bytes(response_body, usize::MAX)
        .await
        .expect("Could not read data from response body!");

    serde_json::from_slice(&bytes).unwrap_or_else(|err| {
        panic!(
            "Could not parse body content into data structure! Error: {}, Received body: {:?}",
            err, bytes
        )
    })
}

/// Builds the full application router on top of a MongoDB handle that is never connected.
/// Only usable for requests that are answered before any database access happens.
pub async fn test_router(runtime_mode: RuntimeMode) -> Router {
    let db = db::connect_mongodb("mongodb://localhost:27017/todo_router_tests")
        .await
        .expect("lazy client should build from a valid connection string");

    crate::api::build_router(Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(db),
        runtime_mode,
    }))
}

/// Sends a single request through the router
pub async fn call(router: Router, request: Request<Body>) -> Response {
    router
        .oneshot(request)
        .await
        .expect("router is infallible")
}
