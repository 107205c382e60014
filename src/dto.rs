pub mod todo;

use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::routing_utils::{BasicErrorResponse, ExtraInfo, ValidationErrorSchema};

pub use todo::*;

/// Registers the API's data transfer objects with the OpenAPI document
#[derive(OpenApi)]
#[openapi(components(
    schemas(
        Todo,
        NewTodo,
        UpdateTodo,
        ServiceInfo,
        EndpointDirectory,
        RouteNotFound,
        ExtraInfo,
        ValidationErrorSchema
    ),
    responses(BasicErrorResponse)
))]
pub struct OpenApiSchemas;

/// Status information returned from the root of the API
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize, Debug))]
pub struct ServiceInfo {
    #[schema(example = "The todo service is running.")]
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub endpoints: EndpointDirectory,
}

/// Paths of the resources the API exposes
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize, Debug))]
pub struct EndpointDirectory {
    #[schema(example = "/todos")]
    pub todos: String,
    #[schema(example = "/swagger-ui")]
    pub docs: String,
}

/// Body returned when no route matches the requested path
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize, Debug))]
pub struct RouteNotFound {
    #[schema(example = "The requested path could not be found.")]
    pub error: String,
    #[schema(example = "/todoz")]
    pub path: String,
}
