use crate::dto;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::DOCS_PATH;

/// Path the generated OpenAPI document is served from
pub const OPENAPI_DOCUMENT_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(info(
    title = "Todo Service API",
    description = "Create, list, update and delete todo items stored in MongoDB"
))]
struct TodoServiceApi;

/// Constructs the route on the API that renders the swagger UI and returns the OpenAPI schema.
/// Merges in OpenAPI definitions from other locations in the app, such as the [dto] package
/// and submodules of [api][crate::api]
pub fn build_documentation() -> SwaggerUi {
    let mut api_docs = TodoServiceApi::openapi();
    api_docs.merge(dto::OpenApiSchemas::openapi());
    api_docs.merge(super::RootApi::openapi());
    api_docs.merge(super::todo::TodoApi::openapi());

    SwaggerUi::new(DOCS_PATH).url(OPENAPI_DOCUMENT_PATH, api_docs)
}
