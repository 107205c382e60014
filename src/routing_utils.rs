use std::any::Any;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_macros::FromRequest;
use serde::Serialize;
use tracing::error;
use utoipa::openapi::{RefOr, Schema};
use utoipa::{openapi, ToResponse, ToSchema};
use validator::ValidationErrors;

use crate::app_env::RuntimeMode;
use crate::domain::todo::driving_ports::TodoError;

const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred while processing the request.";

/// Contains diagnostic information about an API failure
#[derive(Serialize, Debug, ToResponse)]
#[response(examples(
    ("Not Found" = (
        summary = "Todo could not be found (404)",
        value = json!({
            "error": "The requested todo could not be found."
        })
    )),

    ("Internal Failure" = (
        summary = "Something unexpected went wrong inside the server (500)",
        value = json!({
            "error": "An internal error occurred while processing the request.",
            "stack": "listing todos\n\nCaused by:\n    Server selection timeout: No available servers."
        })
    )),

    ("Invalid Input" = (
        summary = "Invalid request body was passed (400)",
        value = json!({
            "error": "Submitted todo data was invalid.",
            "details": {
                "title": [
                    {
                        "code": "required",
                        "message": "A todo title is required.",
                        "params": {
                            "value": ""
                        }
                    }
                ]
            }
        })
    )),

    ("Malformed JSON" = (
        summary = "Invalid JSON passed to server (400)",
        value = json!({
            "error": "The request body contained malformed or unreadable JSON.",
            "details": "Failed to parse the request body as JSON: EOF while parsing an object at line 4 column 0"
        })
    ))
))]
pub struct BasicErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<ExtraInfo>,
    /// Cause chain of the failure, only present when the service runs in development mode
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<String>,
}

impl BasicErrorResponse {
    fn message(error: impl Into<String>) -> Self {
        BasicErrorResponse {
            error: error.into(),
            details: None,
            stack: None,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(untagged)]
pub enum ExtraInfo {
    ValidationIssues(ValidationErrorSchema),
    Message(String),
}

/// Stand-in OpenAPI schema for [ValidationErrors] which just provides an empty object
#[derive(Serialize, Debug)]
#[serde(transparent)]
pub struct ValidationErrorSchema(ValidationErrors);

impl<'schem> ToSchema<'schem> for ValidationErrorSchema {
    fn schema() -> (&'schem str, RefOr<Schema>) {
        (
            "ValidationErrorSchema",
            openapi::ObjectBuilder::new().into(),
        )
    }
}

/// Response type that wraps validation errors and turns them into [BasicErrorResponse]s
pub struct ValidationErrorResponse(ValidationErrors);

impl IntoResponse for ValidationErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(BasicErrorResponse {
                error: "Submitted todo data was invalid.".into(),
                details: Some(ExtraInfo::ValidationIssues(ValidationErrorSchema(self.0))),
                stack: None,
            }),
        )
            .into_response()
    }
}

impl From<ValidationErrors> for ValidationErrorResponse {
    fn from(value: ValidationErrors) -> Self {
        Self(value)
    }
}

/// Details of a failure nobody anticipated. The response carrying it gets its body from
/// [render_unhandled_errors], which knows whether the cause chain may be shown.
#[derive(Clone, Debug)]
pub struct UnhandledError {
    pub stack: String,
}

/// Response type for unexpected failures (500). Rendered by [render_unhandled_errors].
pub struct GenericErrorResponse(pub anyhow::Error);

impl IntoResponse for GenericErrorResponse {
    fn into_response(self) -> Response {
        unhandled_error_response(format!("{:?}", self.0))
    }
}

fn unhandled_error_response(stack: String) -> Response {
    let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
    response.extensions_mut().insert(UnhandledError { stack });
    response
}

/// Response type translating failures of the todo driving port into HTTP responses
pub struct TodoErrorResponse(TodoError);

impl IntoResponse for TodoErrorResponse {
    fn into_response(self) -> Response {
        match self.0 {
            TodoError::Invalid(validation_errors) => {
                ValidationErrorResponse(validation_errors).into_response()
            }
            TodoError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(BasicErrorResponse::message(
                    "The requested todo could not be found.",
                )),
            )
                .into_response(),
            TodoError::PortError(cause) => GenericErrorResponse(cause).into_response(),
        }
    }
}

impl From<TodoError> for TodoErrorResponse {
    fn from(value: TodoError) -> Self {
        Self(value)
    }
}

/// Last stop for failures that weren't translated into a specific response where they happened.
/// Logs them and writes the `{error, stack?}` body, exposing the cause chain only in development.
pub async fn render_unhandled_errors(
    State(runtime_mode): State<RuntimeMode>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let Some(failure) = response.extensions_mut().remove::<UnhandledError>() else {
        return response;
    };

    error!("Unhandled failure while processing request: {}", failure.stack);
    let body = BasicErrorResponse {
        error: INTERNAL_ERROR_MESSAGE.into(),
        details: None,
        stack: runtime_mode
            .exposes_error_stack()
            .then_some(failure.stack),
    };

    (response.status(), Json(body)).into_response()
}

/// Converts a panic inside a handler into an unhandled error response so the panic never
/// escapes the request
pub fn panic_response(panic_payload: Box<dyn Any + Send + 'static>) -> Response {
    let panic_message = if let Some(message) = panic_payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic_payload.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "handler panicked with a non-string payload".to_owned()
    };

    unhandled_error_response(format!("handler panicked: {panic_message}"))
}

/// Wrapper for [axum::Json] which customizes the error response to use our
/// data structure for API errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JsonErrorResponse))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Response type representing JSON parse errors. Keeps the status of the underlying rejection
/// (413 for bodies over the size limit, 415 for a missing JSON content type), except that JSON
/// of the wrong shape is a plain 400 like any other bad input.
pub struct JsonErrorResponse {
    status: StatusCode,
    parse_problem: String,
}

impl From<JsonRejection> for JsonErrorResponse {
    fn from(value: JsonRejection) -> Self {
        let status = match value {
            JsonRejection::JsonDataError(_) => StatusCode::BAD_REQUEST,
            ref other => other.status(),
        };

        JsonErrorResponse {
            status,
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for JsonErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            axum::Json(BasicErrorResponse {
                error: "The request body contained malformed or unreadable JSON.".into(),
                details: Some(ExtraInfo::Message(self.parse_problem)),
                stack: None,
            }),
        )
            .into_response()
    }
}
