use crate::domain::todo::driven_ports::{TodoReader, TodoWriter};
use crate::domain::todo::driving_ports::TodoPort;
use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{BasicErrorResponse, Json, TodoErrorResponse};
use crate::{AppState, SharedData, api, domain, dto, persistence};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::{MethodRouter, get};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(list_todos, get_todo, create_todo, update_todo, delete_todo))]
/// Defines the OpenAPI documentation for the todo API
pub struct TodoApi;
/// Constant used to group todo endpoints in OpenAPI documentation
pub const TODO_API_GROUP: &str = "Todos";

/// Builds the todo router. Mounted under "/todos" by [crate::api::build_router].
pub fn todo_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route("/", todo_collection_routes())
        .route(
            "/:todo_id",
            get(
                |State(app_state): AppState, Path(todo_id): Path<String>| async move {
                    let todo_service = domain::todo::TodoService {};
                    let todo_reader = persistence::db_todo_driven_ports::DbTodoReader;

                    get_todo(&todo_id, &app_state.ext_cxn, &todo_service, &todo_reader).await
                },
            )
            .put(update_todo_handler)
            .patch(update_todo_handler)
            .delete(
                |State(app_state): AppState, Path(todo_id): Path<String>| async move {
                    let todo_service = domain::todo::TodoService {};
                    let todo_writer = persistence::db_todo_driven_ports::DbTodoWriter;

                    delete_todo(&todo_id, &app_state.ext_cxn, &todo_service, &todo_writer).await
                },
            )
            .fallback(api::route_not_found),
        )
}

/// Listing and creation. Also served on "/todos/" by [crate::api::build_router].
pub fn todo_collection_routes() -> MethodRouter<Arc<SharedData>> {
    get(|State(app_state): AppState| async move {
        let todo_service = domain::todo::TodoService {};
        let todo_reader = persistence::db_todo_driven_ports::DbTodoReader;

        list_todos(&app_state.ext_cxn, &todo_service, &todo_reader).await
    })
    .post(
        |State(app_state): AppState, Json(new_todo): Json<dto::NewTodo>| async move {
            let todo_service = domain::todo::TodoService {};
            let todo_writer = persistence::db_todo_driven_ports::DbTodoWriter;

            create_todo(new_todo, &app_state.ext_cxn, &todo_service, &todo_writer).await
        },
    )
    .fallback(api::route_not_found)
}

async fn update_todo_handler(
    State(app_state): AppState,
    Path(todo_id): Path<String>,
    Json(update): Json<dto::UpdateTodo>,
) -> Result<Json<dto::Todo>, ErrorResponse> {
    let todo_service = domain::todo::TodoService {};
    let todo_writer = persistence::db_todo_driven_ports::DbTodoWriter;

    update_todo(&todo_id, update, &app_state.ext_cxn, &todo_service, &todo_writer).await
}

#[utoipa::path(
    get,
    path = "/todos",
    tag = TODO_API_GROUP,
    responses(
        (status = 200, description = "Every todo, most recently created first", body = [dto::Todo]),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Lists all todos
async fn list_todos(
    ext_cxn: &impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_reader: &impl TodoReader,
) -> Result<Json<Vec<dto::Todo>>, ErrorResponse> {
    info!("Listing todos");
    let todos = todo_service
        .todos(ext_cxn, todo_reader)
        .await
        .map_err(TodoErrorResponse::from)?;

    Ok(Json(todos.into_iter().map(dto::Todo::from).collect()))
}

#[utoipa::path(
    get,
    path = "/todos/{todo_id}",
    tag = TODO_API_GROUP,
    params(("todo_id" = String, Path, description = "ID of the todo")),
    responses(
        (status = 200, description = "The requested todo", body = dto::Todo),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Fetches a single todo
async fn get_todo(
    todo_id: &str,
    ext_cxn: &impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_reader: &impl TodoReader,
) -> Result<Json<dto::Todo>, ErrorResponse> {
    info!("Fetching todo {todo_id}");
    let todo = todo_service
        .todo_by_id(todo_id, ext_cxn, todo_reader)
        .await
        .map_err(TodoErrorResponse::from)?;

    Ok(Json(dto::Todo::from(todo)))
}

#[utoipa::path(
    post,
    path = "/todos",
    tag = TODO_API_GROUP,
    request_body = dto::NewTodo,
    responses(
        (status = 201, description = "Todo created", body = dto::Todo),
        (status = 400, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Creates a todo
async fn create_todo(
    new_todo: dto::NewTodo,
    ext_cxn: &impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_writer: &impl TodoWriter,
) -> Result<(StatusCode, Json<dto::Todo>), ErrorResponse> {
    info!("Creating todo");
    let domain_todo = domain::todo::NewTodo::from(new_todo);
    let created = todo_service
        .create_todo(&domain_todo, ext_cxn, todo_writer)
        .await
        .map_err(TodoErrorResponse::from)?;

    Ok((StatusCode::CREATED, Json(dto::Todo::from(created))))
}

#[utoipa::path(
    put,
    path = "/todos/{todo_id}",
    tag = TODO_API_GROUP,
    params(("todo_id" = String, Path, description = "ID of the todo")),
    request_body = dto::UpdateTodo,
    responses(
        (status = 200, description = "The todo after the update was applied", body = dto::Todo),
        (status = 400, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Merges changes into a todo. Also served on PATCH.
async fn update_todo(
    todo_id: &str,
    update: dto::UpdateTodo,
    ext_cxn: &impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_writer: &impl TodoWriter,
) -> Result<Json<dto::Todo>, ErrorResponse> {
    info!("Updating todo {todo_id}");
    let domain_update = domain::todo::TodoUpdate::from(update);
    let updated = todo_service
        .update_todo(todo_id, &domain_update, ext_cxn, todo_writer)
        .await
        .map_err(TodoErrorResponse::from)?;

    Ok(Json(dto::Todo::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/todos/{todo_id}",
    tag = TODO_API_GROUP,
    params(("todo_id" = String, Path, description = "ID of the todo")),
    responses(
        (status = 204, description = "Todo deleted"),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Deletes a todo
async fn delete_todo(
    todo_id: &str,
    ext_cxn: &impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_writer: &impl TodoWriter,
) -> Result<StatusCode, ErrorResponse> {
    info!("Deleting todo {todo_id}");
    todo_service
        .delete_todo(todo_id, ext_cxn, todo_writer)
        .await
        .map_err(TodoErrorResponse::from)?;

    Ok(StatusCode::NO_CONTENT)
}
