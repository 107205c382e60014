use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain;

/// DTO for creating a new todo via the API. A missing title is reported as a validation
/// failure rather than a malformed body.
#[derive(Debug, Deserialize, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct NewTodo {
    #[schema(example = "Buy milk", max_length = 200)]
    #[serde(default)]
    pub title: Option<String>,
    #[schema(example = "Two litres, semi-skimmed", max_length = 1000)]
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to false
    #[serde(default)]
    pub completed: Option<bool>,
}

impl From<NewTodo> for domain::todo::NewTodo {
    fn from(value: NewTodo) -> Self {
        domain::todo::NewTodo::new(value.title, value.description, value.completed)
    }
}

/// DTO for changing a todo via the API. Omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct UpdateTodo {
    #[schema(example = "Buy oat milk", max_length = 200)]
    #[serde(default)]
    pub title: Option<String>,
    #[schema(max_length = 1000)]
    #[serde(default)]
    pub description: Option<String>,
    #[schema(example = true)]
    #[serde(default)]
    pub completed: Option<bool>,
}

impl From<UpdateTodo> for domain::todo::TodoUpdate {
    fn from(value: UpdateTodo) -> Self {
        domain::todo::TodoUpdate::new(value.title, value.description, value.completed)
    }
}

/// DTO for a todo returned from the API
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    #[schema(example = "65f1c0ffee0000000000abcd")]
    pub id: String,
    #[schema(example = "Buy milk")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Two litres, semi-skimmed")]
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<domain::todo::Todo> for Todo {
    fn from(value: domain::todo::Todo) -> Self {
        Todo {
            id: value.id,
            title: value.title,
            description: value.description,
            completed: value.completed,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
