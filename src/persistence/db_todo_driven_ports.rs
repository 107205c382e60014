use crate::domain;
use crate::domain::todo::{NewTodo, Todo, TodoUpdate};
use crate::external_connections::ExternalConnectivity;
use anyhow::{Context, Error};
use futures::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, doc};
use mongodb::options::ReturnDocument;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Shape of a todo as it is stored in the document database
#[derive(Debug, Serialize, Deserialize)]
struct TodoDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    completed: bool,
    #[serde(rename = "createdAt")]
    created_at: bson::DateTime,
    #[serde(rename = "updatedAt")]
    updated_at: bson::DateTime,
}

impl From<TodoDocument> for domain::todo::Todo {
    fn from(value: TodoDocument) -> Self {
        Todo {
            id: value.id.to_hex(),
            title: value.title,
            description: value.description,
            completed: value.completed,
            created_at: value.created_at.to_chrono(),
            updated_at: value.updated_at.to_chrono(),
        }
    }
}

fn todo_collection(
    ext_cxn: &impl ExternalConnectivity,
) -> Result<Collection<TodoDocument>, Error> {
    let db = ext_cxn
        .database()
        .context("acquiring the todo database")?;

    Ok(db.collection(super::TODO_COLLECTION))
}

/// IDs which aren't valid ObjectIds can't match any stored todo
fn parse_todo_id(todo_id: &str) -> Option<ObjectId> {
    match ObjectId::parse_str(todo_id) {
        Ok(id) => Some(id),
        Err(parse_err) => {
            debug!("Todo ID {todo_id:?} is not an ObjectId: {parse_err}");
            None
        }
    }
}

pub struct DbTodoReader;

impl domain::todo::driven_ports::TodoReader for DbTodoReader {
    async fn all_todos(&self, ext_cxn: &impl ExternalConnectivity) -> Result<Vec<Todo>, Error> {
        let collection = todo_collection(ext_cxn)?;

        let todos: Vec<Todo> = collection
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await
            .context("trying to query all todos")?
            .try_collect::<Vec<TodoDocument>>()
            .await
            .context("trying to read todos from the result cursor")?
            .into_iter()
            .map(Todo::from)
            .collect();

        Ok(todos)
    }

    async fn todo_by_id(
        &self,
        todo_id: &str,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<Option<Todo>, Error> {
        let Some(object_id) = parse_todo_id(todo_id) else {
            return Ok(None);
        };
        let collection = todo_collection(ext_cxn)?;

        let todo = collection
            .find_one(doc! { "_id": object_id })
            .await
            .context("trying to fetch a todo by ID")?
            .map(Todo::from);

        Ok(todo)
    }
}

pub struct DbTodoWriter;

impl domain::todo::driven_ports::TodoWriter for DbTodoWriter {
    async fn create_todo(
        &self,
        new_todo: &NewTodo,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<Todo, Error> {
        let collection = todo_collection(ext_cxn)?;
        let now = bson::DateTime::now();
        let document = TodoDocument {
            id: ObjectId::new(),
            title: new_todo.title.clone(),
            description: new_todo.description.clone(),
            completed: new_todo.completed,
            created_at: now,
            updated_at: now,
        };

        collection
            .insert_one(&document)
            .await
            .context("trying to insert a new todo into the database")?;

        Ok(Todo::from(document))
    }

    async fn update_todo(
        &self,
        todo_id: &str,
        update: &TodoUpdate,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<Option<Todo>, Error> {
        let Some(object_id) = parse_todo_id(todo_id) else {
            return Ok(None);
        };
        let collection = todo_collection(ext_cxn)?;

        let mut changes = doc! { "updatedAt": bson::DateTime::now() };
        if let Some(ref title) = update.title {
            changes.insert("title", title.as_str());
        }
        if let Some(ref description) = update.description {
            changes.insert("description", description.as_str());
        }
        if let Some(completed) = update.completed {
            changes.insert("completed", completed);
        }

        let updated = collection
            .find_one_and_update(doc! { "_id": object_id }, doc! { "$set": changes })
            .return_document(ReturnDocument::After)
            .await
            .context("trying to update a todo in the database")?
            .map(Todo::from);

        Ok(updated)
    }

    async fn delete_todo(
        &self,
        todo_id: &str,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<bool, Error> {
        let Some(object_id) = parse_todo_id(todo_id) else {
            return Ok(false);
        };
        let collection = todo_collection(ext_cxn)?;

        let delete_result = collection
            .delete_one(doc! { "_id": object_id })
            .await
            .context("trying to remove a todo from the database")?;

        Ok(delete_result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn document_converts_to_domain_todo() {
        let id = ObjectId::parse_str("65f1c0ffee0000000000abcd").expect("valid object id");
        let created = Utc
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        let document = TodoDocument {
            id,
            title: "Feed the cat".to_owned(),
            description: None,
            completed: true,
            created_at: bson::DateTime::from_chrono(created),
            updated_at: bson::DateTime::from_chrono(created),
        };

        let todo = Todo::from(document);

        assert_eq!("65f1c0ffee0000000000abcd", todo.id);
        assert_eq!("Feed the cat", todo.title);
        assert!(todo.completed);
        assert_eq!(created, todo.created_at);
    }

    #[test]
    fn missing_optional_fields_get_defaults() {
        let stored = doc! {
            "_id": ObjectId::new(),
            "title": "Legacy todo",
            "createdAt": bson::DateTime::now(),
            "updatedAt": bson::DateTime::now(),
        };

        let document: TodoDocument =
            bson::from_document(stored).expect("stored todo should deserialize");

        assert!(!document.completed);
        assert!(document.description.is_none());
    }

    #[test]
    fn absent_description_is_not_stored() {
        let document = TodoDocument {
            id: ObjectId::new(),
            title: "No details".to_owned(),
            description: None,
            completed: false,
            created_at: bson::DateTime::now(),
            updated_at: bson::DateTime::now(),
        };

        let stored = bson::to_document(&document).expect("todo should serialize");

        assert!(!stored.contains_key("description"));
        assert!(stored.contains_key("createdAt"));
    }

    #[test]
    fn malformed_ids_match_nothing() {
        assert!(parse_todo_id("not-an-object-id").is_none());
        assert!(parse_todo_id("65f1c0ffee0000000000abcd").is_some());
    }
}
