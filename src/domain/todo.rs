use crate::domain::todo::driven_ports::{TodoReader, TodoWriter};
use crate::domain::todo::driving_ports::TodoError;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use tracing::info;
use validator::{Validate, ValidationError};

/// A stored todo item
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for a todo which has not been stored yet. Build it through [NewTodo::new] so
/// text fields are normalized before validation.
#[derive(Debug, Validate)]
#[cfg_attr(test, derive(Clone, PartialEq, Eq))]
pub struct NewTodo {
    #[validate(
        custom = "required_text",
        length(max = 200, message = "Todo titles must be 200 characters or fewer.")
    )]
    pub title: String,
    #[validate(length(max = 1000, message = "Todo descriptions must be 1000 characters or fewer."))]
    pub description: Option<String>,
    pub completed: bool,
}

impl NewTodo {
    /// Trims surrounding whitespace from the text fields. A missing title becomes an empty one,
    /// which then fails validation like any other blank title.
    pub fn new(title: Option<String>, description: Option<String>, completed: Option<bool>) -> Self {
        NewTodo {
            title: title.as_deref().map(trimmed).unwrap_or_default(),
            description: description.as_deref().map(trimmed),
            completed: completed.unwrap_or(false),
        }
    }
}

/// A partial change to a stored todo. Fields left as [None] keep their stored value.
#[derive(Debug, Default, Validate)]
#[cfg_attr(test, derive(Clone, PartialEq, Eq))]
pub struct TodoUpdate {
    #[validate(
        custom = "required_text",
        length(max = 200, message = "Todo titles must be 200 characters or fewer.")
    )]
    pub title: Option<String>,
    #[validate(length(max = 1000, message = "Todo descriptions must be 1000 characters or fewer."))]
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl TodoUpdate {
    pub fn new(title: Option<String>, description: Option<String>, completed: Option<bool>) -> Self {
        TodoUpdate {
            title: title.as_deref().map(trimmed),
            description: description.as_deref().map(trimmed),
            completed,
        }
    }
}

fn trimmed(text: &str) -> String {
    text.trim().to_owned()
}

fn required_text(text: &str) -> Result<(), ValidationError> {
    if !text.is_empty() {
        return Ok(());
    }

    let mut error = ValidationError::new("required");
    error.message = Some(Cow::from("A todo title is required."));
    Err(error)
}

pub mod driven_ports {
    use super::*;

    pub trait TodoReader {
        /// Every stored todo, most recently created first
        async fn all_todos(
            &self,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<Vec<Todo>, anyhow::Error>;
        async fn todo_by_id(
            &self,
            todo_id: &str,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error>;
    }

    pub trait TodoWriter {
        /// Stores a new todo, assigning its ID and timestamps
        async fn create_todo(
            &self,
            new_todo: &NewTodo,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<Todo, anyhow::Error>;

        /// Merges the update into the stored todo and refreshes its update timestamp. Produces
        /// [None] when no todo has the given ID.
        async fn update_todo(
            &self,
            todo_id: &str,
            update: &TodoUpdate,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error>;

        /// Removes a todo, reporting whether anything was actually removed
        async fn delete_todo(
            &self,
            todo_id: &str,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;
    use validator::ValidationErrors;

    #[derive(Debug, Error)]
    pub enum TodoError {
        #[error("the submitted todo was invalid: {0}")]
        Invalid(#[from] ValidationErrors),
        #[error("the requested todo does not exist")]
        NotFound,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait TodoPort {
        async fn todos(
            &self,
            ext_cxn: &impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
        ) -> Result<Vec<Todo>, TodoError>;
        async fn todo_by_id(
            &self,
            todo_id: &str,
            ext_cxn: &impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
        ) -> Result<Todo, TodoError>;
        async fn create_todo(
            &self,
            new_todo: &NewTodo,
            ext_cxn: &impl ExternalConnectivity,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Todo, TodoError>;
        async fn update_todo(
            &self,
            todo_id: &str,
            update: &TodoUpdate,
            ext_cxn: &impl ExternalConnectivity,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Todo, TodoError>;
        async fn delete_todo(
            &self,
            todo_id: &str,
            ext_cxn: &impl ExternalConnectivity,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<(), TodoError>;
    }
}

pub struct TodoService {}

impl driving_ports::TodoPort for TodoService {
    async fn todos(
        &self,
        ext_cxn: &impl ExternalConnectivity,
        todo_read: &impl TodoReader,
    ) -> Result<Vec<Todo>, TodoError> {
        let todos = todo_read
            .all_todos(ext_cxn)
            .await
            .context("listing todos")?;

        Ok(todos)
    }

    async fn todo_by_id(
        &self,
        todo_id: &str,
        ext_cxn: &impl ExternalConnectivity,
        todo_read: &impl TodoReader,
    ) -> Result<Todo, TodoError> {
        todo_read
            .todo_by_id(todo_id, ext_cxn)
            .await
            .context("fetching a todo")?
            .ok_or(TodoError::NotFound)
    }

    async fn create_todo(
        &self,
        new_todo: &NewTodo,
        ext_cxn: &impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<Todo, TodoError> {
        new_todo.validate()?;

        let created = todo_write
            .create_todo(new_todo, ext_cxn)
            .await
            .context("creating a todo")?;
        info!(todo_id = %created.id, "created todo");

        Ok(created)
    }

    async fn update_todo(
        &self,
        todo_id: &str,
        update: &TodoUpdate,
        ext_cxn: &impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<Todo, TodoError> {
        update.validate()?;

        todo_write
            .update_todo(todo_id, update, ext_cxn)
            .await
            .context("updating a todo")?
            .ok_or(TodoError::NotFound)
    }

    async fn delete_todo(
        &self,
        todo_id: &str,
        ext_cxn: &impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<(), TodoError> {
        let removed = todo_write
            .delete_todo(todo_id, ext_cxn)
            .await
            .context("deleting a todo")?;

        if !removed {
            return Err(TodoError::NotFound);
        }
        info!(todo_id, "deleted todo");
        Ok(())
    }
}


#[cfg(test)]
pub mod test_util {
    use super::*;
    use crate::domain::test_util::{Connectivity, FakeImplementation};
    use chrono::TimeDelta;
    use std::sync::{Mutex, RwLock};

    /// Produces the ID [InMemoryTodoPersistence] assigns to its nth stored todo (starting at 1)
    pub fn in_memory_id(position: u32) -> String {
        format!("{position:024x}")
    }

    /// A timestamp comfortably in the past, used for todos seeded into fakes
    pub fn seeded_timestamp() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).expect("seed timestamp out of range")
    }

    pub fn todo_from_new(id: String, new_todo: &NewTodo, timestamp: DateTime<Utc>) -> Todo {
        Todo {
            id,
            title: new_todo.title.clone(),
            description: new_todo.description.clone(),
            completed: new_todo.completed,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    pub struct InMemoryTodoPersistence {
        pub todos: Vec<Todo>,
        pub connected: Connectivity,
        highest_todo_id: u32,
    }

    impl InMemoryTodoPersistence {
        pub fn new() -> InMemoryTodoPersistence {
            InMemoryTodoPersistence {
                todos: Vec::new(),
                connected: Connectivity::Connected,
                highest_todo_id: 0,
            }
        }

        /// Seeds the store with todos created one second apart, starting at [seeded_timestamp]
        pub fn new_with_todos(todos: &[NewTodo]) -> InMemoryTodoPersistence {
            InMemoryTodoPersistence {
                todos: todos
                    .iter()
                    .enumerate()
                    .map(|(index, new_todo)| {
                        let created_at = seeded_timestamp() + TimeDelta::seconds(index as i64);
                        todo_from_new(in_memory_id(index as u32 + 1), new_todo, created_at)
                    })
                    .collect(),
                connected: Connectivity::Connected,
                highest_todo_id: todos.len() as u32,
            }
        }

        pub fn new_locked() -> RwLock<InMemoryTodoPersistence> {
            RwLock::new(Self::new())
        }
    }

    impl driven_ports::TodoReader for RwLock<InMemoryTodoPersistence> {
        async fn all_todos(
            &self,
            _ext_cxn: &impl ExternalConnectivity,
        ) -> Result<Vec<Todo>, anyhow::Error> {
            let persistence = self.read().expect("todo persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            let mut todos = persistence.todos.clone();
            todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(todos)
        }

        async fn todo_by_id(
            &self,
            todo_id: &str,
            _ext_cxn: &impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error> {
            let persistence = self.read().expect("todo persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            Ok(persistence
                .todos
                .iter()
                .find(|todo| todo.id == todo_id)
                .cloned())
        }
    }

    impl driven_ports::TodoWriter for RwLock<InMemoryTodoPersistence> {
        async fn create_todo(
            &self,
            new_todo: &NewTodo,
            _ext_cxn: &impl ExternalConnectivity,
        ) -> Result<Todo, anyhow::Error> {
            let mut persistence = self.write().expect("todo persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            persistence.highest_todo_id += 1;
            let todo = todo_from_new(
                in_memory_id(persistence.highest_todo_id),
                new_todo,
                Utc::now(),
            );
            persistence.todos.push(todo.clone());
            Ok(todo)
        }

        async fn update_todo(
            &self,
            todo_id: &str,
            update: &TodoUpdate,
            _ext_cxn: &impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error> {
            let mut persistence = self.write().expect("todo persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            let Some(todo) = persistence.todos.iter_mut().find(|todo| todo.id == todo_id) else {
                return Ok(None);
            };
            if let Some(ref title) = update.title {
                todo.title = title.clone();
            }
            if let Some(ref description) = update.description {
                todo.description = Some(description.clone());
            }
            if let Some(completed) = update.completed {
                todo.completed = completed;
            }
            todo.updated_at = Utc::now();

            Ok(Some(todo.clone()))
        }

        async fn delete_todo(
            &self,
            todo_id: &str,
            _ext_cxn: &impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error> {
            let mut persistence = self.write().expect("todo persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            let stored_count = persistence.todos.len();
            persistence.todos.retain(|todo| todo.id != todo_id);
            Ok(persistence.todos.len() != stored_count)
        }
    }

    /// Driving port fake which records each call and returns canned results
    pub struct MockTodoService {
        pub todos_result: FakeImplementation<(), Result<Vec<Todo>, TodoError>>,
        pub todo_by_id_result: FakeImplementation<String, Result<Todo, TodoError>>,
        pub create_todo_result: FakeImplementation<NewTodo, Result<Todo, TodoError>>,
        pub update_todo_result: FakeImplementation<(String, TodoUpdate), Result<Todo, TodoError>>,
        pub delete_todo_result: FakeImplementation<String, Result<(), TodoError>>,
    }

    impl MockTodoService {
        pub fn new() -> MockTodoService {
            MockTodoService {
                todos_result: FakeImplementation::new(),
                todo_by_id_result: FakeImplementation::new(),
                create_todo_result: FakeImplementation::new(),
                update_todo_result: FakeImplementation::new(),
                delete_todo_result: FakeImplementation::new(),
            }
        }

        pub fn new_locked() -> Mutex<MockTodoService> {
            Mutex::new(Self::new())
        }
    }

    impl driving_ports::TodoPort for Mutex<MockTodoService> {
        async fn todos(
            &self,
            _ext_cxn: &impl ExternalConnectivity,
            _todo_read: &impl TodoReader,
        ) -> Result<Vec<Todo>, TodoError> {
            let mut locked_self = self.lock().expect("mock todo service mutex poisoned");
            locked_self.todos_result.save_arguments(());
            locked_self.todos_result.return_value()
        }

        async fn todo_by_id(
            &self,
            todo_id: &str,
            _ext_cxn: &impl ExternalConnectivity,
            _todo_read: &impl TodoReader,
        ) -> Result<Todo, TodoError> {
            let mut locked_self = self.lock().expect("mock todo service mutex poisoned");
            locked_self.todo_by_id_result.save_arguments(todo_id.to_owned());
            locked_self.todo_by_id_result.return_value()
        }

        async fn create_todo(
            &self,
            new_todo: &NewTodo,
            _ext_cxn: &impl ExternalConnectivity,
            _todo_write: &impl TodoWriter,
        ) -> Result<Todo, TodoError> {
            let mut locked_self = self.lock().expect("mock todo service mutex poisoned");
            locked_self.create_todo_result.save_arguments(new_todo.clone());
            locked_self.create_todo_result.return_value()
        }

        async fn update_todo(
            &self,
            todo_id: &str,
            update: &TodoUpdate,
            _ext_cxn: &impl ExternalConnectivity,
            _todo_write: &impl TodoWriter,
        ) -> Result<Todo, TodoError> {
            let mut locked_self = self.lock().expect("mock todo service mutex poisoned");
            locked_self
                .update_todo_result
                .save_arguments((todo_id.to_owned(), update.clone()));
            locked_self.update_todo_result.return_value()
        }

        async fn delete_todo(
            &self,
            todo_id: &str,
            _ext_cxn: &impl ExternalConnectivity,
            _todo_write: &impl TodoWriter,
        ) -> Result<(), TodoError> {
            let mut locked_self = self.lock().expect("mock todo service mutex poisoned");
            locked_self.delete_todo_result.save_arguments(todo_id.to_owned());
            locked_self.delete_todo_result.return_value()
        }
    }
}
