pub mod db_todo_driven_ports;

use crate::external_connections;
use mongodb::Database;

/// Name of the collection todo documents are stored in
pub const TODO_COLLECTION: &str = "todos";

/// Data structure which owns clients for connecting to external systems.
/// Allows business logic to be agnostic of the external systems it communicates with
/// so driven adapters can easily be swapped out for other implementations
#[derive(Clone)]
pub struct ExternalConnectivity {
    db: Database,
}

impl ExternalConnectivity {
    /// Wraps a database handle. The handle is pooled internally, so clones are cheap and share
    /// connections.
    pub fn new(db: Database) -> Self {
        ExternalConnectivity { db }
    }
}

impl external_connections::ExternalConnectivity for ExternalConnectivity {
    fn database(&self) -> Result<&Database, anyhow::Error> {
        Ok(&self.db)
    }
}
