use anyhow::Context;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use std::time::Duration;
use tracing::info;

/// Database used when the connection string doesn't name one
pub const DEFAULT_DATABASE: &str = "todo";
const APP_NAME: &str = "todo-service";
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(45);

/// Builds a pooled MongoDB client from a connection string and returns a handle to the database
/// named in the string's path. No connection is made until the handle is first used.
pub async fn connect_mongodb(uri: &str) -> Result<Database, anyhow::Error> {
    let mut options = ClientOptions::parse(uri)
        .await
        .context("parsing the MongoDB connection string")?;
    options.app_name = Some(APP_NAME.to_owned());
    options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);
    options.connect_timeout = Some(CONNECT_TIMEOUT);

    let client = Client::with_options(options).context("building the MongoDB client")?;
    let db = client
        .default_database()
        .unwrap_or_else(|| client.database(DEFAULT_DATABASE));

    Ok(db)
}

/// Connects to MongoDB and waits for the deployment to answer a ping. Fails if no server can
/// be selected within the server selection timeout.
pub async fn connect_and_verify(uri: &str) -> Result<Database, anyhow::Error> {
    let db = connect_mongodb(uri).await?;
    db.run_command(doc! { "ping": 1 })
        .await
        .with_context(|| format!("pinging MongoDB database \"{}\"", db.name()))?;
    info!(database = db.name(), "MongoDB connection established");

    Ok(db)
}
