use mongodb::Database;

/// Provides driven adapters with access to the systems outside this service. Handlers receive
/// it explicitly so domain logic never reaches for ambient connection state.
pub trait ExternalConnectivity: Sync {
    /// Handle to the document database holding todo documents
    fn database(&self) -> Result<&Database, anyhow::Error>;
}
