use axum::extract::State;
use std::sync::Arc;

use crate::app_env::RuntimeMode;

pub mod api;
pub mod app_env;
pub mod db;
pub mod domain;
pub mod dto;
pub mod external_connections;
pub mod logging;
pub mod persistence;
pub mod routing_utils;

/// Data shared by every request handler
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
    pub runtime_mode: RuntimeMode,
}

/// Shorthand for the state extractor handlers receive
pub type AppState = State<Arc<SharedData>>;
