use axum::extract::State;
use std::sync::Arc;

pub mod api;
pub mod app_env;
pub mod db;
pub mod domain;
pub mod dto;
pub mod external_connections;
pub mod logging;
pub mod persistence;
pub mod routing_utils;
pub mod session;
pub mod views;

/// Everything a request handler may need, shared by all requests
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
    pub config: app_env::AppConfig,
}

pub type AppState = State<Arc<SharedData>>;
