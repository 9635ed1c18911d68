pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod queue;
pub mod redis_client;
pub mod services;
pub mod state;
pub mod store;
pub mod websocket;
