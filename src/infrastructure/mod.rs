//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - Configuration loading (config)
//! - Database connection and migrations (db)
//! - Repository implementations (repositories)
//! - Session store and middleware (session)
//! - HTTP server setup (server)
//! - Application state (state)

pub mod config;
pub mod db;
pub mod repositories;
pub mod server;
pub mod session;
pub mod state;

pub use repositories::*;
pub use state::AppState;
