//! Environment-driven application configuration.

use std::env;

/// Port the HTTP listener binds when none is configured.
const DEFAULT_PORT: u16 = 8080;
/// Origin allowed by CORS when none is configured.
const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:3000";

/// Storage backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Relational SQLite backend (default).
    Sqlite,
    /// Ephemeral in-memory backend; records vanish on restart.
    Memory,
}

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port for the HTTP listener.
    pub port: u16,
    /// Origins allowed to call the API from a browser.
    pub frontend_origins: Vec<String>,
    /// Which storage backend the supervisor should connect.
    pub store: StoreBackend,
}

impl AppConfig {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .or_else(|_| env::var("SERVER_PORT"))
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let frontend_origins = env::var("FRONTEND_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_FRONTEND_ORIGIN.into())
            .split(',')
            .map(|origin| origin.trim().to_owned())
            .filter(|origin| !origin.is_empty())
            .collect();

        let store = match env::var("GAME_STORE").as_deref() {
            Ok("memory") => StoreBackend::Memory,
            _ => StoreBackend::Sqlite,
        };

        Self {
            port,
            frontend_origins,
            store,
        }
    }
}
