use super::error::{SqliteDaoError, SqliteResult};

/// Runtime configuration describing how to open the SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Connection URL, e.g. `sqlite://game-shelf.db?mode=rwc`.
    pub database_url: String,
}

impl SqliteConfig {
    /// Construct a configuration from an explicit connection URL.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// Build a configuration by reading the expected environment variable.
    pub fn from_env() -> SqliteResult<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| SqliteDaoError::MissingEnvVar { var: "DATABASE_URL" })?;
        Ok(Self::new(database_url))
    }
}
