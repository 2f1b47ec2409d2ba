//! Error types shared by the SQLite storage implementation.

use thiserror::Error;
use uuid::Uuid;

use crate::dao::models::GameId;

/// Convenient result alias returning [`SqliteDaoError`] failures.
pub type SqliteResult<T> = Result<T, SqliteDaoError>;

/// Failures that can occur while interacting with the SQLite database.
#[derive(Debug, Error)]
pub enum SqliteDaoError {
    /// Required environment variable is missing.
    #[error("missing SQLite environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the variable that was not set.
        var: &'static str,
    },
    /// Opening the database pool failed.
    #[error("failed to open SQLite database at `{url}`")]
    Connect {
        /// Connection URL that was attempted.
        url: String,
        #[source]
        source: sqlx::Error,
    },
    /// Creating the games table or its indexes failed.
    #[error("failed to ensure the games schema")]
    EnsureSchema {
        #[source]
        source: sqlx::Error,
    },
    /// A transaction could not be opened.
    #[error("failed to begin a storage transaction")]
    BeginTransaction {
        #[source]
        source: sqlx::Error,
    },
    /// A transaction could not be committed.
    #[error("failed to commit a storage transaction")]
    CommitTransaction {
        #[source]
        source: sqlx::Error,
    },
    /// Inserting a new record failed.
    #[error("failed to insert game for owner `{owner}`")]
    InsertGame {
        /// Owner whose insert was rejected.
        owner: Uuid,
        #[source]
        source: sqlx::Error,
    },
    /// Querying an owner's records failed.
    #[error("failed to load games for owner `{owner}`")]
    ListGames {
        /// Owner whose records could not be read.
        owner: Uuid,
        #[source]
        source: sqlx::Error,
    },
    /// Writing back an updated record failed.
    #[error("failed to update game `{id}`")]
    UpdateGame {
        /// Record that could not be written.
        id: GameId,
        #[source]
        source: sqlx::Error,
    },
    /// Removing a record failed.
    #[error("failed to delete game `{id}`")]
    DeleteGame {
        /// Record that could not be removed.
        id: GameId,
        #[source]
        source: sqlx::Error,
    },
    /// A column could not be read from a fetched row.
    #[error("failed to decode a stored game row")]
    DecodeRow {
        #[source]
        source: sqlx::Error,
    },
    /// A fetched row carries a value the model cannot represent.
    #[error("stored game row is invalid: {reason}")]
    InvalidRow {
        /// What made the row unusable.
        reason: &'static str,
    },
    /// The connectivity probe failed.
    #[error("SQLite health ping failed")]
    HealthPing {
        #[source]
        source: sqlx::Error,
    },
}
