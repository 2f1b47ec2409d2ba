use futures::future::BoxFuture;
use sqlx::{
    Pool, Row, Sqlite, Transaction,
    sqlite::{SqlitePoolOptions, SqliteRow},
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    config::SqliteConfig,
    error::{SqliteDaoError, SqliteResult},
};
use crate::{
    dao::{
        game_store::{DeleteOutcome, GameStore},
        models::{GameChanges, GameEntity, GameId, GameStatus, NewGameEntity},
        storage::StorageResult,
    },
    library::now_playing,
};

const MAX_CONNECTIONS: u32 = 5;

const CREATE_GAMES_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS games (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id TEXT NOT NULL,
    title TEXT NOT NULL,
    platform TEXT NOT NULL,
    status TEXT NOT NULL,
    cover_art_url TEXT,
    hours_played REAL NOT NULL,
    estimated_hours REAL NOT NULL,
    completion_percent INTEGER NOT NULL,
    is_current INTEGER NOT NULL,
    last_now_playing_at INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
)";

const CREATE_INDEXES: [&str; 3] = [
    "CREATE INDEX IF NOT EXISTS idx_games_owner ON games (owner_id)",
    "CREATE INDEX IF NOT EXISTS idx_games_owner_current ON games (owner_id, is_current)",
    "CREATE INDEX IF NOT EXISTS idx_games_owner_recency ON games (owner_id, last_now_playing_at)",
];

const INSERT_GAME: &str = "\
INSERT INTO games (owner_id, title, platform, status, cover_art_url, hours_played, \
estimated_hours, completion_percent, is_current, last_now_playing_at, created_at, updated_at) \
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

const WRITE_GAME: &str = "\
UPDATE games SET title = ?, platform = ?, status = ?, cover_art_url = ?, hours_played = ?, \
estimated_hours = ?, completion_percent = ?, is_current = ?, last_now_playing_at = ?, \
updated_at = ? WHERE id = ?";

/// Ordering shared by the shelf listing tail, the `getCurrent` fallback, and
/// the replacement selection after a delete: most recently played first,
/// never-played last, newest id breaking ties.
const RECENCY_ORDER: &str = "last_now_playing_at DESC NULLS LAST, id DESC";

/// Storage backend persisting records to a SQLite table.
#[derive(Clone)]
pub struct SqliteGameStore {
    pool: Pool<Sqlite>,
}

impl SqliteGameStore {
    /// Open the database pool and ensure the schema is present.
    pub async fn connect(config: SqliteConfig) -> SqliteResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(&config.database_url)
            .await
            .map_err(|source| SqliteDaoError::Connect {
                url: config.database_url.clone(),
                source,
            })?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> SqliteResult<()> {
        sqlx::query(CREATE_GAMES_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|source| SqliteDaoError::EnsureSchema { source })?;

        for statement in CREATE_INDEXES {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|source| SqliteDaoError::EnsureSchema { source })?;
        }

        Ok(())
    }

    async fn insert(&self, game: NewGameEntity) -> SqliteResult<GameEntity> {
        let owner = game.owner_id;
        // Derive the stored defaults once and bind from the materialized
        // record so the row and the returned entity cannot drift apart.
        let mut entity = game.into_entity(0);

        let result = sqlx::query(INSERT_GAME)
            .bind(entity.owner_id.to_string())
            .bind(entity.title.as_str())
            .bind(entity.platform.as_str())
            .bind(entity.status.as_str())
            .bind(entity.cover_art_url.as_deref())
            .bind(entity.hours_played)
            .bind(entity.estimated_hours)
            .bind(i64::from(entity.completion_percent))
            .bind(entity.is_current)
            .bind(entity.last_now_playing_at.map(timestamp_nanos))
            .bind(timestamp_nanos(entity.created_at))
            .bind(timestamp_nanos(entity.updated_at))
            .execute(&self.pool)
            .await
            .map_err(|source| SqliteDaoError::InsertGame { owner, source })?;

        entity.id = result.last_insert_rowid();
        Ok(entity)
    }

    async fn list(&self, owner: Uuid) -> SqliteResult<Vec<GameEntity>> {
        let query = format!(
            "SELECT * FROM games WHERE owner_id = ? ORDER BY is_current DESC, {RECENCY_ORDER}"
        );
        let rows = sqlx::query(&query)
            .bind(owner.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|source| SqliteDaoError::ListGames { owner, source })?;

        rows.iter().map(game_from_row).collect()
    }

    async fn current(&self, owner: Uuid) -> SqliteResult<Option<GameEntity>> {
        let row = sqlx::query("SELECT * FROM games WHERE owner_id = ? AND is_current = 1")
            .bind(owner.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|source| SqliteDaoError::ListGames { owner, source })?;

        row.as_ref().map(game_from_row).transpose()
    }

    async fn most_recent(&self, owner: Uuid) -> SqliteResult<Option<GameEntity>> {
        let query =
            format!("SELECT * FROM games WHERE owner_id = ? ORDER BY {RECENCY_ORDER} LIMIT 1");
        let row = sqlx::query(&query)
            .bind(owner.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|source| SqliteDaoError::ListGames { owner, source })?;

        row.as_ref().map(game_from_row).transpose()
    }

    async fn update(
        &self,
        owner: Uuid,
        id: GameId,
        changes: GameChanges,
        at: OffsetDateTime,
    ) -> SqliteResult<Option<GameEntity>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|source| SqliteDaoError::BeginTransaction { source })?;

        let row = sqlx::query("SELECT * FROM games WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|source| SqliteDaoError::ListGames { owner, source })?;
        let Some(row) = row else {
            // Dropping the transaction rolls it back.
            return Ok(None);
        };
        let mut entity = game_from_row(&row)?;

        let promote = changes.apply(&mut entity);
        if promote {
            sqlx::query(
                "UPDATE games SET is_current = 0, updated_at = ? \
                 WHERE owner_id = ? AND is_current = 1 AND id <> ?",
            )
            .bind(timestamp_nanos(at))
            .bind(owner.to_string())
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|source| SqliteDaoError::UpdateGame { id, source })?;

            now_playing::apply_promotion(&mut entity, at);
        }

        entity.recalc_completion();
        entity.updated_at = at;
        write_row(&mut tx, &entity).await?;

        tx.commit()
            .await
            .map_err(|source| SqliteDaoError::CommitTransaction { source })?;

        Ok(Some(entity))
    }

    async fn delete(
        &self,
        owner: Uuid,
        id: GameId,
        at: OffsetDateTime,
    ) -> SqliteResult<Option<DeleteOutcome>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|source| SqliteDaoError::BeginTransaction { source })?;

        let row = sqlx::query("SELECT * FROM games WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|source| SqliteDaoError::ListGames { owner, source })?;
        let Some(row) = row else {
            return Ok(None);
        };
        let deleted = game_from_row(&row)?;

        sqlx::query("DELETE FROM games WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|source| SqliteDaoError::DeleteGame { id, source })?;

        let mut promoted = None;
        if deleted.is_current {
            let query =
                format!("SELECT * FROM games WHERE owner_id = ? ORDER BY {RECENCY_ORDER} LIMIT 1");
            let candidate = sqlx::query(&query)
                .bind(owner.to_string())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|source| SqliteDaoError::ListGames { owner, source })?;

            if let Some(candidate) = candidate {
                let mut replacement = game_from_row(&candidate)?;
                now_playing::apply_promotion(&mut replacement, at);
                write_row(&mut tx, &replacement).await?;
                promoted = Some(replacement);
            }
        }

        tx.commit()
            .await
            .map_err(|source| SqliteDaoError::CommitTransaction { source })?;

        Ok(Some(DeleteOutcome { deleted, promoted }))
    }

    async fn ping(&self) -> SqliteResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|source| SqliteDaoError::HealthPing { source })?;
        Ok(())
    }
}

async fn write_row(tx: &mut Transaction<'_, Sqlite>, game: &GameEntity) -> SqliteResult<()> {
    sqlx::query(WRITE_GAME)
        .bind(game.title.as_str())
        .bind(game.platform.as_str())
        .bind(game.status.as_str())
        .bind(game.cover_art_url.as_deref())
        .bind(game.hours_played)
        .bind(game.estimated_hours)
        .bind(i64::from(game.completion_percent))
        .bind(game.is_current)
        .bind(game.last_now_playing_at.map(timestamp_nanos))
        .bind(timestamp_nanos(game.updated_at))
        .bind(game.id)
        .execute(&mut **tx)
        .await
        .map_err(|source| SqliteDaoError::UpdateGame {
            id: game.id,
            source,
        })?;
    Ok(())
}

fn game_from_row(row: &SqliteRow) -> SqliteResult<GameEntity> {
    let decode = |source| SqliteDaoError::DecodeRow { source };

    let owner_raw: String = row.try_get("owner_id").map_err(decode)?;
    let owner_id = Uuid::parse_str(&owner_raw).map_err(|_| SqliteDaoError::InvalidRow {
        reason: "owner_id is not a UUID",
    })?;

    let status_raw: String = row.try_get("status").map_err(decode)?;
    let status = GameStatus::parse(&status_raw).ok_or(SqliteDaoError::InvalidRow {
        reason: "unknown status value",
    })?;

    let completion_raw: i64 = row.try_get("completion_percent").map_err(decode)?;
    let completion_percent =
        u8::try_from(completion_raw).map_err(|_| SqliteDaoError::InvalidRow {
            reason: "completion percent out of range",
        })?;

    let last_now_playing_at = row
        .try_get::<Option<i64>, _>("last_now_playing_at")
        .map_err(decode)?
        .map(timestamp_from_nanos)
        .transpose()?;

    Ok(GameEntity {
        id: row.try_get("id").map_err(decode)?,
        owner_id,
        title: row.try_get("title").map_err(decode)?,
        platform: row.try_get("platform").map_err(decode)?,
        status,
        cover_art_url: row.try_get("cover_art_url").map_err(decode)?,
        hours_played: row.try_get("hours_played").map_err(decode)?,
        estimated_hours: row.try_get("estimated_hours").map_err(decode)?,
        completion_percent,
        is_current: row.try_get("is_current").map_err(decode)?,
        last_now_playing_at,
        created_at: timestamp_from_nanos(row.try_get("created_at").map_err(decode)?)?,
        updated_at: timestamp_from_nanos(row.try_get("updated_at").map_err(decode)?)?,
    })
}

/// Timestamps are stored as integer nanoseconds since the Unix epoch so the
/// `DESC NULLS LAST` recency ordering stays purely numeric. The value fits an
/// i64 until the year 2262.
fn timestamp_nanos(at: OffsetDateTime) -> i64 {
    at.unix_timestamp_nanos() as i64
}

fn timestamp_from_nanos(nanos: i64) -> SqliteResult<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos)).map_err(|_| {
        SqliteDaoError::InvalidRow {
            reason: "timestamp out of range",
        }
    })
}

impl GameStore for SqliteGameStore {
    fn insert_game(&self, game: NewGameEntity) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let store = self.clone();
        Box::pin(async move { store.insert(game).await.map_err(Into::into) })
    }

    fn list_games(&self, owner: Uuid) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list(owner).await.map_err(Into::into) })
    }

    fn find_current(&self, owner: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.current(owner).await.map_err(Into::into) })
    }

    fn find_most_recent(
        &self,
        owner: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.most_recent(owner).await.map_err(Into::into) })
    }

    fn update_game(
        &self,
        owner: Uuid,
        id: GameId,
        changes: GameChanges,
        at: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.update(owner, id, changes, at).await.map_err(Into::into) })
    }

    fn delete_game(
        &self,
        owner: Uuid,
        id: GameId,
        at: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<Option<DeleteOutcome>>> {
        let store = self.clone();
        Box::pin(async move { store.delete(owner, id, at).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        // The pool re-opens connections on demand; probing is enough to
        // confirm the database is reachable again.
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}
