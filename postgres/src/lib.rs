//! `PostgreSQL` draft store for the event creation wizard.
//!
//! Implements the [`DraftStore`] trait from `event-wizard-core` on top of two
//! tables (see `migrations/`):
//!
//! - `owners`: the identity records drafts reference
//! - `event_drafts`: one row per event, with a foreign key to `owners`
//!
//! A write that references a missing owner fails with a foreign key
//! violation, which is reported as [`PersistenceError::Referential`] so the
//! repository can create the owner and retry.
//!
//! # Example
//!
//! ```no_run
//! use event_wizard_postgres::PostgresDraftStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PostgresDraftStore::new("postgres://localhost/events").await?;
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use chrono::{DateTime, Utc};
use event_wizard_core::draft::{
    DraftId, EventDraft, EventFormat, EventStatus, Monetization, OwnerId,
};
use event_wizard_core::persistence::{DraftStore, PersistenceError, StoreFuture};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use uuid::Uuid;

const DRAFT_COLUMNS: &str = "id, owner_id, name, monetization, format, starts_at, ends_at, \
     location, capacity, waitlist_enabled, waitlist_capacity, branding, status, updated_at";

/// Row shape of `event_drafts`.
#[derive(sqlx::FromRow)]
struct DraftRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    monetization: String,
    format: String,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    location: Option<String>,
    capacity: Option<i64>,
    waitlist_enabled: bool,
    waitlist_capacity: Option<i64>,
    branding: Option<serde_json::Value>,
    status: String,
    updated_at: Option<DateTime<Utc>>,
}

fn corrupt(column: &str, value: &str) -> PersistenceError {
    PersistenceError::Other(format!("Unexpected {column} value in event_drafts: {value}"))
}

fn to_count(column: &str, value: Option<i64>) -> Result<Option<u32>, PersistenceError> {
    value
        .map(|v| u32::try_from(v).map_err(|_| corrupt(column, &v.to_string())))
        .transpose()
}

impl TryFrom<DraftRow> for EventDraft {
    type Error = PersistenceError;

    fn try_from(row: DraftRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Some(DraftId::new(row.id)),
            owner_id: OwnerId::new(row.owner_id),
            monetization: Monetization::parse(&row.monetization)
                .ok_or_else(|| corrupt("monetization", &row.monetization))?,
            format: EventFormat::parse(&row.format).ok_or_else(|| corrupt("format", &row.format))?,
            status: EventStatus::parse(&row.status).ok_or_else(|| corrupt("status", &row.status))?,
            capacity: to_count("capacity", row.capacity)?,
            waitlist_capacity: to_count("waitlist_capacity", row.waitlist_capacity)?,
            name: row.name,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            location: row.location,
            waitlist_enabled: row.waitlist_enabled,
            branding: row.branding,
            updated_at: row.updated_at,
        })
    }
}

/// Map a write failure, recognising the missing-owner case.
fn write_error(operation: &str, error: &sqlx::Error) -> PersistenceError {
    if let sqlx::Error::Database(db_err) = error {
        if db_err.is_foreign_key_violation() {
            return PersistenceError::Referential(db_err.message().to_string());
        }
    }
    PersistenceError::Other(format!("Failed to {operation} draft: {error}"))
}

/// `PostgreSQL` implementation of [`DraftStore`].
#[derive(Clone, Debug)]
pub struct PostgresDraftStore {
    pool: PgPool,
}

impl PostgresDraftStore {
    /// Connect with default pool settings.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Other`] if the connection fails.
    pub async fn new(database_url: &str) -> Result<Self, PersistenceError> {
        Self::connect(database_url, 10, Duration::from_secs(30)).await
    }

    /// Connect with explicit pool size and acquire timeout.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Other`] if the connection fails.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        connect_timeout: Duration,
    ) -> Result<Self, PersistenceError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(connect_timeout)
            .connect(database_url)
            .await
            .map_err(|e| PersistenceError::Other(format!("Failed to connect: {e}")))?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Other`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), PersistenceError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| PersistenceError::Other(format!("Migration failed: {e}")))
    }

    async fn fetch(&self, id: DraftId) -> Result<EventDraft, PersistenceError> {
        let row: Option<DraftRow> =
            sqlx::query_as(&format!("SELECT {DRAFT_COLUMNS} FROM event_drafts WHERE id = $1"))
                .bind(*id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| PersistenceError::Other(format!("Failed to load draft: {e}")))?;

        row.ok_or(PersistenceError::NotFound(id))?.try_into()
    }

    #[tracing::instrument(skip(self, draft), fields(owner_id = %draft.owner_id))]
    async fn insert_row(&self, draft: EventDraft) -> Result<EventDraft, PersistenceError> {
        let id = DraftId::generate();
        let row: DraftRow = sqlx::query_as(&format!(
            r"
            INSERT INTO event_drafts
                (id, owner_id, name, monetization, format, starts_at, ends_at, location,
                 capacity, waitlist_enabled, waitlist_capacity, branding, status, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {DRAFT_COLUMNS}
            "
        ))
        .bind(*id.as_uuid())
        .bind(*draft.owner_id.as_uuid())
        .bind(&draft.name)
        .bind(draft.monetization.as_str())
        .bind(draft.format.as_str())
        .bind(draft.starts_at)
        .bind(draft.ends_at)
        .bind(&draft.location)
        .bind(draft.capacity.map(i64::from))
        .bind(draft.waitlist_enabled)
        .bind(draft.waitlist_capacity.map(i64::from))
        .bind(&draft.branding)
        .bind(draft.status.as_str())
        .bind(draft.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error("insert", &e))?;

        metrics::counter!("postgres.drafts.inserted").increment(1);
        row.try_into()
    }

    #[tracing::instrument(skip(self, draft), fields(draft_id = %id))]
    async fn update_row(&self, id: DraftId, draft: EventDraft) -> Result<EventDraft, PersistenceError> {
        let row: Option<DraftRow> = sqlx::query_as(&format!(
            r"
            UPDATE event_drafts
            SET owner_id = $2,
                name = $3,
                monetization = $4,
                format = $5,
                starts_at = $6,
                ends_at = $7,
                location = $8,
                capacity = $9,
                waitlist_enabled = $10,
                waitlist_capacity = $11,
                branding = $12,
                status = $13,
                updated_at = $14
            WHERE id = $1
            RETURNING {DRAFT_COLUMNS}
            "
        ))
        .bind(*id.as_uuid())
        .bind(*draft.owner_id.as_uuid())
        .bind(&draft.name)
        .bind(draft.monetization.as_str())
        .bind(draft.format.as_str())
        .bind(draft.starts_at)
        .bind(draft.ends_at)
        .bind(&draft.location)
        .bind(draft.capacity.map(i64::from))
        .bind(draft.waitlist_enabled)
        .bind(draft.waitlist_capacity.map(i64::from))
        .bind(&draft.branding)
        .bind(draft.status.as_str())
        .bind(draft.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error("update", &e))?;

        row.ok_or(PersistenceError::NotFound(id))?.try_into()
    }

    async fn insert_owner(&self, owner: OwnerId) -> Result<(), PersistenceError> {
        sqlx::query("INSERT INTO owners (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(*owner.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| PersistenceError::Other(format!("Failed to create owner: {e}")))?;
        tracing::info!(owner_id = %owner, "Owner record ensured");
        Ok(())
    }
}

impl DraftStore for PostgresDraftStore {
    fn load(&self, id: DraftId) -> StoreFuture<'_, EventDraft> {
        Box::pin(self.fetch(id))
    }

    fn insert(&self, draft: EventDraft) -> StoreFuture<'_, EventDraft> {
        Box::pin(self.insert_row(draft))
    }

    fn update(&self, id: DraftId, draft: EventDraft) -> StoreFuture<'_, EventDraft> {
        Box::pin(self.update_row(id, draft))
    }

    fn create_owner(&self, owner: OwnerId) -> StoreFuture<'_, ()> {
        Box::pin(self.insert_owner(owner))
    }
}
