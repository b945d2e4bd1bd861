use super::state::*;
use super::update::*;
use super::Pool;
use async_trait::async_trait;
use chrono::prelude::*;
use coinvest_api::error::CoinvestError;
use futures::TryStreamExt;
use sqlx::Row;
use thiserror::Error;

use crate::store::UpdateStore;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Failed to decode body by tag: {0}")]
    UpdateBody(#[from] UpdateBodyError),
    #[error("Failed to decode/encode JSON: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("Failed to reconstruct state: {0}")]
    StateInvalid(#[from] StateUpdateErr),
    #[error("Update store is closed")]
    Closed,
}

impl CoinvestError for Error {
    fn subtype() -> &'static str {
        "coinvest-db:queries"
    }

    fn code(&self) -> u16 {
        match self {
            Error::Database(_) => 0,
            Error::UpdateBody(_) => 1,
            Error::Encoding(_) => 2,
            Error::StateInvalid(_) => 3,
            Error::Closed => 4,
        }
    }

    fn status(&self) -> u16 {
        500
    }
}

/// Alias for a `Result` with the error type `self::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Query all history of updates until we hit a snapshot or the begining of time.
/// Newest updates go first.
pub async fn query_updates(pool: &Pool) -> Result<Vec<StateUpdate>> {
    let mut rows = sqlx::query("select created, version, tag, body from updates order by id desc")
        .fetch(pool);

    let mut parsed: Vec<StateUpdate> = vec![];
    while let Some(row) = rows.try_next().await? {
        let created: NaiveDateTime = row.try_get("created")?;
        let version: i16 = row.try_get("version")?;
        let tag: String = row.try_get("tag")?;
        let body: serde_json::Value = row.try_get("body")?;
        let body = UpdateTag::from_tag(&tag, version as u16, body)?;
        let is_end = body.tag() == UpdateTag::Snapshot;
        parsed.push(StateUpdate::at(created, body));
        if is_end {
            break;
        }
    }
    Ok(parsed)
}

/// Insert new update in the chain of updates in database
pub async fn insert_update(
    pool: &Pool,
    update: &UpdateBody,
    timestamp: Option<NaiveDateTime>,
) -> Result<()> {
    let now = timestamp.unwrap_or_else(|| Utc::now().naive_utc());
    let tag = format!("{}", update.tag());
    let body = update.json()?;
    sqlx::query("insert into updates (created, version, tag, body) values ($1, $2, $3, $4)")
        .bind(now)
        .bind(CURRENT_BODY_VERSION as i16)
        .bind(tag)
        .bind(body)
        .execute(pool)
        .await?;

    Ok(())
}

/// Reconstruct state from chain of updates and snapshots in the store
pub async fn query_state<S: UpdateStore>(store: &S) -> Result<State> {
    let updates = store.load_updates().await?;
    Ok(State::collect(updates)?)
}

/// Store current state as a snapshot so the next startup replays less
pub async fn snapshot_state<S: UpdateStore>(store: &S) -> Result<State> {
    let state = query_state(store).await?;
    store
        .store_update(&UpdateBody::Snapshot(state.clone()), Utc::now().naive_utc())
        .await?;
    Ok(state)
}

#[async_trait]
impl UpdateStore for Pool {
    async fn store_update(&self, update: &UpdateBody, created: NaiveDateTime) -> Result<()> {
        insert_update(self, update, Some(created)).await
    }

    async fn load_updates(&self) -> Result<Vec<StateUpdate>> {
        let mut updates = query_updates(self).await?;
        updates.reverse();
        Ok(updates)
    }
}
