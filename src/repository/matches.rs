//! Matches.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{MatchChanges, MatchRecord, NewMatch};
use super::pool::{DbError, DbPool, SqliteConn};
use crate::models::{Match, MatchState};
use crate::schema::matches;

pub async fn find_by_provider_id(
    conn: &mut SqliteConn,
    match_id: &str,
) -> Result<Option<MatchRecord>, DbError> {
    matches::table
        .filter(matches::match_id.eq(match_id))
        .select(MatchRecord::as_select())
        .first(conn)
        .await
        .optional()
}

pub async fn insert(conn: &mut SqliteConn, new: &NewMatch) -> Result<(), DbError> {
    diesel::insert_into(matches::table)
        .values(new)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn update(conn: &mut SqliteConn, id: i32, changes: &MatchChanges) -> Result<(), DbError> {
    diesel::update(matches::table.find(id))
        .set(changes)
        .execute(conn)
        .await?;
    Ok(())
}

/// Match reads.
#[derive(Clone)]
pub struct MatchRepository {
    pool: DbPool,
}

impl MatchRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_provider_id(&self, match_id: &str) -> Result<Option<Match>, DbError> {
        let mut conn = self.pool.get().await?;
        find_by_provider_id(&mut conn, match_id)
            .await
            .map(|opt| opt.map(Match::from))
    }

    /// Matches in one state, most recently updated first.
    pub async fn by_state(&self, state: MatchState, limit: i64) -> Result<Vec<Match>, DbError> {
        let mut conn = self.pool.get().await?;
        matches::table
            .filter(matches::state.eq(state.as_str()))
            .order(matches::updated_at.desc())
            .limit(limit)
            .select(MatchRecord::as_select())
            .load(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(Match::from).collect())
    }

    /// Matches of one provider series, in insertion order.
    pub async fn by_series(&self, series_id: &str) -> Result<Vec<Match>, DbError> {
        let mut conn = self.pool.get().await?;
        matches::table
            .filter(matches::series_id.eq(series_id))
            .order(matches::id.asc())
            .select(MatchRecord::as_select())
            .load(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(Match::from).collect())
    }

    /// Most recently updated matches.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Match>, DbError> {
        let mut conn = self.pool.get().await?;
        matches::table
            .order(matches::updated_at.desc())
            .limit(limit)
            .select(MatchRecord::as_select())
            .load(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(Match::from).collect())
    }
}
