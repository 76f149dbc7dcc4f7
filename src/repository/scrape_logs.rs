//! Append-only scrape log.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{NewScrapeLog, ScrapeLogRecord};
use super::now_text;
use super::pool::{DbError, DbPool, SqliteConn};
use crate::models::{LogEntry, ScrapeLog};
use crate::schema::scrape_logs;

/// Append a log row on an existing connection.
pub async fn append(conn: &mut SqliteConn, entry: &LogEntry) -> Result<(), DbError> {
    let now = now_text();
    diesel::insert_into(scrape_logs::table)
        .values(NewScrapeLog {
            category: Some(&entry.category),
            status: entry.status.as_str(),
            message: Some(&entry.message),
            teams_scraped: entry.teams_scraped,
            players_scraped: entry.players_scraped,
            created_at: &now,
        })
        .execute(conn)
        .await?;
    Ok(())
}

#[derive(Clone)]
pub struct ScrapeLogRepository {
    pool: DbPool,
}

impl ScrapeLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn append(&self, entry: &LogEntry) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;
        append(&mut conn, entry).await
    }

    /// Newest rows first, optionally limited to one category tag.
    pub async fn recent(&self, category: Option<&str>, limit: i64) -> Result<Vec<ScrapeLog>, DbError> {
        let mut conn = self.pool.get().await?;
        let mut query = scrape_logs::table
            .order((scrape_logs::created_at.desc(), scrape_logs::id.desc()))
            .limit(limit)
            .select(ScrapeLogRecord::as_select())
            .into_boxed();
        if let Some(tag) = category {
            query = query.filter(scrape_logs::category.eq(tag.to_string()));
        }
        query
            .load(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(ScrapeLog::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogStatus;
    use crate::repository::test_support::test_context;

    #[tokio::test]
    async fn test_append_and_filter() {
        let (ctx, _dir) = test_context().await;
        let logs = ctx.logs();
        logs.append(&LogEntry::success("auto_daily", "Scraped 12 teams").with_counts(12, 0))
            .await
            .unwrap();
        logs.append(&LogEntry::error("live", "boom")).await.unwrap();

        let all = logs.recent(None, 10).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].category.as_deref(), Some("live"));
        assert_eq!(all[0].status, LogStatus::Error);

        let daily = logs.recent(Some("auto_daily"), 10).await.unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].teams_scraped, 12);
    }
}
