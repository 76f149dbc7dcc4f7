//! Series categories and series.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{CategoryRecord, NewSeries, SeriesChanges, SeriesRecord};
use super::pool::{DbError, DbPool, SqliteConn};
use crate::models::{Category, Series};
use crate::schema::{series, series_categories};

pub async fn find_by_provider_id(
    conn: &mut SqliteConn,
    series_id: &str,
) -> Result<Option<SeriesRecord>, DbError> {
    series::table
        .filter(series::series_id.eq(series_id))
        .select(SeriesRecord::as_select())
        .first(conn)
        .await
        .optional()
}

/// Insert a series and return its local id.
pub async fn insert(conn: &mut SqliteConn, new: &NewSeries<'_>) -> Result<i32, DbError> {
    diesel::insert_into(series::table)
        .values(new)
        .execute(conn)
        .await?;
    series::table
        .filter(series::series_id.eq(new.series_id))
        .select(series::id)
        .first(conn)
        .await
}

pub async fn update(
    conn: &mut SqliteConn,
    id: i32,
    changes: &SeriesChanges<'_>,
) -> Result<(), DbError> {
    diesel::update(series::table.find(id))
        .set(changes)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn slugs(conn: &mut SqliteConn) -> Result<Vec<String>, DbError> {
    let rows: Vec<Option<String>> = series::table.select(series::slug).load(conn).await?;
    Ok(rows.into_iter().flatten().collect())
}

pub async fn category_id(conn: &mut SqliteConn, slug: &str) -> Result<Option<i32>, DbError> {
    series_categories::table
        .filter(series_categories::slug.eq(slug))
        .select(series_categories::id)
        .first(conn)
        .await
        .optional()
}

/// Local id for a provider series id, if the series is stored.
pub async fn local_id(conn: &mut SqliteConn, series_id: &str) -> Result<Option<i32>, DbError> {
    series::table
        .filter(series::series_id.eq(series_id))
        .select(series::id)
        .first(conn)
        .await
        .optional()
}

/// Series reads.
#[derive(Clone)]
pub struct SeriesRepository {
    pool: DbPool,
}

impl SeriesRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn categories(&self) -> Result<Vec<Category>, DbError> {
        let mut conn = self.pool.get().await?;
        series_categories::table
            .order(series_categories::id.asc())
            .load::<CategoryRecord>(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(Category::from).collect())
    }

    pub async fn get_by_provider_id(&self, series_id: &str) -> Result<Option<Series>, DbError> {
        let mut conn = self.pool.get().await?;
        find_by_provider_id(&mut conn, series_id)
            .await
            .map(|opt| opt.map(Series::from))
    }

    /// Series of one category, most recent start first.
    pub async fn by_category(&self, slug: &str) -> Result<Vec<Series>, DbError> {
        let mut conn = self.pool.get().await?;
        series::table
            .inner_join(series_categories::table)
            .filter(series_categories::slug.eq(slug))
            .order((series::start_date.desc(), series::name.asc()))
            .select(SeriesRecord::as_select())
            .load(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(Series::from).collect())
    }

    /// Every series with a matches URL, in insertion order.
    pub async fn with_url(&self) -> Result<Vec<Series>, DbError> {
        let mut conn = self.pool.get().await?;
        series::table
            .filter(series::series_url.is_not_null())
            .order(series::id.asc())
            .select(SeriesRecord::as_select())
            .load(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(Series::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::now_text;
    use crate::repository::test_support::test_context;

    #[tokio::test]
    async fn test_series_listing_order() {
        let (ctx, _dir) = test_context().await;
        let mut conn = ctx.pool().get().await.unwrap();
        let cat = category_id(&mut conn, "league").await.unwrap();
        let now = now_text();

        for (id, name, start) in [("10", "Old Cup", "2025-01-02"), ("11", "New Cup", "2026-01-02")] {
            insert(
                &mut conn,
                &NewSeries {
                    series_id: id,
                    name,
                    series_url: Some("https://www.cricbuzz.com/cricket-series/10/x/matches"),
                    start_date: Some(start),
                    end_date: None,
                    date_range: None,
                    category_id: cat,
                    slug: None,
                    created_at: &now,
                    updated_at: &now,
                },
            )
            .await
            .unwrap();
        }

        let listed = ctx.series().by_category("league").await.unwrap();
        assert_eq!(listed[0].name, "New Cup");
        assert_eq!(local_id(&mut conn, "10").await.unwrap(), Some(listed[1].id));
        assert_eq!(local_id(&mut conn, "99").await.unwrap(), None);
        assert_eq!(ctx.series().with_url().await.unwrap().len(), 2);
    }
}
