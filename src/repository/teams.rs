//! Team categories and teams.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{CategoryRecord, NewTeam, TeamChanges, TeamRecord};
use super::pool::{DbError, DbPool, SqliteConn};
use crate::models::{Category, Team};
use crate::schema::{team_categories, teams};

/// Look up a stored team by provider id.
pub async fn find_by_provider_id(
    conn: &mut SqliteConn,
    team_id: &str,
) -> Result<Option<TeamRecord>, DbError> {
    teams::table
        .filter(teams::team_id.eq(team_id))
        .select(TeamRecord::as_select())
        .first(conn)
        .await
        .optional()
}

/// Insert a team and return its local id.
pub async fn insert(conn: &mut SqliteConn, new: &NewTeam<'_>) -> Result<i32, DbError> {
    diesel::insert_into(teams::table)
        .values(new)
        .execute(conn)
        .await?;
    teams::table
        .filter(teams::team_id.eq(new.team_id))
        .select(teams::id)
        .first(conn)
        .await
}

pub async fn update(conn: &mut SqliteConn, id: i32, changes: &TeamChanges<'_>) -> Result<(), DbError> {
    diesel::update(teams::table.find(id))
        .set(changes)
        .execute(conn)
        .await?;
    Ok(())
}

/// Every assigned team slug.
pub async fn slugs(conn: &mut SqliteConn) -> Result<Vec<String>, DbError> {
    let rows: Vec<Option<String>> = teams::table.select(teams::slug).load(conn).await?;
    Ok(rows.into_iter().flatten().collect())
}

pub async fn category_id(conn: &mut SqliteConn, slug: &str) -> Result<Option<i32>, DbError> {
    team_categories::table
        .filter(team_categories::slug.eq(slug))
        .select(team_categories::id)
        .first(conn)
        .await
        .optional()
}

/// Team reads.
#[derive(Clone)]
pub struct TeamRepository {
    pool: DbPool,
}

impl TeamRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// All team categories in seed order.
    pub async fn categories(&self) -> Result<Vec<Category>, DbError> {
        let mut conn = self.pool.get().await?;
        team_categories::table
            .order(team_categories::id.asc())
            .load::<CategoryRecord>(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(Category::from).collect())
    }

    pub async fn category(&self, slug: &str) -> Result<Option<Category>, DbError> {
        let mut conn = self.pool.get().await?;
        team_categories::table
            .filter(team_categories::slug.eq(slug))
            .first::<CategoryRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Category::from))
    }

    pub async fn get_by_provider_id(&self, team_id: &str) -> Result<Option<Team>, DbError> {
        let mut conn = self.pool.get().await?;
        find_by_provider_id(&mut conn, team_id)
            .await
            .map(|opt| opt.map(Team::from))
    }

    /// Teams of one category, by name.
    pub async fn by_category(&self, slug: &str) -> Result<Vec<Team>, DbError> {
        let mut conn = self.pool.get().await?;
        teams::table
            .inner_join(team_categories::table)
            .filter(team_categories::slug.eq(slug))
            .order(teams::name.asc())
            .select(TeamRecord::as_select())
            .load(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(Team::from).collect())
    }

    /// Teams that have a landing URL, optionally limited to one category.
    pub async fn with_url(&self, category: Option<&str>) -> Result<Vec<Team>, DbError> {
        let mut conn = self.pool.get().await?;
        let mut query = teams::table
            .inner_join(team_categories::table)
            .filter(teams::team_url.is_not_null())
            .filter(teams::team_url.ne(""))
            .select(TeamRecord::as_select())
            .order(teams::id.asc())
            .into_boxed();
        if let Some(slug) = category {
            query = query.filter(team_categories::slug.eq(slug.to_string()));
        }
        query
            .load(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(Team::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::now_text;
    use crate::repository::test_support::test_context;

    #[tokio::test]
    async fn test_insert_find_update() {
        let (ctx, _dir) = test_context().await;
        let mut conn = ctx.pool().get().await.unwrap();
        let intl = category_id(&mut conn, "international").await.unwrap().unwrap();
        let now = now_text();

        let id = insert(
            &mut conn,
            &NewTeam {
                team_id: "2",
                name: "India",
                short_name: Some("IND"),
                flag_url: None,
                team_url: Some("https://www.cricbuzz.com/cricket-team/india/2"),
                category_id: intl,
                slug: Some("india"),
                created_at: &now,
                updated_at: &now,
            },
        )
        .await
        .unwrap();

        update(
            &mut conn,
            id,
            &TeamChanges {
                name: Some("India Men"),
                updated_at: Some(&now),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let stored = find_by_provider_id(&mut conn, "2").await.unwrap().unwrap();
        assert_eq!(stored.name, "India Men");
        assert_eq!(stored.short_name.as_deref(), Some("IND"));
        assert_eq!(slugs(&mut conn).await.unwrap(), vec!["india".to_string()]);

        let repo = ctx.teams();
        assert_eq!(repo.by_category("international").await.unwrap().len(), 1);
        assert!(repo.by_category("women").await.unwrap().is_empty());
        assert_eq!(repo.with_url(None).await.unwrap().len(), 1);
        assert!(repo.with_url(Some("league")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_provider_id_rejected() {
        let (ctx, _dir) = test_context().await;
        let mut conn = ctx.pool().get().await.unwrap();
        let intl = category_id(&mut conn, "international").await.unwrap().unwrap();
        let now = now_text();
        let new = NewTeam {
            team_id: "2",
            name: "India",
            short_name: None,
            flag_url: None,
            team_url: None,
            category_id: intl,
            slug: None,
            created_at: &now,
            updated_at: &now,
        };
        insert(&mut conn, &new).await.unwrap();
        let err = insert(&mut conn, &new).await.unwrap_err();
        assert!(crate::repository::util::is_unique_violation(&err));
    }
}
