//! Players and their profile enrichment.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{NewPlayer, PlayerChanges, PlayerRecord, ProfileChanges};
use super::pool::{DbError, DbPool, SqliteConn};
use crate::models::Player;
use crate::schema::{players, team_categories, teams};

pub async fn find_by_provider_id(
    conn: &mut SqliteConn,
    player_id: &str,
) -> Result<Option<PlayerRecord>, DbError> {
    players::table
        .filter(players::player_id.eq(player_id))
        .select(PlayerRecord::as_select())
        .first(conn)
        .await
        .optional()
}

/// Insert a player and return its local id.
pub async fn insert(conn: &mut SqliteConn, new: &NewPlayer<'_>) -> Result<i32, DbError> {
    diesel::insert_into(players::table)
        .values(new)
        .execute(conn)
        .await?;
    players::table
        .filter(players::player_id.eq(new.player_id))
        .select(players::id)
        .first(conn)
        .await
}

pub async fn update(
    conn: &mut SqliteConn,
    id: i32,
    changes: &PlayerChanges<'_>,
) -> Result<(), DbError> {
    diesel::update(players::table.find(id))
        .set(changes)
        .execute(conn)
        .await?;
    Ok(())
}

/// Write profile enrichment. Returns false when the player no longer exists.
pub async fn update_profile(
    conn: &mut SqliteConn,
    id: i32,
    changes: &ProfileChanges,
) -> Result<bool, DbError> {
    let rows = diesel::update(players::table.find(id))
        .set(changes)
        .execute(conn)
        .await?;
    Ok(rows > 0)
}

pub async fn slugs(conn: &mut SqliteConn) -> Result<Vec<String>, DbError> {
    let rows: Vec<Option<String>> = players::table.select(players::slug).load(conn).await?;
    Ok(rows.into_iter().flatten().collect())
}

/// Player reads.
#[derive(Clone)]
pub struct PlayerRepository {
    pool: DbPool,
}

impl PlayerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_provider_id(&self, player_id: &str) -> Result<Option<Player>, DbError> {
        let mut conn = self.pool.get().await?;
        find_by_provider_id(&mut conn, player_id)
            .await
            .map(|opt| opt.map(Player::from))
    }

    /// Players listed under one team (local team id), by name.
    pub async fn by_team(&self, team_id: i32) -> Result<Vec<Player>, DbError> {
        let mut conn = self.pool.get().await?;
        players::table
            .filter(players::team_id.eq(team_id))
            .order(players::name.asc())
            .select(PlayerRecord::as_select())
            .load(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(Player::from).collect())
    }

    /// Players of a team category that have a profile URL.
    ///
    /// With `only_missing`, players whose profile was already scraped are
    /// skipped.
    pub async fn for_profiles(
        &self,
        category: &str,
        only_missing: bool,
    ) -> Result<Vec<Player>, DbError> {
        let mut conn = self.pool.get().await?;
        let mut query = players::table
            .inner_join(teams::table.inner_join(team_categories::table))
            .filter(team_categories::slug.eq(category.to_string()))
            .filter(players::player_url.is_not_null())
            .select(PlayerRecord::as_select())
            .order(players::id.asc())
            .into_boxed();
        if only_missing {
            query = query.filter(players::profile_scraped.eq(false));
        }
        query
            .load(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(Player::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FormatStats;
    use crate::repository::models::NewTeam;
    use crate::repository::test_support::test_context;
    use crate::repository::{now_text, teams as team_rows};

    async fn seed_team(conn: &mut SqliteConn) -> i32 {
        let now = now_text();
        let cat = team_rows::category_id(conn, "women").await.unwrap().unwrap();
        team_rows::insert(
            conn,
            &NewTeam {
                team_id: "9",
                name: "England Women",
                short_name: None,
                flag_url: None,
                team_url: None,
                category_id: cat,
                slug: None,
                created_at: &now,
                updated_at: &now,
            },
        )
        .await
        .unwrap()
    }

    fn new_player<'a>(id: &'a str, team: i32, now: &'a str) -> NewPlayer<'a> {
        NewPlayer {
            player_id: id,
            name: "Nat Sciver-Brunt",
            role: Some("Batting Allrounder"),
            photo_url: None,
            player_url: Some("https://www.cricbuzz.com/profiles/1/nat"),
            team_id: team,
            slug: Some("nat-sciver-brunt"),
            legacy_stats: "{}",
            profile_scraped: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_profile_update_and_listing() {
        let (ctx, _dir) = test_context().await;
        let mut conn = ctx.pool().get().await.unwrap();
        let team = seed_team(&mut conn).await;
        let now = now_text();
        let id = insert(&mut conn, &new_player("1", team, &now)).await.unwrap();

        let repo = ctx.players();
        assert_eq!(repo.for_profiles("women", true).await.unwrap().len(), 1);

        let mut batting = FormatStats::default();
        batting.odi.insert("average".into(), "45.1".into());
        let changes = ProfileChanges {
            born: Some("Jul 20, 1992".into()),
            batting_stats: Some(serde_json::to_string(&batting).unwrap()),
            profile_scraped: Some(true),
            profile_scraped_at: Some(now.clone()),
            updated_at: Some(now.clone()),
            ..Default::default()
        };
        assert!(update_profile(&mut conn, id, &changes).await.unwrap());
        assert!(!update_profile(&mut conn, id + 100, &changes).await.unwrap());

        let player = repo.get_by_provider_id("1").await.unwrap().unwrap();
        assert!(player.profile_scraped);
        assert_eq!(player.born.as_deref(), Some("Jul 20, 1992"));
        assert_eq!(player.batting_stats.unwrap().odi["average"], "45.1");
        assert_eq!(player.role.as_deref(), Some("Batting Allrounder"));

        assert!(repo.for_profiles("women", true).await.unwrap().is_empty());
        assert_eq!(repo.for_profiles("women", false).await.unwrap().len(), 1);
        assert_eq!(repo.by_team(team).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_players_cascade_with_team() {
        let (ctx, _dir) = test_context().await;
        let mut conn = ctx.pool().get().await.unwrap();
        let team = seed_team(&mut conn).await;
        let now = now_text();
        insert(&mut conn, &new_player("1", team, &now)).await.unwrap();

        let removed = ctx
            .clear(crate::repository::ClearTarget::Teams)
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(ctx.counts().await.unwrap().players, 0);
    }
}
