//! Transactional batch upserts keyed on provider ids.
//!
//! Each batch runs in one transaction: either every row of the batch is
//! visible afterwards or none is. A failed batch writes an error row to the
//! scrape log with the failure text before the error is returned.

pub mod merge;

use diesel_async::AsyncConnection;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::models::LogEntry;
use crate::normalize::SlugAllocator;
use crate::repository::pool::{DbError, DbPool, SqliteConn};
use crate::repository::util::is_unique_violation;
use crate::repository::{matches, now_text, players, scrape_logs, series, teams};
use crate::scrapers::identity::is_valid_id;
use crate::scrapers::records::{MatchRec, PlayerRec, ProfileRec, SeriesRec, TeamRec};

/// Series listings under this category do not claim ownership of a series.
const CATCH_ALL_SERIES_CATEGORY: &str = "all";

#[derive(Debug, Error)]
pub enum UpsertError {
    #[error("storage error: {0}")]
    Storage(#[from] DbError),
    #[error("{kind} record has no provider id")]
    MissingProviderId { kind: &'static str },
    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

/// Outcome of one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCounts {
    pub saved_new: usize,
    pub updated_existing: usize,
    pub total: usize,
    /// Records dropped for lacking a provider id.
    pub skipped: usize,
}

impl BatchCounts {
    fn created(&mut self) {
        self.saved_new += 1;
        self.total += 1;
    }

    fn updated(&mut self) {
        self.updated_existing += 1;
        self.total += 1;
    }

    /// Sum of two batches.
    pub fn merge(mut self, other: BatchCounts) -> Self {
        self.saved_new += other.saved_new;
        self.updated_existing += other.updated_existing;
        self.total += other.total;
        self.skipped += other.skipped;
        self
    }
}

/// Update the stored row or insert a new one. An insert that loses a race
/// on the provider-id index proceeds as an update. Evaluates to true when
/// the row was created.
macro_rules! upsert_row {
    ($conn:ident, $repo:ident, $id:expr, $stored:expr, $new:expr, $changes:expr) => {{
        let changes = $changes;
        match $stored {
            Some(existing) => {
                $repo::update($conn, existing.id, &changes).await?;
                false
            }
            None => match $repo::insert($conn, &$new).await {
                Ok(_) => true,
                Err(e) if is_unique_violation(&e) => {
                    debug!("Insert of {} raced with another writer; updating instead", $id);
                    let existing = $repo::find_by_provider_id($conn, $id).await?.ok_or(e)?;
                    $repo::update($conn, existing.id, &changes).await?;
                    false
                }
                Err(e) => return Err(e.into()),
            },
        }
    }};
}

/// Applies parser output to the store.
#[derive(Clone)]
pub struct Upserter {
    pool: DbPool,
}

impl Upserter {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run `work` in one transaction. On failure the scrape log receives an
    /// error row tagged `tag`.
    async fn in_batch<'a, R, F>(&self, tag: &str, work: F) -> Result<R, UpsertError>
    where
        R: Send + 'a,
        F: for<'r> FnOnce(
                &'r mut SqliteConn,
            )
                -> diesel_async::scoped_futures::ScopedBoxFuture<'a, 'r, Result<R, UpsertError>>
            + Send
            + 'a,
    {
        let result = match self.pool.get().await {
            Ok(mut conn) => conn.transaction(work).await,
            Err(e) => Err(UpsertError::Storage(e)),
        };

        if let Err(ref e) = result {
            error!("Batch '{}' rolled back: {}", tag, e);
            let entry = LogEntry::error(tag, e.to_string());
            match self.pool.get().await {
                Ok(mut conn) => {
                    if let Err(log_err) = scrape_logs::append(&mut conn, &entry).await {
                        warn!("Failed to record batch failure: {}", log_err);
                    }
                }
                Err(log_err) => warn!("Failed to record batch failure: {}", log_err),
            }
        }
        result
    }

    /// Upsert the teams of one team category.
    pub async fn upsert_teams(
        &self,
        category_slug: &str,
        records: &[TeamRec],
        tag: &str,
    ) -> Result<BatchCounts, UpsertError> {
        let category_slug = category_slug.to_string();
        let counts = self
            .in_batch(tag, move |conn| {
                Box::pin(async move {
                    let category_id = teams::category_id(conn, &category_slug)
                        .await?
                        .ok_or_else(|| UpsertError::UnknownCategory(category_slug.clone()))?;
                    let mut slugs = SlugAllocator::new(teams::slugs(conn).await?);
                    let now = now_text();
                    let mut counts = BatchCounts::default();

                    for rec in records {
                        if !is_valid_id(&rec.team_id) || rec.name.trim().is_empty() {
                            counts.skipped += 1;
                            continue;
                        }
                        let stored = teams::find_by_provider_id(conn, &rec.team_id).await?;
                        let slug = merge::slug_for(
                            stored.as_ref().and_then(|s| s.slug.as_deref()),
                            &rec.name,
                            &rec.team_id,
                            &mut slugs,
                        );
                        let created = upsert_row!(
                            conn,
                            teams,
                            &rec.team_id,
                            stored,
                            merge::new_team(rec, category_id, slug.as_deref(), &now),
                            merge::team_changes(rec, category_id, slug.as_deref(), &now)
                        );
                        if created {
                            counts.created();
                        } else {
                            counts.updated();
                        }
                    }
                    Ok(counts)
                })
            })
            .await?;

        info!(
            "Teams [{}]: {} new, {} updated, {} skipped",
            tag, counts.saved_new, counts.updated_existing, counts.skipped
        );
        Ok(counts)
    }

    /// Upsert one team's roster. `team_local_id` is the stored team row.
    pub async fn upsert_players(
        &self,
        team_local_id: i32,
        records: &[PlayerRec],
        tag: &str,
    ) -> Result<BatchCounts, UpsertError> {
        let counts = self
            .in_batch(tag, move |conn| {
                Box::pin(async move {
                    let mut slugs = SlugAllocator::new(players::slugs(conn).await?);
                    let now = now_text();
                    let mut counts = BatchCounts::default();

                    for rec in records {
                        if !is_valid_id(&rec.player_id) || rec.name.trim().is_empty() {
                            counts.skipped += 1;
                            continue;
                        }
                        let stored = players::find_by_provider_id(conn, &rec.player_id).await?;
                        let slug = merge::slug_for(
                            stored.as_ref().and_then(|s| s.slug.as_deref()),
                            &rec.name,
                            &rec.player_id,
                            &mut slugs,
                        );
                        let created = upsert_row!(
                            conn,
                            players,
                            &rec.player_id,
                            stored,
                            merge::new_player(rec, team_local_id, slug.as_deref(), &now),
                            merge::player_changes(rec, team_local_id, slug.as_deref(), &now)
                        );
                        if created {
                            counts.created();
                        } else {
                            counts.updated();
                        }
                    }
                    Ok(counts)
                })
            })
            .await?;

        debug!(
            "Players [{}] team {}: {} new, {} updated",
            tag, team_local_id, counts.saved_new, counts.updated_existing
        );
        Ok(counts)
    }

    /// Write profile enrichment for already-stored players (local ids).
    /// Players that vanished since the batch was planned count as skipped.
    pub async fn apply_profiles(
        &self,
        profiles: &[(i32, ProfileRec)],
        tag: &str,
    ) -> Result<BatchCounts, UpsertError> {
        self.in_batch(tag, move |conn| {
            Box::pin(async move {
                let now = now_text();
                let mut counts = BatchCounts::default();
                for (player_id, profile) in profiles {
                    let changes = merge::profile_changes(profile, &now);
                    if players::update_profile(conn, *player_id, &changes).await? {
                        counts.updated();
                    } else {
                        counts.skipped += 1;
                    }
                }
                Ok(counts)
            })
        })
        .await
    }

    /// Upsert series from a listing. `category_slug` of `None` or the
    /// catch-all category leaves stored category refs untouched.
    pub async fn upsert_series(
        &self,
        category_slug: Option<&str>,
        records: &[SeriesRec],
        tag: &str,
    ) -> Result<BatchCounts, UpsertError> {
        let category_slug = category_slug.map(str::to_string);
        let counts = self
            .in_batch(tag, move |conn| {
                Box::pin(async move {
                    let category_id = match category_slug.as_deref() {
                        Some(slug) => Some(
                            series::category_id(conn, slug)
                                .await?
                                .ok_or_else(|| UpsertError::UnknownCategory(slug.to_string()))?,
                        ),
                        None => None,
                    };
                    let owns_category = category_slug
                        .as_deref()
                        .map(|s| s != CATCH_ALL_SERIES_CATEGORY)
                        .unwrap_or(false);
                    let update_category = if owns_category { category_id } else { None };

                    let mut slugs = SlugAllocator::new(series::slugs(conn).await?);
                    let now = now_text();
                    let mut counts = BatchCounts::default();

                    for rec in records {
                        if !is_valid_id(&rec.series_id) || rec.name.trim().is_empty() {
                            counts.skipped += 1;
                            continue;
                        }
                        let stored = series::find_by_provider_id(conn, &rec.series_id).await?;
                        let slug = merge::slug_for(
                            stored.as_ref().and_then(|s| s.slug.as_deref()),
                            &rec.name,
                            &rec.series_id,
                            &mut slugs,
                        );
                        let created = upsert_row!(
                            conn,
                            series,
                            &rec.series_id,
                            stored,
                            merge::new_series(rec, category_id, slug.as_deref(), &now),
                            merge::series_changes(rec, update_category, slug.as_deref(), &now)
                        );
                        if created {
                            counts.created();
                        } else {
                            counts.updated();
                        }
                    }
                    Ok(counts)
                })
            })
            .await?;

        info!(
            "Series [{}]: {} new, {} updated, {} skipped",
            tag, counts.saved_new, counts.updated_existing, counts.skipped
        );
        Ok(counts)
    }

    /// Upsert matches.
    ///
    /// A supplied `series_ref` is written to every match. Otherwise the
    /// local series is resolved from each match's provider series id when
    /// that series is stored.
    pub async fn upsert_matches(
        &self,
        records: &[MatchRec],
        series_ref: Option<i32>,
        tag: &str,
    ) -> Result<BatchCounts, UpsertError> {
        let counts = self
            .in_batch(tag, move |conn| {
                Box::pin(async move {
                    let now = now_text();
                    let mut counts = BatchCounts::default();

                    for rec in records {
                        if !is_valid_id(&rec.match_id) {
                            counts.skipped += 1;
                            continue;
                        }
                        let series_ref = match (series_ref, rec.series_id.as_deref()) {
                            (Some(r), _) => Some(r),
                            (None, Some(sid)) if is_valid_id(sid) => series::local_id(conn, sid).await?,
                            _ => None,
                        };
                        let stored = matches::find_by_provider_id(conn, &rec.match_id).await?;
                        let created = upsert_row!(
                            conn,
                            matches,
                            &rec.match_id,
                            stored,
                            merge::new_match(rec, series_ref, &now),
                            merge::match_changes(rec, series_ref, &now)
                        );
                        if created {
                            counts.created();
                        } else {
                            counts.updated();
                        }
                    }
                    Ok(counts)
                })
            })
            .await?;

        info!(
            "Matches [{}]: {} new, {} updated, {} skipped",
            tag, counts.saved_new, counts.updated_existing, counts.skipped
        );
        Ok(counts)
    }

    /// Upsert a single match, failing when it carries no provider id.
    pub async fn upsert_match(&self, record: &MatchRec, tag: &str) -> Result<BatchCounts, UpsertError> {
        if !is_valid_id(&record.match_id) {
            return Err(UpsertError::MissingProviderId { kind: "match" });
        }
        self.upsert_matches(std::slice::from_ref(record), None, tag)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchState;
    use crate::repository::test_support::test_context;

    fn team(id: &str, name: &str) -> TeamRec {
        TeamRec {
            team_id: id.into(),
            name: name.into(),
            team_url: Some(format!("https://www.cricbuzz.com/cricket-team/x/{}", id)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_teams_create_then_update() {
        let (ctx, _dir) = test_context().await;
        let upserter = Upserter::new(ctx.pool().clone());

        let first = upserter
            .upsert_teams("international", &[team("2", "India"), team("", "Nobody")], "test")
            .await
            .unwrap();
        assert_eq!(
            first,
            BatchCounts {
                saved_new: 1,
                updated_existing: 0,
                total: 1,
                skipped: 1
            }
        );

        let second = upserter
            .upsert_teams("international", &[team("2", "India Men"), team("3", "India")], "test")
            .await
            .unwrap();
        assert_eq!(second.saved_new, 1);
        assert_eq!(second.updated_existing, 1);

        let stored = ctx.teams().by_category("international").await.unwrap();
        assert_eq!(stored.len(), 2);
        let renamed = stored.iter().find(|t| t.team_id == "2").unwrap();
        assert_eq!(renamed.name, "India Men");
        assert_eq!(renamed.slug.as_deref(), Some("india"));
        let other = stored.iter().find(|t| t.team_id == "3").unwrap();
        assert_eq!(other.slug.as_deref(), Some("india-1"));
    }

    #[tokio::test]
    async fn test_unknown_category_rolls_back_and_logs() {
        let (ctx, _dir) = test_context().await;
        let upserter = Upserter::new(ctx.pool().clone());
        let err = upserter
            .upsert_teams("club", &[team("2", "India")], "club")
            .await
            .unwrap_err();
        assert!(matches!(err, UpsertError::UnknownCategory(_)));
        assert_eq!(ctx.counts().await.unwrap().teams, 0);

        let logs = ctx.logs().recent(Some("club"), 5).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].message.as_deref().unwrap().contains("club"));
    }

    #[tokio::test]
    async fn test_score_preserved_across_upserts() {
        let (ctx, _dir) = test_context().await;
        let upserter = Upserter::new(ctx.pool().clone());

        let first = MatchRec {
            match_id: "42".into(),
            state: Some(MatchState::Live),
            team1_score: "200/4 (30)".into(),
            ..Default::default()
        };
        let second = MatchRec {
            match_id: "42".into(),
            state: Some(MatchState::Live),
            team1_score: String::new(),
            team2_score: "12/0 (2)".into(),
            ..Default::default()
        };
        upserter.upsert_match(&first, "test").await.unwrap();
        let counts = upserter.upsert_match(&second, "test").await.unwrap();
        assert_eq!(counts.updated_existing, 1);

        let stored = ctx.matches().get_by_provider_id("42").await.unwrap().unwrap();
        assert_eq!(stored.team1_score.as_deref(), Some("200/4 (30)"));
        assert_eq!(stored.team2_score.as_deref(), Some("12/0 (2)"));
    }

    #[tokio::test]
    async fn test_match_without_id_rejected() {
        let (ctx, _dir) = test_context().await;
        let upserter = Upserter::new(ctx.pool().clone());
        let err = upserter
            .upsert_match(&MatchRec::default(), "test")
            .await
            .unwrap_err();
        assert!(matches!(err, UpsertError::MissingProviderId { kind: "match" }));
    }

    #[tokio::test]
    async fn test_series_ref_resolved_from_provider_id() {
        let (ctx, _dir) = test_context().await;
        let upserter = Upserter::new(ctx.pool().clone());
        upserter
            .upsert_series(
                Some("international"),
                &[SeriesRec {
                    series_id: "500".into(),
                    name: "Border-Gavaskar Trophy".into(),
                    ..Default::default()
                }],
                "test",
            )
            .await
            .unwrap();

        let rec = MatchRec {
            match_id: "11".into(),
            series_id: Some("500".into()),
            ..Default::default()
        };
        upserter.upsert_matches(&[rec], None, "test").await.unwrap();

        let series = ctx.series().get_by_provider_id("500").await.unwrap().unwrap();
        let stored = ctx.matches().get_by_provider_id("11").await.unwrap().unwrap();
        assert_eq!(stored.series_ref, Some(series.id));
        assert_eq!(stored.state, MatchState::Upcoming);
    }

    #[tokio::test]
    async fn test_catch_all_listing_keeps_category() {
        let (ctx, _dir) = test_context().await;
        let upserter = Upserter::new(ctx.pool().clone());
        let rec = SeriesRec {
            series_id: "500".into(),
            name: "Women's Big Bash".into(),
            ..Default::default()
        };
        upserter
            .upsert_series(Some("women"), std::slice::from_ref(&rec), "test")
            .await
            .unwrap();
        upserter
            .upsert_series(Some("all"), std::slice::from_ref(&rec), "test")
            .await
            .unwrap();

        assert_eq!(ctx.series().by_category("women").await.unwrap().len(), 1);
        assert!(ctx.series().by_category("all").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_roster_then_profile() {
        let (ctx, _dir) = test_context().await;
        let upserter = Upserter::new(ctx.pool().clone());
        upserter
            .upsert_teams("international", &[team("2", "India")], "test")
            .await
            .unwrap();
        let india = ctx.teams().get_by_provider_id("2").await.unwrap().unwrap();

        let roster = [PlayerRec {
            player_id: "1413".into(),
            name: "Virat Kohli".into(),
            role: Some("Batsman".into()),
            player_url: Some("https://www.cricbuzz.com/profiles/1413/virat-kohli".into()),
            ..Default::default()
        }];
        upserter.upsert_players(india.id, &roster, "test").await.unwrap();
        let player = ctx.players().get_by_provider_id("1413").await.unwrap().unwrap();

        let mut profile = ProfileRec {
            born: Some("Nov 05, 1988".into()),
            ..Default::default()
        };
        profile.batting_stats.odi.insert("average".into(), "57.3".into());
        let counts = upserter
            .apply_profiles(&[(player.id, profile), (player.id + 50, ProfileRec::default())], "test")
            .await
            .unwrap();
        assert_eq!(counts.updated_existing, 1);
        assert_eq!(counts.skipped, 1);

        // A later roster scrape must not clear enrichment.
        upserter.upsert_players(india.id, &roster, "test").await.unwrap();
        let player = ctx.players().get_by_provider_id("1413").await.unwrap().unwrap();
        assert!(player.profile_scraped);
        assert_eq!(player.born.as_deref(), Some("Nov 05, 1988"));
        assert_eq!(player.slug.as_deref(), Some("virat-kohli"));
    }
}
