//! Persisted scheduler configuration.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::context::SETTINGS_ROW;
use super::models::{
    CategoryScheduleRecord, LiveScoreScrapeSettingRecord, MatchScrapeSettingRecord,
    ScrapeSettingRecord,
};
use super::now_text;
use super::pool::{DbError, DbPool};
use crate::models::{CategorySchedule, LiveScoreScrapeSetting, MatchScrapeSetting, ScrapeSetting};
use crate::schema::{
    live_score_scrape_settings, match_scrape_settings, profile_scrape_settings, scrape_settings,
    series_scrape_settings,
};

/// Which `last_scrape` column a finished job stamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleTouch {
    Teams,
    Players,
    Profiles(String),
    Series(String),
    Matches,
    Live,
}

/// Updates a per-category player schedule pair on the global settings row.
macro_rules! set_category_pair {
    ($conn:expr, $auto:ident, $time:ident, $enabled:expr, $at:expr, $now:expr) => {
        diesel::update(scrape_settings::table.find(SETTINGS_ROW))
            .set((
                scrape_settings::$auto.eq($enabled),
                scrape_settings::$time.eq($at),
                scrape_settings::updated_at.eq($now),
            ))
            .execute($conn)
            .await?
    };
}

#[derive(Clone)]
pub struct SettingsRepository {
    pool: DbPool,
}

impl SettingsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn scrape_setting(&self) -> Result<ScrapeSetting, DbError> {
        let mut conn = self.pool.get().await?;
        scrape_settings::table
            .find(SETTINGS_ROW)
            .select(ScrapeSettingRecord::as_select())
            .first(&mut conn)
            .await
            .map(ScrapeSetting::from)
    }

    pub async fn profile_schedules(&self) -> Result<Vec<CategorySchedule>, DbError> {
        let mut conn = self.pool.get().await?;
        profile_scrape_settings::table
            .order(profile_scrape_settings::id.asc())
            .load::<CategoryScheduleRecord>(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(CategorySchedule::from).collect())
    }

    pub async fn series_schedules(&self) -> Result<Vec<CategorySchedule>, DbError> {
        let mut conn = self.pool.get().await?;
        series_scrape_settings::table
            .order(series_scrape_settings::id.asc())
            .load::<CategoryScheduleRecord>(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(CategorySchedule::from).collect())
    }

    pub async fn match_setting(&self) -> Result<MatchScrapeSetting, DbError> {
        let mut conn = self.pool.get().await?;
        match_scrape_settings::table
            .find(SETTINGS_ROW)
            .select(MatchScrapeSettingRecord::as_select())
            .first(&mut conn)
            .await
            .map(MatchScrapeSetting::from)
    }

    pub async fn live_setting(&self) -> Result<LiveScoreScrapeSetting, DbError> {
        let mut conn = self.pool.get().await?;
        live_score_scrape_settings::table
            .find(SETTINGS_ROW)
            .select(LiveScoreScrapeSettingRecord::as_select())
            .first(&mut conn)
            .await
            .map(LiveScoreScrapeSetting::from)
    }

    /// Daily team scrape toggle and time.
    pub async fn set_team_schedule(&self, enabled: bool, at: &str) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;
        let now = now_text();
        diesel::update(scrape_settings::table.find(SETTINGS_ROW))
            .set((
                scrape_settings::auto_scrape_enabled.eq(enabled),
                scrape_settings::scrape_time.eq(at),
                scrape_settings::updated_at.eq(&now),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// Daily all-teams roster scrape toggle and time.
    pub async fn set_player_schedule(&self, enabled: bool, at: &str) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;
        let now = now_text();
        diesel::update(scrape_settings::table.find(SETTINGS_ROW))
            .set((
                scrape_settings::player_auto_scrape_enabled.eq(enabled),
                scrape_settings::player_scrape_time.eq(at),
                scrape_settings::updated_at.eq(&now),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// Per-category roster schedule. Returns false for an unknown category.
    pub async fn set_category_player_schedule(
        &self,
        slug: &str,
        enabled: bool,
        at: &str,
    ) -> Result<bool, DbError> {
        let mut conn = self.pool.get().await?;
        let now = now_text();
        let conn = &mut conn;
        let rows = match slug {
            "international" => set_category_pair!(conn, intl_auto, intl_time, enabled, at, &now),
            "domestic" => set_category_pair!(conn, domestic_auto, domestic_time, enabled, at, &now),
            "league" => set_category_pair!(conn, league_auto, league_time, enabled, at, &now),
            "women" => set_category_pair!(conn, women_auto, women_time, enabled, at, &now),
            _ => 0,
        };
        Ok(rows > 0)
    }

    /// Per-category profile schedule. Returns false for an unknown category.
    pub async fn set_profile_schedule(
        &self,
        slug: &str,
        enabled: bool,
        at: &str,
    ) -> Result<bool, DbError> {
        let mut conn = self.pool.get().await?;
        let now = now_text();
        let rows = diesel::update(
            profile_scrape_settings::table.filter(profile_scrape_settings::category_slug.eq(slug)),
        )
        .set((
            profile_scrape_settings::auto_scrape_enabled.eq(enabled),
            profile_scrape_settings::scrape_time.eq(at),
            profile_scrape_settings::updated_at.eq(&now),
        ))
        .execute(&mut conn)
        .await?;
        Ok(rows > 0)
    }

    /// Per-category series schedule. Returns false for an unknown category.
    pub async fn set_series_schedule(
        &self,
        slug: &str,
        enabled: bool,
        at: &str,
    ) -> Result<bool, DbError> {
        let mut conn = self.pool.get().await?;
        let now = now_text();
        let rows = diesel::update(
            series_scrape_settings::table.filter(series_scrape_settings::category_slug.eq(slug)),
        )
        .set((
            series_scrape_settings::auto_scrape_enabled.eq(enabled),
            series_scrape_settings::scrape_time.eq(at),
            series_scrape_settings::updated_at.eq(&now),
        ))
        .execute(&mut conn)
        .await?;
        Ok(rows > 0)
    }

    pub async fn set_match_schedule(&self, enabled: bool, interval_hours: i32) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;
        let now = now_text();
        diesel::update(match_scrape_settings::table.find(SETTINGS_ROW))
            .set((
                match_scrape_settings::auto_scrape_enabled.eq(enabled),
                match_scrape_settings::interval_hours.eq(interval_hours),
                match_scrape_settings::updated_at.eq(&now),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn set_live_schedule(&self, enabled: bool, interval_seconds: i32) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;
        let now = now_text();
        diesel::update(live_score_scrape_settings::table.find(SETTINGS_ROW))
            .set((
                live_score_scrape_settings::auto_scrape_enabled.eq(enabled),
                live_score_scrape_settings::interval_seconds.eq(interval_seconds),
                live_score_scrape_settings::updated_at.eq(&now),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// Stamp the `last_scrape` column belonging to a finished job.
    pub async fn touch(&self, which: &ScheduleTouch) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;
        let now = now_text();
        match which {
            ScheduleTouch::Teams => {
                diesel::update(scrape_settings::table.find(SETTINGS_ROW))
                    .set(scrape_settings::last_scrape.eq(Some(&now)))
                    .execute(&mut conn)
                    .await?
            }
            ScheduleTouch::Players => {
                diesel::update(scrape_settings::table.find(SETTINGS_ROW))
                    .set(scrape_settings::last_player_scrape.eq(Some(&now)))
                    .execute(&mut conn)
                    .await?
            }
            ScheduleTouch::Profiles(slug) => {
                diesel::update(
                    profile_scrape_settings::table
                        .filter(profile_scrape_settings::category_slug.eq(slug)),
                )
                .set(profile_scrape_settings::last_scrape.eq(Some(&now)))
                .execute(&mut conn)
                .await?
            }
            ScheduleTouch::Series(slug) => {
                diesel::update(
                    series_scrape_settings::table
                        .filter(series_scrape_settings::category_slug.eq(slug)),
                )
                .set(series_scrape_settings::last_scrape.eq(Some(&now)))
                .execute(&mut conn)
                .await?
            }
            ScheduleTouch::Matches => {
                diesel::update(match_scrape_settings::table.find(SETTINGS_ROW))
                    .set(match_scrape_settings::last_scrape.eq(Some(&now)))
                    .execute(&mut conn)
                    .await?
            }
            ScheduleTouch::Live => {
                diesel::update(live_score_scrape_settings::table.find(SETTINGS_ROW))
                    .set(live_score_scrape_settings::last_scrape.eq(Some(&now)))
                    .execute(&mut conn)
                    .await?
            }
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::test_context;

    #[tokio::test]
    async fn test_schedule_updates() {
        let (ctx, _dir) = test_context().await;
        let settings = ctx.settings();

        settings.set_team_schedule(true, "01:30").await.unwrap();
        assert!(settings.set_category_player_schedule("league", true, "08:15").await.unwrap());
        assert!(!settings.set_category_player_schedule("club", true, "08:15").await.unwrap());
        let row = settings.scrape_setting().await.unwrap();
        assert!(row.auto_scrape_enabled);
        assert_eq!(row.scrape_time, "01:30");
        assert_eq!(row.category_players("league"), Some((true, "08:15")));
        assert_eq!(row.category_players("women"), Some((false, "07:00")));

        assert!(settings.set_profile_schedule("women", true, "22:00").await.unwrap());
        assert!(!settings.set_series_schedule("club", true, "22:00").await.unwrap());
        let women = settings
            .profile_schedules()
            .await
            .unwrap()
            .into_iter()
            .find(|s| s.category_slug == "women")
            .unwrap();
        assert!(women.auto_scrape_enabled);
        assert_eq!(women.scrape_time, "22:00");

        settings.set_live_schedule(true, 30).await.unwrap();
        assert_eq!(settings.live_setting().await.unwrap().interval_seconds, 30);
    }

    #[tokio::test]
    async fn test_touch_sets_last_scrape() {
        let (ctx, _dir) = test_context().await;
        let settings = ctx.settings();
        assert!(settings.match_setting().await.unwrap().last_scrape.is_none());

        settings.touch(&ScheduleTouch::Matches).await.unwrap();
        settings
            .touch(&ScheduleTouch::Series("women".into()))
            .await
            .unwrap();

        assert!(settings.match_setting().await.unwrap().last_scrape.is_some());
        let series = settings.series_schedules().await.unwrap();
        let women = series.iter().find(|s| s.category_slug == "women").unwrap();
        let all = series.iter().find(|s| s.category_slug == "all").unwrap();
        assert!(women.last_scrape.is_some());
        assert!(all.last_scrape.is_none());
    }
}
