// Diesel table definitions. Kept in sync by hand with
// `repository::context::SCHEMA_SQL`.

diesel::table! {
    team_categories (id) {
        id -> Integer,
        name -> Text,
        slug -> Text,
        url -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    teams (id) {
        id -> Integer,
        team_id -> Text,
        name -> Text,
        short_name -> Nullable<Text>,
        flag_url -> Nullable<Text>,
        team_url -> Nullable<Text>,
        category_id -> Integer,
        slug -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    players (id) {
        id -> Integer,
        player_id -> Text,
        name -> Text,
        role -> Nullable<Text>,
        photo_url -> Nullable<Text>,
        player_url -> Nullable<Text>,
        team_id -> Integer,
        slug -> Nullable<Text>,
        born -> Nullable<Text>,
        birth_place -> Nullable<Text>,
        nickname -> Nullable<Text>,
        batting_style -> Nullable<Text>,
        bowling_style -> Nullable<Text>,
        legacy_stats -> Text,
        batting_stats -> Nullable<Text>,
        bowling_stats -> Nullable<Text>,
        career_timeline -> Nullable<Text>,
        profile_scraped -> Bool,
        profile_scraped_at -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    series_categories (id) {
        id -> Integer,
        name -> Text,
        slug -> Text,
        url -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    series (id) {
        id -> Integer,
        series_id -> Text,
        name -> Text,
        series_url -> Nullable<Text>,
        start_date -> Nullable<Text>,
        end_date -> Nullable<Text>,
        date_range -> Nullable<Text>,
        category_id -> Nullable<Integer>,
        slug -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    matches (id) {
        id -> Integer,
        match_id -> Text,
        series_id -> Nullable<Text>,
        team1_id -> Nullable<Text>,
        team2_id -> Nullable<Text>,
        venue_id -> Nullable<Text>,
        match_desc -> Nullable<Text>,
        match_format -> Nullable<Text>,
        venue -> Nullable<Text>,
        match_date -> Nullable<Text>,
        state -> Text,
        team1_name -> Nullable<Text>,
        team2_name -> Nullable<Text>,
        team1_score -> Nullable<Text>,
        team2_score -> Nullable<Text>,
        team1_flag -> Nullable<Text>,
        team2_flag -> Nullable<Text>,
        result -> Nullable<Text>,
        match_url -> Nullable<Text>,
        series_ref -> Nullable<Integer>,
        batting_data -> Nullable<Text>,
        bowling_data -> Nullable<Text>,
        innings_data -> Nullable<Text>,
        toss -> Nullable<Text>,
        live_status -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    scrape_logs (id) {
        id -> Integer,
        category -> Nullable<Text>,
        status -> Text,
        message -> Nullable<Text>,
        teams_scraped -> Integer,
        players_scraped -> Integer,
        created_at -> Text,
    }
}

diesel::table! {
    scrape_settings (id) {
        id -> Integer,
        auto_scrape_enabled -> Bool,
        scrape_time -> Text,
        last_scrape -> Nullable<Text>,
        player_auto_scrape_enabled -> Bool,
        player_scrape_time -> Text,
        last_player_scrape -> Nullable<Text>,
        intl_auto -> Bool,
        intl_time -> Text,
        domestic_auto -> Bool,
        domestic_time -> Text,
        league_auto -> Bool,
        league_time -> Text,
        women_auto -> Bool,
        women_time -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    profile_scrape_settings (id) {
        id -> Integer,
        category_slug -> Text,
        auto_scrape_enabled -> Bool,
        scrape_time -> Text,
        last_scrape -> Nullable<Text>,
        updated_at -> Text,
    }
}

diesel::table! {
    series_scrape_settings (id) {
        id -> Integer,
        category_slug -> Text,
        auto_scrape_enabled -> Bool,
        scrape_time -> Text,
        last_scrape -> Nullable<Text>,
        updated_at -> Text,
    }
}

diesel::table! {
    match_scrape_settings (id) {
        id -> Integer,
        auto_scrape_enabled -> Bool,
        interval_hours -> Integer,
        last_scrape -> Nullable<Text>,
        updated_at -> Text,
    }
}

diesel::table! {
    live_score_scrape_settings (id) {
        id -> Integer,
        auto_scrape_enabled -> Bool,
        interval_seconds -> Integer,
        last_scrape -> Nullable<Text>,
        updated_at -> Text,
    }
}

diesel::joinable!(teams -> team_categories (category_id));
diesel::joinable!(players -> teams (team_id));
diesel::joinable!(series -> series_categories (category_id));
diesel::joinable!(matches -> series (series_ref));

diesel::allow_tables_to_appear_in_same_query!(
    team_categories,
    teams,
    players,
    series_categories,
    series,
    matches,
    scrape_logs,
    scrape_settings,
    profile_scrape_settings,
    series_scrape_settings,
    match_scrape_settings,
    live_score_scrape_settings,
);
