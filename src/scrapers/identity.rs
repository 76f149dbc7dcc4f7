//! Provider-id extraction and verification.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

static TEAM_URL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/cricket-team/(?:[^/?#]+/)+(\d+)(?:[/?#]|$)").unwrap());
static PLAYER_URL_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/profiles/(\d+)(?:[/?#]|$)").unwrap());
static SERIES_URL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/cricket-series/(\d+)(?:[/?#]|$)").unwrap());
static MATCH_URL_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:live-cricket-scores|live-cricket-scorecard|cricket-scores)/(\d+)(?:[/?#]|$)").unwrap()
});

/// A usable provider id is a non-empty run of ASCII digits.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// Team id from the trailing numeric segment of `/cricket-team/<slug>/<id>`.
pub fn team_id_from_url(url: &str) -> Option<String> {
    TEAM_URL_ID.captures(url).map(|c| c[1].to_string())
}

/// Player id from `/profiles/<id>/<slug>`.
pub fn player_id_from_url(url: &str) -> Option<String> {
    PLAYER_URL_ID.captures(url).map(|c| c[1].to_string())
}

/// Series id from `/cricket-series/<id>/...`.
pub fn series_id_from_url(url: &str) -> Option<String> {
    SERIES_URL_ID.captures(url).map(|c| c[1].to_string())
}

/// Match id from a match landing or scorecard URL.
pub fn match_id_from_url(url: &str) -> Option<String> {
    MATCH_URL_ID.captures(url).map(|c| c[1].to_string())
}

/// Reconcile the id a page reports about itself with the id it was fetched
/// for. The page wins; a disagreement is logged.
pub fn verify_page_id(kind: &str, requested: &str, found: Option<&str>) -> String {
    match found {
        Some(found) if is_valid_id(found) => {
            if found != requested {
                warn!(
                    kind,
                    %requested,
                    %found,
                    "Page reports a different {} id than requested; using the page's id",
                    kind
                );
            }
            found.to_string()
        }
        _ => requested.to_string(),
    }
}

/// Keep the first record per provider id, dropping records without one.
pub fn dedup_by_id<T, F>(items: Vec<T>, id: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            let key = id(item);
            is_valid_id(key) && seen.insert(key.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::records::TeamRec;

    #[test]
    fn test_ids_from_urls() {
        assert_eq!(
            team_id_from_url("https://www.cricbuzz.com/cricket-team/india/2"),
            Some("2".into())
        );
        assert_eq!(
            team_id_from_url("/cricket-team/new-zealand/13/players"),
            Some("13".into())
        );
        assert_eq!(team_id_from_url("/cricket-team/domestic"), None);
        assert_eq!(
            player_id_from_url("/profiles/1413/virat-kohli"),
            Some("1413".into())
        );
        assert_eq!(
            series_id_from_url("/cricket-series/9237/asia-cup-2025/matches"),
            Some("9237".into())
        );
        assert_eq!(
            match_id_from_url("/live-cricket-scores/125643/ind-vs-aus-1st-odi"),
            Some("125643".into())
        );
        assert_eq!(
            match_id_from_url("/live-cricket-scorecard/777666"),
            Some("777666".into())
        );
    }

    #[test]
    fn test_verify_page_id() {
        assert_eq!(verify_page_id("match", "777666", Some("999888")), "999888");
        assert_eq!(verify_page_id("match", "777666", None), "777666");
        assert_eq!(verify_page_id("match", "777666", Some("")), "777666");
        assert_eq!(verify_page_id("match", "1", Some("1")), "1");
    }

    #[test]
    fn test_dedup_by_id() {
        let teams = vec![
            TeamRec { team_id: "2".into(), name: "India".into(), ..Default::default() },
            TeamRec { team_id: "".into(), name: "Nobody".into(), ..Default::default() },
            TeamRec { team_id: "2".into(), name: "India again".into(), ..Default::default() },
            TeamRec { team_id: "4".into(), name: "India".into(), ..Default::default() },
        ];
        let kept = dedup_by_id(teams, |t| &t.team_id);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].name, "India");
        assert_eq!(kept[1].team_id, "4");
    }
}
