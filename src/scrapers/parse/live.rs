//! Live-score board.
//!
//! Each match on the board is an anchor to `/live-cricket-scores/<id>/...`
//! whose `title` reads "IND vs AUS, 1st ODI - India won by 5 wickets".
//! Teams, description and state all come from that title; a live-tag class
//! inside the anchor forces the match live.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::dom::{has_class_where, selector, text_nodes, text_of};
use crate::models::MatchState;
use crate::normalize::{canonical_team_name, short_code};
use crate::scrapers::identity::{dedup_by_id, match_id_from_url};
use crate::scrapers::records::MatchRec;
use crate::scrapers::absolute_url;

static MATCH_LINKS: LazyLock<Selector> = LazyLock::new(|| selector("a[href*='/live-cricket-scores/']"));
static DESCENDANTS: LazyLock<Selector> = LazyLock::new(|| selector("*"));
static WHITE_TEXT: LazyLock<Selector> = LazyLock::new(|| selector("div[class*='text-white']"));

static BREAK_WORDS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(?:stumps|lunch|tea|drinks)\b").unwrap());
static FINISHED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:won|tied|drawn|complete|completed|abandoned|abandon)\b|\bno result\b").unwrap()
});
static NOT_STARTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(?:preview|upcoming|scheduled)\b").unwrap());
static IN_PLAY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(?:need|trail|lead)(?:s|ing)?\b").unwrap());
static SCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+)(?:[-/](\d+))?(?:\s*\(\s*(\d+(?:\.\d+)?)\s*(?:ov|overs?)?\s*\))?$").unwrap()
});

/// Qualifiers stripped from the end of the second team, in order. The
/// stripped text becomes the match description.
static TEAM2_QUALIFIERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i),?\s+(\d+(?:st|nd|rd|th)\s+(?:Youth\s+|Unofficial\s+)?(?:T20I?|ODI|Test|Match|unofficial Test))\s*$",
        r"(?i),?\s+((?:Semi-?Final|Final|Qualifier\s*\d*|Eliminator)(?:\s+\d+)?)\s*$",
        r"(?i),?\s+(Group\s+[A-Z])\s*$",
        r"(?i),?\s+(Match\s+\d+)\s*$",
        r",\s+(.+)$",
    ]
    .iter()
    .map(|r| Regex::new(r).unwrap())
    .collect()
});

/// State implied by a board title. `live_tag` reports a live-tag element
/// inside the anchor, which wins over the title.
pub fn live_state_from_title(title: &str, live_tag: bool) -> MatchState {
    if live_tag {
        return MatchState::Live;
    }
    let full = title.trim().to_lowercase();
    if full.ends_with(" - live") || full.ends_with(" live") {
        return MatchState::Live;
    }
    let status = full.rsplit(" - ").next().unwrap_or(&full);

    if status.contains("innings break") || BREAK_WORDS.is_match(status) {
        MatchState::InningsBreak
    } else if FINISHED.is_match(status) {
        MatchState::Complete
    } else if NOT_STARTED.is_match(status) {
        MatchState::Upcoming
    } else if IN_PLAY.is_match(status) {
        MatchState::Live
    } else {
        MatchState::Upcoming
    }
}

/// Pieces of a board title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleParts {
    pub team1: String,
    pub team2: String,
    pub match_desc: Option<String>,
    pub status: Option<String>,
}

/// Split "IND vs AUS, 1st ODI - India won by 5 wickets".
pub fn split_title(title: &str) -> Option<TitleParts> {
    let title = title.trim();
    let (head, status) = match title.rsplit_once(" - ") {
        Some((h, s)) => (h.trim(), Some(s.trim().to_string()).filter(|s| !s.is_empty())),
        None => (title, None),
    };
    let (team1, rest) = head.split_once(" vs ")?;

    let mut team2 = rest.trim().to_string();
    let mut match_desc = None;
    for re in TEAM2_QUALIFIERS.iter() {
        if let Some(c) = re.captures(&team2) {
            match_desc = Some(c[1].trim().to_string());
            let start = c.get(0).map(|m| m.start()).unwrap_or(team2.len());
            team2.truncate(start);
            break;
        }
    }

    let team1 = team1.trim().to_string();
    let team2 = team2.trim().trim_end_matches(',').trim().to_string();
    if team1.is_empty() || team2.is_empty() {
        return None;
    }
    Some(TitleParts {
        team1,
        team2,
        match_desc,
        status,
    })
}

/// Canonical name plus short code for a title team.
fn team_names(raw: &str) -> (String, Option<String>) {
    let name = canonical_team_name(raw);
    let code = short_code(&name).map(str::to_string).or_else(|| {
        let r = raw.trim();
        (r.len() <= 4 && r.chars().all(|c| c.is_ascii_uppercase())).then(|| r.to_string())
    });
    (name, code)
}

fn format_score(text: &str) -> Option<String> {
    let c = SCORE.captures(text.trim())?;
    let mut out = c[1].to_string();
    if let Some(w) = c.get(2) {
        out.push('/');
        out.push_str(w.as_str());
    }
    if let Some(o) = c.get(3) {
        out.push_str(&format!(" ({})", o.as_str()));
    }
    Some(out)
}

/// Class tokens the board uses to badge a match in progress.
const LIVE_TAG_CLASSES: [&str; 2] = ["cb-text-live", "live"];

fn has_live_tag(link: ElementRef<'_>) -> bool {
    link.select(&DESCENDANTS)
        .any(|e| has_class_where(e, |c| LIVE_TAG_CLASSES.contains(&c)))
}

/// Build a match from one board anchor.
pub(crate) fn match_from_anchor(link: ElementRef<'_>, base_url: &str) -> Option<MatchRec> {
    let href = link.value().attr("href")?;
    let match_id = match_id_from_url(href)?;

    let title = link
        .value()
        .attr("title")
        .map(str::to_string)
        .filter(|t| t.contains(" vs "))
        .or_else(|| link.select(&WHITE_TEXT).map(text_of).find(|t| t.contains(" vs ")))
        .unwrap_or_else(|| text_of(link));
    let parts = split_title(&title).unwrap_or_default();
    let state = live_state_from_title(&title, has_live_tag(link));

    let mut rec = MatchRec {
        match_id,
        match_url: Some(absolute_url(base_url, href)),
        match_desc: parts.match_desc.clone(),
        status: parts.status.clone(),
        state: Some(state),
        ..Default::default()
    };
    if !parts.team1.is_empty() {
        let (name, code) = team_names(&parts.team1);
        rec.team1_name = Some(name);
        rec.team1_short = code;
        let (name, code) = team_names(&parts.team2);
        rec.team2_name = Some(name);
        rec.team2_short = code;
    }
    if state == MatchState::Complete {
        rec.result = parts.status;
    }

    if state.has_scores() {
        let scores: Vec<String> = text_nodes(link).iter().filter_map(|t| format_score(t)).collect();
        if let Some(s) = scores.first() {
            rec.team1_score = s.clone();
        }
        if let Some(s) = scores.get(1) {
            rec.team2_score = s.clone();
        }
    }

    Some(rec)
}

/// Matches on the live-score board, deduplicated by provider id.
pub fn parse_live_scores(html: &str, base_url: &str) -> Vec<MatchRec> {
    let doc = Html::parse_document(html);
    let matches: Vec<MatchRec> = doc
        .select(&MATCH_LINKS)
        .filter_map(|link| match_from_anchor(link, base_url))
        .collect();
    dedup_by_id(matches, |m| &m.match_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.cricbuzz.com";

    #[test]
    fn test_state_from_title() {
        let cases = [
            ("IND vs AUS, 1st ODI - India won by 5 wickets", MatchState::Complete),
            ("ENG vs NZ, 2nd Test - Stumps", MatchState::InningsBreak),
            ("ENG vs NZ, 2nd Test - Day 2: Lunch Break", MatchState::InningsBreak),
            ("PAK vs SL, Final - Innings Break", MatchState::InningsBreak),
            ("SA vs WI, 3rd T20I - Preview", MatchState::Upcoming),
            ("SA vs WI, 3rd T20I - Match tied", MatchState::Complete),
            ("SA vs WI, 3rd T20I - Match drawn", MatchState::Complete),
            ("BAN vs AFG, 1st ODI - Afghanistan need 45 runs", MatchState::Live),
            ("BAN vs AFG, 1st Test - Bangladesh lead by 120 runs", MatchState::Live),
            ("BAN vs AFG, 1st ODI - Live", MatchState::Live),
            ("BAN vs AFG, 1st ODI", MatchState::Upcoming),
        ];
        for (title, expected) in cases {
            assert_eq!(live_state_from_title(title, false), expected, "{}", title);
        }
        assert_eq!(
            live_state_from_title("SA vs WI, 3rd T20I - Preview", true),
            MatchState::Live
        );
    }

    #[test]
    fn test_won_is_a_whole_word() {
        assert_eq!(
            live_state_from_title("IND vs AUS, 1st ODI - Rain delays wonderful chase", false),
            MatchState::Upcoming
        );
        assert_eq!(
            live_state_from_title("IND vs AUS, 1st ODI - Rain delays start of play", false),
            MatchState::Upcoming
        );
    }

    #[test]
    fn test_live_tag_needs_exact_class() {
        let html = r#"
          <a href="/live-cricket-scores/301/a-vs-b" title="IND vs AUS, 1st ODI - Preview">
            <span class="btn-olive">IND</span>
          </a>
          <a href="/live-cricket-scores/302/c-vs-d" title="ENG vs NZ, 1st ODI - Preview">
            <span class="badge live">Live</span>
          </a>"#;
        let matches = parse_live_scores(html, BASE);
        assert_eq!(matches[0].state, Some(MatchState::Upcoming));
        assert_eq!(matches[1].state, Some(MatchState::Live));
    }

    #[test]
    fn test_split_title_qualifiers() {
        let parts = split_title("IND vs AUS, 3rd T20I - India won by 5 wickets").unwrap();
        assert_eq!(parts.team1, "IND");
        assert_eq!(parts.team2, "AUS");
        assert_eq!(parts.match_desc.as_deref(), Some("3rd T20I"));
        assert_eq!(parts.status.as_deref(), Some("India won by 5 wickets"));

        let final_ = split_title("Mumbai Indians vs Chennai Super Kings, Final").unwrap();
        assert_eq!(final_.team2, "Chennai Super Kings");
        assert_eq!(final_.match_desc.as_deref(), Some("Final"));

        let group = split_title("Nepal vs Oman, Group A").unwrap();
        assert_eq!(group.team2, "Oman");
        assert_eq!(group.match_desc.as_deref(), Some("Group A"));

        let nth = split_title("RR vs GT, 16th Match").unwrap();
        assert_eq!(nth.team2, "GT");
        assert_eq!(nth.match_desc.as_deref(), Some("16th Match"));

        assert_eq!(split_title("Highlights"), None);
    }

    #[test]
    fn test_board_anchors() {
        let html = r#"
          <div>
            <a href="/live-cricket-scores/125643/ind-vs-aus-1st-odi" title="IND vs AUS, 1st ODI - India won by 5 wickets">
              <span>IND</span><span>250-9 (50)</span><span>AUS</span><span>251-5 (47.2)</span>
            </a>
            <a href="/live-cricket-scores/125644/eng-vs-nz" title="ENG vs NZ, 2nd T20I - Preview">
              <span>ENG</span><span>0</span>
            </a>
            <a href="/live-cricket-scores/125645/sa-vs-wi">
              <div class="text-white">SA vs WI, 1st Test</div><span class="cb-text-live">Live</span>
              <span>120-2 (30.1 Ov)</span>
            </a>
            <a href="/live-cricket-scores/125643/ind-vs-aus-1st-odi" title="duplicate">x</a>
          </div>"#;
        let matches = parse_live_scores(html, BASE);
        assert_eq!(matches.len(), 3);

        let done = &matches[0];
        assert_eq!(done.match_id, "125643");
        assert_eq!(done.state, Some(MatchState::Complete));
        assert_eq!(done.team1_name.as_deref(), Some("India"));
        assert_eq!(done.team1_short.as_deref(), Some("IND"));
        assert_eq!(done.team2_name.as_deref(), Some("Australia"));
        assert_eq!(done.match_desc.as_deref(), Some("1st ODI"));
        assert_eq!(done.team1_score, "250/9 (50)");
        assert_eq!(done.team2_score, "251/5 (47.2)");
        assert_eq!(done.result.as_deref(), Some("India won by 5 wickets"));

        let preview = &matches[1];
        assert_eq!(preview.state, Some(MatchState::Upcoming));
        assert_eq!(preview.team1_score, "");

        let live = &matches[2];
        assert_eq!(live.state, Some(MatchState::Live));
        assert_eq!(live.team1_name.as_deref(), Some("South Africa"));
        assert_eq!(live.team2_name.as_deref(), Some("West Indies"));
        assert_eq!(live.team1_score, "120/2 (30.1)");
    }
}
