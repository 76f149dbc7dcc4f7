//! Extraction over the JSON payload embedded in hydration scripts.
//!
//! The payload arrives with its structural quotes escaped (`\"`). It is
//! unescaped once and then read with field-level regexes that tolerate
//! unquoted keys and extra enclosing braces. Match-scoped reads are bounded
//! to a per-match context so fields never bleed between adjacent matches.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::MatchState;

/// Marker opening one match's JSON.
pub const MATCH_INFO: &str = "\"matchInfo\"";

/// Upper bound on a match context. Bounding at the next `matchInfo` is what
/// keeps contexts isolated; the window only caps runaway spans.
pub const CONTEXT_WINDOW: usize = 2000;

/// Window read after a `matchScoreMap` entry.
const SCORE_MAP_WINDOW: usize = 1500;

static MATCH_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""?\bmatchId"?\s*:\s*"?(\d+)"?"#).unwrap());
static SERIES_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""?\bseriesId"?\s*:\s*"?(\d+)"?"#).unwrap());
static SERIES_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""?\bseriesName"?\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap());
static MATCH_DESC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""?\bmatchDesc"?\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap());
static MATCH_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""?\bmatchFormat"?\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap());
static STATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""?\bstate"?\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap());
static STATUS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""?\bstatus"?\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap());
static START_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""?\bstartDate"?\s*:\s*"?(\d+)"?"#).unwrap());
static TEAM1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""?\bteam1"?\s*:\s*\{+([^{}]*)\}"#).unwrap());
static TEAM2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""?\bteam2"?\s*:\s*\{+([^{}]*)\}"#).unwrap());
static VENUE_INFO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""?\bvenueInfo"?\s*:\s*\{+([^{}]*)\}"#).unwrap());
static TEAM1_SCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""?\bteam1Score"?\s*:\s*\{+\s*"?inngs1"?\s*:\s*\{+([^{}]*)\}(?:\s*,\s*"?inngs2"?\s*:\s*\{+([^{}]*)\})?"#)
        .unwrap()
});
static TEAM2_SCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""?\bteam2Score"?\s*:\s*\{+\s*"?inngs1"?\s*:\s*\{+([^{}]*)\}(?:\s*,\s*"?inngs2"?\s*:\s*\{+([^{}]*)\})?"#)
        .unwrap()
});
static TEAM2_SCORE_KEY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""?\bteam2Score"?\s*:"#).unwrap());
static FLAT_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""?(\w+)"?\s*:\s*(?:"((?:[^"\\]|\\.)*)"|(-?\d+(?:\.\d+)?|true|false|null))"#).unwrap()
});

/// Undo one level of quote escaping.
pub fn unescape(text: &str) -> Cow<'_, str> {
    if text.contains("\\\"") {
        Cow::Owned(text.replace("\\\"", "\""))
    } else {
        Cow::Borrowed(text)
    }
}

/// Cheap check for a hydration payload carrying match data.
pub fn has_payload(text: &str) -> bool {
    text.contains("matchInfo")
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    if idx >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Per-match spans: each starts at a `"matchInfo"` and ends at the next one
/// or after [`CONTEXT_WINDOW`] bytes, whichever comes first.
pub fn match_contexts(text: &str) -> Vec<&str> {
    let starts: Vec<usize> = text.match_indices(MATCH_INFO).map(|(i, _)| i).collect();
    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let next = starts.get(n + 1).copied().unwrap_or(text.len());
            let end = floor_char_boundary(text, next.min(start + CONTEXT_WINDOW));
            &text[start..end]
        })
        .collect()
}

/// Flat `key: value` pairs of a brace-free object body.
pub fn flat_object(body: &str) -> HashMap<String, String> {
    FLAT_PAIR
        .captures_iter(body)
        .map(|c| {
            let value = c
                .get(2)
                .or_else(|| c.get(3))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            (c[1].to_string(), value)
        })
        .collect()
}

fn capture(re: &Regex, ctx: &str) -> Option<String> {
    re.captures(ctx)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Format one innings object as "R/W (O)". Wickets and overs are omitted
/// when absent.
pub fn format_innings(obj: &HashMap<String, String>) -> String {
    let Some(runs) = obj.get("runs").filter(|r| !r.is_empty()) else {
        return String::new();
    };
    let mut out = runs.clone();
    if let Some(w) = obj.get("wickets").filter(|w| !w.is_empty() && *w != "null") {
        out.push('/');
        out.push_str(w);
    }
    if let Some(o) = obj.get("overs").filter(|o| !o.is_empty() && *o != "null") {
        out.push_str(&format!(" ({})", o));
    }
    out
}

fn score_from(caps: Option<regex::Captures<'_>>) -> String {
    let Some(caps) = caps else {
        return String::new();
    };
    let first = format_innings(&flat_object(&caps[1]));
    match caps.get(2) {
        Some(second) => {
            let second = format_innings(&flat_object(second.as_str()));
            if second.is_empty() {
                first
            } else {
                format!("{} & {}", first, second)
            }
        }
        None => first,
    }
}

/// The span following this match's entry in a `matchScoreMap`, if any.
fn score_map_entry<'a>(text: &'a str, match_id: &str) -> Option<&'a str> {
    let key = format!("\"{}\"", match_id);
    for (pos, _) in text.match_indices("\"matchScoreMap\"") {
        let rest = &text[pos..];
        let Some(rel) = rest.find(&key) else { continue };
        let entry_start = pos + rel;
        let after_key = &text[entry_start + key.len()..];
        if !after_key.trim_start().starts_with(':') {
            continue;
        }
        let end = floor_char_boundary(text, entry_start + SCORE_MAP_WINDOW);
        let span = &text[entry_start..end];
        let span = match span[key.len()..].find(MATCH_INFO) {
            Some(i) => &span[..key.len() + i],
            None => span,
        };
        return Some(span);
    }
    None
}

/// Teams as read from a `team1`/`team2` object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamInfo {
    pub id: Option<String>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub image_id: Option<String>,
}

impl TeamInfo {
    fn from_object(obj: &HashMap<String, String>) -> Self {
        let get = |k: &str| obj.get(k).filter(|v| !v.is_empty()).cloned();
        Self {
            id: get("teamId").or_else(|| get("id")),
            name: get("teamName").or_else(|| get("name")),
            short_name: get("teamSName").or_else(|| get("shortName")),
            image_id: get("imageId"),
        }
    }
}

/// Everything read from one match context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchFields {
    pub match_id: Option<String>,
    pub series_id: Option<String>,
    pub series_name: Option<String>,
    pub match_desc: Option<String>,
    pub match_format: Option<String>,
    pub raw_state: Option<String>,
    pub state: MatchState,
    pub status: Option<String>,
    pub start_date_ms: Option<i64>,
    pub team1: TeamInfo,
    pub team2: TeamInfo,
    pub venue_ground: Option<String>,
    pub venue_city: Option<String>,
    pub venue_id: Option<String>,
    pub team1_score: String,
    pub team2_score: String,
}

/// Read one match's fields from its bounded context.
///
/// `page` is the whole unescaped page, consulted only for the
/// `matchScoreMap` cross-check when the context is ambiguous about team 2's
/// score.
pub fn read_match(ctx: &str, page: &str) -> MatchFields {
    let raw_state = capture(&STATE, ctx);
    let state = MatchState::normalize(raw_state.as_deref().unwrap_or(""));

    let mut fields = MatchFields {
        match_id: capture(&MATCH_ID, ctx),
        series_id: capture(&SERIES_ID, ctx),
        series_name: capture(&SERIES_NAME, ctx),
        match_desc: capture(&MATCH_DESC, ctx),
        match_format: capture(&MATCH_FORMAT, ctx),
        raw_state,
        state,
        status: capture(&STATUS, ctx),
        start_date_ms: capture(&START_DATE, ctx).and_then(|s| s.parse().ok()),
        ..Default::default()
    };

    if let Some(c) = TEAM1.captures(ctx) {
        fields.team1 = TeamInfo::from_object(&flat_object(&c[1]));
    }
    if let Some(c) = TEAM2.captures(ctx) {
        fields.team2 = TeamInfo::from_object(&flat_object(&c[1]));
    }
    if let Some(c) = VENUE_INFO.captures(ctx) {
        let venue = flat_object(&c[1]);
        let get = |k: &str| venue.get(k).filter(|v| !v.is_empty()).cloned();
        fields.venue_ground = get("ground");
        fields.venue_city = get("city");
        fields.venue_id = get("id");
    }

    if state.has_scores() {
        fields.team1_score = score_from(TEAM1_SCORE.captures(ctx));

        let ambiguous = TEAM2_SCORE_KEY.find_iter(ctx).count() > 1;
        let cross_checked = if ambiguous {
            fields
                .match_id
                .as_deref()
                .and_then(|id| score_map_entry(page, id))
                .map(|entry| score_from(TEAM2_SCORE.captures(entry)))
                .filter(|s| !s.is_empty())
        } else {
            None
        };
        fields.team2_score =
            cross_checked.unwrap_or_else(|| score_from(TEAM2_SCORE.captures(ctx)));
    }

    fields
}

/// Read every match on a page, in page order.
pub fn read_matches(page: &str) -> Vec<MatchFields> {
    match_contexts(page)
        .into_iter()
        .map(|ctx| read_match(ctx, page))
        .collect()
}

/// Locate the JSON array that follows `key` and return it as text, matching
/// brackets while skipping string contents.
pub fn array_after<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let key_pos = text.find(key)?;
    let open = key_pos + text[key_pos..].find('[')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[open..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
