//! Series matches page and single match pages.

use std::collections::HashMap;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::debug;

use super::dom::selector;
use super::embedded::{has_payload, read_matches, unescape, MatchFields};
use super::live::match_from_anchor;
use super::scorecard::{page_fields, parse_innings, verified_match_id};
use crate::models::MatchState;
use crate::normalize::{format_epoch_ms, slugify};
use crate::scrapers::absolute_url;
use crate::scrapers::identity::is_valid_id;
use crate::scrapers::records::MatchRec;

static MATCH_LINKS: LazyLock<Selector> = LazyLock::new(|| selector("a[href*='/live-cricket-scores/']"));

/// Canonical landing URL, `/live-cricket-scores/<id>/<slug>`.
pub fn match_url(base_url: &str, match_id: &str, fields: &MatchFields) -> String {
    let t1 = fields.team1.short_name.as_deref().or(fields.team1.name.as_deref()).unwrap_or("");
    let t2 = fields.team2.short_name.as_deref().or(fields.team2.name.as_deref()).unwrap_or("");
    let mut slug = slugify(&format!(
        "{} vs {} {} {}",
        t1,
        t2,
        fields.match_desc.as_deref().unwrap_or(""),
        fields.series_name.as_deref().unwrap_or("")
    ));
    if t1.is_empty() && t2.is_empty() {
        slug = slugify(fields.match_desc.as_deref().unwrap_or("match"));
    }
    absolute_url(base_url, &format!("/live-cricket-scores/{}/{}", match_id, slug))
}

/// Convert one payload block into a match record.
pub(crate) fn match_from_fields(fields: MatchFields, base_url: &str) -> Option<MatchRec> {
    let match_id = fields.match_id.clone().filter(|id| is_valid_id(id))?;
    let venue = match (&fields.venue_ground, &fields.venue_city) {
        (Some(g), Some(c)) => Some(format!("{}, {}", g, c)),
        (Some(g), None) => Some(g.clone()),
        (None, Some(c)) => Some(c.clone()),
        (None, None) => None,
    };
    let result = (fields.state == MatchState::Complete)
        .then(|| fields.status.clone())
        .flatten();

    Some(MatchRec {
        match_url: Some(match_url(base_url, &match_id, &fields)),
        match_id,
        series_id: fields.series_id,
        series_name: fields.series_name,
        team1_id: fields.team1.id,
        team2_id: fields.team2.id,
        venue_id: fields.venue_id,
        match_desc: fields.match_desc,
        match_format: fields.match_format,
        venue,
        match_date: fields.start_date_ms.and_then(format_epoch_ms),
        state: fields.raw_state.as_ref().map(|_| fields.state),
        status: fields.status,
        team1_name: fields.team1.name,
        team2_name: fields.team2.name,
        team1_short: fields.team1.short_name,
        team2_short: fields.team2.short_name,
        team1_score: fields.team1_score,
        team2_score: fields.team2_score,
        result,
        ..Default::default()
    })
}

fn fill_opt<T>(slot: &mut Option<T>, other: Option<T>) {
    if slot.is_none() {
        *slot = other;
    }
}

fn fill_str(slot: &mut String, other: String) {
    if slot.is_empty() {
        *slot = other;
    }
}

/// Fill fields still missing on `into` from a later block for the same match.
fn merge_into(into: &mut MatchRec, from: MatchRec) {
    fill_opt(&mut into.series_id, from.series_id);
    fill_opt(&mut into.series_name, from.series_name);
    fill_opt(&mut into.team1_id, from.team1_id);
    fill_opt(&mut into.team2_id, from.team2_id);
    fill_opt(&mut into.venue_id, from.venue_id);
    fill_opt(&mut into.match_desc, from.match_desc);
    fill_opt(&mut into.match_format, from.match_format);
    fill_opt(&mut into.venue, from.venue);
    fill_opt(&mut into.match_date, from.match_date);
    fill_opt(&mut into.state, from.state);
    fill_opt(&mut into.status, from.status);
    fill_opt(&mut into.team1_name, from.team1_name);
    fill_opt(&mut into.team2_name, from.team2_name);
    fill_opt(&mut into.team1_short, from.team1_short);
    fill_opt(&mut into.team2_short, from.team2_short);
    fill_str(&mut into.team1_score, from.team1_score);
    fill_str(&mut into.team2_score, from.team2_score);
    fill_opt(&mut into.result, from.result);
}

fn from_payload(text: &str, base_url: &str, series_filter: Option<&str>) -> Vec<MatchRec> {
    let mut order: Vec<String> = Vec::new();
    let mut by_id: HashMap<String, MatchRec> = HashMap::new();

    for fields in read_matches(text) {
        if let Some(wanted) = series_filter {
            if fields.series_id.as_deref() != Some(wanted) {
                debug!(
                    "Skipping match block from series {:?} (want {})",
                    fields.series_id, wanted
                );
                continue;
            }
        }
        let Some(rec) = match_from_fields(fields, base_url) else { continue };
        match by_id.get_mut(&rec.match_id) {
            Some(existing) => merge_into(existing, rec),
            None => {
                order.push(rec.match_id.clone());
                by_id.insert(rec.match_id.clone(), rec);
            }
        }
    }

    order.into_iter().filter_map(|id| by_id.remove(&id)).collect()
}

fn from_anchors(html: &str, base_url: &str) -> Vec<MatchRec> {
    let doc = Html::parse_document(html);
    let mut seen = std::collections::HashSet::new();
    doc.select(&MATCH_LINKS)
        .filter_map(|link| match_from_anchor(link, base_url))
        .filter(|m| seen.insert(m.match_id.clone()))
        .collect()
}

/// Matches on a series page.
///
/// When `series_filter` is given, payload blocks belonging to any other
/// series are skipped. The rendered anchors are used only when the payload
/// yields nothing, and never for a filtered page that carries a payload,
/// since anchors carry no series id.
pub fn parse_series_matches(html: &str, base_url: &str, series_filter: Option<&str>) -> Vec<MatchRec> {
    let text = unescape(html);
    let payload = has_payload(&text);
    let mut matches = Vec::new();
    if payload {
        matches = from_payload(&text, base_url, series_filter);
    }
    if matches.is_empty() && !(payload && series_filter.is_some()) {
        matches = from_anchors(html, base_url);
    }
    debug!("Parsed {} matches from series page", matches.len());
    matches
}

/// Read one match's own landing or scorecard page.
///
/// Ids come from the page's payload and are checked against
/// `requested_id`. Scores the payload does not give are taken from the
/// innings headers.
pub fn parse_match_page(html: &str, requested_id: &str, base_url: &str) -> MatchRec {
    let text = unescape(html);
    let fields = page_fields(&text, requested_id);
    let match_id = verified_match_id(&text, fields.as_ref(), requested_id);

    let mut rec = fields
        .and_then(|f| match_from_fields(f, base_url))
        .unwrap_or_default();
    rec.match_id = match_id;

    let doc = Html::parse_document(html);
    let innings = parse_innings(&doc);
    let state_allows_scores = rec.state.map(|s| s.has_scores()).unwrap_or(true);
    if state_allows_scores && !innings.is_empty() {
        let first_team = innings.first().map(|(team_id, _)| team_id.clone());
        for (team_id, inn) in &innings {
            let line = inn.score_line();
            if line.is_empty() {
                continue;
            }
            let is_team1 = match rec.team1_id.as_deref() {
                Some(id) => id == team_id,
                None => Some(team_id) == first_team.as_ref(),
            };
            let (score, name) = if is_team1 {
                (&mut rec.team1_score, &mut rec.team1_name)
            } else {
                (&mut rec.team2_score, &mut rec.team2_name)
            };
            if score.is_empty() || inn.innings_num > 2 {
                *score = line;
            }
            if name.is_none() && !inn.team_name.is_empty() {
                *name = Some(inn.team_name.clone());
            }
        }
    }
    rec
}
