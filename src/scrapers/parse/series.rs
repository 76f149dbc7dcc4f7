//! Series category listing.
//!
//! Tried in order: the `seriesScheduleData` month-grouped array, the
//! `seriesId`/`seriesName` pairs inside match blocks, and finally the
//! rendered series anchors.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use super::dom::{selector, text_of};
use super::embedded::{array_after, has_payload, read_matches, unescape};
use crate::normalize::{date_from_name, date_from_title, epoch_ms_to_iso, slugify};
use crate::scrapers::identity::{dedup_by_id, series_id_from_url};
use crate::scrapers::records::SeriesRec;
use crate::scrapers::absolute_url;

static SERIES_LINKS: LazyLock<Selector> =
    LazyLock::new(|| selector("a[href*='/cricket-series/'][href*='/matches']"));
static ELLIPSIS: LazyLock<Selector> = LazyLock::new(|| selector(".text-ellipsis"));

/// Canonical series URL, `/cricket-series/<id>/<slug>/matches`.
pub fn series_url(base_url: &str, series_id: &str, name: &str) -> String {
    absolute_url(base_url, &format!("/cricket-series/{}/{}/matches", series_id, slugify(name)))
}

fn first_str(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match obj.get(*k)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn epoch_field(obj: &Value, keys: &[&str]) -> Option<i64> {
    first_str(obj, keys)?.parse().ok()
}

fn date_range(start_ms: Option<i64>, end_ms: Option<i64>) -> Option<String> {
    let fmt = |ms: i64, f: &str| chrono::DateTime::from_timestamp(ms.div_euclid(1000), 0).map(|d| d.format(f).to_string());
    match (start_ms, end_ms) {
        (Some(s), Some(e)) => Some(format!("{} - {}", fmt(s, "%b %d")?, fmt(e, "%b %d, %Y")?)),
        (Some(s), None) => fmt(s, "%b %d, %Y"),
        _ => None,
    }
}

fn from_schedule(text: &str, base_url: &str) -> Vec<SeriesRec> {
    let Some(array) = array_after(text, "seriesScheduleData") else {
        return Vec::new();
    };
    let groups: Vec<Value> = match serde_json::from_str(array) {
        Ok(v) => v,
        Err(e) => {
            debug!("seriesScheduleData is not valid JSON: {}", e);
            return Vec::new();
        }
    };

    let mut out = Vec::new();
    for group in &groups {
        let month = first_str(group, &["date", "month", "monthYear"]);
        let entries = ["series", "seriesList", "seriesScheduleList"]
            .iter()
            .find_map(|k| group.get(*k).and_then(Value::as_array));
        let Some(entries) = entries else { continue };

        for entry in entries {
            let Some(series_id) = first_str(entry, &["id", "seriesId"]) else { continue };
            let Some(name) = first_str(entry, &["name", "seriesName"]) else { continue };
            let start = epoch_field(entry, &["startDt", "startDate"]);
            let end = epoch_field(entry, &["endDt", "endDate"]);
            out.push(SeriesRec {
                series_url: Some(series_url(base_url, &series_id, &name)),
                start_date: start.and_then(epoch_ms_to_iso),
                end_date: end.and_then(epoch_ms_to_iso),
                date_range: first_str(entry, &["dateRange", "seriesDates"]).or_else(|| date_range(start, end)),
                month_label: month.clone(),
                series_id,
                name,
            });
        }
    }
    out
}

fn from_match_blocks(text: &str, base_url: &str) -> Vec<SeriesRec> {
    read_matches(text)
        .into_iter()
        .filter_map(|m| {
            let series_id = m.series_id?;
            let name = m.series_name?;
            Some(SeriesRec {
                series_url: Some(series_url(base_url, &series_id, &name)),
                series_id,
                name,
                ..Default::default()
            })
        })
        .collect()
}

fn from_anchors(html: &str, base_url: &str) -> Vec<SeriesRec> {
    let doc = Html::parse_document(html);
    doc.select(&SERIES_LINKS)
        .filter_map(|link| {
            let href = link.value().attr("href")?;
            let series_id = series_id_from_url(href)?;
            let name = link
                .select(&ELLIPSIS)
                .next()
                .map(text_of)
                .unwrap_or_else(|| text_of(link));
            if name.len() < 3 {
                return None;
            }
            let title = link.value().attr("title").unwrap_or("");
            Some(SeriesRec {
                series_url: Some(absolute_url(base_url, href)),
                start_date: date_from_title(title),
                series_id,
                name,
                ..Default::default()
            })
        })
        .collect()
}

/// Series on a category listing page.
///
/// Series without a start date get one derived from their name, in
/// `default_year` unless the name carries a year.
pub fn parse_series_listing(html: &str, base_url: &str, default_year: i32) -> Vec<SeriesRec> {
    let text = unescape(html);

    let mut series = from_schedule(&text, base_url);
    if series.is_empty() && has_payload(&text) {
        series = from_match_blocks(&text, base_url);
    }
    if series.is_empty() {
        series = from_anchors(html, base_url);
    }

    let mut series = dedup_by_id(series, |s| &s.series_id);
    for s in &mut series {
        if s.start_date.is_none() {
            s.start_date = date_from_name(&s.name, default_year);
        }
    }
    debug!("Parsed {} series from listing", series.len());
    series
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.cricbuzz.com";

    #[test]
    fn test_schedule_data() {
        let html = r#"<script>self.__next_f.push([1,"{\"seriesScheduleData\":[{\"date\":\"January 2026\",\"series\":[{\"id\":9237,\"name\":\"India tour of Australia, 2026\",\"startDt\":\"1768037400000\",\"endDt\":1769990400000},{\"id\":9240,\"name\":\"Big Bash League 2025-26\"}]}]}"])</script>"#;
        let series = parse_series_listing(html, BASE, 2026);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].series_id, "9237");
        assert_eq!(series[0].month_label.as_deref(), Some("January 2026"));
        assert_eq!(series[0].start_date.as_deref(), Some("2026-01-10"));
        assert_eq!(series[0].end_date.as_deref(), Some("2026-02-02"));
        assert_eq!(series[0].date_range.as_deref(), Some("Jan 10 - Feb 02, 2026"));
        assert_eq!(
            series[0].series_url.as_deref(),
            Some("https://www.cricbuzz.com/cricket-series/9237/india-tour-of-australia-2026/matches")
        );
        assert_eq!(series[1].start_date, None);
    }

    #[test]
    fn test_match_block_fallback() {
        let html = r#"{\"matchInfo\":{\"matchId\":1,\"seriesId\":77,\"seriesName\":\"Asia Cup, Sep 9\"}}{\"matchInfo\":{\"matchId\":2,\"seriesId\":77,\"seriesName\":\"Asia Cup, Sep 9\"}}"#;
        let series = parse_series_listing(html, BASE, 2025);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name, "Asia Cup, Sep 9");
        assert_eq!(series[0].start_date.as_deref(), Some("2025-09-09"));
    }

    #[test]
    fn test_anchor_fallback() {
        let html = r#"
          <a class="flex justify-between items-center" href="/cricket-series/9100/ranji-trophy-2025-26/matches" title="Ranji Trophy 2025-26, 15 Oct 2025 - 1 Mar 2026">
            <div class="text-ellipsis">Ranji Trophy 2025-26</div><div>Oct 15 - Mar 01</div>
          </a>
          <a href="/cricket-series/9100/ranji-trophy-2025-26/matches"><div class="text-ellipsis">Ranji Trophy 2025-26</div></a>
          <a href="/cricket-series/abc/matches">Broken</a>"#;
        let series = parse_series_listing(html, BASE, 2026);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].series_id, "9100");
        assert_eq!(series[0].start_date.as_deref(), Some("2025-10-15"));
    }
}
