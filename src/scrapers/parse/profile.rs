//! Player profile page: personal details, per-format career statistics and
//! the career timeline.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::dom::{child_elements, is_leaf, parent_element, selector, text_of};
use crate::models::{CareerSpan, FormatStats};
use crate::scrapers::records::ProfileRec;

static DIVS: LazyLock<Selector> = LazyLock::new(|| selector("div"));
static TABLES: LazyLock<Selector> = LazyLock::new(|| selector("table"));
static ROWS: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static HEADER_CELLS: LazyLock<Selector> = LazyLock::new(|| selector("th, td"));
static CELLS: LazyLock<Selector> = LazyLock::new(|| selector("td"));

/// Tables past this index are never statistics.
const MAX_TABLES: usize = 4;

const BATTING_ALIASES: &[(&str, &str)] = &[
    ("matches", "matches"),
    ("innings", "innings"),
    ("runs", "runs"),
    ("balls", "balls"),
    ("highest", "highest"),
    ("average", "average"),
    ("avg", "average"),
    ("strike rate", "strike rate"),
    ("sr", "strike rate"),
    ("not outs", "not outs"),
    ("not out", "not outs"),
    ("4s", "fours"),
    ("fours", "fours"),
    ("6s", "sixes"),
    ("sixes", "sixes"),
    ("ducks", "ducks"),
    ("50s", "50s"),
    ("100s", "100s"),
    ("200s", "200s"),
];

const BOWLING_ALIASES: &[(&str, &str)] = &[
    ("matches", "matches"),
    ("innings", "innings"),
    ("balls", "balls"),
    ("runs", "runs"),
    ("maidens", "maidens"),
    ("wickets", "wickets"),
    ("average", "average"),
    ("avg", "average"),
    ("economy", "economy"),
    ("eco", "economy"),
    ("strike rate", "strike rate"),
    ("sr", "strike rate"),
    ("bbi", "bbi"),
    ("bbm", "bbm"),
    ("4w", "4w"),
    ("5w", "5w"),
    ("10w", "10w"),
];

/// Row labels that only occur in a bowling table.
const BOWLING_MARKERS: &[&str] = &["wickets", "economy", "eco", "bbi"];

const PERSONAL_LABELS: &[(Field, &[&str])] = &[
    (Field::Born, &["born", "date of birth"]),
    (Field::BirthPlace, &["birth place", "birthplace"]),
    (Field::Nickname, &["nickname", "also known as"]),
    (Field::Role, &["role"]),
    (Field::BattingStyle, &["batting style"]),
    (Field::BowlingStyle, &["bowling style"]),
];

#[derive(Debug, Clone, Copy)]
enum Field {
    Born,
    BirthPlace,
    Nickname,
    Role,
    BattingStyle,
    BowlingStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatKind {
    Batting,
    Bowling,
}

fn alias(kind: StatKind, label: &str) -> Option<&'static str> {
    let table = match kind {
        StatKind::Batting => BATTING_ALIASES,
        StatKind::Bowling => BOWLING_ALIASES,
    };
    table.iter().find(|(k, _)| *k == label).map(|(_, v)| *v)
}

fn format_token(header: &str) -> Option<&'static str> {
    match header {
        "test" => Some("test"),
        "odi" => Some("odi"),
        "t20" | "t20i" => Some("t20"),
        "ipl" => Some("ipl"),
        _ => None,
    }
}

fn label_key(text: &str) -> String {
    text.trim().trim_end_matches(':').trim().to_lowercase()
}

fn slot(profile: &mut ProfileRec, field: Field) -> &mut Option<String> {
    match field {
        Field::Born => &mut profile.born,
        Field::BirthPlace => &mut profile.birth_place,
        Field::Nickname => &mut profile.nickname,
        Field::Role => &mut profile.role,
        Field::BattingStyle => &mut profile.batting_style,
        Field::BowlingStyle => &mut profile.bowling_style,
    }
}

/// Value shown next to a label: the last div under the label's parent.
fn labelled_value(label: ElementRef<'_>) -> Option<String> {
    let parent = parent_element(label)?;
    let value = child_elements(parent)
        .filter(|c| c.value().name() == "div")
        .last()?;
    if value.id() == label.id() {
        return None;
    }
    Some(text_of(value)).filter(|v| !v.is_empty())
}

fn parse_personal(doc: &Html, profile: &mut ProfileRec) {
    for div in doc.select(&DIVS).filter(|d| is_leaf(*d)) {
        let key = label_key(&text_of(div));
        if key.is_empty() || key.len() > 20 {
            continue;
        }
        let Some((field, _)) = PERSONAL_LABELS
            .iter()
            .find(|(_, keys)| keys.contains(&key.as_str()))
        else {
            continue;
        };
        let target = slot(profile, *field);
        if target.is_none() {
            *target = labelled_value(div);
        }
    }
}

/// One statistics table: the format columns and the (label, cells) rows.
struct StatTable {
    columns: Vec<(&'static str, usize)>,
    rows: Vec<(String, Vec<String>)>,
}

impl StatTable {
    fn read(table: ElementRef<'_>) -> Option<Self> {
        let mut rows = table.select(&ROWS);
        let header = rows.next()?;
        let columns: Vec<_> = header
            .select(&HEADER_CELLS)
            .enumerate()
            .filter_map(|(i, c)| format_token(&text_of(c).to_lowercase()).map(|f| (f, i)))
            .collect();
        if columns.is_empty() {
            return None;
        }
        let rows: Vec<_> = rows
            .filter_map(|r| {
                let cells: Vec<String> = r.select(&CELLS).map(text_of).collect();
                if cells.len() < 2 {
                    return None;
                }
                Some((cells[0].to_lowercase(), cells))
            })
            .collect();
        Some(Self { columns, rows })
    }

    fn looks_like_bowling(&self) -> bool {
        self.rows
            .iter()
            .any(|(label, _)| BOWLING_MARKERS.contains(&label.as_str()))
    }

    /// Column feeding the flat legacy fields: ODI, then T20, then the first
    /// value column.
    fn legacy_column(&self) -> usize {
        let find = |f: &str| self.columns.iter().find(|(c, _)| *c == f).map(|(_, i)| *i);
        find("odi").or_else(|| find("t20")).unwrap_or(1)
    }
}

fn usable(value: &str) -> Option<String> {
    let v = value.trim();
    (!v.is_empty() && v != "-").then(|| v.to_string())
}

fn apply_table(profile: &mut ProfileRec, kind: StatKind, table: &StatTable) {
    let legacy_col = table.legacy_column();
    for (label, cells) in &table.rows {
        let Some(stat) = alias(kind, label) else { continue };

        let stats: &mut FormatStats = match kind {
            StatKind::Batting => &mut profile.batting_stats,
            StatKind::Bowling => &mut profile.bowling_stats,
        };
        for (format, col) in &table.columns {
            let Some(value) = cells.get(*col).and_then(|c| usable(c)) else { continue };
            if let Some(map) = stats.get_mut(format) {
                map.insert(stat.to_string(), value);
            }
        }

        if let Some(value) = cells.get(legacy_col).and_then(|c| usable(c)) {
            match kind {
                StatKind::Batting => profile.legacy.batting.set(stat, value),
                StatKind::Bowling => profile.legacy.bowling.set(stat, value),
            };
        }
    }
}

fn parse_stats(doc: &Html, profile: &mut ProfileRec) {
    let mut seen_batting = false;
    let mut seen_bowling = false;

    for table in doc.select(&TABLES).take(MAX_TABLES) {
        let Some(stats) = StatTable::read(table) else { continue };
        let kind = if stats.looks_like_bowling() {
            StatKind::Bowling
        } else if !seen_batting {
            StatKind::Batting
        } else {
            StatKind::Bowling
        };
        let seen = match kind {
            StatKind::Batting => &mut seen_batting,
            StatKind::Bowling => &mut seen_bowling,
        };
        if *seen {
            continue;
        }
        *seen = true;
        apply_table(profile, kind, &stats);
    }
}

/// Timeline rows are divs of at least three children: format, debut and
/// last match, where the debut names an opponent ("vs ...").
fn parse_timeline(doc: &Html, profile: &mut ProfileRec) {
    for div in doc.select(&DIVS) {
        let children: Vec<_> = child_elements(div).collect();
        if children.len() < 3 {
            continue;
        }
        let debut = text_of(children[1]);
        if !debut.contains("vs") {
            continue;
        }
        let format = text_of(children[0]).to_lowercase();
        if format.is_empty() || format.len() > 20 || format.contains("vs") {
            continue;
        }
        profile.career_timeline.insert(
            format,
            CareerSpan {
                debut,
                last_match: text_of(children[2]),
            },
        );
    }
}

/// Everything the profile page offers about a player.
pub fn parse_profile(html: &str) -> ProfileRec {
    let doc = Html::parse_document(html);
    let mut profile = ProfileRec::default();
    parse_personal(&doc, &mut profile);
    parse_stats(&doc, &mut profile);
    parse_timeline(&doc, &mut profile);
    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r#"
      <html><body>
        <div class="info">
          <div><div>Born</div><div>Nov 05, 1988 (37 years)</div></div>
          <div><div>Birth Place</div><div>Delhi</div></div>
          <div><div>Role</div><div>Batsman</div></div>
          <div><div>Batting Style</div><div>Right Handed Bat</div></div>
          <div><div>Bowling Style</div><div>Right-arm medium</div></div>
        </div>
        <table class="w-full"><tr><th></th><th>Test</th><th>ODI</th><th>T20</th><th>IPL</th></tr>
          <tr><td>Matches</td><td>123</td><td>302</td><td>125</td><td>267</td></tr>
          <tr><td>Avg</td><td>46.85</td><td>57.71</td><td>48.69</td><td>39.54</td></tr>
          <tr><td>SR</td><td>55.58</td><td>93.34</td><td>137.04</td><td>132.86</td></tr>
          <tr><td>4s</td><td>1027</td><td>1325</td><td>369</td><td>771</td></tr>
          <tr><td>100s</td><td>30</td><td>51</td><td>1</td><td>8</td></tr>
          <tr><td>Unknown</td><td>1</td><td>1</td><td>1</td><td>1</td></tr>
        </table>
        <table class="w-full"><tr><th></th><th>Test</th><th>ODI</th><th>T20I</th><th>IPL</th></tr>
          <tr><td>Wickets</td><td>0</td><td>5</td><td>4</td><td>-</td></tr>
          <tr><td>Eco</td><td>2.27</td><td>6.22</td><td>8.05</td><td></td></tr>
          <tr><td>BBI</td><td>0/0</td><td>1/15</td><td>1/13</td><td>-</td></tr>
        </table>
        <div class="timeline">
          <div><div>Test</div><div>vs West Indies, 20 Jun 2011</div><div>vs South Africa, 03 Jan 2024</div></div>
          <div><div>ODI</div><div>vs Sri Lanka, 18 Aug 2008</div><div>vs Australia, 19 Nov 2023</div></div>
        </div>
      </body></html>"#;

    #[test]
    fn test_personal_info() {
        let p = parse_profile(PROFILE);
        assert_eq!(p.born.as_deref(), Some("Nov 05, 1988 (37 years)"));
        assert_eq!(p.birth_place.as_deref(), Some("Delhi"));
        assert_eq!(p.role.as_deref(), Some("Batsman"));
        assert_eq!(p.batting_style.as_deref(), Some("Right Handed Bat"));
        assert_eq!(p.bowling_style.as_deref(), Some("Right-arm medium"));
        assert_eq!(p.nickname, None);
    }

    #[test]
    fn test_batting_aliases() {
        let p = parse_profile(PROFILE);
        let odi = &p.batting_stats.odi;
        assert_eq!(odi.get("average").map(String::as_str), Some("57.71"));
        assert_eq!(odi.get("strike rate").map(String::as_str), Some("93.34"));
        assert_eq!(odi.get("fours").map(String::as_str), Some("1325"));
        assert_eq!(odi.get("100s").map(String::as_str), Some("51"));
        assert!(!odi.contains_key("unknown"));
        assert_eq!(p.batting_stats.ipl.get("matches").map(String::as_str), Some("267"));
    }

    #[test]
    fn test_bowling_table_and_t20i_column() {
        let p = parse_profile(PROFILE);
        assert_eq!(p.bowling_stats.t20.get("wickets").map(String::as_str), Some("4"));
        assert_eq!(p.bowling_stats.odi.get("economy").map(String::as_str), Some("6.22"));
        assert!(!p.bowling_stats.ipl.contains_key("wickets"));
        assert!(!p.bowling_stats.ipl.contains_key("economy"));
    }

    #[test]
    fn test_legacy_fields_from_odi_column() {
        let p = parse_profile(PROFILE);
        assert_eq!(p.legacy.batting.bat_matches.as_deref(), Some("302"));
        assert_eq!(p.legacy.batting.bat_hundreds.as_deref(), Some("51"));
        assert_eq!(p.legacy.bowling.bowl_wickets.as_deref(), Some("5"));
        assert_eq!(p.legacy.bowling.bowl_best_innings.as_deref(), Some("1/15"));
    }

    #[test]
    fn test_career_timeline() {
        let p = parse_profile(PROFILE);
        let test = &p.career_timeline["test"];
        assert_eq!(test.debut, "vs West Indies, 20 Jun 2011");
        assert_eq!(test.last_match, "vs South Africa, 03 Jan 2024");
        assert!(p.career_timeline.contains_key("odi"));
        assert_eq!(p.career_timeline.len(), 2);
    }

    #[test]
    fn test_empty_page() {
        assert!(parse_profile("<html><body><p>Not found</p></body></html>").is_empty());
    }
}
