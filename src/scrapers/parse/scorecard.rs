//! Match scorecard page.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::dom::{child_elements, has_class_where, is_leaf, parent_element, selector, text_nodes, text_of};
use super::embedded::{read_matches, unescape, MatchFields};
use crate::normalize::{clean_text, format_epoch_ms};
use crate::scrapers::identity::verify_page_id;
use crate::scrapers::records::{BatterRow, BowlerRow, InningsRec, ScorecardRec};

static WITH_ID: LazyLock<Selector> = LazyLock::new(|| selector("[id]"));
static DIVS: LazyLock<Selector> = LazyLock::new(|| selector("div"));
static ANCHORS: LazyLock<Selector> = LazyLock::new(|| selector("a"));
static VENUE_LINKS: LazyLock<Selector> =
    LazyLock::new(|| selector("a[href*='/cricket-stadium/'], a[href*='/venues/']"));
static LEAVES: LazyLock<Selector> = LazyLock::new(|| selector("div, span, td"));

static INNINGS_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^team-(\d+)-innings-(\d+)$").unwrap());
static INNINGS_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s+(\d+)(?:[-/](\d+))?\s*\((\d+(?:\.\d+)?)\s*Ov").unwrap()
});
static TOTAL_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(?:[-/](\d+))?\s*\((\d+(?:\.\d+)?)\s*Ov").unwrap());
static FALL_OF_WICKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+-\d+\s*\([^()]*?\d+(?:\.\d+)?\s*(?:ov)?\)").unwrap());
static MATCH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:Mon|Tue|Wed|Thu|Fri|Sat|Sun)[a-z]*,\s+(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{1,2},\s+\d{4}\b")
        .unwrap()
});
static PAGE_MATCH_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""matchId"\s*:\s*"?(\d+)"?"#).unwrap());

/// Result lines, tried in order.
static RESULTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b[A-Z][\w .'&-]*?\s+won by an innings and \d+ runs?\b",
        r"\b[A-Z][\w .'&-]*?\s+won by \d+ (?:runs?|wkts?|wickets?)\b(?: \(DLS method\))?",
        r"\bMatch drawn\b",
        r"\bMatch tied\b(?: \([^)]*\))?",
        r"\bNo result\b",
    ]
    .iter()
    .map(|r| Regex::new(r).unwrap())
    .collect()
});

const HEADER_MAX_LEN: usize = 120;

/// Match fields from the page's own payload: the block naming
/// `requested_id`, or the first block on the page.
pub(crate) fn page_fields(text: &str, requested_id: &str) -> Option<MatchFields> {
    let mut all = read_matches(text);
    let pos = all
        .iter()
        .position(|m| m.match_id.as_deref() == Some(requested_id))
        .unwrap_or(0);
    (!all.is_empty()).then(|| all.swap_remove(pos))
}

/// The page's own match id, checked against the requested one.
pub(crate) fn verified_match_id(text: &str, fields: Option<&MatchFields>, requested_id: &str) -> String {
    let found = fields
        .and_then(|f| f.match_id.clone())
        .or_else(|| PAGE_MATCH_ID.captures(text).map(|c| c[1].to_string()));
    verify_page_id("match", requested_id, found.as_deref())
}

fn result_line(doc: &Html) -> Option<String> {
    let nodes: Vec<String> = doc.root_element().text().map(clean_text).filter(|t| !t.is_empty()).collect();
    RESULTS
        .iter()
        .find_map(|re| nodes.iter().find_map(|n| re.find(n).map(|m| m.as_str().to_string())))
}

fn toss_line(doc: &Html) -> Option<String> {
    doc.root_element()
        .text()
        .map(clean_text)
        .find(|t| t.contains("won the toss"))
        .map(|t| t.trim_start_matches("Toss").trim_start_matches(':').trim().to_string())
}

fn match_date(doc: &Html) -> Option<String> {
    doc.root_element()
        .text()
        .find_map(|t| MATCH_DATE.find(t).map(|m| clean_text(m.as_str())))
}

fn venue(doc: &Html) -> Option<String> {
    if let Some(link) = doc.select(&VENUE_LINKS).next() {
        let text = text_of(link);
        if !text.is_empty() {
            return Some(text);
        }
    }
    doc.select(&LEAVES)
        .filter(|e| is_leaf(*e))
        .find(|e| {
            let t = text_of(*e);
            t == "Venue" || t == "Venue:"
        })
        .and_then(|label| {
            let parent = parent_element(label)?;
            let value = child_elements(parent).last()?;
            (value.id() != label.id()).then(|| text_of(value))
        })
        .filter(|v| !v.is_empty())
}

fn header_from(el: ElementRef<'_>) -> Option<(String, String, String)> {
    std::iter::once(el)
        .chain(el.select(&DIVS))
        .map(text_of)
        .filter(|t| !t.is_empty() && t.len() < HEADER_MAX_LEN)
        .find_map(|t| {
            let c = INNINGS_HEADER.captures(&t)?;
            if c[1].trim().eq_ignore_ascii_case("total") {
                return None;
            }
            let total = match c.get(3) {
                Some(w) => format!("{}/{}", &c[2], w.as_str()),
                None => c[2].to_string(),
            };
            Some((c[1].trim().to_string(), total, c[4].to_string()))
        })
}

fn is_row_of(el: ElementRef<'_>, grid: &str) -> bool {
    has_class_where(el, |c| c.contains(grid))
}

fn batter_row(cells: &[ElementRef<'_>]) -> Option<BatterRow> {
    let texts: Vec<String> = cells.iter().map(|c| text_of(*c)).collect();
    let (name, dismissal, stats) = if texts.len() >= 7 {
        (texts[0].clone(), texts[1].clone(), &texts[2..7])
    } else if texts.len() == 6 {
        let first = cells[0];
        let name = first
            .select(&ANCHORS)
            .next()
            .map(text_of)
            .or_else(|| text_nodes(first).into_iter().next())?;
        let dismissal = text_nodes(first)
            .into_iter()
            .filter(|t| *t != name)
            .collect::<Vec<_>>()
            .join(" ");
        (name, dismissal, &texts[1..6])
    } else {
        return None;
    };
    if name.is_empty() {
        return None;
    }
    Some(BatterRow {
        name,
        dismissal,
        runs: stats[0].clone(),
        balls: stats[1].clone(),
        fours: stats[2].clone(),
        sixes: stats[3].clone(),
        strike_rate: stats[4].clone(),
    })
}

fn bowler_row(cells: &[ElementRef<'_>]) -> Option<BowlerRow> {
    if cells.len() < 6 {
        return None;
    }
    let texts: Vec<String> = cells.iter().map(|c| text_of(*c)).collect();
    let name = texts[0].clone();
    if name.is_empty() {
        return None;
    }
    Some(BowlerRow {
        name,
        overs: texts[1].clone(),
        maidens: texts[2].clone(),
        runs: texts[3].clone(),
        wickets: texts[4].clone(),
        economy: texts[texts.len() - 1].clone(),
    })
}

fn read_innings(doc: &Html, block: ElementRef<'_>, innings_num: u32) -> InningsRec {
    let mut innings = InningsRec {
        innings_num,
        ..Default::default()
    };

    let block_id = block.value().id().unwrap_or_default();
    let header = header_from(block).or_else(|| {
        doc.select(&WITH_ID)
            .filter(|e| {
                let id = e.value().id().unwrap_or_default();
                id != block_id && id.ends_with(block_id)
            })
            .find_map(header_from)
    });
    if let Some((team, total, overs)) = header {
        innings.team_name = team;
        innings.total_score = total;
        innings.overs = overs;
    }

    for row in block.select(&DIVS).filter(|d| is_row_of(*d, "scorecard-bat-grid")) {
        let cells: Vec<_> = child_elements(row).collect();
        let Some(first) = cells.first().map(|c| text_of(*c)) else { continue };
        match first.as_str() {
            "Batter" | "Batsman" => {}
            "Extras" => {
                innings.extras = cells.get(1..).map(|rest| {
                    rest.iter().map(|c| text_of(*c)).collect::<Vec<_>>().join(" ")
                });
            }
            "Total" => {
                if innings.total_score.is_empty() {
                    let line = text_of(row);
                    if let Some(c) = TOTAL_ROW.captures(&line) {
                        innings.total_score = match c.get(2) {
                            Some(w) => format!("{}/{}", &c[1], w.as_str()),
                            None => c[1].to_string(),
                        };
                        innings.overs = c[3].to_string();
                    }
                }
            }
            _ => innings.batting.extend(batter_row(&cells)),
        }
    }

    for row in block.select(&DIVS).filter(|d| is_row_of(*d, "scorecard-bowl-grid")) {
        let cells: Vec<_> = child_elements(row).collect();
        if cells.first().map(|c| text_of(*c)).as_deref() == Some("Bowler") {
            continue;
        }
        innings.bowling.extend(bowler_row(&cells));
    }

    let text = text_of(block);
    if let Some(pos) = text.find("Fall of Wickets") {
        innings.fall_of_wickets = FALL_OF_WICKET
            .find_iter(&text[pos..])
            .map(|m| m.as_str().to_string())
            .collect();
    }

    innings
}

/// Innings blocks in document order, with the team id each block names.
pub(crate) fn parse_innings(doc: &Html) -> Vec<(String, InningsRec)> {
    doc.select(&WITH_ID)
        .filter_map(|el| {
            let id = el.value().id()?;
            let caps = INNINGS_ID.captures(id)?;
            Some((caps[1].to_string(), el))
        })
        .enumerate()
        .map(|(i, (team_id, el))| (team_id, read_innings(doc, el, i as u32 + 1)))
        .collect()
}

/// Parse a scorecard fetched for `requested_id`. The page's own match id
/// wins when the two disagree.
pub fn parse_scorecard(html: &str, requested_id: &str) -> ScorecardRec {
    let text = unescape(html);
    let fields = page_fields(&text, requested_id);
    let match_id = verified_match_id(&text, fields.as_ref(), requested_id);

    let doc = Html::parse_document(html);
    let innings = parse_innings(&doc);

    let mut team_ids = Vec::new();
    for (team_id, _) in &innings {
        if !team_ids.contains(team_id) {
            team_ids.push(team_id.clone());
        }
    }

    let fields = fields.unwrap_or_default();
    let json_venue = match (&fields.venue_ground, &fields.venue_city) {
        (Some(g), Some(c)) => Some(format!("{}, {}", g, c)),
        (Some(g), None) => Some(g.clone()),
        _ => None,
    };

    ScorecardRec {
        match_id,
        series_id: fields.series_id,
        team1_id: fields.team1.id.or_else(|| team_ids.first().cloned()),
        team2_id: fields.team2.id.or_else(|| team_ids.get(1).cloned()),
        venue_id: fields.venue_id,
        venue: venue(&doc).or(json_venue),
        match_date: match_date(&doc).or_else(|| fields.start_date_ms.and_then(format_epoch_ms)),
        result: result_line(&doc),
        toss: toss_line(&doc),
        innings: innings.into_iter().map(|(_, i)| i).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: &str = r#"
      <html><body>
        <script>self.__next_f.push([1,"{\"matchInfo\":{\"matchId\":555,\"seriesId\":9237,\"team1\":{\"teamId\":4,\"teamName\":\"Australia\"},\"team2\":{\"teamId\":2,\"teamName\":\"India\"},\"venueInfo\":{\"id\":31,\"ground\":\"Melbourne Cricket Ground\",\"city\":\"Melbourne\"}}}"])</script>
        <div>Toss: Australia won the toss and opted to bat</div>
        <div>Sat, Jan 10, 2026</div>
        <a href="/cricket-stadium/31/melbourne-cricket-ground">Melbourne Cricket Ground, Melbourne</a>
        <div class="result">India won by 5 wkts</div>
        <div id="caret-team-4-innings-1"><div>Australia 250-9 (50 Ov)</div></div>
        <div id="team-4-innings-1">
          <div class="grid scorecard-bat-grid"><div>Batter</div><div>R</div><div>B</div><div>4s</div><div>6s</div><div>SR</div></div>
          <div class="grid scorecard-bat-grid"><div><a href="/profiles/1">Travis Head</a><div>c Kohli b Bumrah</div></div><div>88</div><div>90</div><div>9</div><div>2</div><div>97.78</div></div>
          <div class="grid scorecard-bat-grid"><div>Mitchell Marsh</div><div>not out</div><div>40</div><div>38</div><div>3</div><div>1</div><div>105.26</div></div>
          <div class="grid scorecard-bat-grid"><div>Extras</div><div>12</div><div>(b 1, lb 4, w 7)</div></div>
          <div class="grid scorecard-bat-grid"><div>Total</div><div>250-9 (50 Ov)</div></div>
          <div class="grid scorecard-bowl-grid"><div>Bowler</div><div>O</div><div>M</div><div>R</div><div>W</div><div>NB</div><div>WD</div><div>ECO</div></div>
          <div class="grid scorecard-bowl-grid"><div>Jasprit Bumrah</div><div>10</div><div>1</div><div>42</div><div>3</div><div>0</div><div>2</div><div>4.20</div></div>
          <div>Fall of Wickets</div><div>1-20 (Usman Khawaja, 3.4 ov), 2-160 (Travis Head, 32.1 ov)</div>
        </div>
        <div id="team-2-innings-2">
          <div>India 251-5 (47.2 Ov)</div>
          <div class="grid scorecard-bat-grid"><div>Virat Kohli</div><div>not out</div><div>101</div><div>110</div><div>8</div><div>2</div><div>91.82</div></div>
        </div>
        <div id="scard-team-2-innings-2">ignored</div>
      </body></html>"#;

    #[test]
    fn test_ids_venue_result() {
        let card = parse_scorecard(CARD, "555");
        assert_eq!(card.match_id, "555");
        assert_eq!(card.series_id.as_deref(), Some("9237"));
        assert_eq!(card.team1_id.as_deref(), Some("4"));
        assert_eq!(card.venue_id.as_deref(), Some("31"));
        assert_eq!(card.venue.as_deref(), Some("Melbourne Cricket Ground, Melbourne"));
        assert_eq!(card.match_date.as_deref(), Some("Sat, Jan 10, 2026"));
        assert_eq!(card.result.as_deref(), Some("India won by 5 wkts"));
        assert_eq!(card.toss.as_deref(), Some("Australia won the toss and opted to bat"));
    }

    #[test]
    fn test_innings_blocks() {
        let card = parse_scorecard(CARD, "555");
        assert_eq!(card.innings.len(), 2);

        let first = &card.innings[0];
        assert_eq!(first.innings_num, 1);
        assert_eq!(first.team_name, "Australia");
        assert_eq!(first.total_score, "250/9");
        assert_eq!(first.overs, "50");
        assert_eq!(first.batting.len(), 2);
        assert_eq!(first.batting[0].name, "Travis Head");
        assert_eq!(first.batting[0].dismissal, "c Kohli b Bumrah");
        assert_eq!(first.batting[0].strike_rate, "97.78");
        assert_eq!(first.batting[1].dismissal, "not out");
        assert_eq!(first.extras.as_deref(), Some("12 (b 1, lb 4, w 7)"));
        assert_eq!(first.bowling.len(), 1);
        assert_eq!(first.bowling[0].wickets, "3");
        assert_eq!(first.bowling[0].economy, "4.20");
        assert_eq!(first.fall_of_wickets.len(), 2);
        assert_eq!(first.fall_of_wickets[0], "1-20 (Usman Khawaja, 3.4 ov)");

        let second = &card.innings[1];
        assert_eq!(second.innings_num, 2);
        assert_eq!(second.team_name, "India");
        assert_eq!(second.total_score, "251/5");
        assert_eq!(second.overs, "47.2");
    }

    #[test]
    fn test_requested_id_used_without_payload() {
        let card = parse_scorecard("<html><body><p>Match drawn</p></body></html>", "123");
        assert_eq!(card.match_id, "123");
        assert_eq!(card.result.as_deref(), Some("Match drawn"));
        assert!(card.innings.is_empty());
    }
}
