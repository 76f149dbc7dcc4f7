//! Team category listing.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::debug;

use super::dom::{first_img_src, parent_element, selector, text_of};
use crate::normalize::{canonical_team_name, short_code};
use crate::scrapers::identity::{dedup_by_id, team_id_from_url};
use crate::scrapers::records::TeamRec;
use crate::scrapers::absolute_url;

static TEAM_LINKS: LazyLock<Selector> = LazyLock::new(|| selector("a[href*='/cricket-team/']"));

/// Teams linked from a category listing page, deduplicated by provider id.
pub fn parse_team_listing(html: &str, base_url: &str) -> Vec<TeamRec> {
    let doc = Html::parse_document(html);
    let mut teams = Vec::new();

    for link in doc.select(&TEAM_LINKS) {
        let Some(href) = link.value().attr("href") else { continue };
        let Some(team_id) = team_id_from_url(href) else { continue };

        let mut name = text_of(link);
        if name.len() < 2 {
            name = link.value().attr("title").map(str::trim).unwrap_or("").to_string();
        }
        if name.len() < 2 {
            continue;
        }

        let flag = first_img_src(link).or_else(|| parent_element(link).and_then(first_img_src));

        teams.push(TeamRec {
            team_id,
            short_name: short_code(&canonical_team_name(&name)).map(str::to_string),
            name,
            team_url: Some(absolute_url(base_url, href)),
            flag_url: flag.map(|f| absolute_url(base_url, &f)),
        });
    }

    let teams = dedup_by_id(teams, |t| &t.team_id);
    debug!("Parsed {} teams from listing", teams.len());
    teams
}
