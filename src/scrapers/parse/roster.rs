//! Team roster page.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::dom::{ancestor_elements, first_img_src, parent_element, selector, text_nodes};
use crate::scrapers::identity::{dedup_by_id, player_id_from_url};
use crate::scrapers::records::PlayerRec;
use crate::scrapers::absolute_url;

/// Roles a roster card may show. Matched case-insensitively against whole
/// text nodes.
pub const ROLES: &[&str] = &[
    "Batsman",
    "Batter",
    "Bowler",
    "All-rounder",
    "Allrounder",
    "Wicketkeeper",
    "Batting Allrounder",
    "Bowling Allrounder",
    "WK-Batter",
    "Pace Bowler",
    "Spin Bowler",
];

static PROFILE_LINKS: LazyLock<Selector> = LazyLock::new(|| selector("a[href*='/profiles/']"));

fn as_role(text: &str) -> Option<String> {
    ROLES
        .iter()
        .find(|r| r.eq_ignore_ascii_case(text.trim()))
        .map(|r| r.to_string())
}

fn role_in(el: ElementRef<'_>) -> Option<String> {
    text_nodes(el).iter().find_map(|t| as_role(t))
}

/// The nearest ancestor that is still this player's own card, i.e. holds no
/// other profile link.
fn card_of(link: ElementRef<'_>) -> Option<ElementRef<'_>> {
    ancestor_elements(link)
        .take_while(|a| a.select(&PROFILE_LINKS).count() == 1)
        .last()
}

fn role_of(link: ElementRef<'_>) -> Option<String> {
    role_in(link).or_else(|| card_of(link).and_then(role_in))
}

/// Players listed on a roster page, deduplicated by provider id.
pub fn parse_roster(html: &str, base_url: &str) -> Vec<PlayerRec> {
    let doc = Html::parse_document(html);
    let mut players = Vec::new();

    for link in doc.select(&PROFILE_LINKS) {
        let Some(href) = link.value().attr("href") else { continue };
        let Some(player_id) = player_id_from_url(href) else { continue };

        let name = link
            .value()
            .attr("title")
            .map(str::trim)
            .filter(|t| t.len() >= 2)
            .map(str::to_string)
            .or_else(|| {
                text_nodes(link)
                    .into_iter()
                    .find(|t| t.len() >= 2 && as_role(t).is_none())
            });
        let Some(name) = name else { continue };

        let photo = first_img_src(link).or_else(|| parent_element(link).and_then(first_img_src));

        players.push(PlayerRec {
            player_id,
            name,
            player_url: Some(absolute_url(base_url, href)),
            photo_url: photo.map(|p| absolute_url(base_url, &p)),
            role: role_of(link),
        });
    }

    dedup_by_id(players, |p| &p.player_id)
}
