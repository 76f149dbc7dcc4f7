//! Team and series category definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fixed listing category on the upstream site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryDef {
    pub slug: &'static str,
    pub name: &'static str,
    /// Listing path relative to the site origin.
    pub path: &'static str,
}

impl CategoryDef {
    /// Absolute listing URL for the given origin.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path)
    }
}

pub const TEAM_CATEGORIES: &[CategoryDef] = &[
    CategoryDef {
        slug: "international",
        name: "International",
        path: "/cricket-team",
    },
    CategoryDef {
        slug: "domestic",
        name: "Domestic",
        path: "/cricket-team/domestic",
    },
    CategoryDef {
        slug: "league",
        name: "League",
        path: "/cricket-team/league",
    },
    CategoryDef {
        slug: "women",
        name: "Women",
        path: "/cricket-team/women",
    },
];

pub const SERIES_CATEGORIES: &[CategoryDef] = &[
    CategoryDef {
        slug: "all",
        name: "All",
        path: "/cricket-schedule/series/all",
    },
    CategoryDef {
        slug: "international",
        name: "International",
        path: "/cricket-schedule/series/international",
    },
    CategoryDef {
        slug: "domestic",
        name: "Domestic",
        path: "/cricket-schedule/series/domestic",
    },
    CategoryDef {
        slug: "league",
        name: "T20 Leagues",
        path: "/cricket-schedule/series/league",
    },
    CategoryDef {
        slug: "women",
        name: "Women",
        path: "/cricket-schedule/series/women",
    },
];

pub fn team_category(slug: &str) -> Option<&'static CategoryDef> {
    TEAM_CATEGORIES.iter().find(|c| c.slug == slug)
}

pub fn series_category(slug: &str) -> Option<&'static CategoryDef> {
    SERIES_CATEGORIES.iter().find(|c| c.slug == slug)
}

/// A stored category row (team or series kind).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}
