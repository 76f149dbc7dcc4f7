//! Canonical team names and their short codes.
//!
//! Page titles and URLs use either form ("NZ", "nz", "new-zealand",
//! "New Zealand"); lookups here are case-insensitive in both directions.

/// (canonical name, short code)
const TEAM_ALIASES: &[(&str, &str)] = &[
    ("India", "IND"),
    ("Australia", "AUS"),
    ("England", "ENG"),
    ("New Zealand", "NZ"),
    ("South Africa", "SA"),
    ("Pakistan", "PAK"),
    ("Sri Lanka", "SL"),
    ("Bangladesh", "BAN"),
    ("West Indies", "WI"),
    ("Afghanistan", "AFG"),
    ("Zimbabwe", "ZIM"),
    ("Ireland", "IRE"),
    ("Netherlands", "NED"),
    ("Scotland", "SCO"),
    ("Nepal", "NEP"),
    ("Oman", "OMA"),
    ("United Arab Emirates", "UAE"),
    ("United States of America", "USA"),
    ("Namibia", "NAM"),
    ("Canada", "CAN"),
    ("Papua New Guinea", "PNG"),
    ("Hong Kong", "HK"),
    ("Kenya", "KEN"),
    ("Chennai Super Kings", "CSK"),
    ("Mumbai Indians", "MI"),
    ("Royal Challengers Bengaluru", "RCB"),
    ("Kolkata Knight Riders", "KKR"),
    ("Sunrisers Hyderabad", "SRH"),
    ("Delhi Capitals", "DC"),
    ("Punjab Kings", "PBKS"),
    ("Rajasthan Royals", "RR"),
    ("Gujarat Titans", "GT"),
    ("Lucknow Super Giants", "LSG"),
];

/// Expand a short code or URL slug to the canonical name.
/// Unknown input is returned trimmed and otherwise unchanged.
pub fn canonical_team_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let as_words = trimmed.replace('-', " ");
    for (name, code) in TEAM_ALIASES {
        if code.eq_ignore_ascii_case(trimmed)
            || name.eq_ignore_ascii_case(trimmed)
            || name.eq_ignore_ascii_case(&as_words)
        {
            return (*name).to_string();
        }
    }
    trimmed.to_string()
}

/// Short code for a canonical name (or an already-short code).
pub fn short_code(name: &str) -> Option<&'static str> {
    let trimmed = name.trim();
    TEAM_ALIASES
        .iter()
        .find(|(n, c)| n.eq_ignore_ascii_case(trimmed) || c.eq_ignore_ascii_case(trimmed))
        .map(|(_, c)| *c)
}
