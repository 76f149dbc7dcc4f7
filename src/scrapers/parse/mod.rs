//! Page parsers, one per resource kind.
//!
//! Each parser is a pure function from page text to typed records. Pages mix
//! server-rendered HTML with an escaped JSON hydration payload; parsers that
//! can read both prefer the payload and fall back to the DOM when it yields
//! nothing.

pub mod dom;
pub mod embedded;
pub mod live;
pub mod profile;
pub mod roster;
pub mod scorecard;
pub mod series;
pub mod series_matches;
pub mod teams;

pub use live::{live_state_from_title, parse_live_scores};
pub use profile::parse_profile;
pub use roster::parse_roster;
pub use scorecard::parse_scorecard;
pub use series::parse_series_listing;
pub use series_matches::{parse_match_page, parse_series_matches};
pub use teams::parse_team_listing;
