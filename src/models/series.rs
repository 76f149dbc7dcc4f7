use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A series (tournament or tour) as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub id: i32,
    /// Provider series id.
    pub series_id: String,
    pub name: String,
    pub series_url: Option<String>,
    /// ISO `YYYY-MM-DD`, when known.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Free-form range as shown upstream, e.g. "Jan 12 - Feb 02".
    pub date_range: Option<String>,
    pub category_id: Option<i32>,
    pub slug: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
