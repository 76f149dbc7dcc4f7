use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A team as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: i32,
    /// Provider team id.
    pub team_id: String,
    pub name: String,
    pub short_name: Option<String>,
    pub flag_url: Option<String>,
    pub team_url: Option<String>,
    /// Local id of the owning team category.
    pub category_id: i32,
    pub slug: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
