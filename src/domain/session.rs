use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side record a session cookie token points at. Tokens are opaque;
/// nothing client-visible is derived from the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: u32,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: u32) -> Self {
        Self {
            user_id,
            issued_at: Utc::now(),
        }
    }
}
