//! Pre-launch waitlist.
//!
//! Stores email addresses of people interested in the product before
//! registration opens. Addresses are normalized on entry; duplicates are
//! handled at the handler level.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::{Collectable, Identifiable};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Entry {
    pub id: Uuid,

    /// Normalized (trimmed, lowercased) email address.
    pub email: String,

    pub joined_at: DateTime<Utc>,
}

impl Entry {
    pub fn new(email: impl AsRef<str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.as_ref().trim().to_lowercase(),
            joined_at: Utc::now(),
        }
    }
}

impl Collectable for Entry {
    fn get_collection_name() -> &'static str {
        "waitlist"
    }
}

impl Identifiable for Entry {
    fn get_id(&self) -> Uuid {
        self.id
    }
}
