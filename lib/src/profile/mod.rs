pub mod subscription;

pub use subscription::{Plan, Status, Subscription};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::{Collectable, Identifiable};

pub type ProfileId = Uuid;

/// Creator profile data structure.
///
/// Holds everything the generation prompt needs (niche, platforms, tone,
/// goal, audience, recently covered topics) next to account and billing
/// state.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Profile {
    pub id: ProfileId,

    pub email: String,
    /// Full name used for things like invoices
    pub full_name: String,
    /// Creator-chosen name used in emails and on the dashboard
    pub display_name: String,

    /// Content niche, e.g. "vegan cooking" or "personal finance".
    pub niche: String,
    /// Platforms the creator publishes on. At least one is required for
    /// the daily digest.
    pub platforms: Vec<Platform>,
    /// Tone of voice, e.g. "casual and funny".
    pub tone: String,
    /// Primary goal, e.g. "grow my audience".
    pub goal: String,
    /// Target audience description.
    pub audience: String,
    /// Topics recently covered, fed to the generator as topics to avoid.
    pub recent_topics: String,

    pub timezone: chrono_tz::Tz,

    pub registration_date: DateTime<Utc>,

    pub subscription: Subscription,

    /// Running count of ideas generated for this creator, interactive and
    /// emailed alike.
    pub ideas_generated: u64,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),

            email: "foo@bar.com".to_string(),
            full_name: "".to_string(),
            display_name: "".to_string(),

            niche: "".to_string(),
            platforms: vec![],
            tone: "".to_string(),
            goal: "".to_string(),
            audience: "".to_string(),
            recent_topics: "".to_string(),

            timezone: chrono_tz::UTC,

            registration_date: Utc::now(),

            subscription: Subscription::default(),

            ideas_generated: 0,
        }
    }
}

impl Collectable for Profile {
    fn get_collection_name() -> &'static str {
        "profiles"
    }
}

impl Identifiable for Profile {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

impl Profile {
    /// Returns true if this creator should receive the daily digest:
    /// subscription active or trialing, niche set and at least one
    /// platform configured.
    pub fn is_eligible(&self) -> bool {
        matches!(
            self.subscription.status,
            Status::Active | Status::Trialing
        ) && !self.niche.is_empty()
            && !self.platforms.is_empty()
    }

    /// Name to address the creator by in emails. Falls back to a generic
    /// salutation when the profile has no name set.
    pub fn salutation(&self) -> &str {
        if !self.display_name.is_empty() {
            &self.display_name
        } else if !self.full_name.is_empty() {
            &self.full_name
        } else {
            "Creator"
        }
    }
}

/// Platforms a creator can publish on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    #[strum(to_string = "TikTok")]
    TikTok,
    #[strum(to_string = "YouTube")]
    YouTube,
    Twitter,
    #[strum(to_string = "LinkedIn")]
    LinkedIn,
    Podcast,
    Blog,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscribed() -> Profile {
        Profile {
            niche: "vegan cooking".to_string(),
            platforms: vec![Platform::Instagram],
            subscription: Subscription {
                status: Status::Active,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn eligibility() {
        assert!(subscribed().is_eligible());

        let mut no_niche = subscribed();
        no_niche.niche.clear();
        assert!(!no_niche.is_eligible());

        let mut no_platforms = subscribed();
        no_platforms.platforms.clear();
        assert!(!no_platforms.is_eligible());

        let mut canceled = subscribed();
        canceled.subscription.status = Status::Canceled;
        assert!(!canceled.is_eligible());

        let mut trialing = subscribed();
        trialing.subscription.status = Status::Trialing;
        assert!(trialing.is_eligible());
    }

    #[test]
    fn platform_names() {
        assert_eq!(Platform::TikTok.to_string(), "TikTok");
        assert_eq!(Platform::Instagram.to_string(), "Instagram");
        assert_eq!(
            serde_json::to_string(&Platform::YouTube).unwrap(),
            "\"youtube\""
        );
    }
}
