use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::{Collectable, Identifiable};
use crate::generate::IdeaDraft;
use crate::profile::ProfileId;

pub type IdeaId = Uuid;

/// One generated content suggestion, stored per creator.
///
/// Ideas are only ever created by the generation flow (interactive or
/// digest) and mutated to change their status or emailed flag. The core
/// never deletes them.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Idea {
    pub id: IdeaId,
    pub owner: ProfileId,

    pub title: String,
    /// The opening line or visual hook meant to grab attention.
    pub hook: String,
    pub talking_points: Vec<String>,
    /// Display name of the target platform, e.g. "TikTok".
    pub platform: String,
    /// Platform-specific format label, e.g. "60-second Reel".
    pub format: String,
    pub hashtags: Vec<String>,
    /// Call to action for the end of the content.
    pub cta: String,
    pub difficulty: Difficulty,
    /// How the idea ties into a current trend or event, when it does.
    pub trend_connection: Option<String>,

    pub status: Status,
    /// Set when the idea was delivered by the daily digest rather than
    /// requested interactively.
    pub emailed: bool,

    pub created_at: DateTime<Utc>,
}

impl Idea {
    pub fn from_draft(owner: ProfileId, draft: IdeaDraft, emailed: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            title: draft.title,
            hook: draft.hook,
            talking_points: draft.talking_points,
            platform: draft.platform,
            format: draft.format,
            hashtags: draft.hashtags,
            cta: draft.cta,
            difficulty: draft.difficulty,
            trend_connection: draft.trend_connection,
            status: Status::New,
            emailed,
            created_at: Utc::now(),
        }
    }
}

impl Collectable for Idea {
    fn get_collection_name() -> &'static str {
        "ideas"
    }
}

impl Identifiable for Idea {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

/// Rough production-effort classification, shown as a badge in the email
/// and on the dashboard. Serialized with the human-readable labels the
/// generation prompt asks for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum Difficulty {
    #[default]
    #[serde(rename = "Quick & Easy")]
    QuickAndEasy,
    #[serde(rename = "Medium Effort")]
    MediumEffort,
    #[serde(rename = "Production Day")]
    ProductionDay,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Self::QuickAndEasy => "Quick & Easy",
            Self::MediumEffort => "Medium Effort",
            Self::ProductionDay => "Production Day",
        }
    }

    /// Badge color used in the daily email.
    pub fn color(&self) -> &'static str {
        match self {
            Self::QuickAndEasy => "#4ADE80",
            Self::MediumEffort => "#60A5FA",
            Self::ProductionDay => "#F472B6",
        }
    }
}

/// What the creator did with the idea.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    New,
    Used,
    Saved,
    Skipped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_labels() {
        assert_eq!(
            serde_json::to_string(&Difficulty::QuickAndEasy).unwrap(),
            "\"Quick & Easy\""
        );
        assert_eq!(
            serde_json::from_str::<Difficulty>("\"Production Day\"").unwrap(),
            Difficulty::ProductionDay
        );
    }
}
