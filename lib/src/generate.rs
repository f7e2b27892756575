//! Idea generation client.
//!
//! Talks to an OpenAI-compatible chat completions endpoint (xAI's Grok by
//! default) and turns the completion into a structured [`IdeaDraft`]. The
//! model is asked for raw JSON; if the response doesn't parse as the
//! expected structure a syntactically valid fallback draft is returned
//! instead of an error, so a flaky model never breaks delivery.

use async_trait::async_trait;
use chrono::Utc;
use rand::seq::SliceRandom;

use crate::config;
use crate::error::{ErrorKind, Result};
use crate::idea::Difficulty;
use crate::profile::Profile;

/// A generated idea before it's attached to a profile and stored.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct IdeaDraft {
    pub title: String,
    pub hook: String,
    pub talking_points: Vec<String>,
    pub platform: String,
    pub format: String,
    pub hashtags: Vec<String>,
    pub cta: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub trend_connection: Option<String>,
}

/// Seam between the digest/handlers and the concrete generation backend.
#[async_trait]
pub trait IdeaGenerator: Send + Sync {
    async fn generate(&self, profile: &Profile) -> Result<IdeaDraft>;
}

/// Production generator backed by the configured chat completions API.
#[derive(Clone, Debug)]
pub struct GrokClient {
    client: reqwest::Client,
    config: config::Generation,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl GrokClient {
    pub fn new(config: config::Generation) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ErrorKind::GenerationFailed(e.to_string()))?;

        let mut response: ChatResponse = response.json().await?;
        if response.choices.is_empty() {
            return Err(ErrorKind::GenerationFailed(
                "completion response contained no choices".to_string(),
            )
            .into());
        }
        Ok(response.choices.remove(0).message.content)
    }
}

#[async_trait]
impl IdeaGenerator for GrokClient {
    async fn generate(&self, profile: &Profile) -> Result<IdeaDraft> {
        let platform = profile
            .platforms
            .choose(&mut rand::thread_rng())
            .ok_or_else(|| {
                ErrorKind::ProfileIncomplete("no platforms configured".to_string())
            })?
            .to_string();

        let prompt = prompt(profile, &platform);
        let content = self.complete(&prompt).await?;

        Ok(parse_draft(&content).unwrap_or_else(|| fallback_draft(&profile.niche, &platform)))
    }
}

/// Builds the generation prompt for one creator and one target platform.
fn prompt(profile: &Profile, platform: &str) -> String {
    let today = Utc::now().format("%A, %B %-d, %Y");

    let avoid = if profile.recent_topics.is_empty() {
        String::new()
    } else {
        format!(
            "- Topics to AVOID (recently covered): {}\n",
            profile.recent_topics
        )
    };

    format!(
        "You are ContentAI, an expert content strategist for creators and influencers. \
Generate ONE highly specific, creative, and actionable content idea for today.

CREATOR PROFILE:
- Niche: {niche}
- Target Platform: {platform}
- Tone/Voice: {tone}
- Goal: {goal}
- Target Audience: {audience}
{avoid}- Today's Date: {today}

REQUIREMENTS:
- Make the idea specific and actionable, not generic
- Include a scroll-stopping hook (the first line people see/hear)
- Tie into current trends, seasonal events, or viral formats when possible
- Format the idea for {platform} specifically
- Include relevant hashtags for the platform
- Vary the difficulty level

Respond in this exact JSON format (no markdown, no code blocks, just raw JSON):
{{
  \"title\": \"The content title/concept\",
  \"hook\": \"The opening line or visual hook to grab attention\",
  \"talking_points\": [\"Point 1\", \"Point 2\", \"Point 3\", \"Point 4\"],
  \"platform\": \"{platform}\",
  \"format\": \"Specific format for the platform (e.g., '60-second Reel', 'Thread with 8 tweets', '10-slide carousel')\",
  \"hashtags\": [\"#hashtag1\", \"#hashtag2\", \"#hashtag3\", \"#hashtag4\", \"#hashtag5\"],
  \"cta\": \"The call to action for the end of the content\",
  \"difficulty\": \"Quick & Easy OR Medium Effort OR Production Day\",
  \"trend_connection\": \"How this ties to a current trend or event (or null if not applicable)\"
}}",
        niche = profile.niche,
        platform = platform,
        tone = profile.tone,
        goal = profile.goal,
        audience = profile.audience,
        avoid = avoid,
        today = today,
    )
}

/// Parses the model output, tolerating markdown code fences around the
/// JSON.
fn parse_draft(content: &str) -> Option<IdeaDraft> {
    let cleaned = content
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string();
    serde_json::from_str(&cleaned).ok()
}

/// Generic but valid draft used when the model response can't be parsed.
fn fallback_draft(niche: &str, platform: &str) -> IdeaDraft {
    IdeaDraft {
        title: format!("{} Content Idea for Today", niche),
        hook: "Here's something your audience needs to hear today...".to_string(),
        talking_points: vec![
            "Share a personal insight from your experience".to_string(),
            "Address a common misconception in your niche".to_string(),
            "Give one actionable tip your audience can use immediately".to_string(),
            "End with a thought-provoking question".to_string(),
        ],
        platform: platform.to_string(),
        format: "Short-form video (60 seconds)".to_string(),
        hashtags: vec![
            "#contentcreator".to_string(),
            "#creatortips".to_string(),
            format!("#{}", niche.to_lowercase().split_whitespace().collect::<String>()),
        ],
        cta: "Save this for later and follow for more daily ideas".to_string(),
        difficulty: Difficulty::QuickAndEasy,
        trend_connection: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Platform;

    #[test]
    fn parses_fenced_json() {
        let content = "```json\n{\"title\":\"T\",\"hook\":\"H\",\"talking_points\":[\"a\"],\
\"platform\":\"TikTok\",\"format\":\"60-second video\",\"hashtags\":[\"#a\"],\"cta\":\"C\",\
\"difficulty\":\"Medium Effort\",\"trend_connection\":null}\n```";
        let draft = parse_draft(content).unwrap();
        assert_eq!(draft.title, "T");
        assert_eq!(draft.difficulty, Difficulty::MediumEffort);
        assert!(draft.trend_connection.is_none());
    }

    #[test]
    fn rejects_malformed_output() {
        assert!(parse_draft("Sure! Here's an idea for you:").is_none());
    }

    #[test]
    fn fallback_is_complete() {
        let draft = fallback_draft("Vegan Cooking", "Instagram");
        assert_eq!(draft.platform, "Instagram");
        assert!(draft.hashtags.contains(&"#vegancooking".to_string()));
        assert!(!draft.talking_points.is_empty());
    }

    #[test]
    fn prompt_mentions_recent_topics_only_when_set() {
        let mut profile = Profile {
            niche: "fitness".to_string(),
            platforms: vec![Platform::Instagram],
            ..Default::default()
        };
        assert!(!prompt(&profile, "Instagram").contains("AVOID"));

        profile.recent_topics = "meal prep".to_string();
        let with_topics = prompt(&profile, "Instagram");
        assert!(with_topics.contains("AVOID"));
        assert!(with_topics.contains("meal prep"));
    }
}
