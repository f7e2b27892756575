//! Module tasked with generating mock data to populate the application.

use crate::profile::{Platform, Status};
use crate::{Config, Database, ErrorKind, Profile, Result};

/// Generates and saves various mocking data in the database.
pub fn generate(config: &Config, db: &Database) -> Result<()> {
    profile(config, db)?;

    Ok(())
}

pub fn profile(config: &Config, db: &Database) -> Result<Profile> {
    let email = "test@mail.com".to_string();

    // does the test creator already exist
    if db
        .get_collection::<Profile>()?
        .iter()
        .any(|p| p.email == email)
        && config.dev.mock_regen != true
    {
        return Err(ErrorKind::Other(format!(
            "mock profile with email {} already exists",
            email
        ))
        .into());
    }

    let mut profile = Profile::default();
    profile.email = email;
    profile.full_name = "Test Creator".to_string();
    profile.display_name = "testcreator".to_string();
    profile.niche = "home workouts".to_string();
    profile.platforms = vec![Platform::Instagram, Platform::TikTok];
    profile.tone = "energetic and encouraging".to_string();
    profile.goal = "grow my audience".to_string();
    profile.audience = "busy professionals who want to stay fit".to_string();
    profile.recent_topics = "morning stretching routines".to_string();
    profile.subscription.status = Status::Trialing;
    profile.subscription.plan = config
        .plans
        .first()
        .cloned()
        .unwrap_or_else(crate::profile::Plan::free);

    db.set(&profile)?;

    Ok(profile)
}
