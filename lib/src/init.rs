//! Data initialization procedures.
//!
//! The app config can contain creator profiles expected to exist after
//! the application is started. This module converts those entries into
//! initial application state.

use crate::{Config, Database, Profile, Result};

/// Initializes database state based on entries found in the
/// configuration.
pub fn initialize(config: &Config, db: &Database) -> Result<()> {
    profiles(config, db)?;
    Ok(())
}

/// Initializes creator profiles from entries found in the configuration.
pub fn profiles(config: &Config, db: &Database) -> Result<()> {
    for profile in &config.users {
        // If the profile already exists, update it with the information
        // in the config while keeping its id and generated counters.
        if let Some(mut existing) = db
            .get_collection::<Profile>()?
            .into_iter()
            .find(|p| p.email == profile.email)
        {
            existing.full_name = profile.full_name.clone();
            existing.display_name = profile.display_name.clone();
            existing.subscription.plan = profile.subscription.plan.clone();
            existing.subscription.status = profile.subscription.status;

            db.set(&existing)?;
        } else {
            db.set(profile)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Status;

    #[test]
    fn seeds_and_merges_profiles() {
        let db = Database::temporary().unwrap();
        let mut config = Config::default();
        config.users = vec![Profile {
            email: "seed@example.com".to_string(),
            full_name: "Seed User".to_string(),
            ..Default::default()
        }];

        initialize(&config, &db).unwrap();
        let stored = db.get_collection::<Profile>().unwrap();
        assert_eq!(stored.len(), 1);
        let id = stored[0].id;

        // Second run with changed details updates in place.
        config.users[0].full_name = "Renamed User".to_string();
        config.users[0].subscription.status = Status::Active;
        initialize(&config, &db).unwrap();

        let stored = db.get_collection::<Profile>().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].full_name, "Renamed User");
        assert_eq!(stored[0].subscription.status, Status::Active);
    }
}
