//! Daily digest job.
//!
//! Once per day an external scheduler hits the digest endpoint, which runs
//! this job: for every eligible creator, generate one personalized idea,
//! store it, email it and bump the creator's idea counter. Subscribers are
//! processed strictly sequentially; a failure anywhere in one subscriber's
//! pipeline is logged and counted without aborting the rest of the run.
//!
//! The job is not idempotent by default: re-running it for the same day
//! generates and emails a second idea per subscriber. The
//! `skip_already_emailed` guard (off by default) makes repeated runs skip
//! creators that already got their idea on the current UTC day.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::email::Mailer;
use crate::generate::IdeaGenerator;
use crate::idea::Idea;
use crate::profile::Profile;
use crate::{Config, Database, Result};

/// Throttle applied between subscribers, regardless of success or
/// failure. Keeps the generation and email providers' rate limits at a
/// respectful distance without coupling the loop to a specific strategy.
#[derive(Clone, Copy, Debug)]
pub enum Pacing {
    /// No delay. Used in tests and for small subscriber sets.
    None,
    /// Wait a fixed duration after completing each subscriber's pipeline
    /// before starting the next.
    Fixed(Duration),
}

impl Default for Pacing {
    fn default() -> Self {
        Self::Fixed(Duration::from_millis(200))
    }
}

impl Pacing {
    pub async fn wait(&self) {
        match self {
            Self::None => {}
            Self::Fixed(delay) => tokio::time::sleep(*delay).await,
        }
    }
}

/// Aggregate result of one digest run.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct Summary {
    /// Number of eligible subscribers found.
    pub total: usize,
    /// Subscribers whose idea was generated, stored and emailed.
    pub sent: usize,
    /// Subscribers whose pipeline failed at any step.
    pub failed: usize,
    /// Subscribers skipped by the already-emailed-today guard.
    #[serde(skip_serializing_if = "is_zero")]
    pub skipped: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

enum Processed {
    Sent,
    Skipped,
}

/// The daily fan-out job.
///
/// Collaborators are injected so the job can be driven with fakes in
/// tests and unusual deployments can swap backends without touching the
/// loop.
pub struct DailyDigest {
    db: Database,
    generator: Arc<dyn IdeaGenerator>,
    mailer: Arc<dyn Mailer>,
    pacing: Pacing,
    skip_already_emailed: bool,
}

impl DailyDigest {
    pub fn new(db: Database, generator: Arc<dyn IdeaGenerator>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            db,
            generator,
            mailer,
            pacing: Pacing::default(),
            skip_already_emailed: false,
        }
    }

    pub fn from_config(
        config: &Config,
        db: Database,
        generator: Arc<dyn IdeaGenerator>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let pacing = match config.digest.pace_ms {
            0 => Pacing::None,
            ms => Pacing::Fixed(Duration::from_millis(ms)),
        };
        Self {
            db,
            generator,
            mailer,
            pacing,
            skip_already_emailed: config.digest.skip_already_emailed,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_already_emailed_guard(mut self, enabled: bool) -> Self {
        self.skip_already_emailed = enabled;
        self
    }

    /// All creators that should receive today's digest. Failure here
    /// aborts the whole run, there's nothing sensible to iterate over.
    pub fn eligible(&self) -> Result<Vec<Profile>> {
        Ok(self
            .db
            .get_collection::<Profile>()?
            .into_iter()
            .filter(|p| p.is_eligible())
            .collect())
    }

    /// Runs the digest over all eligible subscribers.
    ///
    /// Processing order is whatever the eligibility query returns; it
    /// carries no meaning and isn't stable across runs.
    pub async fn run(&self) -> Result<Summary> {
        let profiles = self.eligible()?;

        let mut summary = Summary {
            total: profiles.len(),
            ..Default::default()
        };

        for profile in &profiles {
            match self.process(profile).await {
                Ok(Processed::Sent) => summary.sent += 1,
                Ok(Processed::Skipped) => summary.skipped += 1,
                Err(e) => {
                    // One broken pipeline must not starve the remaining
                    // subscribers. The creator simply gets no idea today;
                    // there is no retry until the next scheduled run.
                    warn!("daily digest failed for {}: {}", profile.email, e);
                    summary.failed += 1;
                }
            }

            self.pacing.wait().await;
        }

        info!(
            "daily digest done: {} sent, {} failed, {} skipped of {} eligible",
            summary.sent, summary.failed, summary.skipped, summary.total
        );

        Ok(summary)
    }

    /// One subscriber's pipeline: generate, persist, email, count.
    async fn process(&self, profile: &Profile) -> Result<Processed> {
        if self.skip_already_emailed && self.emailed_today(profile)? {
            debug!("skipping {}, already emailed today", profile.email);
            return Ok(Processed::Skipped);
        }

        let draft = self.generator.generate(profile).await?;

        let idea = Idea::from_draft(profile.id, draft, true);
        self.db.set(&idea)?;

        self.mailer
            .send_daily_idea(&profile.email, profile.salutation(), &idea)
            .await?;

        // Re-read the profile so the counter bump doesn't clobber writes
        // that happened since the eligibility query.
        let mut profile = self.db.get::<Profile>(profile.id)?;
        profile.ideas_generated += 1;
        self.db.set(&profile)?;

        Ok(Processed::Sent)
    }

    /// True if an emailed idea was already created for this creator on
    /// the current UTC calendar day.
    fn emailed_today(&self, profile: &Profile) -> Result<bool> {
        let today = Utc::now().date_naive();
        Ok(self
            .db
            .get_collection::<Idea>()?
            .iter()
            .any(|i| i.owner == profile.id && i.emailed && i.created_at.date_naive() == today))
    }
}
