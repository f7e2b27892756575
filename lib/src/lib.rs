//! Daily content ideas for creators.
//!
//! `contentai` is the application library behind the ContentAI service.
//! Creators fill out a short profile (niche, platforms, tone, goal,
//! audience) and receive one personalized content idea in their inbox
//! every morning. The library provides the data model, the idea
//! generation client, email delivery, Stripe billing glue and the daily
//! digest job, along with a set of ready-made `axum` handlers.

#[macro_use]
extern crate serde_derive;

pub mod config;
pub mod db;
pub mod digest;
pub mod email;
pub mod error;
pub mod generate;
pub mod idea;
pub mod init;
pub mod mock;
pub mod profile;
pub mod routes;
pub mod tracing;
pub mod waitlist;

#[cfg(feature = "stripe")]
pub mod payment;

#[cfg(feature = "axum")]
pub mod axum;

pub use config::Config;
pub use db::Database;
pub use error::{Error, ErrorKind, Result};
pub use idea::Idea;
pub use profile::{Profile, ProfileId};
