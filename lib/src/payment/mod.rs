//! Billing integration.
//!
//! Subscriptions are handled entirely by stripe: the application creates
//! a subscription-mode checkout session and afterwards follows the
//! webhook events to keep each profile's subscription status in sync.

pub mod stripe;
