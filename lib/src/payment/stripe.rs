use std::collections::HashMap;

use crate::profile::Plan;
use crate::{Config, ErrorKind, Profile, Result};

/// Trial period granted on every new subscription, in days.
pub const TRIAL_PERIOD_DAYS: u32 = 7;

/// Creates a subscription checkout session with stripe.
///
/// Returns a checkout url that the creator can be redirected to. The
/// profile id travels in the session and subscription metadata so the
/// webhook can link events back to the profile.
pub async fn checkout_url(
    profile: &Profile,
    plan: &Plan,
    config: &Config,
    client: &stripe::Client,
) -> Result<String> {
    if plan.price_id.is_empty() {
        return Err(ErrorKind::Other(format!(
            "plan '{}' has no stripe price configured",
            plan.name
        ))
        .into());
    }

    let metadata: HashMap<String, String> =
        HashMap::from([("profile_id".to_string(), profile.id.to_string())]);

    let success_url = format!("https://{}/dashboard?success=true", config.domain);
    let cancel_url = format!("https://{}/dashboard?canceled=true", config.domain);

    let checkout_session = {
        let mut params = stripe::CreateCheckoutSession::new();
        params.customer_email = Some(&profile.email);
        params.metadata = Some(metadata.clone());
        params.mode = Some(stripe::CheckoutSessionMode::Subscription);
        params.line_items = Some(vec![stripe::CreateCheckoutSessionLineItems {
            quantity: Some(1),
            price: Some(plan.price_id.clone()),
            ..Default::default()
        }]);
        params.success_url = Some(&success_url);
        params.cancel_url = Some(&cancel_url);
        params.subscription_data = Some(stripe::CreateCheckoutSessionSubscriptionData {
            trial_period_days: Some(TRIAL_PERIOD_DAYS),
            metadata: Some(metadata),
            ..Default::default()
        });
        stripe::CheckoutSession::create(client, params).await?
    };

    if let Some(url) = checkout_session.url {
        Ok(url)
    } else {
        Err(ErrorKind::Other("failed getting stripe checkout session url".to_string()).into())
    }
}
