use std::str::FromStr;
use std::sync::Arc;

use axum::{
    async_trait,
    body::Body,
    extract::FromRequest,
    response::{IntoResponse, Response},
    routing::post,
    Extension,
};
use http::{Request, StatusCode};
use uuid::Uuid;

use axum::Json;
use serde_json::json;

use crate::error::ErrorKind;
use crate::profile::{Profile, Status};
use crate::{payment, routes, Result};

use super::{extract, ConfigExt, DbExt, Router, StripeExt};

struct StripeEvent(stripe::Event);

pub fn router() -> Router {
    Router::new()
        .route(routes::STRIPE_EVENTS, post(webhook))
        .route(routes::API_CHECKOUT, post(checkout))
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CheckoutForm {
    /// Name of the plan to subscribe to, matching `config.plans`.
    pub plan: String,
}

/// Starts a subscription checkout for the authenticated creator and
/// returns the url to redirect them to.
pub async fn checkout(
    user: extract::User,
    Extension(config): ConfigExt,
    Extension(client): StripeExt,
    Json(form): Json<CheckoutForm>,
) -> Result<impl IntoResponse> {
    let plan = config
        .plans
        .iter()
        .find(|p| p.name == form.plan)
        .ok_or_else(|| ErrorKind::BadInput(format!("Unknown plan: {}", form.plan)))?;

    let url = payment::stripe::checkout_url(&user, plan, &config, &client).await?;

    Ok(Json(json!({ "url": url })))
}

#[async_trait]
impl<S> FromRequest<S> for StripeEvent
where
    String: FromRequest<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(
        req: Request<Body>,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let signature = if let Some(sig) = req.headers().get("stripe-signature") {
            sig.to_owned()
        } else {
            return Err(StatusCode::BAD_REQUEST.into_response());
        };

        let config = req
            .extensions()
            .get::<Arc<crate::Config>>()
            .expect("failed getting config extension");

        let signing_secret = {
            if cfg!(debug_assertions) {
                config.payments.stripe.test_signing_secret.clone()
            } else {
                config.payments.stripe.signing_secret.clone()
            }
        };

        let payload = String::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        Ok(Self(
            stripe::Webhook::construct_event(
                &payload,
                signature.to_str().unwrap(),
                &signing_secret,
            )
            .map_err(|_| StatusCode::BAD_REQUEST.into_response())?,
        ))
    }
}

/// Follows billing lifecycle events to keep profile subscription state in
/// sync with stripe.
async fn webhook(Extension(db): DbExt, StripeEvent(event): StripeEvent) -> Result<()> {
    use stripe::{EventObject, EventType};

    match event.type_ {
        EventType::CheckoutSessionCompleted => {
            if let EventObject::CheckoutSession(session) = event.data.object {
                let profile_id = session
                    .metadata
                    .as_ref()
                    .and_then(|m| m.get("profile_id"))
                    .and_then(|id| Uuid::from_str(id).ok());

                if let Some(id) = profile_id {
                    let mut profile = db.get::<Profile>(id)?;
                    profile.subscription.stripe_customer_id =
                        session.customer.as_ref().map(|c| c.id().to_string());
                    profile.subscription.subscription_id =
                        session.subscription.as_ref().map(|s| s.id().to_string());
                    profile.subscription.status = Status::Active;
                    db.set(&profile)?;

                    tracing::info!("checkout completed for profile {}", id);
                } else {
                    // The session we got the event for isn't linked to any
                    // profile we know of, weird!
                    log::warn!(
                        "received checkout completion not linked to any profile: {}",
                        session.id
                    );
                }
            }
        }
        EventType::CustomerSubscriptionUpdated => {
            if let EventObject::Subscription(subscription) = event.data.object {
                if let Some(id) = subscription
                    .metadata
                    .get("profile_id")
                    .and_then(|id| Uuid::from_str(id).ok())
                {
                    let mut profile = db.get::<Profile>(id)?;
                    profile.subscription.status = Status::from(subscription.status);
                    db.set(&profile)?;
                }
            }
        }
        EventType::CustomerSubscriptionDeleted => {
            if let EventObject::Subscription(subscription) = event.data.object {
                if let Some(id) = subscription
                    .metadata
                    .get("profile_id")
                    .and_then(|id| Uuid::from_str(id).ok())
                {
                    let mut profile = db.get::<Profile>(id)?;
                    profile.subscription.status = Status::Canceled;
                    db.set(&profile)?;
                }
            }
        }
        EventType::InvoicePaymentFailed => {
            if let EventObject::Invoice(invoice) = event.data.object {
                let customer_id = invoice.customer.as_ref().map(|c| c.id().to_string());

                if let Some(customer_id) = customer_id {
                    // Invoices only carry the customer reference, so the
                    // profile has to be found the other way around.
                    if let Some(mut profile) =
                        db.get_collection::<Profile>()?.into_iter().find(|p| {
                            p.subscription.stripe_customer_id.as_deref()
                                == Some(customer_id.as_str())
                        })
                    {
                        profile.subscription.status = Status::PastDue;
                        db.set(&profile)?;
                    }
                }
            }
        }
        _ => log::debug!("unhandled event encountered in webhook: {:?}", event.type_),
    }

    Ok(())
}
