use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Billing state attached to a creator profile.
///
/// The stripe identifiers are filled in by the checkout/webhook flow and
/// stay `None` for creators that never started a paid subscription.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Subscription {
    pub status: Status,
    pub plan: Plan,

    pub stripe_customer_id: Option<String>,
    pub subscription_id: Option<String>,
}

/// Subscription lifecycle status, mirroring the billing provider's
/// vocabulary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Trialing,
    Active,
    PastDue,
    Canceled,
}

#[cfg(feature = "stripe")]
impl From<stripe::SubscriptionStatus> for Status {
    fn from(status: stripe::SubscriptionStatus) -> Self {
        match status {
            stripe::SubscriptionStatus::Active => Self::Active,
            stripe::SubscriptionStatus::Trialing => Self::Trialing,
            stripe::SubscriptionStatus::PastDue => Self::PastDue,
            _ => Self::Canceled,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Plan {
    pub name: String,
    /// Monthly price.
    pub price: Decimal,
    /// Billing provider price identifier.
    pub price_id: String,
    pub features: Vec<String>,
}

impl Plan {
    pub fn free() -> Self {
        Self {
            name: "free".to_string(),
            price: Decimal::ZERO,
            price_id: "".to_string(),
            features: vec![],
        }
    }

    /// The standard plan lineup, used as the config default.
    pub fn standard() -> Vec<Self> {
        vec![
            Self {
                name: "Starter".to_string(),
                price: dec!(12.99),
                price_id: "".to_string(),
                features: vec![
                    "1 content idea per day".to_string(),
                    "1 platform".to_string(),
                    "Email delivery".to_string(),
                    "Basic personalization".to_string(),
                    "Idea history".to_string(),
                ],
            },
            Self {
                name: "Pro".to_string(),
                price: dec!(24.99),
                price_id: "".to_string(),
                features: vec![
                    "1 daily + 3 bonus weekly ideas".to_string(),
                    "All platforms".to_string(),
                    "Trend integration".to_string(),
                    "Regenerate ideas".to_string(),
                    "Analytics dashboard".to_string(),
                    "Content calendar".to_string(),
                ],
            },
            Self {
                name: "Business".to_string(),
                price: dec!(49.99),
                price_id: "".to_string(),
                features: vec![
                    "Everything in Pro".to_string(),
                    "Up to 3 team members".to_string(),
                    "Export to Notion/Sheets".to_string(),
                    "API access".to_string(),
                    "Priority support".to_string(),
                    "Slack/Discord delivery".to_string(),
                ],
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_encoding() {
        assert_eq!(
            serde_json::to_string(&Status::PastDue).unwrap(),
            "\"past_due\""
        );
        assert_eq!(
            serde_json::from_str::<Status>("\"canceled\"").unwrap(),
            Status::Canceled
        );
    }

    #[cfg(feature = "stripe")]
    #[test]
    fn status_from_stripe() {
        assert_eq!(
            Status::from(stripe::SubscriptionStatus::Active),
            Status::Active
        );
        assert_eq!(
            Status::from(stripe::SubscriptionStatus::Trialing),
            Status::Trialing
        );
        assert_eq!(
            Status::from(stripe::SubscriptionStatus::PastDue),
            Status::PastDue
        );
        assert_eq!(
            Status::from(stripe::SubscriptionStatus::IncompleteExpired),
            Status::Canceled
        );
    }
}
