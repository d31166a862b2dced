use chrono::{DateTime, Utc};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

use crate::api::{ApiError, ApiResult, Backend};

pub const SALES_CONTACT_EMAIL: &str = "sales@prepmate.app";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    Free,
    Pro,
    Enterprise,
}

impl PlanId {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Free => "free",
            PlanId::Pro => "pro",
            PlanId::Enterprise => "enterprise",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "free" => Some(PlanId::Free),
            "pro" => Some(PlanId::Pro),
            "enterprise" => Some(PlanId::Enterprise),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PlanInfo {
    pub id: PlanId,
    pub name: &'static str,
    pub monthly_price_usd: Option<f32>,
}

pub static PLAN_CATALOG: Lazy<Vec<PlanInfo>> = Lazy::new(|| {
    vec![
        PlanInfo {
            id: PlanId::Free,
            name: "Starter",
            monthly_price_usd: Some(0.0),
        },
        PlanInfo {
            id: PlanId::Pro,
            name: "Pro",
            monthly_price_usd: Some(29.0),
        },
        PlanInfo {
            id: PlanId::Enterprise,
            name: "Enterprise",
            // Priced per contract through sales.
            monthly_price_usd: None,
        },
    ]
});

pub fn plan_info(id: PlanId) -> &'static PlanInfo {
    PLAN_CATALOG
        .iter()
        .find(|p| p.id == id)
        .expect("every plan id is in the catalog")
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
}

/// Read-through cache of the payment processor's subscription record. The
/// processor is the single source of truth; the client never mutates this
/// locally.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SubscriptionState {
    pub plan: PlanId,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub current_period_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancel_at: Option<DateTime<Utc>>,
}

/// Redirect target returned by checkout-session creation. Payment happens
/// entirely on the external destination.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CheckoutSessionHandle {
    pub checkout_url: String,
    pub session_id: String,
}

/// Display-only snapshot of a completed checkout session.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CheckoutSessionSnapshot {
    pub session_id: String,
    pub status: String,
    #[serde(default)]
    pub plan: Option<PlanId>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub next_billing_date: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CancelConfirmation {
    pub message: String,
    #[serde(default)]
    pub cancel_at: Option<DateTime<Utc>>,
}

/// Where checkout initiation resolved.
#[derive(Clone, Debug, PartialEq)]
pub enum CheckoutOutcome {
    /// Hand the browser to the externally hosted checkout page.
    RedirectToCheckout {
        checkout_url: String,
        session_id: String,
    },
    /// Not signed in: go to login, preserving the intended destination.
    RedirectToLogin { login_url: String },
    /// Enterprise is sold through sales, never through self-serve checkout.
    ContactSales { email: &'static str },
    /// The free plan has nothing to pay for.
    NoCheckoutRequired,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubscriptionConfirmation {
    pub subscription: SubscriptionState,
    /// Best-effort detail; `None` when the lookup failed or no session
    /// token was present.
    pub checkout: Option<CheckoutSessionSnapshot>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CancelOutcome {
    /// The backend's message is authoritative for cancellation scheduling.
    pub message: String,
    pub cancel_at: Option<DateTime<Utc>>,
    /// Re-read state; `None` when the re-read failed (the cancellation
    /// itself still succeeded).
    pub subscription: Option<SubscriptionState>,
}

/// Coordinates checkout initiation, post-checkout reconciliation and
/// cancellation against the remote processor.
pub struct SubscriptionCoordinator {
    backend: Arc<dyn Backend>,
}

impl SubscriptionCoordinator {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        SubscriptionCoordinator { backend }
    }

    /// Start a checkout for `plan`. `authenticated` reflects the caller's
    /// session; `destination` is the path to return to after login.
    pub async fn initiate_checkout(
        &self,
        plan: PlanId,
        authenticated: bool,
        destination: &str,
    ) -> ApiResult<CheckoutOutcome> {
        match plan {
            PlanId::Enterprise => {
                info!("💼 Enterprise plan selected - routing to sales");
                return Ok(CheckoutOutcome::ContactSales {
                    email: SALES_CONTACT_EMAIL,
                });
            }
            PlanId::Free => return Ok(CheckoutOutcome::NoCheckoutRequired),
            PlanId::Pro => {}
        }

        if !authenticated {
            return Ok(CheckoutOutcome::RedirectToLogin {
                login_url: login_redirect(destination),
            });
        }

        match self.backend.create_checkout_session(plan.as_str()).await {
            Ok(handle) => {
                // Never render a payment form locally; only hand off to a
                // well-formed external destination.
                Url::parse(&handle.checkout_url).map_err(|e| ApiError::Decode(format!(
                    "checkout url {:?} is not a valid url: {}",
                    handle.checkout_url, e
                )))?;
                info!("💳 Checkout session {} created", handle.session_id);
                Ok(CheckoutOutcome::RedirectToCheckout {
                    checkout_url: handle.checkout_url,
                    session_id: handle.session_id,
                })
            }
            Err(ApiError::AuthRequired) => Ok(CheckoutOutcome::RedirectToLogin {
                login_url: login_redirect(destination),
            }),
            Err(e) => Err(e),
        }
    }

    /// On return from checkout: read current subscription state (required)
    /// and, when a correlating session token is present, the checkout
    /// session snapshot (best-effort, display only).
    pub async fn confirm_return(
        &self,
        checkout_session_id: Option<&str>,
    ) -> ApiResult<SubscriptionConfirmation> {
        let subscription = self.backend.get_subscription().await?;

        let checkout = match checkout_session_id {
            Some(session_id) => match self.backend.get_checkout_session(session_id).await {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!("Checkout session lookup failed (ignored): {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(SubscriptionConfirmation {
            subscription,
            checkout,
        })
    }

    /// Cancel the subscription. Idempotent on the backend; the new state is
    /// re-read rather than predicted locally.
    pub async fn cancel(&self) -> ApiResult<CancelOutcome> {
        let confirmation = self.backend.cancel_subscription().await?;
        info!("🛑 Cancellation acknowledged: {}", confirmation.message);

        let subscription = match self.backend.get_subscription().await {
            Ok(state) => Some(state),
            Err(e) => {
                warn!("Subscription re-read after cancel failed: {}", e);
                None
            }
        };

        Ok(CancelOutcome {
            message: confirmation.message,
            cancel_at: confirmation.cancel_at,
            subscription,
        })
    }
}

fn login_redirect(destination: &str) -> String {
    format!("/login?next={}", urlencoding::encode(destination))
}
