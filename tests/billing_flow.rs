mod common;

use common::{active_subscription, FakeBackend};
use prepmate::api::ApiError;
use prepmate::billing::{
    CheckoutOutcome, CheckoutSessionHandle, PlanId, SubscriptionCoordinator,
};
use prepmate::dashboard::{load_dashboard, DashboardStats, InterviewHistoryEntry};
use prepmate::session::InterviewType;

#[tokio::test]
async fn enterprise_plan_never_creates_a_checkout_session() {
    let backend = FakeBackend::shared();
    let coordinator = SubscriptionCoordinator::new(backend.clone());

    let outcome = coordinator
        .initiate_checkout(PlanId::Enterprise, true, "/pricing")
        .await
        .unwrap();
    assert!(matches!(outcome, CheckoutOutcome::ContactSales { .. }));
    assert_eq!(backend.checkout_call_count(), 0);
}

#[tokio::test]
async fn unauthenticated_checkout_redirects_to_login_with_destination() {
    let backend = FakeBackend::shared();
    let coordinator = SubscriptionCoordinator::new(backend.clone());

    let outcome = coordinator
        .initiate_checkout(PlanId::Pro, false, "/pricing?plan=pro")
        .await
        .unwrap();
    assert_eq!(
        outcome,
        CheckoutOutcome::RedirectToLogin {
            login_url: "/login?next=%2Fpricing%3Fplan%3Dpro".to_string()
        }
    );
    assert_eq!(backend.checkout_call_count(), 0);
}

#[tokio::test]
async fn authenticated_pro_checkout_hands_off_to_external_destination() {
    let backend = FakeBackend::shared();
    let coordinator = SubscriptionCoordinator::new(backend.clone());

    let outcome = coordinator
        .initiate_checkout(PlanId::Pro, true, "/pricing")
        .await
        .unwrap();
    match outcome {
        CheckoutOutcome::RedirectToCheckout {
            checkout_url,
            session_id,
        } => {
            assert!(checkout_url.starts_with("https://"));
            assert_eq!(session_id, "cs_test_1");
        }
        other => panic!("expected checkout redirect, got {:?}", other),
    }
    assert_eq!(backend.checkout_call_count(), 1);
}

#[tokio::test]
async fn stale_auth_on_checkout_creation_becomes_a_login_redirect() {
    let backend = FakeBackend::shared();
    *backend.checkout_create_response.lock() = Some(Err(ApiError::AuthRequired));
    let coordinator = SubscriptionCoordinator::new(backend);

    let outcome = coordinator
        .initiate_checkout(PlanId::Pro, true, "/pricing")
        .await
        .unwrap();
    assert!(matches!(outcome, CheckoutOutcome::RedirectToLogin { .. }));
}

#[tokio::test]
async fn malformed_checkout_url_is_rejected() {
    let backend = FakeBackend::shared();
    *backend.checkout_create_response.lock() = Some(Ok(CheckoutSessionHandle {
        checkout_url: "not a url".to_string(),
        session_id: "cs_bad".to_string(),
    }));
    let coordinator = SubscriptionCoordinator::new(backend);

    let result = coordinator
        .initiate_checkout(PlanId::Pro, true, "/pricing")
        .await;
    assert!(matches!(result, Err(ApiError::Decode(_))));
}

#[tokio::test]
async fn confirm_return_swallows_checkout_lookup_failure() {
    let backend = FakeBackend::shared();
    *backend.checkout_session_response.lock() = Some(Err(ApiError::Timeout));
    let coordinator = SubscriptionCoordinator::new(backend);

    let confirmation = coordinator.confirm_return(Some("cs_test_1")).await.unwrap();
    assert_eq!(confirmation.subscription, active_subscription());
    assert!(confirmation.checkout.is_none());
}

#[tokio::test]
async fn confirm_return_requires_the_subscription_read() {
    let backend = FakeBackend::shared();
    *backend.subscription_response.lock() = Some(Err(ApiError::Transport(
        "connection reset".to_string(),
    )));
    let coordinator = SubscriptionCoordinator::new(backend);

    assert!(coordinator.confirm_return(None).await.is_err());
}

#[tokio::test]
async fn cancel_rereads_state_instead_of_predicting_it() {
    let backend = FakeBackend::shared();
    let coordinator = SubscriptionCoordinator::new(backend);

    let outcome = coordinator.cancel().await.unwrap();
    assert!(!outcome.message.is_empty());
    assert_eq!(outcome.subscription, Some(active_subscription()));
}

#[tokio::test]
async fn cancel_survives_a_failed_reread() {
    let backend = FakeBackend::shared();
    *backend.subscription_response.lock() = Some(Err(ApiError::Timeout));
    let coordinator = SubscriptionCoordinator::new(backend);

    let outcome = coordinator.cancel().await.unwrap();
    assert!(outcome.message.contains("current period"));
    assert!(outcome.subscription.is_none());
}

#[tokio::test]
async fn dashboard_degrades_per_source_not_per_page() {
    let backend = FakeBackend::shared();
    *backend.stats_response.lock() = Some(Err(ApiError::Timeout));
    *backend.history_response.lock() = Some(Ok(vec![InterviewHistoryEntry {
        id: "h1".to_string(),
        job_title: "Platform Engineer".to_string(),
        interview_type: InterviewType::Technical,
        overall_score: 82.0,
        duration_minutes: 45,
        completed_at: chrono::Utc::now(),
    }]));

    let view = load_dashboard(backend.as_ref()).await;
    assert_eq!(view.stats, DashboardStats::default());
    assert_eq!(view.history.len(), 1);
    assert!(view
        .warning
        .as_deref()
        .unwrap()
        .contains("Some data may be unavailable."));
    assert!(view.new_interview_enabled);
}

#[tokio::test]
async fn dashboard_with_total_outage_stays_usable() {
    let backend = FakeBackend::shared();
    *backend.stats_response.lock() = Some(Err(ApiError::Transport("dns failure".to_string())));
    *backend.history_response.lock() = Some(Err(ApiError::Timeout));

    let view = load_dashboard(backend.as_ref()).await;
    assert_eq!(view.stats, DashboardStats::default());
    assert!(view.history.is_empty());
    let warning = view.warning.unwrap();
    assert!(warning.contains("dns failure"));
    assert!(warning.contains("timed out"));
    assert!(view.new_interview_enabled);
}
