//! Provisioning waiter tests on a paused clock.

use secrets_manager::{ProvisioningWaiter, SecretKind, WaitError, waiter::MIN_POLL_INTERVAL};
use std::time::Duration;
use test_utils::fixtures::{iam_credentials_secret, public_certificate_secret, sample_identity};
use test_utils::mocks::{MockResponse, MockSecretsApi};
use tokio::time::Instant;

const INTERVAL: Duration = Duration::from_secs(5);

fn cert(state: &str) -> MockResponse {
    MockResponse::Secret(public_certificate_secret("cert-1", state))
}

#[tokio::test(start_paused = true)]
async fn test_polls_until_active() {
    let api = MockSecretsApi::new().on_get_sequence([
        cert("pre_activation"),
        cert("pre_activation"),
        cert("active"),
    ]);
    let waiter = ProvisioningWaiter::new(INTERVAL, Duration::from_secs(60));
    let started = Instant::now();

    let secret = waiter
        .wait(&api, &sample_identity("cert-1"), SecretKind::PublicCertificate)
        .await
        .unwrap();

    assert_eq!(secret.state_description(), "active");
    assert_eq!(api.get_count().await, 3);
    assert_eq!(started.elapsed(), INTERVAL * 2);
}

#[tokio::test(start_paused = true)]
async fn test_first_poll_is_immediate() {
    let api = MockSecretsApi::new().on_get(MockResponse::Secret(iam_credentials_secret(
        "sec-1", "active",
    )));
    let waiter = ProvisioningWaiter::new(INTERVAL, Duration::from_secs(60));
    let started = Instant::now();

    waiter
        .wait(&api, &sample_identity("sec-1"), SecretKind::IamCredentials)
        .await
        .unwrap();

    assert_eq!(api.get_count().await, 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_destroyed_fails_immediately() {
    let api = MockSecretsApi::new().on_get_sequence([
        cert("pre_activation"),
        cert("destroyed"),
        cert("active"),
    ]);
    let waiter = ProvisioningWaiter::new(INTERVAL, Duration::from_secs(60));

    let err = waiter
        .wait(&api, &sample_identity("cert-1"), SecretKind::PublicCertificate)
        .await
        .unwrap_err();

    match err {
        WaitError::Failed { state, secret } => {
            assert_eq!(state, "destroyed");
            assert_eq!(secret.id(), "cert-1");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(api.get_count().await, 2);
}

#[tokio::test(start_paused = true)]
async fn test_times_out_while_pending() {
    let api = MockSecretsApi::new().on_get(cert("pre_activation"));
    let waiter = ProvisioningWaiter::new(INTERVAL, Duration::from_secs(12));
    let started = Instant::now();

    let err = waiter
        .wait(&api, &sample_identity("cert-1"), SecretKind::PublicCertificate)
        .await
        .unwrap_err();

    match err {
        WaitError::Timeout {
            timeout,
            last_state,
            polls,
        } => {
            assert_eq!(timeout, Duration::from_secs(12));
            assert_eq!(last_state.as_deref(), Some("pre_activation"));
            assert_eq!(polls, 3);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(started.elapsed(), Duration::from_secs(12));
}

#[tokio::test(start_paused = true)]
async fn test_not_found_while_waiting() {
    let api = MockSecretsApi::new()
        .on_get_sequence([cert("pre_activation"), MockResponse::not_found()]);
    let waiter = ProvisioningWaiter::new(INTERVAL, Duration::from_secs(60));

    let err = waiter
        .wait(&api, &sample_identity("cert-1"), SecretKind::PublicCertificate)
        .await
        .unwrap_err();

    assert!(matches!(err, WaitError::Vanished { polls: 2 }));
}

#[tokio::test(start_paused = true)]
async fn test_poll_error_surfaces() {
    let api = MockSecretsApi::new().on_get(MockResponse::Status(403, "forbidden".to_string()));
    let waiter = ProvisioningWaiter::new(INTERVAL, Duration::from_secs(60));

    let err = waiter
        .wait(&api, &sample_identity("cert-1"), SecretKind::PublicCertificate)
        .await
        .unwrap_err();

    assert!(matches!(err, WaitError::Poll(_)));
    assert_eq!(api.get_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_state_is_success() {
    let api = MockSecretsApi::new().on_get(cert("suspended"));
    let waiter = ProvisioningWaiter::new(INTERVAL, Duration::from_secs(60));

    let secret = waiter
        .wait(&api, &sample_identity("cert-1"), SecretKind::PublicCertificate)
        .await
        .unwrap();

    assert_eq!(secret.state_description(), "suspended");
}

#[tokio::test(start_paused = true)]
async fn test_expired_deadline_still_polls_once() {
    let api = MockSecretsApi::new().on_get(cert("pre_activation"));
    let waiter = ProvisioningWaiter::new(INTERVAL, Duration::from_secs(60));

    let err = waiter
        .wait_until(
            &api,
            &sample_identity("cert-1"),
            SecretKind::PublicCertificate,
            Instant::now(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, WaitError::Timeout { polls: 1, .. }));
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_is_raised_to_minimum() {
    let api = MockSecretsApi::new().on_get(cert("pre_activation"));
    let waiter = ProvisioningWaiter::new(Duration::ZERO, Duration::from_millis(60));
    assert_eq!(waiter.poll_interval(), MIN_POLL_INTERVAL);
    let started = Instant::now();

    let err = waiter
        .wait(&api, &sample_identity("cert-1"), SecretKind::PublicCertificate)
        .await
        .unwrap_err();

    // polls at 0, 10, 20, 30, 40 and 50 ms
    assert!(matches!(err, WaitError::Timeout { polls: 6, .. }));
    assert_eq!(api.get_count().await, 6);
    assert_eq!(started.elapsed(), Duration::from_millis(60));
}
