use std::sync::atomic::Ordering;

use ludex::session::SessionStatus;

use crate::helpers::{MockGateway, ambient_manager, test_user, token_manager, token_payload};

#[tokio::test]
async fn test_overlapping_operations_are_rejected_busy() {
    let gateway = MockGateway::new();
    gateway.logins_as(token_payload(&test_user(5, "alice")));
    let (manager, _store) = token_manager(gateway.clone());
    manager.settled().await;

    let hold = gateway.hold_next();
    let first = tokio::spawn({
        let manager = manager.clone();
        async move { manager.login("alice", "hunter2").await }
    });
    hold.entered.notified().await;

    // Issued while the first call is genuinely in flight
    let err = manager.login("alice", "hunter2").await.unwrap_err();
    assert!(err.is_busy());
    let err = manager.logout().await.unwrap_err();
    assert!(err.is_busy());
    let err = manager.refresh().await.unwrap_err();
    assert!(err.is_busy());

    hold.release.notify_one();
    let snapshot = first.await.unwrap().unwrap();
    assert_eq!(snapshot.status, SessionStatus::Authenticated);

    // The rejected calls left no trace on the winner
    assert_eq!(manager.current().last_error, None);
    assert_eq!(gateway.login_calls.load(Ordering::SeqCst), 1);
    assert_eq!(gateway.logout_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_login_during_rehydration_is_rejected_busy() {
    let gateway = MockGateway::new();
    gateway.me_returns(test_user(3, "resumed"));
    let hold = gateway.hold_next();
    let manager = ambient_manager(gateway.clone());
    hold.entered.notified().await;

    // Rehydration holds the busy marker, so a racing login cannot slip in
    // ahead of the reconciliation result
    let err = manager.login("alice", "hunter2").await.unwrap_err();
    assert!(err.is_busy());
    assert_eq!(gateway.login_calls.load(Ordering::SeqCst), 0);

    hold.release.notify_one();
    let snapshot = manager.settled().await;
    assert_eq!(snapshot.status, SessionStatus::Authenticated);
    assert_eq!(
        snapshot.user.map(|u| u.username),
        Some("resumed".to_string())
    );
}

#[tokio::test]
async fn test_dispose_discards_an_in_flight_login() {
    let gateway = MockGateway::new();
    gateway.logins_as(token_payload(&test_user(5, "alice")));
    let (manager, _store) = token_manager(gateway.clone());
    manager.settled().await;

    let hold = gateway.hold_next();
    let first = tokio::spawn({
        let manager = manager.clone();
        async move { manager.login("alice", "hunter2").await }
    });
    hold.entered.notified().await;

    manager.dispose();
    hold.release.notify_one();

    // The response arrived after disposal: reported as disposed, not applied
    let err = first.await.unwrap().unwrap_err();
    assert!(err.is_disposed());
    let snapshot = manager.current();
    assert_eq!(snapshot.status, SessionStatus::Anonymous);
    assert_eq!(snapshot.user, None);
    assert!(!snapshot.busy);
}
