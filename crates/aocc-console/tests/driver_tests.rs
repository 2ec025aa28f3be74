//! Async driver tests on tokio's paused clock.

use std::sync::Arc;
use std::time::Duration;

use aocc_console::{Session, SystemStatus, ToastKind, driver};
use aocc_core::{AoccConfig, AoccError, TokioClock};

fn spawn_session() -> driver::SessionHandle {
    driver::spawn(Session::new(AoccConfig::default(), Arc::new(TokioClock)))
}

#[tokio::test(start_paused = true)]
async fn test_driver_expires_toasts_on_time() {
    let handle = spawn_session();
    handle
        .call(|s| s.show_toast(ToastKind::Info, "hello", None))
        .await
        .unwrap()
        .unwrap();

    tokio::time::sleep(Duration::from_millis(2999)).await;
    assert_eq!(handle.call(|s| s.toasts().len()).await.unwrap(), 1);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(handle.call(|s| s.toasts().len()).await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_driver_countdown_dismisses() {
    let handle = spawn_session();
    handle
        .call(|s| {
            s.present_recommendation(aocc_console::demo::demo_recommendation(None))
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(handle.call(|s| s.seconds_remaining()).await.unwrap(), Some(30));

    tokio::time::sleep(Duration::from_secs(31)).await;
    let snapshot = handle.snapshot();
    assert!(snapshot.recommendation.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_driver_publishes_snapshots() {
    let handle = spawn_session();
    let mut rx = handle.subscribe();

    handle.call(|s| s.toggle_status()).await.unwrap().unwrap();
    rx.changed().await.unwrap();

    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot.status, SystemStatus::Alert);
    assert_eq!(snapshot.alerts.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_disposes() {
    let handle = spawn_session();
    handle.call(|s| s.toggle_status()).await.unwrap().unwrap();

    let last = handle.shutdown().await.unwrap();
    assert!(last.disposed);
    assert!(last.toasts.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_calls_after_logout_report_disposed() {
    let handle = spawn_session();
    handle.call(|s| s.request_logout()).await.unwrap().unwrap();
    handle.call(|s| s.confirm()).await.unwrap().unwrap();

    let err = handle
        .call(|s| s.toggle_status())
        .await
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, AoccError::SessionDisposed));
    assert!(handle.is_running());
}
