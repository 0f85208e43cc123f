//! End-to-end startup and navigation flows against the in-memory gateway.

use congregation_app::errors::NetworkErrorCode;
use congregation_app::navigation::Access;
use congregation_app::ui::UiAuthContext;
use congregation_app::workflows::auth;
use congregation_app::{
    AppConfig, AuthContext, BootstrapPhase, GatewayError, MemoryGateway, NavState, Profile,
    Resolution, Route, Screen, UserId,
};
use futures::StreamExt;
use futures_signals::signal::SignalExt;
use std::sync::Arc;
use std::time::Duration;

fn context(gateway: &Arc<MemoryGateway>) -> AuthContext {
    AuthContext::new(gateway.clone(), AppConfig::default())
}

fn seed_admin(gateway: &MemoryGateway) -> UserId {
    let id = gateway.register_account("pastor@example.org", "secret1", Some("Pastor"));
    gateway.put_profile(Profile {
        id: id.clone(),
        email: "pastor@example.org".into(),
        name: "Pastor".into(),
        elevated: true,
    });
    id
}

#[tokio::test(start_paused = true)]
async fn slow_backend_shows_indicator_then_settles() {
    let gateway = Arc::new(MemoryGateway::new());
    let id = gateway.register_account("ana@example.org", "secret1", None);
    gateway.restore_session(gateway.session_for(&id));
    gateway.set_session_latency(Some(Duration::from_secs(5)));
    let context = context(&gateway);

    let start = tokio::spawn({
        let context = context.clone();
        async move { context.start().await }
    });

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert_eq!(context.snapshot().phase, BootstrapPhase::Loading);

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(context.snapshot().phase, BootstrapPhase::Slow);
    match Screen::from_snapshot(&context.snapshot()) {
        Screen::Loading { message, slow } => {
            assert!(slow);
            assert_eq!(message, "The server is waking up, please wait...");
        }
        other => panic!("unexpected screen: {other:?}"),
    }

    let snapshot = start.await.unwrap();
    assert_eq!(snapshot.phase, BootstrapPhase::Ready);
    assert_eq!(snapshot.profile.map(|p| p.id), Some(id));
    context.dispose().await;
}

#[tokio::test(start_paused = true)]
async fn give_up_proceeds_and_ignores_late_error() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.set_session_latency(Some(Duration::from_secs(15)));
    gateway.fail_session_fetch(Some(GatewayError::transport(
        NetworkErrorCode::Timeout,
        "gateway timeout",
    )));
    let context = context(&gateway);

    let snapshot = context.start().await;
    assert_eq!(snapshot.phase, BootstrapPhase::TimedOut);
    assert!(snapshot.phase.offers_retry());
    assert_eq!(
        Screen::from_snapshot(&snapshot),
        Screen::Routed {
            nav: NavState::Anonymous,
            offer_retry: true,
        }
    );
    context.dispose().await;
}

#[tokio::test(start_paused = true)]
async fn timers_stop_once_settled() {
    let gateway = Arc::new(MemoryGateway::new());
    let context = context(&gateway);

    context.start().await;
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(context.snapshot().phase, BootstrapPhase::Ready);
    context.dispose().await;
}

#[tokio::test]
async fn retry_recovers_after_failure() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.go_offline();
    let context = context(&gateway);

    let snapshot = context.start().await;
    assert!(matches!(snapshot.phase, BootstrapPhase::Failed { .. }));
    assert!(matches!(
        Screen::from_snapshot(&snapshot),
        Screen::ConnectionError { .. }
    ));

    gateway.fail_session_fetch(None);
    let snapshot = context.retry().await;
    assert_eq!(snapshot.phase, BootstrapPhase::Ready);
    assert_eq!(gateway.subscriber_count(), 1);
    context.dispose().await;
}

#[tokio::test]
async fn session_change_after_start_unlocks_admin() {
    let gateway = Arc::new(MemoryGateway::new());
    let admin = seed_admin(&gateway);
    let ui = UiAuthContext::new(context(&gateway));

    ui.raw().start().await;
    assert_eq!(ui.navigate("/admin"), Some(Resolution::NoMatch));

    gateway.emit_session(gateway.session_for(&admin));
    let snapshot = ui.raw().wait_until(|s| s.profile.is_some()).await;
    assert!(snapshot.is_elevated());
    assert_eq!(
        ui.raw().nav_state(),
        NavState::Authenticated {
            access: Access::Elevated
        }
    );
    assert_eq!(ui.navigate("/admin"), Some(Resolution::Render(Route::Admin)));
    assert_eq!(ui.navigate("/"), Some(Resolution::Redirect(Route::Dashboard)));
    assert_eq!(gateway.insert_calls(), 0);
    ui.raw().dispose().await;
}

#[tokio::test]
async fn sign_out_returns_to_sign_in() {
    let gateway = Arc::new(MemoryGateway::new());
    let admin = seed_admin(&gateway);
    gateway.restore_session(gateway.session_for(&admin));
    let context = context(&gateway);

    let snapshot = context.start().await;
    assert!(snapshot.is_elevated());

    auth::sign_out(&context).await.unwrap();
    context.wait_until(|s| s.session.is_none()).await;
    let nav = context.nav_state();
    assert_eq!(nav, NavState::Anonymous);
    assert_eq!(nav.resolve(Route::Events), Resolution::Redirect(Route::SignIn));
    assert!(nav.menu().is_empty());
    context.dispose().await;
}

#[tokio::test]
async fn nav_signal_tracks_sign_in() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.register_account("ana@example.org", "secret1", None);
    let context = context(&gateway);
    context.start().await;

    let stream = context.nav_signal().to_stream();
    futures::pin_mut!(stream);
    assert_eq!(stream.next().await, Some(NavState::Anonymous));

    auth::sign_in(&context, "ana@example.org", "secret1")
        .await
        .unwrap();
    let mut nav = stream.next().await;
    while nav == Some(NavState::AuthenticatedUnresolved) {
        nav = stream.next().await;
    }
    assert_eq!(
        nav,
        Some(NavState::Authenticated {
            access: Access::Standard
        })
    );
    context.dispose().await;
}

#[tokio::test]
async fn repeated_start_subscribes_once() {
    let gateway = Arc::new(MemoryGateway::new());
    let context = context(&gateway);

    context.start().await;
    context.start().await;
    assert_eq!(gateway.subscriber_count(), 1);
    context.dispose().await;
}

#[tokio::test]
async fn dispose_releases_subscription() {
    let gateway = Arc::new(MemoryGateway::new());
    let admin = seed_admin(&gateway);
    let context = context(&gateway);
    context.start().await;
    assert_eq!(gateway.subscriber_count(), 1);

    context.dispose().await;
    context.dispose().await;
    assert!(context.is_disposed());
    assert_eq!(gateway.subscriber_count(), 0);

    gateway.emit_session(gateway.session_for(&admin));
    tokio::task::yield_now().await;
    assert!(context.snapshot().session.is_none());
}

#[tokio::test]
async fn dropping_context_releases_subscription() {
    let gateway = Arc::new(MemoryGateway::new());
    let context = context(&gateway);
    context.start().await;
    assert_eq!(gateway.subscriber_count(), 1);

    drop(context);
    for _ in 0..10 {
        if gateway.subscriber_count() == 0 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(gateway.subscriber_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn sign_out_is_not_held_up_by_slow_profile_lookup() {
    let gateway = Arc::new(MemoryGateway::new());
    let id = gateway.register_account("ana@example.org", "secret1", None);
    let context = context(&gateway);
    context.start().await;

    gateway.set_profile_latency(Some(Duration::from_secs(60)));
    gateway.emit_session(gateway.session_for(&id));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(context.nav_state(), NavState::AuthenticatedUnresolved);

    gateway.emit_session(None);
    tokio::time::sleep(Duration::from_millis(10)).await;
    let snapshot = context.snapshot();
    assert!(snapshot.session.is_none());
    assert!(snapshot.profile.is_none());

    // The abandoned lookup never lands.
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(context.snapshot().profile.is_none());
    assert_eq!(gateway.insert_calls(), 0);
    context.dispose().await;
}

#[tokio::test(start_paused = true)]
async fn dispose_does_not_wait_for_pending_lookup() {
    let gateway = Arc::new(MemoryGateway::new());
    let id = gateway.register_account("ana@example.org", "secret1", None);
    let context = context(&gateway);
    context.start().await;

    gateway.set_profile_latency(Some(Duration::from_secs(3_600)));
    gateway.emit_session(gateway.session_for(&id));
    tokio::time::sleep(Duration::from_millis(10)).await;

    let disposed = tokio::time::timeout(Duration::from_secs(30), context.dispose()).await;
    assert!(disposed.is_ok());
    assert_eq!(gateway.subscriber_count(), 0);
}
