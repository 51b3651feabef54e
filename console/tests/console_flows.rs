//! End-to-end console flows against a scripted transport

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use gopypi_admin::{
    selectors, Console, ConsoleConfig, ConsoleEnvironment, ConsoleState, Level, MemoryTokenStorage,
    TokenStorage,
};
use gopypi_admin_client::{ApiError, ApiResponse, ListParams, Method};
use gopypi_admin_core::environment::Route;
use gopypi_admin_testing::helpers::init_tracing;
use gopypi_admin_testing::{test_clock, RecordingNavigator, SequentialIds, StubTransport};
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    console: Console,
    transport: StubTransport,
    navigator: RecordingNavigator,
    storage: Arc<MemoryTokenStorage>,
}

fn harness_with(transport: StubTransport, config: &ConsoleConfig, ttl: Duration) -> Harness {
    assemble(transport, config, ttl, Arc::new(MemoryTokenStorage::new()))
}

fn assemble(
    transport: StubTransport,
    config: &ConsoleConfig,
    ttl: Duration,
    storage: Arc<MemoryTokenStorage>,
) -> Harness {
    init_tracing();

    let navigator = RecordingNavigator::new();
    let environment = ConsoleEnvironment::new(
        Arc::new(test_clock()),
        Arc::new(SequentialIds::new()),
        ttl,
    );

    let console = Console::assemble(
        config,
        environment,
        Arc::new(transport.clone()),
        storage.clone(),
        Arc::new(navigator.clone()),
    );

    Harness {
        console,
        transport,
        navigator,
        storage,
    }
}

fn harness(transport: StubTransport) -> Harness {
    harness_with(transport, &ConsoleConfig::default(), Duration::from_secs(60))
}

#[tokio::test]
async fn login_stores_token_and_marks_session() {
    let h = harness(StubTransport::new().respond(
        Method::POST,
        "/login/",
        ApiResponse::new(200, "{}").with_header("authorization", "tok123"),
    ));

    let token = h.console.login("alice", "secret").await.unwrap();

    assert_eq!(token, "tok123");
    assert_eq!(h.storage.load().as_deref(), Some("tok123"));
    assert!(h.console.select(selectors::is_logged_in).await);

    let sent = h.transport.requests();
    assert_eq!(
        sent[0].body,
        Some(serde_json::json!({"username": "alice", "password": "secret"}))
    );
}

#[tokio::test]
async fn token_is_attached_after_login() {
    let h = harness(
        StubTransport::new()
            .respond(
                Method::POST,
                "/login/",
                ApiResponse::new(200, "{}").with_header("authorization", "tok123"),
            )
            .ok_json(Method::GET, "/me/", r#"{"result":{"id":1,"username":"alice"}}"#),
    );

    h.console.login("alice", "secret").await.unwrap();
    let me = h.console.get_me().await.unwrap();

    let sent = h.transport.requests();
    assert_eq!(sent[0].header("Authorization"), None);
    assert_eq!(sent[1].header("Authorization"), Some("tok123"));
    assert_eq!(me.username, "alice");
    assert_eq!(
        h.console.select(|s| selectors::me(s).map(|u| u.id)).await,
        Some(1)
    );
}

#[tokio::test]
async fn logout_clears_token() {
    let h = harness(StubTransport::new());
    h.storage.save("tok123").unwrap();

    h.console.logout().await.unwrap();

    assert_eq!(h.storage.load(), None);
    assert!(!h.console.select(selectors::is_logged_in).await);
}

#[tokio::test]
async fn missing_package_posts_danger_message() {
    let h = harness(StubTransport::new().respond(
        Method::GET,
        "/package/42/",
        ApiResponse::new(404, ""),
    ));

    let error = h.console.get_package(42).await.unwrap_err();

    assert!(matches!(
        error,
        gopypi_admin::ConsoleError::Api(ApiError::Rejected { status: 404, .. })
    ));
    let messages = h.console.select(|s| selectors::messages(s).to_vec()).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].level, Level::Danger);
    assert!(messages[0].text.contains("Cannot get package: Not Found"));
    assert!(h.console.select(|s| selectors::single_package(s).is_none()).await);
}

#[tokio::test]
async fn missing_user_posts_danger_message() {
    let h = harness(StubTransport::new());

    assert!(h.console.get_user(9).await.is_err());

    let messages = h.console.select(|s| selectors::messages(s).to_vec()).await;
    assert_eq!(messages[0].text, "Cannot get user: Not Found");
}

#[tokio::test]
async fn session_expiry_is_absorbed() {
    let h = harness(StubTransport::new().respond(Method::GET, "/me/", ApiResponse::new(401, "")));

    let error = h.console.get_me().await.unwrap_err();

    assert!(error.is_absorbed());
    assert_eq!(h.navigator.routes(), vec![Route::Login]);
    let state = h.console.select(ConsoleState::clone).await;
    assert!(state.auth.me.is_none());
    assert!(state.messages.all.is_empty());
    assert_eq!(state.pending.pending, 0);
}

#[tokio::test]
async fn session_expiry_clears_stale_token() {
    let h = assemble(
        StubTransport::new().respond(Method::GET, "/me/", ApiResponse::new(401, "")),
        &ConsoleConfig::default(),
        Duration::from_secs(60),
        Arc::new(MemoryTokenStorage::with_token("stale")),
    );
    assert!(h.console.select(selectors::is_logged_in).await);

    assert!(h.console.get_me().await.unwrap_err().is_absorbed());

    assert_eq!(h.storage.load(), None);
    assert!(!h.console.select(selectors::is_logged_in).await);

    // The next request goes out without the rejected token
    let _ = h.console.get_me().await;
    let sent = h.transport.requests();
    assert_eq!(sent[0].header("Authorization"), Some("stale"));
    assert_eq!(sent[1].header("Authorization"), None);
}

#[tokio::test]
async fn stored_token_starts_logged_in() {
    let h = assemble(
        StubTransport::new(),
        &ConsoleConfig::default(),
        Duration::from_secs(60),
        Arc::new(MemoryTokenStorage::with_token("tok123")),
    );
    assert!(h.console.select(selectors::is_logged_in).await);

    let fresh = harness(StubTransport::new());
    assert!(!fresh.console.select(selectors::is_logged_in).await);
}

#[tokio::test]
async fn session_expiry_on_entity_fetch_posts_nothing() {
    let h = harness(StubTransport::new().respond(
        Method::GET,
        "/package/42/",
        ApiResponse::new(401, ""),
    ));

    assert!(h.console.get_package(42).await.unwrap_err().is_absorbed());
    assert!(h.console.select(|s| selectors::messages(s).is_empty()).await);
    assert_eq!(h.navigator.count(Route::Login), 1);
}

#[tokio::test]
async fn server_fault_posts_one_message_with_url() {
    let h = harness(StubTransport::new().respond(
        Method::GET,
        "/stats/server/",
        ApiResponse::new(500, ""),
    ));

    let error = h.console.get_server_stats().await.unwrap_err();

    assert!(error.is_absorbed());
    assert_eq!(h.navigator.count(Route::Login), 1);

    let messages = h.console.select(|s| selectors::messages(s).to_vec()).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].level, Level::Danger);
    assert!(messages[0].text.contains("/stats/server/"));
    assert!(h.console.select(|s| selectors::server_stats(s).is_none()).await);
}

#[tokio::test]
async fn list_without_params_sends_empty_query() {
    let h = harness(StubTransport::new().ok_json(
        Method::GET,
        "/package/",
        r#"{"result":[{"id":1,"name":"requests"}],"paginator":{"page":1,"per_page":20,"count":1,"num_pages":1}}"#,
    ));

    let page = h.console.get_all_packages(&ListParams::new()).await.unwrap();

    assert_eq!(page.result.len(), 1);
    assert!(h.transport.requests()[0].query.is_empty());
    assert_eq!(
        h.console
            .select(|s| selectors::all_packages_paginator(s).map(|p| p.count))
            .await,
        Some(1)
    );
}

#[tokio::test]
async fn active_users_adds_filter() {
    let h = harness(StubTransport::new().ok_json(
        Method::GET,
        "/user/",
        r#"{"result":[{"id":2,"username":"bob","is_active":true}],"paginator":{"page":1,"per_page":10,"count":1,"num_pages":1}}"#,
    ));

    h.console
        .get_active_users(&ListParams::new().page(1))
        .await
        .unwrap();

    let query = h.transport.requests()[0].query.clone();
    assert!(query.contains(&("is_active".to_string(), "true".to_string())));
    assert!(query.contains(&("page".to_string(), "1".to_string())));
    assert_eq!(h.console.select(|s| selectors::all_users(s).len()).await, 1);
    assert_eq!(h.console.select(|s| selectors::all_users_paginator(s).count).await, 1);
}

#[tokio::test]
async fn list_failures_are_silent_by_default() {
    let h = harness(StubTransport::new().fail(Method::GET, "/license/", "connection refused"));

    let error = h.console.get_all_licenses().await.unwrap_err();

    assert!(!error.is_absorbed());
    assert!(h.console.select(|s| selectors::messages(s).is_empty()).await);
}

#[tokio::test]
async fn list_failures_can_be_reported() {
    let config = ConsoleConfig::default().with_report_list_failures(true);
    let h = harness_with(
        StubTransport::new().respond(Method::GET, "/license/", ApiResponse::new(403, "")),
        &config,
        Duration::from_secs(60),
    );

    assert!(h.console.get_all_licenses().await.is_err());

    let messages = h.console.select(|s| selectors::messages(s).to_vec()).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "Cannot load licenses: Forbidden");
}

#[tokio::test]
async fn maintainer_change_refetches_package() {
    let h = harness(
        StubTransport::new()
            .ok_json(Method::POST, "/package/3/maintainer/9/", "{}")
            .ok_json(
                Method::GET,
                "/package/3/",
                r#"{"result":{"id":3,"name":"flask","maintainers":[{"id":9,"username":"kim"}]}}"#,
            ),
    );

    let package = h.console.add_maintainer(3, 9).await.unwrap();

    assert_eq!(package.maintainers[0].username, "kim");
    assert_eq!(
        h.console
            .select(|s| selectors::single_package(s).map(|p| p.name.clone()))
            .await
            .as_deref(),
        Some("flask")
    );
}

#[tokio::test]
async fn feature_update_refetches_info() {
    let h = harness(
        StubTransport::new()
            .ok_json(Method::POST, "/feature/download_stats/", "{}")
            .ok_json(
                Method::GET,
                "/info/",
                r#"{"result":{"version":"0.3","features":[{"id":"download_stats","description":"","value":true}],"system":{}}}"#,
            ),
    );

    h.console.update_feature("download_stats", true).await.unwrap();

    assert!(
        h.console
            .select(|s| selectors::has_feature(s, "download_stats"))
            .await
    );
    assert_eq!(
        h.transport.requests()[0].body,
        Some(serde_json::json!({"value": true}))
    );
}

#[tokio::test]
async fn stats_land_in_their_slots() {
    let h = harness(
        StubTransport::new()
            .ok_json(Method::GET, "/stats/download/package/", r#"{"result":{"total":10}}"#)
            .ok_json(Method::GET, "/stats/download/package/4/", r#"{"result":{"total":4}}"#)
            .ok_json(
                Method::GET,
                "/stats/download/package/4/version/2/",
                r#"{"result":{"total":1}}"#,
            ),
    );

    h.console.get_all_download_stats().await.unwrap();
    h.console.get_package_download_stats(4).await.unwrap();
    h.console.get_version_download_stats(4, 2).await.unwrap();

    let state = h.console.select(ConsoleState::clone).await;
    assert_eq!(selectors::all_download_stats(&state).unwrap()["total"], 10);
    assert_eq!(selectors::package_download_stats(&state).unwrap()["total"], 4);
    assert_eq!(selectors::version_download_stats(&state).unwrap()["total"], 1);
}

#[tokio::test]
async fn hide_removes_only_the_named_message() {
    let h = harness(StubTransport::new());

    let a = h.console.message_info("A").await;
    let b = h.console.message_success("B").await;
    h.console.hide_message(&a).await.unwrap();

    let messages = h.console.select(|s| selectors::messages(s).to_vec()).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].id, b);
    assert_eq!(messages[0].text, "B");
}

#[tokio::test]
async fn hiding_twice_is_harmless() {
    let h = harness(StubTransport::new());

    let a = h.console.message_warning("A").await;
    h.console.hide_message(&a).await.unwrap();
    h.console.hide_message(&a).await.unwrap();

    assert!(h.console.select(|s| selectors::messages(s).is_empty()).await);
    assert_eq!(h.console.store().running_cancellables(), 0);
}

#[tokio::test]
async fn messages_expire_after_ttl() {
    let h = harness_with(
        StubTransport::new(),
        &ConsoleConfig::default(),
        Duration::from_millis(30),
    );

    h.console.message_error("short lived").await;
    assert_eq!(h.console.select(|s| selectors::messages(s).len()).await, 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(h.console.select(|s| selectors::messages(s).is_empty()).await);
}

#[tokio::test]
async fn early_hide_cancels_expiry() {
    let h = harness_with(
        StubTransport::new(),
        &ConsoleConfig::default(),
        Duration::from_millis(30),
    );
    let mut actions = h.console.store().subscribe_actions();

    let a = h.console.message_info("A").await;
    h.console.hide_message(&a).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Add and the explicit Hide only; the timer never fired
    let mut seen = Vec::new();
    while let Ok(action) = actions.try_recv() {
        seen.push(action);
    }
    assert_eq!(seen.len(), 2);
}

#[tokio::test]
async fn concurrent_requests_settle_pending_to_zero() {
    let h = harness(
        StubTransport::new()
            .ok_json(Method::GET, "/license/", r#"{"result":[]}"#)
            .ok_json(Method::GET, "/info/", r#"{"result":{"version":"1"}}"#)
            .with_latency(Duration::from_millis(50)),
    );

    let console = h.console.clone();
    let in_flight = tokio::spawn(async move {
        tokio::join!(console.get_all_licenses(), console.get_all_info())
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(h.console.select(selectors::is_busy).await);

    let (licenses, info) = in_flight.await.unwrap();
    assert!(licenses.is_ok());
    assert!(info.is_ok());
    assert_eq!(h.console.select(selectors::spinner_pending_requests).await, 0);
}
