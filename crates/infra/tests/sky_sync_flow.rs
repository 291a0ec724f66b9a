//! End-to-end sync against a mocked SKY API: encrypted store, auth and
//! constituent clients, the sync task and the scheduler wired together.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use skysync_core::{ConstituentSyncTask, LoggingRecordSink, SyncTask, TokenStore};
use skysync_domain::{PaginationCursor, SkyApiConfig, SyncOutcome};
use skysync_infra::{
    ConstituentsClient, FileTokenStore, HttpClient, KeyFileProtector, SchedulerExit,
    SkyAuthClient, SyncScheduler, SyncSchedulerConfig,
};
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    store: Arc<FileTokenStore>,
    sink: Arc<LoggingRecordSink>,
    task: Arc<ConstituentSyncTask>,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().with_env_filter("debug").try_init();
}

fn harness(dir: &Path, server: &MockServer) -> Harness {
    let config = SkyApiConfig {
        auth_base_uri: server.uri(),
        auth_client_id: "app-id".into(),
        auth_client_secret: "app-secret".into(),
        sky_api_subscription_key: "sub-key".into(),
        sky_api_base_uri: server.uri(),
    };
    let protector = Arc::new(KeyFileProtector::open_or_create(dir.join("state.key")).unwrap());
    let store = Arc::new(FileTokenStore::open(dir.join("state.json"), protector));
    let http = HttpClient::builder().timeout(Duration::from_secs(5)).build().unwrap();
    let auth = Arc::new(SkyAuthClient::new(http.clone(), &config, store.clone()).unwrap());
    let source = Arc::new(ConstituentsClient::new(http, &config, store.clone(), auth).unwrap());
    let sink = Arc::new(LoggingRecordSink::new());
    let task = Arc::new(ConstituentSyncTask::new(store.clone(), source, sink.clone()));

    Harness { store, sink, task }
}

fn page_body(server: &MockServer, count: usize, sort_token: &str) -> String {
    let value: Vec<_> =
        (0..count).map(|i| serde_json::json!({ "id": i.to_string(), "type": "Individual" })).collect();
    serde_json::json!({
        "count": count,
        "next_link": format!(
            "{}/constituent/v1/constituents?last_modified=2024-05-01T10%3A00%3A00Z&sort_token={sort_token}",
            server.uri()
        ),
        "value": value,
    })
    .to_string()
}

#[tokio::test]
async fn expired_token_is_refreshed_and_cursor_advances() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/constituent/v1/constituents"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"access_token":"fresh","refresh_token":"rotated","token_type":"bearer"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/constituent/v1/constituents"))
        .and(header("authorization", "Bearer fresh"))
        .and(header("bb-api-subscription-key", "sub-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_body(&server, 3, "t1")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let h = harness(dir.path(), &server);
    h.store.set_access_token(Some("stale")).unwrap();
    h.store.set_refresh_token(Some("initial-refresh")).unwrap();

    assert_eq!(h.task.run().await, SyncOutcome::Success);

    assert_eq!(h.sink.applied(), 3);
    assert_eq!(h.store.access_token().as_deref(), Some("fresh"));
    assert_eq!(h.store.refresh_token().as_deref(), Some("rotated"));
    assert_eq!(
        h.store.cursor(),
        Some(PaginationCursor {
            last_modified: Some("2024-05-01T10:00:00Z".into()),
            sort_token: Some("t1".into()),
        })
    );

    let on_disk = std::fs::read_to_string(dir.path().join("state.json")).unwrap();
    assert!(!on_disk.contains("\"fresh\""));
    assert!(!on_disk.contains("\"rotated\""));
    assert!(on_disk.contains("t1"));
}

#[tokio::test]
async fn next_cycle_resumes_from_persisted_cursor() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("sort_token", "t1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_body(&server, 0, "t2")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    {
        let h = harness(dir.path(), &server);
        h.store
            .set_cursor(&PaginationCursor {
                last_modified: Some("2024-05-01T09:00:00Z".into()),
                sort_token: Some("t1".into()),
            })
            .unwrap();
    }

    let h = harness(dir.path(), &server);
    assert_eq!(h.task.run().await, SyncOutcome::Success);
    assert_eq!(h.store.cursor().and_then(|c| c.sort_token).as_deref(), Some("t2"));
}

#[tokio::test]
async fn scheduler_halts_when_a_cycle_fails() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/constituent/v1/constituents"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_body(&server, 1, "t1")))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/constituent/v1/constituents"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let h = harness(dir.path(), &server);
    let scheduler = SyncScheduler::new(
        vec![h.task.clone() as Arc<dyn SyncTask>],
        SyncSchedulerConfig { interval: Duration::from_millis(20), ..SyncSchedulerConfig::default() },
    );

    let exit = tokio::time::timeout(Duration::from_secs(10), scheduler.run(CancellationToken::new()))
        .await
        .expect("scheduler should halt on its own");

    assert_eq!(exit, SchedulerExit::Halted { cycles: 2 });
    assert_eq!(h.sink.applied(), 1);
    // the failed cycle left the cursor from the first page in place
    assert_eq!(h.store.cursor().and_then(|c| c.sort_token).as_deref(), Some("t1"));
}

#[tokio::test]
async fn cancellation_stops_a_healthy_scheduler() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"count":0,"value":[]}"#))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let h = harness(dir.path(), &server);
    let scheduler = SyncScheduler::new(
        vec![h.task.clone() as Arc<dyn SyncTask>],
        SyncSchedulerConfig { interval: Duration::from_millis(10), ..SyncSchedulerConfig::default() },
    );
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let exit = tokio::time::timeout(Duration::from_secs(10), scheduler.run(cancel))
        .await
        .expect("scheduler should stop when cancelled");

    assert!(matches!(exit, SchedulerExit::Cancelled { cycles } if cycles >= 1), "got {exit:?}");

    // the first cycle's start time becomes the cursor every later cycle reuses
    let cursor = h.store.cursor().expect("starting cursor persisted");
    assert!(cursor.sort_token.is_none());
    let since = cursor.last_modified.expect("last_modified set");
    let requests: Vec<_> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/constituent/v1/constituents")
        .collect();
    assert!(!requests.is_empty());
    for request in requests {
        let sent = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "last_modified")
            .map(|(_, v)| v.into_owned());
        assert_eq!(sent.as_deref(), Some(since.as_str()));
    }
}
