//! Session lifecycle and the transparent refresh-and-retry protocol.

use std::sync::Arc;

use mockall::Sequence;
use morsel_core::{
    auth::SessionManager,
    http::{ApiClient, ApiError, ApiRequest, ApiResponse, HttpTransport, MockHttpTransport},
    storage::{KeyValueStore, MemoryStore},
};
use serde_json::{Value, json};
use testresult::TestResult;

fn ok_with(body: Value) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse { status: 200, body })
}

fn status(code: u16) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse {
        status: code,
        body: Value::Null,
    })
}

fn profile_body() -> Value {
    json!({ "id": "u-1", "name": "An Nguyen", "email": "an@example.com" })
}

fn tokens_body(access: &str, refresh: &str) -> Value {
    json!({ "accessToken": access, "refreshToken": refresh })
}

async fn seeded_store() -> Result<Arc<MemoryStore>, Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());

    store.put("accessToken", "stale").await?;
    store.put("refreshToken", "ref-1").await?;

    Ok(store)
}

fn wire(
    transport: MockHttpTransport,
    store: Arc<MemoryStore>,
) -> (Arc<dyn HttpTransport>, Arc<SessionManager>) {
    let transport: Arc<dyn HttpTransport> = Arc::new(transport);
    let session = Arc::new(SessionManager::new(
        Arc::clone(&transport),
        store as Arc<dyn KeyValueStore>,
    ));

    (transport, session)
}

#[tokio::test]
async fn a_double_401_triggers_exactly_one_refresh_and_one_replay() -> TestResult {
    let store = seeded_store().await?;
    let mut transport = MockHttpTransport::new();
    let mut seq = Sequence::new();

    // Bootstrap restores the persisted session.
    transport
        .expect_execute()
        .withf(|request, bearer| {
            request.path == "/users/profile" && bearer.as_deref() == Some("stale")
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| ok_with(profile_body()));

    // First attempt is rejected.
    transport
        .expect_execute()
        .withf(|request, bearer| {
            request.path == "/orders/o-1" && bearer.as_deref() == Some("stale")
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| status(401));

    // Exactly one refresh is permitted.
    transport
        .expect_execute()
        .withf(|request, _| request.path == "/auth/refresh-token")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| ok_with(tokens_body("fresh", "ref-2")));

    // The one replay still fails; no further refresh or replay happens.
    transport
        .expect_execute()
        .withf(|request, bearer| {
            request.path == "/orders/o-1" && bearer.as_deref() == Some("fresh")
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| status(401));

    let (transport, session) = wire(transport, Arc::clone(&store));

    assert!(session.bootstrap().await?, "bootstrap should restore");

    let client = ApiClient::new(transport, Arc::clone(&session));

    let result = client
        .execute(ApiRequest::get("/orders/o-1").authenticated())
        .await;

    assert!(
        matches!(result, Err(ApiError::Unauthorized)),
        "expected Unauthorized, got {result:?}"
    );

    // The session is torn down, in memory and on disk.
    assert!(!session.is_authenticated().await);
    assert_eq!(store.get("accessToken").await?, None);
    assert_eq!(store.get("refreshToken").await?, None);

    Ok(())
}

#[tokio::test]
async fn a_failed_login_leaves_the_prior_session_untouched() -> TestResult {
    let store = Arc::new(MemoryStore::new());
    let mut transport = MockHttpTransport::new();
    let mut seq = Sequence::new();

    transport
        .expect_execute()
        .withf(|request, _| request.path == "/auth/login")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| ok_with(tokens_body("t-1", "ref-1")));

    transport
        .expect_execute()
        .withf(|request, bearer| {
            request.path == "/users/profile" && bearer.as_deref() == Some("t-1")
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| ok_with(profile_body()));

    transport
        .expect_execute()
        .withf(|request, _| request.path == "/auth/login")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| status(401));

    let (_, session) = wire(transport, Arc::clone(&store));

    session.login("an@example.com", "correct-horse").await?;

    let failed = session.login("an@example.com", "wrong").await;

    assert!(failed.is_err(), "the second login must fail");
    assert!(session.is_authenticated().await);
    assert_eq!(store.get("accessToken").await?.as_deref(), Some("t-1"));

    Ok(())
}

#[tokio::test]
async fn bootstrap_recovers_a_stale_access_token_with_one_refresh() -> TestResult {
    let store = seeded_store().await?;
    let mut transport = MockHttpTransport::new();
    let mut seq = Sequence::new();

    transport
        .expect_execute()
        .withf(|request, bearer| {
            request.path == "/users/profile" && bearer.as_deref() == Some("stale")
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| status(401));

    transport
        .expect_execute()
        .withf(|request, _| request.path == "/auth/refresh-token")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| ok_with(tokens_body("fresh", "ref-2")));

    transport
        .expect_execute()
        .withf(|request, bearer| {
            request.path == "/users/profile" && bearer.as_deref() == Some("fresh")
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| ok_with(profile_body()));

    let (_, session) = wire(transport, Arc::clone(&store));

    assert!(session.bootstrap().await?);
    assert!(session.is_authenticated().await);

    // The refreshed pair replaces the persisted one.
    assert_eq!(store.get("accessToken").await?.as_deref(), Some("fresh"));
    assert_eq!(store.get("refreshToken").await?.as_deref(), Some("ref-2"));

    Ok(())
}

#[tokio::test]
async fn bootstrap_clears_everything_when_the_refresh_fails() -> TestResult {
    let store = seeded_store().await?;
    let mut transport = MockHttpTransport::new();
    let mut seq = Sequence::new();

    transport
        .expect_execute()
        .withf(|request, _| request.path == "/users/profile")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| status(401));

    transport
        .expect_execute()
        .withf(|request, _| request.path == "/auth/refresh-token")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| status(401));

    let (_, session) = wire(transport, Arc::clone(&store));

    assert!(
        !session.bootstrap().await?,
        "an irrecoverable refresh reports unauthenticated"
    );
    assert!(!session.is_authenticated().await);
    assert_eq!(store.get("accessToken").await?, None);
    assert_eq!(store.get("refreshToken").await?, None);

    Ok(())
}

#[tokio::test]
async fn logout_clears_the_session_even_when_the_server_fails() -> TestResult {
    let store = Arc::new(MemoryStore::new());
    let mut transport = MockHttpTransport::new();
    let mut seq = Sequence::new();

    transport
        .expect_execute()
        .withf(|request, _| request.path == "/auth/login")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| ok_with(tokens_body("t-1", "ref-1")));

    transport
        .expect_execute()
        .withf(|request, _| request.path == "/users/profile")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| ok_with(profile_body()));

    // Server-side invalidation is best effort only.
    transport
        .expect_execute()
        .withf(|request, _| request.path == "/auth/logout")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| status(500));

    let (_, session) = wire(transport, Arc::clone(&store));

    session.login("an@example.com", "correct-horse").await?;
    session.logout().await;

    assert!(!session.is_authenticated().await);
    assert_eq!(store.get("accessToken").await?, None);
    assert_eq!(store.get("refreshToken").await?, None);

    Ok(())
}
