use elmah_io::test_support::{FakeResponse, FakeWebClientFactory};
use elmah_io::{ErrorLogError, TransportError, transact, transact_until_cancelled, transact_with};
use reqwest::header::{HeaderValue, USER_AGENT};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

fn address() -> Url {
    Url::parse("http://backend.test/api/logs?logId=1").unwrap()
}

#[tokio::test]
async fn test_client_released_once_on_success() {
    let factory = FakeWebClientFactory::new(FakeResponse::body("42"));

    let result = transact(&factory, |client| client.get(address())).await;

    assert_eq!(result.unwrap(), "42");
    assert_eq!(factory.created(), 1);
    assert_eq!(factory.released(), 1);
}

#[tokio::test]
async fn test_client_released_once_when_operation_fails() {
    let factory = FakeWebClientFactory::new(FakeResponse::status(503, "busy"));

    let result = transact(&factory, |client| client.get(address())).await;

    match result {
        Err(ErrorLogError::Transport(TransportError::HttpStatus { status, body })) => {
            assert_eq!(status, 503);
            assert_eq!(body, "busy");
        }
        other => panic!("Expected HTTP status error, got: {:?}", other),
    }
    assert_eq!(factory.released(), 1);
}

#[tokio::test]
async fn test_client_released_once_when_selector_fails() {
    let factory = FakeWebClientFactory::new(FakeResponse::body("not json"));

    let result: Result<serde_json::Value, _> = transact_with(
        &factory,
        |client| client.get(address()),
        |_, body| Ok(serde_json::from_str(&body).map_err(elmah_io::DecodingError::from)?),
    )
    .await;

    assert!(matches!(result, Err(ErrorLogError::Decoding(_))));
    assert_eq!(factory.created(), 1);
    assert_eq!(factory.released(), 1);
}

#[tokio::test]
async fn test_selector_runs_before_release() {
    let factory = FakeWebClientFactory::new(FakeResponse::body("42"));
    let observer = factory.clone();

    let released_during_selector = transact_with(
        &factory,
        |client| client.get(address()),
        |_, _| Ok(observer.released()),
    )
    .await
    .unwrap();

    assert_eq!(released_during_selector, 0);
    assert_eq!(factory.released(), 1);
}

#[tokio::test]
async fn test_failed_creation_releases_nothing() {
    let factory = FakeWebClientFactory::failing();

    let result = transact(&factory, |client| client.get(address())).await;

    assert!(matches!(
        result,
        Err(ErrorLogError::Transport(TransportError::ClientBuild(_)))
    ));
    assert_eq!(factory.created(), 0);
    assert_eq!(factory.released(), 0);
}

#[tokio::test]
async fn test_client_released_when_caller_drops_future() {
    let factory = FakeWebClientFactory::new(FakeResponse::Pending);

    let result = tokio::time::timeout(
        Duration::from_millis(20),
        transact(&factory, |client| client.get(address())),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(factory.created(), 1);
    assert_eq!(factory.released(), 1);
}

#[tokio::test]
async fn test_client_released_on_cancellation() {
    let factory = FakeWebClientFactory::new(FakeResponse::Pending);
    let token = CancellationToken::new();
    let trigger = token.clone();

    let (result, ()) = tokio::join!(
        transact_until_cancelled(
            &factory,
            &token,
            |client| client.get(address()),
            |_, body| Ok(body),
        ),
        async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        }
    );

    assert!(matches!(result, Err(ErrorLogError::Cancelled)));
    assert_eq!(factory.created(), 1);
    assert_eq!(factory.released(), 1);
}

#[tokio::test]
async fn test_concurrent_calls_get_independent_clients() {
    let factory = FakeWebClientFactory::new(FakeResponse::body("ok"));

    let calls = (0..8).map(|i| {
        transact(&factory, move |client| {
            let agent = HeaderValue::from_str(&format!("caller-{i}")).unwrap();
            client.headers_mut().insert(USER_AGENT, agent);
            client.get(address())
        })
    });
    let results = futures::future::join_all(calls).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(factory.created(), 8);
    assert_eq!(factory.released(), 8);

    let mut agents: Vec<String> = factory
        .requests()
        .iter()
        .map(|r| r.headers[USER_AGENT].to_str().unwrap().to_string())
        .collect();
    agents.sort();
    let expected: Vec<String> = (0..8).map(|i| format!("caller-{i}")).collect();
    assert_eq!(agents, expected);
}
