//! Single-request orchestration over a [`WebClientFactory`].
//!
//! Every call creates one web client, runs one operation against it, applies
//! the selector to the result and then releases the client. The client is
//! owned by the returned future, so it is released exactly once whichever
//! way the call ends: success, a failed operation, a failed selector,
//! cancellation, or the caller dropping the future before it completes.

use super::client::{TransportError, WebClient, WebClientFactory};
use crate::domain::ErrorLogError;
use futures::future::BoxFuture;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Runs `operation` on a fresh web client and returns its result unchanged.
pub async fn transact<T, Op>(
    factory: &dyn WebClientFactory,
    operation: Op,
) -> Result<T, ErrorLogError>
where
    Op: for<'c> FnOnce(&'c mut dyn WebClient) -> BoxFuture<'c, Result<T, TransportError>>,
{
    run(factory, None, operation, |_, value| Ok(value)).await
}

/// Runs `operation` on a fresh web client and maps its result with
/// `selector` before the client is released.
pub async fn transact_with<T, R, Op, Sel>(
    factory: &dyn WebClientFactory,
    operation: Op,
    selector: Sel,
) -> Result<R, ErrorLogError>
where
    Op: for<'c> FnOnce(&'c mut dyn WebClient) -> BoxFuture<'c, Result<T, TransportError>>,
    Sel: FnOnce(&dyn WebClient, T) -> Result<R, ErrorLogError>,
{
    run(factory, None, operation, selector).await
}

/// Like [`transact_with`], but gives up with [`ErrorLogError::Cancelled`]
/// as soon as `cancel` fires. The web client is released on that path too.
pub async fn transact_until_cancelled<T, R, Op, Sel>(
    factory: &dyn WebClientFactory,
    cancel: &CancellationToken,
    operation: Op,
    selector: Sel,
) -> Result<R, ErrorLogError>
where
    Op: for<'c> FnOnce(&'c mut dyn WebClient) -> BoxFuture<'c, Result<T, TransportError>>,
    Sel: FnOnce(&dyn WebClient, T) -> Result<R, ErrorLogError>,
{
    if cancel.is_cancelled() {
        return Err(ErrorLogError::Cancelled);
    }
    run(factory, Some(cancel), operation, selector).await
}

async fn run<T, R, Op, Sel>(
    factory: &dyn WebClientFactory,
    cancel: Option<&CancellationToken>,
    operation: Op,
    selector: Sel,
) -> Result<R, ErrorLogError>
where
    Op: for<'c> FnOnce(&'c mut dyn WebClient) -> BoxFuture<'c, Result<T, TransportError>>,
    Sel: FnOnce(&dyn WebClient, T) -> Result<R, ErrorLogError>,
{
    let mut client = factory.create()?;
    let started = Instant::now();

    let outcome = {
        let pending = operation(client.as_mut());
        match cancel {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => {
                    warn!("Request cancelled before the backend answered");
                    Err(ErrorLogError::Cancelled)
                }
                value = pending => value.map_err(ErrorLogError::from),
            },
            None => pending.await.map_err(ErrorLogError::from),
        }
    };

    // The selector runs in the poll that observed completion, before release.
    let result = outcome.and_then(|value| selector(client.as_ref(), value));

    drop(client);
    debug!("Web client released after {:?}", started.elapsed());
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeResponse, FakeWebClientFactory};
    use url::Url;

    fn address() -> Url {
        Url::parse("http://backend.test/api/logs").unwrap()
    }

    #[tokio::test]
    async fn test_identity_selector_returns_body() {
        let factory = FakeWebClientFactory::new(FakeResponse::body("42"));

        let body = transact(&factory, |client| client.get(address())).await.unwrap();

        assert_eq!(body, "42");
        assert_eq!(factory.created(), 1);
        assert_eq!(factory.released(), 1);
    }

    #[tokio::test]
    async fn test_selector_sees_live_client_headers() {
        use reqwest::header::{CONTENT_TYPE, HeaderValue};

        let factory = FakeWebClientFactory::new(FakeResponse::body("ok"));

        let content_type = transact_with(
            &factory,
            |client| {
                client
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
                client.post(address(), String::new())
            },
            |client, _| Ok(client.headers().get(CONTENT_TYPE).cloned()),
        )
        .await
        .unwrap();

        assert_eq!(content_type, Some(HeaderValue::from_static("text/plain")));
        assert_eq!(factory.released(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_token_skips_client_creation() {
        let factory = FakeWebClientFactory::new(FakeResponse::body("42"));
        let token = CancellationToken::new();
        token.cancel();

        let result = transact_until_cancelled(
            &factory,
            &token,
            |client| client.get(address()),
            |_, body| Ok(body),
        )
        .await;

        assert!(matches!(result, Err(ErrorLogError::Cancelled)));
        assert_eq!(factory.created(), 0);
        assert_eq!(factory.released(), 0);
    }
}
