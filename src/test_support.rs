//! In-memory web clients for tests.
//!
//! `FakeWebClientFactory` hands out clients that answer every request with a
//! canned response, record what was sent, and count how many clients were
//! created and released.

use crate::sender::{TransportError, WebClient, WebClientFactory};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

/// What a fake web client answers with.
#[derive(Debug, Clone)]
pub enum FakeResponse {
    Body(String),
    Status { status: u16, body: String },
    /// Never completes; used to exercise cancellation and dropped futures.
    Pending,
}

impl FakeResponse {
    pub fn body(body: impl Into<String>) -> Self {
        FakeResponse::Body(body.into())
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        FakeResponse::Status {
            status,
            body: body.into(),
        }
    }
}

/// A request captured by a fake web client.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub address: Url,
    pub body: Option<String>,
    pub headers: HeaderMap,
}

#[derive(Debug, Default)]
struct Counters {
    created: AtomicUsize,
    released: AtomicUsize,
}

#[derive(Debug, Clone)]
pub struct FakeWebClientFactory {
    response: FakeResponse,
    fail_create: bool,
    counters: Arc<Counters>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeWebClientFactory {
    pub fn new(response: FakeResponse) -> Self {
        Self {
            response,
            fail_create: false,
            counters: Arc::new(Counters::default()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A factory whose `create` always fails.
    pub fn failing() -> Self {
        Self {
            fail_create: true,
            ..Self::new(FakeResponse::Pending)
        }
    }

    pub fn created(&self) -> usize {
        self.counters.created.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.counters.released.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

impl WebClientFactory for FakeWebClientFactory {
    fn create(&self) -> Result<Box<dyn WebClient>, TransportError> {
        if self.fail_create {
            return Err(TransportError::ClientBuild(
                "fake factory refuses to create clients".to_string(),
            ));
        }
        self.counters.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeWebClient {
            response: self.response.clone(),
            headers: HeaderMap::new(),
            counters: Arc::clone(&self.counters),
            requests: Arc::clone(&self.requests),
        }))
    }
}

#[derive(Debug)]
pub struct FakeWebClient {
    response: FakeResponse,
    headers: HeaderMap,
    counters: Arc<Counters>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeWebClient {
    fn respond(
        &self,
        method: &'static str,
        address: Url,
        body: Option<String>,
    ) -> BoxFuture<'_, Result<String, TransportError>> {
        self.requests.lock().push(RecordedRequest {
            method,
            address,
            body,
            headers: self.headers.clone(),
        });

        let response = self.response.clone();
        Box::pin(async move {
            match response {
                FakeResponse::Body(body) => Ok(body),
                FakeResponse::Status { status, body } => {
                    Err(TransportError::HttpStatus { status, body })
                }
                FakeResponse::Pending => futures::future::pending().await,
            }
        })
    }
}

impl WebClient for FakeWebClient {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn post(&self, address: Url, data: String) -> BoxFuture<'_, Result<String, TransportError>> {
        self.respond("POST", address, Some(data))
    }

    fn get(&self, address: Url) -> BoxFuture<'_, Result<String, TransportError>> {
        self.respond("GET", address, None)
    }
}

impl Drop for FakeWebClient {
    fn drop(&mut self) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}
