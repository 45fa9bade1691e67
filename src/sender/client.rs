use futures::future::BoxFuture;
use reqwest::header::HeaderMap;
use reqwest::{Client, ClientBuilder, RequestBuilder};
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
    #[error("Request timeout: {0}")]
    Timeout(String),
    #[error("HTTP error: {status} - {body}")]
    HttpStatus { status: u16, body: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// One HTTP session against the backend.
///
/// A web client is short-lived: it is created for a single request, carries
/// its own header state and is released by dropping it.
pub trait WebClient: Send + Sync {
    fn headers(&self) -> &HeaderMap;

    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// POSTs `data` as the request body and resolves to the response body.
    fn post(&self, address: Url, data: String) -> BoxFuture<'_, Result<String, TransportError>>;

    /// GETs `address` and resolves to the response body.
    fn get(&self, address: Url) -> BoxFuture<'_, Result<String, TransportError>>;
}

/// Creates web clients on demand.
pub trait WebClientFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn WebClient>, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connection_timeout: Duration,
    pub user_agent: String,
    pub enable_compression: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            user_agent: format!("elmah-io/{}", env!("CARGO_PKG_VERSION")),
            enable_compression: true,
        }
    }
}

/// Factory for reqwest-backed web clients.
#[derive(Debug, Clone, Default)]
pub struct HttpWebClientFactory {
    config: ClientConfig,
}

impl HttpWebClientFactory {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl WebClientFactory for HttpWebClientFactory {
    fn create(&self) -> Result<Box<dyn WebClient>, TransportError> {
        let mut client_builder = ClientBuilder::new()
            .timeout(self.config.timeout)
            .connect_timeout(self.config.connection_timeout)
            .user_agent(&self.config.user_agent);

        if self.config.enable_compression {
            client_builder = client_builder.gzip(true);
        }

        let client = client_builder
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        debug!("Created HTTP web client");

        Ok(Box::new(HttpWebClient {
            client,
            headers: HeaderMap::new(),
            timeout: self.config.timeout,
        }))
    }
}

#[derive(Debug)]
pub struct HttpWebClient {
    client: Client,
    headers: HeaderMap,
    timeout: Duration,
}

impl HttpWebClient {
    async fn execute(&self, request: RequestBuilder) -> Result<String, TransportError> {
        let response = timeout(self.timeout, request.headers(self.headers.clone()).send())
            .await
            .map_err(|_| {
                TransportError::Timeout(format!("no response within {:?}", self.timeout))
            })?
            .map_err(classify)?;

        let status = response.status();
        let body = response.text().await.map_err(classify)?;

        if status.is_success() {
            Ok(body)
        } else {
            warn!("Backend answered HTTP {}", status);
            Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Timeouts keep their own variant whether they hit while sending or while
/// reading the body.
fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else {
        TransportError::Network(error)
    }
}

impl WebClient for HttpWebClient {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn post(&self, address: Url, data: String) -> BoxFuture<'_, Result<String, TransportError>> {
        Box::pin(async move {
            debug!("POST {} ({} bytes)", address, data.len());
            self.execute(self.client.post(address).body(data)).await
        })
    }

    fn get(&self, address: Url) -> BoxFuture<'_, Result<String, TransportError>> {
        Box::pin(async move {
            debug!("GET {}", address);
            self.execute(self.client.get(address)).await
        })
    }
}

impl Drop for HttpWebClient {
    fn drop(&mut self) {
        debug!("Released HTTP web client");
    }
}
