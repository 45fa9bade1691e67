//! Error log backed by the elmah.io HTTP API.
//!
//! Each operation makes exactly one round trip through a fresh web client
//! (see [`crate::sender::transact`]). The adapter itself only holds validated
//! configuration, so one instance can serve any number of concurrent calls.

mod blocking;
pub mod urls;

use crate::app::config::{ConfigError, ErrorLogConfig};
use crate::codec::{ErrorCodec, XmlErrorCodec};
use crate::domain::{DecodingError, ErrorLogEntry, ErrorLogError, ErrorRecord};
use crate::sender::{
    ErrorPayload, FORM_CONTENT_TYPE, HttpWebClientFactory, TransportError, WebClient,
    WebClientFactory, form_body, transact_until_cancelled,
};
use futures::future::BoxFuture;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use urls::LogUrls;

pub struct ErrorLog {
    config: ErrorLogConfig,
    urls: LogUrls,
    factory: Arc<dyn WebClientFactory>,
    codec: Arc<dyn ErrorCodec>,
    cancel: CancellationToken,
}

impl ErrorLog {
    /// Validates `settings` and builds an error log that talks HTTP.
    pub fn new<V>(settings: Option<&HashMap<String, V>>) -> Result<Self, ConfigError>
    where
        V: AsRef<str>,
    {
        Self::with_factory(settings, Arc::new(HttpWebClientFactory::default()))
    }

    /// Validates `settings` and builds an error log whose web clients come
    /// from `factory`.
    pub fn with_factory<V>(
        settings: Option<&HashMap<String, V>>,
        factory: Arc<dyn WebClientFactory>,
    ) -> Result<Self, ConfigError>
    where
        V: AsRef<str>,
    {
        Self::from_config(ErrorLogConfig::from_map(settings)?, factory)
    }

    pub fn from_config(
        config: ErrorLogConfig,
        factory: Arc<dyn WebClientFactory>,
    ) -> Result<Self, ConfigError> {
        let urls = LogUrls::new(config.base_url(), config.log_id())
            .map_err(|_| ConfigError::InvalidUrl(config.base_url().to_string()))?;

        debug!(
            "Error log {} configured against {}",
            config.log_id(),
            config.base_url()
        );

        Ok(Self {
            config,
            urls,
            factory,
            codec: Arc::new(XmlErrorCodec::new()),
            cancel: CancellationToken::new(),
        })
    }

    /// Replaces the XML codec.
    pub fn with_codec(mut self, codec: Arc<dyn ErrorCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn config(&self) -> &ErrorLogConfig {
        &self.config
    }

    /// Token that aborts every in-flight and future call of this error log
    /// with [`ErrorLogError::Cancelled`] once cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Submits `error` and resolves to the id the backend assigned to it.
    pub async fn log(&self, error: &ErrorRecord) -> Result<String, ErrorLogError> {
        let encoded = match self.config.application_name() {
            Some(name) if error.application_name.is_empty() => {
                let stamped = error.clone().with_application_name(name);
                self.codec.encode(&stamped)
            }
            _ => self.codec.encode(error),
        }
        .map_err(ErrorLogError::Encoding)?;

        let address = self.urls.submit();
        let body = form_body(&encoded);

        let id = self
            .transact(
                move |client| {
                    client
                        .headers_mut()
                        .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
                    client.post(address, body)
                },
                |_, response| Ok(response),
            )
            .await?;

        info!("Logged error as {}", id);
        Ok(id)
    }

    /// Fetches one logged error by the id the backend assigned to it.
    pub async fn get_error(&self, id: &str) -> Result<ErrorLogEntry, ErrorLogError> {
        if id.is_empty() {
            return Err(ErrorLogError::InvalidArgument(
                "error id must not be empty".to_string(),
            ));
        }

        let address = self.urls.error(id);
        self.transact(
            move |client| client.get(address),
            |_, response| {
                let payload = ErrorPayload::parse_one(&response)?;
                self.to_entry(payload)
            },
        )
        .await
    }

    /// Fetches page `page_index` (zero-based) of `page_size` errors and
    /// appends them to `entries` in the order the backend returned them.
    ///
    /// Resolves to the length of `entries` afterwards. If any error on the
    /// page fails to decode the whole call fails and `entries` is left as it
    /// was.
    pub async fn get_errors(
        &self,
        page_index: usize,
        page_size: usize,
        entries: &mut Vec<ErrorLogEntry>,
    ) -> Result<usize, ErrorLogError> {
        if page_size == 0 {
            return Err(ErrorLogError::InvalidArgument(
                "page size must be positive".to_string(),
            ));
        }

        let address = self.urls.page(page_index, page_size);
        self.transact(
            move |client| client.get(address),
            |_, response| {
                let page = ErrorPayload::parse_page(&response)?
                    .into_iter()
                    .map(|payload| self.to_entry(payload))
                    .collect::<Result<Vec<_>, _>>()?;

                debug!("Fetched {} errors from page {}", page.len(), page_index);
                entries.extend(page);
                Ok(entries.len())
            },
        )
        .await
    }

    async fn transact<T, R, Op, Sel>(
        &self,
        operation: Op,
        selector: Sel,
    ) -> Result<R, ErrorLogError>
    where
        Op: for<'c> FnOnce(&'c mut dyn WebClient) -> BoxFuture<'c, Result<T, TransportError>>,
        Sel: FnOnce(&dyn WebClient, T) -> Result<R, ErrorLogError>,
    {
        transact_until_cancelled(self.factory.as_ref(), &self.cancel, operation, selector).await
    }

    fn to_entry(&self, payload: ErrorPayload) -> Result<ErrorLogEntry, ErrorLogError> {
        let error = self
            .codec
            .decode(&payload.error_xml)
            .map_err(DecodingError::from)?;
        Ok(ErrorLogEntry::new(payload.id, error))
    }
}

impl std::fmt::Debug for ErrorLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorLog")
            .field("config", &self.config)
            .field("urls", &self.urls)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
