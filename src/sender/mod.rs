pub mod client;
pub mod payload;
pub mod transact;

pub use client::{
    ClientConfig, HttpWebClient, HttpWebClientFactory, TransportError, WebClient, WebClientFactory,
};
pub use payload::{ErrorPayload, FORM_CONTENT_TYPE, form_body};
pub use transact::{transact, transact_until_cancelled, transact_with};
