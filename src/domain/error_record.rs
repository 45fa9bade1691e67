use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Ordered name/value pairs. Names may repeat, as in an HTTP query string.
pub type NameValues = Vec<(String, String)>;

/// An error as captured by the host application.
///
/// Field set follows the host framework's error model. Empty strings mean
/// "not captured"; the XML codec omits them on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub application_name: String,
    pub host_name: String,
    pub type_name: String,
    pub source: String,
    pub message: String,
    pub detail: String,
    pub user: String,
    pub time: Option<DateTime<Utc>>,
    pub status_code: i32,
    pub web_host_html_message: String,
    pub server_variables: NameValues,
    pub query_string: NameValues,
    pub form: NameValues,
    pub cookies: NameValues,
}

impl ErrorRecord {
    /// A fresh record stamped with the local host name and the current time.
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            host_name: local_host_name(),
            type_name: type_name.into(),
            message: message.into(),
            time: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// Captures a Rust error: its type, its message and the `source()` chain
    /// as detail.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let mut record = Self::new(std::any::type_name::<E>(), error.to_string());
        record.detail = error_chain(error);
        record
    }

    pub fn with_application_name(mut self, application_name: impl Into<String>) -> Self {
        self.application_name = application_name.into();
        self
    }

    pub fn with_status_code(mut self, status_code: i32) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_server_variable(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.server_variables.push((name.into(), value.into()));
        self
    }
}

fn local_host_name() -> String {
    hostname::get()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn error_chain<E>(error: &E) -> String
where
    E: std::error::Error + ?Sized,
{
    let mut detail = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(detail, "\n  caused by: {cause}");
        source = cause.source();
    }
    detail
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("outer failure")]
    struct Outer {
        #[source]
        inner: std::io::Error,
    }

    #[test]
    fn test_from_error_captures_source_chain() {
        let error = Outer {
            inner: std::io::Error::other("disk full"),
        };

        let record = ErrorRecord::from_error(&error);

        assert!(record.type_name.ends_with("Outer"));
        assert_eq!(record.message, "outer failure");
        assert_eq!(record.detail, "outer failure\n  caused by: disk full");
        assert!(record.time.is_some());
    }

    #[test]
    fn test_builders_fill_fields() {
        let record = ErrorRecord::new("System.Exception", "boom")
            .with_application_name("shop")
            .with_status_code(500)
            .with_user("alice")
            .with_server_variable("HTTP_HOST", "example.com");

        assert_eq!(record.application_name, "shop");
        assert_eq!(record.status_code, 500);
        assert_eq!(record.user, "alice");
        assert_eq!(
            record.server_variables,
            vec![("HTTP_HOST".to_string(), "example.com".to_string())]
        );
    }
}
