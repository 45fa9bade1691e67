use url::Url;
use uuid::Uuid;

const LOGS_PATH: &str = "api/logs";

/// Request URLs for one log on one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogUrls {
    logs: Url,
    log_id: String,
}

impl LogUrls {
    /// Resolves the logs endpoint against `base_url` the way a relative link
    /// is resolved: a base without a trailing slash loses its last segment.
    pub fn new(base_url: &Url, log_id: &Uuid) -> Result<Self, url::ParseError> {
        Ok(Self {
            logs: base_url.join(LOGS_PATH)?,
            log_id: log_id.to_string(),
        })
    }

    /// `api/logs?logId={logId}`
    pub fn submit(&self) -> Url {
        self.with_query(&[("logId", self.log_id.as_str())])
    }

    /// `api/logs?id={id}&logId={logId}`
    pub fn error(&self, id: &str) -> Url {
        self.with_query(&[("id", id), ("logId", self.log_id.as_str())])
    }

    /// `api/logs?logId={logId}&pageindex={n}&pagesize={m}`
    pub fn page(&self, page_index: usize, page_size: usize) -> Url {
        let page_index = page_index.to_string();
        let page_size = page_size.to_string();
        self.with_query(&[
            ("logId", self.log_id.as_str()),
            ("pageindex", page_index.as_str()),
            ("pagesize", page_size.as_str()),
        ])
    }

    fn with_query(&self, pairs: &[(&str, &str)]) -> Url {
        let mut url = self.logs.clone();
        url.query_pairs_mut().clear().extend_pairs(pairs);
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG_ID: &str = "98895825-2516-43de-b514-ffb39ea89a65";

    fn urls(base: &str) -> LogUrls {
        LogUrls::new(&Url::parse(base).unwrap(), &Uuid::parse_str(LOG_ID).unwrap()).unwrap()
    }

    #[test]
    fn test_submit_url() {
        assert_eq!(
            urls("http://elmahio.azurewebsites.net/").submit().as_str(),
            format!("http://elmahio.azurewebsites.net/api/logs?logId={LOG_ID}")
        );
    }

    #[test]
    fn test_error_url_orders_id_first_and_encodes_it() {
        assert_eq!(
            urls("https://logs.example.com/").error("a b&c").as_str(),
            format!("https://logs.example.com/api/logs?id=a+b%26c&logId={LOG_ID}")
        );
    }

    #[test]
    fn test_page_url() {
        assert_eq!(
            urls("https://logs.example.com/").page(2, 10).as_str(),
            format!("https://logs.example.com/api/logs?logId={LOG_ID}&pageindex=2&pagesize=10")
        );
    }

    #[test]
    fn test_relative_resolution_against_base_path() {
        assert_eq!(
            urls("https://example.com/elmah/").submit().path(),
            "/elmah/api/logs"
        );
        assert_eq!(
            urls("https://example.com/elmah").submit().path(),
            "/api/logs"
        );
    }
}
