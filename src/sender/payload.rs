use crate::domain::DecodingError;
use serde::Deserialize;
use url::form_urlencoded;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A stored error as the backend returns it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorPayload {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "ErrorXml")]
    pub error_xml: String,
}

impl ErrorPayload {
    pub fn parse_one(body: &str) -> Result<Self, DecodingError> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn parse_page(body: &str) -> Result<Vec<Self>, DecodingError> {
        Ok(serde_json::from_str(body)?)
    }
}

/// Request body for a submitted error: a single unnamed form field, `=`
/// followed by the form-encoded document.
pub fn form_body(encoded_error: &str) -> String {
    let mut body = String::with_capacity(encoded_error.len() + 16);
    body.push('=');
    body.extend(form_urlencoded::byte_serialize(encoded_error.as_bytes()));
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_body_encodes_markup() {
        let body = form_body(r#"<error message="a b&c"/>"#);

        assert_eq!(body, "=%3Cerror+message%3D%22a+b%26c%22%2F%3E");
    }

    #[test]
    fn test_form_body_of_empty_document() {
        assert_eq!(form_body(""), "=");
    }

    #[test]
    fn test_parse_one_reads_both_fields() {
        let payload = ErrorPayload::parse_one(r#"{"Id":"42","ErrorXml":"<error/>","Extra":1}"#)
            .unwrap();

        assert_eq!(payload.id, "42");
        assert_eq!(payload.error_xml, "<error/>");
    }

    #[test]
    fn test_parse_one_rejects_missing_field() {
        let result = ErrorPayload::parse_one(r#"{"Id":"42"}"#);
        assert!(matches!(result, Err(DecodingError::Json(_))));

        let result = ErrorPayload::parse_one(r#"{"Id":"42","ErrorXml":null}"#);
        assert!(matches!(result, Err(DecodingError::Json(_))));
    }

    #[test]
    fn test_parse_page_preserves_order() {
        let page = ErrorPayload::parse_page(
            r#"[{"Id":"3","ErrorXml":"<error/>"},{"Id":"1","ErrorXml":"<error/>"}]"#,
        )
        .unwrap();

        let ids: Vec<&str> = page.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["3", "1"]);
    }

    #[test]
    fn test_parse_page_rejects_object() {
        let result = ErrorPayload::parse_page(r#"{"Id":"42","ErrorXml":"<error/>"}"#);
        assert!(matches!(result, Err(DecodingError::Json(_))));
    }
}
