//! The `<error>` XML document understood by the elmah.io backend.
//!
//! ```xml
//! <error application="shop" host="web01" type="System.Exception"
//!        message="boom" time="2024-03-01T10:00:00Z" statusCode="500">
//!   <serverVariables>
//!     <item name="HTTP_HOST"><value string="example.com" /></item>
//!   </serverVariables>
//! </error>
//! ```

use super::{CodecError, ErrorCodec};
use crate::domain::{ErrorRecord, NameValues};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};
use std::borrow::Cow;

const ROOT: &str = "error";
const ITEM: &str = "item";
const VALUE: &str = "value";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    ServerVariables,
    QueryString,
    Form,
    Cookies,
}

impl Collection {
    const ALL: [Collection; 4] = [
        Collection::ServerVariables,
        Collection::QueryString,
        Collection::Form,
        Collection::Cookies,
    ];

    fn tag(self) -> &'static str {
        match self {
            Collection::ServerVariables => "serverVariables",
            Collection::QueryString => "queryString",
            Collection::Form => "form",
            Collection::Cookies => "cookies",
        }
    }

    fn from_tag(tag: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.tag().as_bytes() == tag)
    }

    fn of(self, record: &ErrorRecord) -> &NameValues {
        match self {
            Collection::ServerVariables => &record.server_variables,
            Collection::QueryString => &record.query_string,
            Collection::Form => &record.form,
            Collection::Cookies => &record.cookies,
        }
    }

    fn of_mut(self, record: &mut ErrorRecord) -> &mut NameValues {
        match self {
            Collection::ServerVariables => &mut record.server_variables,
            Collection::QueryString => &mut record.query_string,
            Collection::Form => &mut record.form,
            Collection::Cookies => &mut record.cookies,
        }
    }
}

/// Codec for the host framework's error XML format.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlErrorCodec;

impl XmlErrorCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ErrorCodec for XmlErrorCodec {
    fn encode(&self, error: &ErrorRecord) -> Result<String, CodecError> {
        let mut writer = Writer::new(Vec::with_capacity(512));

        let mut root = BytesStart::new(ROOT);
        let status_code = error.status_code.to_string();
        let time = error
            .time
            .map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            .unwrap_or_default();
        let attributes = [
            ("application", error.application_name.as_str()),
            ("host", error.host_name.as_str()),
            ("type", error.type_name.as_str()),
            ("message", error.message.as_str()),
            ("source", error.source.as_str()),
            ("detail", error.detail.as_str()),
            ("user", error.user.as_str()),
            ("time", time.as_str()),
            (
                "statusCode",
                if error.status_code != 0 {
                    status_code.as_str()
                } else {
                    ""
                },
            ),
            ("webHostHtmlMessage", error.web_host_html_message.as_str()),
        ];
        for (key, value) in attributes {
            if !value.is_empty() {
                root.push_attribute(attribute(key, value));
            }
        }

        let collections: Vec<Collection> = Collection::ALL
            .into_iter()
            .filter(|c| !c.of(error).is_empty())
            .collect();

        if collections.is_empty() {
            write(&mut writer, Event::Empty(root))?;
        } else {
            write(&mut writer, Event::Start(root))?;
            for collection in collections {
                write_collection(&mut writer, collection.tag(), collection.of(error))?;
            }
            write(&mut writer, Event::End(BytesEnd::new(ROOT)))?;
        }

        Ok(String::from_utf8(writer.into_inner())?)
    }

    fn decode(&self, encoded: &str) -> Result<ErrorRecord, CodecError> {
        let mut reader = Reader::from_str(encoded);
        let mut decoder = Decoder::default();

        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(element) => decoder.open(&element, false)?,
                Event::Empty(element) => decoder.open(&element, true)?,
                Event::End(element) => decoder.close(element.name().as_ref()),
                Event::Eof => break,
                _ => {}
            }
            if decoder.finished {
                break;
            }
        }

        decoder.finish()
    }
}

#[derive(Default)]
struct Decoder {
    record: Option<ErrorRecord>,
    collection: Option<Collection>,
    item_name: Option<String>,
    finished: bool,
}

impl Decoder {
    fn open(&mut self, element: &BytesStart<'_>, empty: bool) -> Result<(), CodecError> {
        let name = element.name();
        let Some(record) = self.record.as_mut() else {
            if name.as_ref() != ROOT.as_bytes() {
                return Err(CodecError::MissingRoot);
            }
            let mut record = ErrorRecord::default();
            read_error_attributes(element, &mut record)?;
            self.record = Some(record);
            self.finished = empty;
            return Ok(());
        };

        if let Some(collection) = Collection::from_tag(name.as_ref()) {
            if !empty {
                self.collection = Some(collection);
            }
        } else if name.as_ref() == ITEM.as_bytes() {
            if self.collection.is_some() {
                self.item_name = find_attribute(element, "name")?;
            }
        } else if name.as_ref() == VALUE.as_bytes() {
            if let (Some(collection), Some(item_name)) = (self.collection, self.item_name.as_ref())
            {
                let value = find_attribute(element, "string")?.unwrap_or_default();
                collection
                    .of_mut(record)
                    .push((item_name.clone(), value));
            }
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        if name == ROOT.as_bytes() {
            self.finished = self.record.is_some();
        } else if name == ITEM.as_bytes() {
            self.item_name = None;
        } else if Collection::from_tag(name).is_some() {
            self.collection = None;
        }
    }

    fn finish(self) -> Result<ErrorRecord, CodecError> {
        match (self.record, self.finished) {
            (Some(record), true) => Ok(record),
            (Some(_), false) => Err(CodecError::Xml(
                "unexpected end of document inside <error>".to_string(),
            )),
            (None, _) => Err(CodecError::MissingRoot),
        }
    }
}

fn read_error_attributes(
    element: &BytesStart<'_>,
    record: &mut ErrorRecord,
) -> Result<(), CodecError> {
    for attr in element.attributes() {
        let attr = attr.map_err(xml_error)?;
        let value = attr.unescape_value().map_err(xml_error)?.into_owned();
        match attr.key.as_ref() {
            b"application" => record.application_name = value,
            b"host" => record.host_name = value,
            b"type" => record.type_name = value,
            b"message" => record.message = value,
            b"source" => record.source = value,
            b"detail" => record.detail = value,
            b"user" => record.user = value,
            b"time" => record.time = Some(parse_time(&value)?),
            b"statusCode" => {
                record.status_code = value
                    .trim()
                    .parse()
                    .map_err(|_| CodecError::Xml(format!("invalid statusCode '{value}'")))?;
            }
            b"webHostHtmlMessage" => record.web_host_html_message = value,
            _ => {}
        }
    }
    Ok(())
}

fn find_attribute(element: &BytesStart<'_>, key: &str) -> Result<Option<String>, CodecError> {
    for attr in element.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.as_ref() == key.as_bytes() {
            return Ok(Some(attr.unescape_value().map_err(xml_error)?.into_owned()));
        }
    }
    Ok(None)
}

fn parse_time(value: &str) -> Result<DateTime<Utc>, CodecError> {
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Ok(time.with_timezone(&Utc));
    }
    // Round-trip times without an offset are taken as UTC.
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| CodecError::InvalidTime(value.to_string()))
}

fn write_collection(
    writer: &mut Writer<Vec<u8>>,
    tag: &str,
    pairs: &NameValues,
) -> Result<(), CodecError> {
    write(writer, Event::Start(BytesStart::new(tag)))?;
    for (name, value) in pairs {
        let mut item = BytesStart::new(ITEM);
        item.push_attribute(attribute("name", name));
        write(writer, Event::Start(item))?;

        let mut value_element = BytesStart::new(VALUE);
        value_element.push_attribute(attribute("string", value));
        write(writer, Event::Empty(value_element))?;

        write(writer, Event::End(BytesEnd::new(ITEM)))?;
    }
    write(writer, Event::End(BytesEnd::new(tag)))
}

/// Attribute with line breaks and tabs written as character references, so
/// readers that normalise attribute whitespace keep them.
fn attribute<'a>(key: &'a str, value: &str) -> Attribute<'a> {
    let escaped = quick_xml::escape::escape(value)
        .replace('\n', "&#xA;")
        .replace('\r', "&#xD;")
        .replace('\t', "&#x9;");
    Attribute {
        key: QName(key.as_bytes()),
        value: Cow::Owned(escaped.into_bytes()),
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), CodecError> {
    writer.write_event(event).map_err(xml_error)
}

fn xml_error(error: impl std::fmt::Display) -> CodecError {
    CodecError::Xml(error.to_string())
}
