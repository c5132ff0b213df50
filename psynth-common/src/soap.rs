//! SOAP envelope boundary utilities
//!
//! The legacy protocol wraps every response in a fixed SOAP 1.1 envelope and
//! carries request fields as plain XML tags. Requests are not parsed as full
//! XML documents; fields are pulled out by tag text search, which is all the
//! legacy clients require.

use crate::{Error, Result};

/// Wrap a response body in the fixed SOAP 1.1 envelope
pub fn envelope(soap_body: &str) -> String {
    let mut body = String::with_capacity(soap_body.len() + 256);
    body.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    body.push_str(r#"<soap:Envelope xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#);
    body.push_str("<soap:Body>");
    body.push_str(soap_body);
    body.push_str("</soap:Body>");
    body.push_str("</soap:Envelope>");
    body
}

/// Extract the text between `<tag>` and `</tag>`, if present
pub fn extract_tag<'a>(body: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(&body[start..end])
}

/// Decode XML entities in an extracted field value
///
/// Embedded documents (the commit manifest) arrive entity-escaped inside
/// their carrier tag and must be decoded before they can be parsed.
pub fn unescape(text: &str) -> Result<String> {
    quick_xml::escape::unescape(text)
        .map(|cow| cow.into_owned())
        .map_err(|e| Error::InvalidInput(format!("Malformed XML entities: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_wraps_body() {
        let wrapped = envelope("<PingResponse/>");
        assert!(wrapped.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(wrapped.contains("<soap:Body><PingResponse/></soap:Body>"));
        assert!(wrapped.ends_with("</soap:Envelope>"));
    }

    #[test]
    fn extract_tag_finds_value() {
        let body = "<CreateSynth><Name>My Trip</Name></CreateSynth>";
        assert_eq!(extract_tag(body, "Name"), Some("My Trip"));
    }

    #[test]
    fn extract_tag_missing_returns_none() {
        assert_eq!(extract_tag("<CreateSynth/>", "Name"), None);
        // Opening tag without a close is not a value
        assert_eq!(extract_tag("<a><Name>x", "Name"), None);
    }

    #[test]
    fn unescape_decodes_entities() {
        let decoded = unescape("&lt;manifest&gt;&amp;&lt;/manifest&gt;").unwrap();
        assert_eq!(decoded, "<manifest>&</manifest>");
    }
}
