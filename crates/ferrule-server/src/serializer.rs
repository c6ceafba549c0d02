//! Result serialization.
//!
//! | Result | Content-Type | Status | Body |
//! |--------|--------------|--------|------|
//! | `Json` | `application/json` | given | ASCII-safe JSON |
//! | `Text` | `text/plain; charset=utf-8` | given | UTF-8 text |
//! | `Redirect` | none | 302 | empty, `Location` set |
//!
//! Every response carries a `Server` header.

use crate::response::WireResponse;
use ferrule_core::{ActionError, ActionResult};
use http::header::{HeaderValue, CONTENT_TYPE, LOCATION, SERVER};
use http::StatusCode;
use serde::Serialize;
use std::io;

/// Default value of the `Server` header.
pub const DEFAULT_SERVER_NAME: &str = "Ferrule";

const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Writes compact JSON with every non-ASCII character as a `\uXXXX` escape.
///
/// Characters outside the Basic Multilingual Plane become surrogate pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiFormatter;

impl serde_json::ser::Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..index])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                writer.write_all(format!("\\u{unit:04x}").as_bytes())?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

/// Serializes a value to ASCII-safe JSON text.
pub fn to_ascii_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::with_capacity(128);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, AsciiFormatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

/// Turns an [`ActionResult`] into a [`WireResponse`].
#[derive(Debug, Clone)]
pub struct ResultSerializer {
    server_name: HeaderValue,
}

impl Default for ResultSerializer {
    fn default() -> Self {
        Self {
            server_name: HeaderValue::from_static(DEFAULT_SERVER_NAME),
        }
    }
}

impl ResultSerializer {
    /// Creates a serializer that sends `server_name` in the `Server` header.
    #[must_use]
    pub const fn new(server_name: HeaderValue) -> Self {
        Self { server_name }
    }

    /// Returns the `Server` header value.
    #[must_use]
    pub const fn server_name(&self) -> &HeaderValue {
        &self.server_name
    }

    /// Serializes a result with the given status.
    ///
    /// Redirects always use 302. Fails only when the JSON cannot be written
    /// or the redirect target is not a valid header value.
    pub fn serialize(
        &self,
        status: StatusCode,
        result: &ActionResult,
    ) -> Result<WireResponse, ActionError> {
        match result {
            ActionResult::Json(value) => {
                let body = to_ascii_json(value)?;
                Ok(self.respond(status, JSON_CONTENT_TYPE, body))
            }
            ActionResult::Text(text) => Ok(self.text(status, text.clone())),
            ActionResult::Redirect(location) => {
                let location = HeaderValue::from_str(location).map_err(|err| {
                    ActionError::unhandled(anyhow::anyhow!(
                        "redirect target '{location}' is not a valid header value: {err}"
                    ))
                })?;
                let mut response = self.base(StatusCode::FOUND);
                response.headers_mut().insert(LOCATION, location);
                Ok(response)
            }
        }
    }

    /// Builds a plain-text response. Cannot fail.
    #[must_use]
    pub fn text(&self, status: StatusCode, body: impl Into<String>) -> WireResponse {
        let body: String = body.into();
        self.respond(status, TEXT_CONTENT_TYPE, body)
    }

    fn respond(
        &self,
        status: StatusCode,
        content_type: &'static str,
        body: impl Into<bytes::Bytes>,
    ) -> WireResponse {
        let mut response = self.base(status).with_body(body);
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        response
    }

    fn base(&self, status: StatusCode) -> WireResponse {
        let mut response = WireResponse::new(status);
        response
            .headers_mut()
            .insert(SERVER, self.server_name.clone());
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn serializer() -> ResultSerializer {
        ResultSerializer::default()
    }

    #[test]
    fn test_json_response() {
        let response = serializer()
            .serialize(StatusCode::OK, &ActionResult::Json(json!({"id": 7})))
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("server"), Some("Ferrule"));
        assert_eq!(response.text(), r#"{"id":7}"#);
    }

    #[test]
    fn test_json_escapes_non_ascii() {
        let response = serializer()
            .serialize(
                StatusCode::OK,
                &ActionResult::Json(json!({"name": "Zoë", "emoji": "😀", "ключ": 1})),
            )
            .unwrap();

        let text = response.text();
        assert!(text.is_ascii());
        assert!(text.contains(r#""Zo\u00eb""#));
        assert!(text.contains(r#""\ud83d\ude00""#));
        assert!(text.contains(r#""\u043a\u043b\u044e\u0447":1"#));
    }

    #[test]
    fn test_json_keeps_standard_escapes() {
        let body = to_ascii_json(&json!("tab\there \"quoted\"")).unwrap();
        assert_eq!(body, br#""tab\there \"quoted\"""#);
    }

    #[test]
    fn test_text_response() {
        let response = serializer()
            .serialize(StatusCode::CONFLICT, &ActionResult::text("héllo"))
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            response.header("content-type"),
            Some("text/plain; charset=utf-8")
        );
        assert_eq!(response.body().as_ref(), "héllo".as_bytes());
    }

    #[test]
    fn test_redirect_forces_302() {
        let response = serializer()
            .serialize(StatusCode::OK, &ActionResult::redirect("/login?next=%2F"))
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.header("location"), Some("/login?next=%2F"));
        assert_eq!(response.header("content-type"), None);
        assert!(response.body().is_empty());
        assert_eq!(response.header("server"), Some("Ferrule"));
    }

    #[test]
    fn test_invalid_redirect_is_an_internal_fault() {
        let err = serializer()
            .serialize(StatusCode::OK, &ActionResult::redirect("/next\r\nx: y"))
            .unwrap_err();
        assert!(matches!(err, ActionError::Unhandled(_)));
    }

    #[test]
    fn test_custom_server_name() {
        let serializer = ResultSerializer::new(HeaderValue::from_static("Users/1.0"));
        let response = serializer.text(StatusCode::OK, "ok");
        assert_eq!(response.header("server"), Some("Users/1.0"));
    }

    proptest! {
        #[test]
        fn ascii_json_round_trips(text in "\\PC*") {
            let body = to_ascii_json(&text).unwrap();
            prop_assert!(body.is_ascii());
            let back: String = serde_json::from_slice(&body).unwrap();
            prop_assert_eq!(back, text);
        }
    }
}
