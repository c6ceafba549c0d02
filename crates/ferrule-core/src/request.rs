//! Transport-neutral request representation.
//!
//! The transport materializes the body before dispatch, so binding never
//! touches a socket. Query values stay URL-encoded until a parameter is bound.

use crate::charset::Charset;
use bytes::Bytes;
use http::header::{HeaderValue, IntoHeaderName, CONTENT_TYPE};
use http::{HeaderMap, Method};

/// Ordered key/value pairs. Keys may repeat.
pub type KeyValues = Vec<(String, String)>;

/// Splits a raw query string into key/value pairs without decoding them.
///
/// A leading `?` is ignored, empty segments are skipped and a segment without
/// `=` yields an empty value.
///
/// ```
/// use ferrule_core::parse_query;
///
/// let pairs = parse_query("?id=5&name=Ada%20L&flag");
/// assert_eq!(pairs[1], ("name".to_string(), "Ada%20L".to_string()));
/// assert_eq!(pairs[2], ("flag".to_string(), String::new()));
/// ```
#[must_use]
pub fn parse_query(raw: &str) -> KeyValues {
    raw.trim_start_matches('?')
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (segment.to_string(), String::new()),
        })
        .collect()
}

/// One uploaded file from a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    name: String,
    file_name: Option<String>,
    content_type: String,
    charset: Charset,
    data: Bytes,
}

impl FilePart {
    /// Creates a file part with `application/octet-stream` content.
    #[must_use]
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            file_name: None,
            content_type: "application/octet-stream".to_string(),
            charset: Charset::Utf8,
            data: data.into(),
        }
    }

    /// Sets the client-supplied file name.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Sets the part content type. The charset follows its `charset` parameter.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self.charset = Charset::from_content_type(&self.content_type);
        self
    }

    /// Returns the form field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the client-supplied file name.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Returns the part content type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Returns the charset used to decode the part as text.
    #[must_use]
    pub const fn charset(&self) -> Charset {
        self.charset
    }

    /// Returns the raw bytes.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Decodes the part with its charset.
    #[must_use]
    pub fn text(&self) -> String {
        self.charset.decode(&self.data)
    }

    /// Returns `true` when the part declares JSON content.
    #[must_use]
    pub fn is_json(&self) -> bool {
        starts_with_ignore_case(&self.content_type, "application/json")
    }
}

/// The parsed parts of a `multipart/form-data` body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartBody {
    fields: KeyValues,
    files: Vec<FilePart>,
}

impl MultipartBody {
    /// Creates an empty multipart body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_field(name, value);
        self
    }

    /// Adds a file part.
    #[must_use]
    pub fn with_file(mut self, file: FilePart) -> Self {
        self.push_file(file);
        self
    }

    /// Appends a text field.
    pub fn push_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Appends a file part.
    pub fn push_file(&mut self, file: FilePart) {
        self.files.push(file);
    }

    /// Returns the text fields in arrival order.
    #[must_use]
    pub fn fields(&self) -> &KeyValues {
        &self.fields
    }

    /// Returns the file parts in arrival order.
    #[must_use]
    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    /// Returns `true` when there are neither fields nor files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }
}

/// A request body as handed over by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    /// No body was sent.
    #[default]
    Absent,
    /// Unparsed bytes.
    Raw(Bytes),
    /// `application/x-www-form-urlencoded` pairs, still URL-encoded.
    Form(KeyValues),
    /// Parsed `multipart/form-data`.
    Multipart(MultipartBody),
}

impl RequestBody {
    /// Returns `true` when no body was sent.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns `true` when the body carries nothing to bind.
    ///
    /// That is an absent body, zero raw bytes, no form pairs, or a multipart
    /// body with neither fields nor files.
    #[must_use]
    pub fn is_structurally_empty(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Raw(bytes) => bytes.is_empty(),
            Self::Form(pairs) => pairs.is_empty(),
            Self::Multipart(multipart) => multipart.is_empty(),
        }
    }

    /// Returns the raw bytes, if the body is unparsed.
    #[must_use]
    pub const fn raw(&self) -> Option<&Bytes> {
        match self {
            Self::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the form pairs, if the body is url-encoded.
    #[must_use]
    pub const fn form(&self) -> Option<&KeyValues> {
        match self {
            Self::Form(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Returns the multipart body, if any.
    #[must_use]
    pub const fn multipart(&self) -> Option<&MultipartBody> {
        match self {
            Self::Multipart(multipart) => Some(multipart),
            _ => None,
        }
    }
}

/// A request ready for dispatch.
///
/// # Example
///
/// ```
/// use ferrule_core::{IncomingRequest, RequestBody};
/// use http::Method;
///
/// let request = IncomingRequest::new(Method::GET, "/users")
///     .with_query_string("id=42");
/// assert_eq!(request.path(), "/users");
/// assert_eq!(request.query().len(), 1);
/// assert_eq!(request.body(), &RequestBody::Absent);
/// ```
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    query: KeyValues,
    body: RequestBody,
}

impl IncomingRequest {
    /// Creates a request with no headers, query or body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            query: KeyValues::new(),
            body: RequestBody::Absent,
        }
    }

    /// Replaces the header map.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Appends a header.
    #[must_use]
    pub fn with_header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Replaces the query pairs.
    #[must_use]
    pub fn with_query(mut self, query: KeyValues) -> Self {
        self.query = query;
        self
    }

    /// Parses and replaces the query pairs from a raw query string.
    #[must_use]
    pub fn with_query_string(mut self, raw: &str) -> Self {
        self.query = parse_query(raw);
        self
    }

    /// Replaces the body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the raw query pairs.
    #[must_use]
    pub fn query(&self) -> &KeyValues {
        &self.query
    }

    /// Returns the body.
    #[must_use]
    pub const fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Returns the `Content-Type` header, if present and valid UTF-8.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// Returns the body charset, taken from the content type.
    #[must_use]
    pub fn charset(&self) -> Charset {
        self.content_type()
            .map(Charset::from_content_type)
            .unwrap_or_default()
    }
}

/// ASCII case-insensitive prefix test, used for media type matching.
#[must_use]
pub fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value.len() >= prefix.len()
        && value.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
