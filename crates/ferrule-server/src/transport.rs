//! Conversion from hyper requests to [`IncomingRequest`]s.
//!
//! The body is read completely before dispatch, bounded by a size limit and
//! a timeout, then materialized by content type:
//!
//! | Content-Type | Body |
//! |--------------|------|
//! | any, zero bytes | `Absent` |
//! | `application/x-www-form-urlencoded` | `Form` (raw pairs) |
//! | `multipart/form-data` | `Multipart` |
//! | anything else | `Raw` |

use bytes::Bytes;
use ferrule_core::{
    parse_query, starts_with_ignore_case, Charset, FilePart, IncomingRequest, MultipartBody,
    RequestBody,
};
use http::request::Parts;
use http::StatusCode;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use std::convert::Infallible;
use std::time::Duration;
use thiserror::Error;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";

/// Limits applied while reading a body.
#[derive(Debug, Clone, Copy)]
pub struct BodyLimits {
    /// Largest accepted body in bytes.
    pub max_bytes: usize,
    /// How long to wait for the whole body.
    pub timeout: Duration,
}

/// Why a body could not be turned into a [`RequestBody`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The body exceeded the size limit.
    #[error("request body exceeds {limit} bytes")]
    TooLarge {
        /// The configured limit.
        limit: usize,
    },

    /// The body did not arrive in time.
    #[error("request body was not received within {0:?}")]
    Timeout(Duration),

    /// The connection failed while reading.
    #[error("failed to read request body: {0}")]
    Read(String),

    /// The multipart body could not be parsed.
    #[error("malformed multipart body: {0}")]
    Multipart(String),
}

impl TransportError {
    /// Returns the response status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            Self::Read(_) | Self::Multipart(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Builds the body-less part of a request: verb, path, headers and query.
#[must_use]
pub fn request_head(parts: Parts) -> IncomingRequest {
    let query = parts.uri.query().map(parse_query).unwrap_or_default();
    IncomingRequest::new(parts.method, parts.uri.path())
        .with_headers(parts.headers)
        .with_query(query)
}

/// Reads and materializes a body for the request described by `head`.
pub async fn read_body<B>(
    head: &IncomingRequest,
    body: B,
    limits: BodyLimits,
) -> Result<RequestBody, TransportError>
where
    B: Body<Data = Bytes> + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let bytes = collect(body, limits).await?;
    if bytes.is_empty() {
        return Ok(RequestBody::Absent);
    }

    match head.content_type() {
        Some(ct) if starts_with_ignore_case(ct, FORM_CONTENT_TYPE) => {
            let text = head.charset().decode(&bytes);
            Ok(RequestBody::Form(parse_query(&text)))
        }
        Some(ct) if starts_with_ignore_case(ct, MULTIPART_CONTENT_TYPE) => {
            parse_multipart(ct, bytes).await.map(RequestBody::Multipart)
        }
        _ => Ok(RequestBody::Raw(bytes)),
    }
}

async fn collect<B>(body: B, limits: BodyLimits) -> Result<Bytes, TransportError>
where
    B: Body<Data = Bytes> + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limited = Limited::new(body, limits.max_bytes);
    match tokio::time::timeout(limits.timeout, limited.collect()).await {
        Ok(Ok(collected)) => Ok(collected.to_bytes()),
        Ok(Err(err)) if err.is::<LengthLimitError>() => Err(TransportError::TooLarge {
            limit: limits.max_bytes,
        }),
        Ok(Err(err)) => Err(TransportError::Read(err.to_string())),
        Err(_) => Err(TransportError::Timeout(limits.timeout)),
    }
}

/// Parses a complete multipart body.
///
/// A part with a file name or a non-text content type becomes a file part.
/// Everything else is a text field, decoded with the part's charset.
async fn parse_multipart(
    content_type: &str,
    bytes: Bytes,
) -> Result<MultipartBody, TransportError> {
    let boundary =
        multer::parse_boundary(content_type).map_err(|e| TransportError::Multipart(e.to_string()))?;
    let stream = futures_util::stream::once(async move { Ok::<Bytes, Infallible>(bytes) });
    let mut multipart = multer::Multipart::new(stream, boundary);
    let mut body = MultipartBody::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| TransportError::Multipart(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let part_type = field.content_type().map(ToString::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| TransportError::Multipart(e.to_string()))?;

        let is_text = part_type
            .as_deref()
            .map_or(true, |ct| starts_with_ignore_case(ct, "text/plain"));

        if file_name.is_none() && is_text {
            let charset = part_type
                .as_deref()
                .map_or(Charset::default(), Charset::from_content_type);
            body.push_field(name, charset.decode(&data));
            continue;
        }

        let mut part = FilePart::new(name, data);
        if let Some(file_name) = file_name {
            part = part.with_file_name(file_name);
        }
        if let Some(part_type) = part_type {
            part = part.with_content_type(part_type);
        }
        body.push_file(part);
    }

    Ok(body)
}
