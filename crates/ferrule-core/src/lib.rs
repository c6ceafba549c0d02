//! # Ferrule Core
//!
//! Core types shared by every stage of the Ferrule action dispatcher.
//!
//! - [`IncomingRequest`] - A transport-neutral view of one HTTP request
//! - [`RequestBody`] - The materialized body (absent, raw, form, multipart)
//! - [`ActionResult`] - The closed set of results an action can produce
//! - [`HttpFault`] / [`ActionError`] - Structured and unclassified failures
//! - [`ActionContext`] - Per-request state handed to an action
//! - [`Charset`] - Text decoding for bodies and file parts

#![doc(html_root_url = "https://docs.rs/ferrule-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod charset;
mod context;
pub mod cookie;
mod error;
mod request;
mod result;

pub use charset::Charset;
pub use context::{ActionContext, ConnectionInfo, RequestId};
pub use cookie::CookieJar;
pub use error::{ActionError, FaultCategory, HttpFault};
pub use request::{
    parse_query, starts_with_ignore_case, FilePart, IncomingRequest, KeyValues, MultipartBody,
    RequestBody,
};
pub use result::{ActionResult, ActionReturn};
