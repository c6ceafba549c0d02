//! # Ferrule Extract
//!
//! Binds request data to the declared parameters of an action.
//!
//! | Source | Applies to | Notes |
//! |--------|------------|-------|
//! | Query string | every parameter not bound from the body | names match ignoring case |
//! | URL-encoded body | same as the query string | overlays query values |
//! | JSON body | one parameter, or those bound from the body | decoded with the request charset |
//! | Multipart body | text fields by name, file parts by field name | see [`BinderOptions`] |
//! | Any other body | bytes and string parameters | raw bytes or decoded text |
//!
//! ## Example
//!
//! ```rust
//! use bytes::Bytes;
//! use ferrule_core::{IncomingRequest, RequestBody};
//! use ferrule_extract::{Binder, ParameterSpec, SupportedContentType};
//! use http::header::{HeaderValue, CONTENT_TYPE};
//! use http::Method;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct NewUser {
//!     name: String,
//! }
//!
//! let request = IncomingRequest::new(Method::POST, "/users")
//!     .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
//!     .with_body(RequestBody::Raw(Bytes::from_static(br#"{"name":"Ada"}"#)));
//!
//! let params = [ParameterSpec::model::<NewUser>("user")];
//! let mut args = Binder::default()
//!     .bind(&request, &params, Some(SupportedContentType::Json))
//!     .unwrap();
//!
//! let user: NewUser = args.take_model("user").unwrap().unwrap();
//! assert_eq!(user.name, "Ada");
//! ```

#![doc(html_root_url = "https://docs.rs/ferrule-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binder;
mod coerce;
mod content_type;
mod error;
mod form;
mod json;
mod multipart;
mod param;
mod value;

pub use binder::{Binder, BinderOptions};
pub use coerce::{coerce, decode_component};
pub use content_type::SupportedContentType;
pub use error::{ArgumentError, ExtractionError, ExtractionSource};
pub use param::{ModelType, ParamType, ParameterSpec, ScalarValue};
pub use value::{ArgValue, Arguments, FromArgument};
