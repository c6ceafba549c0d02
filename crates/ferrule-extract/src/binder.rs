//! The argument binder.

use crate::content_type::SupportedContentType;
use crate::error::{ExtractionError, ExtractionSource};
use crate::form::{bind_pairs, Encoding};
use crate::param::{ParamType, ParameterSpec};
use crate::value::{ArgValue, Arguments};
use crate::{json, multipart};
use ferrule_core::IncomingRequest;

/// Binder behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinderOptions {
    /// Let a lone multipart file part bind to a parameter whose name it does
    /// not match. Off by default; name matching is authoritative.
    pub sole_file_part_fallback: bool,
}

/// Turns a request into the arguments of one action.
///
/// Sources are applied in a fixed order, each overlaying the previous:
///
/// 1. parameter defaults
/// 2. the query string
/// 3. the body, chosen by the effective content type
///
/// # Example
///
/// ```
/// use ferrule_core::IncomingRequest;
/// use ferrule_extract::{Binder, ParameterSpec};
/// use http::Method;
///
/// let request = IncomingRequest::new(Method::GET, "/users").with_query_string("ID=42");
/// let params = [ParameterSpec::int("id"), ParameterSpec::int("page").with_default(1)];
///
/// let mut args = Binder::default().bind(&request, &params, None).unwrap();
/// assert_eq!(args.take::<i64>("id").unwrap(), 42);
/// assert_eq!(args.take::<i64>("page").unwrap(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Binder {
    options: BinderOptions,
}

impl Binder {
    /// Creates a binder with the given options.
    #[must_use]
    pub const fn new(options: BinderOptions) -> Self {
        Self { options }
    }

    /// Returns the binder options.
    #[must_use]
    pub const fn options(&self) -> BinderOptions {
        self.options
    }

    /// Binds the request to the declared parameters.
    ///
    /// `declared` is the content type the action requires, if any.
    pub fn bind(
        &self,
        request: &IncomingRequest,
        params: &[ParameterSpec],
        declared: Option<SupportedContentType>,
    ) -> Result<Arguments, ExtractionError> {
        let body = request.body();
        let request_type = request.content_type();

        if !body.is_absent() && request_type.is_none() {
            return Err(ExtractionError::missing_content_type());
        }

        let mut args = Arguments::initial(params);

        let mut effective = match declared {
            Some(expected) => match request_type {
                Some(actual) if expected.matches(actual) => actual,
                _ => {
                    return Err(ExtractionError::unsupported_media_type(
                        expected.as_str(),
                        request_type,
                    ))
                }
            },
            None => request_type.unwrap_or(""),
        };
        if body.is_structurally_empty() {
            effective = "";
        }

        bind_pairs(
            request.query(),
            params,
            &mut args,
            ExtractionSource::Query,
            Encoding::UrlEncoded,
        )?;

        if effective.is_empty() {
            return Ok(args);
        }

        tracing::trace!(content_type = effective, params = params.len(), "binding request body");

        match SupportedContentType::classify(effective) {
            Some(SupportedContentType::FormUrlEncoded) => {
                let pairs = body.form().ok_or_else(|| {
                    ExtractionError::malformed_body(
                        ExtractionSource::Form,
                        "body is not url-encoded key/value data",
                    )
                })?;
                bind_pairs(
                    pairs,
                    params,
                    &mut args,
                    ExtractionSource::Form,
                    Encoding::UrlEncoded,
                )?;
            }
            Some(SupportedContentType::Json) => json::bind_json(request, params, &mut args)?,
            Some(SupportedContentType::Multipart) => multipart::bind_multipart(
                body,
                params,
                &mut args,
                self.options.sole_file_part_fallback,
            )?,
            None => bind_raw(request, params, &mut args),
        }

        Ok(args)
    }
}

/// Hands a body of any other content type to bytes and string parameters.
fn bind_raw(request: &IncomingRequest, params: &[ParameterSpec], args: &mut Arguments) {
    let Some(raw) = request.body().raw().filter(|raw| !raw.is_empty()) else {
        return;
    };
    for (index, param) in params.iter().enumerate() {
        match param.param_type() {
            ParamType::Bytes => args.set(index, ArgValue::Bytes(raw.clone())),
            ParamType::Str => args.set(index, ArgValue::Str(request.charset().decode(raw))),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use ferrule_core::RequestBody;
    use http::header::CONTENT_TYPE;
    use http::{HeaderValue, Method, StatusCode};

    fn post(content_type: &'static str, body: RequestBody) -> IncomingRequest {
        IncomingRequest::new(Method::POST, "/x")
            .with_header(CONTENT_TYPE, HeaderValue::from_static(content_type))
            .with_body(body)
    }

    #[test]
    fn test_body_without_content_type_is_415() {
        let request = IncomingRequest::new(Method::POST, "/x")
            .with_body(RequestBody::Raw(Bytes::from_static(b"{}")));
        let err = Binder::default().bind(&request, &[], None).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_declared_type_mismatch_is_415() {
        let request = post("text/plain", RequestBody::Raw(Bytes::from_static(b"x")));
        let err = Binder::default()
            .bind(&request, &[], Some(SupportedContentType::Json))
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(err.to_string().contains("text/plain"));
    }

    #[test]
    fn test_declared_type_without_header_is_415() {
        let request = IncomingRequest::new(Method::GET, "/x");
        let err = Binder::default()
            .bind(&request, &[], Some(SupportedContentType::Json))
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_empty_body_skips_body_binding() {
        let request = post("application/json", RequestBody::Raw(Bytes::new()))
            .with_query_string("n=5");
        let mut args = Binder::default()
            .bind(&request, &[ParameterSpec::int("n")], None)
            .unwrap();
        assert_eq!(args.take::<i64>("n").unwrap(), 5);
    }

    #[test]
    fn test_form_requires_key_values() {
        let request = post(
            "application/x-www-form-urlencoded",
            RequestBody::Raw(Bytes::from_static(b"a=1")),
        );
        let err = Binder::default()
            .bind(&request, &[ParameterSpec::int("a")], None)
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_raw_body_for_unknown_content_type() {
        let request = post(
            "text/csv; charset=iso-8859-1",
            RequestBody::Raw(Bytes::from_static(b"caf\xE9")),
        );
        let params = [
            ParameterSpec::bytes("payload"),
            ParameterSpec::string("text"),
            ParameterSpec::int("count").with_default(2),
        ];
        let mut args = Binder::default().bind(&request, &params, None).unwrap();
        assert_eq!(args.take::<Bytes>("payload").unwrap().as_ref(), b"caf\xE9");
        assert_eq!(args.take::<String>("text").unwrap(), "café");
        assert_eq!(args.take::<i64>("count").unwrap(), 2);
    }

    #[test]
    fn test_options_accessor() {
        let binder = Binder::new(BinderOptions {
            sole_file_part_fallback: true,
        });
        assert!(binder.options().sole_file_part_fallback);
    }
}
