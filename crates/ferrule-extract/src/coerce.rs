//! The coercion table from request text to typed values.
//!
//! | Parameter type | Accepted text |
//! |---|---|
//! | integer | anything `i64::from_str` accepts, surrounding whitespace ignored |
//! | float | anything `f64::from_str` accepts |
//! | boolean | `true`, `false`, `1`, `0`, any case |
//! | string | anything |
//! | enumeration | a declared variant, any case |
//! | bytes | anything, as its UTF-8 bytes |
//!
//! Files and models are never read from key/value sources.

use crate::error::{ExtractionError, ExtractionSource};
use crate::param::{match_variant, ParamType, ParameterSpec};
use crate::value::ArgValue;
use bytes::Bytes;

/// Decodes one URL-encoded query or form component.
///
/// `+` becomes a space before percent-decoding. Invalid UTF-8 is replaced
/// rather than rejected.
///
/// ```
/// use ferrule_extract::decode_component;
///
/// assert_eq!(decode_component("Ada+Lovelace%21"), "Ada Lovelace!");
/// assert_eq!(decode_component("100%"), "100%");
/// ```
#[must_use]
pub fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}

/// Converts text to the parameter's type.
///
/// Returns `Ok(None)` for parameter types key/value sources cannot populate.
pub fn coerce(
    value: &str,
    param: &ParameterSpec,
    source: ExtractionSource,
) -> Result<Option<ArgValue>, ExtractionError> {
    let invalid = |expected: &str| {
        ExtractionError::invalid_value(
            source,
            param.name(),
            format!("expected {expected}, got '{value}'"),
        )
    };

    let coerced = match param.param_type() {
        ParamType::Int => value
            .trim()
            .parse::<i64>()
            .map(ArgValue::Int)
            .map_err(|_| invalid("an integer"))?,
        ParamType::Float => value
            .trim()
            .parse::<f64>()
            .map(ArgValue::Float)
            .map_err(|_| invalid("a number"))?,
        ParamType::Bool => parse_bool(value.trim())
            .map(ArgValue::Bool)
            .ok_or_else(|| invalid("true or false"))?,
        ParamType::Str => ArgValue::Str(value.to_string()),
        ParamType::Enum(variants) => match_variant(variants, value.trim())
            .map(ArgValue::Enum)
            .ok_or_else(|| invalid(&format!("one of {}", variants.join(", "))))?,
        ParamType::Bytes => ArgValue::Bytes(Bytes::copy_from_slice(value.as_bytes())),
        ParamType::File | ParamType::Files | ParamType::Model(_) => return Ok(None),
    };
    Ok(Some(coerced))
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") || value == "1" {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") || value == "0" {
        Some(false)
    } else {
        None
    }
}
