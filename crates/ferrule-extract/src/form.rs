//! Name-matched binding from key/value sources.
//!
//! Used for the query string, url-encoded bodies and multipart text fields.

use crate::coerce::{coerce, decode_component};
use crate::error::{ExtractionError, ExtractionSource};
use crate::param::ParameterSpec;
use crate::value::Arguments;
use ferrule_core::KeyValues;

/// How pair values arrive on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Encoding {
    /// Percent-encoded, `+` for space.
    UrlEncoded,
    /// Taken as-is.
    Verbatim,
}

/// Overlays matching pairs onto the arguments.
///
/// Parameters bound from the body are skipped. Keys match parameter names
/// ignoring ASCII case, and the last matching pair wins.
pub(crate) fn bind_pairs(
    pairs: &KeyValues,
    params: &[ParameterSpec],
    args: &mut Arguments,
    source: ExtractionSource,
    encoding: Encoding,
) -> Result<(), ExtractionError> {
    for (index, param) in params.iter().enumerate() {
        if param.is_from_body() || !param.param_type().is_scalar() {
            continue;
        }

        let matched = pairs.iter().rev().find(|(key, _)| match encoding {
            Encoding::UrlEncoded => decode_component(key).eq_ignore_ascii_case(param.name()),
            Encoding::Verbatim => key.eq_ignore_ascii_case(param.name()),
        });
        let Some((_, raw)) = matched else {
            continue;
        };

        let value = match encoding {
            Encoding::UrlEncoded => decode_component(raw),
            Encoding::Verbatim => raw.clone(),
        };
        if let Some(coerced) = coerce(&value, param, source)? {
            args.set(index, coerced);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ArgValue;

    fn pairs(items: &[(&str, &str)]) -> KeyValues {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_last_occurrence_wins() {
        let params = [ParameterSpec::int("page")];
        let mut args = Arguments::initial(&params);
        bind_pairs(
            &pairs(&[("page", "1"), ("PAGE", "3")]),
            &params,
            &mut args,
            ExtractionSource::Query,
            Encoding::UrlEncoded,
        )
        .unwrap();
        assert!(matches!(args.get("page"), Some(ArgValue::Int(3))));
    }

    #[test]
    fn test_from_body_params_are_skipped() {
        let params = [ParameterSpec::string("note").from_body()];
        let mut args = Arguments::initial(&params);
        bind_pairs(
            &pairs(&[("note", "hi")]),
            &params,
            &mut args,
            ExtractionSource::Query,
            Encoding::UrlEncoded,
        )
        .unwrap();
        assert!(matches!(args.get("note"), Some(ArgValue::Empty)));
    }

    #[test]
    fn test_verbatim_values_are_not_decoded() {
        let params = [ParameterSpec::string("q")];
        let mut args = Arguments::initial(&params);
        bind_pairs(
            &pairs(&[("q", "50%+off")]),
            &params,
            &mut args,
            ExtractionSource::Multipart,
            Encoding::Verbatim,
        )
        .unwrap();
        assert!(matches!(args.get("q"), Some(ArgValue::Str(s)) if s == "50%+off"));
    }

    #[test]
    fn test_coercion_failure_propagates() {
        let params = [ParameterSpec::int("id")];
        let mut args = Arguments::initial(&params);
        let err = bind_pairs(
            &pairs(&[("id", "abc")]),
            &params,
            &mut args,
            ExtractionSource::Form,
            Encoding::UrlEncoded,
        )
        .unwrap_err();
        assert_eq!(err.extraction_source(), ExtractionSource::Form);
    }
}
