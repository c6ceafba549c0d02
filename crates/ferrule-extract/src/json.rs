//! JSON body binding.

use crate::error::{ExtractionError, ExtractionSource};
use crate::param::{ParamType, ParameterSpec};
use crate::value::{ArgValue, Arguments};
use ferrule_core::IncomingRequest;

/// Binds a JSON body.
///
/// A single-parameter action receives the whole document regardless of
/// markers. Otherwise only parameters bound from the body are populated:
/// strings get the decoded text, bytes the raw body, and every other type is
/// decoded from the document.
pub(crate) fn bind_json(
    request: &IncomingRequest,
    params: &[ParameterSpec],
    args: &mut Arguments,
) -> Result<(), ExtractionError> {
    let raw = request.body().raw().ok_or_else(|| {
        ExtractionError::malformed_body(ExtractionSource::Json, "body carries no raw data")
    })?;
    let text = request.charset().decode(raw);

    if let [param] = params {
        let value = decode(param, &text)?;
        args.set(0, value);
        return Ok(());
    }

    for (index, param) in params.iter().enumerate() {
        if !param.is_from_body() {
            continue;
        }
        let value = match param.param_type() {
            ParamType::Str => ArgValue::Str(text.clone()),
            ParamType::Bytes => ArgValue::Bytes(raw.clone()),
            _ => decode(param, &text)?,
        };
        args.set(index, value);
    }
    Ok(())
}

pub(crate) fn decode(param: &ParameterSpec, text: &str) -> Result<ArgValue, ExtractionError> {
    param
        .param_type()
        .decode_json(text)
        .map_err(|err| ExtractionError::deserialization_failed(ExtractionSource::Json, param.name(), err))
}
