//! Multipart body binding.

use crate::error::{ExtractionError, ExtractionSource};
use crate::form::{bind_pairs, Encoding};
use crate::json;
use crate::param::{ParamType, ParameterSpec};
use crate::value::{ArgValue, Arguments};
use ferrule_core::{FilePart, RequestBody};

/// Binds a multipart body.
///
/// Text fields bind like form pairs but are taken verbatim. File parts are
/// matched to parameters by exact field name; with `sole_file_part_fallback`
/// a lone file part also serves parameters whose name matches nothing. A
/// file-collection parameter receives every file part. A JSON part matched
/// to a body-bound parameter other than a file is decoded as JSON.
pub(crate) fn bind_multipart(
    body: &RequestBody,
    params: &[ParameterSpec],
    args: &mut Arguments,
    sole_file_part_fallback: bool,
) -> Result<(), ExtractionError> {
    let multipart = body.multipart().ok_or_else(|| {
        ExtractionError::malformed_body(ExtractionSource::Multipart, "body is not multipart")
    })?;

    bind_pairs(
        multipart.fields(),
        params,
        args,
        ExtractionSource::Multipart,
        Encoding::Verbatim,
    )?;

    let files = multipart.files();
    if files.is_empty() {
        return Ok(());
    }

    for (index, param) in params.iter().enumerate() {
        if matches!(param.param_type(), ParamType::Files) {
            args.set(index, ArgValue::Files(files.to_vec()));
            continue;
        }

        let Some(part) = find_part(files, param.name(), sole_file_part_fallback) else {
            continue;
        };

        let value = match param.param_type() {
            ParamType::File => ArgValue::File(part.clone()),
            _ if param.is_from_body() && part.is_json() => json::decode(param, &part.text())?,
            ParamType::Bytes => ArgValue::Bytes(part.data().clone()),
            ParamType::Str => ArgValue::Str(part.text()),
            _ => continue,
        };
        args.set(index, value);
    }
    Ok(())
}

fn find_part<'a>(files: &'a [FilePart], name: &str, fallback: bool) -> Option<&'a FilePart> {
    files
        .iter()
        .find(|part| part.name() == name)
        .or_else(|| match files {
            [only] if fallback => Some(only),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_part_by_name() {
        let files = [FilePart::new("a", "1"), FilePart::new("b", "2")];
        assert_eq!(find_part(&files, "b", false).map(FilePart::name), Some("b"));
        assert!(find_part(&files, "c", true).is_none());
    }

    #[test]
    fn test_sole_part_fallback_only_when_enabled() {
        let files = [FilePart::new("upload", "1")];
        assert!(find_part(&files, "document", false).is_none());
        assert_eq!(
            find_part(&files, "document", true).map(FilePart::name),
            Some("upload")
        );
    }
}
