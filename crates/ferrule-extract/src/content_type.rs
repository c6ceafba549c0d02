//! Content types an action can declare.

use ferrule_core::starts_with_ignore_case;
use std::fmt;

/// A content type an action may require of its requests.
///
/// Matching is a case-insensitive prefix test, so parameters such as
/// `charset` or `boundary` do not affect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportedContentType {
    /// `application/json`
    Json,
    /// `application/x-www-form-urlencoded`
    FormUrlEncoded,
    /// `multipart/form-data`
    Multipart,
}

impl SupportedContentType {
    /// Returns the media type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
            Self::Multipart => "multipart/form-data",
        }
    }

    /// Returns `true` when `content_type` starts with this media type.
    ///
    /// ```
    /// use ferrule_extract::SupportedContentType;
    ///
    /// assert!(SupportedContentType::Json.matches("application/json; charset=utf-8"));
    /// assert!(!SupportedContentType::Json.matches("text/json"));
    /// ```
    #[must_use]
    pub fn matches(self, content_type: &str) -> bool {
        starts_with_ignore_case(content_type, self.as_str())
    }

    /// Classifies a request content type.
    #[must_use]
    pub fn classify(content_type: &str) -> Option<Self> {
        [Self::FormUrlEncoded, Self::Json, Self::Multipart]
            .into_iter()
            .find(|candidate| candidate.matches(content_type))
    }
}

impl fmt::Display for SupportedContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(
            SupportedContentType::classify("multipart/form-data; boundary=abc"),
            Some(SupportedContentType::Multipart)
        );
        assert_eq!(
            SupportedContentType::classify("APPLICATION/X-WWW-FORM-URLENCODED"),
            Some(SupportedContentType::FormUrlEncoded)
        );
        assert_eq!(SupportedContentType::classify("text/csv"), None);
        assert_eq!(SupportedContentType::classify(""), None);
    }
}
