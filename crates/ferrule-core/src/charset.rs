//! Character set handling for request bodies and file parts.

/// A text encoding the binder knows how to decode.
///
/// Unknown or missing labels fall back to UTF-8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Charset {
    /// UTF-8; invalid sequences become U+FFFD.
    #[default]
    Utf8,
    /// ISO-8859-1, where every byte maps to the code point of the same value.
    Latin1,
    /// 7-bit US-ASCII; bytes above 0x7F become U+FFFD.
    Ascii,
}

impl Charset {
    /// Resolves a charset label such as `utf-8` or `ISO-8859-1`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().trim_matches('"').to_ascii_lowercase();
        match label.as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "l1" => Some(Self::Latin1),
            "us-ascii" | "ascii" => Some(Self::Ascii),
            _ => None,
        }
    }

    /// Extracts the `charset` parameter of a content type, defaulting to UTF-8.
    ///
    /// ```
    /// use ferrule_core::Charset;
    ///
    /// assert_eq!(Charset::from_content_type("text/plain; charset=ISO-8859-1"), Charset::Latin1);
    /// assert_eq!(Charset::from_content_type("application/json"), Charset::Utf8);
    /// ```
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Self {
        content_type
            .parse::<mime::Mime>()
            .ok()
            .and_then(|mime| {
                mime.get_param(mime::CHARSET)
                    .and_then(|value| Self::from_label(value.as_str()))
            })
            .unwrap_or_default()
    }

    /// Returns the canonical label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "iso-8859-1",
            Self::Ascii => "us-ascii",
        }
    }

    /// Decodes bytes into a string.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Self::Ascii => bytes
                .iter()
                .map(|&b| {
                    if b.is_ascii() {
                        char::from(b)
                    } else {
                        char::REPLACEMENT_CHARACTER
                    }
                })
                .collect(),
        }
    }
}

impl std::fmt::Display for Charset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
