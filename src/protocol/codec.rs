//! Text framing for encoded envelopes.
//!
//! Some peers expect the JSON text to be percent-encoded before it is put
//! on the wire and URL-decode every frame they receive. The transform has
//! no semantic effect; both ends must simply agree on it.

// ============================================================================
// Imports
// ============================================================================

use std::borrow::Cow;

use crate::error::{Error, Result};

// ============================================================================
// TextCodec
// ============================================================================

/// Framing applied to envelope text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextCodec {
    /// JSON text is sent as-is.
    #[default]
    Plain,
    /// JSON text is percent-encoded (RFC 3986 unreserved characters kept).
    PercentEncoded,
}

impl TextCodec {
    /// Applies framing to outbound text.
    #[inline]
    #[must_use]
    pub fn frame<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self {
            Self::Plain => Cow::Borrowed(text),
            Self::PercentEncoded => urlencoding::encode(text),
        }
    }

    /// Removes framing from inbound text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if percent-decoding yields invalid UTF-8.
    pub fn unframe<'a>(&self, text: &'a str) -> Result<Cow<'a, str>> {
        match self {
            Self::Plain => Ok(Cow::Borrowed(text)),
            Self::PercentEncoded => {
                urlencoding::decode(text).map_err(|e| Error::decode(e.to_string()))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_is_identity() {
        let text = r#"{"where":"chat","data":"a b"}"#;
        assert_eq!(TextCodec::Plain.frame(text), text);
        assert_eq!(TextCodec::Plain.unframe(text).expect("unframe"), text);
    }

    #[test]
    fn test_percent_encoded_frame() {
        let framed = TextCodec::PercentEncoded.frame(r#"{"where":"a b"}"#);
        assert_eq!(framed, "%7B%22where%22%3A%22a%20b%22%7D");
    }

    #[test]
    fn test_percent_encoded_unframe() {
        let text = TextCodec::PercentEncoded
            .unframe("%7B%22where%22%3A%22caf%C3%A9%22%7D")
            .expect("unframe");
        assert_eq!(text, r#"{"where":"café"}"#);
    }

    #[test]
    fn test_percent_encoded_rejects_invalid_utf8() {
        let result = TextCodec::PercentEncoded.unframe("%FF%FE");
        assert!(matches!(result, Err(Error::Decode { .. })));
    }

    #[test]
    fn test_default_is_plain() {
        assert_eq!(TextCodec::default(), TextCodec::Plain);
    }
}
