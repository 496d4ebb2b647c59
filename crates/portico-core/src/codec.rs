//! Opaque route tokens
//!
//! Entity identifiers never appear as plain values in a URL. Before a link is
//! generated the identifier is rendered to its canonical text, base64-encoded,
//! and made path-safe (`+` → `-`, `/` → `_`, padding stripped). Route handlers
//! hand the raw segment back to [`decode_to_string`] or [`decode_to_number`].
//!
//! Decoding is strict: a segment with characters outside the URL-safe alphabet,
//! an impossible length, non-canonical trailing bits, or non-UTF-8 content is
//! rejected with a `Validation` error instead of yielding a garbled id.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{PorticoError, Result};

/// URL-safe alphabet, no padding on output, padding optional on input.
const ROUTE_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

// ============================================================================
// Identifier
// ============================================================================

/// An identifier in canonical text form.
///
/// Integers render as plain decimal. Floats must be finite and render as the
/// shortest decimal that parses back to the same value, so `42.0` and `42`
/// produce the same identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identifier {
    text: String,
}

impl Identifier {
    /// Identifier from arbitrary text. The empty string is allowed.
    pub fn text(value: impl Into<String>) -> Self {
        Self { text: value.into() }
    }

    /// Identifier from a floating-point number.
    ///
    /// Fails with `Validation` for `NaN` and infinities, which have no decimal form.
    pub fn number(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(PorticoError::validation(format!(
                "Identifier must be a finite number, got {value}"
            )));
        }
        Ok(Self {
            text: value.to_string(),
        })
    }

    /// Canonical text of this identifier
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl From<&String> for Identifier {
    fn from(value: &String) -> Self {
        Self::text(value.as_str())
    }
}

macro_rules! integer_identifier {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Identifier {
                fn from(value: $ty) -> Self {
                    Self { text: value.to_string() }
                }
            }
        )*
    };
}

integer_identifier!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl TryFrom<f64> for Identifier {
    type Error = PorticoError;

    fn try_from(value: f64) -> Result<Self> {
        Self::number(value)
    }
}

impl TryFrom<f32> for Identifier {
    type Error = PorticoError;

    fn try_from(value: f32) -> Result<Self> {
        Self::number(f64::from(value))
    }
}

// ============================================================================
// OpaqueToken
// ============================================================================

/// URL-safe encoded identifier, suitable for an unescaped path segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpaqueToken(String);

impl OpaqueToken {
    /// Wrap a raw route segment. No validation happens until decode.
    pub fn from_segment(segment: impl Into<String>) -> Self {
        Self(segment.into())
    }

    /// Token text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the token, returning its text
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OpaqueToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OpaqueToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OpaqueToken {
    fn from(segment: &str) -> Self {
        Self::from_segment(segment)
    }
}

impl From<String> for OpaqueToken {
    fn from(segment: String) -> Self {
        Self::from_segment(segment)
    }
}

// ============================================================================
// Codec
// ============================================================================

/// Reversible identifier ↔ token codec.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokenCodec;

impl TokenCodec {
    /// Create a codec
    pub const fn new() -> Self {
        Self
    }

    /// Encode an identifier into an opaque token.
    pub fn encode(&self, value: impl Into<Identifier>) -> OpaqueToken {
        let identifier = value.into();
        OpaqueToken(ROUTE_ENGINE.encode(identifier.as_str().as_bytes()))
    }

    /// Decode a token back to the identifier's canonical text.
    pub fn decode_to_string(&self, token: &OpaqueToken) -> Result<String> {
        let bytes = ROUTE_ENGINE.decode(token.as_str())?;
        String::from_utf8(bytes).map_err(|_| {
            PorticoError::validation(format!("Malformed token {token}: not valid UTF-8"))
        })
    }

    /// Decode a token and parse its text as a finite number.
    pub fn decode_to_number(&self, token: &OpaqueToken) -> Result<f64> {
        let text = self.decode_to_string(token)?;
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(PorticoError::validation(format!(
                "Token {token} does not encode a number"
            ))),
        }
    }
}

/// Encode an identifier using the default codec.
pub fn encode(value: impl Into<Identifier>) -> OpaqueToken {
    TokenCodec::new().encode(value)
}

/// Decode a token to text using the default codec.
pub fn decode_to_string(token: &OpaqueToken) -> Result<String> {
    TokenCodec::new().decode_to_string(token)
}

/// Decode a token to a number using the default codec.
pub fn decode_to_number(token: &OpaqueToken) -> Result<f64> {
    TokenCodec::new().decode_to_number(token)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::errors::ErrorKind;
    use proptest::prelude::*;

    fn number_token(value: f64) -> OpaqueToken {
        encode(Identifier::number(value).expect("finite"))
    }

    #[test]
    fn test_integer_round_trip() {
        let token = encode(1234_u64);
        assert_eq!(decode_to_string(&token).expect("decode"), "1234");
        assert_eq!(decode_to_number(&token).expect("decode"), 1234.0);
    }

    #[test]
    fn test_integral_float_matches_integer_form() {
        assert_eq!(number_token(42.0), encode(42_i32));
    }

    #[test]
    fn test_empty_string_round_trips() {
        let token = encode("");
        assert_eq!(token.as_str(), "");
        assert_eq!(decode_to_string(&token).expect("decode"), "");
    }

    #[test]
    fn test_empty_token_is_not_a_number() {
        let err = decode_to_number(&encode("")).expect_err("empty text is not numeric");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_known_encoding_strips_padding() {
        // "1" is "MQ==" in padded standard base64
        assert_eq!(encode("1").as_str(), "MQ");
        assert_eq!(decode_to_string(&OpaqueToken::from("MQ==")).expect("padded"), "1");
    }

    #[test]
    fn test_unsafe_characters_are_substituted() {
        // U+FBFF is EF AF BF, "76+/" in the standard alphabet
        let token = TokenCodec::new().encode("\u{fbff}");
        assert!(!token.as_str().contains(['+', '/', '=']));
        assert_eq!(decode_to_string(&token).expect("decode"), "\u{fbff}");
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = Identifier::number(value).expect_err("non-finite");
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn test_malformed_tokens_fail_with_validation() {
        for segment in ["ab+c", "ab/c", "a", "%%%%", "MQ=x", "AB", "hello world"] {
            let err = decode_to_string(&OpaqueToken::from(segment))
                .expect_err("malformed token must not decode");
            assert_eq!(err.kind(), ErrorKind::Validation, "segment {segment:?}");
        }
    }

    #[test]
    fn test_non_utf8_payload_rejected() {
        let token = OpaqueToken::from(ROUTE_ENGINE.encode([0xff_u8, 0xfe]));
        let err = decode_to_string(&token).expect_err("invalid utf-8");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_text_token_is_not_a_number() {
        let err = decode_to_number(&encode("user-17")).expect_err("not numeric");
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = decode_to_number(&encode("inf")).expect_err("inf is not finite");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    proptest! {
        #[test]
        fn string_round_trip(text in any::<String>()) {
            let token = encode(text.as_str());
            prop_assert_eq!(decode_to_string(&token).expect("decode"), text);
        }

        #[test]
        fn integer_round_trip(value in any::<i64>()) {
            let token = encode(value);
            prop_assert_eq!(decode_to_string(&token).expect("decode"), value.to_string());
        }

        #[test]
        fn float_round_trip(value in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
            let token = number_token(value);
            prop_assert_eq!(decode_to_number(&token).expect("decode"), value);
        }

        #[test]
        fn tokens_are_path_safe(text in any::<String>()) {
            let token = encode(text);
            prop_assert!(token
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }
}
