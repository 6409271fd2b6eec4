//! Structural checks for credential tokens
//!
//! Supabase API keys are JWTs. A value counts as a token when it has exactly
//! three non-empty dot-separated segments, every segment decodes as base64url and
//! the first two decode to JSON. The signature is never verified.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::Value;

/// A structurally valid token, decoded
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    /// Decoded header
    pub header: Value,
    /// Decoded payload (claims)
    pub payload: Value,
    text: String,
}

impl DecodedToken {
    /// Decode `token`, or `None` if it is not structurally valid
    ///
    /// # Examples
    ///
    /// ```
    /// # use supacrud::config::DecodedToken;
    /// // {"alg":"HS256"} . {"role":"anon"} . sig
    /// let token = "eyJhbGciOiJIUzI1NiJ9.eyJyb2xlIjoiYW5vbiJ9.c2ln";
    /// let decoded = DecodedToken::decode(token).unwrap();
    /// assert_eq!(decoded.role(), Some("anon"));
    ///
    /// assert!(DecodedToken::decode("not-a-token").is_none());
    /// ```
    #[must_use]
    pub fn decode(token: &str) -> Option<Self> {
        let segments: Vec<&str> = token.trim().split('.').collect();
        let [header, payload, signature] = segments.as_slice() else {
            return None;
        };
        if segments.iter().any(|segment| segment.is_empty()) {
            return None;
        }

        let header = decode_segment(header)?;
        let payload = decode_segment(payload)?;
        decode_segment(signature)?;

        let mut text = String::from_utf8_lossy(&header).into_owned();
        text.push_str(&String::from_utf8_lossy(&payload));

        Some(Self {
            header: serde_json::from_slice(&header).ok()?,
            payload: serde_json::from_slice(&payload).ok()?,
            text,
        })
    }

    /// Whether the decoded header or payload contains `needle`
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        !needle.is_empty() && self.text.contains(needle)
    }

    /// The `role` claim, if present
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.payload.get("role")?.as_str()
    }
}

fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD.decode(segment.trim_end_matches('=')).ok()
}

#[cfg(test)]
pub(crate) fn encode_token(header: &str, payload: &str) -> String {
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(header),
        URL_SAFE_NO_PAD.encode(payload),
        URL_SAFE_NO_PAD.encode("signature")
    )
}
