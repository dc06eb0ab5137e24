//! Reversible encoding between message identifiers and storage-safe tokens.
//!
//! Key ids are derived from arbitrary UTF-8 message text, which may contain
//! quotes, slashes, or anything else that would be awkward as a JSON object
//! key or a filesystem path component. The URL-safe base64 alphabet (no
//! padding) keeps tokens safe in both positions.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::{EngineError, Result};

/// Encode arbitrary UTF-8 text into a storage-safe token.
pub fn encode(text: &str) -> String {
    URL_SAFE_NO_PAD.encode(text.as_bytes())
}

/// Decode a token produced by [`encode`] back into the original text.
///
/// Fails on tokens that are not valid base64 or do not decode to UTF-8;
/// such tokens can only come from a corrupted store.
pub fn decode(token: &str) -> Result<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|e| EngineError::Validation(format!("invalid key token {token:?}: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| EngineError::Validation(format!("key token {token:?} is not UTF-8: {e}")))
}
