//! Resume tokens
//!
//! Encodes a cursor key as URL-safe base64 over its JSON form, so a page's
//! position can leave the process (query string, state file) and come back
//! as the same typed key.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::pagination::NextFn;
use crate::types::PaginationResult;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Encode a key as an opaque token
pub fn encode_key<K: Serialize>(key: &K) -> Result<String> {
    let json = serde_json::to_vec(key)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decode a token produced by [`encode_key`]
pub fn decode_key<K: DeserializeOwned>(token: &str) -> Result<K> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(|e| Error::cursor(format!("not base64: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| Error::cursor(format!("bad key payload: {e}")))
}

/// A next function that encodes the key of a page's last item
pub fn key_encoder<K, V>() -> NextFn<K, V>
where
    K: Serialize + 'static,
    V: 'static,
{
    Arc::new(|_ctx: &Context, result: &PaginationResult<K, V>| {
        result
            .last_key()
            .and_then(|key| match encode_key(key) {
                Ok(token) => Some(token),
                Err(e) => {
                    tracing::warn!("Failed to encode cursor key: {e}");
                    None
                }
            })
            .unwrap_or_default()
    })
}
