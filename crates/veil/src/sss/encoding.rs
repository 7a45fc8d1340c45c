//! Encoding of secret bytes as field elements.
//!
//! A secret is cut into chunks of [`CHUNK_BYTES`] bytes and each chunk is
//! encoded as the integer `0x01 || chunk`. The sentinel byte keeps leading
//! zero bytes, and bounds every encoded chunk below `2^520`, inside the
//! largest field `2^521 - 1`.

use crate::{Error, Result};
use num_bigint::BigUint;
use zeroize::Zeroizing;

/// Number of secret bytes per field element.
pub const CHUNK_BYTES: usize = 64;

const SENTINEL: u8 = 0x01;

/// Encode a secret into one integer per chunk. An empty secret is one empty chunk.
pub(crate) fn encode_secret(secret: &[u8]) -> Vec<BigUint> {
    let encode = |chunk: &[u8]| {
        let mut buf = Zeroizing::new(Vec::with_capacity(chunk.len() + 1));
        buf.push(SENTINEL);
        buf.extend_from_slice(chunk);
        BigUint::from_bytes_be(&buf)
    };
    if secret.is_empty() {
        return vec![encode(&[])];
    }
    secret.chunks(CHUNK_BYTES).map(encode).collect()
}

/// Decode one chunk, checking and stripping the sentinel byte.
pub(crate) fn decode_chunk(value: &BigUint) -> Result<Vec<u8>> {
    let mut bytes = value.to_bytes_be();
    if bytes.first() != Some(&SENTINEL) || bytes.len() > CHUNK_BYTES + 1 {
        return Err(Error::malformed_share(
            "reconstructed value is not a valid secret encoding",
        ));
    }
    bytes.remove(0);
    Ok(bytes)
}
