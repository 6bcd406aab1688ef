//! Byte-level encodings that feed the block and record hashes.
//!
//! These encodings cross nodes inside block hashes, so they are part of the
//! wire contract: integers are protobuf-style varints (zig-zag for signed),
//! and the digest is SHAKE256 read out at a fixed 64 bytes.

use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;

/// Fixed digest width for every hash in the system.
pub const DIGEST_LEN: usize = 64;

/// Base-128 varint encoding of an unsigned integer, least significant
/// group first, high bit as the continuation flag.
pub fn uint_to_bytes(value: u64) -> Vec<u8> {
    let mut v = value;
    let mut out = Vec::with_capacity(10);
    loop {
        let byte = (v & 0x7f) as u8;
        v >>= 7;
        if v == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
    out
}

/// Zig-zag then varint, so small negative numbers stay small on the wire.
pub fn int_to_bytes(value: i64) -> Vec<u8> {
    uint_to_bytes(((value << 1) ^ (value >> 63)) as u64)
}

/// Linear concatenation of byte slices.
pub fn concat(parts: &[&[u8]]) -> Vec<u8> {
    let total = parts.iter().map(|p| p.len()).sum();
    let mut out = Vec::with_capacity(total);
    for part in parts {
        out.extend_from_slice(part);
    }
    out
}

/// SHAKE256 over `input`, read out at [`DIGEST_LEN`] bytes.
pub fn shake256(input: &[u8]) -> Vec<u8> {
    let mut hasher = Shake256::default();
    hasher.update(input);
    let mut out = vec![0u8; DIGEST_LEN];
    hasher.finalize_xof().read(&mut out);
    out
}

/// Serde helper for hash byte fields: standard padded base64 on the wire.
pub mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text.as_bytes()).map_err(serde::de::Error::custom)
    }
}
