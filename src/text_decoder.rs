//! Slice a raw text operand into fixed-width keys and translate via the
//! active CMap (4.D).

use crate::cmap::CMap;
use crate::content::hex_lower;

/// Decode `bytes` through `cmap`: hex-encode, slice into `cmap.key_len()`
/// chunks, map each chunk. Unmatched chunks are dropped, not replaced. A
/// trailing short chunk is also dropped.
pub fn decode_bytes(bytes: &[u8], cmap: &CMap) -> String {
    let key_len = cmap.key_len();
    let hex = hex_lower(bytes);
    let chars: Vec<char> = hex.chars().collect();
    let mut out = String::new();
    for chunk in chars.chunks(key_len) {
        if chunk.len() < key_len {
            continue;
        }
        let key: String = chunk.iter().collect();
        if let Some(value) = cmap.lookup(&key) {
            out.push_str(value);
        }
    }
    out
}
