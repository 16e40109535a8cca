//! Per-font Unicode map (4.A) and its `/ToUnicode` parser (4.B).
//!
//! The range-expansion continuation keys inserted by `endbfrange` are a
//! preserved latent bug, not a design choice: the source this was ported
//! from keys continuation entries by *character* rather than by hex string,
//! so they only ever match at decode time when the encoded byte's hex form
//! happens to equal that character. See `parse_bfrange` below.

use std::collections::HashMap;

use crate::content::{bytes_to_code, hex_lower, utf16be_decode, Operand};
use crate::object_graph::ContentOp;

/// A map from a hex-encoded byte-key to a decoded Unicode string.
///
/// The key length is fixed by the first `insert`; later inserts of a
/// different length are accepted without validation, since the bfrange
/// continuation keys (single characters) are expected to violate it.
#[derive(Debug, Clone, Default)]
pub struct CMap {
    key_len: Option<usize>,
    entries: HashMap<String, String>,
}

impl CMap {
    pub fn new() -> Self {
        CMap {
            key_len: None,
            entries: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Key length in hex characters, fixed by the first insertion. `1` if
    /// the map is still empty.
    pub fn key_len(&self) -> usize {
        self.key_len.unwrap_or(1)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if self.key_len.is_none() {
            self.key_len = Some(key.chars().count());
        }
        self.entries.insert(key, value.into());
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Parse the `beginbfchar`/`beginbfrange` sections of a `/ToUnicode` content
/// stream, already tokenized into `(operands, operator)` pairs by the
/// collaborator. Never fails: a malformed stream simply yields whatever was
/// accumulated before the trouble.
pub fn parse_cmap(ops: &[ContentOp]) -> CMap {
    let mut cmap = CMap::new();
    for op in ops {
        match op.operator.as_str() {
            "endbfchar" => parse_bfchar(&op.operands, &mut cmap),
            "endbfrange" => parse_bfrange(&op.operands, &mut cmap),
            _ => {}
        }
    }
    cmap
}

fn parse_bfchar(operands: &[Operand], cmap: &mut CMap) {
    for pair in operands.chunks(2) {
        let [src, dst] = pair else {
            break;
        };
        let Some(src_bytes) = src.raw_bytes() else {
            continue;
        };
        let dst_str = dst
            .raw_bytes()
            .map(utf16be_decode)
            .unwrap_or_else(|| "?".to_string());
        cmap.insert(hex_lower(src_bytes), dst_str);
    }
}

fn parse_bfrange(operands: &[Operand], cmap: &mut CMap) {
    for triple in operands.chunks(3) {
        let [lo, hi, start_dst] = triple else {
            break;
        };
        let (Some(lo_bytes), Some(hi_bytes)) = (lo.raw_bytes(), hi.raw_bytes()) else {
            continue;
        };
        let Some(start_bytes) = start_dst.raw_bytes() else {
            continue;
        };

        let start_str = utf16be_decode(start_bytes);
        cmap.insert(hex_lower(lo_bytes), start_str.clone());

        let lo_code = bytes_to_code(lo_bytes);
        let hi_code = bytes_to_code(hi_bytes);
        let mut value_char = start_str.chars().next().unwrap_or('?');
        let mut code = lo_code.saturating_add(1);
        while code <= hi_code {
            value_char = char::from_u32(value_char as u32 + 1).unwrap_or('?');
            if let Some(key_char) = char::from_u32(code) {
                // Preserved bug: the continuation key is the literal
                // character at this code point, not its hex encoding.
                cmap.insert(key_char.to_string(), value_char.to_string());
            }
            code += 1;
        }
    }
}
