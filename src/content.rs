//! The tagged-sum representation of an already-tokenized content-stream
//! operand (Design Notes §9), plus small byte/hex helpers shared by the
//! CMap parser (4.B) and the text decoder (4.D).

use std::collections::HashMap;

use crate::object_graph::ObjId;

/// A single content-stream operand, as produced by the collaborator's
/// tokenizer. Byte-string and text-string PDF objects are both flattened to
/// raw bytes before use; the distinction is kept here so 4.D's literal-mode
/// bypass can tell them apart.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Number(f64),
    Bytes(Vec<u8>),
    Text(String),
    Array(Vec<Operand>),
    Dict(HashMap<String, Operand>),
    Ref(ObjId),
}

impl Operand {
    /// The operand's raw bytes, used for hex-encoding in 4.B/4.D. A
    /// `Text` operand's raw bytes are its UTF-8 encoding (the "original
    /// bytes" accessor described in 4.B).
    pub fn raw_bytes(&self) -> Option<&[u8]> {
        match self {
            Operand::Bytes(b) => Some(b.as_slice()),
            Operand::Text(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Operand::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&HashMap<String, Operand>> {
        match self {
            Operand::Dict(d) => Some(d),
            _ => None,
        }
    }
}

/// Lower-case hex encoding, the key format every CMap uses.
pub fn hex_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// Interpret a byte sequence as a big-endian unsigned integer code point.
/// Used by the bfrange range-expansion rule (4.B), which reasons about
/// `lo`/`hi` as numeric codes regardless of how many bytes encode them.
pub fn bytes_to_code(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32)
}

/// Decode a UTF-16BE byte sequence into a `String`. On any decoding failure
/// (odd length, unpaired surrogate) the replacement character `?` is
/// returned, matching 4.B's documented edge case.
pub fn utf16be_decode(bytes: &[u8]) -> String {
    if bytes.is_empty() || bytes.len() % 2 != 0 {
        return "?".to_string();
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    match String::from_utf16(&units) {
        Ok(s) if !s.is_empty() => s,
        _ => "?".to_string(),
    }
}
