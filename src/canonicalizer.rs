// src/canonicalizer.rs
//! Deterministic JSON serialization (RFC 8785 style). Semantically identical
//! values produce byte-identical encodings on every run and every
//! implementation, which makes the output safe to hash.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Serialize a value to canonical JSON bytes: object members sorted by key,
/// no insignificant whitespace, canonical number form.
pub fn marshal_canonical<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let value = serde_json::to_value(value).map_err(|e| Error::Canonicalization(e.to_string()))?;

    let mut out = String::new();
    write_canonical(&value, &mut out)?;

    Ok(out.into_bytes())
}

fn write_canonical(value: &Value, out: &mut String) -> Result<()> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            // Members are ordered by the UTF-16 code units of their names
            keys.sort_by(|a, b| a.encode_utf16().cmp(b.encode_utf16()));

            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_scalar(&Value::String((*key).clone()), out)?;
                out.push(':');
                write_canonical(&map[key.as_str()], out)?;
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
        }
        scalar => write_scalar(scalar, out)?,
    }

    Ok(())
}

fn write_scalar(value: &Value, out: &mut String) -> Result<()> {
    let rendered =
        serde_json::to_string(value).map_err(|e| Error::Canonicalization(e.to_string()))?;
    out.push_str(&rendered);

    Ok(())
}
