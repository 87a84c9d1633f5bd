//! Percent-decoding and urlencoded form parsing.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("truncated percent escape")]
    Truncated,

    #[error("invalid percent escape: %{escape}")]
    InvalidEscape { escape: String },

    #[error("decoded text is not valid utf-8")]
    Utf8,
}

/// Decodes `%XX` escapes; in form mode `+` also decodes to a space.
pub fn percent_decode(input: &str, from_form: bool) -> Result<Vec<u8>, DecodeError> {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let escape = bytes.get(i + 1..i + 3).ok_or(DecodeError::Truncated)?;
                // the escape digits are ascii by construction of the slice
                let escape = std::str::from_utf8(escape).map_err(|_| DecodeError::Utf8)?;
                let value = u8::from_str_radix(escape, 16)
                    .map_err(|_| DecodeError::InvalidEscape { escape: escape.to_string() })?;
                decoded.push(value);
                i += 3;
            }
            b'+' if from_form => {
                decoded.push(b' ');
                i += 1;
            }
            byte => {
                decoded.push(byte);
                i += 1;
            }
        }
    }

    Ok(decoded)
}

fn decode_component(input: &str) -> Result<String, DecodeError> {
    String::from_utf8(percent_decode(input, true)?).map_err(|_| DecodeError::Utf8)
}

/// Parses an `application/x-www-form-urlencoded` body into ordered pairs.
///
/// Same key semantics as the request query string: insertion order preserved,
/// duplicate keys update in place, last occurrence wins.
pub fn parse_form(raw: &str) -> Result<Vec<(String, String)>, DecodeError> {
    let mut pairs: Vec<(String, String)> = Vec::new();

    for item in raw.split('&') {
        if item.is_empty() {
            continue;
        }
        let (key, value) = item.split_once('=').unwrap_or((item, ""));
        let key = decode_component(key)?;
        let value = decode_component(value)?;
        match pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => pairs.push((key, value)),
        }
    }

    Ok(pairs)
}
