// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use super::{F32Matrix, NpyError, MAGIC};
use bytes::Buf;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ByteOrder {
    Little,
    Big,
}

#[derive(Debug, Clone, PartialEq)]
struct Header {
    order: ByteOrder,
    shape: Vec<usize>,
}

pub struct NpyDecoder;

impl NpyDecoder {
    /// Decode a two-dimensional float32 npy file (format versions 1.0 to 3.0).
    pub fn decode_f32_matrix(data: &[u8]) -> Result<F32Matrix, NpyError> {
        let mut buf = data;

        if buf.remaining() < MAGIC.len() + 2 || &buf[..MAGIC.len()] != MAGIC {
            return Err(NpyError::BadMagic);
        }
        buf.advance(MAGIC.len());

        let major = buf.get_u8();
        let minor = buf.get_u8();
        let header_len = match (major, minor) {
            (1, 0) if buf.remaining() >= 2 => buf.get_u16_le() as usize,
            (2, 0) | (3, 0) if buf.remaining() >= 4 => buf.get_u32_le() as usize,
            (1, 0) | (2, 0) | (3, 0) => {
                return Err(NpyError::MalformedHeader("truncated preamble".to_string()))
            }
            _ => return Err(NpyError::UnsupportedVersion { major, minor }),
        };

        if buf.remaining() < header_len {
            return Err(NpyError::MalformedHeader(format!(
                "header declares {} bytes, only {} present",
                header_len,
                buf.remaining()
            )));
        }
        let header_text = std::str::from_utf8(&buf[..header_len])
            .map_err(|e| NpyError::MalformedHeader(e.to_string()))?;
        let header = parse_header(header_text)?;
        buf.advance(header_len);

        let (rows, cols) = match header.shape.as_slice() {
            [rows, cols] => (*rows, *cols),
            other => {
                return Err(NpyError::MalformedHeader(format!(
                    "expected a 2-dimensional shape, got {} dimensions",
                    other.len()
                )))
            }
        };

        let expected = rows
            .checked_mul(cols)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| NpyError::MalformedHeader("shape overflows".to_string()))?;
        if buf.remaining() != expected {
            return Err(NpyError::DataLength {
                expected,
                actual: buf.remaining(),
            });
        }

        let mut values = Vec::with_capacity(rows * cols);
        while buf.has_remaining() {
            values.push(match header.order {
                ByteOrder::Little => buf.get_f32_le(),
                ByteOrder::Big => buf.get_f32(),
            });
        }

        Ok(F32Matrix::new(rows, cols, values))
    }
}

fn parse_header(text: &str) -> Result<Header, NpyError> {
    let descr = quoted_value(dict_value(text, "descr")?)?;
    let order = match descr {
        "<f4" => ByteOrder::Little,
        ">f4" => ByteOrder::Big,
        other => return Err(NpyError::UnsupportedDtype(other.to_string())),
    };

    let fortran = dict_value(text, "fortran_order")?;
    if fortran.starts_with("True") {
        return Err(NpyError::FortranOrder);
    }
    if !fortran.starts_with("False") {
        return Err(NpyError::MalformedHeader(
            "fortran_order must be True or False".to_string(),
        ));
    }

    let shape = tuple_value(dict_value(text, "shape")?)?;

    Ok(Header { order, shape })
}

/// Text following `'key':` in the header dict literal.
fn dict_value<'a>(text: &'a str, key: &str) -> Result<&'a str, NpyError> {
    let start = [format!("'{}'", key), format!("\"{}\"", key)]
        .iter()
        .find_map(|quoted| text.find(quoted.as_str()).map(|pos| pos + quoted.len()))
        .ok_or_else(|| NpyError::MalformedHeader(format!("missing key '{}'", key)))?;

    text[start..]
        .trim_start()
        .strip_prefix(':')
        .map(str::trim_start)
        .ok_or_else(|| NpyError::MalformedHeader(format!("missing ':' after '{}'", key)))
}

fn quoted_value(text: &str) -> Result<&str, NpyError> {
    let quote = text
        .chars()
        .next()
        .filter(|c| *c == '\'' || *c == '"')
        .ok_or_else(|| NpyError::MalformedHeader("descr must be a string".to_string()))?;
    let rest = &text[1..];
    let end = rest
        .find(quote)
        .ok_or_else(|| NpyError::MalformedHeader("unterminated descr string".to_string()))?;
    Ok(&rest[..end])
}

fn tuple_value(text: &str) -> Result<Vec<usize>, NpyError> {
    let inner = text
        .strip_prefix('(')
        .and_then(|rest| rest.find(')').map(|end| &rest[..end]))
        .ok_or_else(|| NpyError::MalformedHeader("shape must be a tuple".to_string()))?;

    inner
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<usize>()
                .map_err(|_| NpyError::MalformedHeader(format!("invalid shape entry {:?}", part)))
        })
        .collect()
}
