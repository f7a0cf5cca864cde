// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use super::{DESCR_F32_LE, HEADER_ALIGN, MAGIC};
use bytes::{BufMut, BytesMut};

/// Bytes preceding the header dict in a version 1.0 file.
pub(crate) const PREAMBLE_LEN: usize = 10;

pub struct NpyEncoder;

impl NpyEncoder {
    /// Encode a row-major `rows × cols` buffer as an npy v1.0 file.
    pub fn encode_f32_matrix(rows: usize, cols: usize, data: &[f32]) -> Vec<u8> {
        let header = Self::header_dict(rows, cols);

        let mut buf = BytesMut::with_capacity(PREAMBLE_LEN + header.len() + data.len() * 4);
        buf.put_slice(MAGIC);
        buf.put_u8(1);
        buf.put_u8(0);
        buf.put_u16_le(header.len() as u16);
        buf.put_slice(header.as_bytes());
        for value in data {
            buf.put_f32_le(*value);
        }
        buf.to_vec()
    }

    /// Dict literal padded with spaces and terminated by a newline so the
    /// data section starts on a [`HEADER_ALIGN`] boundary.
    fn header_dict(rows: usize, cols: usize) -> String {
        let mut header = format!(
            "{{'descr': '{}', 'fortran_order': False, 'shape': ({}, {}), }}",
            DESCR_F32_LE, rows, cols
        );
        let unpadded = PREAMBLE_LEN + header.len() + 1;
        let padding = (HEADER_ALIGN - unpadded % HEADER_ALIGN) % HEADER_ALIGN;
        header.extend(std::iter::repeat(' ').take(padding));
        header.push('\n');
        header
    }
}
