// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! NumPy `.npy` codec for two-dimensional `f32` buffers.

pub mod decoder;
pub mod encoder;

pub use decoder::NpyDecoder;
pub use encoder::NpyEncoder;

use thiserror::Error;

pub const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Total preamble + header length is padded to a multiple of this.
pub const HEADER_ALIGN: usize = 64;

pub const DESCR_F32_LE: &str = "<f4";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NpyError {
    #[error("Not an npy file: bad magic string")]
    BadMagic,

    #[error("Unsupported npy format version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("Malformed npy header: {0}")]
    MalformedHeader(String),

    #[error("Unsupported dtype {0}, expected float32")]
    UnsupportedDtype(String),

    #[error("Fortran-ordered arrays are not supported")]
    FortranOrder,

    #[error("Data length mismatch: expected {expected} bytes, found {actual}")]
    DataLength { expected: usize, actual: usize },
}

/// Row-major `rows × cols` matrix of `f32`.
#[derive(Debug, Clone, PartialEq)]
pub struct F32Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f32>,
}

impl F32Matrix {
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(rows * cols, data.len());
        Self { rows, cols, data }
    }
}
