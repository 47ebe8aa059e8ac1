//! Byte ⇄ Symbol Index Packing
//!
//! Each source byte carries four 2-bit symbol indices, most-significant pair
//! first:
//!
//! ```text
//!   byte 0b10_01_11_00  ──►  [2, 1, 3, 0]
//! ```
//!
//! Packing reverses this. A trailing group of fewer than four indices is
//! zero-padded into one final byte rather than dropped, so
//! `unpack(pack(x))` always starts with `x`.
//!
//! ## Example
//!
//! ```rust
//! use mimo_core::bit_packing::IndexPacker;
//!
//! let indices = IndexPacker.unpack(&[0b1001_1100]);
//! assert_eq!(indices, vec![2, 1, 3, 0]);
//! assert_eq!(IndexPacker.pack(&indices).unwrap(), vec![0b1001_1100]);
//! ```

use std::path::Path;

use crate::symbol_mapping::BITS_PER_SYMBOL;
use crate::types::{MimoError, MimoResult, SymbolIndex};

/// Symbol indices per byte.
pub const INDICES_PER_BYTE: usize = 8 / BITS_PER_SYMBOL;

/// 2-bit index packer/unpacker.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexPacker;

impl IndexPacker {
    /// Split bytes into symbol indices, MSB pair first.
    pub fn unpack(&self, bytes: &[u8]) -> Vec<SymbolIndex> {
        let mut output = Vec::with_capacity(bytes.len() * INDICES_PER_BYTE);
        for &byte in bytes {
            for i in 0..INDICES_PER_BYTE {
                let shift = (INDICES_PER_BYTE - 1 - i) * BITS_PER_SYMBOL;
                output.push((byte >> shift) & 0b11);
            }
        }
        output
    }

    /// Pack indices back into bytes, MSB pair first.
    ///
    /// A final partial group is zero-filled. Indices above 3 are rejected.
    pub fn pack(&self, indices: &[SymbolIndex]) -> MimoResult<Vec<u8>> {
        let mut output = Vec::with_capacity(indices.len().div_ceil(INDICES_PER_BYTE));
        for (chunk_idx, chunk) in indices.chunks(INDICES_PER_BYTE).enumerate() {
            let mut byte = 0u8;
            for (i, &index) in chunk.iter().enumerate() {
                if index > 0b11 {
                    return Err(MimoError::InvalidSymbolIndex {
                        index,
                        position: chunk_idx * INDICES_PER_BYTE + i,
                    });
                }
                byte |= index << ((INDICES_PER_BYTE - 1 - i) * BITS_PER_SYMBOL);
            }
            output.push(byte);
        }
        Ok(output)
    }
}

/// Read a file and unpack its bytes into symbol indices.
pub fn read_index_file(path: impl AsRef<Path>) -> MimoResult<Vec<SymbolIndex>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| MimoError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read source file");
    Ok(IndexPacker.unpack(&bytes))
}

/// Pack symbol indices and write them to a file.
pub fn write_index_file(path: impl AsRef<Path>, indices: &[SymbolIndex]) -> MimoResult<()> {
    let path = path.as_ref();
    let bytes = IndexPacker.pack(indices)?;
    std::fs::write(path, &bytes).map_err(|source| MimoError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote recovered file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_msb_first() {
        assert_eq!(IndexPacker.unpack(&[0x1B]), vec![0, 1, 2, 3]);
        assert_eq!(IndexPacker.unpack(&[0xFF, 0x00]), vec![3, 3, 3, 3, 0, 0, 0, 0]);
    }

    #[test]
    fn test_bytes_roundtrip() {
        let bytes: Vec<u8> = (0..=255).collect();
        let indices = IndexPacker.unpack(&bytes);
        assert_eq!(indices.len(), 256 * 4);
        assert_eq!(IndexPacker.pack(&indices).unwrap(), bytes);
    }

    #[test]
    fn test_partial_tail_is_zero_filled() {
        assert_eq!(IndexPacker.pack(&[3, 2, 1, 0, 3]).unwrap(), vec![0xE4, 0xC0]);
        assert_eq!(IndexPacker.pack(&[1, 1]).unwrap(), vec![0x50]);
    }

    #[test]
    fn test_pack_rejects_wide_index() {
        let err = IndexPacker.pack(&[0, 1, 2, 3, 0, 9]).unwrap_err();
        match err {
            MimoError::InvalidSymbolIndex { index, position } => {
                assert_eq!(index, 9);
                assert_eq!(position, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty() {
        assert!(IndexPacker.unpack(&[]).is_empty());
        assert!(IndexPacker.pack(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = read_index_file("/nonexistent/mimo/input.bin").unwrap_err();
        assert!(matches!(err, MimoError::FileAccess { .. }));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = std::env::temp_dir().join(format!("mimo-core-bitpack-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("frame.bin");
        write_index_file(&path, &[2, 1, 3, 0, 0, 0, 0, 3]).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![0x9C, 0x03]);
        assert_eq!(read_index_file(&path).unwrap(), vec![2, 1, 3, 0, 0, 0, 0, 3]);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
