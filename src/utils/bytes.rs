use std::mem::size_of;

use crate::utils::error::{BoxError, Result};

pub(crate) fn check_len(len: usize, expected: usize) -> Result<()> {
    if len < expected {
        return Err(BoxError::BufferSizeMismatch {
            expected,
            actual: len,
        });
    }
    Ok(())
}

/// Read a plain value from the front of `bytes`, regardless of alignment.
///
/// Element blocks are stored as raw bytes, so slots are not guaranteed to be
/// aligned for `T`.
pub fn read_pod<T: bytemuck::Pod>(bytes: &[u8]) -> Result<T> {
    check_len(bytes.len(), size_of::<T>())?;
    Ok(bytemuck::pod_read_unaligned(&bytes[..size_of::<T>()]))
}

/// Write a plain value into the front of `out`.
pub fn write_pod<T: bytemuck::Pod>(value: T, out: &mut [u8]) -> Result<()> {
    check_len(out.len(), size_of::<T>())?;
    out[..size_of::<T>()].copy_from_slice(bytemuck::bytes_of(&value));
    Ok(())
}
