use std::mem::size_of;

use crate::utils::error::{BoxError, Result};

/// Owned block whose allocation only ever grows.
///
/// `len` is the logical size; the block length is the capacity (high-water
/// mark). Shrinking only moves `len`, growing allocates a block of exactly the
/// requested length and copies the live prefix across.
#[derive(Debug)]
pub struct TrackedBuffer<T> {
    block: Box<[T]>,
    len: usize,
}

impl<T: Copy + Default> TrackedBuffer<T> {
    pub fn new() -> Self {
        Self {
            block: Box::default(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Capacity in elements of `T`.
    pub fn capacity(&self) -> usize {
        self.block.len()
    }

    pub fn capacity_bytes(&self) -> usize {
        self.block.len() * size_of::<T>()
    }

    pub fn is_allocated(&self) -> bool {
        !self.block.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.block[..self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.block[..self.len]
    }

    pub fn as_ptr(&self) -> *const T {
        self.block.as_ptr()
    }

    pub fn ensure_capacity(&mut self, new_len: usize) -> Result<()> {
        if new_len <= self.capacity() {
            self.len = new_len;
            return Ok(());
        }

        let mut grown: Vec<T> = Vec::new();
        grown
            .try_reserve_exact(new_len)
            .map_err(|_| BoxError::AllocationFailure {
                requested: new_len.saturating_mul(size_of::<T>()),
            })?;

        let keep = self.len.min(new_len);
        grown.extend_from_slice(&self.block[..keep]);
        grown.resize(new_len, T::default());

        tracing::trace!(
            old_capacity = self.capacity(),
            new_capacity = new_len,
            kept = keep,
            "tracked buffer grown"
        );

        self.block = grown.into_boxed_slice();
        self.len = new_len;
        Ok(())
    }

    /// Make the logical content equal to `src`, reusing capacity when possible.
    pub fn assign(&mut self, src: &[T]) -> Result<()> {
        self.ensure_capacity(src.len())?;
        self.as_mut_slice().copy_from_slice(src);
        Ok(())
    }

    pub fn release(&mut self) {
        self.block = Box::default();
        self.len = 0;
    }

    /// Independent copy holding only the live prefix.
    pub fn try_clone(&self) -> Result<Self> {
        let mut out = Self::new();
        out.assign(self.as_slice())?;
        Ok(out)
    }
}

impl<T: Copy + Default> Default for TrackedBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}
