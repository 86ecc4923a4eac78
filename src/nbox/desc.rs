use super::buffer::TrackedBuffer;
use crate::utils::error::{BoxError, Result};

/// Rank and extents of a box, stored in their own capacity-tracked block.
#[derive(Debug, Default)]
pub struct BoxDesc {
    dims: TrackedBuffer<u32>,
}

impl BoxDesc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace rank and extents. Zero extents are accepted here.
    pub fn set_dims(&mut self, dims: &[u32]) -> Result<()> {
        self.dims.assign(dims)
    }

    pub fn dims(&self) -> &[u32] {
        self.dims.as_slice()
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn dim(&self, axis: usize) -> Option<u32> {
        self.dims().get(axis).copied()
    }

    pub fn num_elements(&self) -> usize {
        Self::total_size(self.dims())
    }

    /// Product of all extents, 0 for rank 0.
    pub fn total_size(dims: &[u32]) -> usize {
        if dims.is_empty() {
            return 0;
        }
        dims.iter().map(|d| *d as usize).product()
    }

    pub fn is_same_shape(&self, other: &BoxDesc) -> bool {
        self.dims() == other.dims()
    }

    /// Elements skipped by one step along `axis`.
    pub fn stride(&self, axis: usize) -> usize {
        self.dims()[axis + 1..].iter().map(|d| *d as usize).product()
    }

    // Row-major strides
    pub fn strides(&self) -> Vec<usize> {
        Self::compute_strides(self.dims())
    }

    pub fn compute_strides(dims: &[u32]) -> Vec<usize> {
        let mut s = vec![1; dims.len()];
        for i in (0..dims.len().saturating_sub(1)).rev() {
            s[i] = s[i + 1] * dims[i + 1] as usize;
        }
        s
    }

    /// Row-major offset; the first index is the most significant.
    pub fn linear_offset(&self, indices: &[usize]) -> Result<usize> {
        let dims = self.dims();
        if indices.len() != dims.len() || dims.is_empty() {
            return Err(BoxError::RankMismatch {
                expected: dims.len(),
                actual: indices.len(),
            });
        }

        let mut offset = 0usize;
        for (index, dim) in indices.iter().zip(dims) {
            let dim = *dim as usize;
            if *index >= dim {
                return Err(BoxError::IndexOutOfBounds { index: *index, len: dim });
            }
            offset = offset * dim + index;
        }
        Ok(offset)
    }

    pub fn unravel(&self, offset: usize) -> Vec<usize> {
        let mut rem = offset;
        Self::compute_strides(self.dims())
            .into_iter()
            .map(|stride| {
                let c = rem / stride;
                rem %= stride;
                c
            })
            .collect()
    }

    pub fn capacity_bytes(&self) -> usize {
        self.dims.capacity_bytes()
    }

    pub fn as_ptr(&self) -> *const u32 {
        self.dims.as_ptr()
    }

    pub fn is_allocated(&self) -> bool {
        self.dims.is_allocated()
    }

    pub fn release(&mut self) {
        self.dims.release();
    }

    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            dims: self.dims.try_clone()?,
        })
    }
}
