//! Host-memory kernels over raw element bytes.
//!
//! All slices here are type-erased; the accompanying `ElementType` says how to
//! interpret them. Short slices are reported as `BufferSizeMismatch`.

use crate::element::{CompareOp, ElementType, Scalar};
use crate::utils::{
    bytes::check_len,
    error::{BoxError, Result},
};

fn width_of(ty: ElementType) -> Result<usize> {
    if ty.is_supported() {
        Ok(ty.byte_width())
    } else {
        Err(BoxError::UnknownType(ty))
    }
}

/// Convert a single element.
pub fn cpu_set(
    dst: &mut [u8],
    dst_type: ElementType,
    src: &[u8],
    src_type: ElementType,
) -> Result<()> {
    Scalar::read(src_type, src)?.write(dst_type, dst)
}

/// Copy `count` elements, converting when the types differ.
pub fn cpu_element_copy(
    dst: &mut [u8],
    dst_type: ElementType,
    src: &[u8],
    src_type: ElementType,
    count: usize,
) -> Result<()> {
    let dst_width = width_of(dst_type)?;
    let src_width = width_of(src_type)?;
    let overflow = || BoxError::AllocationFailure {
        requested: usize::MAX,
    };
    check_len(dst.len(), count.checked_mul(dst_width).ok_or_else(overflow)?)?;
    check_len(src.len(), count.checked_mul(src_width).ok_or_else(overflow)?)?;

    if dst_type == src_type {
        let bytes = count * dst_width;
        dst[..bytes].copy_from_slice(&src[..bytes]);
        return Ok(());
    }

    for (d, s) in dst
        .chunks_exact_mut(dst_width)
        .zip(src.chunks_exact(src_width))
        .take(count)
    {
        cpu_set(d, dst_type, s, src_type)?;
    }
    Ok(())
}

/// Write `value` into every slot of `dst`.
pub fn cpu_fill(dst: &mut [u8], dst_type: ElementType, value: Scalar) -> Result<()> {
    let width = width_of(dst_type)?;
    let mut encoded = [0u8; 8];
    value.write(dst_type, &mut encoded)?;
    for slot in dst.chunks_exact_mut(width) {
        slot.copy_from_slice(&encoded[..width]);
    }
    Ok(())
}

/// Elementwise `lhs op rhs`, one 0/1 byte per element into `out`.
pub fn cpu_compare(
    op: CompareOp,
    lhs: &[u8],
    lhs_type: ElementType,
    rhs: &[u8],
    rhs_type: ElementType,
    out: &mut [u8],
) -> Result<()> {
    let lhs_width = width_of(lhs_type)?;
    let rhs_width = width_of(rhs_type)?;
    let count = lhs.len() / lhs_width;
    check_len(rhs.len(), count.saturating_mul(rhs_width))?;
    check_len(out.len(), count)?;

    for ((a, b), o) in lhs
        .chunks_exact(lhs_width)
        .zip(rhs.chunks_exact(rhs_width))
        .zip(out.iter_mut())
    {
        let a = Scalar::read(lhs_type, a)?;
        let b = Scalar::read(rhs_type, b)?;
        *o = op.apply(a, b) as u8;
    }
    Ok(())
}

/// Elementwise `lhs op value`.
pub fn cpu_compare_value(
    op: CompareOp,
    lhs: &[u8],
    lhs_type: ElementType,
    value: Scalar,
    out: &mut [u8],
) -> Result<()> {
    let lhs_width = width_of(lhs_type)?;
    check_len(out.len(), lhs.len() / lhs_width)?;
    for (a, o) in lhs.chunks_exact(lhs_width).zip(out.iter_mut()) {
        *o = op.apply(Scalar::read(lhs_type, a)?, value) as u8;
    }
    Ok(())
}
