//! nbox - runtime-typed, variable-rank n-dimensional buffers
//!
//! An [`NdBox`] owns a row-major block of elements whose type, rank and
//! extents are chosen at runtime. Boxes can be resized with capacity reuse,
//! converted between element types, walked with strided per-axis cursors,
//! and compared elementwise into Bool boxes.

pub mod config;

pub mod element;

pub mod nbox;

pub mod utils;

pub use config::BoxConfig;
pub use element::{CompareOp, Element, ElementType, Scalar};
pub use nbox::{
    AllocState, BoxCursor, BoxDesc, BoxSlice, Device, DeviceExt, EXT_SIZE, NdBox, format_slices,
    parse_slices,
};
pub use utils::error::{BoxError, Result};
