use thiserror::Error;

use crate::element::ElementType;
use crate::nbox::Device;

pub type Result<T> = std::result::Result<T, BoxError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoxError {
    #[error("Unknown element type: {0}")]
    UnknownType(ElementType),

    #[error("Unsupported device: {0}")]
    UnknownDevice(Device),

    #[error("Shape mismatch: {lhs:?} vs {rhs:?}")]
    ShapeMismatch { lhs: Vec<u32>, rhs: Vec<u32> },

    #[error("Out of memory: requested {requested} bytes")]
    AllocationFailure { requested: usize },

    #[error("Invalid slice on axis {axis}: start={start:?}, stop={stop:?}, step={step:?}")]
    InvalidSlice {
        axis: usize,
        start: Option<i32>,
        stop: Option<i32>,
        step: Option<i32>,
    },

    #[error("Malformed slice text on axis {axis}: {text:?}")]
    InvalidSliceText { axis: usize, text: String },

    #[error("Index rank mismatch: box has rank {expected}, got {actual} indices")]
    RankMismatch { expected: usize, actual: usize },

    #[error("Index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("Shape must have at least one dimension")]
    EmptyShape,

    #[error("Invalid axis {axis} for rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
