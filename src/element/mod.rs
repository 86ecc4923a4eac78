mod compare;
mod element_type;
mod scalar;

pub use compare::CompareOp;
pub use element_type::ElementType;
pub use scalar::{Element, Scalar};
