pub mod bytes;
pub mod error;

pub use bytes::{read_pod, write_pod};
