mod access;
pub mod buffer;
mod compare;
pub mod cursor;
pub mod desc;
pub mod device;
#[allow(clippy::module_inception)]
mod nbox;
mod traverse;

pub use buffer::TrackedBuffer;
pub use cursor::{BoxCursor, BoxSlice, CursorOffsets, format_slices, parse_slices};
pub use desc::BoxDesc;
pub use device::{Device, DeviceExt, EXT_SIZE};
pub use nbox::{AllocState, NdBox};
