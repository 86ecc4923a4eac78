use std::cmp::Ordering;
use std::fmt::Debug;

use super::element_type::ElementType;
use crate::utils::{
    bytes::{check_len, read_pod, write_pod},
    error::{BoxError, Result},
};

/// Lossless carrier for one element of any supported type.
///
/// Every primitive widens into one of these four variants without losing
/// information, so converting `src -> Scalar -> dst` gives exactly the same
/// result as a direct `as` cast between the two primitives.
#[derive(Clone, Copy, Debug)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Scalar {
    /// Decode the element stored at the front of `bytes` as `ty`.
    pub fn read(ty: ElementType, bytes: &[u8]) -> Result<Scalar> {
        let value = match ty {
            ElementType::None => return Err(BoxError::UnknownType(ty)),
            ElementType::Bool => bool::read_bytes(bytes)?.to_scalar(),
            ElementType::Int8 => i8::read_bytes(bytes)?.to_scalar(),
            ElementType::Int16 => i16::read_bytes(bytes)?.to_scalar(),
            ElementType::Int32 => i32::read_bytes(bytes)?.to_scalar(),
            ElementType::Int64 => i64::read_bytes(bytes)?.to_scalar(),
            ElementType::UInt8 => u8::read_bytes(bytes)?.to_scalar(),
            ElementType::UInt16 => u16::read_bytes(bytes)?.to_scalar(),
            ElementType::UInt32 => u32::read_bytes(bytes)?.to_scalar(),
            ElementType::UInt64 => u64::read_bytes(bytes)?.to_scalar(),
            ElementType::Float32 => f32::read_bytes(bytes)?.to_scalar(),
            ElementType::Float64 => f64::read_bytes(bytes)?.to_scalar(),
        };
        Ok(value)
    }

    /// Cast into `ty` and encode at the front of `out`.
    pub fn write(self, ty: ElementType, out: &mut [u8]) -> Result<()> {
        match ty {
            ElementType::None => return Err(BoxError::UnknownType(ty)),
            ElementType::Bool => bool::from_scalar(self).write_bytes(out)?,
            ElementType::Int8 => i8::from_scalar(self).write_bytes(out)?,
            ElementType::Int16 => i16::from_scalar(self).write_bytes(out)?,
            ElementType::Int32 => i32::from_scalar(self).write_bytes(out)?,
            ElementType::Int64 => i64::from_scalar(self).write_bytes(out)?,
            ElementType::UInt8 => u8::from_scalar(self).write_bytes(out)?,
            ElementType::UInt16 => u16::from_scalar(self).write_bytes(out)?,
            ElementType::UInt32 => u32::from_scalar(self).write_bytes(out)?,
            ElementType::UInt64 => u64::from_scalar(self).write_bytes(out)?,
            ElementType::Float32 => f32::from_scalar(self).write_bytes(out)?,
            ElementType::Float64 => f64::from_scalar(self).write_bytes(out)?,
        }
        Ok(())
    }

    pub fn cast<T: Element>(self) -> T {
        T::from_scalar(self)
    }

    fn as_i128(self) -> Option<i128> {
        match self {
            Scalar::Bool(v) => Some(v as i128),
            Scalar::Int(v) => Some(v as i128),
            Scalar::UInt(v) => Some(v as i128),
            Scalar::Float(_) => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Scalar::Bool(v) => v as u8 as f64,
            Scalar::Int(v) => v as f64,
            Scalar::UInt(v) => v as f64,
            Scalar::Float(v) => v,
        }
    }
}

// Integers compare exactly across signedness; anything involving a float
// compares in f64, so NaN is unordered against everything.
impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.as_i128(), other.as_i128()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

/// A primitive that can live in a box slot.
pub trait Element: Copy + Debug + Default + PartialOrd + Send + Sync + 'static {
    const TYPE: ElementType;

    fn to_scalar(self) -> Scalar;
    fn from_scalar(value: Scalar) -> Self;
    fn read_bytes(bytes: &[u8]) -> Result<Self>;
    fn write_bytes(self, out: &mut [u8]) -> Result<()>;
}

macro_rules! impl_element {
    ($t:ty, $ty:expr, $variant:ident, $wide:ty) => {
        impl Element for $t {
            const TYPE: ElementType = $ty;

            fn to_scalar(self) -> Scalar {
                Scalar::$variant(self as $wide)
            }

            fn from_scalar(value: Scalar) -> Self {
                match value {
                    Scalar::Bool(v) => v as u8 as $t,
                    Scalar::Int(v) => v as $t,
                    Scalar::UInt(v) => v as $t,
                    Scalar::Float(v) => v as $t,
                }
            }

            fn read_bytes(bytes: &[u8]) -> Result<Self> {
                read_pod::<$t>(bytes)
            }

            fn write_bytes(self, out: &mut [u8]) -> Result<()> {
                write_pod::<$t>(self, out)
            }
        }
    };
}

impl_element!(i8, ElementType::Int8, Int, i64);
impl_element!(i16, ElementType::Int16, Int, i64);
impl_element!(i32, ElementType::Int32, Int, i64);
impl_element!(i64, ElementType::Int64, Int, i64);
impl_element!(u8, ElementType::UInt8, UInt, u64);
impl_element!(u16, ElementType::UInt16, UInt, u64);
impl_element!(u32, ElementType::UInt32, UInt, u64);
impl_element!(u64, ElementType::UInt64, UInt, u64);
impl_element!(f32, ElementType::Float32, Float, f64);
impl_element!(f64, ElementType::Float64, Float, f64);

// bool is not Pod; it is stored as a single 0/1 byte.
impl Element for bool {
    const TYPE: ElementType = ElementType::Bool;

    fn to_scalar(self) -> Scalar {
        Scalar::Bool(self)
    }

    fn from_scalar(value: Scalar) -> Self {
        match value {
            Scalar::Bool(v) => v,
            Scalar::Int(v) => v != 0,
            Scalar::UInt(v) => v != 0,
            Scalar::Float(v) => v != 0.0,
        }
    }

    fn read_bytes(bytes: &[u8]) -> Result<Self> {
        check_len(bytes.len(), 1)?;
        Ok(bytes[0] != 0)
    }

    fn write_bytes(self, out: &mut [u8]) -> Result<()> {
        check_len(out.len(), 1)?;
        out[0] = self as u8;
        Ok(())
    }
}
