use std::fmt;

const PREFIX_BOOLEAN: u16 = 1;
const PREFIX_SIGNED: u16 = 3;
const PREFIX_UNSIGNED: u16 = 4;
const PREFIX_FLOATING: u16 = 5;

const fn make_code(prefix: u16, bits: u16) -> u16 {
    (prefix << 8) | bits
}

/// Runtime tag for the primitive stored in each slot of a box.
///
/// The discriminant is the stable 16-bit code: high byte is the kind
/// (bool/signed/unsigned/floating), low byte is the bit width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ElementType {
    #[default]
    None = 0,
    Bool = make_code(PREFIX_BOOLEAN, 8),
    Int8 = make_code(PREFIX_SIGNED, 8),
    Int16 = make_code(PREFIX_SIGNED, 16),
    Int32 = make_code(PREFIX_SIGNED, 32),
    Int64 = make_code(PREFIX_SIGNED, 64),
    UInt8 = make_code(PREFIX_UNSIGNED, 8),
    UInt16 = make_code(PREFIX_UNSIGNED, 16),
    UInt32 = make_code(PREFIX_UNSIGNED, 32),
    UInt64 = make_code(PREFIX_UNSIGNED, 64),
    Float32 = make_code(PREFIX_FLOATING, 32),
    Float64 = make_code(PREFIX_FLOATING, 64),
}

impl ElementType {
    /// Every creatable element type, in registry order.
    pub const ALL: [ElementType; 11] = [
        ElementType::Bool,
        ElementType::Int8,
        ElementType::Int16,
        ElementType::Int32,
        ElementType::Int64,
        ElementType::UInt8,
        ElementType::UInt16,
        ElementType::UInt32,
        ElementType::UInt64,
        ElementType::Float32,
        ElementType::Float64,
    ];

    pub fn code(self) -> u16 {
        self as u16
    }

    /// Unknown codes map to `None` rather than failing.
    pub fn from_code(code: u16) -> ElementType {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.code() == code)
            .unwrap_or(ElementType::None)
    }

    pub fn is_supported(self) -> bool {
        !matches!(self, ElementType::None)
    }

    pub fn byte_width(self) -> usize {
        match self {
            ElementType::None => 0,
            ElementType::Bool => 1,
            ElementType::Int8 | ElementType::UInt8 => 1,
            ElementType::Int16 | ElementType::UInt16 => 2,
            ElementType::Int32 | ElementType::UInt32 | ElementType::Float32 => 4,
            ElementType::Int64 | ElementType::UInt64 | ElementType::Float64 => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementType::None => "NONE",
            ElementType::Bool => "BOOL",
            ElementType::Int8 => "INT8",
            ElementType::Int16 => "INT16",
            ElementType::Int32 => "INT32",
            ElementType::Int64 => "INT64",
            ElementType::UInt8 => "UINT8",
            ElementType::UInt16 => "UINT16",
            ElementType::UInt32 => "UINT32",
            ElementType::UInt64 => "UINT64",
            ElementType::Float32 => "FLOAT32",
            ElementType::Float64 => "FLOAT64",
        }
    }

    pub fn is_bool(self) -> bool {
        self.code() >> 8 == PREFIX_BOOLEAN
    }

    pub fn is_signed(self) -> bool {
        self.code() >> 8 == PREFIX_SIGNED
    }

    pub fn is_unsigned(self) -> bool {
        self.code() >> 8 == PREFIX_UNSIGNED
    }

    pub fn is_float(self) -> bool {
        self.code() >> 8 == PREFIX_FLOATING
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
