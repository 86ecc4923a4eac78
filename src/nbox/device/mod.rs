pub mod cpu;

use std::fmt;

use crate::utils::error::{BoxError, Result};

/// Number of opaque backend slots carried by every box.
pub const EXT_SIZE: usize = 4;

/// Backend-specific parameters (e.g. a stream handle). Inert on CPU.
pub type DeviceExt = [u32; EXT_SIZE];

/// Compute backend that owns a box's element block.
///
/// Only `Cpu` executes today; the other tags are recognized so that callers
/// get a clean `UnknownDevice` instead of a silent fallback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Device {
    #[default]
    None = 0,
    Cpu = 1,
    Cuda = 2,
    Cl = 3,
    Glsl = 4,
}

impl Device {
    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn from_code(code: u16) -> Device {
        match code {
            1 => Device::Cpu,
            2 => Device::Cuda,
            3 => Device::Cl,
            4 => Device::Glsl,
            _ => Device::None,
        }
    }

    pub fn is_supported(self) -> bool {
        matches!(self, Device::Cpu)
    }

    pub fn name(self) -> &'static str {
        match self {
            Device::None => "NONE",
            Device::Cpu => "CPU",
            Device::Cuda => "CUDA",
            Device::Cl => "CL",
            Device::Glsl => "GLSL",
        }
    }

    pub(crate) fn ensure_supported(self) -> Result<()> {
        if self.is_supported() {
            Ok(())
        } else {
            Err(BoxError::UnknownDevice(self))
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_cpu_executes() {
        assert!(Device::Cpu.is_supported());
        for dev in [Device::None, Device::Cuda, Device::Cl, Device::Glsl] {
            assert!(!dev.is_supported());
            assert_eq!(dev.ensure_supported(), Err(BoxError::UnknownDevice(dev)));
        }
    }

    #[test]
    fn test_codes_and_names() {
        assert_eq!(Device::from_code(Device::Cuda.code()), Device::Cuda);
        assert_eq!(Device::from_code(99), Device::None);
        assert_eq!(Device::Cpu.to_string(), "CPU");
        assert_eq!(Device::Cl.name(), "CL");
    }
}
