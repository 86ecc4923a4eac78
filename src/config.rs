use rand::{SeedableRng, rngs::StdRng};

use crate::nbox::{Device, DeviceExt, EXT_SIZE};
use crate::utils::error::{BoxError, Result};

/// Placement and RNG defaults for boxes built through the config-driven
/// constructors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoxConfig {
    pub device: Device,
    pub ext: DeviceExt,
    pub seed: Option<u64>,
}

impl BoxConfig {
    /// Validate the config and pin a seed so that random fills are
    /// reproducible from the returned value.
    pub fn build(mut self) -> Result<Self> {
        self.validate()?;
        if self.seed.is_none() {
            self.seed = Some(rand::random());
        }
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if matches!(self.device, Device::None) {
            return Err(BoxError::InvalidConfig(
                "Device must be set to a concrete backend".to_string(),
            ));
        }
        self.device.ensure_supported()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Seeded generator if a seed is set, otherwise one from OS entropy.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

impl Default for BoxConfig {
    fn default() -> Self {
        Self {
            device: Device::Cpu,
            ext: [0; EXT_SIZE],
            seed: None,
        }
    }
}
