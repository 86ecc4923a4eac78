use super::{NdBox, device::Device, device::cpu::cpu_set};
use crate::{
    element::{Element, ElementType, Scalar},
    utils::error::{BoxError, Result},
};

impl NdBox {
    fn check_access(&self, device: Device) -> Result<()> {
        if !self.element_type.is_supported() {
            return Err(BoxError::UnknownType(self.element_type));
        }
        device.ensure_supported()?;
        self.device.ensure_supported()
    }

    fn slot_range(&self, offset: usize) -> Result<std::ops::Range<usize>> {
        let len = self.size();
        if offset >= len {
            return Err(BoxError::IndexOutOfBounds { index: offset, len });
        }
        let width = self.element_type.byte_width();
        Ok(offset * width..(offset + 1) * width)
    }

    /// Bytes of the element at linear `offset`.
    pub fn element_bytes(&self, offset: usize) -> Result<&[u8]> {
        self.check_access(self.device)?;
        let range = self.slot_range(offset)?;
        Ok(&self.data.as_slice()[range])
    }

    /// Convert one element from `src` (interpreted as `src_type`) into the
    /// slot at `offset`.
    pub fn set_offset_raw(
        &mut self,
        offset: usize,
        src: &[u8],
        src_type: ElementType,
        device: Device,
    ) -> Result<()> {
        self.check_access(device)?;
        if !src_type.is_supported() {
            return Err(BoxError::UnknownType(src_type));
        }
        if src.len() < src_type.byte_width() {
            return Err(BoxError::BufferSizeMismatch {
                expected: src_type.byte_width(),
                actual: src.len(),
            });
        }

        let range = self.slot_range(offset)?;
        let ty = self.element_type;
        cpu_set(&mut self.data.as_mut_slice()[range], ty, src, src_type)
    }

    /// Convert the slot at `offset` into `dst` as `dst_type`.
    pub fn get_offset_raw(
        &self,
        offset: usize,
        dst: &mut [u8],
        dst_type: ElementType,
        device: Device,
    ) -> Result<()> {
        self.check_access(device)?;
        if !dst_type.is_supported() {
            return Err(BoxError::UnknownType(dst_type));
        }
        if dst.len() < dst_type.byte_width() {
            return Err(BoxError::BufferSizeMismatch {
                expected: dst_type.byte_width(),
                actual: dst.len(),
            });
        }

        let range = self.slot_range(offset)?;
        cpu_set(dst, dst_type, &self.data.as_slice()[range], self.element_type)
    }

    pub fn set_raw(
        &mut self,
        indices: &[usize],
        src: &[u8],
        src_type: ElementType,
        device: Device,
    ) -> Result<()> {
        let offset = self.desc.linear_offset(indices)?;
        self.set_offset_raw(offset, src, src_type, device)
    }

    pub fn get_raw(
        &self,
        indices: &[usize],
        dst: &mut [u8],
        dst_type: ElementType,
        device: Device,
    ) -> Result<()> {
        let offset = self.desc.linear_offset(indices)?;
        self.get_offset_raw(offset, dst, dst_type, device)
    }

    pub fn set_offset<T: Element>(&mut self, offset: usize, value: T) -> Result<()> {
        self.check_access(self.device)?;
        let range = self.slot_range(offset)?;
        let ty = self.element_type;
        value.to_scalar().write(ty, &mut self.data.as_mut_slice()[range])
    }

    pub fn get_offset<T: Element>(&self, offset: usize) -> Result<T> {
        self.get_scalar(offset).map(Scalar::cast)
    }

    /// Element at `offset` widened to a [`Scalar`].
    pub fn get_scalar(&self, offset: usize) -> Result<Scalar> {
        Scalar::read(self.element_type, self.element_bytes(offset)?)
    }

    pub fn set<T: Element>(&mut self, indices: &[usize], value: T) -> Result<()> {
        let offset = self.desc.linear_offset(indices)?;
        self.set_offset(offset, value)
    }

    pub fn get<T: Element>(&self, indices: &[usize]) -> Result<T> {
        let offset = self.desc.linear_offset(indices)?;
        self.get_offset(offset)
    }
}
