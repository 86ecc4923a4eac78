use rand::distr::{Distribution, Uniform};

use crate::{
    config::BoxConfig,
    element::{Element, ElementType, Scalar},
    nbox::{
        buffer::TrackedBuffer,
        desc::BoxDesc,
        device::{
            Device, DeviceExt,
            cpu::{cpu_element_copy, cpu_fill},
        },
    },
    utils::error::{BoxError, Result},
};

/// Outcome of [`NdBox::allocate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocState {
    /// The box was empty and now holds fresh buffers.
    Allocated,
    /// The box already held data; its type, device and shape were replaced.
    AlreadyAllocated,
}

/// Runtime-typed, variable-rank, resizable n-dimensional buffer.
///
/// Owns three independent capacity-tracked blocks: element bytes, extents,
/// and free-form info bytes. None of them is ever shared with another box.
#[derive(Debug, Default)]
pub struct NdBox {
    pub(crate) element_type: ElementType,
    pub(crate) device: Device,
    pub(crate) ext: DeviceExt,
    pub(crate) data: TrackedBuffer<u8>,
    pub(crate) desc: BoxDesc,
    pub(crate) info: TrackedBuffer<u8>,
    /// One caller-owned scalar slot, carried through clones and slices.
    pub(crate) opaque: u64,
}

fn required_bytes(ty: ElementType, dims: &[u32]) -> Result<usize> {
    if dims.is_empty() {
        return Ok(0);
    }
    dims.iter()
        .try_fold(ty.byte_width(), |acc, d| acc.checked_mul(*d as usize))
        .ok_or(BoxError::AllocationFailure {
            requested: usize::MAX,
        })
}

fn check_type(ty: ElementType) -> Result<()> {
    if ty.is_supported() {
        Ok(())
    } else {
        Err(BoxError::UnknownType(ty))
    }
}

impl NdBox {
    /// An empty box: no buffers, `ElementType::None`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate fresh buffers for `ty`/`device`/`dims`, replacing any prior
    /// state. On failure the box is left exactly as it was.
    pub fn allocate(
        &mut self,
        ty: ElementType,
        device: Device,
        ext: Option<DeviceExt>,
        dims: &[u32],
    ) -> Result<AllocState> {
        check_type(ty)?;
        device.ensure_supported()?;
        if dims.is_empty() {
            return Err(BoxError::EmptyShape);
        }

        let mut desc = BoxDesc::new();
        desc.set_dims(dims)?;
        let mut data = TrackedBuffer::new();
        data.ensure_capacity(required_bytes(ty, dims)?)?;

        let state = if self.exists_data() {
            AllocState::AlreadyAllocated
        } else {
            AllocState::Allocated
        };

        self.element_type = ty;
        self.device = device;
        self.ext = ext.unwrap_or_default();
        self.data = data;
        self.desc = desc;

        tracing::debug!(ty = %ty, device = %device, ?dims, ?state, "box allocated");
        Ok(state)
    }

    /// Resize in place.
    ///
    /// A device or ext change starts over with fresh buffers; a type change
    /// replaces the element block; a same-type resize reuses capacity and
    /// keeps the live prefix of the element bytes. A rank-0 resize of an
    /// empty box leaves it empty.
    pub fn resize(
        &mut self,
        ty: ElementType,
        device: Device,
        ext: Option<DeviceExt>,
        dims: &[u32],
    ) -> Result<()> {
        check_type(ty)?;
        device.ensure_supported()?;
        let ext = ext.unwrap_or_default();

        if dims.is_empty() {
            if !self.data.is_allocated() && !self.desc.is_allocated() {
                return Ok(());
            }
            if ty != self.element_type || device != self.device || ext != self.ext {
                self.data.release();
            }
            self.desc.set_dims(dims)?;
            self.data.ensure_capacity(0)?;
            self.element_type = ty;
            self.device = device;
            self.ext = ext;
            return Ok(());
        }

        if !self.data.is_allocated() && !self.desc.is_allocated() {
            return self.allocate(ty, device, Some(ext), dims).map(|_| ());
        }

        if self.device != device || self.ext != ext {
            return self.allocate(ty, device, Some(ext), dims).map(|_| ());
        }

        let bytes = required_bytes(ty, dims)?;
        if ty != self.element_type {
            let mut data = TrackedBuffer::new();
            data.ensure_capacity(bytes)?;
            self.desc.set_dims(dims)?;
            self.data = data;
            self.element_type = ty;
        } else {
            let old_len = self.data.len();
            self.data.ensure_capacity(bytes)?;
            if let Err(e) = self.desc.set_dims(dims) {
                self.data.ensure_capacity(old_len)?;
                return Err(e);
            }
        }

        tracing::debug!(
            ty = %ty,
            ?dims,
            data_capacity = self.data.capacity_bytes(),
            "box resized"
        );
        Ok(())
    }

    /// Resize keeping the current type, device and ext.
    pub fn reshape(&mut self, dims: &[u32]) -> Result<()> {
        self.resize(self.element_type, self.device, Some(self.ext), dims)
    }

    /// Fully independent copy; never shares a block with `self`.
    #[tracing::instrument(
        level = "debug",
        skip(self),
        fields(ty = %self.element_type, size = self.size())
    )]
    pub fn try_clone(&self) -> Result<NdBox> {
        Ok(NdBox {
            element_type: self.element_type,
            device: self.device,
            ext: self.ext,
            data: self.data.try_clone()?,
            desc: self.desc.try_clone()?,
            info: self.info.try_clone()?,
            opaque: self.opaque,
        })
    }

    /// Copy converted to another element type.
    pub fn clone_as(&self, ty: ElementType) -> Result<NdBox> {
        if ty == self.element_type {
            return self.try_clone();
        }
        check_type(ty)?;
        check_type(self.element_type)?;

        let mut out = NdBox::new();
        out.allocate(ty, self.device, Some(self.ext), self.dims())?;
        cpu_element_copy(
            out.data.as_mut_slice(),
            ty,
            self.data.as_slice(),
            self.element_type,
            self.size(),
        )?;
        out.info.assign(self.info.as_slice())?;
        out.opaque = self.opaque;
        Ok(out)
    }

    /// Release all three buffers and return to the empty state.
    pub fn clear(&mut self) {
        tracing::debug!(ty = %self.element_type, size = self.size(), "box cleared");
        *self = NdBox::new();
    }

    // ------------------------------------------------------------------
    // Introspection

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn ext(&self) -> &DeviceExt {
        &self.ext
    }

    pub fn rank(&self) -> usize {
        self.desc.rank()
    }

    pub fn dim(&self, axis: usize) -> Option<u32> {
        self.desc.dim(axis)
    }

    pub fn dims(&self) -> &[u32] {
        self.desc.dims()
    }

    pub fn desc(&self) -> &BoxDesc {
        &self.desc
    }

    pub fn size(&self) -> usize {
        self.desc.num_elements()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_slice()
    }

    pub fn data_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    pub fn dims_ptr(&self) -> *const u32 {
        self.desc.as_ptr()
    }

    pub fn info_ptr(&self) -> *const u8 {
        self.info.as_ptr()
    }

    pub fn data_capacity_bytes(&self) -> usize {
        self.data.capacity_bytes()
    }

    pub fn dims_capacity_bytes(&self) -> usize {
        self.desc.capacity_bytes()
    }

    pub fn info_capacity_bytes(&self) -> usize {
        self.info.capacity_bytes()
    }

    pub fn info_size(&self) -> usize {
        self.info.len()
    }

    pub fn exists_data(&self) -> bool {
        !self.data.is_empty()
    }

    pub fn exists_dims(&self) -> bool {
        self.desc.rank() >= 1
    }

    pub fn exists_info(&self) -> bool {
        !self.info.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.exists_data()
    }

    pub fn is_bool(&self) -> bool {
        self.element_type == ElementType::Bool
    }

    pub fn is_int8(&self) -> bool {
        self.element_type == ElementType::Int8
    }

    pub fn is_int16(&self) -> bool {
        self.element_type == ElementType::Int16
    }

    pub fn is_int32(&self) -> bool {
        self.element_type == ElementType::Int32
    }

    pub fn is_int64(&self) -> bool {
        self.element_type == ElementType::Int64
    }

    pub fn is_uint8(&self) -> bool {
        self.element_type == ElementType::UInt8
    }

    pub fn is_uint16(&self) -> bool {
        self.element_type == ElementType::UInt16
    }

    pub fn is_uint32(&self) -> bool {
        self.element_type == ElementType::UInt32
    }

    pub fn is_uint64(&self) -> bool {
        self.element_type == ElementType::UInt64
    }

    pub fn is_float32(&self) -> bool {
        self.element_type == ElementType::Float32
    }

    pub fn is_float64(&self) -> bool {
        self.element_type == ElementType::Float64
    }

    pub fn is_signed(&self) -> bool {
        self.element_type.is_signed()
    }

    pub fn is_unsigned(&self) -> bool {
        self.element_type.is_unsigned()
    }

    pub fn is_float(&self) -> bool {
        self.element_type.is_float()
    }

    pub fn is_device_cpu(&self) -> bool {
        self.device == Device::Cpu
    }

    pub fn is_device_cuda(&self) -> bool {
        self.device == Device::Cuda
    }

    pub fn is_device_cl(&self) -> bool {
        self.device == Device::Cl
    }

    pub fn is_device_glsl(&self) -> bool {
        self.device == Device::Glsl
    }

    // ------------------------------------------------------------------
    // Info

    /// Replace the info bytes; a shorter value reuses the existing block.
    pub fn assign_info(&mut self, bytes: &[u8]) -> Result<()> {
        self.info.assign(bytes)
    }

    pub fn assign_info_str(&mut self, text: &str) -> Result<()> {
        self.assign_info(text.as_bytes())
    }

    pub fn info(&self) -> &[u8] {
        self.info.as_slice()
    }

    pub fn info_string(&self) -> String {
        String::from_utf8_lossy(self.info()).into_owned()
    }

    /// Store a scalar alongside the box. It is kept as a `u64`, so signed
    /// and float values come back through the usual element casts.
    pub fn set_opaque<T: Element>(&mut self, value: T) {
        self.opaque = value.to_scalar().cast::<u64>();
    }

    pub fn opaque<T: Element>(&self) -> T {
        Scalar::UInt(self.opaque).cast()
    }

    // ------------------------------------------------------------------
    // Bulk construction and export

    pub fn from_slice<T: Element>(dims: &[u32], values: &[T]) -> Result<NdBox> {
        let mut out = NdBox::new();
        out.allocate(T::TYPE, Device::Cpu, None, dims)?;
        out.assign_slice(values)?;
        Ok(out)
    }

    /// Overwrite every element from `values`, converting into the box type.
    pub fn assign_slice<T: Element>(&mut self, values: &[T]) -> Result<()> {
        check_type(self.element_type)?;
        self.device.ensure_supported()?;
        if values.len() != self.size() {
            return Err(BoxError::BufferSizeMismatch {
                expected: self.size(),
                actual: values.len(),
            });
        }

        let ty = self.element_type;
        let width = ty.byte_width();
        for (slot, value) in self.data.as_mut_slice().chunks_exact_mut(width).zip(values) {
            value.to_scalar().write(ty, slot)?;
        }
        Ok(())
    }

    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        check_type(self.element_type)?;
        self.device.ensure_supported()?;

        let ty = self.element_type;
        self.data
            .as_slice()
            .chunks_exact(ty.byte_width())
            .map(|slot| Scalar::read(ty, slot).map(Scalar::cast))
            .collect()
    }

    pub fn fill<T: Element>(&mut self, value: T) -> Result<()> {
        check_type(self.element_type)?;
        self.device.ensure_supported()?;
        cpu_fill(self.data.as_mut_slice(), self.element_type, value.to_scalar())
    }

    pub fn full<T: Element>(ty: ElementType, dims: &[u32], value: T) -> Result<NdBox> {
        let mut out = NdBox::new();
        out.allocate(ty, Device::Cpu, None, dims)?;
        out.fill(value)?;
        Ok(out)
    }

    pub fn zeros(ty: ElementType, dims: &[u32]) -> Result<NdBox> {
        Self::full(ty, dims, 0u8)
    }

    pub fn ones(ty: ElementType, dims: &[u32]) -> Result<NdBox> {
        Self::full(ty, dims, 1u8)
    }

    /// Zero-filled box placed according to `config`.
    pub fn with_config(ty: ElementType, dims: &[u32], config: &BoxConfig) -> Result<NdBox> {
        let mut out = NdBox::new();
        out.allocate(ty, config.device, Some(config.ext), dims)?;
        Ok(out)
    }

    /// Uniform samples from `[low, high)`, cast into `ty`.
    pub fn random_uniform(
        ty: ElementType,
        dims: &[u32],
        low: f64,
        high: f64,
        config: &BoxConfig,
    ) -> Result<NdBox> {
        let invalid = |reason: &str| {
            BoxError::InvalidConfig(format!("Sampling range [{}, {}): {}", low, high, reason))
        };
        // Both bounds and their width must be finite.
        if !(high - low).is_finite() {
            return Err(invalid("bounds must be finite"));
        }
        let dist = Uniform::new(low, high).map_err(|e| invalid(&e.to_string()))?;

        let mut out = Self::with_config(ty, dims, config)?;
        let mut rng = config.rng();
        let width = ty.byte_width();
        for slot in out.data.as_mut_slice().chunks_exact_mut(width) {
            Scalar::Float(dist.sample(&mut rng)).write(ty, slot)?;
        }
        Ok(out)
    }

    /// Element-wise converting copy from a box with the same element count.
    pub fn copy_data_from(&mut self, src: &NdBox) -> Result<()> {
        check_type(self.element_type)?;
        check_type(src.element_type)?;
        self.device.ensure_supported()?;
        src.device.ensure_supported()?;
        if self.size() != src.size() {
            return Err(BoxError::ShapeMismatch {
                lhs: self.dims().to_vec(),
                rhs: src.dims().to_vec(),
            });
        }

        cpu_element_copy(
            self.data.as_mut_slice(),
            self.element_type,
            src.data.as_slice(),
            src.element_type,
            src.size(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_box(dims: &[u32]) -> NdBox {
        let mut b = NdBox::new();
        b.allocate(ElementType::Int32, Device::Cpu, None, dims).unwrap();
        b
    }

    #[test]
    fn test_new_is_empty() {
        let b = NdBox::new();
        assert!(b.is_empty());
        assert_eq!(b.element_type(), ElementType::None);
        assert_eq!(b.device(), Device::None);
        assert_eq!(b.rank(), 0);
        assert_eq!(b.size(), 0);
        assert_eq!(b.data_capacity_bytes(), 0);
    }

    #[test]
    fn test_allocate_then_reallocate() {
        let mut b = NdBox::new();
        let state = b
            .allocate(ElementType::Float32, Device::Cpu, None, &[2, 3])
            .unwrap();
        assert_eq!(state, AllocState::Allocated);
        assert_eq!(b.size(), 6);
        assert_eq!(b.data_capacity_bytes(), 24);
        assert!(b.is_float32());
        assert!(b.is_device_cpu());
        assert_eq!(b.ext(), &[0, 0, 0, 0]);

        let state = b
            .allocate(ElementType::UInt8, Device::Cpu, Some([1, 2, 3, 4]), &[4])
            .unwrap();
        assert_eq!(state, AllocState::AlreadyAllocated);
        assert!(b.is_uint8());
        assert_eq!(b.dims(), &[4]);
        assert_eq!(b.ext(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_allocate_rejects_bad_input_untouched() {
        let mut b = int_box(&[3]);
        let ptr = b.data_ptr();
        assert_eq!(
            b.allocate(ElementType::None, Device::Cpu, None, &[2]),
            Err(BoxError::UnknownType(ElementType::None))
        );
        assert_eq!(
            b.allocate(ElementType::Int8, Device::Cuda, None, &[2]),
            Err(BoxError::UnknownDevice(Device::Cuda))
        );
        assert_eq!(
            b.allocate(ElementType::Int8, Device::Cpu, None, &[]),
            Err(BoxError::EmptyShape)
        );
        assert_eq!(b.data_ptr(), ptr);
        assert_eq!(b.dims(), &[3]);
        assert!(b.is_int32());
    }

    #[test]
    fn test_resize_shrink_keeps_pointer() {
        let mut b = int_box(&[4, 4]);
        let ptr = b.data_ptr();
        let capacity = b.data_capacity_bytes();

        b.resize(ElementType::Int32, Device::Cpu, None, &[2, 2]).unwrap();
        assert_eq!(b.size(), 4);
        assert_eq!(b.data_ptr(), ptr);
        assert_eq!(b.data_capacity_bytes(), capacity);

        b.resize(ElementType::Int32, Device::Cpu, None, &[8, 8]).unwrap();
        assert_eq!(b.size(), 64);
        assert_eq!(b.data_capacity_bytes(), 64 * 4);
    }

    #[test]
    fn test_resize_keeps_prefix() {
        let mut b = NdBox::from_slice(&[4], &[1i32, 2, 3, 4]).unwrap();
        b.reshape(&[6]).unwrap();
        assert_eq!(b.to_vec::<i32>().unwrap(), vec![1, 2, 3, 4, 0, 0]);
        b.reshape(&[2]).unwrap();
        assert_eq!(b.to_vec::<i32>().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_resize_type_change_reallocates() {
        let mut b = int_box(&[8]);
        b.resize(ElementType::Int8, Device::Cpu, None, &[8]).unwrap();
        assert!(b.is_int8());
        assert_eq!(b.data_capacity_bytes(), 8);
    }

    #[test]
    fn test_resize_ext_change_starts_over() {
        let mut b = int_box(&[4]);
        b.resize(ElementType::Int32, Device::Cpu, Some([7, 0, 0, 0]), &[2])
            .unwrap();
        assert_eq!(b.ext(), &[7, 0, 0, 0]);
        assert_eq!(b.data_capacity_bytes(), 8);
    }

    #[test]
    fn test_resize_from_empty_allocates() {
        let mut b = NdBox::new();
        b.resize(ElementType::Float64, Device::Cpu, None, &[3]).unwrap();
        assert!(b.exists_data());
        assert_eq!(b.size(), 3);
    }

    #[test]
    fn test_resize_to_rank_zero() {
        let mut b = int_box(&[3]);
        b.resize(ElementType::Int32, Device::Cpu, None, &[]).unwrap();
        assert_eq!(b.rank(), 0);
        assert_eq!(b.size(), 0);
        assert!(b.data_capacity_bytes() >= 12);
    }

    #[test]
    fn test_rank_zero_type_change_drops_old_bytes() {
        let mut b = NdBox::from_slice(&[2], &[1.5f32, 2.5]).unwrap();
        b.resize(ElementType::Int32, Device::Cpu, None, &[]).unwrap();
        assert_eq!(b.data_capacity_bytes(), 0);

        b.resize(ElementType::Int32, Device::Cpu, None, &[2]).unwrap();
        assert!(b.is_int32());
        assert_eq!(b.to_vec::<i32>().unwrap(), vec![0, 0]);
    }

    #[test]
    fn test_rank_zero_resize_of_empty_box_stays_empty() {
        let mut b = NdBox::new();
        b.resize(ElementType::Int32, Device::Cpu, None, &[]).unwrap();
        assert!(b.is_empty());
        assert_eq!(b.element_type(), ElementType::None);
        assert_eq!(b.device(), Device::None);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut b = int_box(&[3]);
        b.assign_info_str("label").unwrap();
        b.clear();
        assert!(b.is_empty());
        assert_eq!(b.element_type(), ElementType::None);
        assert_eq!(b.data_capacity_bytes(), 0);
        assert_eq!(b.dims_capacity_bytes(), 0);
        assert_eq!(b.info_capacity_bytes(), 0);
    }

    #[test]
    fn test_clone_as_converts() {
        let b = NdBox::from_slice(&[3], &[1.9f32, -1.9, 0.0]).unwrap();
        let c = b.clone_as(ElementType::Int16).unwrap();
        assert!(c.is_int16());
        assert_eq!(c.to_vec::<i16>().unwrap(), vec![1, -1, 0]);
        let flags = b.clone_as(ElementType::Bool).unwrap();
        assert_eq!(flags.to_vec::<bool>().unwrap(), vec![true, true, false]);
    }

    #[test]
    fn test_opaque_slot_travels_with_copies() {
        let mut b = int_box(&[2]);
        assert_eq!(b.opaque::<u64>(), 0);
        b.set_opaque(-5i32);
        assert_eq!(b.opaque::<i32>(), -5);

        b.set_opaque(42u16);
        assert_eq!(b.try_clone().unwrap().opaque::<u16>(), 42);
        assert_eq!(b.clone_as(ElementType::Float32).unwrap().opaque::<u16>(), 42);

        b.clear();
        assert_eq!(b.opaque::<u64>(), 0);
    }

    #[test]
    fn test_fill_family() {
        let ones = NdBox::ones(ElementType::Float64, &[2, 2]).unwrap();
        assert_eq!(ones.to_vec::<f64>().unwrap(), vec![1.0; 4]);
        let zeros = NdBox::zeros(ElementType::UInt16, &[3]).unwrap();
        assert_eq!(zeros.to_vec::<u16>().unwrap(), vec![0; 3]);
        let full = NdBox::full(ElementType::Int8, &[2], -3i64).unwrap();
        assert_eq!(full.to_vec::<i8>().unwrap(), vec![-3, -3]);
    }

    #[test]
    fn test_assign_slice_size_mismatch() {
        let mut b = int_box(&[3]);
        assert_eq!(
            b.assign_slice(&[1i32, 2]),
            Err(BoxError::BufferSizeMismatch { expected: 3, actual: 2 })
        );
    }

    #[test]
    fn test_random_uniform_is_seeded_and_bounded() {
        let config = BoxConfig::default().with_seed(7).build().unwrap();
        let a = NdBox::random_uniform(ElementType::Float32, &[16], -1.0, 1.0, &config).unwrap();
        let b = NdBox::random_uniform(ElementType::Float32, &[16], -1.0, 1.0, &config).unwrap();
        let va = a.to_vec::<f32>().unwrap();
        assert_eq!(va, b.to_vec::<f32>().unwrap());
        assert!(va.iter().all(|v| (-1.0..1.0).contains(v)));

        assert!(matches!(
            NdBox::random_uniform(ElementType::Float32, &[4], 1.0, 1.0, &config),
            Err(BoxError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_random_uniform_rejects_unbounded_ranges() {
        let config = BoxConfig::default().with_seed(7).build().unwrap();
        for (low, high) in [
            (0.0, f64::INFINITY),
            (f64::NEG_INFINITY, 0.0),
            (-f64::MAX, f64::MAX),
            (f64::NAN, 1.0),
        ] {
            assert!(
                matches!(
                    NdBox::random_uniform(ElementType::Float64, &[4], low, high, &config),
                    Err(BoxError::InvalidConfig(_))
                ),
                "[{low}, {high})"
            );
        }
    }

    #[test]
    fn test_copy_data_from_converts() {
        let src = NdBox::from_slice(&[2, 2], &[1u8, 2, 3, 4]).unwrap();
        let mut dst = NdBox::zeros(ElementType::Float64, &[4]).unwrap();
        dst.copy_data_from(&src).unwrap();
        assert_eq!(dst.to_vec::<f64>().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);

        let mut small = NdBox::zeros(ElementType::Float64, &[3]).unwrap();
        assert!(matches!(
            small.copy_data_from(&src),
            Err(BoxError::ShapeMismatch { .. })
        ));
    }
}
