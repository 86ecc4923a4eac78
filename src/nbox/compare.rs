use super::{
    NdBox,
    device::{
        Device,
        cpu::{cpu_compare, cpu_compare_value},
    },
};
use crate::{
    element::{CompareOp, Element, ElementType},
    utils::error::{BoxError, Result},
};

impl NdBox {
    fn bool_like(&self) -> Result<NdBox> {
        let mut out = NdBox::new();
        out.allocate(ElementType::Bool, Device::Cpu, None, self.dims())?;
        Ok(out)
    }

    fn check_comparable(&self) -> Result<()> {
        if !self.element_type.is_supported() {
            return Err(BoxError::UnknownType(self.element_type));
        }
        self.device.ensure_supported()
    }

    /// Elementwise `self op other` into a fresh Bool box of the same shape.
    /// The operand types may differ; values are compared exactly.
    #[tracing::instrument(level = "debug", skip(self, other), fields(op = %op, size = self.size()))]
    pub fn compare(&self, op: CompareOp, other: &NdBox) -> Result<NdBox> {
        if !self.desc.is_same_shape(&other.desc) {
            return Err(BoxError::ShapeMismatch {
                lhs: self.dims().to_vec(),
                rhs: other.dims().to_vec(),
            });
        }
        self.check_comparable()?;
        other.check_comparable()?;

        let mut out = self.bool_like()?;
        cpu_compare(
            op,
            self.data.as_slice(),
            self.element_type,
            other.data.as_slice(),
            other.element_type,
            out.data.as_mut_slice(),
        )?;
        Ok(out)
    }

    /// Elementwise `self op value`.
    pub fn compare_value<T: Element>(&self, op: CompareOp, value: T) -> Result<NdBox> {
        self.check_comparable()?;
        let mut out = self.bool_like()?;
        cpu_compare_value(
            op,
            self.data.as_slice(),
            self.element_type,
            value.to_scalar(),
            out.data.as_mut_slice(),
        )?;
        Ok(out)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn eq(&self, other: &NdBox) -> Result<NdBox> {
        self.compare(CompareOp::Eq, other)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn ne(&self, other: &NdBox) -> Result<NdBox> {
        self.compare(CompareOp::Ne, other)
    }

    pub fn lt(&self, other: &NdBox) -> Result<NdBox> {
        self.compare(CompareOp::Lt, other)
    }

    pub fn le(&self, other: &NdBox) -> Result<NdBox> {
        self.compare(CompareOp::Le, other)
    }

    pub fn gt(&self, other: &NdBox) -> Result<NdBox> {
        self.compare(CompareOp::Gt, other)
    }

    pub fn ge(&self, other: &NdBox) -> Result<NdBox> {
        self.compare(CompareOp::Ge, other)
    }

    pub fn eq_value<T: Element>(&self, value: T) -> Result<NdBox> {
        self.compare_value(CompareOp::Eq, value)
    }

    pub fn ne_value<T: Element>(&self, value: T) -> Result<NdBox> {
        self.compare_value(CompareOp::Ne, value)
    }

    pub fn lt_value<T: Element>(&self, value: T) -> Result<NdBox> {
        self.compare_value(CompareOp::Lt, value)
    }

    pub fn le_value<T: Element>(&self, value: T) -> Result<NdBox> {
        self.compare_value(CompareOp::Le, value)
    }

    pub fn gt_value<T: Element>(&self, value: T) -> Result<NdBox> {
        self.compare_value(CompareOp::Gt, value)
    }

    pub fn ge_value<T: Element>(&self, value: T) -> Result<NdBox> {
        self.compare_value(CompareOp::Ge, value)
    }
}
