use super::{
    NdBox,
    cursor::{BoxCursor, BoxSlice, parse_slices},
    desc::BoxDesc,
};
use crate::utils::error::{BoxError, Result};

fn visit<F: FnMut(usize)>(
    desc: &BoxDesc,
    base: usize,
    axis: usize,
    slices: &[BoxSlice],
    f: &mut F,
) -> Result<()> {
    let slice = slices.get(axis).copied().unwrap_or_default();
    let cursor = BoxCursor::build(desc, base, axis, slice)?;
    for offset in cursor.offsets() {
        if axis + 1 == desc.rank() {
            f(offset);
        } else {
            visit(desc, offset, axis + 1, slices, f)?;
        }
    }
    Ok(())
}

impl NdBox {
    /// Cursor over `axis` from the box origin.
    pub fn init_cursor(
        &self,
        axis: usize,
        start: Option<i32>,
        stop: Option<i32>,
        step: Option<i32>,
    ) -> Result<BoxCursor> {
        self.cursor(axis, BoxSlice::new(start, stop, step))
    }

    pub fn cursor(&self, axis: usize, slice: BoxSlice) -> Result<BoxCursor> {
        BoxCursor::build(&self.desc, 0, axis, slice)
    }

    /// Cursor over `axis` rooted at the current element of `parent`.
    pub fn sub_cursor(
        &self,
        parent: &BoxCursor,
        axis: usize,
        slice: BoxSlice,
    ) -> Result<BoxCursor> {
        parent.init_cursor(&self.desc, axis, slice)
    }

    /// Call `f` with the linear offset of every element selected by
    /// `slices`, outermost axis first. Axes without a slice are walked whole.
    pub fn for_each<F: FnMut(usize)>(&self, slices: &[BoxSlice], mut f: F) -> Result<()> {
        let rank = self.rank();
        if slices.len() > rank {
            return Err(BoxError::RankMismatch {
                expected: rank,
                actual: slices.len(),
            });
        }
        if self.size() == 0 {
            return Ok(());
        }
        visit(&self.desc, 0, 0, slices, &mut f)
    }

    /// Number of elements each slice selects, one entry per axis.
    /// A zero-extent axis selects nothing whatever its slice says.
    pub fn diffs(&self, slices: &[BoxSlice]) -> Result<Vec<u32>> {
        let rank = self.rank();
        if slices.len() > rank {
            return Err(BoxError::RankMismatch {
                expected: rank,
                actual: slices.len(),
            });
        }

        self.dims()
            .iter()
            .enumerate()
            .map(|(axis, dim)| {
                if *dim == 0 {
                    return Ok(0);
                }
                let slice = slices.get(axis).copied().unwrap_or_default();
                self.cursor(axis, slice).map(|c| c.len() as u32)
            })
            .collect()
    }

    /// Copy of the selected elements as a new, densely packed box.
    pub fn slice(&self, slices: &[BoxSlice]) -> Result<NdBox> {
        let dims = self.diffs(slices)?;

        let mut out = NdBox::new();
        out.allocate(self.element_type, self.device, Some(self.ext), &dims)?;
        out.info.assign(self.info.as_slice())?;
        out.opaque = self.opaque;

        let width = self.element_type.byte_width();
        let src = self.data.as_slice();
        let mut chunks = out.data.as_mut_slice().chunks_exact_mut(width);
        self.for_each(slices, |offset| {
            if let Some(dst) = chunks.next() {
                dst.copy_from_slice(&src[offset * width..(offset + 1) * width]);
            }
        })?;
        Ok(out)
    }

    /// [`NdBox::slice`] driven by text such as `"::-1, 1:3"`.
    pub fn slice_text(&self, text: &str) -> Result<NdBox> {
        self.slice(&parse_slices(text)?)
    }
}
