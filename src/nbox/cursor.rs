use std::{fmt, ops::Range, str::FromStr};

use super::desc::BoxDesc;
use crate::utils::error::{BoxError, Result};

/// A `start:stop:step` triple for one axis. `None` means "use the default
/// for the walk direction".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoxSlice {
    pub start: Option<i32>,
    pub stop: Option<i32>,
    pub step: Option<i32>,
}

impl BoxSlice {
    pub fn new(start: Option<i32>, stop: Option<i32>, step: Option<i32>) -> Self {
        Self { start, stop, step }
    }

    /// The whole axis, front to back.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn range(start: i32, stop: i32) -> Self {
        Self::new(Some(start), Some(stop), None)
    }

    pub fn with_step(mut self, step: i32) -> Self {
        self.step = Some(step);
        self
    }
}

impl From<Range<i32>> for BoxSlice {
    fn from(r: Range<i32>) -> Self {
        Self::range(r.start, r.end)
    }
}

/// `start:stop[:step]`, with unset bounds left blank.
impl fmt::Display for BoxSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |v: Option<i32>| v.map(|v| v.to_string()).unwrap_or_default();
        write!(f, "{}:{}", bound(self.start), bound(self.stop))?;
        if let Some(step) = self.step {
            write!(f, ":{}", step)?;
        }
        Ok(())
    }
}

impl FromStr for BoxSlice {
    type Err = BoxError;

    fn from_str(text: &str) -> Result<Self> {
        parse_slice(0, text)
    }
}

/// Parse one axis. A lone index `i` selects just that element.
fn parse_slice(axis: usize, text: &str) -> Result<BoxSlice> {
    let invalid = || BoxError::InvalidSliceText {
        axis,
        text: text.trim().to_string(),
    };
    let bound = |part: &str| -> Result<Option<i32>> {
        if part.is_empty() {
            Ok(None)
        } else {
            part.parse::<i32>().map(Some).map_err(|_| invalid())
        }
    };

    let parts: Vec<&str> = text.split(':').map(str::trim).collect();
    match *parts.as_slice() {
        [index] => {
            let start = bound(index)?.ok_or_else(invalid)?;
            let stop = match start {
                -1 => None,
                i => Some(i.checked_add(1).ok_or_else(invalid)?),
            };
            Ok(BoxSlice::new(Some(start), stop, None))
        }
        [start, stop] => Ok(BoxSlice::new(bound(start)?, bound(stop)?, None)),
        [start, stop, step] => Ok(BoxSlice::new(bound(start)?, bound(stop)?, bound(step)?)),
        _ => Err(invalid()),
    }
}

/// Parse comma-separated per-axis slices, e.g. `"::, 1:2:, ::-3, 4, 5:6"`.
/// Blank text means no slices.
pub fn parse_slices(text: &str) -> Result<Vec<BoxSlice>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    text.split(',')
        .enumerate()
        .map(|(axis, part)| parse_slice(axis, part))
        .collect()
}

pub fn format_slices(slices: &[BoxSlice]) -> String {
    slices
        .iter()
        .map(BoxSlice::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validated walk over one axis of a box.
///
/// A cursor is a plan of element offsets, not a borrow: read or write the
/// current element through the owning box with [`BoxCursor::offset`].
/// The first element is current as soon as the cursor exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxCursor {
    base: usize,
    stride: usize,
    start: usize,
    step: isize,
    count: usize,
    visited: usize,
}

impl BoxCursor {
    /// Build a cursor over `axis`, rooted at element offset `base`.
    pub(crate) fn build(
        desc: &BoxDesc,
        base: usize,
        axis: usize,
        slice: BoxSlice,
    ) -> Result<Self> {
        let rank = desc.rank();
        if axis >= rank {
            return Err(BoxError::InvalidAxis { axis, rank });
        }

        let invalid = || BoxError::InvalidSlice {
            axis,
            start: slice.start,
            stop: slice.stop,
            step: slice.step,
        };

        let len = desc.dims()[axis] as i64;
        let step = slice.step.unwrap_or(1) as i64;
        if step == 0 {
            return Err(invalid());
        }

        let normalize = |i: i32| if i < 0 { len + i as i64 } else { i as i64 };

        let start = match slice.start {
            Some(i) => normalize(i),
            None if step > 0 => 0,
            None => len - 1,
        };
        if start < 0 || start >= len {
            return Err(invalid());
        }

        // -1 is the "before first" sentinel; only reachable through a default.
        let stop = match slice.stop {
            Some(i) => {
                let stop = normalize(i);
                if stop < 0 {
                    return Err(invalid());
                }
                stop.min(len)
            }
            None if step > 0 => len,
            None => -1,
        };

        let ordered = if step > 0 { start < stop } else { start > stop };
        if !ordered {
            return Err(invalid());
        }

        let distance = (stop - start).abs();
        let count = (distance + step.abs() - 1) / step.abs();

        Ok(Self {
            base,
            stride: desc.stride(axis),
            start: start as usize,
            step: step as isize,
            count: count as usize,
            visited: 0,
        })
    }

    /// Linear element offset of the current element.
    ///
    /// Only meaningful while the cursor is live, i.e. before `advance` has
    /// returned false. An exhausted cursor keeps reporting its last element.
    pub fn offset(&self) -> usize {
        self.base + self.index() * self.stride
    }

    /// Position of the current element along the cursor's axis.
    pub fn index(&self) -> usize {
        let visited = self.visited.min(self.count.saturating_sub(1));
        (self.start as isize + visited as isize * self.step) as usize
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_live(&self) -> bool {
        self.visited < self.count
    }

    /// Step to the next element. Returns false once the plan is exhausted.
    pub fn advance(&mut self) -> bool {
        if self.visited < self.count {
            self.visited += 1;
        }
        self.is_live()
    }

    /// Cursor over another axis, rooted at this cursor's current element.
    pub fn init_cursor(&self, desc: &BoxDesc, axis: usize, slice: BoxSlice) -> Result<BoxCursor> {
        BoxCursor::build(desc, self.offset(), axis, slice)
    }

    /// Remaining offsets, current element first.
    pub fn offsets(self) -> CursorOffsets {
        CursorOffsets { cursor: self }
    }
}

pub struct CursorOffsets {
    cursor: BoxCursor,
}

impl Iterator for CursorOffsets {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if !self.cursor.is_live() {
            return None;
        }
        let offset = self.cursor.offset();
        self.cursor.advance();
        Some(offset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.cursor.count - self.cursor.visited;
        (left, Some(left))
    }
}

impl ExactSizeIterator for CursorOffsets {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn desc(dims: &[u32]) -> BoxDesc {
        let mut d = BoxDesc::new();
        d.set_dims(dims).unwrap();
        d
    }

    fn walk(len: u32, slice: BoxSlice) -> Option<Vec<usize>> {
        BoxCursor::build(&desc(&[len]), 0, 0, slice)
            .ok()
            .map(|c| c.offsets().collect())
    }

    #[rstest]
    #[case(BoxSlice::all(), Some(vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]))]
    #[case(BoxSlice::new(Some(-1), Some(0), Some(-1)), Some(vec![9, 8, 7, 6, 5, 4, 3, 2, 1]))]
    #[case(BoxSlice::new(None, None, Some(-1)), Some(vec![9, 8, 7, 6, 5, 4, 3, 2, 1, 0]))]
    #[case(BoxSlice::range(0, -1), Some(vec![0, 1, 2, 3, 4, 5, 6, 7, 8]))]
    #[case(BoxSlice::range(-2, -1), Some(vec![8]))]
    #[case(BoxSlice::new(Some(-8), Some(0), Some(-1)), Some(vec![2, 1]))]
    #[case(BoxSlice::new(Some(5), None, None), Some(vec![5, 6, 7, 8, 9]))]
    #[case(BoxSlice::range(5, 8), Some(vec![5, 6, 7]))]
    #[case(BoxSlice::range(5, 8).with_step(2), Some(vec![5, 7]))]
    #[case(BoxSlice::range(5, 8).with_step(3), Some(vec![5]))]
    #[case(BoxSlice::range(1, 4).with_step(10), Some(vec![1]))]
    #[case(BoxSlice::range(1, 4).with_step(-1), None)]
    #[case(BoxSlice::range(4, 1), None)]
    #[case(BoxSlice::range(4, 1).with_step(-1), Some(vec![4, 3, 2]))]
    #[case(BoxSlice::range(4, 1).with_step(-2), Some(vec![4, 2]))]
    #[case(BoxSlice::range(4, 1).with_step(-10), Some(vec![4]))]
    #[case(BoxSlice::range(0, 20), Some(vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]))]
    #[case(BoxSlice::all().with_step(0), None)]
    #[case(BoxSlice::new(Some(10), None, None), None)]
    #[case(BoxSlice::new(Some(-11), None, None), None)]
    #[case(BoxSlice::new(None, Some(-11), None), None)]
    fn test_rank1_walk(#[case] slice: BoxSlice, #[case] expected: Option<Vec<usize>>) {
        assert_eq!(walk(10, slice), expected);
    }

    #[rstest]
    #[case("::", BoxSlice::all())]
    #[case(":", BoxSlice::all())]
    #[case("1:2:", BoxSlice::range(1, 2))]
    #[case("::-3", BoxSlice::new(None, None, Some(-3)))]
    #[case("4", BoxSlice::range(4, 5))]
    #[case("-1", BoxSlice::new(Some(-1), None, None))]
    #[case(" -3 : ", BoxSlice::new(Some(-3), None, None))]
    #[case("5:6", BoxSlice::range(5, 6))]
    #[case(":-1:2", BoxSlice::new(None, Some(-1), Some(2)))]
    fn test_parse_slice(#[case] text: &str, #[case] expected: BoxSlice) {
        assert_eq!(text.parse::<BoxSlice>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("a")]
    #[case("1:2:3:4")]
    #[case("1.5:")]
    #[case("2147483647")]
    fn test_parse_slice_rejects(#[case] text: &str) {
        assert!(matches!(
            text.parse::<BoxSlice>(),
            Err(BoxError::InvalidSliceText { axis: 0, .. })
        ));
    }

    #[rstest]
    #[case(BoxSlice::all())]
    #[case(BoxSlice::range(-2, 7).with_step(3))]
    #[case(BoxSlice::new(Some(-1), None, None))]
    #[case(BoxSlice::new(None, Some(0), Some(-1)))]
    fn test_display_parses_back(#[case] slice: BoxSlice) {
        assert_eq!(slice.to_string().parse::<BoxSlice>().unwrap(), slice);
    }

    #[test]
    fn test_parse_slice_list() {
        let slices = parse_slices("::, 1:2:, ::-3, 4, 5:6").unwrap();
        assert_eq!(
            slices,
            vec![
                BoxSlice::all(),
                BoxSlice::range(1, 2),
                BoxSlice::new(None, None, Some(-3)),
                BoxSlice::range(4, 5),
                BoxSlice::range(5, 6),
            ]
        );
        assert_eq!(format_slices(&slices), ":, 1:2, ::-3, 4:5, 5:6");
        assert_eq!(parse_slices(&format_slices(&slices)).unwrap(), slices);
        assert!(parse_slices("  ").unwrap().is_empty());
        assert_eq!(
            parse_slices("::, x").unwrap_err(),
            BoxError::InvalidSliceText {
                axis: 1,
                text: "x".to_string()
            }
        );
    }

    #[test]
    fn test_first_element_is_current() {
        let slice = BoxSlice::range(5, 8).with_step(2);
        let mut c = BoxCursor::build(&desc(&[10]), 0, 0, slice).unwrap();
        assert_eq!(c.offset(), 5);
        assert!(c.advance());
        assert_eq!(c.offset(), 7);
        assert!(!c.advance());
        assert!(!c.advance());
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_invalid_slice_error_carries_request() {
        let err = BoxCursor::build(&desc(&[10]), 0, 0, BoxSlice::range(4, 1)).unwrap_err();
        assert_eq!(
            err,
            BoxError::InvalidSlice {
                axis: 0,
                start: Some(4),
                stop: Some(1),
                step: None
            }
        );
    }

    #[test]
    fn test_axis_out_of_range() {
        let err = BoxCursor::build(&desc(&[3, 3]), 0, 2, BoxSlice::all()).unwrap_err();
        assert_eq!(err, BoxError::InvalidAxis { axis: 2, rank: 2 });
    }

    #[test]
    fn test_nested_rank2() {
        let d = desc(&[3, 3]);
        let mut rows = BoxCursor::build(&d, 0, 0, BoxSlice::all()).unwrap();
        let mut seen = Vec::new();
        loop {
            let cols = rows.init_cursor(&d, 1, BoxSlice::all()).unwrap();
            seen.extend(cols.offsets());
            if !rows.advance() {
                break;
            }
        }
        assert_eq!(seen, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_nested_rank2_partial() {
        let d = desc(&[3, 3]);
        let rows = BoxCursor::build(&d, 0, 0, BoxSlice::range(0, 3).with_step(2)).unwrap();
        let got: Vec<Vec<usize>> = rows
            .offsets()
            .map(|row| {
                BoxCursor::build(&d, row, 1, BoxSlice::new(None, None, Some(-1)))
                    .unwrap()
                    .offsets()
                    .collect()
            })
            .collect();
        assert_eq!(got, vec![vec![2, 1, 0], vec![8, 7, 6]]);
    }
}
