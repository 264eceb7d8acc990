//! Axis decomposition into alternating fixed and stretch segments.

use crate::chunk::Div;
use serde::Serialize;

/// A gap-free piece of an axis, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub start: i32,
    pub end: i32,
    pub stretch: bool,
}

impl Segment {
    pub fn fixed(start: i32, end: i32) -> Self {
        Self { start, end, stretch: false }
    }

    pub fn stretch(start: i32, end: i32) -> Self {
        Self { start, end, stretch: true }
    }

    pub fn len(&self) -> i32 {
        (self.end - self.start).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition `[0, max)` around sorted, non-overlapping `divs`.
///
/// Gaps between consecutive divs are always emitted, even when empty; the
/// color grid of a chunk is indexed by these segments.
pub fn decompose(divs: &[Div], max: i32) -> Vec<Segment> {
    if max <= 0 {
        return Vec::new();
    }
    let Some(last) = divs.last() else {
        return vec![Segment::fixed(0, max)];
    };

    let mut out = Vec::with_capacity(divs.len() * 2 + 1);
    for (i, div) in divs.iter().enumerate() {
        if i == 0 {
            if div.start != 0 {
                out.push(Segment::fixed(0, div.start));
            }
        } else {
            out.push(Segment::fixed(divs[i - 1].stop, div.start));
        }
        out.push(Segment::stretch(div.start, div.stop));
    }
    if last.stop < max {
        out.push(Segment::fixed(last.stop, max));
    }
    out
}

/// Like [`decompose`], but tolerant of malformed divs.
///
/// Bounds are clamped into `[0, max]` and behind the previous segment, and
/// empty segments are dropped.
pub fn decompose_clamped(divs: &[Div], max: i32) -> Vec<Segment> {
    if max <= 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(divs.len() * 2 + 1);
    let mut cursor = 0;
    for div in divs {
        let start = div.start.clamp(cursor, max);
        let end = div.stop.clamp(start, max);
        if start > cursor {
            out.push(Segment::fixed(cursor, start));
        }
        if end > start {
            out.push(Segment::stretch(start, end));
            cursor = end;
        }
    }
    if cursor < max {
        out.push(Segment::fixed(cursor, max));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn assert_covers(segments: &[Segment], max: i32) {
        let mut cursor = 0;
        for seg in segments {
            assert_eq!(seg.start, cursor, "gap or overlap in {:?}", segments);
            assert!(seg.end >= seg.start);
            cursor = seg.end;
        }
        assert_eq!(cursor, max);
        assert_eq!(segments.iter().map(Segment::len).sum::<i32>(), max);
    }

    #[test]
    fn single_div_in_the_middle() {
        let segments = decompose(&[Div::new(3, 7)], 10);
        assert_eq!(
            segments,
            vec![Segment::fixed(0, 3), Segment::stretch(3, 7), Segment::fixed(7, 10)]
        );
        assert_covers(&segments, 10);
    }

    #[test]
    fn div_spanning_the_whole_axis() {
        let segments = decompose(&[Div::new(0, 10)], 10);
        assert_eq!(segments, vec![Segment::stretch(0, 10)]);
    }

    #[test]
    fn adjacent_divs_keep_an_empty_gap() {
        let segments = decompose(&[Div::new(0, 2), Div::new(2, 5)], 8);
        assert_eq!(segments.len(), 4);
        assert!(segments[1].is_empty());
        assert_covers(&segments, 8);
    }

    #[test]
    fn many_layouts_cover_the_axis() {
        let layouts: &[(&[Div], i32)] = &[
            (&[Div::new(1, 2)], 3),
            (&[Div::new(0, 1), Div::new(4, 6)], 6),
            (&[Div::new(2, 3), Div::new(5, 9), Div::new(11, 12)], 20),
            (&[], 5),
        ];
        for &(divs, max) in layouts {
            assert_covers(&decompose(divs, max), max);
            assert_covers(&decompose_clamped(divs, max), max);
        }
    }

    #[test]
    fn empty_axis_has_no_segments() {
        assert!(decompose(&[Div::new(0, 1)], 0).is_empty());
        assert!(decompose_clamped(&[], -3).is_empty());
    }

    #[test]
    fn no_divs_is_one_fixed_segment() {
        assert_eq!(decompose(&[], 7), vec![Segment::fixed(0, 7)]);
        assert_eq!(decompose_clamped(&[], 7), vec![Segment::fixed(0, 7)]);
    }

    #[test]
    fn clamped_drops_out_of_range_divs() {
        let segments = decompose_clamped(&[Div::new(-4, 3), Div::new(8, 30), Div::new(40, 50)], 10);
        assert_eq!(
            segments,
            vec![Segment::stretch(0, 3), Segment::fixed(3, 8), Segment::stretch(8, 10)]
        );
        assert_covers(&segments, 10);
    }

    #[test]
    fn clamped_tolerates_overlap() {
        let segments = decompose_clamped(&[Div::new(2, 6), Div::new(4, 8)], 10);
        assert_covers(&segments, 10);
        assert_eq!(segments[2], Segment::stretch(6, 8));
    }
}
