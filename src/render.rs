//! Stretch renderer: maps a chunk onto a destination size as a list of blits.

use crate::chunk::Chunk;
use crate::region::{self, Segment};
use log::trace;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}

/// Copy `src` of the content image into `dst` of the target, scaling as needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Blit {
    pub src: Rect,
    pub dst: Rect,
}

/// Where the rounding remainder of an axis is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Remainder {
    /// On the last segment of the axis.
    #[default]
    Last,
    /// On the stretch segment whose pixel center is closest to the center of
    /// the axis, or on any segment when everything shrinks.
    Centered,
}

/// Consumer of blit instructions, e.g. a canvas.
pub trait RasterSink {
    fn blit(&mut self, blit: &Blit);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    remainder: Remainder,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_remainder(mut self, remainder: Remainder) -> Self {
        self.remainder = remainder;
        self
    }

    /// Destination length of every segment, summing to `dest` exactly.
    pub fn dest_lengths(&self, segments: &[Segment], dest: i32) -> Vec<i32> {
        if segments.is_empty() {
            return Vec::new();
        }
        if dest <= 0 {
            return vec![0; segments.len()];
        }

        let fixed_total: i32 = segments.iter().filter(|s| !s.stretch).map(Segment::len).sum();
        let stretch_total: i32 = segments.iter().filter(|s| s.stretch).map(Segment::len).sum();

        let (lengths, candidates): (Vec<i32>, Vec<usize>) = if dest < fixed_total || stretch_total == 0 {
            // Not enough room: shrink everything uniformly.
            let scale = if fixed_total > 0 { dest as f32 / fixed_total as f32 } else { 0.0 };
            let lengths: Vec<i32> = segments.iter().map(|s| (s.len() as f32 * scale).round() as i32).collect();
            (lengths, (0..segments.len()).collect())
        } else {
            let scale = (dest - fixed_total) as f32 / stretch_total as f32;
            let lengths: Vec<i32> = segments
                .iter()
                .map(|s| if s.stretch { (s.len() as f32 * scale).round() as i32 } else { s.len() })
                .collect();
            let stretches = segments.iter().enumerate().filter(|(_, s)| s.stretch).map(|(i, _)| i);
            (lengths, stretches.collect())
        };

        let mut lengths = lengths;
        let used: i32 = lengths.iter().sum();
        let slot = match self.remainder {
            Remainder::Last => segments.len() - 1,
            Remainder::Centered => nearest_to_middle(segments, &candidates),
        };
        lengths[slot] += dest - used;
        lengths
    }

    /// Plan the blits that draw a `src_w x src_h` content image at `dst_w x dst_h`.
    ///
    /// Cells are emitted row-major, y segments outer. Degenerate sizes give no
    /// blits.
    pub fn plan(&self, chunk: &Chunk, src_w: i32, src_h: i32, dst_w: i32, dst_h: i32) -> Vec<Blit> {
        let x_segments = region::decompose_clamped(&chunk.x_divs, src_w);
        let y_segments = region::decompose_clamped(&chunk.y_divs, src_h);
        if x_segments.is_empty() || y_segments.is_empty() {
            return Vec::new();
        }

        let widths = self.dest_lengths(&x_segments, dst_w);
        let heights = self.dest_lengths(&y_segments, dst_h);

        let mut blits = Vec::with_capacity(x_segments.len() * y_segments.len());
        let mut dst_y = 0;
        for (y_seg, &cell_h) in y_segments.iter().zip(&heights) {
            if cell_h <= 0 {
                continue;
            }
            let mut dst_x = 0;
            for (x_seg, &cell_w) in x_segments.iter().zip(&widths) {
                if cell_w <= 0 {
                    continue;
                }
                if x_seg.len() > 0 && y_seg.len() > 0 {
                    blits.push(Blit {
                        src: Rect::new(x_seg.start, y_seg.start, x_seg.len(), y_seg.len()),
                        dst: Rect::new(dst_x, dst_y, cell_w, cell_h),
                    });
                }
                dst_x += cell_w;
            }
            dst_y += cell_h;
        }

        trace!("planned {} blits for {}x{} -> {}x{}", blits.len(), src_w, src_h, dst_w, dst_h);
        blits
    }

    pub fn draw(&self, chunk: &Chunk, src_w: i32, src_h: i32, dst_w: i32, dst_h: i32, sink: &mut impl RasterSink) {
        for blit in self.plan(chunk, src_w, src_h, dst_w, dst_h) {
            sink.blit(&blit);
        }
    }
}

fn nearest_to_middle(segments: &[Segment], candidates: &[usize]) -> usize {
    // doubled coordinates keep half-pixel centers integral
    let center = segments[0].start + segments[segments.len() - 1].end;
    candidates
        .iter()
        .copied()
        .min_by_key(|&i| (segments[i].start + segments[i].end - center).abs())
        .unwrap_or(segments.len() - 1)
}

/// [`Renderer::dest_lengths`] with the default remainder placement.
pub fn dest_lengths(segments: &[Segment], dest: i32) -> Vec<i32> {
    Renderer::new().dest_lengths(segments, dest)
}

/// [`Renderer::plan`] with the default remainder placement.
pub fn plan(chunk: &Chunk, src_w: i32, src_h: i32, dst_w: i32, dst_h: i32) -> Vec<Blit> {
    Renderer::new().plan(chunk, src_w, src_h, dst_w, dst_h)
}
