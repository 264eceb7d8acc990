//! Border-scan analyzer for raw nine-patch images.
//!
//! A raw nine-patch carries its metadata in a one-pixel frame: opaque black
//! runs on the top row and left column mark stretchable regions, a single run
//! on the bottom row and right column marks the content padding. Every other
//! frame pixel is fully transparent.

use crate::chunk::{Axis, Chunk, Div, Padding, RegionColor, TRANSPARENT_COLOR};
use crate::region;
use crate::source::PixelSource;
use log::debug;
use thiserror::Error;

const BLACK: u32 = 0xFF00_0000;

/// Why a source cannot be read as a raw nine-patch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("image is {width}x{height}, at least 3x3 is required")]
    TooSmall { width: u32, height: u32 },
    #[error("corner pixels must be transparent")]
    OpaqueCorner,
    #[error("border pixel ({x}, {y}) is {color:#010x}, expected transparent or black")]
    InvalidBorderPixel { x: u32, y: u32, color: u32 },
    #[error("must be at least one {0} stretchable region")]
    NoStretchRegion(Axis),
    #[error("only one {0} padding region is allowed")]
    MultiplePaddingRuns(Axis),
}

fn is_transparent(color: u32) -> bool {
    color >> 24 == 0
}

fn is_black(color: u32) -> bool {
    color == BLACK
}

/// One line of the frame: the top or bottom row, or the left or right column.
#[derive(Clone, Copy)]
enum Edge {
    Row(u32),
    Column(u32),
}

impl Edge {
    fn len(self, source: &impl PixelSource) -> u32 {
        match self {
            Edge::Row(_) => source.width(),
            Edge::Column(_) => source.height(),
        }
    }

    fn coords(self, i: u32) -> (u32, u32) {
        match self {
            Edge::Row(y) => (i, y),
            Edge::Column(x) => (x, i),
        }
    }
}

/// Collect the black runs of an edge as content-coordinate divs.
///
/// The fold state is the start of the currently open run, if any.
fn scan_edge(source: &impl PixelSource, edge: Edge) -> Result<Vec<Div>, GeometryError> {
    // The last pixel of an edge is a transparent corner, which closes any run.
    let (divs, _) = (1..edge.len(source)).try_fold(
        (Vec::new(), None::<i32>),
        |(mut divs, open), i| {
            let (x, y) = edge.coords(i);
            let color = source.pixel(x, y);
            let position = i as i32 - 1;
            let open = match open {
                None if is_black(color) => Some(position),
                Some(start) if is_transparent(color) => {
                    divs.push(Div::new(start, position));
                    None
                }
                open if is_black(color) || is_transparent(color) => open,
                _ => return Err(GeometryError::InvalidBorderPixel { x, y, color }),
            };
            Ok((divs, open))
        },
    )?;
    Ok(divs)
}

fn check_corners(source: &impl PixelSource) -> Result<(), GeometryError> {
    let (w, h) = (source.width(), source.height());
    if w < 3 || h < 3 {
        return Err(GeometryError::TooSmall { width: w, height: h });
    }
    let corners = [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)];
    if corners.iter().all(|&(x, y)| is_transparent(source.pixel(x, y))) {
        Ok(())
    } else {
        Err(GeometryError::OpaqueCorner)
    }
}

/// Runs found on the four edges of a validated frame.
struct Frame {
    x_divs: Vec<Div>,
    y_divs: Vec<Div>,
    x_padding: Option<Div>,
    y_padding: Option<Div>,
}

fn scan_frame(source: &impl PixelSource) -> Result<Frame, GeometryError> {
    check_corners(source)?;
    let (w, h) = (source.width(), source.height());

    let x_divs = scan_edge(source, Edge::Row(0))?;
    let y_divs = scan_edge(source, Edge::Column(0))?;
    let x_padding = single_run(scan_edge(source, Edge::Row(h - 1))?, Axis::Horizontal)?;
    let y_padding = single_run(scan_edge(source, Edge::Column(w - 1))?, Axis::Vertical)?;

    if x_divs.is_empty() {
        return Err(GeometryError::NoStretchRegion(Axis::Horizontal));
    }
    if y_divs.is_empty() {
        return Err(GeometryError::NoStretchRegion(Axis::Vertical));
    }
    Ok(Frame { x_divs, y_divs, x_padding, y_padding })
}

fn single_run(runs: Vec<Div>, axis: Axis) -> Result<Option<Div>, GeometryError> {
    match runs.as_slice() {
        [] => Ok(None),
        [run] => Ok(Some(*run)),
        _ => Err(GeometryError::MultiplePaddingRuns(axis)),
    }
}

/// Whether `source` follows the raw nine-patch frame convention.
pub fn is_raw_nine_patch(source: &impl PixelSource) -> bool {
    scan_frame(source).is_ok()
}

/// Derive a chunk from a raw nine-patch, reporting why the frame is invalid.
pub fn analyze(source: &impl PixelSource) -> Result<Chunk, GeometryError> {
    let Frame { x_divs, y_divs, x_padding, y_padding } = scan_frame(source)?;
    let content_w = source.width() as i32 - 2;
    let content_h = source.height() as i32 - 2;

    let x_pad = x_padding.unwrap_or(x_divs[0]);
    let y_pad = y_padding.unwrap_or(y_divs[0]);
    let padding = Padding {
        left: x_pad.start,
        top: y_pad.start,
        right: content_w - x_pad.stop,
        bottom: content_h - y_pad.stop,
    };

    let colors = sample_colors(source, &x_divs, &y_divs);
    debug!(
        "analyzed raw nine-patch: {} x divs, {} y divs, padding {:?}",
        x_divs.len(),
        y_divs.len(),
        padding
    );

    Ok(Chunk { was_serialized: true, x_divs, y_divs, padding, colors })
}

/// Derive a chunk from a raw nine-patch, or the empty chunk if it is not one.
pub fn chunk_from_raw(source: &impl PixelSource) -> Chunk {
    analyze(source).unwrap_or_else(|e| {
        debug!("not a raw nine-patch: {e}");
        Chunk::empty()
    })
}

fn sample_colors(source: &impl PixelSource, x_divs: &[Div], y_divs: &[Div]) -> Vec<RegionColor> {
    let x_regions = region::decompose(x_divs, source.width() as i32 - 2);
    let y_regions = region::decompose(y_divs, source.height() as i32 - 2);

    let mut colors = Vec::with_capacity(x_regions.len() * y_regions.len());
    for y in &y_regions {
        for x in &x_regions {
            colors.push(cell_color(source, (x.start, x.end), (y.start, y.end)));
        }
    }
    colors
}

/// Color of the content cell `[x0, x1) x [y0, y1)`, skipping the frame.
fn cell_color(source: &impl PixelSource, (x0, x1): (i32, i32), (y0, y1): (i32, i32)) -> RegionColor {
    if x1 <= x0 || y1 <= y0 {
        return RegionColor::Mixed;
    }
    let (x0, x1, y0, y1) = (x0 as u32 + 1, x1 as u32 + 1, y0 as u32 + 1, y1 as u32 + 1);
    let color = source.pixel(x0, y0);
    let uniform = (y0..y1).all(|y| (x0..x1).all(|x| source.pixel(x, y) == color));
    match uniform {
        true if is_transparent(color) => RegionColor::Uniform(TRANSPARENT_COLOR),
        true => RegionColor::Uniform(color),
        false => RegionColor::Mixed,
    }
}
