//! Stretch chunk data model and its binary codec.
//!
//! The wire layout is fixed and little-endian so chunks stay compatible with
//! assets that were serialized by other nine-patch toolchains.

use crate::{NinePatchError, Result};
use log::trace;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Wire value for a cell that has no single color.
pub const NO_COLOR: u32 = 0x0000_0001;
/// Wire value for a fully transparent cell.
pub const TRANSPARENT_COLOR: u32 = 0x0000_0000;
/// Baseline density (dpi) of unscaled assets.
pub const DEFAULT_DENSITY: u32 = 160;

// flag, x count, y count, color count, 2 reserved, 4 padding, 1 reserved
const HEADER_LEN: usize = 4 + 7 * 4;
const MAX_DIVS: usize = u8::MAX as usize / 2;
const MAX_COLORS: usize = u8::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Horizontal => f.write_str("horizontal"),
            Axis::Vertical => f.write_str("vertical"),
        }
    }
}

/// Reasons a byte buffer is not a valid stretch chunk.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkError {
    #[error("chunk was not serialized")]
    NotSerialized,
    #[error("{axis} div count must be even and non-zero, but was {count}")]
    DivCount { axis: Axis, count: u8 },
    #[error("buffer underflow: needed {needed} bytes, {available} available")]
    Underflow { needed: usize, available: usize },
}

/// A stretchable pixel range along one axis, `stop` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Div {
    pub start: i32,
    pub stop: i32,
}

impl Div {
    pub fn new(start: i32, stop: i32) -> Self {
        Self { start, stop }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Padding {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// Fill hint for one cell of the region grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RegionColor {
    /// Every pixel of the cell has this ARGB value.
    Uniform(u32),
    Mixed,
}

impl RegionColor {
    pub fn from_wire(value: u32) -> Self {
        if value == NO_COLOR {
            RegionColor::Mixed
        } else {
            RegionColor::Uniform(value)
        }
    }

    pub fn to_wire(self) -> u32 {
        match self {
            RegionColor::Uniform(color) => color,
            RegionColor::Mixed => NO_COLOR,
        }
    }
}

/// Stretch metadata of a nine-patch image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub was_serialized: bool,
    pub x_divs: Vec<Div>,
    pub y_divs: Vec<Div>,
    pub padding: Padding,
    /// Row-major over (y region, x region).
    pub colors: Vec<RegionColor>,
}

impl Default for Chunk {
    fn default() -> Self {
        Self::empty()
    }
}

impl Chunk {
    /// A chunk with no stretch regions. Renders as one fixed cell.
    pub fn empty() -> Self {
        Self {
            was_serialized: true,
            x_divs: Vec::new(),
            y_divs: Vec::new(),
            padding: Padding::default(),
            colors: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x_divs.is_empty() && self.y_divs.is_empty()
    }

    /// Decode a serialized chunk.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Ok(Self::decode(data)?)
    }

    fn decode(data: &[u8]) -> std::result::Result<Self, ChunkError> {
        let mut reader = Reader::new(data);

        if reader.read_u8()? == 0 {
            return Err(ChunkError::NotSerialized);
        }
        let x_count = check_div_count(Axis::Horizontal, reader.read_u8()?)?;
        let y_count = check_div_count(Axis::Vertical, reader.read_u8()?)?;
        let color_count = reader.read_u8()? as usize;

        let needed = HEADER_LEN + (x_count + y_count) * 4 + color_count * 4;
        if data.len() < needed {
            return Err(ChunkError::Underflow { needed, available: data.len() });
        }

        reader.skip(2 * 4);
        let left = reader.read_i32()?;
        let right = reader.read_i32()?;
        let top = reader.read_i32()?;
        let bottom = reader.read_i32()?;
        reader.skip(4);

        let x_divs = read_divs(&mut reader, x_count / 2)?;
        let y_divs = read_divs(&mut reader, y_count / 2)?;
        let colors = (0..color_count)
            .map(|_| reader.read_i32().map(|v| RegionColor::from_wire(v as u32)))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        trace!(
            "decoded chunk: {} x divs, {} y divs, {} colors",
            x_divs.len(),
            y_divs.len(),
            colors.len()
        );

        Ok(Self {
            was_serialized: true,
            x_divs,
            y_divs,
            padding: Padding { left, top, right, bottom },
            colors,
        })
    }

    /// Whether `data` carries a well-formed chunk header and enough payload.
    pub fn is_chunk(data: &[u8]) -> bool {
        if data.len() < HEADER_LEN || data[0] == 0 {
            return false;
        }
        let (x, y, colors) = (data[1] as usize, data[2] as usize, data[3] as usize);
        let valid = |n: usize| n != 0 && n % 2 == 0;
        valid(x) && valid(y) && data.len() >= HEADER_LEN + (x + y + colors) * 4
    }

    /// Encode to the wire format. The serialized flag is always written as set.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.x_divs.len() > MAX_DIVS {
            return Err(NinePatchError::ChunkTooLarge { what: "x divs", count: self.x_divs.len() });
        }
        if self.y_divs.len() > MAX_DIVS {
            return Err(NinePatchError::ChunkTooLarge { what: "y divs", count: self.y_divs.len() });
        }
        if self.colors.len() > MAX_COLORS {
            return Err(NinePatchError::ChunkTooLarge { what: "colors", count: self.colors.len() });
        }

        let len = HEADER_LEN + (self.x_divs.len() + self.y_divs.len()) * 8 + self.colors.len() * 4;
        let mut out = Vec::with_capacity(len);
        out.push(1);
        out.push((self.x_divs.len() * 2) as u8);
        out.push((self.y_divs.len() * 2) as u8);
        out.push(self.colors.len() as u8);

        let Padding { left, top, right, bottom } = self.padding;
        for value in [0, 0, left, right, top, bottom, 0] {
            out.extend_from_slice(&value.to_le_bytes());
        }
        for div in self.x_divs.iter().chain(&self.y_divs) {
            out.extend_from_slice(&div.start.to_le_bytes());
            out.extend_from_slice(&div.stop.to_le_bytes());
        }
        for color in &self.colors {
            out.extend_from_slice(&color.to_wire().to_le_bytes());
        }

        debug_assert_eq!(out.len(), len);
        Ok(out)
    }

    /// Return a copy with padding and div bounds multiplied by `factor`.
    pub fn rescale(&self, factor: f32) -> Self {
        let scale = |v: i32| (v as f32 * factor).round() as i32;
        let scale_divs = |divs: &[Div]| {
            divs.iter().map(|d| Div::new(scale(d.start), scale(d.stop))).collect()
        };
        Self {
            was_serialized: self.was_serialized,
            x_divs: scale_divs(&self.x_divs),
            y_divs: scale_divs(&self.y_divs),
            padding: Padding {
                left: scale(self.padding.left),
                top: scale(self.padding.top),
                right: scale(self.padding.right),
                bottom: scale(self.padding.bottom),
            },
            colors: self.colors.clone(),
        }
    }

    /// Rescale from an asset density to a display density, both in dpi.
    pub fn for_density(&self, source_dpi: u32, target_dpi: u32) -> Self {
        if source_dpi == 0 || source_dpi == target_dpi {
            return self.clone();
        }
        self.rescale(target_dpi as f32 / source_dpi as f32)
    }
}

fn check_div_count(axis: Axis, count: u8) -> std::result::Result<usize, ChunkError> {
    if count == 0 || count % 2 != 0 {
        return Err(ChunkError::DivCount { axis, count });
    }
    Ok(count as usize)
}

fn read_divs(reader: &mut Reader<'_>, count: usize) -> std::result::Result<Vec<Div>, ChunkError> {
    (0..count)
        .map(|_| Ok(Div::new(reader.read_i32()?, reader.read_i32()?)))
        .collect()
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> std::result::Result<&'a [u8], ChunkError> {
        let end = self.pos + n;
        if end > self.data.len() {
            return Err(ChunkError::Underflow { needed: end, available: self.data.len() });
        }
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn skip(&mut self, n: usize) {
        self.pos += n;
    }

    fn read_u8(&mut self) -> std::result::Result<u8, ChunkError> {
        Ok(self.take(1)?[0])
    }

    fn read_i32(&mut self) -> std::result::Result<i32, ChunkError> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}
