//! Nine-patch stretchable images: chunk codec, border analyzer and renderer.

pub mod canvas;
pub mod chunk;
pub mod region;
pub mod render;
pub mod scan;
pub mod source;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use canvas::ImageSink;
pub use chunk::{Axis, Chunk, ChunkError, Div, Padding, RegionColor};
pub use region::Segment;
pub use render::{Blit, RasterSink, Rect, Remainder, Renderer};
pub use scan::GeometryError;
pub use source::PixelSource;

use image::imageops::{self, FilterType};
use image::RgbaImage;
use log::debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NinePatchError {
    #[error("Malformed chunk: {0}")]
    MalformedChunk(#[from] ChunkError),
    #[error("Invalid stretch geometry: {0}")]
    InvalidStretchGeometry(#[from] GeometryError),
    #[error("Chunk too large: {count} {what}")]
    ChunkTooLarge { what: &'static str, count: usize },
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NinePatchError>;

/// How an image carries its stretch metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum NinePatchKind {
    /// A serialized chunk travels next to the pixels.
    Chunk,
    /// The pixels carry a one-pixel marker frame.
    Raw,
    None,
}

pub fn classify(source: Option<&dyn PixelSource>, chunk_bytes: Option<&[u8]>) -> NinePatchKind {
    if chunk_bytes.is_some_and(Chunk::is_chunk) {
        return NinePatchKind::Chunk;
    }
    match source {
        Some(source) if scan::is_raw_nine_patch(&source) => NinePatchKind::Raw,
        _ => NinePatchKind::None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub kind: NinePatchKind,
    pub chunk: Option<Chunk>,
}

/// Classify and extract the chunk of an image in one step.
pub fn parse(source: Option<&dyn PixelSource>, chunk_bytes: Option<&[u8]>) -> Result<Parsed> {
    let kind = classify(source, chunk_bytes);
    let chunk = match (kind, source, chunk_bytes) {
        (NinePatchKind::Chunk, _, Some(bytes)) => Some(Chunk::parse(bytes)?),
        (NinePatchKind::Raw, Some(source), _) => Some(scan::chunk_from_raw(&source)),
        _ => None,
    };
    Ok(Parsed { kind, chunk })
}

/// A content image together with the chunk that says how to stretch it.
#[derive(Debug, Clone)]
pub struct NinePatch {
    content: RgbaImage,
    chunk: Chunk,
    filter: FilterType,
    renderer: Renderer,
}

impl NinePatch {
    pub fn new(content: RgbaImage, chunk: Chunk) -> Self {
        Self { content, chunk, filter: FilterType::Triangle, renderer: Renderer::new() }
    }

    /// Read the marker frame of `image` and strip it from the content.
    ///
    /// Images that are not raw nine-patches are kept whole with an empty
    /// chunk, so they render as a plain scaled image.
    pub fn from_raw(image: &RgbaImage) -> Self {
        match scan::analyze(image) {
            Ok(chunk) => {
                let (w, h) = image.dimensions();
                let content = imageops::crop_imm(image, 1, 1, w - 2, h - 2).to_image();
                Self::new(content, chunk)
            }
            Err(e) => {
                debug!("treating image as plain: {e}");
                Self::new(image.clone(), Chunk::empty())
            }
        }
    }

    /// Pair an already frameless image with a serialized chunk.
    pub fn from_chunk(content: RgbaImage, chunk_bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(content, Chunk::parse(chunk_bytes)?))
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_remainder(mut self, remainder: Remainder) -> Self {
        self.renderer = self.renderer.with_remainder(remainder);
        self
    }

    /// Resize the content by `factor` and rescale the chunk to match.
    pub fn scaled(self, factor: f32) -> Self {
        if factor == 1.0 || factor <= 0.0 {
            return self;
        }
        let (w, h) = self.content.dimensions();
        let width = (w as f32 * factor).round().max(1.0) as u32;
        let height = (h as f32 * factor).round().max(1.0) as u32;
        Self {
            content: imageops::resize(&self.content, width, height, self.filter),
            chunk: self.chunk.rescale(factor),
            ..self
        }
    }

    /// Adapt an asset authored at `source_dpi` for display at `target_dpi`.
    pub fn for_density(self, source_dpi: u32, target_dpi: u32) -> Self {
        if source_dpi == 0 {
            return self;
        }
        self.scaled(target_dpi as f32 / source_dpi as f32)
    }

    pub fn chunk(&self) -> &Chunk {
        &self.chunk
    }

    pub fn content(&self) -> &RgbaImage {
        &self.content
    }

    pub fn padding(&self) -> Padding {
        self.chunk.padding
    }

    /// Smallest size that keeps every fixed region at its natural size.
    pub fn min_size(&self) -> (u32, u32) {
        let (w, h) = self.content.dimensions();
        let fixed = |divs: &[Div], max: u32| {
            region::decompose_clamped(divs, max as i32)
                .iter()
                .filter(|s| !s.stretch)
                .map(Segment::len)
                .sum::<i32>() as u32
        };
        (fixed(&self.chunk.x_divs, w), fixed(&self.chunk.y_divs, h))
    }

    pub fn blits(&self, width: u32, height: u32) -> Vec<Blit> {
        let (w, h) = self.content.dimensions();
        self.renderer.plan(&self.chunk, w as i32, h as i32, width as i32, height as i32)
    }

    pub fn render(&self, width: u32, height: u32) -> RgbaImage {
        let mut sink = ImageSink::new(&self.content, width, height).with_filter(self.filter);
        for blit in self.blits(width, height) {
            sink.blit(&blit);
        }
        sink.into_image()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{argb, rgba};
    use image::Rgba;
    use test_log::test;

    const BLACK: u32 = 0xFF00_0000;

    /// 6x6 content: a 2px red frame around a green 2x2 center, marked to
    /// stretch the center on both axes.
    fn raw() -> RgbaImage {
        let mut img = RgbaImage::from_fn(8, 8, |x, y| {
            let border = x == 0 || y == 0 || x == 7 || y == 7;
            let center = (3..5).contains(&x) && (3..5).contains(&y);
            match (border, center) {
                (true, _) => rgba(0),
                (_, true) => rgba(0xFF00_FF00),
                _ => rgba(0xFFFF_0000),
            }
        });
        for i in 3..5 {
            img.put_pixel(i, 0, rgba(BLACK));
            img.put_pixel(0, i, rgba(BLACK));
        }
        img
    }

    #[test]
    fn raw_frame_is_stripped() {
        let patch = NinePatch::from_raw(&raw());
        assert_eq!(patch.content().dimensions(), (6, 6));
        assert_eq!(patch.chunk().x_divs, vec![Div::new(2, 4)]);
        assert_eq!(patch.padding(), Padding { left: 2, top: 2, right: 2, bottom: 2 });
        assert_eq!(patch.min_size(), (4, 4));
    }

    #[test]
    fn plain_image_keeps_every_pixel() {
        let img = RgbaImage::from_pixel(5, 5, Rgba([1, 2, 3, 255]));
        let patch = NinePatch::from_raw(&img);
        assert_eq!(patch.content().dimensions(), (5, 5));
        assert!(patch.chunk().is_empty());
        assert_eq!(patch.blits(10, 10).len(), 1);
    }

    #[test]
    fn fixed_regions_stay_pixel_exact() {
        let patch = NinePatch::from_raw(&raw()).with_filter(FilterType::Nearest);
        let out = patch.render(20, 12);
        assert_eq!(out.dimensions(), (20, 12));
        // corners and edges keep their red frame
        for (x, y) in [(0, 0), (1, 1), (19, 11), (18, 10), (0, 11), (19, 0)] {
            assert_eq!(argb(*out.get_pixel(x, y)), 0xFFFF_0000, "({x}, {y})");
        }
        // the stretched center is green throughout
        for y in 2..10 {
            for x in 2..18 {
                assert_eq!(argb(*out.get_pixel(x, y)), 0xFF00_FF00, "({x}, {y})");
            }
        }
    }

    #[test]
    fn density_scaling_rescales_chunk() {
        let patch = NinePatch::from_raw(&raw()).with_filter(FilterType::Nearest).for_density(160, 320);
        assert_eq!(patch.content().dimensions(), (12, 12));
        assert_eq!(patch.chunk().x_divs, vec![Div::new(4, 8)]);
        assert_eq!(patch.padding().left, 4);
    }

    #[test]
    fn classify_prefers_serialized_chunk() {
        let img = raw();
        let bytes = scan::analyze(&img).unwrap().to_bytes().unwrap();
        assert_eq!(classify(Some(&img), Some(&bytes)), NinePatchKind::Chunk);
        assert_eq!(classify(Some(&img), None), NinePatchKind::Raw);
        assert_eq!(classify(Some(&img), Some(&[0u8; 4][..])), NinePatchKind::Raw);
        assert_eq!(classify(None, None), NinePatchKind::None);

        let plain = RgbaImage::new(4, 4);
        assert_eq!(classify(Some(&plain), None), NinePatchKind::None);
    }

    #[test]
    fn parse_yields_kind_and_chunk() {
        let img = raw();
        let parsed = parse(Some(&img), None).unwrap();
        assert_eq!(parsed.kind, NinePatchKind::Raw);
        assert_eq!(parsed.chunk, Some(scan::analyze(&img).unwrap()));

        let bytes = parsed.chunk.unwrap().to_bytes().unwrap();
        let from_bytes = parse(None, Some(&bytes)).unwrap();
        assert_eq!(from_bytes.kind, NinePatchKind::Chunk);

        assert_eq!(parse(None, None).unwrap(), Parsed { kind: NinePatchKind::None, chunk: None });
    }

    #[test]
    fn from_chunk_propagates_malformed_bytes() {
        let err = NinePatch::from_chunk(RgbaImage::new(4, 4), &[0; 40]).unwrap_err();
        assert!(matches!(err, NinePatchError::MalformedChunk(ChunkError::NotSerialized)));
    }
}
