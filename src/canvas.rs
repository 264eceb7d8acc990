//! Raster sink backed by an `image` buffer.

use crate::render::{Blit, RasterSink};
use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Draws blits from a content image onto an owned target image.
pub struct ImageSink<'a> {
    source: &'a RgbaImage,
    target: RgbaImage,
    filter: FilterType,
}

impl<'a> ImageSink<'a> {
    pub fn new(source: &'a RgbaImage, width: u32, height: u32) -> Self {
        Self { source, target: RgbaImage::new(width, height), filter: FilterType::Triangle }
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn into_image(self) -> RgbaImage {
        self.target
    }
}

impl RasterSink for ImageSink<'_> {
    fn blit(&mut self, blit: &Blit) {
        let (src, dst) = (blit.src, blit.dst);
        if src.width <= 0 || src.height <= 0 || dst.width <= 0 || dst.height <= 0 {
            return;
        }
        let region = imageops::crop_imm(
            self.source,
            src.x as u32,
            src.y as u32,
            src.width as u32,
            src.height as u32,
        );
        // Same-size cells are copied verbatim so fixed regions stay pixel-exact.
        let mut cell = region.to_image();
        if (src.width, src.height) != (dst.width, dst.height) {
            cell = imageops::resize(&cell, dst.width as u32, dst.height as u32, self.filter);
        }
        imageops::replace(&mut self.target, &cell, dst.x as i64, dst.y as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Rect;
    use image::Rgba;
    use test_log::test;

    fn checker() -> RgbaImage {
        RgbaImage::from_fn(4, 4, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        })
    }

    #[test]
    fn same_size_blit_is_exact() {
        let source = checker();
        let mut sink = ImageSink::new(&source, 6, 6);
        sink.blit(&Blit { src: Rect::new(1, 1, 2, 2), dst: Rect::new(4, 4, 2, 2) });
        let out = sink.into_image();
        assert_eq!(out.get_pixel(4, 4), source.get_pixel(1, 1));
        assert_eq!(out.get_pixel(5, 4), source.get_pixel(2, 1));
        assert_eq!(out.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn scaled_blit_fills_destination() {
        let source = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
        let mut sink = ImageSink::new(&source, 8, 8).with_filter(FilterType::Nearest);
        sink.blit(&Blit { src: Rect::new(0, 0, 2, 2), dst: Rect::new(0, 0, 8, 8) });
        let out = sink.into_image();
        assert!(out.pixels().all(|p| *p == Rgba([10, 20, 30, 255])));
    }
}
