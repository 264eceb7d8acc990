//! Pixel access used by the border analyzer.

use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

/// Read-only random access to ARGB pixels, 0-indexed.
pub trait PixelSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Packed `0xAARRGGBB`. Callers keep `x < width` and `y < height`.
    fn pixel(&self, x: u32, y: u32) -> u32;
}

pub fn argb(Rgba([r, g, b, a]): Rgba<u8>) -> u32 {
    u32::from_be_bytes([a, r, g, b])
}

pub fn rgba(argb: u32) -> Rgba<u8> {
    let [a, r, g, b] = argb.to_be_bytes();
    Rgba([r, g, b, a])
}

impl PixelSource for RgbaImage {
    fn width(&self) -> u32 {
        self.width()
    }

    fn height(&self) -> u32 {
        self.height()
    }

    fn pixel(&self, x: u32, y: u32) -> u32 {
        argb(*self.get_pixel(x, y))
    }
}

impl PixelSource for DynamicImage {
    fn width(&self) -> u32 {
        GenericImageView::width(self)
    }

    fn height(&self) -> u32 {
        GenericImageView::height(self)
    }

    fn pixel(&self, x: u32, y: u32) -> u32 {
        argb(self.get_pixel(x, y))
    }
}

impl<T: PixelSource + ?Sized> PixelSource for &T {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn pixel(&self, x: u32, y: u32) -> u32 {
        (**self).pixel(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn packs_alpha_first() {
        let px = Rgba([0x11, 0x22, 0x33, 0xFF]);
        assert_eq!(argb(px), 0xFF11_2233);
        assert_eq!(rgba(0xFF11_2233), px);
    }

    #[test]
    fn dynamic_and_buffer_agree() {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(1, 0, Rgba([0, 0, 0, 255]));
        let dynamic = DynamicImage::ImageRgba8(img.clone());
        assert_eq!(PixelSource::pixel(&img, 1, 0), 0xFF00_0000);
        assert_eq!(PixelSource::pixel(&dynamic, 1, 0), 0xFF00_0000);
        assert_eq!(PixelSource::width(&dynamic), 2);
    }
}
