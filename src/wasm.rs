//! WebAssembly bindings for ninepatch

use wasm_bindgen::prelude::*;
use image::RgbaImage;
use crate::{Chunk, NinePatch, Remainder};

#[wasm_bindgen]
pub struct WasmNinePatch {
    inner: NinePatch,
}

#[wasm_bindgen]
impl WasmNinePatch {
    /// Create a nine-patch from raw RGBA pixels that include the marker frame
    ///
    /// # Arguments
    /// * `image_data` - RGBA bytes, row-major, `width * height * 4` long
    /// * `width`, `height` - Dimensions of the framed image
    #[wasm_bindgen(constructor)]
    pub fn new(image_data: &[u8], width: u32, height: u32) -> Result<WasmNinePatch, JsValue> {
        let img = RgbaImage::from_raw(width, height, image_data.to_vec())
            .ok_or_else(|| JsValue::from_str("Invalid image dimensions"))?;
        Ok(WasmNinePatch { inner: NinePatch::from_raw(&img) })
    }

    /// Create a nine-patch from frameless RGBA pixels and a serialized chunk
    #[wasm_bindgen]
    pub fn with_chunk(image_data: &[u8], width: u32, height: u32, chunk: &[u8]) -> Result<WasmNinePatch, JsValue> {
        let img = RgbaImage::from_raw(width, height, image_data.to_vec())
            .ok_or_else(|| JsValue::from_str("Invalid image dimensions"))?;
        let chunk = Chunk::parse(chunk).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmNinePatch { inner: NinePatch::new(img, chunk) })
    }

    #[wasm_bindgen]
    pub fn set_centered(&mut self, enabled: bool) {
        let remainder = if enabled { Remainder::Centered } else { Remainder::Last };
        self.inner = self.inner.clone().with_remainder(remainder);
    }

    #[wasm_bindgen]
    pub fn is_nine_patch(&self) -> bool {
        !self.inner.chunk().is_empty()
    }

    /// Stretch to `width` x `height` and return RGBA bytes
    #[wasm_bindgen]
    pub fn render(&self, width: u32, height: u32) -> Vec<u8> {
        self.inner.render(width, height).into_raw()
    }

    /// Serialized chunk, empty when the image is not a nine-patch
    #[wasm_bindgen]
    pub fn chunk_bytes(&self) -> Result<Vec<u8>, JsValue> {
        if !self.is_nine_patch() {
            return Ok(Vec::new());
        }
        self.inner.chunk().to_bytes().map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Content padding as `{ left, top, right, bottom }`
    #[wasm_bindgen]
    pub fn padding(&self) -> Result<js_sys::Object, JsValue> {
        let p = self.inner.padding();
        let result = js_sys::Object::new();
        js_sys::Reflect::set(&result, &"left".into(), &p.left.into())?;
        js_sys::Reflect::set(&result, &"top".into(), &p.top.into())?;
        js_sys::Reflect::set(&result, &"right".into(), &p.right.into())?;
        js_sys::Reflect::set(&result, &"bottom".into(), &p.bottom.into())?;
        Ok(result)
    }
}
