//! PNG helpers shared by the matcher and by document backends
use crate::errors::VisualError;
use image::{DynamicImage, GenericImageView, RgbaImage};
use selfheal_core_types::BoundingBox;
use std::io::Cursor;

/// Decode PNG (or any format `image` can guess) bytes
pub fn decode(data: &[u8]) -> Result<DynamicImage, VisualError> {
    if data.is_empty() {
        return Err(VisualError::InvalidInput("empty image buffer".to_string()));
    }
    image::load_from_memory(data)
        .map_err(|e| VisualError::Decode(format!("Failed to decode image: {}", e)))
}

/// Encode an RGBA buffer as PNG
pub fn encode_png(img: RgbaImage) -> Result<Vec<u8>, VisualError> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| VisualError::ImageProcessing(format!("Failed to encode png: {}", e)))?;
    Ok(buf)
}

/// Width and height of encoded image bytes
pub fn dimensions(data: &[u8]) -> Result<(u32, u32), VisualError> {
    Ok(decode(data)?.dimensions())
}

/// Crop `bbox` out of an encoded image, clamped to the image bounds
pub fn crop_png(data: &[u8], bbox: &BoundingBox) -> Result<Vec<u8>, VisualError> {
    let img = decode(data)?;
    let cropped = crop(&img, bbox)?;
    encode_png(cropped.to_rgba8())
}

pub fn crop(img: &DynamicImage, bbox: &BoundingBox) -> Result<DynamicImage, VisualError> {
    let (width, height) = img.dimensions();
    let x0 = (bbox.x.max(0.0).floor() as u32).min(width);
    let y0 = (bbox.y.max(0.0).floor() as u32).min(height);
    let x1 = ((bbox.x + bbox.width).max(0.0).ceil() as u32).min(width);
    let y1 = ((bbox.y + bbox.height).max(0.0).ceil() as u32).min(height);
    if x1 <= x0 || y1 <= y0 {
        return Err(VisualError::InvalidInput(format!(
            "clip {:?} lies outside {}x{} image",
            bbox, width, height
        )));
    }
    Ok(img.crop_imm(x0, y0, x1 - x0, y1 - y0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample(width: u32, height: u32) -> Vec<u8> {
        encode_png(RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]))).unwrap()
    }

    #[test]
    fn crop_is_clamped_to_bounds() {
        let png = sample(50, 40);
        let clip = crop_png(&png, &BoundingBox::new(40.0, 30.0, 30.0, 30.0)).unwrap();
        assert_eq!(dimensions(&clip).unwrap(), (10, 10));
    }

    #[test]
    fn crop_outside_image_is_rejected() {
        let png = sample(20, 20);
        let err = crop_png(&png, &BoundingBox::new(25.0, 0.0, 5.0, 5.0)).unwrap_err();
        assert!(matches!(err, VisualError::InvalidInput(_)));
    }

    #[test]
    fn empty_buffer_is_invalid() {
        assert!(matches!(decode(&[]), Err(VisualError::InvalidInput(_))));
        assert!(matches!(decode(b"not a png"), Err(VisualError::Decode(_))));
    }
}
