//! Decoded tile images as delivered by the map server.

use image::{DynamicImage, ImageReader};
use std::io::Cursor;

use crate::provider::ProviderError;

/// A fully decoded tile image of arbitrary size and pixel format.
///
/// Decoding is eager: the pixel data is materialized before the value is
/// returned, so a `RawTile` can be read any number of times.
#[derive(Debug, Clone)]
pub struct RawTile {
    image: DynamicImage,
    encoded_len: usize,
}

impl RawTile {
    /// Decodes an encoded image (PNG, JPEG, ...), guessing its format.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProviderError> {
        let image = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ProviderError::InvalidResponse(format!("Format error: {}", e)))?
            .decode()
            .map_err(|e| ProviderError::InvalidResponse(format!("Decode error: {}", e)))?;

        Ok(Self {
            image,
            encoded_len: bytes.len(),
        })
    }

    /// Wraps an already decoded image.
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image,
            encoded_len: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Size of the encoded bytes this tile was decoded from.
    pub fn encoded_len(&self) -> usize {
        self.encoded_len
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([1, 2, 3, 255]));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png)
            .expect("Failed to encode PNG");
        buffer.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let bytes = png_bytes(4, 8);
        let tile = RawTile::decode(&bytes).unwrap();

        assert_eq!(tile.width(), 4);
        assert_eq!(tile.height(), 8);
        assert_eq!(tile.encoded_len(), bytes.len());
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = RawTile::decode(b"definitely not an image");
        assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
    }

    #[test]
    fn test_decode_truncated_png_fails() {
        let bytes = png_bytes(16, 16);
        let result = RawTile::decode(&bytes[..bytes.len() / 2]);
        assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
    }
}
