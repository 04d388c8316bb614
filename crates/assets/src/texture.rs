use crate::AssetError;
use std::path::Path;

/// A decoded image, always expanded to 8-bit RGBA, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    /// Read and decode an image file. Any format the `image` crate was built
    /// with is accepted; grayscale and RGB inputs are expanded to RGBA.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
            path: label.clone(),
            source,
        })?;
        let texture = Self::from_bytes(&label, &bytes)?;
        tracing::info!(
            path = %label,
            width = texture.width,
            height = texture.height,
            "loaded texture"
        );
        Ok(texture)
    }

    /// Decode an in-memory encoded image.
    pub fn from_bytes(label: &str, bytes: &[u8]) -> Result<Self, AssetError> {
        let decoded = image::load_from_memory(bytes).map_err(|source| AssetError::Decode {
            path: label.to_string(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(AssetError::Empty {
                path: label.to_string(),
            });
        }
        Ok(Self {
            label: label.to_string(),
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }

    /// Bytes per row of the RGBA data.
    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    fn pixel(tex: &TextureImage, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= tex.width || y >= tex.height {
            return None;
        }
        let i = ((y * tex.width + x) * 4) as usize;
        tex.rgba[i..i + 4].try_into().ok()
    }

    #[test]
    fn loads_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.png");
        let mut img = RgbaImage::from_pixel(4, 2, Rgba([10, 20, 30, 255]));
        img.put_pixel(3, 0, Rgba([255, 0, 0, 128]));
        img.save(&path).unwrap();

        let tex = TextureImage::load(&path).unwrap();
        assert_eq!((tex.width, tex.height), (4, 2));
        assert_eq!(tex.rgba.len(), 4 * 2 * 4);
        assert_eq!(tex.bytes_per_row(), 16);
        assert_eq!(pixel(&tex, 0, 0), Some([10, 20, 30, 255]));
        assert_eq!(pixel(&tex, 3, 0), Some([255, 0, 0, 128]));
        assert_eq!(pixel(&tex, 4, 0), None);
    }

    #[test]
    fn grayscale_is_expanded_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        GrayImage::from_pixel(2, 2, Luma([200])).save(&path).unwrap();

        let tex = TextureImage::load(&path).unwrap();
        assert_eq!(pixel(&tex, 1, 1), Some([200, 200, 200, 255]));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = TextureImage::load("/nonexistent/info.png").unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/info.png"));
    }

    #[test]
    fn garbage_is_decode_error() {
        let err = TextureImage::from_bytes("junk", b"not an image").unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }

    #[test]
    fn load_labels_texture_with_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label.png");
        RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let tex = TextureImage::load(&path).unwrap();
        assert_eq!(tex.label, path.display().to_string());
    }
}
