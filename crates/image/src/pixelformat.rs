use crate::*;

// fourcc codes
pub const FOURCC_YU12: u32 = u32::from_le_bytes(*b"YU12");
pub const FOURCC_YUYV: u32 = u32::from_le_bytes(*b"YUYV");
pub const FOURCC_MJPG: u32 = u32::from_le_bytes(*b"MJPG");
pub const FOURCC_RGB8: u32 = u32::from_le_bytes(*b"RGB8");
pub const FOURCC_RGBA: u32 = u32::from_le_bytes(*b"RGBA");

/// Convert a fourcc code to a readable 4-character string.
pub fn fourcc_to_string(fourcc: u32) -> String {
    let bytes = fourcc.to_le_bytes();
    if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        String::from_utf8_lossy(&bytes).into_owned()
    } else {
        format!("0x{:08X}", fourcc)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Planar YUV 4:2:0: Y, U and V planes, each with its own strides.
    Yu12,
    /// Packed YUV 4:2:2 in a single plane.
    Yuyv,
    /// Compressed still image.
    Jpeg,
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn from_fourcc(fourcc: u32) -> Result<Self, ImageError> {
        match fourcc {
            FOURCC_YU12 => Ok(PixelFormat::Yu12),
            FOURCC_YUYV => Ok(PixelFormat::Yuyv),
            FOURCC_MJPG => Ok(PixelFormat::Jpeg),
            FOURCC_RGB8 => Ok(PixelFormat::Rgb8),
            FOURCC_RGBA => Ok(PixelFormat::Rgba8),
            _ => Err(ImageError::UnsupportedFormat(fourcc)),
        }
    }

    pub fn as_fourcc(&self) -> u32 {
        match self {
            PixelFormat::Yu12 => FOURCC_YU12,
            PixelFormat::Yuyv => FOURCC_YUYV,
            PixelFormat::Jpeg => FOURCC_MJPG,
            PixelFormat::Rgb8 => FOURCC_RGB8,
            PixelFormat::Rgba8 => FOURCC_RGBA,
        }
    }

    pub fn plane_count(&self) -> usize {
        match self {
            PixelFormat::Yu12 => 3,
            _ => 1,
        }
    }
}

// BT.601 YUV-to-RGB conversion for a single pixel (fixed-point, shift 8)
pub(crate) fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as i32;
    let u = u as i32 - 128;
    let v = v as i32 - 128;
    let r = (y + ((359 * v) >> 8)).clamp(0, 255) as u8;
    let g = (y - ((88 * u + 183 * v) >> 8)).clamp(0, 255) as u8;
    let b = (y + ((454 * u) >> 8)).clamp(0, 255) as u8;
    (r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuv_to_rgb_neutral_chroma_is_gray() {
        assert_eq!(yuv_to_rgb(0, 128, 128), (0, 0, 0));
        assert_eq!(yuv_to_rgb(100, 128, 128), (100, 100, 100));
        assert_eq!(yuv_to_rgb(255, 128, 128), (255, 255, 255));
    }

    #[test]
    fn test_yuv_to_rgb_clamps() {
        let (r, _, b) = yuv_to_rgb(255, 255, 255);
        assert_eq!((r, b), (255, 255));
        let (r, _, b) = yuv_to_rgb(0, 0, 0);
        assert_eq!((r, b), (0, 0));
    }
}
