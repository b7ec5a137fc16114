use base::Vec2;

/// A decoded, interleaved 8-bit image (RGB or RGBA), row-major with no padding.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub size: Vec2<usize>,
    pub channels: usize,
    pub data: Vec<u8>,
}

impl Image {
    pub fn rgb(size: Vec2<usize>, data: Vec<u8>) -> Self {
        Self {
            size,
            channels: 3,
            data,
        }
    }

    pub fn rgba(size: Vec2<usize>, data: Vec<u8>) -> Self {
        Self {
            size,
            channels: 4,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.size.x
    }

    pub fn height(&self) -> usize {
        self.size.y
    }

    /// RGB of the pixel at (`x`, `y`); alpha is ignored.
    pub fn rgb_at(&self, x: usize, y: usize) -> (u8, u8, u8) {
        let i = (y * self.size.x + x) * self.channels;
        (self.data[i], self.data[i + 1], self.data[i + 2])
    }
}
