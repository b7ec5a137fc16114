use {crate::*, base::Vec2};

/// One plane of sensor data. Rows may be padded (`row_stride` larger than the
/// visible row) and samples may be spaced (`pixel_stride` larger than one).
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub data: Vec<u8>,
    pub row_stride: usize,
    pub pixel_stride: usize,
}

impl Plane {
    pub fn new(data: Vec<u8>, row_stride: usize, pixel_stride: usize) -> Self {
        Self {
            data,
            row_stride,
            pixel_stride,
        }
    }

    /// A plane with no row padding.
    pub fn packed(data: Vec<u8>, width: usize, pixel_stride: usize) -> Self {
        Self::new(data, width * pixel_stride, pixel_stride)
    }

    pub(crate) fn offset(&self, x: usize, y: usize) -> usize {
        y * self.row_stride + x * self.pixel_stride
    }

    /// Check that an `extent` of `sample_bytes`-wide samples lies inside the plane.
    ///
    /// Runs before anything is sized from the extent, so a bogus declaration fails
    /// here instead of overflowing or exhausting memory later.
    pub(crate) fn check_extent(
        &self,
        name: &str,
        extent: Vec2<usize>,
        sample_bytes: usize,
    ) -> Result<(), ImageError> {
        if extent.x > 1 && self.pixel_stride < sample_bytes {
            return Err(ImageError::Geometry(format!(
                "{name} plane pixel stride {} is narrower than a {sample_bytes}-byte sample",
                self.pixel_stride
            )));
        }
        let span = extent
            .x
            .saturating_sub(1)
            .checked_mul(self.pixel_stride)
            .and_then(|bytes| bytes.checked_add(sample_bytes));
        self.check_rows(name, extent.y, span)
    }

    /// Check that `rows` rows of `row_span` bytes each fit the plane.
    pub(crate) fn check_rows(
        &self,
        name: &str,
        rows: usize,
        row_span: Option<usize>,
    ) -> Result<(), ImageError> {
        let overflow = || ImageError::Geometry(format!("{name} plane extent overflows"));
        let span = row_span.ok_or_else(overflow)?;
        if rows > 1 && self.row_stride < span {
            return Err(ImageError::Geometry(format!(
                "{name} plane row stride {} is shorter than a {span}-byte row",
                self.row_stride
            )));
        }
        let required = rows
            .saturating_sub(1)
            .checked_mul(self.row_stride)
            .and_then(|bytes| bytes.checked_add(span))
            .ok_or_else(overflow)?;
        if self.data.len() < required {
            return Err(ImageError::Geometry(format!(
                "{name} plane needs {required} bytes, has {}",
                self.data.len()
            )));
        }
        Ok(())
    }

    pub(crate) fn sample(&self, x: usize, y: usize) -> Result<u8, ImageError> {
        let offset = self.offset(x, y);
        self.data.get(offset).copied().ok_or_else(|| {
            ImageError::Geometry(format!(
                "sample ({x}, {y}) at offset {offset} is outside a {}-byte plane",
                self.data.len()
            ))
        })
    }
}

/// Sensor output as handed over by the capture collaborator.
///
/// `format` is the raw fourcc tag; it is only interpreted by `convert`, so a
/// frame with an unknown tag can still be constructed and rejected there.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    pub format: u32,
    pub size: Vec2<usize>,
    pub planes: Vec<Plane>,
}

impl RawFrame {
    pub fn new(format: u32, size: Vec2<usize>, planes: Vec<Plane>) -> Self {
        Self {
            format,
            size,
            planes,
        }
    }

    pub fn yuv420(size: Vec2<usize>, y: Plane, u: Plane, v: Plane) -> Self {
        Self::new(FOURCC_YU12, size, vec![y, u, v])
    }

    pub fn yuyv(size: Vec2<usize>, data: Vec<u8>) -> Self {
        let plane = Plane::new(data, size.x * 2, 2);
        Self::new(FOURCC_YUYV, size, vec![plane])
    }

    /// A compressed image of unknown size (e.g. picked from the gallery).
    pub fn compressed(data: Vec<u8>) -> Self {
        let row_stride = data.len();
        Self::new(
            FOURCC_MJPG,
            Vec2::zero(),
            vec![Plane::new(data, row_stride, 1)],
        )
    }

    pub fn rgb(size: Vec2<usize>, data: Vec<u8>) -> Self {
        Self::new(FOURCC_RGB8, size, vec![Plane::packed(data, size.x, 3)])
    }

    pub fn rgba(size: Vec2<usize>, data: Vec<u8>) -> Self {
        Self::new(FOURCC_RGBA, size, vec![Plane::packed(data, size.x, 4)])
    }

    pub fn pixel_format(&self) -> Result<PixelFormat, ImageError> {
        PixelFormat::from_fourcc(self.format)
    }
}
