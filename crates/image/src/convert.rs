use {crate::*, base::Vec2, std::path::Path};

/// Decode a raw sensor frame into an interleaved RGB(A) image.
///
/// The output has exactly the frame's declared size. Compressed frames may
/// declare a zero size, meaning "whatever the file says".
///
/// # Errors
///
/// `UnsupportedFormat` for an unknown tag, `Geometry` when the planes cannot
/// cover the declared size, `Decode` when compressed data is invalid.
pub fn convert(frame: &RawFrame) -> Result<Image, ImageError> {
    let format = frame.pixel_format()?;
    if frame.planes.len() < format.plane_count() {
        return Err(ImageError::Geometry(format!(
            "{:?} needs {} planes, frame has {}",
            format,
            format.plane_count(),
            frame.planes.len()
        )));
    }
    if format != PixelFormat::Jpeg && frame.size.is_empty() {
        return Err(ImageError::Geometry(format!(
            "frame has zero extent: {}",
            frame.size
        )));
    }

    match format {
        PixelFormat::Yu12 => {
            let planes = &frame.planes;
            let nv21 = planes_to_nv21(frame.size, &planes[0], &planes[1], &planes[2])?;
            Ok(Image::rgb(frame.size, nv21_to_rgb(frame.size, &nv21)?))
        }
        PixelFormat::Yuyv => Ok(Image::rgb(
            frame.size,
            yuyv_to_rgb(frame.size, &frame.planes[0])?,
        )),
        PixelFormat::Jpeg => decode_compressed(&frame.planes[0].data, frame.size),
        PixelFormat::Rgb8 => Ok(Image::rgb(
            frame.size,
            copy_packed(frame.size, &frame.planes[0], 3)?,
        )),
        PixelFormat::Rgba8 => Ok(Image::rgba(
            frame.size,
            copy_packed(frame.size, &frame.planes[0], 4)?,
        )),
    }
}

// strip row padding from an already-decoded plane
fn copy_packed(size: Vec2<usize>, plane: &Plane, channels: usize) -> Result<Vec<u8>, ImageError> {
    plane.check_extent("packed", size, channels)?;
    let row_bytes = size.x * channels;
    let mut data = Vec::with_capacity(row_bytes * size.y);
    for row in 0..size.y {
        if plane.pixel_stride == channels {
            let start = plane.offset(0, row);
            let line = plane.data.get(start..start + row_bytes).ok_or_else(|| {
                ImageError::Geometry(format!(
                    "row {row} is outside a {}-byte plane",
                    plane.data.len()
                ))
            })?;
            data.extend_from_slice(line);
        } else {
            for col in 0..size.x {
                let start = plane.offset(col, row);
                let pixel = plane.data.get(start..start + channels).ok_or_else(|| {
                    ImageError::Geometry(format!(
                        "pixel ({col}, {row}) is outside a {}-byte plane",
                        plane.data.len()
                    ))
                })?;
                data.extend_from_slice(pixel);
            }
        }
    }
    Ok(data)
}

/// Decode a compressed image (format auto-detected) to RGB.
///
/// A non-zero `declared` size must match the decoded size.
pub fn decode_compressed(data: &[u8], declared: Vec2<usize>) -> Result<Image, ImageError> {
    let decoded = crates_image::load_from_memory(data)?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    let size = Vec2::new(width as usize, height as usize);
    if !declared.is_empty() && declared != size {
        return Err(ImageError::Geometry(format!(
            "frame declares {declared} but the image decodes to {size}"
        )));
    }
    Ok(Image::rgb(size, rgb.into_raw()))
}

/// Read and decode an image file, as picked from the gallery.
pub fn decode_file(path: impl AsRef<Path>) -> Result<Image, ImageError> {
    let data = std::fs::read(path)?;
    decode_compressed(&data, Vec2::zero())
}
