use {crate::*, base::Vec2};

fn chroma_size(size: Vec2<usize>) -> Vec2<usize> {
    Vec2::new(size.x.div_ceil(2), size.y.div_ceil(2))
}

/// Reassemble three 4:2:0 planes into NV21: a tight Y plane followed by
/// interleaved `V, U` pairs, one pair per 2x2 block.
///
/// Each plane is read through its own row and pixel stride, so padded rows
/// and semi-planar chroma views (pixel stride 2) are both handled.
pub fn planes_to_nv21(
    size: Vec2<usize>,
    y: &Plane,
    u: &Plane,
    v: &Plane,
) -> Result<Vec<u8>, ImageError> {
    let chroma = chroma_size(size);
    y.check_extent("luma", size, 1)?;
    u.check_extent("U", chroma, 1)?;
    v.check_extent("V", chroma, 1)?;
    let luma_len = size.x * size.y;
    let mut nv21 = Vec::with_capacity(luma_len + chroma.x * chroma.y * 2);

    for row in 0..size.y {
        if y.pixel_stride == 1 {
            let start = y.offset(0, row);
            let end = start + size.x;
            let line = y.data.get(start..end).ok_or_else(|| {
                ImageError::Geometry(format!(
                    "luma row {row} spans bytes {start}..{end} of a {}-byte plane",
                    y.data.len()
                ))
            })?;
            nv21.extend_from_slice(line);
        } else {
            for col in 0..size.x {
                nv21.push(y.sample(col, row)?);
            }
        }
    }

    for row in 0..chroma.y {
        for col in 0..chroma.x {
            nv21.push(v.sample(col, row)?);
            nv21.push(u.sample(col, row)?);
        }
    }

    Ok(nv21)
}

/// Decode an NV21 buffer (as produced by `planes_to_nv21`) to packed RGB.
pub fn nv21_to_rgb(size: Vec2<usize>, nv21: &[u8]) -> Result<Vec<u8>, ImageError> {
    let chroma = chroma_size(size);
    let luma_len = size.area();
    let expected = luma_len
        .zip(chroma.area().and_then(|area| area.checked_mul(2)))
        .and_then(|(luma, vu)| luma.checked_add(vu));
    let (Some(luma_len), Some(expected)) = (luma_len, expected) else {
        return Err(ImageError::Geometry(format!("NV21 buffer for {size} overflows")));
    };
    if nv21.len() < expected {
        return Err(ImageError::Geometry(format!(
            "NV21 buffer for {size} needs {expected} bytes, got {}",
            nv21.len()
        )));
    }

    let (luma, vu) = nv21.split_at(luma_len);
    let mut rgb = Vec::with_capacity(luma_len * 3);
    for row in 0..size.y {
        let vu_row = &vu[(row / 2) * chroma.x * 2..];
        for col in 0..size.x {
            let pair = (col / 2) * 2;
            let (r, g, b) = yuv_to_rgb(luma[row * size.x + col], vu_row[pair + 1], vu_row[pair]);
            rgb.extend_from_slice(&[r, g, b]);
        }
    }

    Ok(rgb)
}

/// Decode packed YUYV (`Y0 U Y1 V` per pixel pair) to RGB, honoring the
/// plane's row stride.
pub fn yuyv_to_rgb(size: Vec2<usize>, plane: &Plane) -> Result<Vec<u8>, ImageError> {
    let row_bytes = size.x.div_ceil(2).checked_mul(4);
    plane.check_rows("YUYV", size.y, row_bytes)?;
    let row_bytes = size.x.div_ceil(2) * 4;
    let mut rgb = Vec::with_capacity(size.x * size.y * 3);

    for row in 0..size.y {
        let start = row * plane.row_stride;
        let line = plane.data.get(start..start + row_bytes).ok_or_else(|| {
            ImageError::Geometry(format!(
                "YUYV row {row} is outside a {}-byte plane",
                plane.data.len()
            ))
        })?;
        for (pair, chunk) in line.chunks_exact(4).enumerate() {
            let (r0, g0, b0) = yuv_to_rgb(chunk[0], chunk[1], chunk[3]);
            rgb.extend_from_slice(&[r0, g0, b0]);
            // odd widths leave the second pixel of the last pair off-screen
            if pair * 2 + 1 < size.x {
                let (r1, g1, b1) = yuv_to_rgb(chunk[2], chunk[1], chunk[3]);
                rgb.extend_from_slice(&[r1, g1, b1]);
            }
        }
    }

    Ok(rgb)
}
