use {
    crate::{InferError, InputShape, Layout, Normalization},
    base::Tensor,
    image::Image,
};

/// Source sample positions for one output axis: (low index, high index, weight of high).
fn sample_axis(src: usize, dst: usize) -> Vec<(usize, usize, f32)> {
    let scale = src as f32 / dst as f32;
    let last = (src - 1) as f32;
    (0..dst)
        .map(|i| {
            let pos = ((i as f32 + 0.5) * scale - 0.5).clamp(0.0, last);
            let i0 = pos.floor() as usize;
            let i1 = (i0 + 1).min(src - 1);
            (i0, i1, pos - i0 as f32)
        })
        .collect()
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Resize, adapt channels, normalize and lay out an image as the model's input tensor.
///
/// The result always has shape `shape.dims()`. Bilinear sampling uses half-pixel centers
/// and clamps at the edges; RGBA input loses its alpha, single-channel models get BT.601 luma.
pub fn preprocess(
    image: &Image,
    shape: &InputShape,
    normalization: &Normalization,
) -> Result<Tensor<f32>, InferError> {
    shape.validate()?;
    let (src_w, src_h) = (image.width(), image.height());
    if src_w == 0 || src_h == 0 {
        return Err(InferError::InvalidShape(format!(
            "image {} is empty",
            image.size
        )));
    }
    let stride = image.channels;
    if stride < 3 || image.data.len() < src_w * src_h * stride {
        return Err(InferError::InvalidShape(format!(
            "image {} with {} channels holds {} bytes",
            image.size,
            stride,
            image.data.len()
        )));
    }

    let (dst_w, dst_h, channels) = (shape.width, shape.height, shape.channels);
    let xs = sample_axis(src_w, dst_w);
    let ys = sample_axis(src_h, dst_h);
    let plane = dst_w * dst_h;
    let mut data = vec![0.0f32; plane * channels];

    let texel = |x: usize, y: usize, c: usize| image.data[(y * src_w + x) * stride + c] as f32;

    for (oy, &(y0, y1, fy)) in ys.iter().enumerate() {
        for (ox, &(x0, x1, fx)) in xs.iter().enumerate() {
            let mut rgb = [0.0f32; 3];
            for (c, value) in rgb.iter_mut().enumerate() {
                let top = lerp(texel(x0, y0, c), texel(x1, y0, c), fx);
                let bottom = lerp(texel(x0, y1, c), texel(x1, y1, c), fx);
                *value = lerp(top, bottom, fy);
            }
            let pixel = oy * dst_w + ox;
            if channels == 1 {
                let luma = 0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2];
                data[pixel] = normalization.apply(luma);
            } else {
                for (c, &value) in rgb.iter().enumerate() {
                    let index = match shape.layout {
                        Layout::Nhwc => pixel * channels + c,
                        Layout::Nchw => c * plane + pixel,
                    };
                    data[index] = normalization.apply(value);
                }
            }
        }
    }

    Ok(Tensor::new(shape.dims(), data)?)
}
