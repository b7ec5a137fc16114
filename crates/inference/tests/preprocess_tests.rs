use {
    base::Vec2,
    image::Image,
    inference::{InferError, InputShape, Layout, Normalization, preprocess},
};

fn solid(width: usize, height: usize, rgb: [u8; 3]) -> Image {
    let data = rgb.repeat(width * height);
    Image::rgb(Vec2::new(width, height), data)
}

#[test]
fn test_output_matches_dims() {
    let image = solid(640, 480, [10, 20, 30]);
    for shape in [
        InputShape::new(224, 224, 3, Layout::Nhwc),
        InputShape::new(224, 224, 3, Layout::Nchw),
        InputShape::new(96, 128, 1, Layout::Nchw),
        InputShape::new(1, 1, 3, Layout::Nhwc),
    ] {
        let tensor = preprocess(&image, &shape, &Normalization::unit()).unwrap();
        assert_eq!(tensor.shape, shape.dims());
        assert_eq!(tensor.data.len(), shape.element_count());
    }
}

#[test]
fn test_solid_color_survives_resize() {
    let image = solid(37, 23, [255, 0, 51]);
    let shape = InputShape::new(224, 224, 3, Layout::Nhwc);
    let tensor = preprocess(&image, &shape, &Normalization::unit()).unwrap();
    for pixel in tensor.data.chunks(3) {
        assert!((pixel[0] - 1.0).abs() < 1e-5);
        assert!(pixel[1].abs() < 1e-5);
        assert!((pixel[2] - 0.2).abs() < 1e-5);
    }
}

#[test]
fn test_same_size_is_identity() {
    let data: Vec<u8> = (0..4 * 3 * 3).map(|v| v as u8).collect();
    let image = Image::rgb(Vec2::new(4, 3), data.clone());
    let shape = InputShape::new(3, 4, 3, Layout::Nhwc);
    let tensor = preprocess(&image, &shape, &Normalization::raw()).unwrap();
    let expected: Vec<f32> = data.iter().map(|&v| v as f32).collect();
    assert_eq!(tensor.data, expected);
}

#[test]
fn test_nchw_planes() {
    let image = solid(8, 8, [255, 0, 0]);
    let shape = InputShape::new(2, 2, 3, Layout::Nchw);
    let tensor = preprocess(&image, &shape, &Normalization::symmetric()).unwrap();
    let plane = 4;
    assert!(tensor.data[..plane].iter().all(|&v| (v - 1.0).abs() < 1e-5));
    assert!(tensor.data[plane..].iter().all(|&v| (v + 1.0).abs() < 1e-5));
}

#[test]
fn test_bilinear_midpoint() {
    // black | white, upscaled 2x: inner samples blend the neighbours
    let image = Image::rgb(Vec2::new(2, 1), vec![0, 0, 0, 255, 255, 255]);
    let shape = InputShape::new(1, 4, 3, Layout::Nhwc);
    let tensor = preprocess(&image, &shape, &Normalization::raw()).unwrap();
    let reds: Vec<f32> = tensor.data.chunks(3).map(|p| p[0]).collect();
    assert_eq!(reds[0], 0.0);
    assert!((reds[1] - 63.75).abs() < 1e-3);
    assert!((reds[2] - 191.25).abs() < 1e-3);
    assert_eq!(reds[3], 255.0);
}

#[test]
fn test_rgba_drops_alpha() {
    let image = Image::rgba(Vec2::new(2, 2), [10, 20, 30, 0].repeat(4));
    let shape = InputShape::new(2, 2, 3, Layout::Nhwc);
    let tensor = preprocess(&image, &shape, &Normalization::raw()).unwrap();
    assert_eq!(tensor.data, [10.0f32, 20.0, 30.0].repeat(4));
}

#[test]
fn test_single_channel_luma() {
    let image = solid(4, 4, [255, 255, 255]);
    let shape = InputShape::new(2, 2, 1, Layout::Nhwc);
    let tensor = preprocess(&image, &shape, &Normalization::unit()).unwrap();
    assert_eq!(tensor.shape, vec![1, 2, 2, 1]);
    assert!(tensor.data.iter().all(|&v| (v - 1.0).abs() < 1e-4));
}

#[test]
fn test_rejects_bad_shapes() {
    let image = solid(4, 4, [0, 0, 0]);
    for shape in [
        InputShape::new(0, 224, 3, Layout::Nhwc),
        InputShape::new(224, 0, 3, Layout::Nhwc),
        InputShape::new(224, 224, 4, Layout::Nhwc),
        InputShape::new(224, 224, 2, Layout::Nchw),
    ] {
        assert!(matches!(
            preprocess(&image, &shape, &Normalization::unit()),
            Err(InferError::InvalidShape(_))
        ));
    }
}

#[test]
fn test_rejects_empty_image() {
    let image = Image::rgb(Vec2::new(0, 0), Vec::new());
    let shape = InputShape::new(224, 224, 3, Layout::Nhwc);
    assert!(matches!(
        preprocess(&image, &shape, &Normalization::unit()),
        Err(InferError::InvalidShape(_))
    ));
}
