//! Sensor frame decoding for the dermoscan pipeline.
//!
//! A capture collaborator hands over a `RawFrame` (planar YUV, packed YUYV,
//! a compressed file, or pixels that are already decoded). `convert` turns
//! it into an interleaved RGB(A) `Image` of the frame's declared size.

mod convert;
pub use convert::*;

mod error;
pub use error::*;

mod frame;
pub use frame::*;

mod image;
pub use image::*;

mod pixelformat;
pub use pixelformat::*;

mod yuv;
pub use yuv::*;
