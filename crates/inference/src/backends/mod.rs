mod onnx;
pub use onnx::*;
