//! Image classification models: backend seam, ONNX backend, preprocessing and result
//! interpretation.

mod backend;
pub use backend::*;

pub mod backends;
pub use backends::OnnxBackend;

mod config;
pub use config::*;

mod device;
pub use device::*;

mod error;
pub use error::*;

mod interpret;
pub use interpret::*;

mod model;
pub use model::*;

mod preprocess;
pub use preprocess::*;

mod result;
pub use result::*;

mod source;
pub use source::*;
