mod clock;
pub use clock::*;

pub mod log;
pub use log::*;

mod tensor;
pub use tensor::*;

mod vec2;
pub use vec2::*;
