mod error;
pub use error::*;

mod record;
pub use record::*;

mod storage;
pub use storage::*;

mod store;
pub use store::*;
