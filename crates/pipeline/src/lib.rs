//! Classification session: takes captures from the host, runs them through the model off the
//! host's task and delivers results, recording them in history.

mod config;
pub use config::*;

mod coordinator;
pub use coordinator::*;

mod delivery;
pub use delivery::*;

mod error;
pub use error::*;

mod phase;
pub use phase::*;
