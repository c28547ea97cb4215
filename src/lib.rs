pub mod audit;
pub mod config;
pub mod control;
pub mod correlation;
pub mod error;
pub mod events;
pub mod logging;
pub mod metadata;
pub mod slack;
pub mod source;
pub mod sweeper;

pub use control::{ControlStatus, ModLogger};
pub use error::{ModLoggerError, Result};
