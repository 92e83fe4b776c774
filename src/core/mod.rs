pub mod backup;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod events;
pub mod scan;
pub mod source;
pub mod summary;

pub use coordinator::{SessionCoordinator, SessionSnapshot};
