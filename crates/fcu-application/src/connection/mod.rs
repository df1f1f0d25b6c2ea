//! Connection management.

mod keeper;

pub use keeper::{ConnectionKeeper, ShutdownDecision};
