//! Domain layer: pure business rules for the journey.
//!
//! Nothing in here touches the DOM, timers, or message ports.  Each module is
//! a small set of value types plus the functions that check them.

pub mod connection;
pub mod frame;
pub mod origins;
pub mod status;
