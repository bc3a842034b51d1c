//! Application layer: the journey lifecycle.
//!
//! - [`config`]          – caller-supplied configuration and callbacks.
//! - [`message_channel`] – inbound validation/dispatch and outbound sends.
//! - [`journey`]         – the lifecycle controller that owns overlay and channel.
//! - [`facade`]          – `create_journey`, the narrowed public entry point.

pub mod config;
pub mod facade;
pub mod journey;
pub mod message_channel;
