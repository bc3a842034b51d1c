//! Cross-window message protocol.
//!
//! Both directions use the same JSON envelope:
//!
//! ```json
//! {"type":"complete","sessionId":"abc","data":{"accountId":"42"},"timestamp":1718000000000}
//! ```
//!
//! - [`messages`] – the typed envelope and the closed set of event types.
//! - [`validate`] – the ordered checks every inbound message must pass.
//! - [`failure`]  – turns the loosely-shaped payload of an `error` event into
//!   a [`failure::RemoteError`].

pub mod failure;
pub mod messages;
pub mod validate;
