//! Infrastructure layer for journey-embed.
//!
//! | Module     | Responsibility                                              |
//! |------------|-------------------------------------------------------------|
//! | `platform` | Traits the application layer is written against             |
//! | `mock`     | In-memory host page: listeners, virtual clock, overlay log  |
//! | `web`      | Browser implementation (`wasm32` only)                      |

pub mod mock;
pub mod platform;

#[cfg(target_arch = "wasm32")]
pub mod web;
