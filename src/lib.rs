//! Aurora - a terminal client for streaming AI chat
//!
//! The interesting part lives in [`sse`] and [`stream`]: a decoder that
//! turns an SSE response body arriving at arbitrary chunk boundaries into
//! an append-only transcript, one fragment at a time.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod sse;
pub mod stream;
