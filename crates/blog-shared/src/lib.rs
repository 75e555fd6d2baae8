//! # Blog Shared
//!
//! JSON page contexts and response envelopes returned by the server.
//! Kept free of web framework types so other clients can reuse them.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
