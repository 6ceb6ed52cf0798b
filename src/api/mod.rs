//! API surface shared with the transport layer
//!
//! Transport itself (routing, controllers, sessions) lives outside this
//! crate; what is shared is the envelope every operation result is rendered
//! into.

pub mod responses;

pub use responses::{deleted, list, record, ApiResponse, IntoEnvelope, NOT_FOUND_MESSAGE};
