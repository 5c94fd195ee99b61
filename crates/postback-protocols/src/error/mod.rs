//! Error types for the delta wire format.

mod framing;

pub use framing::*;
