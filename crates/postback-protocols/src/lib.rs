//! # Postback Protocols
//!
//! Wire-level definitions for the partial-page-update ("delta") responses
//! returned by web-forms servers to asynchronous postbacks.
//!
//! ## Contents
//!
//! - [`DeltaParser`] - Streaming decoder for the length-prefixed delta format
//! - [`DeltaResponse`] - Aggregated view over a decoded stream
//! - [`parse_invariant_number`] - Invariant-culture numeric literal reader
//! - [`write_delta`] - Encoder producing the same wire format

pub mod delta;
pub mod error;

pub use delta::{
    parse_delta, parse_invariant_number, write_delta, DeltaParser, DeltaResponse, Fragment,
    FragmentKind, InvariantNumber, LengthUnit, ScriptBlock,
};
pub use error::FramingError;
