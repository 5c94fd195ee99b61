//! Synthetic page model for web-forms pages.
//!
//! A [`SyntheticPage`] holds the last known rendered document of a browsing
//! session. Partial postback responses are spliced into it with [`apply`],
//! and the next outgoing form submission is built from it with
//! [`FormRequest::build`]. No script is ever run: control semantics
//! (checkbox and radio grouping, select defaults, bookkeeping fields) are
//! reproduced from the markup alone.

mod control;
pub mod dom;
mod error;
mod page;
mod patcher;
mod request;

pub use control::{Control, ControlKind};
pub use dom::{Document, Element, Node, NodePath};
pub use error::PageError;
pub use page::SyntheticPage;
pub use patcher::{apply, PatchOutcome};
pub use request::{
    FormFields, FormMethod, FormRequest, PostbackAction, ASYNC_POST, EVENT_ARGUMENT,
    EVENT_TARGET, LAST_FOCUS,
};
