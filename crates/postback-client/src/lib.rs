//! # Postback Client
//!
//! Drives web-forms pages over HTTP: loads pages, submits forms, and
//! performs partial postbacks whose delta responses are applied to the
//! session's synthetic page.

mod error;
mod http;
mod session;

pub use error::{PostbackError, TransportError};
pub use http::{HttpCollaborator, HttpRequest, HttpResponse, ReqwestCollaborator, RequestBody};
pub use session::{PostbackOutcome, PostbackSession, SessionState};
