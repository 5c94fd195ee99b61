//! The delta stream: a sequence of `<length>|<type>|<name>|<content>|`
//! records describing incremental changes to a rendered page.

mod fragment;
mod numeric;
mod parser;
mod response;
mod writer;

pub use fragment::{Fragment, FragmentKind, LengthUnit};
pub use numeric::{parse_invariant_number, InvariantNumber};
pub use parser::{parse_delta, DeltaParser};
pub use response::{DeltaResponse, ScriptBlock};
pub use writer::write_delta;
