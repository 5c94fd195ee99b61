//! Delta stream decoder.
//!
//! A stream is a concatenation of records:
//!
//! ```text
//! <length>|<type>|<name>|<content>|
//! ```
//!
//! `<length>` is the size of `<content>` in the parser's [`LengthUnit`]. The
//! final `|` may be replaced by the end of the stream, and a stream may end
//! with line breaks after its last record.

use std::iter::FusedIterator;

use tracing::trace;

use super::fragment::{Fragment, FragmentKind, LengthUnit};
use crate::error::FramingError;

/// Decodes a delta stream record by record.
///
/// Yields fragments in stream order. The first framing error is yielded
/// once and ends the iteration.
pub struct DeltaParser<'a> {
    input: &'a str,
    /// Byte offset of the first unread character.
    offset: usize,
    /// 1-based character column of `offset`.
    column: usize,
    unit: LengthUnit,
    done: bool,
}

impl<'a> DeltaParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_unit(input, LengthUnit::default())
    }

    pub fn with_unit(input: &'a str, unit: LengthUnit) -> Self {
        Self {
            input,
            offset: 0,
            column: 1,
            unit,
            done: false,
        }
    }

    fn next_fragment(&mut self) -> Result<Option<Fragment>, FramingError> {
        let rest = &self.input[self.offset..];

        let mut separators = rest.match_indices('|').map(|(index, _)| index);
        let (Some(first), Some(second), Some(third)) =
            (separators.next(), separators.next(), separators.next())
        else {
            if rest.chars().all(|c| c == '\r' || c == '\n') {
                return Ok(None);
            }
            return Err(FramingError::new(self.column, "unterminated response"));
        };

        let length_field = &rest[..first];
        let type_field = &rest[first + 1..second];
        let name = &rest[second + 1..third];

        let type_column = self.column + length_field.chars().count() + 1;
        let content_column = type_column + type_field.chars().count() + 1 + name.chars().count() + 1;

        let length: usize = length_field.trim().parse().map_err(|_| {
            FramingError::new(
                self.column,
                format!("invalid content length {:?}", length_field),
            )
        })?;

        let body = &rest[third + 1..];
        let mut chars = body.chars();
        let mut units = 0;
        let mut end = 0;
        let mut chars_read = 0;
        while units < length {
            match chars.next() {
                Some(c) => {
                    units += self.unit.width(c);
                    end += c.len_utf8();
                    chars_read += 1;
                }
                None => break,
            }
        }

        if units < length {
            return Err(FramingError::new(
                content_column,
                format!(
                    "premature end of stream, could only read {}/{} characters",
                    units, length
                ),
            ));
        }
        if units > length {
            return Err(FramingError::new(
                content_column + chars_read - 1,
                "content length ends inside a character",
            ));
        }

        let content = &body[..end];
        let terminator_column = content_column + chars_read;
        let consumed = match body[end..].chars().next() {
            None => end,
            Some('|') => end + 1,
            Some(c) => {
                return Err(FramingError::new(
                    terminator_column,
                    format!("expected '|' or end of stream at end of content, got {:?}", c),
                ));
            }
        };

        let kind = FragmentKind::from_token(type_field).ok_or_else(|| {
            FramingError::new(
                type_column,
                format!("unknown delta fragment type {:?}", type_field),
            )
        })?;

        trace!(kind = kind.token(), name, length, "Decoded delta record");

        self.offset += third + 1 + consumed;
        self.column = terminator_column + 1;

        Ok(Some(Fragment::from_record(kind, name, content)))
    }
}

impl Iterator for DeltaParser<'_> {
    type Item = Result<Fragment, FramingError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_fragment() {
            Ok(Some(fragment)) => Some(Ok(fragment)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for DeltaParser<'_> {}

/// Decode a whole stream, counting lengths in UTF-16 code units.
pub fn parse_delta(input: &str) -> Result<Vec<Fragment>, FramingError> {
    DeltaParser::new(input).collect()
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
