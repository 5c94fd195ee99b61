//! Aggregated view over a decoded delta stream.

use percent_encoding::percent_decode_str;
use serde::Serialize;
use tracing::debug;

use super::fragment::{Fragment, FragmentKind, LengthUnit};
use super::numeric::InvariantNumber;
use super::parser::DeltaParser;
use crate::error::FramingError;

/// A script registration with its fallback locations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptBlock {
    pub id: String,
    pub paths: Vec<String>,
}

/// The decoded response to an asynchronous postback.
///
/// Keeps the full fragment sequence in stream order. `Version`,
/// `PageRedirect`, `Error`, `PageTitle` and `Focus` are singletons: only
/// their first occurrence is exposed through the accessors.
#[derive(Debug, Clone, Default)]
pub struct DeltaResponse {
    fragments: Vec<Fragment>,
    version: Option<InvariantNumber>,
    redirect_url: Option<String>,
    error: Option<(InvariantNumber, String)>,
    page_title: Option<String>,
    focus: Option<String>,
}

impl DeltaResponse {
    pub fn from_fragments(fragments: Vec<Fragment>) -> Self {
        let mut response = Self::default();

        for fragment in &fragments {
            match fragment {
                Fragment::Version { version } => {
                    response.version.get_or_insert(*version);
                }
                Fragment::PageRedirect { url } => {
                    if response.redirect_url.is_none() {
                        // Version 4 servers percent-encode the target.
                        let url = if response.is_version4() {
                            percent_decode_str(url).decode_utf8_lossy().into_owned()
                        } else {
                            url.clone()
                        };
                        response.redirect_url = Some(url);
                    }
                }
                Fragment::Error { code, message } => {
                    response.error.get_or_insert_with(|| (*code, message.clone()));
                }
                Fragment::PageTitle { title } => {
                    response.page_title.get_or_insert_with(|| title.clone());
                }
                Fragment::Focus { id } => {
                    response.focus.get_or_insert_with(|| id.clone());
                }
                _ => {}
            }
        }

        response.fragments = fragments;
        response
    }

    /// Decode a stream and aggregate it.
    pub fn parse(input: &str, unit: LengthUnit) -> Result<Self, FramingError> {
        let fragments = DeltaParser::with_unit(input, unit).collect::<Result<Vec<_>, _>>()?;
        debug!(count = fragments.len(), "Parsed delta response");
        Ok(Self::from_fragments(fragments))
    }

    /// All fragments in stream order.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Fragments of one category, in stream order.
    pub fn fragments_of(&self, kind: FragmentKind) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter().filter(move |f| f.kind() == kind)
    }

    pub fn version(&self) -> Option<InvariantNumber> {
        self.version
    }

    /// Whether the server runs version 4 or above.
    pub fn is_version4(&self) -> bool {
        self.version.is_some_and(|v| v.as_f64() >= 4.0)
    }

    pub fn error_code(&self) -> Option<InvariantNumber> {
        self.error.as_ref().map(|(code, _)| *code)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|(_, message)| message.as_str())
    }

    pub fn redirect_url(&self) -> Option<&str> {
        self.redirect_url.as_deref()
    }

    pub fn page_title(&self) -> Option<&str> {
        self.page_title.as_deref()
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    /// `(panel id, html)` pairs in stream order.
    pub fn update_panels(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fragments.iter().filter_map(|f| match f {
            Fragment::UpdatePanel { id, html } => Some((id.as_str(), html.as_str())),
            _ => None,
        })
    }

    /// `(field name, value)` pairs in stream order.
    pub fn hidden_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fragments.iter().filter_map(|f| match f {
            Fragment::HiddenField { id, value } => Some((id.as_str(), value.as_str())),
            _ => None,
        })
    }

    /// Script blocks, with each fallback path appended to the block that
    /// precedes it.
    pub fn script_blocks(&self) -> Vec<ScriptBlock> {
        let mut blocks: Vec<ScriptBlock> = Vec::new();

        for fragment in &self.fragments {
            match fragment {
                Fragment::ScriptBlock { id, paths } => blocks.push(ScriptBlock {
                    id: id.clone(),
                    paths: paths.clone(),
                }),
                Fragment::FallbackScript { path } => match blocks.last_mut() {
                    Some(block) => block.paths.push(path.clone()),
                    None => debug!(path = %path, "Fallback script without a script block"),
                },
                _ => {}
            }
        }

        blocks
    }

    /// The last form action announced by the server, if any.
    pub fn form_action(&self) -> Option<&str> {
        self.fragments.iter().rev().find_map(|f| match f {
            Fragment::FormAction { value } => Some(value.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
