//! Applies a delta response to a synthetic page.

use postback_protocols::{DeltaResponse, InvariantNumber};
use serde::Serialize;
use tracing::{debug, warn};

use crate::dom::parse_fragment;
use crate::error::PageError;
use crate::page::SyntheticPage;

/// Result of applying a delta response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PatchOutcome {
    Applied,
    /// The server reported an error; the page was not touched.
    Errored { code: InvariantNumber, message: String },
    /// The server asked for a navigation; the page was not touched.
    Redirected { url: String },
}

/// Apply `delta` to `page`.
///
/// Error and redirect signals are checked before anything is modified, so
/// either the whole response is applied or the page is left as it was.
/// Panels that do not match exactly one element, and panels whose markup
/// cannot be parsed, are skipped without failing the patch. Hidden fields
/// need the active form, which is resolved before any panel is replaced.
pub fn apply(page: &mut SyntheticPage, delta: &DeltaResponse) -> Result<PatchOutcome, PageError> {
    if let Some(code) = delta.error_code() {
        return Ok(PatchOutcome::Errored {
            code,
            message: delta.error_message().unwrap_or_default().to_string(),
        });
    }

    if let Some(url) = delta.redirect_url() {
        return Ok(PatchOutcome::Redirected {
            url: url.to_string(),
        });
    }

    if delta.hidden_fields().next().is_some() {
        page.form_path()?;
    }

    for (id, html) in delta.update_panels() {
        if html.trim().is_empty() {
            debug!(panel = id, "Skipping empty panel");
            continue;
        }

        let matches = page.elements_by_id(id);
        if matches.len() != 1 {
            debug!(panel = id, matches = matches.len(), "Skipping unmatched panel");
            continue;
        }

        let nodes = match parse_fragment(html) {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!(panel = id, error = %e, "Skipping malformed panel");
                continue;
            }
        };

        if let Some(element) = page.document_mut().element_mut(&matches[0]) {
            element.children = nodes;
            debug!(panel = id, "Panel replaced");
        }
    }

    for (name, value) in delta.hidden_fields() {
        page.set(name, value)?;
    }

    Ok(PatchOutcome::Applied)
}

#[cfg(test)]
#[path = "patcher_tests.rs"]
mod tests;
