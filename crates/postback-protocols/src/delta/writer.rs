//! Delta stream encoder.

use std::fmt::Write;

use super::fragment::{Fragment, FragmentKind, LengthUnit};

/// Encode fragments into the delta wire format.
///
/// A script block with several paths is written as one `scriptBlock`
/// record followed by one `fallbackScript` record per extra path.
pub fn write_delta(fragments: &[Fragment], unit: LengthUnit) -> String {
    let mut out = String::new();

    for fragment in fragments {
        match fragment {
            Fragment::Version { version } => {
                push_record(&mut out, unit, FragmentKind::Version, "", &version.to_string())
            }
            Fragment::PageRedirect { url } => {
                push_record(&mut out, unit, FragmentKind::PageRedirect, "", url)
            }
            Fragment::Error { code, message } => {
                push_record(&mut out, unit, FragmentKind::Error, &code.to_string(), message)
            }
            Fragment::PageTitle { title } => {
                push_record(&mut out, unit, FragmentKind::PageTitle, "", title)
            }
            Fragment::Focus { id } => push_record(&mut out, unit, FragmentKind::Focus, "", id),
            Fragment::ScriptBlock { id, paths } => {
                let mut paths = paths.iter();
                let first = paths.next().map(String::as_str).unwrap_or_default();
                push_record(&mut out, unit, FragmentKind::ScriptBlock, id, first);
                for path in paths {
                    push_record(&mut out, unit, FragmentKind::FallbackScript, "", path);
                }
            }
            Fragment::FallbackScript { path } => {
                push_record(&mut out, unit, FragmentKind::FallbackScript, "", path)
            }
            Fragment::UpdatePanel { id, html: value }
            | Fragment::HiddenField { id, value }
            | Fragment::ArrayDeclaration { id, value }
            | Fragment::ScriptStartupBlock { id, value }
            | Fragment::Expando { id, value }
            | Fragment::OnSubmit { id, value }
            | Fragment::DataItem { id, value }
            | Fragment::DataItemJson { id, value }
            | Fragment::ScriptDispose { id, value } => {
                push_record(&mut out, unit, fragment.kind(), id, value)
            }
            Fragment::AsyncPostBackControlIds { value }
            | Fragment::PostBackControlIds { value }
            | Fragment::UpdatePanelIds { value }
            | Fragment::AsyncPostBackTimeout { value }
            | Fragment::ChildUpdatePanelIds { value }
            | Fragment::PanelsToRefreshIds { value }
            | Fragment::FormAction { value } => {
                push_record(&mut out, unit, fragment.kind(), "", value)
            }
        }
    }

    out
}

fn push_record(out: &mut String, unit: LengthUnit, kind: FragmentKind, name: &str, content: &str) {
    // Writing into a String cannot fail.
    let _ = write!(
        out,
        "{}|{}|{}|{}|",
        unit.measure(content),
        kind.token(),
        name,
        content
    );
}
