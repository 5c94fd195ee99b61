use super::*;
use postback_protocols::{parse_delta, Fragment};

const PAGE: &str = r#"<html><body>
<form id="form1">
  <div id="panelA"><p>old</p></div>
  <div id="dup">1</div><div id="dup">2</div>
  <input type="hidden" name="__VIEWSTATE" value="v1">
</form>
<script>Sys.WebForms.PageRequestManager._initialize('sm1', 'form1', [], [], [], 90, '');</script>
</body></html>"#;

fn page() -> SyntheticPage {
    SyntheticPage::parse(PAGE, None)
}

fn panel(id: &str, html: &str) -> Fragment {
    Fragment::UpdatePanel {
        id: id.to_string(),
        html: html.to_string(),
    }
}

fn hidden(id: &str, value: &str) -> Fragment {
    Fragment::HiddenField {
        id: id.to_string(),
        value: value.to_string(),
    }
}

fn inner(page: &SyntheticPage, id: &str) -> String {
    let path = page.elements_by_id(id).remove(0);
    page.document().element(&path).unwrap().inner_html()
}

#[test]
fn test_panel_children_replaced() {
    let mut page = page();
    let delta = DeltaResponse::from_fragments(vec![panel("panelA", "<span>hi</span>")]);

    let outcome = apply(&mut page, &delta).unwrap();

    assert_eq!(outcome, PatchOutcome::Applied);
    assert_eq!(inner(&page, "panelA"), "<span>hi</span>");
    let path = page.elements_by_id("panelA").remove(0);
    let element = page.document().element(&path).unwrap();
    assert_eq!(element.tag, "div");
    assert_eq!(element.attributes, vec![("id".to_string(), "panelA".to_string())]);
}

#[test]
fn test_unknown_panel_is_skipped() {
    let mut page = page();
    let before = page.to_html();
    let delta = DeltaResponse::from_fragments(vec![panel("panelB", "<span>hi</span>")]);

    assert_eq!(apply(&mut page, &delta).unwrap(), PatchOutcome::Applied);
    assert_eq!(page.to_html(), before);
}

#[test]
fn test_ambiguous_panel_is_skipped() {
    let mut page = page();
    let before = page.to_html();
    let delta = DeltaResponse::from_fragments(vec![panel("dup", "<b>x</b>")]);

    assert_eq!(apply(&mut page, &delta).unwrap(), PatchOutcome::Applied);
    assert_eq!(page.to_html(), before);
}

#[test]
fn test_whitespace_panel_is_skipped() {
    let mut page = page();
    let delta = DeltaResponse::from_fragments(vec![panel("panelA", "  \r\n ")]);

    apply(&mut page, &delta).unwrap();
    assert_eq!(inner(&page, "panelA"), "<p>old</p>");
}

#[test]
fn test_malformed_panel_skipped_others_applied() {
    let mut page = page();
    let delta = DeltaResponse::from_fragments(vec![
        panel("panelA", "<span>\u{0}</span>"),
        hidden("__VIEWSTATE", "v2"),
    ]);

    assert_eq!(apply(&mut page, &delta).unwrap(), PatchOutcome::Applied);
    assert_eq!(inner(&page, "panelA"), "<p>old</p>");
    assert_eq!(page.get("__VIEWSTATE").unwrap(), "v2");
}

#[test]
fn test_hidden_fields_set_or_created() {
    let mut page = page();
    let delta = DeltaResponse::from_fragments(vec![
        hidden("__VIEWSTATE", "v2"),
        hidden("__EVENTVALIDATION", "ev"),
    ]);

    apply(&mut page, &delta).unwrap();
    assert_eq!(page.get("__VIEWSTATE").unwrap(), "v2");
    assert_eq!(page.get("__EVENTVALIDATION").unwrap(), "ev");
}

#[test]
fn test_error_takes_precedence_over_redirect() {
    let mut page = page();
    let before = page.to_html();
    let delta = parse_delta(
        "11|pageRedirect||/Login.aspx|4|error|500|Boom|15|updatePanel|panelA|<span>hi</span>|",
    )
    .unwrap();
    let delta = DeltaResponse::from_fragments(delta);

    let outcome = apply(&mut page, &delta).unwrap();

    assert_eq!(
        outcome,
        PatchOutcome::Errored {
            code: InvariantNumber::Integer(500),
            message: "Boom".to_string(),
        }
    );
    assert_eq!(page.to_html(), before);
}

#[test]
fn test_redirect_leaves_page_untouched() {
    let mut page = page();
    let before = page.to_html();
    let delta = DeltaResponse::from_fragments(vec![
        panel("panelA", "<span>hi</span>"),
        Fragment::PageRedirect {
            url: "/Login.aspx".to_string(),
        },
    ]);

    let outcome = apply(&mut page, &delta).unwrap();

    assert_eq!(
        outcome,
        PatchOutcome::Redirected {
            url: "/Login.aspx".to_string()
        }
    );
    assert_eq!(page.to_html(), before);
}

#[test]
fn test_patch_keeps_page_identifiers() {
    let mut page = page();
    let delta = DeltaResponse::from_fragments(vec![panel(
        "panelA",
        "<script>Sys.WebForms.PageRequestManager._initialize('other', 'elsewhere');</script>",
    )]);

    apply(&mut page, &delta).unwrap();
    assert_eq!(page.script_manager_id(), Some("sm1"));
    assert_eq!(page.active_form_id(), Some("form1"));
}

#[test]
fn test_panels_applied_in_order() {
    let mut page = page();
    let delta = DeltaResponse::from_fragments(vec![
        panel("panelA", "<i>first</i>"),
        panel("panelA", "<i>second</i>"),
    ]);

    apply(&mut page, &delta).unwrap();
    assert_eq!(inner(&page, "panelA"), "<i>second</i>");
}

#[test]
fn test_outcome_serializes_tagged() {
    let json = serde_json::to_value(PatchOutcome::Redirected {
        url: "/x".to_string(),
    })
    .unwrap();
    assert_eq!(json["outcome"], "redirected");
    assert_eq!(json["url"], "/x");
}

#[test]
fn test_hidden_field_without_form_leaves_panels_untouched() {
    let mut page = SyntheticPage::parse(r#"<div id="panelA"><p>old</p></div>"#, None);
    let before = page.to_html();
    let delta = DeltaResponse::from_fragments(vec![
        panel("panelA", "<span>new</span>"),
        hidden("__VIEWSTATE", "v2"),
    ]);

    let err = apply(&mut page, &delta).unwrap_err();

    assert!(matches!(err, PageError::FormNotFound(_)));
    assert_eq!(page.to_html(), before);
    assert_eq!(inner(&page, "panelA"), "<p>old</p>");
}
