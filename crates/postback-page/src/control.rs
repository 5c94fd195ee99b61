//! Form controls indexed from `input` and `select` elements.

use serde::Serialize;

use crate::dom::{Element, Node, NodePath};

/// Behaviour of a control, decided once from its tag and `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    /// Any input whose value is its `value` attribute (text, hidden,
    /// password, inputs without a `type`, ...).
    Text,
    Checkbox,
    Radio,
    Select,
    Submit,
    File,
}

impl ControlKind {
    pub fn classify(element: &Element) -> Option<Self> {
        match element.tag.as_str() {
            "select" => Some(Self::Select),
            "input" => {
                let kind = element.attr("type").map(|t| t.trim().to_ascii_lowercase());
                Some(match kind.as_deref() {
                    Some("checkbox") => Self::Checkbox,
                    Some("radio") => Self::Radio,
                    Some("submit") => Self::Submit,
                    Some("file") => Self::File,
                    _ => Self::Text,
                })
            }
            _ => None,
        }
    }

    pub fn is_checkable(self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio)
    }
}

/// A named control of the active form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Control {
    pub path: NodePath,
    pub name: String,
    pub kind: ControlKind,
    /// Disabled controls are never submitted.
    pub disabled: bool,
}

impl Control {
    /// Index an element as a control. Elements without a `name` are not
    /// controls.
    pub fn from_element(path: NodePath, element: &Element) -> Option<Self> {
        let kind = ControlKind::classify(element)?;
        let name = element.attr("name")?.to_string();
        Some(Self {
            path,
            name,
            kind,
            disabled: element.has_attr("disabled"),
        })
    }
}

/// Value an option submits: its `value` attribute, else its text with
/// whitespace collapsed.
pub(crate) fn option_value(option: &Element) -> String {
    match option.attr("value") {
        Some(value) => value.to_string(),
        None => option.text().split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

/// Options of a select, including those nested in optgroups.
pub(crate) fn options(select: &Element) -> Vec<&Element> {
    let mut out = Vec::new();
    collect_options(select, &mut out);
    out
}

fn collect_options<'a>(element: &'a Element, out: &mut Vec<&'a Element>) {
    for child in element.child_elements() {
        if child.tag == "option" {
            out.push(child);
        } else {
            collect_options(child, out);
        }
    }
}

/// Value a select submits: the selected option, else the first one.
pub(crate) fn select_value(select: &Element) -> Option<String> {
    let options = options(select);
    options
        .iter()
        .find(|o| o.has_attr("selected"))
        .or_else(|| options.first())
        .map(|o| option_value(o))
}

/// Select the option carrying `value`, clearing every other selection. An
/// option is appended when none carries the value.
pub(crate) fn select_option(select: &mut Element, value: &str) {
    let mut found = false;
    visit_options_mut(select, &mut |option: &mut Element| {
        if !found && option_value(option) == value {
            option.set_attr("selected", "selected");
            found = true;
        } else {
            option.remove_attr("selected");
        }
    });

    if !found {
        select.append(
            Element::new("option")
                .with_attr("value", value)
                .with_attr("selected", "selected"),
        );
    }
}

fn visit_options_mut(element: &mut Element, f: &mut dyn FnMut(&mut Element)) {
    for child in &mut element.children {
        if let Node::Element(child) = child {
            if child.tag == "option" {
                f(child);
            } else {
                visit_options_mut(child, f);
            }
        }
    }
}

/// Value a checked checkbox or radio submits.
pub(crate) fn checked_value(element: &Element) -> String {
    element.attr("value").unwrap_or("on").to_string()
}
