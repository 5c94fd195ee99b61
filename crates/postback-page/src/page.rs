//! The synthetic page: last known document of a session and its form.

use regex::Regex;
use tracing::debug;
use url::Url;

use crate::control::{self, Control, ControlKind};
use crate::dom::{Document, Element, NodePath};
use crate::error::PageError;

const INITIALIZE_PATTERN: &str = r#"WebForms\.PageRequestManager\._initialize\(\s*(?:'([^']*)'|"([^"]*)")\s*,\s*(?:'([^']*)'|"([^"]*)")"#;

/// Client-side model of a rendered web-forms page.
///
/// The script-manager id and the active form id are read once from the
/// page's initialization script when the page is built; patches never
/// change them.
#[derive(Debug, Clone)]
pub struct SyntheticPage {
    url: Option<Url>,
    document: Document,
    active_form_id: Option<String>,
    script_manager_id: Option<String>,
}

impl SyntheticPage {
    pub fn parse(html: &str, url: Option<Url>) -> Self {
        let document = Document::parse(html);
        let (script_manager_id, active_form_id) = match find_initialize_call(&document) {
            Some((manager, form)) => (Some(manager), Some(form)),
            None => (None, None),
        };

        debug!(
            script_manager_id = ?script_manager_id,
            active_form_id = ?active_form_id,
            "Page built"
        );

        Self {
            url,
            document,
            active_form_id,
            script_manager_id,
        }
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub(crate) fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn active_form_id(&self) -> Option<&str> {
        self.active_form_id.as_deref()
    }

    pub fn script_manager_id(&self) -> Option<&str> {
        self.script_manager_id.as_deref()
    }

    /// Path of the active form: the form whose id is the active form id,
    /// or the first form of the page when no id was found.
    pub fn form_path(&self) -> Result<NodePath, PageError> {
        match &self.active_form_id {
            Some(id) => self
                .document
                .find_first(|e| e.tag == "form" && e.id() == Some(id.as_str()))
                .ok_or_else(|| PageError::FormNotFound(id.clone())),
            None => self
                .document
                .find_first(|e| e.tag == "form")
                .ok_or_else(|| PageError::FormNotFound("<first form>".to_string())),
        }
    }

    pub fn form(&self) -> Result<&Element, PageError> {
        let path = self.form_path()?;
        self.document
            .element(&path)
            .ok_or_else(|| PageError::FormNotFound(format!("{:?}", path)))
    }

    /// Controls of the active form in document order.
    pub fn controls(&self) -> Result<Vec<Control>, PageError> {
        let form = self.form_path()?;
        let controls = self
            .document
            .find_within(&form, |e| ControlKind::classify(e).is_some())
            .into_iter()
            .filter_map(|path| {
                let element = self.document.element(&path)?;
                Control::from_element(path, element)
            })
            .collect();
        Ok(controls)
    }

    /// Current value of the control called `name`.
    ///
    /// For checkbox and radio groups this is the value of the first checked
    /// member, or an empty string when none is checked.
    pub fn get(&self, name: &str) -> Result<String, PageError> {
        let controls = self.controls()?;
        let mut named = controls.iter().filter(|c| c.name == name).peekable();
        let first = named
            .peek()
            .copied()
            .ok_or_else(|| PageError::ControlNotFound(name.to_string()))?;

        if first.kind.is_checkable() {
            let value = named
                .filter(|c| c.kind.is_checkable())
                .filter_map(|c| self.document.element(&c.path))
                .find(|e| e.has_attr("checked"))
                .map(control::checked_value)
                .unwrap_or_default();
            return Ok(value);
        }

        let element = self.element_of(first)?;
        let value = match first.kind {
            ControlKind::Select => control::select_value(element).unwrap_or_default(),
            _ => element.attr("value").unwrap_or_default().to_string(),
        };
        Ok(value)
    }

    /// Assign a value to the control called `name`.
    ///
    /// A checkbox or radio is checked by any non-empty value and unchecked
    /// by an empty one. When the form has no such control, a hidden input
    /// carrying the value is appended to it.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), PageError> {
        let controls = self.controls()?;
        let Some(first) = controls.iter().find(|c| c.name == name) else {
            let form = self.form_path()?;
            let form = self
                .document
                .element_mut(&form)
                .ok_or_else(|| PageError::FormNotFound(name.to_string()))?;
            form.append(
                Element::new("input")
                    .with_attr("type", "hidden")
                    .with_attr("name", name)
                    .with_attr("value", value),
            );
            debug!(name, "Hidden control created");
            return Ok(());
        };

        match first.kind {
            ControlKind::Select => {
                let element = self.element_of_mut(first)?;
                control::select_option(element, value);
            }
            // Radios are not grouped here: only the first control with the
            // name changes and its siblings keep their markers.
            ControlKind::Checkbox | ControlKind::Radio => {
                let element = self.element_of_mut(first)?;
                if value.is_empty() {
                    element.remove_attr("checked");
                } else {
                    element.set_attr("checked", "checked");
                }
            }
            ControlKind::Text | ControlKind::Submit | ControlKind::File => {
                let element = self.element_of_mut(first)?;
                element.set_attr("value", value);
            }
        }
        Ok(())
    }

    /// Paths of every element whose `id` equals `id`.
    pub fn elements_by_id(&self, id: &str) -> Vec<NodePath> {
        self.document.find_all(|e| e.id() == Some(id))
    }

    pub fn to_html(&self) -> String {
        self.document.to_html()
    }

    pub(crate) fn element_of(&self, control: &Control) -> Result<&Element, PageError> {
        self.document
            .element(&control.path)
            .ok_or_else(|| PageError::ControlNotFound(control.name.clone()))
    }

    fn element_of_mut(&mut self, control: &Control) -> Result<&mut Element, PageError> {
        self.document
            .element_mut(&control.path)
            .ok_or_else(|| PageError::ControlNotFound(control.name.clone()))
    }
}

/// Script-manager id and form id from the first initialization call found
/// in a script element.
fn find_initialize_call(document: &Document) -> Option<(String, String)> {
    let re = Regex::new(INITIALIZE_PATTERN).ok()?;

    document
        .find_all(|e| e.tag == "script")
        .into_iter()
        .filter_map(|path| document.element(&path))
        .find_map(|script| {
            let text = script.text();
            let caps = re.captures(&text)?;
            let manager = caps.get(1).or_else(|| caps.get(2))?.as_str().to_string();
            let form = caps.get(3).or_else(|| caps.get(4))?.as_str().to_string();
            Some((manager, form))
        })
}

#[cfg(test)]
#[path = "page_tests.rs"]
mod tests;
