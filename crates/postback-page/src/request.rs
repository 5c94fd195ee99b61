//! Outgoing form submission built from the synthetic page.

use serde::Serialize;
use url::Url;

use crate::control::{self, ControlKind};
use crate::error::PageError;
use crate::page::SyntheticPage;

pub const EVENT_TARGET: &str = "__EVENTTARGET";
pub const EVENT_ARGUMENT: &str = "__EVENTARGUMENT";
pub const LAST_FOCUS: &str = "__LASTFOCUS";
pub const ASYNC_POST: &str = "__ASYNCPOST";

/// What triggered a postback: the event target and argument, and for
/// synchronous submissions the id of the clicked submit button.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostbackAction {
    pub target: String,
    pub argument: String,
    pub button_id: Option<String>,
}

impl PostbackAction {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.argument = argument.into();
        self
    }

    pub fn with_button(mut self, button_id: impl Into<String>) -> Self {
        self.button_id = Some(button_id.into());
        self
    }
}

/// Ordered name/value pairs. Setting an existing name replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn into_vec(self) -> Vec<(String, String)> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FormMethod {
    Get,
    Post,
}

impl FormMethod {
    fn from_attr(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("get") => Self::Get,
            _ => Self::Post,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// A form submission ready to hand to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormRequest {
    pub method: FormMethod,
    pub url: Url,
    pub fields: FormFields,
    /// Names of file controls, sent as empty file parts.
    pub files: Vec<String>,
}

impl FormRequest {
    /// Collect the active form of `page` the way a browser would submit it.
    ///
    /// Fields named in `transient_fields` are sent empty when present.
    /// Inputs without a `type` attribute are left out.
    pub fn build(
        page: &SyntheticPage,
        action: &PostbackAction,
        transient_fields: &[String],
    ) -> Result<Self, PageError> {
        let form = page.form()?;
        let url = resolve_action(page.url(), form.attr("action").unwrap_or(""))?;
        let method = FormMethod::from_attr(form.attr("method"));

        let mut fields = FormFields::new();
        let mut files = Vec::new();

        for control in page.controls()? {
            if control.disabled {
                continue;
            }
            let element = page.element_of(&control)?;
            // Untyped inputs stay addressable through get/set but are never sent.
            if element.tag == "input" && !element.has_attr("type") {
                continue;
            }

            match control.kind {
                ControlKind::Select => {
                    let value = control::select_value(element).unwrap_or_default();
                    fields.set(control.name, value);
                }
                ControlKind::Checkbox | ControlKind::Radio => {
                    if element.has_attr("checked") {
                        fields.set(control.name, control::checked_value(element));
                    }
                }
                ControlKind::File => {
                    if !files.contains(&control.name) {
                        files.push(control.name);
                    }
                }
                ControlKind::Submit => {
                    let clicked = action
                        .button_id
                        .as_deref()
                        .is_some_and(|id| !id.is_empty() && element.id() == Some(id));
                    if clicked {
                        fields.set(control.name, element.attr("value").unwrap_or_default());
                    }
                }
                ControlKind::Text => {
                    fields.set(control.name, element.attr("value").unwrap_or_default());
                }
            }
        }

        fields.set(EVENT_TARGET, action.target.as_str());
        fields.set(EVENT_ARGUMENT, action.argument.as_str());
        fields.set(LAST_FOCUS, "");

        for name in transient_fields {
            if fields.contains(name) {
                fields.set(name.as_str(), "");
            }
        }

        Ok(Self {
            method,
            url,
            fields,
            files,
        })
    }
}

fn resolve_action(base: Option<&Url>, action: &str) -> Result<Url, PageError> {
    let invalid = |message: String| PageError::InvalidAction {
        action: action.to_string(),
        message,
    };

    match base {
        Some(base) => base.join(action).map_err(|e| invalid(e.to_string())),
        None => Url::parse(action).map_err(|e| invalid(e.to_string())),
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
