//! Typed records decoded from a delta stream.

use serde::{Deserialize, Serialize};

use super::numeric::InvariantNumber;

/// Unit in which record length prefixes count their content.
///
/// Servers compute the prefix from their native string length, which is a
/// count of UTF-16 code units. `Chars` counts Unicode scalar values instead;
/// both agree unless content holds characters outside the BMP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    #[default]
    Utf16,
    Chars,
}

impl LengthUnit {
    /// Width of a single character in this unit.
    pub fn width(&self, c: char) -> usize {
        match self {
            Self::Utf16 => c.len_utf16(),
            Self::Chars => 1,
        }
    }

    /// Length of a string in this unit.
    pub fn measure(&self, text: &str) -> usize {
        match self {
            Self::Utf16 => text.encode_utf16().count(),
            Self::Chars => text.chars().count(),
        }
    }
}

/// Record categories, one per wire type token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    Version,
    PageRedirect,
    Error,
    PageTitle,
    Focus,
    UpdatePanel,
    HiddenField,
    ArrayDeclaration,
    ScriptBlock,
    FallbackScript,
    ScriptStartupBlock,
    Expando,
    OnSubmit,
    AsyncPostBackControlIds,
    PostBackControlIds,
    UpdatePanelIds,
    AsyncPostBackTimeout,
    ChildUpdatePanelIds,
    PanelsToRefreshIds,
    FormAction,
    DataItem,
    DataItemJson,
    ScriptDispose,
}

impl FragmentKind {
    /// Resolve a wire type token.
    pub fn from_token(token: &str) -> Option<Self> {
        let kind = match token {
            "#" => Self::Version,
            "pageRedirect" => Self::PageRedirect,
            "error" => Self::Error,
            "pageTitle" => Self::PageTitle,
            "focus" => Self::Focus,
            "updatePanel" => Self::UpdatePanel,
            "hiddenField" => Self::HiddenField,
            "arrayDeclaration" => Self::ArrayDeclaration,
            "scriptBlock" => Self::ScriptBlock,
            "fallbackScript" => Self::FallbackScript,
            "scriptStartupBlock" => Self::ScriptStartupBlock,
            "expando" => Self::Expando,
            "onSubmit" => Self::OnSubmit,
            "asyncPostBackControlIDs" => Self::AsyncPostBackControlIds,
            "postBackControlIDs" => Self::PostBackControlIds,
            "updatePanelIDs" => Self::UpdatePanelIds,
            "asyncPostBackTimeout" => Self::AsyncPostBackTimeout,
            "childUpdatePanelIDs" => Self::ChildUpdatePanelIds,
            "panelsToRefreshIDs" => Self::PanelsToRefreshIds,
            "formAction" => Self::FormAction,
            "dataItem" => Self::DataItem,
            "dataItemJson" => Self::DataItemJson,
            "scriptDispose" => Self::ScriptDispose,
            _ => return None,
        };
        Some(kind)
    }

    /// The wire type token for this kind.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Version => "#",
            Self::PageRedirect => "pageRedirect",
            Self::Error => "error",
            Self::PageTitle => "pageTitle",
            Self::Focus => "focus",
            Self::UpdatePanel => "updatePanel",
            Self::HiddenField => "hiddenField",
            Self::ArrayDeclaration => "arrayDeclaration",
            Self::ScriptBlock => "scriptBlock",
            Self::FallbackScript => "fallbackScript",
            Self::ScriptStartupBlock => "scriptStartupBlock",
            Self::Expando => "expando",
            Self::OnSubmit => "onSubmit",
            Self::AsyncPostBackControlIds => "asyncPostBackControlIDs",
            Self::PostBackControlIds => "postBackControlIDs",
            Self::UpdatePanelIds => "updatePanelIDs",
            Self::AsyncPostBackTimeout => "asyncPostBackTimeout",
            Self::ChildUpdatePanelIds => "childUpdatePanelIDs",
            Self::PanelsToRefreshIds => "panelsToRefreshIDs",
            Self::FormAction => "formAction",
            Self::DataItem => "dataItem",
            Self::DataItemJson => "dataItemJson",
            Self::ScriptDispose => "scriptDispose",
        }
    }

    /// Kinds of which only the first occurrence in a stream counts.
    pub fn is_singleton(&self) -> bool {
        matches!(
            self,
            Self::Version | Self::PageRedirect | Self::Error | Self::PageTitle | Self::Focus
        )
    }
}

/// One decoded record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Fragment {
    Version { version: InvariantNumber },
    PageRedirect { url: String },
    Error { code: InvariantNumber, message: String },
    PageTitle { title: String },
    Focus { id: String },
    UpdatePanel { id: String, html: String },
    HiddenField { id: String, value: String },
    ArrayDeclaration { id: String, value: String },
    ScriptBlock { id: String, paths: Vec<String> },
    FallbackScript { path: String },
    ScriptStartupBlock { id: String, value: String },
    Expando { id: String, value: String },
    OnSubmit { id: String, value: String },
    AsyncPostBackControlIds { value: String },
    PostBackControlIds { value: String },
    UpdatePanelIds { value: String },
    AsyncPostBackTimeout { value: String },
    ChildUpdatePanelIds { value: String },
    PanelsToRefreshIds { value: String },
    FormAction { value: String },
    DataItem { id: String, value: String },
    DataItemJson { id: String, value: String },
    ScriptDispose { id: String, value: String },
}

impl Fragment {
    pub fn kind(&self) -> FragmentKind {
        match self {
            Self::Version { .. } => FragmentKind::Version,
            Self::PageRedirect { .. } => FragmentKind::PageRedirect,
            Self::Error { .. } => FragmentKind::Error,
            Self::PageTitle { .. } => FragmentKind::PageTitle,
            Self::Focus { .. } => FragmentKind::Focus,
            Self::UpdatePanel { .. } => FragmentKind::UpdatePanel,
            Self::HiddenField { .. } => FragmentKind::HiddenField,
            Self::ArrayDeclaration { .. } => FragmentKind::ArrayDeclaration,
            Self::ScriptBlock { .. } => FragmentKind::ScriptBlock,
            Self::FallbackScript { .. } => FragmentKind::FallbackScript,
            Self::ScriptStartupBlock { .. } => FragmentKind::ScriptStartupBlock,
            Self::Expando { .. } => FragmentKind::Expando,
            Self::OnSubmit { .. } => FragmentKind::OnSubmit,
            Self::AsyncPostBackControlIds { .. } => FragmentKind::AsyncPostBackControlIds,
            Self::PostBackControlIds { .. } => FragmentKind::PostBackControlIds,
            Self::UpdatePanelIds { .. } => FragmentKind::UpdatePanelIds,
            Self::AsyncPostBackTimeout { .. } => FragmentKind::AsyncPostBackTimeout,
            Self::ChildUpdatePanelIds { .. } => FragmentKind::ChildUpdatePanelIds,
            Self::PanelsToRefreshIds { .. } => FragmentKind::PanelsToRefreshIds,
            Self::FormAction { .. } => FragmentKind::FormAction,
            Self::DataItem { .. } => FragmentKind::DataItem,
            Self::DataItemJson { .. } => FragmentKind::DataItemJson,
            Self::ScriptDispose { .. } => FragmentKind::ScriptDispose,
        }
    }

    /// Build a fragment from the raw fields of one record.
    ///
    /// Only the `name` field of identifier-carrying kinds is kept; for the
    /// others the server always leaves it empty.
    pub fn from_record(kind: FragmentKind, name: &str, content: &str) -> Self {
        use super::numeric::parse_invariant_number;

        let id = || name.to_string();
        let value = || content.to_string();

        match kind {
            FragmentKind::Version => Self::Version {
                version: parse_invariant_number(content),
            },
            FragmentKind::PageRedirect => Self::PageRedirect { url: value() },
            FragmentKind::Error => Self::Error {
                code: parse_invariant_number(name),
                message: value(),
            },
            FragmentKind::PageTitle => Self::PageTitle { title: value() },
            FragmentKind::Focus => Self::Focus { id: value() },
            FragmentKind::UpdatePanel => Self::UpdatePanel {
                id: id(),
                html: value(),
            },
            FragmentKind::HiddenField => Self::HiddenField {
                id: id(),
                value: value(),
            },
            FragmentKind::ArrayDeclaration => Self::ArrayDeclaration {
                id: id(),
                value: value(),
            },
            FragmentKind::ScriptBlock => Self::ScriptBlock {
                id: id(),
                paths: vec![value()],
            },
            FragmentKind::FallbackScript => Self::FallbackScript { path: value() },
            FragmentKind::ScriptStartupBlock => Self::ScriptStartupBlock {
                id: id(),
                value: value(),
            },
            FragmentKind::Expando => Self::Expando {
                id: id(),
                value: value(),
            },
            FragmentKind::OnSubmit => Self::OnSubmit {
                id: id(),
                value: value(),
            },
            FragmentKind::AsyncPostBackControlIds => {
                Self::AsyncPostBackControlIds { value: value() }
            }
            FragmentKind::PostBackControlIds => Self::PostBackControlIds { value: value() },
            FragmentKind::UpdatePanelIds => Self::UpdatePanelIds { value: value() },
            FragmentKind::AsyncPostBackTimeout => Self::AsyncPostBackTimeout { value: value() },
            FragmentKind::ChildUpdatePanelIds => Self::ChildUpdatePanelIds { value: value() },
            FragmentKind::PanelsToRefreshIds => Self::PanelsToRefreshIds { value: value() },
            FragmentKind::FormAction => Self::FormAction { value: value() },
            FragmentKind::DataItem => Self::DataItem {
                id: id(),
                value: value(),
            },
            FragmentKind::DataItemJson => Self::DataItemJson {
                id: id(),
                value: value(),
            },
            FragmentKind::ScriptDispose => Self::ScriptDispose {
                id: id(),
                value: value(),
            },
        }
    }
}
