//! DOM patches
//!
//! Editing operations never touch the DOM. They return patches describing the
//! attributes the JavaScript glue must write, in the order they were produced.

use serde::{Deserialize, Serialize};

use super::element::{Rect, SceneElement};

/// CSS class of the single selected element
pub const SELECTED_CLASS: &str = "selected";

/// CSS class of members of a multi-selection
pub const MULTI_SELECTED_CLASS: &str = "multi-selected";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DomPatch {
    pub id: String,
    /// New `style.transform`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    /// `Some(true)` → `display: none`, `Some(false)` → display restored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    /// Replacement text; lines become `tspan`s
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub add_classes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub remove_classes: Vec<String>,
    /// The element is new and must be created on the annotation layer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create: Option<SceneElement>,
    /// The element must be removed from the DOM
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub remove: bool,
    /// `data-code-line` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_line: Option<usize>,
    /// New id for an element that was found by its previous id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rename_to: Option<String>,
}

impl DomPatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Default::default() }
    }

    pub fn transform(mut self, css: String) -> Self {
        self.transform = Some(css);
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = Some(hidden);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn add_class(mut self, class: &str) -> Self {
        self.add_classes.push(class.to_string());
        self
    }

    pub fn remove_class(mut self, class: &str) -> Self {
        self.remove_classes.push(class.to_string());
        self
    }
}

/// What the glue needs to know about the selection after an operation
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SelectionInfo {
    pub primary: Option<String>,
    pub group: Vec<String>,
    /// Padded box around the group, for the draggable group frame
    pub group_bounds: Option<Rect>,
    /// Whether the delete button applies to the primary selection
    pub can_delete: bool,
}

/// Result of an editing operation
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditOutcome {
    pub patches: Vec<DomPatch>,
    /// Rewritten program text, when the code synchronizer changed it
    pub code: Option<String>,
    pub selection: SelectionInfo,
    /// The caller should write the session to local storage
    pub persist: bool,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl EditOutcome {
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty() && self.code.is_none()
    }
}
