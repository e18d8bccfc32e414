//! Retyping texts in place

use crate::error::{EditorError, Result};
use crate::models::{DomPatch, EditOutcome, EditorState};

impl EditorState {
    /// Start retyping `id`; returns the text to seed the input with
    ///
    /// The text before the first edit is remembered for cancel and undo.
    pub fn begin_text_edit(&mut self, id: &str) -> Result<(String, EditOutcome)> {
        let element = self
            .scene
            .get(id)
            .filter(|e| e.is_text() && !e.is_structural())
            .ok_or_else(|| EditorError::UnknownElement(id.to_string()))?;
        let text = element.text.clone();
        self.original_texts.entry(id.to_string()).or_insert_with(|| text.clone());
        self.editing = Some(id.to_string());
        let patches = vec![DomPatch::new(id).hidden(true)];
        Ok((text, self.outcome(patches, false, false)))
    }

    /// Store the new text, snapshot and rewrite the statement
    pub fn commit_text_edit(&mut self, id: &str, text: &str) -> Result<EditOutcome> {
        if !self.scene.contains(id) {
            return Err(EditorError::UnknownElement(id.to_string()));
        }
        self.editing = None;
        self.edit_mut(id).text_content = Some(text.to_string());
        self.save_state();

        // The statement still carries the old text
        let code_changed = self.sync_element(id);
        if let Some(element) = self.scene.get_mut(id) {
            element.text = text.to_string();
        }

        log::info!("editor: {} retyped", id);
        let patches = vec![DomPatch::new(id).text(text).hidden(false)];
        Ok(self.outcome(patches, code_changed, true))
    }

    /// Abandon retyping and show the remembered text again
    pub fn cancel_text_edit(&mut self, id: &str) -> EditOutcome {
        self.editing = None;
        let mut patch = DomPatch::new(id).hidden(false);
        if let Some(original) = self.original_texts.get(id) {
            patch = patch.text(original.clone());
        }
        self.outcome(vec![patch], false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ElementKind, Rect, SceneElement};

    fn state() -> EditorState {
        let mut state = EditorState::default();
        state.code = "tx = expressions.TextExpression(\"rit.\")\ntx.id = \"rit.-0\"\nm.insert(0.0, tx)".to_string();
        let mut e = SceneElement::text("rit.", Rect::new(10.0, 300.0, 30.0, 10.0)).with_id("rit.-0");
        e.kind = ElementKind::TextExpression;
        e.code_line = Some(0);
        state.scene.push(e);
        state.save_state();
        state
    }

    #[test]
    fn commit_rewrites_literal() {
        let mut state = state();
        let (seed, out) = state.begin_text_edit("rit.-0").unwrap();
        assert_eq!(seed, "rit.");
        assert_eq!(out.patches[0].hidden, Some(true));

        let out = state.commit_text_edit("rit.-0", "a tempo").unwrap();
        assert!(out.code.unwrap().starts_with("tx = expressions.TextExpression(\"a tempo\")"));
        assert_eq!(out.patches[0].text.as_deref(), Some("a tempo"));
        assert_eq!(state.element("rit.-0").unwrap().text, "a tempo");
        assert_eq!(state.edits["rit.-0"].text_content.as_deref(), Some("a tempo"));
        assert!(state.history.can_undo());
    }

    #[test]
    fn cancel_restores_original() {
        let mut state = state();
        state.begin_text_edit("rit.-0").unwrap();
        let out = state.cancel_text_edit("rit.-0");
        assert_eq!(out.patches[0].text.as_deref(), Some("rit."));
        assert_eq!(out.patches[0].hidden, Some(false));
        assert!(state.editing.is_none());
    }

    #[test]
    fn original_text_kept_across_edits() {
        let mut state = state();
        state.begin_text_edit("rit.-0").unwrap();
        state.commit_text_edit("rit.-0", "poco rit.").unwrap();
        state.begin_text_edit("rit.-0").unwrap();
        assert_eq!(state.original_texts["rit.-0"], "rit.");
    }
}
