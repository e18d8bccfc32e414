//! New annotations and overlay copies of rendered texts

use crate::error::{EditorError, Result};
use crate::models::{
    DomPatch, EditOutcome, EditRecord, EditorState, ElementKind, Layer, Point, SceneElement, OVERLAY_PREFIX,
    SELECTED_CLASS,
};
use crate::render::estimated_text_box;
use crate::sync::insert_new_element;

/// Font of symbols added from the palette
const SYMBOL_FONT_SIZE: f64 = 32.0;
const SYMBOL_FONT_FAMILY: &str = "Arial, sans-serif";
const TEXT_FONT_SIZE: f64 = 20.0;
const TEXT_FONT_FAMILY: &str = "Times New Roman";

/// Id stem of a new annotation: whitespace runs become `-`, anything but
/// ASCII word characters and `-` is dropped
///
/// Texts with nothing left (symbols, mostly) fall back to `annotation`.
pub fn base_id(text: &str) -> String {
    let stem: String = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if stem.is_empty() {
        "annotation".to_string()
    } else {
        stem
    }
}

impl EditorState {
    /// Annotation element with its baseline starting at `at`
    pub(crate) fn annotation_element(
        &self,
        text: &str,
        at: Point,
        font_size: f64,
        font_family: &str,
        kind: ElementKind,
    ) -> SceneElement {
        let mut element = SceneElement::text(text, estimated_text_box(text, at.x, at.y, font_size, None))
            .with_kind(kind)
            .with_font_size(font_size)
            .on_layer(Layer::Annotation);
        element.font_family = font_family.to_string();
        element
    }

    /// Give `element` a fresh id, add it to the scene with an identity edit
    /// record, and return the id with the patch that creates it
    pub(crate) fn insert_annotation(&mut self, mut element: SceneElement) -> (String, DomPatch) {
        let stem = base_id(&element.text);
        let mut count = self.scene.count_ids_with_prefix(&stem);
        let mut id = format!("{}-{}", stem, count);
        while self.scene.contains(&id) {
            count += 1;
            id = format!("{}-{}", stem, count);
        }
        element.id = id.clone();
        element.layer = Layer::Annotation;

        let mut create = DomPatch::new(&id);
        create.create = Some(element.clone());
        self.scene.push(element);
        self.edits.insert(id.clone(), EditRecord::default());
        log::debug!("editor: created {}", id);
        (id, create)
    }

    /// Add the declaration of a new annotation to the program
    pub(crate) fn insert_code_for(&mut self, id: &str) -> bool {
        let Some(element) = self.scene.get(id).cloned() else {
            return false;
        };
        let suffix = self.take_suffix();
        let edit = self.edits.get(id).cloned();
        self.code = insert_new_element(&self.code, &element, edit.as_ref(), suffix, &self.config);
        true
    }

    /// Create, select and declare a new annotation
    fn finalize_new_element(&mut self, element: SceneElement) -> EditOutcome {
        let (id, create) = self.insert_annotation(element);
        let mut patches = vec![create];
        self.save_state();
        patches.extend(self.clear_selection());
        patches.push(DomPatch::new(&id).add_class(SELECTED_CLASS));
        self.selected = Some(id.clone());
        let code_changed = self.insert_code_for(&id);
        self.outcome(patches, code_changed, true)
    }

    /// Place a typed text at `at`; blank input creates nothing
    pub fn add_text_at(&mut self, at: Point, text: &str) -> EditOutcome {
        if text.trim().is_empty() {
            return self.outcome(Vec::new(), false, false);
        }
        let element = self.annotation_element(text, at, TEXT_FONT_SIZE, TEXT_FONT_FAMILY, ElementKind::Text);
        self.finalize_new_element(element)
    }

    /// Place a palette symbol at the centre of the view
    pub fn add_symbol(&mut self, symbol: &str, center: Point) -> EditOutcome {
        let element = self.annotation_element(symbol, center, SYMBOL_FONT_SIZE, SYMBOL_FONT_FAMILY, ElementKind::Symbol);
        self.finalize_new_element(element)
    }

    /// Recreate a rendered text on the annotation layer as `overlay-{id}`
    ///
    /// The copy takes the displayed position of the original, which is
    /// removed. Its content is remembered so the re-rendered original can be
    /// dropped after a reload.
    pub fn convert_to_overlay(&mut self, id: &str) -> Result<EditOutcome> {
        if id.starts_with(OVERLAY_PREFIX) {
            return Ok(self.outcome(Vec::new(), false, false));
        }
        let original = self
            .scene
            .get(id)
            .filter(|e| e.layer == Layer::Rendered && e.is_text() && !e.is_structural())
            .cloned()
            .ok_or_else(|| EditorError::UnknownElement(id.to_string()))?;

        let mut overlay = original.clone();
        overlay.bounds = self.displayed_bounds(&original);
        overlay.id = format!("{}{}", OVERLAY_PREFIX, id);
        overlay.layer = Layer::Annotation;
        overlay.source_index = None;
        overlay.fill = original.fill.clone().or_else(|| Some("currentColor".to_string()));

        self.converted_texts.insert(original.trimmed_text().to_string());
        self.scene.remove(id);
        let mut patches = Vec::new();
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        self.group.retain(|g| g != id);

        let mut removed = DomPatch::new(id);
        removed.remove = true;
        patches.push(removed);
        let mut create = DomPatch::new(&overlay.id);
        create.create = Some(overlay.clone());
        patches.push(create);
        log::info!("editor: \"{}\" converted to overlay {}", original.trimmed_text(), overlay.id);
        self.scene.push(overlay);
        Ok(self.outcome(patches, false, false))
    }

    /// After a reload, drop rendered texts whose content was converted
    pub fn remove_converted_after_reload(&mut self) -> EditOutcome {
        let doomed: Vec<String> = self
            .scene
            .elements
            .iter()
            .filter(|e| e.layer == Layer::Rendered && e.is_text() && !e.is_structural())
            .filter(|e| self.converted_texts.contains(e.trimmed_text()))
            .map(|e| e.id.clone())
            .collect();
        let patches = doomed
            .iter()
            .map(|id| {
                self.scene.remove(id);
                let mut patch = DomPatch::new(id);
                patch.remove = true;
                patch
            })
            .collect::<Vec<_>>();
        if !patches.is_empty() {
            log::info!("editor: {} converted text(s) removed after reload", patches.len());
        }
        self.outcome(patches, false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rect;

    fn state() -> EditorState {
        let mut state = EditorState::default();
        state.code = "s = stream.Score()\nm = stream.Measure(number=1)\nscore = s".to_string();
        state.scene.push(SceneElement::text("Fine", Rect::new(10.0, 300.0, 40.0, 10.0)).with_id("Fine-0"));
        state.save_state();
        state
    }

    #[test]
    fn base_id_sanitizes() {
        assert_eq!(base_id("Da  Capo al\tFine"), "Da-Capo-al-Fine");
        assert_eq!(base_id("rit."), "rit");
        assert_eq!(base_id("♯"), "annotation");
    }

    #[test]
    fn new_text_is_selected_and_declared() {
        let mut state = state();
        let out = state.add_text_at(Point::new(100.0, 150.0), "Fine");
        assert_eq!(out.selection.primary.as_deref(), Some("Fine-1"));
        assert!(out.patches[0].create.is_some());
        let code = out.code.unwrap();
        assert!(code.contains("fine_0 = expressions.TextExpression(\"Fine\")"));
        assert!(code.find("TextExpression").unwrap() < code.find("score = s").unwrap());
        assert_eq!(state.edits["Fine-1"], EditRecord::default());
    }

    #[test]
    fn blank_text_creates_nothing() {
        let mut state = state();
        assert!(state.add_text_at(Point::new(0.0, 0.0), "   ").is_empty());
        assert_eq!(state.scene.elements.len(), 1);
    }

    #[test]
    fn symbol_uses_symbol_font() {
        let mut state = state();
        state.add_symbol("𝄐", Point::new(300.0, 300.0));
        let element = state.element("annotation-0").unwrap();
        assert_eq!(element.kind, ElementKind::Symbol);
        assert_eq!(element.font_size, 32.0);
        assert_eq!(element.font_family, "Arial, sans-serif");
    }

    #[test]
    fn ids_stay_unique_after_removal() {
        let mut state = state();
        state.add_text_at(Point::new(0.0, 0.0), "x");
        state.add_text_at(Point::new(0.0, 0.0), "x");
        assert!(state.scene.contains("x-0"));
        assert!(state.scene.contains("x-1"));
    }

    #[test]
    fn overlay_conversion_and_reload_cleanup() {
        let mut state = state();
        state.edit_mut("Fine-0").translate(5.0, 0.0, 2.5);
        let out = state.convert_to_overlay("Fine-0").unwrap();
        assert!(out.patches[0].remove);
        let overlay = state.element("overlay-Fine-0").unwrap();
        assert_eq!(overlay.layer, Layer::Annotation);
        assert_eq!(overlay.bounds.x, 15.0);
        assert!(!state.scene.contains("Fine-0"));

        // Re-rendered score brings the text back
        state.scene.push(SceneElement::text("Fine", Rect::new(10.0, 300.0, 40.0, 10.0)).with_id("Fine-0"));
        let out = state.remove_converted_after_reload();
        assert_eq!(out.patches.len(), 1);
        assert!(state.scene.contains("overlay-Fine-0"));
        assert!(!state.scene.contains("Fine-0"));
    }
}
