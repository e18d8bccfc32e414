//! Copy and paste

use crate::models::{
    ClipItem, Clipboard, DomPatch, EditOutcome, EditorState, ElementKind, Point, SceneElement, MULTI_SELECTED_CLASS,
    SELECTED_CLASS,
};

impl EditorState {
    fn clip_item(&self, element: &SceneElement, offset: Point) -> ClipItem {
        ClipItem {
            content: element.text.clone(),
            kind: element.kind,
            font_size: element.font_size,
            font_family: element.font_family.clone(),
            scale: self.edits.get(&element.id).map_or(1.0, |e| e.scale),
            is_symbol: element.kind == ElementKind::Symbol,
            offset_x: offset.x,
            offset_y: offset.y,
        }
    }

    /// Copy the selection to the clipboard; returns the number of items
    ///
    /// A multi-selection keeps each element's offset from the group's mean
    /// top-left corner. The sheet and staff are never copied.
    pub fn copy(&mut self) -> usize {
        if !self.group.is_empty() {
            let members: Vec<(SceneElement, Point)> = self
                .group
                .iter()
                .filter_map(|id| self.scene.get(id))
                .filter(|e| !e.is_structural())
                .map(|e| {
                    let b = self.displayed_bounds(e);
                    (e.clone(), Point::new(b.x, b.y))
                })
                .collect();
            if members.is_empty() {
                return 0;
            }
            let n = members.len() as f64;
            let center = Point::new(
                members.iter().map(|(_, p)| p.x).sum::<f64>() / n,
                members.iter().map(|(_, p)| p.y).sum::<f64>() / n,
            );
            let items: Vec<ClipItem> = members
                .iter()
                .map(|(e, p)| self.clip_item(e, Point::new(p.x - center.x, p.y - center.y)))
                .collect();
            let count = items.len();
            self.clipboard = Some(Clipboard::Multiple { items });
            log::info!("clipboard: {} element(s) copied", count);
            return count;
        }

        let Some(element) = self.selected.as_deref().and_then(|id| self.scene.get(id)) else {
            return 0;
        };
        if element.is_structural() {
            log::warn!("clipboard: {} cannot be copied", element.id);
            return 0;
        }
        let item = self.clip_item(element, Point::default());
        log::info!("clipboard: \"{}\" copied", item.content);
        self.clipboard = Some(Clipboard::Single { item });
        1
    }

    /// Paste the clipboard as new annotations around `center`
    ///
    /// Pasted elements keep their scale and land offset by the paste
    /// distance; a multi paste becomes the new multi-selection.
    pub fn paste(&mut self, center: Point) -> EditOutcome {
        let Some(clipboard) = self.clipboard.clone() else {
            return self.outcome(Vec::new(), false, false);
        };
        let shift = self.config.paste_offset;
        let tpp = self.config.tenths_per_px;
        let mut patches = self.clear_selection();

        let mut pasted = Vec::new();
        for item in clipboard.items() {
            let kind = if item.is_symbol { ElementKind::Symbol } else { ElementKind::Text };
            let element = self.annotation_element(&item.content, center, item.font_size, &item.font_family, kind);
            let (id, create) = self.insert_annotation(element);
            patches.push(create);

            let edit = self.edit_mut(&id);
            edit.rescale(item.scale);
            edit.set_position(item.offset_x + shift, item.offset_y + shift, tpp);
            patches.push(self.transform_patch(&id));
            pasted.push(id);
        }

        if clipboard.is_multiple() {
            for id in &pasted {
                patches.push(DomPatch::new(id).add_class(MULTI_SELECTED_CLASS));
            }
            self.group = pasted.clone();
        } else if let Some(id) = pasted.first() {
            patches.push(DomPatch::new(id).add_class(SELECTED_CLASS));
            self.selected = Some(id.clone());
        }

        let mut code_changed = false;
        for id in &pasted {
            code_changed |= self.insert_code_for(id);
        }
        self.save_state();
        log::info!("clipboard: {} element(s) pasted", pasted.len());
        self.outcome(patches, code_changed, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Layer, Rect};

    fn state() -> EditorState {
        let mut state = EditorState::default();
        state.code = "s = stream.Score()\nm = stream.Measure(number=1)\nscore = s".to_string();
        state.scene.push(SceneElement::text("Am", Rect::new(10.0, 300.0, 20.0, 10.0)).with_id("Am-0"));
        state.scene.push(SceneElement::text("G7", Rect::new(50.0, 320.0, 20.0, 10.0)).with_id("G7-0"));
        state.save_state();
        state
    }

    #[test]
    fn multi_copy_keeps_offsets_from_mean_corner() {
        let mut state = state();
        state.select_in_rect(Rect::new(0.0, 290.0, 100.0, 50.0), false);
        assert_eq!(state.copy(), 2);
        let items = state.clipboard.as_ref().unwrap().items().to_vec();
        assert_eq!((items[0].offset_x, items[0].offset_y), (-20.0, -10.0));
        assert_eq!((items[1].offset_x, items[1].offset_y), (20.0, 10.0));
    }

    #[test]
    fn single_paste_is_offset_and_selected() {
        let mut state = state();
        state.select("Am-0").unwrap();
        state.edit_mut("Am-0").rescale(1.5);
        assert_eq!(state.copy(), 1);

        let out = state.paste(Point::new(400.0, 300.0));
        let id = out.selection.primary.clone().unwrap();
        assert_eq!(id, "Am-1");
        let element = state.element(&id).unwrap();
        assert_eq!(element.layer, Layer::Annotation);
        assert_eq!(state.edits[&id].x, 20.0);
        assert_eq!(state.edits[&id].scale, 1.5);
        assert!(out.code.unwrap().contains("TextExpression(\"Am\")"));
        assert!(out.persist);
    }

    #[test]
    fn multi_paste_becomes_group() {
        let mut state = state();
        state.select_in_rect(Rect::new(0.0, 290.0, 100.0, 50.0), false);
        state.copy();
        let out = state.paste(Point::new(400.0, 300.0));
        assert_eq!(out.selection.group.len(), 2);
        assert!(out.selection.primary.is_none());
        let first = &out.selection.group[0];
        assert_eq!(state.edits[first].x, 0.0);
        assert_eq!(state.edits[first].y, 10.0);
    }

    #[test]
    fn paste_without_clipboard_does_nothing() {
        let mut state = state();
        assert!(state.paste(Point::new(0.0, 0.0)).is_empty());
    }

    #[test]
    fn sheet_is_not_copied() {
        let mut state = state();
        state
            .scene
            .push(SceneElement::text("", Rect::default()).with_id(crate::models::SHEET_ID).with_kind(ElementKind::Sheet));
        state.select(crate::models::SHEET_ID).unwrap();
        assert_eq!(state.copy(), 0);
        assert!(state.clipboard.is_none());
    }
}
