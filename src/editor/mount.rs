//! Taking over a freshly rendered score

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::linker::{
    assign_fallback_ids, assign_stable_ids, link_from_backend, map_notes_globally, scan_program, LineMap,
};
use crate::models::{DomPatch, EditOutcome, EditorState, ElementKind, Layer};
use crate::render::{parse_svg, remove_duplicate_texts};

/// Id and program line for one node of the rendered SVG
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    /// Document-order index among `<text>` nodes, or `<ellipse>` nodes for notes
    pub source_index: usize,
    pub id: String,
    pub code_line: Option<usize>,
    pub kind: ElementKind,
}

/// What the glue must do to the rendered SVG after a mount
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MountReport {
    pub bindings: Vec<Binding>,
    /// `<text>` indexes to remove as duplicates
    pub removed_duplicates: Vec<usize>,
    /// Root children to move into the staff group
    pub staff_children: Vec<usize>,
    /// Patches re-applying surviving edits
    pub outcome: EditOutcome,
}

impl EditorState {
    /// Forget everything tied to the previous program before a new render
    pub fn begin_render(&mut self, code: &str) {
        self.code = code.to_string();
        self.edits.clear();
        self.deletions.clear();
        self.converted_texts.clear();
        self.original_texts.clear();
        self.selected = None;
        self.group.clear();
        self.editing = None;
    }

    /// Build the scene for rendered SVG markup and link it to the program
    ///
    /// Annotation-layer elements survive; rendered ones are replaced.
    pub fn mount(&mut self, svg: &str, line_map: LineMap) -> Result<MountReport> {
        let parsed = parse_svg(svg)?;
        let mut scene = parsed.scene;
        let removed_duplicates = remove_duplicate_texts(&mut scene);

        let decls = scan_program(&self.code);
        self.stable_ids = assign_stable_ids(&mut scene, &decls);
        link_from_backend(&mut scene, &line_map);
        let notes_unlinked = scene
            .elements
            .iter()
            .filter(|e| e.kind == ElementKind::Note)
            .all(|e| e.id.is_empty());
        if notes_unlinked {
            map_notes_globally(&mut scene, &self.code);
        }

        let annotations: Vec<_> = self
            .scene
            .elements
            .drain(..)
            .filter(|e| e.layer == Layer::Annotation)
            .collect();
        scene.elements.extend(annotations);
        scene.measure_boxes = std::mem::take(&mut self.scene.measure_boxes);
        assign_fallback_ids(&mut scene);
        self.scene = scene;
        self.line_map = line_map;

        self.selected = None;
        self.group.clear();
        self.just_completed_selection = false;
        self.editing = None;
        self.reset_initial();

        let bindings: Vec<Binding> = self
            .scene
            .elements
            .iter()
            .filter(|e| e.layer == Layer::Rendered)
            .filter_map(|e| {
                Some(Binding {
                    source_index: e.source_index?,
                    id: e.id.clone(),
                    code_line: e.code_line,
                    kind: e.kind,
                })
            })
            .collect();
        log::info!(
            "editor: mounted {} element(s), {} binding(s), {} stable id(s)",
            self.scene.elements.len(),
            bindings.len(),
            self.stable_ids.len()
        );

        Ok(MountReport {
            bindings,
            removed_duplicates,
            staff_children: parsed.staff_children,
            outcome: self.apply_transforms(),
        })
    }

    /// Mount a score re-rendered from edited MusicXML
    ///
    /// Converted texts are dropped again and measure-anchored edits follow
    /// their measures before transforms are re-applied.
    pub fn remount_after_reload(&mut self, svg: &str) -> Result<MountReport> {
        let line_map = std::mem::take(&mut self.line_map);
        let mut report = self.mount(svg, line_map)?;
        let removed = self.remove_converted_after_reload();
        self.recalculate_positions();
        let mut patches: Vec<DomPatch> = removed.patches;
        patches.extend(self.apply_transforms().patches);
        report.outcome = self.outcome(patches, false, false);
        let gone: Vec<&str> = report
            .outcome
            .patches
            .iter()
            .filter(|p| p.remove)
            .map(|p| p.id.as_str())
            .collect();
        report.bindings.retain(|b| !gone.contains(&b.id.as_str()));
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Point, SHEET_ID, STAFF_ID};

    const CODE: &str = "s = stream.Score()\n\
m = stream.Measure(number=1)\n\
cs = harmony.ChordSymbol(\"Cm7\")\n\
m.insert(0, cs)\n\
n = note.Note(\"C4\"); n.id = \"n1\"\n\
m.append(n)\n\
score = s";

    const SVG: &str = r#"<svg width="800" height="600">
  <g class="staffline"><path d="M0 10 L800 10"/></g>
  <g class="vf-measure">
    <path d="M10 0 L10 40"/>
    <ellipse cx="60" cy="25" rx="5" ry="4"/>
    <text x="30" y="-10" font-size="18">Cm7</text>
    <text x="30" y="-10" font-size="18">Cm7</text>
  </g>
  <text x="400" y="500">Fine</text>
</svg>"#;

    #[test]
    fn mount_links_texts_and_notes() {
        let mut state = EditorState::default();
        state.begin_render(CODE);
        let report = state.mount(SVG, LineMap::new()).unwrap();

        assert_eq!(report.removed_duplicates, vec![1]);
        assert_eq!(report.staff_children, vec![0]);
        let chord = report.bindings.iter().find(|b| b.source_index == 0 && b.kind != ElementKind::Note).unwrap();
        assert_eq!(chord.code_line, Some(2));
        let note = report.bindings.iter().find(|b| b.kind == ElementKind::Note).unwrap();
        assert_eq!(note.id, "n1");
        assert_eq!(note.code_line, Some(4));
        let fine = report.bindings.iter().find(|b| b.source_index == 2).unwrap();
        assert!(fine.id.starts_with("temp_Fine_"));
        assert!(state.scene.contains(SHEET_ID));
        assert!(state.scene.contains(STAFF_ID));
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn backend_line_map_wins_for_known_ids() {
        let svg = r#"<svg width="10" height="10"><text x="1" y="300">Coda</text></svg>"#;
        let mut state = EditorState::default();
        state.begin_render("m = stream.Measure(1)\ntx = expressions.TextExpression(\"Coda\")");
        let mut map = LineMap::new();
        map.insert("element_0".into(), 5);
        let report = state.mount(svg, map).unwrap();
        assert_eq!(report.bindings[0].id, "element_0");
        assert_eq!(report.bindings[0].code_line, Some(5));
    }

    #[test]
    fn begin_render_clears_session() {
        let mut state = EditorState::default();
        state.edit_mut("a").translate(1.0, 1.0, 2.5);
        state.deletions.insert("b".into());
        state.converted_texts.insert("c".into());
        state.begin_render("x = 1");
        assert!(state.edits.is_empty());
        assert!(state.deletions.is_empty());
        assert!(state.converted_texts.is_empty());
        assert_eq!(state.code, "x = 1");
    }

    #[test]
    fn reload_keeps_annotations_and_drops_converted_texts() {
        let mut state = EditorState::default();
        state.begin_render(CODE);
        state.mount(SVG, LineMap::new()).unwrap();
        let fine = state.scene.elements.iter().find(|e| e.text == "Fine").unwrap().id.clone();
        state.convert_to_overlay(&fine).unwrap();
        state.add_text_at(Point::new(10.0, 10.0), "coda");

        let report = state.remount_after_reload(SVG).unwrap();
        assert!(state.scene.contains("coda-0"));
        assert!(state.scene.contains(&format!("overlay-{}", fine)));
        assert!(report.outcome.patches.iter().any(|p| p.remove && p.id == fine));
        assert!(report.bindings.iter().all(|b| b.id != fine));
    }
}
