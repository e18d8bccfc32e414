// End-to-end editing sessions: mount a rendered score, edit it, and check
// both the DOM patches and the rewritten program

use score_overlay::linker::LineMap;
use score_overlay::models::{ElementKind, EditorState, Point, Rect, MULTI_SELECTED_CLASS, SHEET_ID};

const CODE: &str = "s = stream.Score()
m = stream.Measure(number=1)
cs = harmony.ChordSymbol(\"Cm7\")
m.insert(0, cs)
fine = expressions.TextExpression(\"Fine\")
m.insert(3.0, fine)
n = note.Note(\"C4\"); n.id = \"n1\"
m.append(n)
score = s";

const SVG: &str = r#"<svg width="800" height="600">
  <g class="staffline"><path d="M0 10 L800 10"/></g>
  <g class="vf-measure">
    <path d="M10 0 L10 40"/>
    <ellipse cx="60" cy="25" rx="5" ry="4"/>
    <text x="30" y="-10" font-size="18">Cm7</text>
  </g>
  <text x="400" y="500">Fine</text>
</svg>"#;

fn mounted() -> EditorState {
    let mut state = EditorState::default();
    state.begin_render(CODE);
    state.mount(SVG, LineMap::new()).expect("mount should succeed");
    state
}

#[test]
fn test_mount_links_every_declaration() {
    let mut state = EditorState::default();
    state.begin_render(CODE);
    let report = state.mount(SVG, LineMap::new()).unwrap();

    let chord = report.bindings.iter().find(|b| b.id == "element_0").expect("chord binding");
    assert_eq!(chord.code_line, Some(2));
    assert_eq!(chord.kind, ElementKind::ChordSymbol);

    let fine = report.bindings.iter().find(|b| b.id == "element_1").expect("text binding");
    assert_eq!(fine.code_line, Some(4));
    assert_eq!(fine.kind, ElementKind::TextExpression);

    let note = report.bindings.iter().find(|b| b.kind == ElementKind::Note).expect("note binding");
    assert_eq!(note.id, "n1");
    assert_eq!(note.code_line, Some(6));

    assert!(report.outcome.patches.is_empty(), "a fresh mount has nothing to re-apply");
    assert!(!report.outcome.can_undo);
}

#[test]
fn test_drag_rewrites_position_and_undo_restores_it() {
    let mut state = mounted();

    state.drag("element_0", 4.0, 0.0).unwrap();
    let out = state.drag_end("element_0").unwrap();
    assert!(out.persist);
    let code = out.code.expect("program should change");
    assert!(code.contains("m.insert(0, cs)\ncs.style.absoluteX = 10\nfine = "));
    assert_eq!(state.edits["element_0"].x_tenths, 10);

    let undone = state.undo();
    assert!(state.edits.is_empty());
    assert!(undone.can_redo);
    let patch = undone.patches.iter().find(|p| p.id == "element_0").unwrap();
    assert_eq!(patch.transform.as_deref(), Some("translate(0px, 0px) scale(1)"));

    state.redo();
    assert_eq!(state.edits["element_0"].x, 4.0);
}

#[test]
fn test_delete_comments_out_the_text_expression() {
    let mut state = mounted();
    state.select("element_1").unwrap();

    let out = state.delete_selected();
    let hidden = out.patches.iter().find(|p| p.id == "element_1").unwrap();
    assert_eq!(hidden.hidden, Some(true));
    let code = out.code.expect("program should change");
    assert!(code.contains("# fine = expressions.TextExpression(\"Fine\")\n# m.insert(3.0, fine)\n"));
    assert!(code.contains("\ncs = harmony.ChordSymbol(\"Cm7\")"));
    assert!(state.deletions.contains("element_1"));

    state.undo();
    assert!(state.deletions.is_empty());
}

#[test]
fn test_structural_elements_survive_delete() {
    let mut state = mounted();
    state.select(SHEET_ID).unwrap();
    let out = state.delete_selected();
    assert!(out.code.is_none());
    assert!(state.deletions.is_empty());
    assert!(!out.selection.can_delete);
}

#[test]
fn test_retyping_a_chord_replaces_its_literal() {
    let mut state = mounted();

    let (text, started) = state.begin_text_edit("element_0").unwrap();
    assert_eq!(text, "Cm7");
    assert_eq!(started.patches[0].hidden, Some(true));

    let out = state.commit_text_edit("element_0", "Dm7").unwrap();
    let code = out.code.expect("program should change");
    assert!(code.contains("cs = harmony.ChordSymbol(\"Dm7\")"));
    assert_eq!(state.element("element_0").unwrap().text, "Dm7");
}

#[test]
fn test_copy_paste_declares_a_new_annotation() {
    let mut state = mounted();
    state.select("element_1").unwrap();
    assert_eq!(state.copy(), 1);

    let out = state.paste(Point::new(400.0, 300.0));
    assert_eq!(out.selection.primary.as_deref(), Some("Fine-0"));
    assert!(out.patches.iter().any(|p| p.id == "Fine-0" && p.create.is_some()));

    let code = out.code.expect("program should change");
    assert!(code.contains("fine_0 = expressions.TextExpression(\"Fine\")\n"));
    assert!(code.contains("fine_0.id = \"Fine-0\"\n"));
    assert!(code.contains("fine_0.style.absoluteX = 50\n"));
    assert!(code.ends_with("\nscore = s"));
}

#[test]
fn test_rectangle_selection_moves_as_a_group() {
    let mut state = mounted();
    let out = state.select_in_rect(Rect::new(0.0, -100.0, 800.0, 700.0), false);
    assert_eq!(out.selection.group.len(), 2);
    assert!(out
        .patches
        .iter()
        .all(|p| p.add_classes.is_empty() || p.add_classes == vec![MULTI_SELECTED_CLASS.to_string()]));

    state.move_group(10.0, 0.0);
    let done = state.end_group_move();
    assert!(done.persist);
    assert_eq!(state.edits["element_0"].x, 10.0);
    assert_eq!(state.edits["element_1"].x, 10.0);
}
