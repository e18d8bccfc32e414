// From a raw /render-xml answer to a linked scene, and from edits back to
// MusicXML

use std::collections::HashMap;

use score_overlay::models::{EditMap, EditRecord, EditorState, Point};
use score_overlay::render::{apply_tenths_edits, dedupe_direction_words, RenderResponse};
use score_overlay::EditorError;

const CODE: &str = "s = stream.Score()
m = stream.Measure(number=1)
tx = expressions.TextExpression(\"Fine\")
m.insert(2.0, tx)
score = s";

const SVG: &str = r#"<svg width="800" height="600">
  <g class="staffline"><path d="M0 10 L800 10"/></g>
  <text x="120" y="260">Fine</text>
  <text x="120" y="260">Fine</text>
</svg>"#;

const XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<score-partwise version="4.0">
  <part id="P1">
    <measure number="1">
      <direction placement="above"><direction-type><words>Fine</words></direction-type></direction>
      <direction placement="above"><direction-type><words>Fine</words></direction-type></direction>
      <note><pitch><step>C</step><octave>4</octave></pitch><duration>4</duration></note>
    </measure>
  </part>
</score-partwise>"#;

fn headers(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name| map.get(name).cloned()
}

#[test]
fn test_render_answer_feeds_the_mount() {
    let response = RenderResponse::from_parts(
        200,
        XML,
        headers(&[
            ("X-Element-Line-Map", r#"{"element_0": 3}"#),
            ("X-Warnings", "tempo missing; key missing"),
            ("X-Warnings-Count", "4"),
        ]),
    )
    .unwrap();
    assert_eq!(response.warnings, vec!["tempo missing", "key missing"]);
    assert_eq!(response.warning_count, 4);

    let mut state = EditorState::default();
    state.begin_render(CODE);
    let report = state.mount(SVG, response.line_map).unwrap();

    assert_eq!(report.removed_duplicates, vec![1]);
    let fine = report.bindings.iter().find(|b| b.id == "element_0").expect("linked text");
    assert_eq!(fine.source_index, 0);
    assert_eq!(fine.code_line, Some(3), "the service's line wins");
}

#[test]
fn test_failed_render_surfaces_the_server_message() {
    let err = RenderResponse::from_parts(500, "NameError: name 'x' is not defined", headers(&[])).unwrap_err();
    match err {
        EditorError::Server { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("NameError"));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let err = RenderResponse::from_parts(200, "<html>oops</html>", headers(&[])).unwrap_err();
    assert!(matches!(err, EditorError::UnexpectedResponse(_)));
}

#[test]
fn test_reload_writes_pasted_offsets_into_musicxml() {
    let mut state = EditorState::default();
    state.begin_render(CODE);
    state.mount(SVG, Default::default()).unwrap();
    state.select("element_0").unwrap();
    state.copy();
    state.paste(Point::new(300.0, 300.0));
    assert!(state.edits.contains_key("Fine-0"));

    let xml = apply_tenths_edits(XML, &state.edits).unwrap();
    let xml = dedupe_direction_words(&xml).unwrap();
    assert_eq!(xml.matches("<words>Fine</words>").count(), 1);
    assert!(xml.contains("default-x=\"50\""));
    assert!(xml.contains("default-y=\"50\""));
    assert!(xml.contains("<note>"));
}

#[test]
fn test_directions_without_matching_edit_are_untouched() {
    let mut edits = EditMap::new();
    edits.insert("Coda-0".to_string(), EditRecord::at(8.0, 8.0, 2.5));
    let xml = apply_tenths_edits(XML, &edits).unwrap();
    assert!(!xml.contains("default-x"));
}
