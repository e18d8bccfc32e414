//! WASM API for the overlay editor
//!
//! One editing session lives in a WASM-owned [`EditorState`]. Each exported
//! function locks it, runs one core operation and hands the resulting
//! [`EditOutcome`] back to the JavaScript glue, which applies the patches to
//! the DOM. Outcomes flagged `persist` are written to `localStorage` here.

use lazy_static::lazy_static;
use std::sync::{Mutex, MutexGuard};
use wasm_bindgen::prelude::*;

use crate::config::EditorConfig;
use crate::editor::MeasuredBounds;
use crate::error::EditorError;
use crate::models::{EditOutcome, EditorState, Point, Rect};
use crate::persistence;
use crate::playback;
use crate::render::{apply_tenths_edits, dedupe_direction_words, export_file_name, MidiExportRequest};

use super::helpers::{deserialize, editor_error, serialize, ApiResult};
use super::network;
use super::storage::LocalStorage;
use super::types::{CopyResult, ExportResult, MountResult, RenderResult, TextEditStart};
use crate::{wasm_info, wasm_log, wasm_warn};

// WASM-owned editor session (canonical source of truth)
lazy_static! {
    static ref EDITOR: Mutex<Option<EditorState>> = Mutex::new(None);
}

fn lock_editor() -> ApiResult<MutexGuard<'static, Option<EditorState>>> {
    EDITOR
        .lock()
        .map_err(|_| JsValue::from_str("editor state lock poisoned"))
}

/// Run `f` on the session, creating a default one on first use
fn with_editor<T>(f: impl FnOnce(&mut EditorState) -> ApiResult<T>) -> ApiResult<T> {
    let mut guard = lock_editor()?;
    let state = guard.get_or_insert_with(EditorState::default);
    f(state)
}

fn current_config() -> ApiResult<EditorConfig> {
    with_editor(|state| Ok(state.config.clone()))
}

fn timestamp() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Store edits and deletions; a failing store only logs
fn persist(state: &EditorState) {
    let result = LocalStorage::open().and_then(|mut store| {
        persistence::save(
            &mut store,
            &state.config.storage_key,
            &state.edits,
            &state.deletions,
            timestamp(),
        )
    });
    if let Err(e) = result {
        wasm_warn!("could not save edits: {}", e);
    }
}

fn finish(state: &EditorState, outcome: EditOutcome, context: &str) -> ApiResult<JsValue> {
    if outcome.persist {
        persist(state);
    }
    serialize(&outcome, context)
}

// ============================================================================
// Session
// ============================================================================

/// Start a session with the given configuration (any subset of fields)
#[wasm_bindgen(js_name = initEditor)]
pub fn init_editor(config_js: JsValue) -> ApiResult<()> {
    let config: EditorConfig = if config_js.is_undefined() || config_js.is_null() {
        EditorConfig::default()
    } else {
        deserialize(config_js, "Invalid editor config")?
    };
    wasm_info!(
        "initEditor: storage key '{}', endpoint base '{}'",
        config.storage_key,
        config.endpoint_base
    );
    *lock_editor()? = Some(EditorState::new(config));
    Ok(())
}

#[wasm_bindgen(js_name = getCode)]
pub fn get_code() -> ApiResult<String> {
    with_editor(|state| Ok(state.code.clone()))
}

/// Adopt program text edited by hand
#[wasm_bindgen(js_name = setCode)]
pub fn set_code(code: String) -> ApiResult<()> {
    with_editor(|state| {
        state.code = code;
        Ok(())
    })
}

#[wasm_bindgen(js_name = getEdits)]
pub fn get_edits() -> ApiResult<JsValue> {
    with_editor(|state| serialize(&state.edits, "getEdits"))
}

/// Full session snapshot, for debugging
#[wasm_bindgen(js_name = getEditorState)]
pub fn get_editor_state() -> ApiResult<JsValue> {
    with_editor(|state| serialize(state, "getEditorState"))
}

// ============================================================================
// Rendering
// ============================================================================

/// Run the program on the score service
///
/// Clears the previous session and stored edits. The returned MusicXML goes
/// to the notation renderer; its SVG comes back through
/// [`mount_rendered_score`].
#[wasm_bindgen(js_name = renderProgram)]
pub async fn render_program(code: String) -> ApiResult<JsValue> {
    let config = current_config()?;
    wasm_info!("renderProgram: {} line(s)", code.lines().count());

    with_editor(|state| {
        state.begin_render(&code);
        Ok(())
    })?;
    match LocalStorage::open().and_then(|mut store| persistence::clear(&mut store, &config.storage_key)) {
        Ok(()) => wasm_log!("renderProgram: cleared stored edits"),
        Err(e) => wasm_warn!("renderProgram: could not clear stored edits: {}", e),
    }

    let response = network::render_program(&config, &code).await.map_err(editor_error)?;
    let result = RenderResult {
        xml: response.xml.clone(),
        warnings: response.warnings.clone(),
        warning_count: response.warning_count,
        mapped_ids: response.line_map.len(),
    };
    with_editor(|state| {
        state.line_map = response.line_map;
        state.score_xml = Some(response.xml);
        Ok(())
    })?;
    serialize(&result, "renderProgram")
}

/// Take over the SVG the notation renderer produced
///
/// Edits stored from an earlier visit are re-applied.
#[wasm_bindgen(js_name = mountRenderedScore)]
pub fn mount_rendered_score(svg: String) -> ApiResult<JsValue> {
    with_editor(|state| {
        let line_map = std::mem::take(&mut state.line_map);
        let mut report = state.mount(&svg, line_map).map_err(editor_error)?;

        let stored = LocalStorage::open()
            .map_err(|e| wasm_warn!("mountRenderedScore: {}", e))
            .ok()
            .and_then(|store| persistence::load(&store, &state.config.storage_key));
        let restored = stored.is_some();
        if let Some(stored) = stored {
            report.outcome = state.load_persisted(stored);
            wasm_info!("mountRenderedScore: restored stored edits");
        }
        wasm_info!(
            "mountRenderedScore: {} binding(s), {} duplicate(s) removed",
            report.bindings.len(),
            report.removed_duplicates.len()
        );
        serialize(&MountResult { report, restored }, "mountRenderedScore")
    })
}

/// Take over the SVG rendered from MusicXML with edits applied
#[wasm_bindgen(js_name = remountAfterReload)]
pub fn remount_after_reload(svg: String) -> ApiResult<JsValue> {
    with_editor(|state| {
        let report = state.remount_after_reload(&svg).map_err(editor_error)?;
        persist(state);
        serialize(&MountResult { report, restored: false }, "remountAfterReload")
    })
}

/// Write the current edits into the MusicXML of the last render
///
/// Falls back to rewriting locally when the service is unreachable. The
/// result is kept as the current MusicXML and returned for re-rendering.
#[wasm_bindgen(js_name = reloadWithEdits)]
pub async fn reload_with_edits() -> ApiResult<String> {
    let (config, xml, edits) = with_editor(|state| {
        let xml = state
            .score_xml
            .clone()
            .ok_or_else(|| editor_error(EditorError::NoDocument))?;
        Ok((state.config.clone(), xml, state.edits.clone()))
    })?;

    let updated = match network::apply_edits_xml(&config, &xml, &edits).await {
        Ok(updated) => updated,
        Err(e) => {
            wasm_warn!("reloadWithEdits: service failed ({}), rewriting locally", e);
            apply_tenths_edits(&xml, &edits).map_err(editor_error)?
        }
    };
    let updated = dedupe_direction_words(&updated).map_err(editor_error)?;
    wasm_info!("reloadWithEdits: {} edit(s) written", edits.len());

    with_editor(|state| {
        state.score_xml = Some(updated.clone());
        Ok(())
    })?;
    Ok(updated)
}

/// Rewrite `default-x`/`default-y` of matching directions in `xml`
#[wasm_bindgen(js_name = applyTenthsEdits)]
pub fn apply_tenths_edits_js(xml: String) -> ApiResult<String> {
    let edits = with_editor(|state| Ok(state.edits.clone()))?;
    apply_tenths_edits(&xml, &edits).map_err(editor_error)
}

#[wasm_bindgen(js_name = dedupeDirectionWords)]
pub fn dedupe_direction_words_js(xml: String) -> ApiResult<String> {
    dedupe_direction_words(&xml).map_err(editor_error)
}

// ============================================================================
// Selection
// ============================================================================

#[wasm_bindgen(js_name = selectElement)]
pub fn select_element(id: String) -> ApiResult<JsValue> {
    with_editor(|state| {
        let outcome = state.select(&id).map_err(editor_error)?;
        finish(state, outcome, "selectElement")
    })
}

#[wasm_bindgen(js_name = deselectAll)]
pub fn deselect_all() -> ApiResult<JsValue> {
    with_editor(|state| {
        let outcome = state.deselect_all();
        finish(state, outcome, "deselectAll")
    })
}

/// Rectangle selection in SVG coordinates
#[wasm_bindgen(js_name = selectInRect)]
pub fn select_in_rect(x: f64, y: f64, width: f64, height: f64, additive: bool) -> ApiResult<JsValue> {
    with_editor(|state| {
        let outcome = state.select_in_rect(Rect::new(x, y, width, height), additive);
        wasm_log!("selectInRect: {} element(s)", outcome.selection.group.len());
        finish(state, outcome, "selectInRect")
    })
}

#[wasm_bindgen(js_name = getSelection)]
pub fn get_selection() -> ApiResult<JsValue> {
    with_editor(|state| serialize(&state.selection_info(), "getSelection"))
}

// ============================================================================
// Manipulation
// ============================================================================

/// Move an element (or the group containing it) by a pointer delta
#[wasm_bindgen(js_name = dragElement)]
pub fn drag_element(id: String, dx: f64, dy: f64) -> ApiResult<JsValue> {
    with_editor(|state| {
        let outcome = state.drag(&id, dx, dy).map_err(editor_error)?;
        finish(state, outcome, "dragElement")
    })
}

#[wasm_bindgen(js_name = endDrag)]
pub fn end_drag(id: String) -> ApiResult<JsValue> {
    with_editor(|state| {
        let outcome = state.drag_end(&id).map_err(editor_error)?;
        finish(state, outcome, "endDrag")
    })
}

#[wasm_bindgen(js_name = moveGroup)]
pub fn move_group(dx: f64, dy: f64) -> ApiResult<JsValue> {
    with_editor(|state| {
        let outcome = state.move_group(dx, dy);
        finish(state, outcome, "moveGroup")
    })
}

#[wasm_bindgen(js_name = endGroupMove)]
pub fn end_group_move() -> ApiResult<JsValue> {
    with_editor(|state| {
        let outcome = state.end_group_move();
        finish(state, outcome, "endGroupMove")
    })
}

#[wasm_bindgen(js_name = scaleSelection)]
pub fn scale_selection(factor: f64) -> ApiResult<JsValue> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(JsValue::from_str(&format!("Invalid scale factor: {}", factor)));
    }
    with_editor(|state| {
        let outcome = state.scale(factor);
        finish(state, outcome, "scaleSelection")
    })
}

#[wasm_bindgen(js_name = deleteSelection)]
pub fn delete_selection() -> ApiResult<JsValue> {
    with_editor(|state| {
        let outcome = state.delete_selected();
        finish(state, outcome, "deleteSelection")
    })
}

// ============================================================================
// Clipboard and new annotations
// ============================================================================

#[wasm_bindgen(js_name = copySelection)]
pub fn copy_selection() -> ApiResult<JsValue> {
    with_editor(|state| {
        let copied = state.copy();
        wasm_log!("copySelection: {} item(s)", copied);
        serialize(&CopyResult { copied }, "copySelection")
    })
}

/// Paste the clipboard centred on a point (usually the viewport centre)
#[wasm_bindgen(js_name = pasteClipboard)]
pub fn paste_clipboard(center_x: f64, center_y: f64) -> ApiResult<JsValue> {
    with_editor(|state| {
        let outcome = state.paste(Point::new(center_x, center_y));
        finish(state, outcome, "pasteClipboard")
    })
}

#[wasm_bindgen(js_name = addTextAt)]
pub fn add_text_at(x: f64, y: f64, text: String) -> ApiResult<JsValue> {
    with_editor(|state| {
        let outcome = state.add_text_at(Point::new(x, y), &text);
        finish(state, outcome, "addTextAt")
    })
}

#[wasm_bindgen(js_name = addSymbol)]
pub fn add_symbol(symbol: String, center_x: f64, center_y: f64) -> ApiResult<JsValue> {
    with_editor(|state| {
        let outcome = state.add_symbol(&symbol, Point::new(center_x, center_y));
        finish(state, outcome, "addSymbol")
    })
}

#[wasm_bindgen(js_name = convertToOverlay)]
pub fn convert_to_overlay(id: String) -> ApiResult<JsValue> {
    with_editor(|state| {
        let outcome = state.convert_to_overlay(&id).map_err(editor_error)?;
        finish(state, outcome, "convertToOverlay")
    })
}

// ============================================================================
// In-place text editing
// ============================================================================

#[wasm_bindgen(js_name = beginTextEdit)]
pub fn begin_text_edit(id: String) -> ApiResult<JsValue> {
    with_editor(|state| {
        let (text, outcome) = state.begin_text_edit(&id).map_err(editor_error)?;
        serialize(&TextEditStart { text, outcome }, "beginTextEdit")
    })
}

#[wasm_bindgen(js_name = commitTextEdit)]
pub fn commit_text_edit(id: String, text: String) -> ApiResult<JsValue> {
    with_editor(|state| {
        let outcome = state.commit_text_edit(&id, &text).map_err(editor_error)?;
        finish(state, outcome, "commitTextEdit")
    })
}

#[wasm_bindgen(js_name = cancelTextEdit)]
pub fn cancel_text_edit(id: String) -> ApiResult<JsValue> {
    with_editor(|state| {
        let outcome = state.cancel_text_edit(&id);
        finish(state, outcome, "cancelTextEdit")
    })
}

// ============================================================================
// History
// ============================================================================

#[wasm_bindgen]
pub fn undo() -> ApiResult<JsValue> {
    with_editor(|state| {
        let outcome = state.undo();
        finish(state, outcome, "undo")
    })
}

#[wasm_bindgen]
pub fn redo() -> ApiResult<JsValue> {
    with_editor(|state| {
        let outcome = state.redo();
        finish(state, outcome, "redo")
    })
}

/// Patches re-applying every edit and deletion
#[wasm_bindgen(js_name = applyTransforms)]
pub fn apply_transforms() -> ApiResult<JsValue> {
    with_editor(|state| serialize(&state.apply_transforms(), "applyTransforms"))
}

// ============================================================================
// Measured geometry
// ============================================================================

/// Measure boxes in SVG coordinates, in score order
#[wasm_bindgen(js_name = setMeasureBoxes)]
pub fn set_measure_boxes(boxes_js: JsValue) -> ApiResult<()> {
    let boxes: Vec<Rect> = deserialize(boxes_js, "Invalid measure boxes")?;
    with_editor(|state| {
        state.set_measure_boxes(boxes);
        Ok(())
    })
}

/// Replace estimated element boxes with `getBBox()` results
#[wasm_bindgen(js_name = updateElementBounds)]
pub fn update_element_bounds(bounds_js: JsValue) -> ApiResult<usize> {
    let measured: Vec<MeasuredBounds> = deserialize(bounds_js, "Invalid element bounds")?;
    with_editor(|state| Ok(state.update_bounds(measured)))
}

#[wasm_bindgen(js_name = recalculatePositions)]
pub fn recalculate_positions() -> ApiResult<JsValue> {
    with_editor(|state| {
        let changed = state.recalculate_positions();
        if changed > 0 {
            persist(state);
        }
        serialize(&state.apply_transforms(), "recalculatePositions")
    })
}

// ============================================================================
// Persistence
// ============================================================================

#[wasm_bindgen(js_name = saveEdits)]
pub fn save_edits() -> ApiResult<()> {
    with_editor(|state| {
        let mut store = LocalStorage::open().map_err(editor_error)?;
        persistence::save(
            &mut store,
            &state.config.storage_key,
            &state.edits,
            &state.deletions,
            timestamp(),
        )
        .map_err(editor_error)
    })
}

/// Restore stored edits; `null` when nothing usable is stored
#[wasm_bindgen(js_name = loadEdits)]
pub fn load_edits() -> ApiResult<JsValue> {
    with_editor(|state| {
        let store = LocalStorage::open().map_err(editor_error)?;
        match persistence::load(&store, &state.config.storage_key) {
            Some(stored) => {
                let outcome = state.load_persisted(stored);
                serialize(&outcome, "loadEdits")
            }
            None => Ok(JsValue::NULL),
        }
    })
}

#[wasm_bindgen(js_name = clearSavedEdits)]
pub fn clear_saved_edits() -> ApiResult<()> {
    with_editor(|state| {
        let mut store = LocalStorage::open().map_err(editor_error)?;
        persistence::clear(&mut store, &state.config.storage_key).map_err(editor_error)
    })
}

// ============================================================================
// Export and validation
// ============================================================================

/// MusicXML of the current program, with a timestamped download name
#[wasm_bindgen(js_name = exportMusicXml)]
pub async fn export_musicxml() -> ApiResult<JsValue> {
    let (config, code) = with_editor(|state| Ok((state.config.clone(), state.code.clone())))?;
    let xml = network::export_xml(&config, &code).await.map_err(editor_error)?;
    let file_name = export_file_name(chrono::Local::now().naive_local());
    wasm_info!("exportMusicXml: {} ({} bytes)", file_name, xml.len());
    serialize(&ExportResult { file_name, xml }, "exportMusicXml")
}

/// Standard MIDI file of the current program
#[wasm_bindgen(js_name = exportMidi)]
pub async fn export_midi(include_chords: bool) -> ApiResult<js_sys::Uint8Array> {
    let (config, code) = with_editor(|state| Ok((state.config.clone(), state.code.clone())))?;
    let request = MidiExportRequest::new(code, include_chords);
    let bytes = network::export_midi(&config, &request).await.map_err(editor_error)?;
    Ok(js_sys::Uint8Array::from(bytes.as_slice()))
}

/// Timed notes of a MIDI file, for the page's synthesizer
#[wasm_bindgen(js_name = midiSchedule)]
pub fn midi_schedule(bytes: &[u8]) -> ApiResult<JsValue> {
    let schedule = playback::note_schedule(bytes).map_err(editor_error)?;
    wasm_log!(
        "midiSchedule: {} note(s), {:.2}s at {} bpm",
        schedule.notes.len(),
        schedule.end_time(),
        schedule.tempo_bpm
    );
    serialize(&schedule, "midiSchedule")
}

#[wasm_bindgen(js_name = midiNoteName)]
pub fn midi_note_name(midi: u8) -> String {
    playback::midi_note_name(midi)
}

#[wasm_bindgen(js_name = validateChord)]
pub async fn validate_chord(text: String) -> ApiResult<JsValue> {
    let config = current_config()?;
    let response = network::validate_chord(&config, &text).await.map_err(editor_error)?;
    serialize(&response, "validateChord")
}

#[wasm_bindgen(js_name = validateNote)]
pub async fn validate_note(text: String) -> ApiResult<JsValue> {
    let config = current_config()?;
    let response = network::validate_note(&config, &text).await.map_err(editor_error)?;
    serialize(&response, "validateNote")
}
