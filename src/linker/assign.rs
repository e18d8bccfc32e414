//! Stable id assignment
//!
//! Rendered texts carry no trace of the statement that produced them, so they
//! are matched back by literal content and declaration order. Note heads are
//! matched per measure, left to right.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::scan::Declaration;
use crate::models::element::{ElementKind, Layer, Scene, SceneElement};

/// What the linker knows about one linked element
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StableEntry {
    pub svg_id: String,
    pub code_line: usize,
    pub original_text: String,
    pub kind: ElementKind,
}

/// Stable id → entry; rebuilt on every render
pub type StableIdMap = BTreeMap<String, StableEntry>;

/// Element ids the renderer (or the backend line map) knows → program line
pub type LineMap = BTreeMap<String, usize>;

fn dashed(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join("-")
}

fn is_rendered_text(e: &SceneElement) -> bool {
    e.layer == Layer::Rendered && e.is_text() && !e.is_structural()
}

/// Give rendered texts and note heads the ids of their declarations
pub fn assign_stable_ids(scene: &mut Scene, decls: &[Declaration]) -> StableIdMap {
    let mut map = StableIdMap::new();
    let mut used: HashSet<&str> = HashSet::new();

    // Top to bottom; ties keep document order
    let mut order: Vec<usize> = (0..scene.elements.len())
        .filter(|&i| is_rendered_text(&scene.elements[i]))
        .collect();
    order.sort_by(|&a, &b| {
        scene.elements[a]
            .bounds
            .y
            .partial_cmp(&scene.elements[b].bounds.y)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut matched = 0usize;
    let mut unmatched = 0usize;
    for idx in order {
        let text = scene.elements[idx].trimmed_text().to_string();

        // Lyrics first: most rendered texts are lyrics and repeat a lot
        let candidate = decls
            .iter()
            .filter(|d| d.kind == ElementKind::Lyric)
            .chain(decls.iter().filter(|d| d.kind != ElementKind::Lyric))
            .find(|d| {
                d.text.as_deref() == Some(text.as_str())
                    && d.stable_id.as_deref().map_or(false, |id| !used.contains(id))
            });

        let element = &mut scene.elements[idx];
        match candidate {
            Some(decl) => {
                let stable_id = decl.stable_id.as_deref().unwrap_or_default();
                used.insert(stable_id);
                element.id = stable_id.to_string();
                element.kind = decl.kind;
                element.code_line = Some(decl.line);
                map.insert(
                    stable_id.to_string(),
                    StableEntry {
                        svg_id: stable_id.to_string(),
                        code_line: decl.line,
                        original_text: text,
                        kind: decl.kind,
                    },
                );
                matched += 1;
            }
            None => {
                element.id = format!("temp_{}_{}", dashed(&text), unmatched);
                unmatched += 1;
                log::debug!("linker: no declaration for \"{}\" -> {}", text, element.id);
            }
        }
    }
    log::info!("linker: {} text(s) linked, {} unmatched", matched, unmatched);

    let notes = assign_note_ids(scene, decls);
    log::info!("linker: {} note(s) linked", notes);
    map
}

/// Match note heads to `note.Note(...)` declarations measure by measure
fn assign_note_ids(scene: &mut Scene, decls: &[Declaration]) -> usize {
    let mut code_notes: BTreeMap<usize, Vec<&Declaration>> = BTreeMap::new();
    for decl in decls.iter().filter(|d| d.kind == ElementKind::Note) {
        code_notes.entry(decl.measure).or_default().push(decl);
    }

    let mut svg_notes: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, e) in scene.elements.iter().enumerate() {
        if e.kind == ElementKind::Note && e.layer == Layer::Rendered {
            svg_notes.entry(e.measure.unwrap_or(1)).or_default().push(i);
        }
    }

    let mut linked = 0;
    for (measure, code) in code_notes {
        let Some(heads) = svg_notes.get_mut(&measure) else {
            continue;
        };
        heads.sort_by(|&a, &b| {
            scene.elements[a]
                .bounds
                .x
                .partial_cmp(&scene.elements[b].bounds.x)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for (&idx, decl) in heads.iter().zip(code.iter()) {
            let element = &mut scene.elements[idx];
            if let Some(id) = &decl.note_id {
                element.id = id.clone();
            }
            element.code_line = Some(decl.line);
            linked += 1;
        }
    }
    linked
}

/// Attach program lines from the render service's id → line header
pub fn link_from_backend(scene: &mut Scene, line_map: &LineMap) -> usize {
    let mut linked = 0;
    for element in scene.elements.iter_mut().filter(|e| e.layer == Layer::Rendered) {
        if let Some(&line) = line_map.get(&element.id) {
            element.code_line = Some(line);
            linked += 1;
        }
    }
    log::info!("linker: {}/{} backend id(s) linked", linked, line_map.len());
    linked
}

/// Give every element still lacking an id one derived from its text
///
/// Ids already present are kept.
pub fn assign_fallback_ids(scene: &mut Scene) {
    for i in 0..scene.elements.len() {
        if !scene.elements[i].id.trim().is_empty() {
            continue;
        }
        let text = scene.elements[i].trimmed_text().to_string();
        let count = scene.count_ids_with_prefix(&text);
        let id = format!("{}-{}", dashed(&text), count);
        log::debug!("linker: fallback id \"{}\"", id);
        scene.elements[i].id = id;
    }
}

/// Link the n-th note head (left to right) to the n-th `note.Note(` line
///
/// Used when the program doesn't assign note ids.
pub fn map_notes_globally(scene: &mut Scene, code: &str) -> usize {
    let note_lines: Vec<usize> = code
        .split('\n')
        .enumerate()
        .filter(|(_, l)| l.contains("note.Note("))
        .map(|(i, _)| i)
        .collect();

    let mut heads: Vec<usize> = scene
        .elements
        .iter()
        .enumerate()
        .filter(|(_, e)| e.kind == ElementKind::Note && e.layer == Layer::Rendered)
        .map(|(i, _)| i)
        .collect();
    heads.sort_by(|&a, &b| {
        scene.elements[a]
            .bounds
            .x
            .partial_cmp(&scene.elements[b].bounds.x)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut matched = 0;
    for (n, (&idx, &line)) in heads.iter().zip(note_lines.iter()).enumerate() {
        let element = &mut scene.elements[idx];
        element.id = format!("note_{}", n);
        element.code_line = Some(line);
        matched += 1;
    }
    log::info!("linker: {} note(s) mapped globally", matched);
    matched
}
