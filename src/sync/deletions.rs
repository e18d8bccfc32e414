//! Commenting out deleted elements

use super::locate::{CHORD_VAR, METRONOME_VAR, TEXT_EXPRESSION_VAR};
use super::program::{has_literal, is_comment, Program};
use crate::models::edit::EditMap;
use crate::models::element::Scene;

/// How far above an `.id = ...` line the declaration may sit
const ID_LOOKBACK: usize = 5;

/// Comment the declaration at `start` and the following statements that
/// use `var`, up to the first unrelated statement
fn comment_block(program: &mut Program, start: usize, var: &str, include_append: bool) -> bool {
    let member_prefix = format!("{}.", var);
    let mut changed = false;
    for k in start..program.len() {
        let line = program.line(k).trim().to_string();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let uses_var = k == start
            || line.starts_with(&member_prefix)
            || (line.contains(".insert") && line.contains(var))
            || (include_append && line.contains(".append") && line.contains(var));
        if uses_var {
            changed |= program.comment_out(k);
        } else if !line.contains(var) {
            break;
        }
    }
    changed
}

fn by_id(program: &mut Program, id: &str) -> bool {
    let spaced = format!(".id = \"{}\"", id);
    let tight = format!(".id=\"{}\"", id);

    let Some(i) = (0..program.len()).find(|&i| {
        let line = program.line(i);
        !is_comment(line) && (line.contains(&spaced) || line.contains(&tight))
    }) else {
        return false;
    };

    let declaration = (i.saturating_sub(ID_LOOKBACK)..=i).rev().find_map(|j| {
        let line = program.line(j);
        if line.contains("TextExpression") {
            Some((TEXT_EXPRESSION_VAR.captures(line)?[1].to_string(), "TextExpression"))
        } else if line.contains("ChordSymbol") {
            Some((CHORD_VAR.captures(line)?[1].to_string(), "ChordSymbol"))
        } else if line.contains("MetronomeMark") {
            Some((METRONOME_VAR.captures(line)?[1].to_string(), "MetronomeMark"))
        } else {
            None
        }
    });
    let Some((var, kind)) = declaration else {
        return false;
    };

    let Some(start) = (0..=i).find(|&idx| {
        let line = program.line(idx);
        line.contains(var.as_str()) && line.contains(kind)
    }) else {
        return false;
    };
    log::debug!("sync: deleting {} {} declared at line {}", kind, var, start);
    comment_block(program, start, &var, true)
}

fn by_text_expression(program: &mut Program, text: &str) -> bool {
    let found = (0..program.len()).find(|&i| {
        let line = program.line(i);
        !is_comment(line) && line.contains("TextExpression") && has_literal(line, text)
    });
    let Some(i) = found else {
        return false;
    };
    let Some(var) = TEXT_EXPRESSION_VAR.captures(program.line(i)).map(|c| c[1].to_string()) else {
        return false;
    };
    comment_block(program, i, &var, false)
}

fn by_lyric(program: &mut Program, text: &str) -> bool {
    let double = format!("lyric=\"{}\"", text);
    let single = format!("lyric='{}'", text);
    let found = (0..program.len()).find(|&i| {
        let line = program.line(i);
        !is_comment(line) && (line.contains(&double) || line.contains(&single))
    });
    match found {
        Some(i) => program.comment_out(i),
        None => false,
    }
}

/// Text before the first `-` of a generated id, e.g. `rit.-2` → `rit.`
fn text_from_id(id: &str) -> Option<String> {
    let head = id.split('-').next().unwrap_or_default();
    (!head.is_empty()).then(|| head.to_string())
}

/// Comment out the statements behind every deleted element
///
/// Each id is looked up by its `.id = "..."` assignment first, then as a
/// text expression by content, then as a lyric. Returns how many ids led to
/// a change.
pub fn comment_out_deleted<'a>(
    program: &mut Program,
    ids: impl IntoIterator<Item = &'a String>,
    scene: &Scene,
    edits: &EditMap,
) -> usize {
    let mut handled = 0;
    for id in ids {
        let shown = scene.get(id).map(|e| e.trimmed_text().to_string());
        let edited = edits
            .get(id)
            .and_then(|e| e.text_content.as_ref())
            .map(|t| t.trim().to_string());

        let mut changed = by_id(program, id);
        if !changed {
            if let Some(text) = shown.clone().or_else(|| edited.clone()).or_else(|| text_from_id(id)) {
                changed = by_text_expression(program, &text);
            }
        }
        if !changed {
            // Edited lyrics are searched by their new text
            if let Some(text) = edited.or(shown).or_else(|| text_from_id(id)) {
                changed = by_lyric(program, &text);
            }
        }

        if changed {
            handled += 1;
        } else {
            log::warn!("sync: no statement commented for deleted \"{}\"", id);
        }
    }
    handled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::edit::EditRecord;
    use crate::models::element::{Rect, SceneElement};

    fn delete(code: &str, id: &str, scene: &Scene, edits: &EditMap) -> (String, usize) {
        let mut p = Program::parse(code);
        let ids = vec![id.to_string()];
        let n = comment_out_deleted(&mut p, &ids, scene, edits);
        (p.to_string(), n)
    }

    #[test]
    fn comments_declaration_and_uses() {
        let code = "m = stream.Measure(number=1)\n\
                    c1 = harmony.ChordSymbol(\"C\")\n\
                    c1.id = \"c1\"\n\
                    c1.style.absoluteX = 25\n\
                    m.insert(0.0, c1)\n\
                    m.append(note.Note('C4'))";
        let (out, n) = delete(code, "c1", &Scene::new(), &EditMap::new());
        assert_eq!(n, 1);
        assert_eq!(
            out,
            "m = stream.Measure(number=1)\n\
             # c1 = harmony.ChordSymbol(\"C\")\n\
             # c1.id = \"c1\"\n\
             # c1.style.absoluteX = 25\n\
             # m.insert(0.0, c1)\n\
             m.append(note.Note('C4'))"
        );
    }

    #[test]
    fn metronome_mark_by_tight_id() {
        let code = "mm = tempo.MetronomeMark(number=90)\nmm.id=\"mm\"\nm.insert(0, mm)\nx = 1";
        let (out, _) = delete(code, "mm", &Scene::new(), &EditMap::new());
        assert_eq!(out, "# mm = tempo.MetronomeMark(number=90)\n# mm.id=\"mm\"\n# m.insert(0, mm)\nx = 1");
    }

    #[test]
    fn text_expression_found_by_scene_text() {
        let code = "t = expressions.TextExpression('Fine')\nm.insert(2.0, t)\nm.append(x)";
        let mut scene = Scene::new();
        scene.push(SceneElement::text("Fine", Rect::default()).with_id("element_0"));
        let (out, n) = delete(code, "element_0", &scene, &EditMap::new());
        assert_eq!(n, 1);
        assert_eq!(out, "# t = expressions.TextExpression('Fine')\n# m.insert(2.0, t)\nm.append(x)");
    }

    #[test]
    fn edited_lyric_found_by_new_text() {
        let code = "n1 = note.Note('C4', lyric=\"yu\")";
        let mut scene = Scene::new();
        scene.push(SceneElement::text("1", Rect::default()).with_id("element_0"));
        let mut edits = EditMap::new();
        let mut edit = EditRecord::default();
        edit.text_content = Some("yu".into());
        edits.insert("element_0".into(), edit);
        let (out, n) = delete(code, "element_0", &scene, &edits);
        assert_eq!(n, 1);
        assert_eq!(out, "# n1 = note.Note('C4', lyric=\"yu\")");
    }

    #[test]
    fn id_prefix_is_last_resort() {
        let code = "n = note.Note('E4'); n.lyric = 'la'\nz = 2";
        let (out, n) = delete(code, "la-0", &Scene::new(), &EditMap::new());
        assert_eq!(n, 0);
        assert_eq!(out, code);

        let code = "n = note.Note('E4', lyric='la')";
        let (out, n) = delete(code, "la-0", &Scene::new(), &EditMap::new());
        assert_eq!(n, 1);
        assert!(out.starts_with("# "));
    }
}
