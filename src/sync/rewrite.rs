//! Writing visual edits back into the program

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

use super::locate::{locate, Location, StatementKind};
use super::program::{has_literal, Program};
use crate::config::EditorConfig;
use crate::models::edit::{px_to_tenths, EditRecord};
use crate::models::element::SceneElement;

static FIRST_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["'](.+?)["']"#).unwrap());
static LYRIC_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"lyric\s*=\s*["'](.+?)["']"#).unwrap());
static LYRIC_ASSIGN: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(lyric\s*=\s*['"][^'"]*['"])"#).unwrap());
static FONT_SIZE_ARG: Lazy<Regex> = Lazy::new(|| Regex::new(r#"fontSize\s*=\s*['"]?\d+%?['"]?"#).unwrap());
static TITLE_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"=\s*["'](.*)["']"#).unwrap());
static TITLE_ASSIGN: Lazy<Regex> = Lazy::new(|| Regex::new(r#"=\s*["'].*["']"#).unwrap());

/// Window after the declaration searched for the variable's last statement
const STYLE_WINDOW: usize = 15;

/// Rewrite the statement behind `element` to match its edit record
///
/// Elements that were never linked to a program line are skipped. Returns
/// whether the program changed.
pub fn update_element(program: &mut Program, element: &SceneElement, edit: &EditRecord, config: &EditorConfig) -> bool {
    if element.code_line.is_none() {
        log::debug!("sync: \"{}\" has no program line, skipped", element.id);
        return false;
    }

    let Some(location) = locate(program, element, config) else {
        log::warn!("sync: no statement found for \"{}\" ({})", element.trimmed_text(), element.id);
        return false;
    };
    log::debug!("sync: {:?} at line {} for {}", location.kind, location.line, element.id);

    let before = program.to_string();
    match location {
        Location { kind: StatementKind::Lyric, line, .. } => update_lyric(program, line, edit),
        Location { kind: StatementKind::Title, line, .. } => update_title(program, line, edit),
        Location { line, var: Some(var), .. } => update_generic(program, line, &var, edit, config),
        Location { .. } => {}
    }
    program.to_string() != before
}

/// Chord symbols and text expressions: new literal plus `style.absoluteX/Y`
/// and `style.fontSize` statements after the variable's last statement
fn update_generic(program: &mut Program, start: usize, var: &str, edit: &EditRecord, config: &EditorConfig) {
    let indent = program.indent_of(start);

    if let Some(text) = &edit.text_content {
        let line = program.line(start);
        if !has_literal(line, text) {
            let replaced = FIRST_LITERAL.replace(line, NoExpand(&format!("\"{}\"", text))).into_owned();
            if replaced == line {
                log::warn!("sync: could not replace text on line {}", start);
            }
            program.set_line(start, replaced);
        }
    }

    // Drop style statements from an earlier sync
    let style_prefix = format!("{}.style.", var);
    let mut i = start + 1;
    while i < program.len() {
        let line = program.line(i).trim();
        if line.starts_with(&style_prefix) {
            program.remove_line(i);
            continue;
        }
        if !line.is_empty() && !line.contains(var) {
            break;
        }
        i += 1;
    }

    let member_prefix = format!("{}.", var);
    let append_call = format!(".append({})", var);
    let mut insert_at = start + 1;
    for j in (start + 1)..program.len().min(start + STYLE_WINDOW) {
        let line = program.line(j).trim();
        if line.starts_with(&member_prefix)
            || (line.contains(".insert(") && line.contains(var))
            || line.contains(&append_call)
        {
            insert_at = j + 1;
            continue;
        }
        if !line.is_empty() && !line.starts_with('#') && !line.contains(var) {
            break;
        }
    }

    let x_tenths = px_to_tenths(edit.x, config.tenths_per_px);
    let y_tenths = px_to_tenths(edit.y, config.tenths_per_px);
    let mut style = Vec::new();
    if x_tenths != 0 {
        style.push(format!("{}{}.style.absoluteX = {}", indent, var, x_tenths));
    }
    if y_tenths != 0 {
        style.push(format!("{}{}.style.absoluteY = {}", indent, var, y_tenths));
    }
    if edit.is_scaled() {
        style.push(format!("{}{}.style.fontSize = '{}%'", indent, var, edit.scale_percent()));
    }
    if !style.is_empty() {
        log::debug!("sync: {} style line(s) for {} at {}", style.len(), var, insert_at);
        program.insert_lines(insert_at, style);
    }
}

fn update_lyric(program: &mut Program, idx: usize, edit: &EditRecord) {
    let mut line = program.line(idx).to_string();

    if let Some(text) = &edit.text_content {
        let current = LYRIC_VALUE
            .captures(&line)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| text.clone());
        if *text != current {
            line = line.replacen(&format!("lyric=\"{}\"", current), &format!("lyric=\"{}\"", text), 1);
            line = line.replacen(&format!("lyric='{}'", current), &format!("lyric='{}'", text), 1);
        }
    }

    if edit.is_scaled() {
        let size = format!("fontSize=\"{}%\"", edit.scale_percent());
        if line.contains("fontSize") {
            line = FONT_SIZE_ARG.replace(&line, NoExpand(&size)).into_owned();
        } else if let Some(assign) = LYRIC_ASSIGN.captures(&line).map(|c| c[1].to_string()) {
            line = line.replacen(&assign, &format!("{}, {}", assign, size), 1);
        }
    }

    program.set_line(idx, line);
}

fn update_title(program: &mut Program, idx: usize, edit: &EditRecord) {
    let Some(text) = &edit.text_content else {
        return;
    };
    let line = program.line(idx);
    let current = TITLE_VALUE.captures(line).map(|c| c[1].to_string()).unwrap_or_default();
    if *text != current {
        let replaced = TITLE_ASSIGN.replace(line, NoExpand(&format!("= \"{}\"", text))).into_owned();
        program.set_line(idx, replaced);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::element::Rect;

    fn linked(id: &str, text: &str, line: usize) -> SceneElement {
        let mut e = SceneElement::text(text, Rect::new(50.0, 300.0, 20.0, 10.0)).with_id(id);
        e.code_line = Some(line);
        e
    }

    fn moved(x: f64, y: f64) -> EditRecord {
        EditRecord::at(x, y, 2.5)
    }

    #[test]
    fn chord_symbol_gets_absolute_position() {
        let code = "c1 = harmony.ChordSymbol(\"Cm7\")\nc1.id = \"c1\"\nm.insert(0.0, c1)\nn = note.Note('C4')";
        let mut p = Program::parse(code);
        let changed = update_element(&mut p, &linked("c1", "Cm7", 0), &moved(10.0, -4.0), &EditorConfig::default());
        assert!(changed);
        assert_eq!(
            p.to_string(),
            "c1 = harmony.ChordSymbol(\"Cm7\")\nc1.id = \"c1\"\nm.insert(0.0, c1)\n\
             c1.style.absoluteX = 25\nc1.style.absoluteY = -10\nn = note.Note('C4')"
        );
    }

    #[test]
    fn second_sync_replaces_style_lines() {
        let code = "    tx = expressions.TextExpression(\"rit.\")\n    tx.id = \"tx\"\n    m.insert(0.0, tx)";
        let mut p = Program::parse(code);
        let cfg = EditorConfig::default();
        let el = linked("tx", "rit.", 0);
        update_element(&mut p, &el, &moved(4.0, 0.0), &cfg);
        let mut edit = moved(8.0, 0.0);
        edit.rescale(1.5);
        edit.text_content = Some("a tempo".into());
        update_element(&mut p, &el, &edit, &cfg);
        assert_eq!(
            p.to_string(),
            "    tx = expressions.TextExpression(\"a tempo\")\n    tx.id = \"tx\"\n    m.insert(0.0, tx)\n\
             \x20   tx.style.absoluteX = 20\n    tx.style.fontSize = '150%'"
        );
    }

    #[test]
    fn unlinked_elements_are_skipped() {
        let mut p = Program::parse("c = harmony.ChordSymbol('C')");
        let el = SceneElement::text("C", Rect::default()).with_id("C-0");
        assert!(!update_element(&mut p, &el, &moved(10.0, 10.0), &EditorConfig::default()));
    }

    #[test]
    fn lyric_text_and_size() {
        let mut p = Program::parse("n1 = note.Note('C4', lyric=\"do\")");
        let mut edit = EditRecord::default();
        edit.text_content = Some("re".into());
        edit.rescale(1.2);
        let el = linked("element_0", "do", 0);
        update_element(&mut p, &el, &edit, &EditorConfig::default());
        assert_eq!(p.to_string(), "n1 = note.Note('C4', lyric=\"re\", fontSize=\"120%\")");

        edit.rescale(1.25);
        let el = linked("element_0", "re", 0);
        update_element(&mut p, &el, &edit, &EditorConfig::default());
        assert_eq!(p.to_string(), "n1 = note.Note('C4', lyric=\"re\", fontSize=\"150%\")");
    }

    #[test]
    fn title_value_replaced() {
        let mut p = Program::parse("s.metadata.title = 'Old'");
        let mut edit = EditRecord::default();
        edit.text_content = Some("New Title".into());
        let el = linked("element_0", "Old", 0);
        update_element(&mut p, &el, &edit, &EditorConfig::default());
        assert_eq!(p.to_string(), "s.metadata.title = \"New Title\"");
    }
}
