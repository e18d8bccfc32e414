//! Finding the statement behind a rendered element

use once_cell::sync::Lazy;
use regex::Regex;

use super::program::{has_literal, is_comment, Program};
use crate::config::EditorConfig;
use crate::models::element::SceneElement;

pub(crate) static CHORD_VAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)\s*=\s*harmony\.ChordSymbol").unwrap());
pub(crate) static TEXT_EXPRESSION_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)\s*=\s*expressions\.TextExpression").unwrap());
pub(crate) static METRONOME_VAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)\s*=\s*tempo\.MetronomeMark").unwrap());

/// How far above an `.id = ...` line the declaration may sit
const ID_LOOKBACK: usize = 10;

/// Statement kinds the synchronizer knows how to rewrite
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatementKind {
    ChordSymbol,
    TextExpression,
    Lyric,
    Title,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    pub line: usize,
    pub kind: StatementKind,
    /// Python variable holding the object, for chord symbols and text expressions
    pub var: Option<String>,
}

impl Location {
    fn new(line: usize, kind: StatementKind, var: Option<String>) -> Self {
        Self { line, kind, var }
    }
}

fn capture_var(re: &Regex, line: &str) -> Option<String> {
    re.captures(line).map(|c| c[1].to_string())
}

/// Classify a declaration line
fn declaration_at(line: &str, idx: usize) -> Option<Location> {
    if line.contains("harmony.ChordSymbol") {
        Some(Location::new(idx, StatementKind::ChordSymbol, capture_var(&CHORD_VAR, line)))
    } else if line.contains("expressions.TextExpression") {
        Some(Location::new(idx, StatementKind::TextExpression, capture_var(&TEXT_EXPRESSION_VAR, line)))
    } else if line.contains(".lyric") {
        Some(Location::new(idx, StatementKind::Lyric, None))
    } else if line.contains(".title") {
        Some(Location::new(idx, StatementKind::Title, None))
    } else {
        None
    }
}

/// Large text near the top of the page is taken to be the title
pub fn looks_like_title(element: &SceneElement, config: &EditorConfig) -> bool {
    element.bounds.y < config.title_max_y && element.font_size > config.title_min_font_size
}

fn locate_title(program: &Program) -> Option<Location> {
    program
        .lines()
        .position(|l| l.contains(".title") && l.contains('='))
        .map(|i| Location::new(i, StatementKind::Title, None))
}

fn locate_by_id(program: &Program, id: &str) -> Option<Location> {
    let needle = format!(".id = \"{}\"", id);
    for (i, line) in program.lines().enumerate() {
        if !line.contains(&needle) {
            continue;
        }
        let start = i.saturating_sub(ID_LOOKBACK);
        if let Some(found) = (start..=i).rev().find_map(|j| declaration_at(program.line(j), j)) {
            return Some(found);
        }
    }
    None
}

fn locate_by_content(program: &Program, text: &str) -> Option<Location> {
    let live = || program.lines().enumerate().filter(|(_, l)| !is_comment(l));

    if let Some((i, _)) = live().find(|(_, l)| l.contains(".title") && l.contains('=') && has_literal(l, text)) {
        return Some(Location::new(i, StatementKind::Title, None));
    }

    for (i, line) in live() {
        if (line.contains("ChordSymbol") || line.contains("TextExpression")) && has_literal(line, text) {
            return Some(if line.contains("ChordSymbol") {
                Location::new(i, StatementKind::ChordSymbol, capture_var(&CHORD_VAR, line))
            } else {
                Location::new(i, StatementKind::TextExpression, capture_var(&TEXT_EXPRESSION_VAR, line))
            });
        }
        if line.contains(&format!("lyric=\"{}\"", text)) || line.contains(&format!("lyric='{}'", text)) {
            return Some(Location::new(i, StatementKind::Lyric, None));
        }
    }
    None
}

/// Find the statement that produced `element`
///
/// Tried in order: the title heuristic, the element's `.id = "..."`
/// assignment, then the element's current text.
pub fn locate(program: &Program, element: &SceneElement, config: &EditorConfig) -> Option<Location> {
    if looks_like_title(element, config) {
        if let Some(found) = locate_title(program) {
            log::debug!("sync: \"{}\" treated as title", element.trimmed_text());
            return Some(found);
        }
    }
    locate_by_id(program, &element.id).or_else(|| locate_by_content(program, element.trimmed_text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::element::Rect;

    const CODE: &str = r#"s.metadata.title = "Autumn"
m = stream.Measure(number=1)
c1 = harmony.ChordSymbol("Am7")
c1.id = "c1"
m.insert(0.0, c1)
# old = expressions.TextExpression("rit.")
tx = expressions.TextExpression("rit.")
n = note.Note("A4"); n.lyric = "la""#;

    fn element(id: &str, text: &str) -> SceneElement {
        SceneElement::text(text, Rect::new(50.0, 300.0, 20.0, 10.0)).with_id(id)
    }

    #[test]
    fn finds_declaration_above_id() {
        let p = Program::parse(CODE);
        let loc = locate(&p, &element("c1", "Am7"), &EditorConfig::default()).unwrap();
        assert_eq!(loc, Location::new(2, StatementKind::ChordSymbol, Some("c1".into())));
    }

    #[test]
    fn content_fallback_skips_comments() {
        let p = Program::parse(CODE);
        let loc = locate(&p, &element("element_3", "rit."), &EditorConfig::default()).unwrap();
        assert_eq!(loc.line, 6);
        assert_eq!(loc.var.as_deref(), Some("tx"));
    }

    #[test]
    fn lyric_by_content() {
        let p = Program::parse(&CODE.replace("n.lyric = \"la\"", "n.lyric=\"la\""));
        let loc = locate(&p, &element("x", "la"), &EditorConfig::default()).unwrap();
        assert_eq!(loc.kind, StatementKind::Lyric);
        assert_eq!(loc.line, 7);
    }

    #[test]
    fn big_text_at_top_is_title() {
        let p = Program::parse(CODE);
        let title = SceneElement::text("Whatever", Rect::new(100.0, 40.0, 200.0, 30.0))
            .with_id("temp_Whatever_0")
            .with_font_size(28.0);
        let loc = locate(&p, &title, &EditorConfig::default()).unwrap();
        assert_eq!(loc.kind, StatementKind::Title);
        assert_eq!(loc.line, 0);
    }

    #[test]
    fn unknown_text_is_not_found() {
        let p = Program::parse(CODE);
        assert!(locate(&p, &element("nope", "Fine"), &EditorConfig::default()).is_none());
    }
}
