//! Program scanning
//!
//! Finds the statements of a music21 snippet that produce visible text
//! (chord symbols, text expressions, lyrics, titles) or carry a note id.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::element::ElementKind;

static CHORD_SYMBOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"harmony\.ChordSymbol\(["'](.+?)["']\)"#).unwrap());
static TEXT_EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"expressions\.TextExpression\(["'](.+?)["']\)"#).unwrap());
static LYRIC: Lazy<Regex> = Lazy::new(|| Regex::new(r#"lyric\s*=\s*["'](.+?)["']"#).unwrap());
static ID_ASSIGN: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\.id\s*=\s*["'](.+?)["']"#).unwrap());
static QUOTED_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"=\s*["'](.+?)["']"#).unwrap());
static MEASURE_NUMBER_KW: Lazy<Regex> = Lazy::new(|| Regex::new(r"Measure\(number=(\d+)\)").unwrap());
static MEASURE_NUMBER_POS: Lazy<Regex> = Lazy::new(|| Regex::new(r"Measure\((\d+)\)").unwrap());

/// How far back to look for the enclosing `stream.Measure(...)`
const MEASURE_LOOKBACK: usize = 20;

/// A statement in the program that yields a linkable element
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub kind: ElementKind,
    /// Literal text for text declarations, `None` for notes
    pub text: Option<String>,
    /// `element_N` for text declarations
    pub stable_id: Option<String>,
    /// Id assigned in the program (`n.id = "..."`), notes only
    pub note_id: Option<String>,
    /// 1-based measure the statement belongs to
    pub measure: usize,
    /// 0-based line index
    pub line: usize,
}

/// Measure number of the closest `Measure(...)` constructor at or above `line_index`
pub fn measure_for_line(lines: &[&str], line_index: usize) -> usize {
    if lines.is_empty() {
        return 1;
    }
    let start = line_index.saturating_sub(MEASURE_LOOKBACK);
    for i in (start..=line_index.min(lines.len() - 1)).rev() {
        let line = lines[i];
        if !line.contains("stream.Measure(") {
            continue;
        }
        let captured = MEASURE_NUMBER_KW
            .captures(line)
            .or_else(|| MEASURE_NUMBER_POS.captures(line))
            .and_then(|c| c[1].parse().ok());
        if let Some(number) = captured {
            return number;
        }
    }
    1
}

/// Scan a program for linkable declarations, in line order
///
/// Commented-out lines are skipped so that deleted elements don't claim ids.
pub fn scan_program(code: &str) -> Vec<Declaration> {
    let lines: Vec<&str> = code.split('\n').collect();
    let mut decls = Vec::new();
    let mut counter = 0usize;

    let mut push_text = |decls: &mut Vec<Declaration>, kind: ElementKind, text: &str, measure: usize, line: usize| {
        let stable_id = format!("element_{}", counter);
        counter += 1;
        log::debug!("linker: {:?} \"{}\" -> {} (line {})", kind, text, stable_id, line);
        decls.push(Declaration {
            kind,
            text: Some(text.to_string()),
            stable_id: Some(stable_id),
            note_id: None,
            measure,
            line,
        });
    };

    for (i, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        if line.starts_with('#') {
            continue;
        }

        if line.contains("harmony.ChordSymbol(") {
            if let Some(c) = CHORD_SYMBOL.captures(line) {
                let measure = measure_for_line(&lines, i);
                push_text(&mut decls, ElementKind::ChordSymbol, &c[1], measure, i);
            }
        }

        if line.contains("expressions.TextExpression(") {
            if let Some(c) = TEXT_EXPRESSION.captures(line) {
                let measure = measure_for_line(&lines, i);
                push_text(&mut decls, ElementKind::TextExpression, &c[1], measure, i);
            }
        }

        // Lyrics link to the `.lyric` line, not the note's constructor
        if line.contains(".lyric =") || line.contains(".lyric=") {
            if let Some(c) = LYRIC.captures(line) {
                let measure = measure_for_line(&lines, i);
                push_text(&mut decls, ElementKind::Lyric, &c[1], measure, i);
            }
        }

        if line.contains("note.Note(") && line.contains(".id =") {
            if let Some(c) = ID_ASSIGN.captures(line) {
                decls.push(Declaration {
                    kind: ElementKind::Note,
                    text: None,
                    stable_id: None,
                    note_id: Some(c[1].to_string()),
                    measure: measure_for_line(&lines, i),
                    line: i,
                });
            }
        }

        if line.contains(".title") && line.contains('=') {
            if let Some(c) = QUOTED_VALUE.captures(line) {
                push_text(&mut decls, ElementKind::Title, &c[1], 0, i);
            }
        }
    }

    log::info!("linker: scanned {} declaration(s)", decls.len());
    decls
}
