//! Line buffer over the score program

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static LEADING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)").unwrap());

/// The program text split into lines
///
/// Splitting and joining on `\n` is lossless, so an untouched program
/// round-trips byte for byte.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    lines: Vec<String>,
}

impl Program {
    pub fn parse(code: &str) -> Self {
        Self {
            lines: code.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    pub fn line(&self, idx: usize) -> &str {
        self.lines.get(idx).map(String::as_str).unwrap_or("")
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn set_line(&mut self, idx: usize, line: String) {
        if let Some(slot) = self.lines.get_mut(idx) {
            *slot = line;
        }
    }

    pub fn remove_line(&mut self, idx: usize) {
        if idx < self.lines.len() {
            self.lines.remove(idx);
        }
    }

    /// Insert `new_lines` so that the first of them ends up at `idx`
    pub fn insert_lines(&mut self, idx: usize, new_lines: Vec<String>) {
        let at = idx.min(self.lines.len());
        self.lines.splice(at..at, new_lines);
    }

    /// `# `-prefix a line unless it is already a comment
    pub fn comment_out(&mut self, idx: usize) -> bool {
        match self.lines.get_mut(idx) {
            Some(line) if !is_comment(line) => {
                line.insert_str(0, "# ");
                true
            }
            _ => false,
        }
    }

    pub fn is_comment_line(&self, idx: usize) -> bool {
        is_comment(self.line(idx))
    }

    /// Leading whitespace of a line
    pub fn indent_of(&self, idx: usize) -> String {
        LEADING_WS
            .captures(self.line(idx))
            .map(|c| c[1].to_string())
            .unwrap_or_default()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Whether `line` holds `text` as a single- or double-quoted literal
pub fn has_literal(line: &str, text: &str) -> bool {
    line.contains(&format!("\"{}\"", text)) || line.contains(&format!("'{}'", text))
}
