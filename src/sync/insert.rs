//! Program code for annotations created in the editor

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::EditorConfig;
use crate::models::edit::{px_to_tenths, EditRecord};
use crate::models::element::SceneElement;

static NON_IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").unwrap());

/// Python variable for a new annotation, e.g. `"a tempo"` → `a_tempo_17`
pub fn variable_name(text: &str, suffix: u64) -> String {
    let underscored = text.split_whitespace().collect::<Vec<_>>().join("_");
    let base = NON_IDENT.replace_all(&underscored, "").to_lowercase();
    if base.starts_with(|c: char| c.is_ascii_digit()) {
        format!("text_{}_{}", base, suffix)
    } else {
        format!("{}_{}", base, suffix)
    }
}

/// The statements that declare `element` as a text expression in the first measure
pub fn element_block(element: &SceneElement, edit: Option<&EditRecord>, suffix: u64, config: &EditorConfig) -> String {
    let text = element.trimmed_text();
    let var = variable_name(text, suffix);
    let placement = if element.bounds.y < config.placement_threshold_y { "above" } else { "below" };

    let mut block = String::from("\n# Added in the editor\n");
    block.push_str(&format!("{} = expressions.TextExpression(\"{}\")\n", var, text));
    block.push_str(&format!("{}.placement = '{}'\n", var, placement));
    block.push_str(&format!("{}.id = \"{}\"\n", var, element.id));

    if let Some(edit) = edit.filter(|e| e.x != 0.0 || e.y != 0.0) {
        let x_tenths = px_to_tenths(edit.x, config.tenths_per_px);
        let y_tenths = px_to_tenths(edit.y, config.tenths_per_px);
        if x_tenths != 0 {
            block.push_str(&format!("{}.style.absoluteX = {}\n", var, x_tenths));
        }
        if y_tenths != 0 {
            block.push_str(&format!("{}.style.absoluteY = {}\n", var, y_tenths));
        }
    }

    block.push_str(&format!("m.insert(0.0, {})\n", var));
    block
}

/// Insert the declaration of a new annotation into `code`
///
/// The block goes before the `score = ...` assignment when there is one,
/// otherwise at the end.
pub fn insert_new_element(
    code: &str,
    element: &SceneElement,
    edit: Option<&EditRecord>,
    suffix: u64,
    config: &EditorConfig,
) -> String {
    let block = element_block(element, edit, suffix, config);
    log::info!("sync: inserted declaration for \"{}\" ({})", element.trimmed_text(), element.id);

    let anchor = code.find("score = s").or_else(|| code.find("score = "));
    match anchor {
        Some(at) => format!("{}{}\n{}", &code[..at], block, &code[at..]),
        None => format!("{}{}", code, block),
    }
}
