//! Scene extraction from the rendered SVG
//!
//! The score renderer runs in the page; its SVG markup is handed over as a
//! string and read with roxmltree. Boxes are estimated from the text
//! attributes, the glue replaces them with measured ones when it can.

use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use super::cleanup::staff_children;
use crate::error::Result;
use crate::models::element::{ElementKind, Layer, Rect, Scene, SceneElement, SHEET_ID, STAFF_ID};

const DEFAULT_FONT_SIZE: f64 = 20.0;
const DEFAULT_FONT_FAMILY: &str = "Times New Roman";
/// Average glyph advance relative to the font size
const GLYPH_WIDTH: f64 = 0.6;
/// Ascent relative to the font size; the `y` attribute is the baseline
const ASCENT: f64 = 0.8;

/// Everything the editor needs from one rendered SVG
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSvg {
    pub scene: Scene,
    /// Indexes of the root's element children that hold no text
    pub staff_children: Vec<usize>,
}

fn number(value: Option<&str>) -> Option<f64> {
    let raw = value?.trim();
    raw.trim_end_matches("px").trim().parse().ok()
}

fn text_content(node: Node) -> String {
    let spans: Vec<String> = node
        .children()
        .filter(|c| c.is_element() && c.tag_name().name() == "tspan")
        .map(|c| c.descendants().filter(|d| d.is_text()).filter_map(|d| d.text()).collect())
        .collect();
    if spans.is_empty() {
        node.descendants().filter(|d| d.is_text()).filter_map(|d| d.text()).collect()
    } else {
        spans.join("\n")
    }
}

/// Box of a text whose baseline starts at (`x`, `y`), before it is measured
pub fn estimated_text_box(text: &str, x: f64, y: f64, font_size: f64, anchor: Option<&str>) -> Rect {
    let longest = text.lines().map(|l| l.trim().chars().count()).max().unwrap_or(0);
    let line_count = text.lines().count().max(1);
    let width = longest as f64 * font_size * GLYPH_WIDTH;
    let left = match anchor {
        Some("middle") => x - width / 2.0,
        Some("end") => x - width,
        _ => x,
    };
    Rect::new(left, y - font_size * ASCENT, width, font_size * line_count as f64)
}

fn text_element(node: Node, index: usize) -> SceneElement {
    let text = text_content(node);
    let font_size = number(node.attribute("font-size")).unwrap_or(DEFAULT_FONT_SIZE);
    let x = number(node.attribute("x")).unwrap_or(0.0);
    let y = number(node.attribute("y")).unwrap_or(0.0);

    let bounds = estimated_text_box(&text, x, y, font_size, node.attribute("text-anchor"));

    let mut element = SceneElement::text(text, bounds).with_font_size(font_size);
    element.id = node.attribute("id").unwrap_or_default().to_string();
    element.font_family = node.attribute("font-family").unwrap_or(DEFAULT_FONT_FAMILY).to_string();
    element.fill = node.attribute("fill").map(str::to_string);
    element.source_index = Some(index);
    element
}

fn is_measure_group(node: &Node) -> bool {
    node.tag_name().name() == "g" && node.attribute("class").map_or(false, |c| c.contains("measure"))
}

fn has_barline(node: &Node) -> bool {
    node.descendants().any(|d| {
        (d.tag_name().name() == "path" && d.attribute("d").map_or(false, |p| p.contains('M')))
            || d.tag_name().name() == "line"
    })
}

/// 1-based measure of a note head
///
/// Renderers that tag measure groups are read directly; otherwise groups
/// holding barline-like paths are counted among the ancestors' siblings.
fn measure_of(node: Node, measure_groups: &[Node]) -> usize {
    if let Some(group) = node.ancestors().find(is_measure_group) {
        if let Some(pos) = measure_groups.iter().position(|g| *g == group) {
            return pos + 1;
        }
    }

    for parent in node.ancestors().skip(1).take_while(|a| a.tag_name().name() == "g") {
        let preceding = parent
            .prev_siblings()
            .skip(1)
            .filter(|s| s.tag_name().name() == "g" && has_barline(s))
            .count();
        if preceding > 0 && has_barline(&parent) {
            return preceding + 1;
        }
    }
    1
}

fn note_element(node: Node, index: usize, measure_groups: &[Node]) -> SceneElement {
    let cx = number(node.attribute("cx")).unwrap_or(0.0);
    let cy = number(node.attribute("cy")).unwrap_or(0.0);
    let rx = number(node.attribute("rx")).unwrap_or(0.0);
    let ry = number(node.attribute("ry")).unwrap_or(0.0);

    let mut element = SceneElement::text("", Rect::new(cx - rx, cy - ry, rx * 2.0, ry * 2.0)).with_kind(ElementKind::Note);
    element.id = node.attribute("id").unwrap_or_default().to_string();
    element.measure = Some(measure_of(node, measure_groups));
    element.source_index = Some(index);
    element
}

fn sheet_bounds(root: Node) -> Rect {
    let from_view_box = root.attribute("viewBox").and_then(|vb| {
        let parts: Vec<f64> = vb.split(|c: char| c == ',' || c.is_whitespace()).filter_map(|p| p.parse().ok()).collect();
        (parts.len() == 4).then(|| Rect::new(0.0, 0.0, parts[2], parts[3]))
    });
    match (number(root.attribute("width")), number(root.attribute("height"))) {
        (Some(w), Some(h)) => Rect::new(0.0, 0.0, w, h),
        _ => from_view_box.unwrap_or_default(),
    }
}

fn structural(id: &str, kind: ElementKind, bounds: Rect) -> SceneElement {
    let mut element = SceneElement::text("", bounds).with_id(id).with_kind(kind);
    element.layer = Layer::Rendered;
    element
}

/// Read texts, note heads and structure from rendered SVG markup
pub fn parse_svg(svg: &str) -> Result<ParsedSvg> {
    let doc = Document::parse(svg)?;
    let root = doc.root_element();

    let measure_groups: Vec<Node> = root.descendants().filter(is_measure_group).collect();
    let mut scene = Scene::new();

    let texts = root.descendants().filter(|n| n.is_element() && n.tag_name().name() == "text");
    for (i, node) in texts.enumerate() {
        scene.push(text_element(node, i));
    }

    let heads = root.descendants().filter(|n| n.is_element() && n.tag_name().name() == "ellipse");
    for (i, node) in heads.enumerate() {
        scene.push(note_element(node, i, &measure_groups));
    }

    let sheet = sheet_bounds(root);
    let staff = staff_children(root);
    if !staff.is_empty() {
        scene.push(structural(STAFF_ID, ElementKind::Staff, sheet));
    }
    scene.push(structural(SHEET_ID, ElementKind::Sheet, sheet));

    log::info!(
        "render: svg with {} element(s), {} measure group(s), {} staff child(ren)",
        scene.elements.len(),
        measure_groups.len(),
        staff.len()
    );
    Ok(ParsedSvg {
        scene,
        staff_children: staff,
    })
}
