//! Scene model
//!
//! The scene is the editor's view of what is on screen: the text elements of
//! the rendered score, the staff group, the whole sheet, and the annotations
//! the user added on the transparent overlay layer. Geometry is the element's
//! untransformed box in container pixels; edit records supply the transform.

use serde::{Deserialize, Serialize};

/// Id of the whole rendered score SVG
pub const SHEET_ID: &str = "sheet-music-svg";

/// Id of the group holding every non-text child of the score SVG
pub const STAFF_ID: &str = "staff-only";

/// Prefix of rendered texts recreated on the overlay layer
pub const OVERLAY_PREFIX: &str = "overlay-";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    ChordSymbol,
    TextExpression,
    Lyric,
    Title,
    Note,
    Symbol,
    /// Text with no known origin in the program
    Text,
    Staff,
    Sheet,
}

impl ElementKind {
    pub fn is_text(self) -> bool {
        !matches!(self, ElementKind::Note | ElementKind::Staff | ElementKind::Sheet)
    }

    /// Value of the `data-type` attribute for annotation elements
    pub fn data_type(self) -> &'static str {
        match self {
            ElementKind::Symbol => "symbol",
            _ => "text",
        }
    }

    pub fn from_data_type(data_type: &str) -> Self {
        match data_type {
            "symbol" => ElementKind::Symbol,
            _ => ElementKind::Text,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Layer {
    /// Part of the renderer's SVG
    Rendered,
    /// On the editor's annotation SVG
    Annotation,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned box in container pixels
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Box spanned by two drag corners in any order
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Touching edges count as intersecting
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.right() < other.x
            || self.x > other.right()
            || self.bottom() < other.y
            || self.y > other.bottom())
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(x, y, self.right().max(other.right()) - x, self.bottom().max(other.bottom()) - y)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    pub fn padded(&self, pad: f64) -> Rect {
        Rect::new(self.x - pad, self.y - pad, self.width + pad * 2.0, self.height + pad * 2.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SceneElement {
    /// Empty until the linker assigns one
    pub id: String,
    pub kind: ElementKind,
    /// Text content; multi-line texts are joined with `\n`
    pub text: String,
    pub bounds: Rect,
    pub font_size: f64,
    pub font_family: String,
    pub fill: Option<String>,
    /// 0-based program line the element came from
    pub code_line: Option<usize>,
    pub layer: Layer,
    pub hidden: bool,
    /// 1-based measure for note heads
    pub measure: Option<usize>,
    /// Document-order index among the SVG's `<text>` (or `<ellipse>`) nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_index: Option<usize>,
}

impl SceneElement {
    pub fn text(text: impl Into<String>, bounds: Rect) -> Self {
        Self {
            id: String::new(),
            kind: ElementKind::Text,
            text: text.into(),
            bounds,
            font_size: 20.0,
            font_family: "Times New Roman".to_string(),
            fill: None,
            code_line: None,
            layer: Layer::Rendered,
            hidden: false,
            measure: None,
            source_index: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_kind(mut self, kind: ElementKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    pub fn on_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    /// The sheet and staff group can be moved and scaled but not deleted or copied
    pub fn is_structural(&self) -> bool {
        matches!(self.kind, ElementKind::Sheet | ElementKind::Staff)
    }

    pub fn is_text(&self) -> bool {
        self.kind.is_text()
    }
}

/// Ordered collection of everything the editor can select
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub elements: Vec<SceneElement>,
    /// Boxes of the measure groups, in measure order
    #[serde(default)]
    pub measure_boxes: Vec<Rect>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: SceneElement) {
        self.elements.push(element);
    }

    pub fn get(&self, id: &str) -> Option<&SceneElement> {
        if id.is_empty() {
            return None;
        }
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut SceneElement> {
        if id.is_empty() {
            return None;
        }
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn remove(&mut self, id: &str) -> Option<SceneElement> {
        let idx = self.elements.iter().position(|e| e.id == id)?;
        Some(self.elements.remove(idx))
    }

    /// Text elements on both layers
    pub fn text_elements(&self) -> impl Iterator<Item = &SceneElement> {
        self.elements.iter().filter(|e| e.is_text())
    }

    /// Number of ids starting with `prefix`, the page's `[id^=…]` count
    pub fn count_ids_with_prefix(&self, prefix: &str) -> usize {
        self.elements
            .iter()
            .filter(|e| !e.id.is_empty() && e.id.starts_with(prefix))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_intersection_includes_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(10.0, 10.0, 5.0, 5.0)));
        assert!(!a.intersects(&Rect::new(10.1, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn rect_from_corners_normalizes() {
        let r = Rect::from_corners(Point::new(30.0, 5.0), Point::new(10.0, 25.0));
        assert_eq!(r, Rect::new(10.0, 5.0, 20.0, 20.0));
    }

    #[test]
    fn union_and_padding() {
        let u = Rect::new(0.0, 0.0, 10.0, 10.0).union(&Rect::new(20.0, 5.0, 10.0, 10.0));
        assert_eq!(u, Rect::new(0.0, 0.0, 30.0, 15.0));
        assert_eq!(u.padded(10.0), Rect::new(-10.0, -10.0, 50.0, 35.0));
    }

    #[test]
    fn prefix_count_ignores_unassigned() {
        let mut scene = Scene::new();
        scene.push(SceneElement::text("C", Rect::default()).with_id("C-0"));
        scene.push(SceneElement::text("C", Rect::default()).with_id("C-1"));
        scene.push(SceneElement::text("C", Rect::default()));
        assert_eq!(scene.count_ids_with_prefix("C"), 2);
        assert!(scene.get("").is_none());
    }
}
