//! Post-render cleanup of the rendered score

use roxmltree::Node;
use std::collections::HashSet;

use crate::models::element::{ElementKind, Layer, Scene};

fn contains_text(node: &Node) -> bool {
    node.descendants().any(|d| d.is_element() && d.tag_name().name() == "text")
}

/// Indexes (among element children of the SVG root) of the children that
/// hold no text; the glue moves them into the `staff-only` group
pub fn staff_children(root: Node) -> Vec<usize> {
    root.children()
        .filter(|c| c.is_element())
        .enumerate()
        .filter(|(_, c)| !contains_text(c))
        .map(|(i, _)| i)
        .collect()
}

/// Drop rendered texts whose content and position repeat an earlier one
///
/// Returns the source indexes of the removed texts, for the glue to delete.
pub fn remove_duplicate_texts(scene: &mut Scene) -> Vec<usize> {
    let mut seen = HashSet::new();
    let mut removed = Vec::new();
    scene.elements.retain(|e| {
        if e.layer != Layer::Rendered || e.kind != ElementKind::Text {
            return true;
        }
        let key = format!("{}-{}-{}", e.trimmed_text(), e.bounds.x, e.bounds.y);
        if seen.insert(key) {
            true
        } else {
            removed.extend(e.source_index);
            false
        }
    });
    log::info!("render: {} duplicate text(s) removed", removed.len());
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::element::{Rect, SceneElement};

    fn rendered(text: &str, x: f64, y: f64, index: usize) -> SceneElement {
        let mut e = SceneElement::text(text, Rect::new(x, y, 10.0, 10.0));
        e.source_index = Some(index);
        e
    }

    #[test]
    fn removes_same_text_at_same_place() {
        let mut scene = Scene::new();
        scene.push(rendered("Fine", 10.0, 20.0, 0));
        scene.push(rendered("Fine", 10.0, 20.0, 1));
        scene.push(rendered("Fine", 10.0, 40.0, 2));
        scene.push(rendered("Coda", 10.0, 20.0, 3));
        assert_eq!(remove_duplicate_texts(&mut scene), vec![1]);
        assert_eq!(scene.elements.len(), 3);
    }

    #[test]
    fn staff_children_skip_text_holders() {
        let doc = roxmltree::Document::parse("<svg><g><path/></g><g><text>x</text></g><rect/></svg>").unwrap();
        assert_eq!(staff_children(doc.root_element()), vec![0, 2]);
    }
}
