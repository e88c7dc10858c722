//! Hit testing: point → element lookup.
//!
//! Reverse-walks the tree (front-to-back) to find which element is at a
//! given position in root coordinates. Hosts that get pointer targets from
//! their own view layer don't need this.

use crate::geometry::{Bounds, Point, includes};
use crate::id::ElementId;
use crate::model::{ElementKind, SceneGraph};
use petgraph::graph::NodeIndex;

/// Find the topmost element at `point`. Returns the root id when nothing
/// else is hit, since the root covers the whole canvas.
pub fn hit_test(graph: &SceneGraph, point: Point) -> ElementId {
    hit_test_node(graph, graph.root(), point).unwrap_or(graph.root_element().id())
}

fn hit_test_node(graph: &SceneGraph, idx: NodeIndex, point: Point) -> Option<ElementId> {
    // Children are painted after their parent, so the last child is topmost.
    for &child in graph.children(idx).iter().rev() {
        if let Some(hit) = hit_test_node(graph, child, point) {
            return Some(hit);
        }
    }

    let element = graph.element(idx)?;
    if idx == graph.root() {
        return None;
    }
    let bounds = match &element.kind {
        // Routing points have no size; give them a small grab area.
        ElementKind::RoutingPoint { .. } => {
            let p = element.position()?.offset(graph.absolute_origin(idx));
            Bounds::new(p.x - 3.0, p.y - 3.0, 6.0, 6.0)
        }
        _ => graph.absolute_bounds(idx)?,
    };
    (bounds.width >= 0.0 && includes(bounds, point)).then(|| element.id())
}
