//! Scene-graph data model for diagrams.
//!
//! The model is a tree stored in a `StableDiGraph`: graph edges go from
//! parent → child and carry no weight. A child finds its parent by walking
//! the single incoming edge, so the back reference never owns anything.
//! Every attached element is indexed by id for O(1) lookup.

use crate::error::ModelError;
use crate::feature::{Feature, features_of, has_feature};
use crate::geometry::{Bounds, Dimension, EMPTY_DIMENSION, ORIGIN_POINT, Point};
use crate::id::ElementId;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use smallvec::SmallVec;
use std::collections::HashMap;

// ─── Shapes ──────────────────────────────────────────────────────────────

/// Position and size of a node, label, or compartment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub position: Point,
    pub size: Dimension,
}

impl Default for Shape {
    fn default() -> Self {
        Self {
            position: ORIGIN_POINT,
            size: EMPTY_DIMENSION,
        }
    }
}

impl Shape {
    pub fn bounds(&self) -> Bounds {
        Bounds::from_parts(self.position, self.size)
    }

    /// Writing bounds sets both position and size.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.position = bounds.position();
        self.size = bounds.size();
    }

    /// Map bounds in this shape's local coordinates to its parent's.
    pub fn local_to_parent(&self, local: Bounds) -> Bounds {
        Bounds::new(
            local.x + self.position.x,
            local.y + self.position.y,
            local.width,
            local.height,
        )
    }

    /// Map a local point to the parent's coordinates. A point has no size,
    /// so the result carries the undefined dimension.
    pub fn point_to_parent(&self, local: Point) -> Bounds {
        Bounds::from_parts(local.offset(self.position), EMPTY_DIMENSION)
    }
}

// ─── Elements ────────────────────────────────────────────────────────────

/// The element variants a diagram is built from.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// Diagram root with a viewport.
    Graph {
        scroll: Point,
        zoom: f64,
        canvas: Bounds,
    },

    Node {
        shape: Shape,
        layout: Option<String>,
    },

    Label { shape: Shape, text: String },

    Compartment {
        shape: Shape,
        layout: Option<String>,
    },

    /// Connection between two elements. Endpoints are ids, resolved through
    /// the index on demand because they may not exist yet.
    Edge { source: ElementId, target: ElementId },

    /// A routing point owned by an edge.
    RoutingPoint { position: Point, volatile: bool },

    /// Root of a popup model.
    Html,

    /// Any type tag with no dedicated variant.
    Generic,
}

impl ElementKind {
    pub fn shape(&self) -> Option<&Shape> {
        match self {
            Self::Node { shape, .. } | Self::Label { shape, .. } | Self::Compartment { shape, .. } => {
                Some(shape)
            }
            _ => None,
        }
    }

    pub fn shape_mut(&mut self) -> Option<&mut Shape> {
        match self {
            Self::Node { shape, .. } | Self::Label { shape, .. } | Self::Compartment { shape, .. } => {
                Some(shape)
            }
            _ => None,
        }
    }
}

/// A single element of a diagram model.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    id: ElementId,

    /// Type tag as sent by the model source (e.g. `node:class`).
    pub type_tag: String,

    pub kind: ElementKind,

    pub selected: bool,
    pub hover_feedback: bool,
    pub opacity: f64,
}

impl Element {
    pub fn new(id: ElementId, type_tag: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id,
            type_tag: type_tag.into(),
            kind,
            selected: false,
            hover_feedback: false,
            opacity: 1.0,
        }
    }

    /// The id is fixed once the element exists.
    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        has_feature(&self.kind, feature)
    }

    pub fn features(&self) -> &'static [Feature] {
        features_of(&self.kind)
    }

    /// Position of locateable elements (shapes and routing points).
    pub fn position(&self) -> Option<Point> {
        match &self.kind {
            ElementKind::RoutingPoint { position, .. } => Some(*position),
            kind => kind.shape().map(|s| s.position),
        }
    }

    /// Returns `false` when the element has no position to set.
    pub fn set_position(&mut self, to: Point) -> bool {
        match &mut self.kind {
            ElementKind::RoutingPoint { position, .. } => {
                *position = to;
                true
            }
            kind => match kind.shape_mut() {
                Some(shape) => {
                    shape.position = to;
                    true
                }
                None => false,
            },
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        match &self.kind {
            ElementKind::Graph { canvas, .. } => Some(*canvas),
            kind => kind.shape().map(Shape::bounds),
        }
    }

    /// Returns `false` when the element has no bounds to set.
    pub fn set_bounds(&mut self, bounds: Bounds) -> bool {
        match &mut self.kind {
            ElementKind::Graph { canvas, .. } => {
                *canvas = bounds;
                true
            }
            kind => match kind.shape_mut() {
                Some(shape) => {
                    shape.set_bounds(bounds);
                    true
                }
                None => false,
            },
        }
    }

    /// Viewport zoom, if this element is a viewport.
    pub fn zoom(&self) -> Option<f64> {
        match &self.kind {
            ElementKind::Graph { zoom, .. } => Some(*zoom),
            _ => None,
        }
    }
}

// ─── Scene Graph ─────────────────────────────────────────────────────────

/// A diagram model: a rooted tree of elements plus its id index.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    graph: StableDiGraph<Element, ()>,
    root: NodeIndex,
    id_index: HashMap<ElementId, NodeIndex>,
    /// Document order of each parent's children.
    child_order: HashMap<NodeIndex, SmallVec<[NodeIndex; 4]>>,
}

/// Type and id of the empty model (used to close popups).
pub const EMPTY_ROOT_TYPE: &str = "NONE";
pub const EMPTY_ROOT_ID: &str = "EMPTY";

impl SceneGraph {
    /// Create a model whose root is `root`.
    #[must_use]
    pub fn new(root: Element) -> Self {
        let mut graph = StableDiGraph::new();
        let id = root.id;
        let root_idx = graph.add_node(root);
        let mut id_index = HashMap::new();
        id_index.insert(id, root_idx);
        Self {
            graph,
            root: root_idx,
            id_index,
            child_order: HashMap::new(),
        }
    }

    /// The empty model: a generic `NONE` root with id `EMPTY`.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Element::new(
            ElementId::intern(EMPTY_ROOT_ID),
            EMPTY_ROOT_TYPE,
            ElementKind::Generic,
        ))
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn root_element(&self) -> &Element {
        &self.graph[self.root]
    }

    pub fn is_empty_root(&self) -> bool {
        let root = self.root_element();
        root.type_tag == EMPTY_ROOT_TYPE && root.id.as_str() == EMPTY_ROOT_ID
    }

    /// Number of attached elements, root included.
    pub fn len(&self) -> usize {
        self.id_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_index.is_empty()
    }

    /// Append `element` as the last child of `parent`.
    pub fn add_child(
        &mut self,
        parent: NodeIndex,
        element: Element,
    ) -> Result<NodeIndex, ModelError> {
        let at = self.children(parent).len();
        self.insert_child(parent, at, element)
    }

    /// Insert `element` at `position` among `parent`'s children
    /// (clamped to the end).
    pub fn insert_child(
        &mut self,
        parent: NodeIndex,
        position: usize,
        element: Element,
    ) -> Result<NodeIndex, ModelError> {
        if !self.graph.contains_node(parent) {
            return Err(ModelError::DetachedParent);
        }
        if self.id_index.contains_key(&element.id) {
            return Err(ModelError::DuplicateId(element.id));
        }
        let id = element.id;
        let idx = self.graph.add_node(element);
        self.graph.add_edge(parent, idx, ());
        self.id_index.insert(id, idx);
        let order = self.child_order.entry(parent).or_default();
        let position = position.min(order.len());
        order.insert(position, idx);
        Ok(idx)
    }

    /// Detach the subtree rooted at `idx` and drop every element in it from
    /// the index. Returns the removed elements in pre-order; removing the
    /// root or an unknown index removes nothing.
    pub fn remove(&mut self, idx: NodeIndex) -> Vec<Element> {
        if idx == self.root || !self.graph.contains_node(idx) {
            return Vec::new();
        }
        if let Some(parent) = self.parent(idx)
            && let Some(order) = self.child_order.get_mut(&parent)
        {
            order.retain(|c| *c != idx);
        }
        let subtree = self.walk(idx);
        let mut removed = Vec::with_capacity(subtree.len());
        for node in subtree {
            self.child_order.remove(&node);
            if let Some(element) = self.graph.remove_node(node) {
                self.id_index.remove(&element.id);
                removed.push(element);
            }
        }
        removed
    }

    /// Look up an element by id.
    pub fn get_by_id(&self, id: ElementId) -> Option<&Element> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn get_by_id_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.id_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    pub fn index_of(&self, id: ElementId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.id_index.contains_key(&id)
    }

    pub fn element(&self, idx: NodeIndex) -> Option<&Element> {
        self.graph.node_weight(idx)
    }

    pub fn element_mut(&mut self, idx: NodeIndex) -> Option<&mut Element> {
        self.graph.node_weight_mut(idx)
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Children of `idx` in document order.
    pub fn children(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.child_order.get(&idx).map_or(&[], |order| order.as_slice())
    }

    /// Pre-order walk of the subtree rooted at `idx`.
    pub fn walk(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if !self.graph.contains_node(current) {
                continue;
            }
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Every attached element in document order, root first.
    pub fn all(&self) -> impl Iterator<Item = &Element> + '_ {
        self.walk(self.root)
            .into_iter()
            .map(move |idx| &self.graph[idx])
    }

    /// Ids of every attached element, root first.
    pub fn ids(&self) -> Vec<ElementId> {
        self.all().map(Element::id).collect()
    }

    /// `idx` itself, then each ancestor up to the root.
    pub fn ancestors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        std::iter::successors(
            self.graph.contains_node(idx).then_some(idx),
            move |&current| self.parent(current),
        )
    }

    /// Nearest element on the path from `idx` to the root (inclusive) that
    /// supports `feature`.
    pub fn find_ancestor_with_feature(&self, idx: NodeIndex, feature: Feature) -> Option<NodeIndex> {
        self.ancestors(idx)
            .find(|&a| self.graph[a].has_feature(feature))
    }

    /// Origin of `idx`'s local coordinate system in root coordinates: the
    /// sum of every shape ancestor's position.
    pub fn absolute_origin(&self, idx: NodeIndex) -> Point {
        self.ancestors(idx)
            .skip(1)
            .filter_map(|a| self.graph[a].kind.shape())
            .fold(ORIGIN_POINT, |acc, shape| acc.offset(shape.position))
    }

    /// Bounds of an element in root coordinates.
    pub fn absolute_bounds(&self, idx: NodeIndex) -> Option<Bounds> {
        let element = self.element(idx)?;
        let bounds = element.bounds()?;
        if matches!(element.kind, ElementKind::Graph { .. }) {
            return Some(bounds);
        }
        let origin = self.absolute_origin(idx);
        Some(Bounds::new(
            bounds.x + origin.x,
            bounds.y + origin.y,
            bounds.width,
            bounds.height,
        ))
    }

    /// Source element of an edge, if the edge and its source are attached.
    pub fn edge_source(&self, edge: NodeIndex) -> Option<NodeIndex> {
        match &self.element(edge)?.kind {
            ElementKind::Edge { source, .. } => self.index_of(*source),
            _ => None,
        }
    }

    pub fn edge_target(&self, edge: NodeIndex) -> Option<NodeIndex> {
        match &self.element(edge)?.kind {
            ElementKind::Edge { target, .. } => self.index_of(*target),
            _ => None,
        }
    }

    /// Routing-point children of an edge, in routing order.
    pub fn routing_points(&self, edge: NodeIndex) -> Vec<NodeIndex> {
        self.children(edge)
            .iter()
            .copied()
            .filter(|&c| matches!(self.graph[c].kind, ElementKind::RoutingPoint { .. }))
            .collect()
    }

    /// Every edge in the model.
    pub fn edges(&self) -> Vec<NodeIndex> {
        self.walk(self.root)
            .into_iter()
            .filter(|&idx| matches!(self.graph[idx].kind, ElementKind::Edge { .. }))
            .collect()
    }
}
