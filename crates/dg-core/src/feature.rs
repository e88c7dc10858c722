//! Capabilities ("features") that element variants opt into.
//!
//! Commands and listeners never branch on the concrete variant. They ask
//! `element.has_feature(Feature::Move)` and skip elements that answer no.

use crate::model::ElementKind;

/// A named behavior an element variant may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Has a position that move commands may change.
    Move,
    /// Carries a `selected` flag.
    Select,
    /// Shows hover feedback (`hover_feedback` flag).
    HoverFeedback,
    /// Can open a popup after the pointer rests on it.
    Popup,
    /// Has bounds that layout results may set.
    Bounds,
    /// Lays out its own children.
    Layout,
    /// Carries an opacity that fade animations may change.
    Fade,
    /// Routing can be edited.
    Edit,
    /// Scroll + zoom viewport; scales pointer deltas for descendants.
    Viewport,
}

const NODE_FEATURES: &[Feature] = &[
    Feature::Select,
    Feature::Move,
    Feature::Bounds,
    Feature::Layout,
    Feature::Fade,
    Feature::HoverFeedback,
    Feature::Popup,
];
const EDGE_FEATURES: &[Feature] = &[Feature::Fade, Feature::Select, Feature::Edit];
const ROUTING_POINT_FEATURES: &[Feature] =
    &[Feature::Select, Feature::Move, Feature::HoverFeedback];
const LABEL_FEATURES: &[Feature] = &[Feature::Bounds];
const COMPARTMENT_FEATURES: &[Feature] = &[Feature::Bounds, Feature::Layout];
const GRAPH_FEATURES: &[Feature] = &[Feature::Viewport];

/// The capability set of an element variant.
pub fn features_of(kind: &ElementKind) -> &'static [Feature] {
    match kind {
        ElementKind::Node { .. } => NODE_FEATURES,
        ElementKind::Edge { .. } => EDGE_FEATURES,
        ElementKind::RoutingPoint { .. } => ROUTING_POINT_FEATURES,
        ElementKind::Label { .. } => LABEL_FEATURES,
        ElementKind::Compartment { .. } => COMPARTMENT_FEATURES,
        ElementKind::Graph { .. } => GRAPH_FEATURES,
        ElementKind::Html | ElementKind::Generic => &[],
    }
}

/// Membership test against the variant's capability set.
pub fn has_feature(kind: &ElementKind, feature: Feature) -> bool {
    features_of(kind).contains(&feature)
}
