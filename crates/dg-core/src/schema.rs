//! Serializable element schemas and the factory that turns them into models.
//!
//! A schema is the plain-data form of a model exchanged with model sources:
//! id, type tag, optional attributes, nested children. Keys are camelCase so
//! the JSON shape stays wire compatible (`sourceId`, `routingPoints`, ...).

use crate::error::ModelError;
use crate::geometry::{Bounds, Dimension, EMPTY_BOUNDS, EMPTY_DIMENSION, ORIGIN_POINT, Point};
use crate::id::ElementId;
use crate::model::{EMPTY_ROOT_TYPE, Element, ElementKind, SceneGraph, Shape};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Plain-data description of an element and its subtree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSchema {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub type_tag: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementSchema>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Dimension>,
    /// Canvas bounds of a graph root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    /// Shorthand for routing-point children; ids are derived from the edge id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_points: Option<Vec<Point>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hover_feedback: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl ElementSchema {
    pub fn new(id: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_tag: type_tag.into(),
            ..Default::default()
        }
    }

    /// Schema of the empty model.
    pub fn empty_root() -> Self {
        Self::new(crate::model::EMPTY_ROOT_ID, EMPTY_ROOT_TYPE)
    }
}

// ─── Factory ─────────────────────────────────────────────────────────────

/// Builds live models from schemas. Hosts may plug in their own element
/// mapping; `SchemaFactory` is the stock one.
pub trait ModelFactory {
    fn create_element(&self, schema: &ElementSchema) -> Result<Element, ModelError>;

    /// Build a whole model. Fails on the first malformed element or
    /// duplicate id; a partially built tree is never returned.
    fn create_root(&self, schema: &ElementSchema) -> Result<SceneGraph, ModelError> {
        let root = self.create_element(schema)?;
        let mut graph = SceneGraph::new(root);
        let root_idx = graph.root();
        self.create_children(&mut graph, root_idx, schema)?;
        Ok(graph)
    }

    fn create_children(
        &self,
        graph: &mut SceneGraph,
        parent: NodeIndex,
        schema: &ElementSchema,
    ) -> Result<(), ModelError> {
        for (i, point) in schema.routing_points.iter().flatten().enumerate() {
            let id = ElementId::intern(&format!("{}_rp{i}", schema.id));
            let rp = Element::new(
                id,
                "routing-point",
                ElementKind::RoutingPoint {
                    position: *point,
                    volatile: false,
                },
            );
            graph.add_child(parent, rp)?;
        }
        for child in &schema.children {
            let element = self.create_element(child)?;
            let idx = graph.add_child(parent, element)?;
            self.create_children(graph, idx, child)?;
        }
        Ok(())
    }
}

/// Maps type tags to element variants by the part before the first `:`
/// (`node:class` → node).
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaFactory;

impl ModelFactory for SchemaFactory {
    fn create_element(&self, schema: &ElementSchema) -> Result<Element, ModelError> {
        if schema.id.is_empty() {
            return Err(ModelError::MissingField {
                id: format!("<{}>", schema.type_tag),
                field: "id",
            });
        }
        if schema.type_tag.is_empty() {
            return Err(ModelError::MissingField {
                id: schema.id.clone(),
                field: "type",
            });
        }

        let shape = Shape {
            position: schema.position.unwrap_or(ORIGIN_POINT),
            size: schema.size.unwrap_or(EMPTY_DIMENSION),
        };
        let base = schema.type_tag.split(':').next().unwrap_or_default();
        let kind = match base {
            "graph" => ElementKind::Graph {
                scroll: schema.scroll.unwrap_or(ORIGIN_POINT),
                zoom: schema.zoom.unwrap_or(1.0),
                canvas: schema.bounds.unwrap_or(EMPTY_BOUNDS),
            },
            "node" => ElementKind::Node {
                shape,
                layout: schema.layout.clone(),
            },
            "comp" => ElementKind::Compartment {
                shape,
                layout: schema.layout.clone(),
            },
            "label" => ElementKind::Label {
                shape,
                text: schema.text.clone().unwrap_or_default(),
            },
            "edge" => ElementKind::Edge {
                source: required_id(schema, schema.source_id.as_deref(), "sourceId")?,
                target: required_id(schema, schema.target_id.as_deref(), "targetId")?,
            },
            "routing-point" | "volatile-routing-point" => ElementKind::RoutingPoint {
                position: schema.position.unwrap_or(ORIGIN_POINT),
                volatile: base == "volatile-routing-point",
            },
            "html" => ElementKind::Html,
            _ => ElementKind::Generic,
        };

        let mut element = Element::new(ElementId::intern(&schema.id), &schema.type_tag, kind);
        element.selected = schema.selected.unwrap_or(false);
        element.hover_feedback = schema.hover_feedback.unwrap_or(false);
        element.opacity = schema.opacity.unwrap_or(1.0);
        Ok(element)
    }
}

fn required_id(
    schema: &ElementSchema,
    value: Option<&str>,
    field: &'static str,
) -> Result<ElementId, ModelError> {
    match value {
        Some(v) if !v.is_empty() => Ok(ElementId::intern(v)),
        _ => Err(ModelError::MissingField {
            id: schema.id.clone(),
            field,
        }),
    }
}

// ─── Export ──────────────────────────────────────────────────────────────

impl SceneGraph {
    /// The schema tree of the current model. Routing points are exported as
    /// children so their ids survive a round trip.
    pub fn to_schema(&self) -> ElementSchema {
        self.schema_of(self.root())
    }

    fn schema_of(&self, idx: NodeIndex) -> ElementSchema {
        let Some(element) = self.element(idx) else {
            return ElementSchema::default();
        };
        let mut schema = ElementSchema::new(element.id().as_str(), element.type_tag.as_str());
        match &element.kind {
            ElementKind::Graph {
                scroll,
                zoom,
                canvas,
            } => {
                schema.scroll = Some(*scroll);
                schema.zoom = Some(*zoom);
                schema.bounds = Some(*canvas);
            }
            ElementKind::Node { shape, layout } | ElementKind::Compartment { shape, layout } => {
                schema.position = Some(shape.position);
                schema.size = Some(shape.size);
                schema.layout = layout.clone();
            }
            ElementKind::Label { shape, text } => {
                schema.position = Some(shape.position);
                schema.size = Some(shape.size);
                schema.text = Some(text.clone());
            }
            ElementKind::Edge { source, target } => {
                schema.source_id = Some(source.to_string());
                schema.target_id = Some(target.to_string());
            }
            ElementKind::RoutingPoint { position, .. } => {
                schema.position = Some(*position);
            }
            ElementKind::Html | ElementKind::Generic => {}
        }
        if element.selected {
            schema.selected = Some(true);
        }
        if element.hover_feedback {
            schema.hover_feedback = Some(true);
        }
        if element.opacity != 1.0 {
            schema.opacity = Some(element.opacity);
        }
        schema.children = self
            .children(idx)
            .iter()
            .map(|&c| self.schema_of(c))
            .collect();
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> ElementSchema {
        serde_json::from_str(
            r#"{
                "id": "s_graph",
                "type": "graph",
                "children": [
                    { "id": "s_n1", "type": "node:circle", "position": { "x": 1, "y": 2 },
                      "size": { "width": 10, "height": 10 },
                      "children": [ { "id": "s_l1", "type": "label", "text": "one" } ] },
                    { "id": "s_n2", "type": "node" },
                    { "id": "s_e1", "type": "edge", "sourceId": "s_n1", "targetId": "s_n2",
                      "routingPoints": [ { "x": 5, "y": 5 } ] }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn builds_indexed_tree() {
        let sg = SchemaFactory.create_root(&sample()).unwrap();
        assert_eq!(sg.len(), 6);
        let n1 = sg.get_by_id(ElementId::intern("s_n1")).unwrap();
        assert_eq!(n1.position(), Some(Point::new(1.0, 2.0)));
        assert_eq!(n1.type_tag, "node:circle");

        let e1 = sg.index_of(ElementId::intern("s_e1")).unwrap();
        let rps = sg.routing_points(e1);
        assert_eq!(rps.len(), 1);
        assert_eq!(sg.element(rps[0]).unwrap().id().as_str(), "s_e1_rp0");
    }

    #[test]
    fn missing_position_and_size_default() {
        let sg = SchemaFactory.create_root(&sample()).unwrap();
        let n2 = sg.get_by_id(ElementId::intern("s_n2")).unwrap();
        assert_eq!(n2.bounds(), Some(Bounds::new(0.0, 0.0, -1.0, -1.0)));
    }

    #[test]
    fn edge_without_source_is_fatal() {
        let mut schema = ElementSchema::new("s_bad_root", "graph");
        let mut edge = ElementSchema::new("s_bad_edge", "edge");
        edge.target_id = Some("x".into());
        schema.children.push(edge);

        let err = SchemaFactory.create_root(&schema).unwrap_err();
        assert_eq!(
            err,
            ModelError::MissingField {
                id: "s_bad_edge".into(),
                field: "sourceId",
            }
        );
    }

    #[test]
    fn missing_id_is_fatal() {
        let schema: ElementSchema = serde_json::from_str(r#"{ "type": "node" }"#).unwrap();
        assert!(matches!(
            SchemaFactory.create_element(&schema),
            Err(ModelError::MissingField { field: "id", .. })
        ));
    }

    #[test]
    fn duplicate_ids_in_schema_are_fatal() {
        let mut schema = ElementSchema::new("s_dupe_root", "graph");
        schema.children.push(ElementSchema::new("s_twin", "node"));
        schema.children.push(ElementSchema::new("s_twin", "node"));
        assert_eq!(
            SchemaFactory.create_root(&schema).unwrap_err(),
            ModelError::DuplicateId(ElementId::intern("s_twin"))
        );
    }

    #[test]
    fn export_then_import_preserves_model() {
        let sg = SchemaFactory.create_root(&sample()).unwrap();
        let exported = sg.to_schema();
        let rebuilt = SchemaFactory.create_root(&exported).unwrap();
        assert_eq!(rebuilt.to_schema(), exported);
        assert_eq!(rebuilt.ids(), sg.ids());
    }

    #[test]
    fn empty_root_is_recognized() {
        let sg = SchemaFactory.create_root(&ElementSchema::empty_root()).unwrap();
        assert!(sg.is_empty_root());
        assert_eq!(sg.len(), 1);
    }
}
