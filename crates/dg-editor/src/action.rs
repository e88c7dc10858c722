//! Actions: plain, serializable intents.
//!
//! Actions are the wire boundary towards model sources, so the shape is
//! fixed: a `kind` discriminator plus camelCase payload keys. Both JSON and
//! MessagePack encodings are supported.

use crate::error::WireError;
use dg_core::{Bounds, ElementId, ElementSchema, Point};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Discriminator strings, as they appear on the wire.
pub mod kind {
    pub const SET_MODEL: &str = "setModel";
    pub const MOVE: &str = "move";
    pub const MOVE_EDGES: &str = "edgeMoved";
    pub const HOVER: &str = "elementHovered";
    pub const REQUEST_POPUP_MODEL: &str = "requestPopupModel";
    pub const SET_POPUP_MODEL: &str = "setPopupModel";
    pub const SET_BOUNDS: &str = "setBounds";
    pub const SELECT: &str = "elementSelected";
    pub const UNDO: &str = "undo";
    pub const REDO: &str = "redo";
}

/// One element's requested move. Without `from_position` the element's
/// position at resolution time is used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementMove {
    pub element_id: ElementId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_position: Option<Point>,
    pub to_position: Point,
}

impl ElementMove {
    pub fn new(element_id: ElementId, from: Option<Point>, to: Point) -> Self {
        Self {
            element_id,
            from_position: from,
            to_position: to,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveAction {
    pub moves: SmallVec<[ElementMove; 4]>,
    /// Unanimated ("snap") moves apply at once and may merge.
    #[serde(default = "default_animate")]
    pub animate: bool,
}

fn default_animate() -> bool {
    true
}

impl MoveAction {
    pub fn new(moves: impl IntoIterator<Item = ElementMove>, animate: bool) -> Self {
        Self {
            moves: moves.into_iter().collect(),
            animate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementAndBounds {
    pub element_id: ElementId,
    pub new_bounds: Bounds,
}

/// A requested model change, independent of how it will be executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Action {
    /// Replace the diagram model.
    #[serde(rename = "setModel", rename_all = "camelCase")]
    SetModel { new_root: ElementSchema },

    #[serde(rename = "move")]
    Move(MoveAction),

    /// Translate routing points of edges whose endpoints both move.
    #[serde(rename = "edgeMoved", rename_all = "camelCase")]
    MoveEdges { move_action: MoveAction },

    #[serde(rename = "elementHovered", rename_all = "camelCase")]
    Hover {
        mouseover_element: ElementId,
        mouse_is_over: bool,
    },

    /// Ask the model source for popup content; answered with `SetPopupModel`.
    #[serde(rename = "requestPopupModel")]
    RequestPopupModel { element: ElementId, bounds: Bounds },

    #[serde(rename = "setPopupModel", rename_all = "camelCase")]
    SetPopupModel { new_root: ElementSchema },

    /// Layout results to apply.
    #[serde(rename = "setBounds")]
    SetBounds { bounds: Vec<ElementAndBounds> },

    #[serde(rename = "elementSelected")]
    Select {
        #[serde(rename = "selectedElementsIDs", default)]
        selected: Vec<ElementId>,
        #[serde(rename = "deselectedElementsIDs", default)]
        deselected: Vec<ElementId>,
    },

    #[serde(rename = "undo")]
    Undo,

    #[serde(rename = "redo")]
    Redo,
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetModel { .. } => kind::SET_MODEL,
            Self::Move(_) => kind::MOVE,
            Self::MoveEdges { .. } => kind::MOVE_EDGES,
            Self::Hover { .. } => kind::HOVER,
            Self::RequestPopupModel { .. } => kind::REQUEST_POPUP_MODEL,
            Self::SetPopupModel { .. } => kind::SET_POPUP_MODEL,
            Self::SetBounds { .. } => kind::SET_BOUNDS,
            Self::Select { .. } => kind::SELECT,
            Self::Undo => kind::UNDO,
            Self::Redo => kind::REDO,
        }
    }

    /// Close any open popup.
    pub fn close_popup() -> Self {
        Self::SetPopupModel {
            new_root: ElementSchema::empty_root(),
        }
    }

    pub fn hover(element: ElementId, over: bool) -> Self {
        Self::Hover {
            mouseover_element: element,
            mouse_is_over: over,
        }
    }

    pub fn to_json(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, WireError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compact binary encoding. Field names are kept so the `kind` tag
    /// survives.
    pub fn to_msgpack(&self) -> Result<Vec<u8>, WireError> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, WireError> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
