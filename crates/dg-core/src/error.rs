use crate::id::ElementId;
use thiserror::Error;

/// Fatal errors raised while building or restructuring a model.
///
/// Lookups of absent ids are not errors; they return `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A schema lacks an attribute its element type cannot do without.
    #[error("element `{id}` is missing required field `{field}`")]
    MissingField { id: String, field: &'static str },

    /// The id is already indexed in this model.
    #[error("duplicate element id `{0}`")]
    DuplicateId(ElementId),

    /// The parent handle does not point into this model.
    #[error("parent element is not attached to the model")]
    DetachedParent,
}
