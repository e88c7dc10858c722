pub mod error;
pub mod feature;
pub mod geometry;
pub mod hit;
pub mod id;
pub mod model;
pub mod schema;

pub use error::ModelError;
pub use feature::Feature;
pub use geometry::{Bounds, Dimension, Point};
pub use hit::hit_test;
pub use id::ElementId;
pub use model::*;
pub use schema::{ElementSchema, ModelFactory, SchemaFactory};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
