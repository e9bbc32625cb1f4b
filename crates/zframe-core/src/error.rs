//! 模型操作错误定义

use crate::entity::EntityId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Entity not found: {0:?}")]
    EntityNotFound(EntityId),

    #[error("Referenced entity {0:?} is not a node in this model")]
    DanglingReference(EntityId),

    #[error("Node {number} cannot be removed: {reason}")]
    NodeInUse { number: usize, reason: String },

    #[error("Member needs two distinct end nodes")]
    DegenerateMember,

    #[error("Planar element needs at least 3 nodes, got {0}")]
    TooFewNodes(usize),

    #[error("Invalid value for field '{key}': {value}")]
    InvalidField { key: String, value: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayerError {
    #[error("A layer already exists at elevation {0}")]
    Collision(f64),

    #[error("Layer index out of range: {0}")]
    NotFound(usize),
}
