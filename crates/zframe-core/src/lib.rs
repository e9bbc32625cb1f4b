//! ZFrame 模型核心
//!
//! 结构框架模型的数据层：节点、梁、柱、楼板、墙、剪力墙和楼层图层。
//!
//! # 架构设计
//!
//! - `Repository`: 唯一数据源，持有全部实体和图层，维护编号和引用不变量
//! - `EntityId`: 仓库内稳定的实体句柄，构件通过它引用节点
//! - 编号（`Entity::number`）不是稳定标识，每次结构变化后重新分配
//!
//! # 示例
//!
//! ```rust
//! use zframe_core::prelude::*;
//!
//! let mut repo = Repository::new();
//! let bottom = repo.add_node(Point3::new(0.0, 0.0, 0.0));
//! let top = repo.add_node(Point3::new(0.0, 0.0, 3.0));
//! let column = repo.add_column(bottom, top).unwrap();
//!
//! assert_eq!(repo.number(column), Some(0));
//! ```

pub mod entity;
pub mod error;
pub mod layer;
pub mod math;
pub mod query;
pub mod repository;
pub mod snap;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::entity::{
        Entity, EntityId, EntityKind, EntityType, Family, Member, Node, Planar, SpanDirection,
    };
    pub use crate::error::{LayerError, ModelError};
    pub use crate::layer::{Layer, LayerStack};
    pub use crate::math::{BoundingBox2, Point2, Point3, Vector3};
    pub use crate::query::NODE_TOLERANCE;
    pub use crate::repository::{ModelEvent, Removability, Repository};
    pub use crate::snap::{snap_to_grid, snap_value};
}
