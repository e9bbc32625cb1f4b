//! 具体的工具实现
//!
//! 每个建模工具对应一个 [`Tool`] 实现。新建构件和面构件时共用的
//! 重复检查放在本模块。

mod add_beam;
mod add_column;
mod add_floor;
mod add_node;
mod add_wall;
mod move_nodes;
mod select;

pub use add_beam::AddBeamTool;
pub use add_column::AddColumnTool;
pub use add_floor::AddFloorTool;
pub use add_node::AddNodeTool;
pub use add_wall::AddWallTool;
pub use move_nodes::MoveTool;
pub use select::SelectTool;

use crate::tool::{Conflict, Tool, ToolContext, ToolOutcome, ToolType};
use std::collections::HashSet;
use zframe_core::entity::{Entity, EntityId, EntityKind, Planar};
use zframe_core::math::Point3;
use zframe_core::query::NODE_TOLERANCE;
use zframe_core::repository::Repository;

/// 创建指定类型的工具
pub fn create_tool(tool_type: ToolType) -> Box<dyn Tool> {
    match tool_type {
        ToolType::Select => Box::new(SelectTool::new()),
        ToolType::Move => Box::new(MoveTool::new()),
        ToolType::AddNode => Box::new(AddNodeTool::new()),
        ToolType::AddBeam => Box::new(AddBeamTool::new()),
        ToolType::AddColumn => Box::new(AddColumnTool::new()),
        ToolType::AddFloor => Box::new(AddFloorTool::new()),
        ToolType::AddWall => Box::new(AddWallTool::wall()),
        ToolType::AddShearWall => Box::new(AddWallTool::shear_wall()),
    }
}

/// 实体的显示名称，如 "Beam 3"
fn describe(repo: &Repository, id: EntityId) -> String {
    match repo.get(id) {
        Some(entity) => format!("{} {}", entity.entity_type().name(), entity.number()),
        None => "Another element".to_string(),
    }
}

/// 在两个节点之间创建构件
///
/// 已有构件连接这两个节点时返回冲突，不修改模型。
fn place_member(ctx: &mut ToolContext, a: EntityId, b: EntityId, column: bool) -> ToolOutcome {
    if let Some(existing) = ctx.repo.find_member(a, b) {
        return ToolOutcome::Conflict(Conflict::DuplicateMember {
            existing,
            existing_name: describe(ctx.repo, existing),
        });
    }

    let result = if column {
        ctx.repo.add_column(a, b)
    } else {
        ctx.repo.add_beam(a, b)
    };
    match result {
        Ok(id) => {
            tracing::debug!("Created {}", describe(ctx.repo, id));
            ToolOutcome::Created { id, edit: !column }
        }
        Err(e) => {
            tracing::warn!("Member not created: {}", e);
            ToolOutcome::Continue
        }
    }
}

/// 按角点位置创建面构件
///
/// 角点复用已有节点或新建节点。节点集合与已有面构件相同时返回冲突；
/// 冲突只可能发生在所有角点都是已有节点时，因此此时模型没有变化。
/// 角点重合（退化）时什么都不做。
fn place_planar(
    ctx: &mut ToolContext,
    corners: &[Point3],
    make: fn(Planar) -> EntityKind,
) -> ToolOutcome {
    let existing: Vec<Option<EntityId>> = corners
        .iter()
        .map(|c| ctx.repo.find_node_at(c, NODE_TOLERANCE))
        .collect();
    let shared: HashSet<EntityId> = existing.iter().flatten().copied().collect();
    let coincident = corners.iter().enumerate().any(|(i, a)| {
        corners[i + 1..]
            .iter()
            .any(|b| (a - b).norm() <= NODE_TOLERANCE)
    });
    if coincident || shared.len() != existing.iter().flatten().count() {
        tracing::debug!("Planar element ignored: corners collapse onto the same node");
        return ToolOutcome::Continue;
    }

    if let Some(found) = existing.iter().copied().collect::<Option<Vec<_>>>() {
        if let Some(duplicate) = ctx.repo.find_planar(&found) {
            return ToolOutcome::Conflict(Conflict::DuplicatePlanar {
                existing: duplicate,
                existing_name: describe(ctx.repo, duplicate),
            });
        }
    }

    let nodes: Vec<EntityId> = corners
        .iter()
        .map(|c| ctx.repo.node_at_or_insert(c))
        .collect();
    match ctx.repo.add(Entity::new(make(Planar::new(nodes)))) {
        Ok(id) => {
            tracing::debug!("Created {}", describe(ctx.repo, id));
            ToolOutcome::Created { id, edit: true }
        }
        Err(e) => {
            tracing::warn!("Planar element not created: {}", e);
            ToolOutcome::Continue
        }
    }
}
