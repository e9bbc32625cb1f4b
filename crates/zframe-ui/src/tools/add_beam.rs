//! 添加梁工具
//!
//! 两次单击：第一次确定（或新建）起点节点，第二次确定终点节点并创建梁。
//! 两节点间已有构件时报告冲突。无论成功与否都回到初始状态。

use super::place_member;
use crate::tool::{Modifiers, Preview, Tool, ToolContext, ToolOutcome, ToolType};
use zframe_core::entity::EntityId;
use zframe_core::math::Point3;
use zframe_core::repository::Repository;

/// 梁绘制状态
#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    /// 等待起点
    SetStartNode,
    /// 等待终点
    SetEndNode { pending: EntityId, pointer: Point3 },
}

/// 添加梁工具
pub struct AddBeamTool {
    status: Status,
}

impl AddBeamTool {
    pub fn new() -> Self {
        Self {
            status: Status::SetStartNode,
        }
    }

    /// 等待第二次单击时的起点节点
    pub fn pending(&self) -> Option<EntityId> {
        match self.status {
            Status::SetEndNode { pending, .. } => Some(pending),
            Status::SetStartNode => None,
        }
    }
}

impl Default for AddBeamTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for AddBeamTool {
    fn tool_type(&self) -> ToolType {
        ToolType::AddBeam
    }

    fn reset(&mut self) {
        self.status = Status::SetStartNode;
    }

    fn on_click(&mut self, ctx: &mut ToolContext, point: Point3, _modifiers: Modifiers) -> ToolOutcome {
        match self.status {
            // 起点节点已被删除时重新开始
            Status::SetEndNode { pending, .. } if ctx.repo.node(pending).is_some() => {
                let target = ctx.repo.node_at_or_insert(&point);
                if target == pending {
                    return ToolOutcome::Continue;
                }
                self.reset();
                place_member(ctx, pending, target, false)
            }
            _ => {
                let pending = ctx.repo.node_at_or_insert(&point);
                self.status = Status::SetEndNode {
                    pending,
                    pointer: point,
                };
                ToolOutcome::Continue
            }
        }
    }

    fn on_mouse_move(&mut self, _ctx: &mut ToolContext, point: Point3) -> ToolOutcome {
        if let Status::SetEndNode { pointer, .. } = &mut self.status {
            *pointer = point;
        }
        ToolOutcome::Continue
    }

    fn prompt(&self) -> &str {
        match self.status {
            Status::SetStartNode => "指定梁的起点:",
            Status::SetEndNode { .. } => "指定梁的终点:",
        }
    }

    fn preview(&self, repo: &Repository) -> Vec<Preview> {
        match self.status {
            Status::SetEndNode { pending, pointer } => repo
                .position(pending)
                .map(|start| vec![Preview::Segment(start, pointer)])
                .unwrap_or_default(),
            Status::SetStartNode => Vec::new(),
        }
    }
}
