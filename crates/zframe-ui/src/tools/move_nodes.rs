//! 移动工具
//!
//! 与选择工具相同，直到单击落在已选中的节点上：此后鼠标移动会按指针位移
//! 平移所有选中的节点，再次单击结束移动且不改变选择。

use super::select::SelectTool;
use crate::tool::{Modifiers, Preview, Tool, ToolContext, ToolOutcome, ToolType};
use zframe_core::entity::{EntityId, EntityType};
use zframe_core::math::Point3;
use zframe_core::repository::Repository;

/// 移动状态
#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    /// 选择模式
    Selecting,
    /// 正在移动，记录上一次的指针位置
    Moving { last: Point3 },
}

/// 移动工具
pub struct MoveTool {
    status: Status,
    select: SelectTool,
}

impl MoveTool {
    pub fn new() -> Self {
        Self {
            status: Status::Selecting,
            select: SelectTool::new(),
        }
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.status, Status::Moving { .. })
    }

    fn selected_nodes(repo: &Repository) -> Vec<EntityId> {
        repo.selected()
            .into_iter()
            .filter(|id| repo.get(*id).is_some_and(|e| e.entity_type() == EntityType::Node))
            .collect()
    }
}

impl Default for MoveTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for MoveTool {
    fn tool_type(&self) -> ToolType {
        ToolType::Move
    }

    fn reset(&mut self) {
        self.status = Status::Selecting;
        self.select.reset();
    }

    fn on_click(&mut self, ctx: &mut ToolContext, point: Point3, modifiers: Modifiers) -> ToolOutcome {
        match self.status {
            Status::Selecting => {
                let grabbed = ctx.hit(&point).filter(|id| {
                    ctx.repo.node(*id).is_some() && ctx.repo.is_selected(*id)
                });
                if grabbed.is_some() {
                    tracing::debug!("Move: grabbed selected nodes at {:?}", point);
                    self.status = Status::Moving { last: point };
                    return ToolOutcome::Continue;
                }
                self.select.on_click(ctx, point, modifiers)
            }
            Status::Moving { .. } => {
                self.status = Status::Selecting;
                ToolOutcome::Continue
            }
        }
    }

    fn on_mouse_move(&mut self, ctx: &mut ToolContext, point: Point3) -> ToolOutcome {
        match &mut self.status {
            Status::Moving { last } => {
                let delta = point - *last;
                *last = point;
                if delta.norm() > 0.0 {
                    let nodes = Self::selected_nodes(ctx.repo);
                    ctx.repo.translate_nodes(&nodes, delta);
                }
                ToolOutcome::Continue
            }
            Status::Selecting => self.select.on_mouse_move(ctx, point),
        }
    }

    fn on_begin_drag(&mut self, ctx: &mut ToolContext, point: Point3, modifiers: Modifiers) -> ToolOutcome {
        match self.status {
            Status::Selecting => self.select.on_begin_drag(ctx, point, modifiers),
            Status::Moving { .. } => ToolOutcome::Continue,
        }
    }

    fn on_end_drag(&mut self, ctx: &mut ToolContext, point: Point3, modifiers: Modifiers) -> ToolOutcome {
        match self.status {
            Status::Selecting => self.select.on_end_drag(ctx, point, modifiers),
            Status::Moving { .. } => ToolOutcome::Continue,
        }
    }

    fn prompt(&self) -> &str {
        match self.status {
            Status::Selecting => "选择要移动的节点，再单击已选节点开始移动:",
            Status::Moving { .. } => "移动鼠标平移节点，单击结束:",
        }
    }

    fn preview(&self, repo: &Repository) -> Vec<Preview> {
        match self.status {
            Status::Selecting => self.select.preview(repo),
            Status::Moving { .. } => Self::selected_nodes(repo)
                .into_iter()
                .filter_map(|id| repo.position(id))
                .map(Preview::Point)
                .collect(),
        }
    }
}
