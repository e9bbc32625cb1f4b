//! 添加墙 / 剪力墙工具
//!
//! 两次单击确定墙底的两个端点，墙顶取两点正上方的锚点，
//! 得到竖向四边形 [p1, p2, above(p2), above(p1)]。任一锚点不存在时什么都不做。

use super::place_planar;
use crate::tool::{Modifiers, Preview, Tool, ToolContext, ToolOutcome, ToolType};
use zframe_core::entity::{EntityKind, Planar};
use zframe_core::math::Point3;
use zframe_core::repository::Repository;

/// 墙绘制状态
#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    /// 等待墙底起点
    SetStart,
    /// 等待墙底终点
    SetEnd { first: Point3, pointer: Point3 },
}

/// 添加墙工具（普通墙和剪力墙共用）
pub struct AddWallTool {
    status: Status,
    shear: bool,
}

impl AddWallTool {
    /// 普通墙
    pub fn wall() -> Self {
        Self {
            status: Status::SetStart,
            shear: false,
        }
    }

    /// 剪力墙
    pub fn shear_wall() -> Self {
        Self {
            status: Status::SetStart,
            shear: true,
        }
    }

    fn make(&self) -> fn(Planar) -> EntityKind {
        if self.shear {
            EntityKind::ShearWall
        } else {
            EntityKind::Wall
        }
    }
}

impl Tool for AddWallTool {
    fn tool_type(&self) -> ToolType {
        if self.shear {
            ToolType::AddShearWall
        } else {
            ToolType::AddWall
        }
    }

    fn reset(&mut self) {
        self.status = Status::SetStart;
    }

    fn on_click(&mut self, ctx: &mut ToolContext, point: Point3, _modifiers: Modifiers) -> ToolOutcome {
        match self.status {
            Status::SetStart => {
                self.status = Status::SetEnd {
                    first: point,
                    pointer: point,
                };
                ToolOutcome::Continue
            }
            Status::SetEnd { first, .. } => {
                self.reset();
                let (Some(top_first), Some(top_second)) =
                    (ctx.repo.position_above(&first), ctx.repo.position_above(&point))
                else {
                    return ToolOutcome::MissingAnchor;
                };
                place_planar(ctx, &[first, point, top_second, top_first], self.make())
            }
        }
    }

    fn on_mouse_move(&mut self, _ctx: &mut ToolContext, point: Point3) -> ToolOutcome {
        if let Status::SetEnd { pointer, .. } = &mut self.status {
            *pointer = point;
        }
        ToolOutcome::Continue
    }

    fn prompt(&self) -> &str {
        match self.status {
            Status::SetStart => "指定墙底起点:",
            Status::SetEnd { .. } => "指定墙底终点:",
        }
    }

    fn preview(&self, _repo: &Repository) -> Vec<Preview> {
        match self.status {
            Status::SetEnd { first, pointer } => vec![Preview::Segment(first, pointer)],
            Status::SetStart => Vec::new(),
        }
    }
}
