//! 添加楼板工具
//!
//! 两次单击确定水平矩形的对角，楼板位于两次单击的平均标高。
//! 角点顺序为 (minX,minY) → (maxX,minY) → (maxX,maxY) → (minX,maxY)。
//! 双击已有楼板在 X、Y 之间切换传力方向，不打开属性编辑器。

use super::place_planar;
use crate::tool::{Modifiers, Preview, Tool, ToolContext, ToolOutcome, ToolType};
use zframe_core::entity::EntityKind;
use zframe_core::math::Point3;
use zframe_core::repository::Repository;

/// 楼板绘制状态
#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    /// 等待第一个角点
    SetFirstCorner,
    /// 等待对角点
    SetSecondCorner { first: Point3, pointer: Point3 },
}

/// 添加楼板工具
pub struct AddFloorTool {
    status: Status,
}

impl AddFloorTool {
    pub fn new() -> Self {
        Self {
            status: Status::SetFirstCorner,
        }
    }

    /// 由两次单击得到的四个角点
    fn corners(first: &Point3, second: &Point3) -> [Point3; 4] {
        let z = (first.z + second.z) / 2.0;
        let (min_x, max_x) = (first.x.min(second.x), first.x.max(second.x));
        let (min_y, max_y) = (first.y.min(second.y), first.y.max(second.y));
        [
            Point3::new(min_x, min_y, z),
            Point3::new(max_x, min_y, z),
            Point3::new(max_x, max_y, z),
            Point3::new(min_x, max_y, z),
        ]
    }
}

impl Default for AddFloorTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for AddFloorTool {
    fn tool_type(&self) -> ToolType {
        ToolType::AddFloor
    }

    fn reset(&mut self) {
        self.status = Status::SetFirstCorner;
    }

    fn on_click(&mut self, ctx: &mut ToolContext, point: Point3, _modifiers: Modifiers) -> ToolOutcome {
        match self.status {
            Status::SetFirstCorner => {
                self.status = Status::SetSecondCorner {
                    first: point,
                    pointer: point,
                };
                ToolOutcome::Continue
            }
            Status::SetSecondCorner { first, .. } => {
                self.reset();
                place_planar(ctx, &Self::corners(&first, &point), EntityKind::Floor)
            }
        }
    }

    fn on_mouse_move(&mut self, _ctx: &mut ToolContext, point: Point3) -> ToolOutcome {
        if let Status::SetSecondCorner { pointer, .. } = &mut self.status {
            *pointer = point;
        }
        ToolOutcome::Continue
    }

    fn on_double_click(&mut self, ctx: &mut ToolContext, point: Point3) -> ToolOutcome {
        self.reset();
        let Some(id) = ctx.hit(&point) else {
            return ToolOutcome::Continue;
        };
        let span = match ctx.repo.get(id).map(|e| &e.kind) {
            Some(EntityKind::Floor(floor)) => floor.span.toggled(),
            Some(_) => return ToolOutcome::Edit(id),
            None => return ToolOutcome::Continue,
        };
        if let Err(e) = ctx.repo.set_span_direction(id, span) {
            tracing::warn!("Span direction not changed: {}", e);
        }
        ToolOutcome::Continue
    }

    fn prompt(&self) -> &str {
        match self.status {
            Status::SetFirstCorner => "指定楼板第一个角点:",
            Status::SetSecondCorner { .. } => "指定对角点:",
        }
    }

    fn preview(&self, _repo: &Repository) -> Vec<Preview> {
        match self.status {
            Status::SetSecondCorner { first, pointer } => {
                vec![Preview::Polygon(Self::corners(&first, &pointer).to_vec())]
            }
            Status::SetFirstCorner => Vec::new(),
        }
    }
}
