//! 选择工具

use crate::tool::{Modifiers, Preview, Tool, ToolContext, ToolOutcome, ToolType};
use zframe_core::math::{xy, BoundingBox2, Point3};
use zframe_core::repository::Repository;

/// 拖动距离小于该值（X、Y 都小于）时视为单击
const MIN_DRAG: f64 = 1.0;

/// 选择状态
#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    /// 空闲，等待选择
    Idle,
    /// 正在框选
    BoxSelect { start: Point3, current: Point3 },
}

/// 选择工具
pub struct SelectTool {
    status: Status,
}

impl SelectTool {
    pub fn new() -> Self {
        Self {
            status: Status::Idle,
        }
    }

    /// 是否正在框选
    pub fn is_box_selecting(&self) -> bool {
        matches!(self.status, Status::BoxSelect { .. })
    }

    /// 点选
    ///
    /// 没有修饰键时，除非点中的是已选实体，否则先清空选择。
    /// 按住 Ctrl 切换选中状态，否则设为选中。
    pub(crate) fn pick(
        ctx: &mut ToolContext,
        point: &Point3,
        modifiers: Modifiers,
    ) -> ToolOutcome {
        let hit = ctx.hit(point);
        let mut changed = false;

        if modifiers.is_empty() && !hit.is_some_and(|id| ctx.repo.is_selected(id)) {
            changed = !ctx.repo.selected().is_empty();
            ctx.repo.clear_selection();
        }

        if let Some(id) = hit {
            if modifiers.ctrl {
                ctx.repo.toggle_selected(id);
            } else {
                ctx.repo.set_selected(id, true);
            }
            changed = true;
        }

        if changed {
            ToolOutcome::SelectionChanged
        } else {
            ToolOutcome::Continue
        }
    }

    /// 框选：选中（或 Ctrl 切换）完全落在矩形内的实体，标高取拖动起点
    fn select_box(
        ctx: &mut ToolContext,
        start: &Point3,
        end: &Point3,
        modifiers: Modifiers,
    ) -> ToolOutcome {
        if (end.x - start.x).abs() < MIN_DRAG && (end.y - start.y).abs() < MIN_DRAG {
            return ToolOutcome::Continue;
        }

        let rect = BoundingBox2::new(xy(start), xy(end));
        let found = ctx.repo.entities_in_rect(&rect, start.z);
        tracing::debug!("Box selection found {} entities", found.len());
        if found.is_empty() {
            return ToolOutcome::Continue;
        }

        for id in found {
            if modifiers.ctrl {
                ctx.repo.toggle_selected(id);
            } else {
                ctx.repo.set_selected(id, true);
            }
        }
        ToolOutcome::SelectionChanged
    }
}

impl Default for SelectTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for SelectTool {
    fn tool_type(&self) -> ToolType {
        ToolType::Select
    }

    fn reset(&mut self) {
        self.status = Status::Idle;
    }

    fn on_click(&mut self, ctx: &mut ToolContext, point: Point3, modifiers: Modifiers) -> ToolOutcome {
        Self::pick(ctx, &point, modifiers)
    }

    fn on_mouse_move(&mut self, _ctx: &mut ToolContext, point: Point3) -> ToolOutcome {
        if let Status::BoxSelect { current, .. } = &mut self.status {
            *current = point;
        }
        ToolOutcome::Continue
    }

    fn on_begin_drag(
        &mut self,
        _ctx: &mut ToolContext,
        point: Point3,
        _modifiers: Modifiers,
    ) -> ToolOutcome {
        self.status = Status::BoxSelect {
            start: point,
            current: point,
        };
        ToolOutcome::Continue
    }

    fn on_end_drag(&mut self, ctx: &mut ToolContext, point: Point3, modifiers: Modifiers) -> ToolOutcome {
        match std::mem::replace(&mut self.status, Status::Idle) {
            Status::BoxSelect { start, .. } => Self::select_box(ctx, &start, &point, modifiers),
            Status::Idle => ToolOutcome::Continue,
        }
    }

    fn prompt(&self) -> &str {
        match self.status {
            Status::Idle => "选择对象 [Ctrl 切换]:",
            Status::BoxSelect { .. } => "指定对角点:",
        }
    }

    fn preview(&self, _repo: &Repository) -> Vec<Preview> {
        match self.status {
            Status::BoxSelect { start, current } => vec![Preview::Rectangle(start, current)],
            Status::Idle => Vec::new(),
        }
    }
}
