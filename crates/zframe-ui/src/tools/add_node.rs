//! 添加节点工具

use crate::tool::{Modifiers, Tool, ToolContext, ToolOutcome, ToolType};
use zframe_core::math::Point3;
use zframe_core::query::NODE_TOLERANCE;

/// 添加节点工具：单击处已有节点时复用，否则新建
pub struct AddNodeTool;

impl AddNodeTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AddNodeTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for AddNodeTool {
    fn tool_type(&self) -> ToolType {
        ToolType::AddNode
    }

    fn reset(&mut self) {}

    fn on_click(&mut self, ctx: &mut ToolContext, point: Point3, _modifiers: Modifiers) -> ToolOutcome {
        if ctx.repo.find_node_at(&point, NODE_TOLERANCE).is_some() {
            return ToolOutcome::Continue;
        }
        let id = ctx.repo.add_node(point);
        tracing::debug!("Created node at {:?}", point);
        ToolOutcome::Created { id, edit: false }
    }

    fn prompt(&self) -> &str {
        "指定节点位置:"
    }
}
