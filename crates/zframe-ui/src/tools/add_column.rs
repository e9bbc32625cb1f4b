//! 添加柱工具
//!
//! 单击一次：在单击点正上方找到锚点（已有节点或梁上的点），
//! 在两点之间创建柱。找不到锚点时什么都不做。

use super::place_member;
use crate::tool::{Modifiers, Tool, ToolContext, ToolOutcome, ToolType};
use zframe_core::math::Point3;

/// 添加柱工具
pub struct AddColumnTool;

impl AddColumnTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AddColumnTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for AddColumnTool {
    fn tool_type(&self) -> ToolType {
        ToolType::AddColumn
    }

    fn reset(&mut self) {}

    fn on_click(&mut self, ctx: &mut ToolContext, point: Point3, _modifiers: Modifiers) -> ToolOutcome {
        let Some(above) = ctx.repo.position_above(&point) else {
            return ToolOutcome::MissingAnchor;
        };
        let bottom = ctx.repo.node_at_or_insert(&point);
        let top = ctx.repo.node_at_or_insert(&above);
        place_member(ctx, bottom, top, true)
    }

    fn prompt(&self) -> &str {
        "指定柱底位置:"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::Conflict;
    use crate::tools::test_support::{click, p};
    use zframe_core::repository::Repository;

    #[test]
    fn test_column_under_node() {
        let mut repo = Repository::new();
        let top = repo.add_node(p(0.0, 0.0, 3.0));
        let mut tool = AddColumnTool::new();

        let outcome = click(&mut tool, &mut repo, p(0.0, 0.0, 0.0));
        let ToolOutcome::Created { id, edit } = outcome else {
            panic!("expected a column, got {outcome:?}");
        };
        assert!(!edit);
        let column = repo.member(id).expect("column");
        assert_eq!(column.end_b, top);
        assert_eq!(repo.position(column.end_a), Some(p(0.0, 0.0, 0.0)));

        // 同一位置再点一次
        assert!(matches!(
            click(&mut tool, &mut repo, p(0.0, 0.0, 0.0)),
            ToolOutcome::Conflict(Conflict::DuplicateMember { .. })
        ));
        assert_eq!(repo.member_count(), 1);
    }

    #[test]
    fn test_column_under_beam_creates_anchor_node() {
        let mut repo = Repository::new();
        let a = repo.add_node(p(0.0, 0.0, 3.0));
        let b = repo.add_node(p(8.0, 0.0, 3.0));
        repo.add_beam(a, b).expect("beam");
        let mut tool = AddColumnTool::new();

        let outcome = click(&mut tool, &mut repo, p(4.0, 0.0, 0.0));
        assert!(matches!(outcome, ToolOutcome::Created { .. }));
        assert_eq!(repo.node_count(), 4);
        assert!(repo.find_node_at(&p(4.0, 0.0, 3.0), 0.01).is_some());
    }

    #[test]
    fn test_missing_anchor_is_silent() {
        let mut repo = Repository::new();
        let mut tool = AddColumnTool::new();
        assert_eq!(click(&mut tool, &mut repo, p(0.0, 0.0, 0.0)), ToolOutcome::MissingAnchor);
        assert!(repo.is_empty());
    }
}
