//! 建模工具接口
//!
//! 每个工具是一个独立的 [`Tool`] 实现，内部用私有的状态枚举处理多步交互。
//! 传入的世界坐标已经过网格捕捉。工具直接修改仓库，
//! 再通过 [`ToolOutcome`] 告诉编辑会话发生了什么（新建、冲突、需要打开属性编辑器等）。

use thiserror::Error;
use zframe_core::entity::EntityId;
use zframe_core::math::Point3;
use zframe_core::repository::Repository;

/// 工具类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolType {
    Select,
    Move,
    AddNode,
    AddBeam,
    AddColumn,
    AddFloor,
    AddWall,
    AddShearWall,
}

impl ToolType {
    pub const ALL: [ToolType; 8] = [
        ToolType::Select,
        ToolType::Move,
        ToolType::AddNode,
        ToolType::AddBeam,
        ToolType::AddColumn,
        ToolType::AddFloor,
        ToolType::AddWall,
        ToolType::AddShearWall,
    ];

    /// 获取工具名称
    pub fn name(&self) -> &'static str {
        match self {
            ToolType::Select => "Select",
            ToolType::Move => "Move",
            ToolType::AddNode => "Node",
            ToolType::AddBeam => "Beam",
            ToolType::AddColumn => "Column",
            ToolType::AddFloor => "Floor",
            ToolType::AddWall => "Wall",
            ToolType::AddShearWall => "Shear Wall",
        }
    }

    /// 获取快捷键
    pub fn shortcut(&self) -> Option<&'static str> {
        match self {
            ToolType::Select => Some("Space"),
            ToolType::Move => Some("M"),
            ToolType::AddNode => Some("N"),
            ToolType::AddBeam => Some("B"),
            ToolType::AddColumn => Some("C"),
            ToolType::AddFloor => Some("F"),
            ToolType::AddWall => Some("W"),
            ToolType::AddShearWall => Some("SW"),
        }
    }
}

/// 键盘修饰键
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const SHIFT: u32 = 1 << 0;
    pub const CTRL: u32 = 1 << 1;
    pub const ALT: u32 = 1 << 2;

    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };

    /// 从视图传来的整数掩码解析
    pub fn from_mask(mask: u32) -> Self {
        Self {
            shift: mask & Self::SHIFT != 0,
            ctrl: mask & Self::CTRL != 0,
            alt: mask & Self::ALT != 0,
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    /// 没有按下任何修饰键
    pub fn is_empty(&self) -> bool {
        !(self.shift || self.ctrl || self.alt)
    }
}

/// 工具运行时上下文
pub struct ToolContext<'a> {
    pub repo: &'a mut Repository,
    /// 构件拾取容差（由视图的像素容差换算成世界单位）
    pub member_tolerance: f64,
}

impl<'a> ToolContext<'a> {
    pub fn new(repo: &'a mut Repository, member_tolerance: f64) -> Self {
        Self {
            repo,
            member_tolerance,
        }
    }

    /// 点击测试
    pub fn hit(&self, point: &Point3) -> Option<EntityId> {
        self.repo.hit_test(point, self.member_tolerance)
    }
}

/// 重复创建冲突
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Conflict {
    #[error("{existing_name} already connects these two nodes")]
    DuplicateMember {
        existing: EntityId,
        existing_name: String,
    },

    #[error("{existing_name} already uses exactly these nodes")]
    DuplicatePlanar {
        existing: EntityId,
        existing_name: String,
    },
}

/// 工具事件处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// 继续当前工具
    Continue,
    /// 新建了实体；`edit` 为真时应打开属性编辑器
    Created { id: EntityId, edit: bool },
    /// 打开属性编辑器
    Edit(EntityId),
    /// 与已有实体重复，没有修改模型
    Conflict(Conflict),
    /// 找不到上方的锚点，没有修改模型
    MissingAnchor,
    /// 选择状态变化
    SelectionChanged,
}

/// 预览图形（由视图绘制）
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Point(Point3),
    Segment(Point3, Point3),
    /// 水平矩形的两个对角
    Rectangle(Point3, Point3),
    Polygon(Vec<Point3>),
}

/// 工具接口
pub trait Tool {
    /// 获取工具类型
    fn tool_type(&self) -> ToolType;

    /// 获取工具名称
    fn name(&self) -> &str {
        self.tool_type().name()
    }

    /// 放弃未完成的操作
    fn reset(&mut self);

    // ========== 事件处理 ==========

    /// 单击
    fn on_click(&mut self, ctx: &mut ToolContext, point: Point3, modifiers: Modifiers)
        -> ToolOutcome;

    /// 鼠标移动
    fn on_mouse_move(&mut self, _ctx: &mut ToolContext, _point: Point3) -> ToolOutcome {
        ToolOutcome::Continue
    }

    /// 开始拖动
    fn on_begin_drag(
        &mut self,
        _ctx: &mut ToolContext,
        _point: Point3,
        _modifiers: Modifiers,
    ) -> ToolOutcome {
        ToolOutcome::Continue
    }

    /// 结束拖动
    fn on_end_drag(
        &mut self,
        _ctx: &mut ToolContext,
        _point: Point3,
        _modifiers: Modifiers,
    ) -> ToolOutcome {
        ToolOutcome::Continue
    }

    /// 双击：默认打开被点中实体的属性编辑器
    fn on_double_click(&mut self, ctx: &mut ToolContext, point: Point3) -> ToolOutcome {
        match ctx.hit(&point) {
            Some(id) => ToolOutcome::Edit(id),
            None => ToolOutcome::Continue,
        }
    }

    // ========== UI 提示 ==========

    /// 当前状态的提示文本
    fn prompt(&self) -> &str;

    /// 预览图形
    fn preview(&self, _repo: &Repository) -> Vec<Preview> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_from_mask() {
        assert_eq!(Modifiers::from_mask(0), Modifiers::NONE);
        assert!(Modifiers::from_mask(0).is_empty());

        let m = Modifiers::from_mask(Modifiers::CTRL | Modifiers::ALT);
        assert!(!m.shift && m.ctrl && m.alt);
        assert_eq!(Modifiers::from_mask(1), Modifiers { shift: true, ..Modifiers::NONE });
        // 高位忽略
        assert_eq!(Modifiers::from_mask(0b1010), Modifiers::ctrl());
    }

    #[test]
    fn test_tool_shortcuts_are_unique() {
        let mut keys: Vec<&str> = ToolType::ALL.iter().filter_map(|t| t.shortcut()).collect();
        assert_eq!(keys.len(), ToolType::ALL.len());
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), ToolType::ALL.len());
    }
}
