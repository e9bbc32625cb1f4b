//! 编辑会话状态
//!
//! [`Editor`] 持有模型仓库、当前工具和配置，是宿主 UI 唯一需要调用的入口：
//! 把视图的指针事件转交给当前工具，并提供新建、打开、保存、删除选择、
//! 图层和显示开关等命令。需要告知用户的消息和待打开的属性编辑器
//! 分别积累在队列中，由宿主取走。

use crate::config::EditorConfig;
use crate::tool::{Modifiers, Preview, Tool, ToolContext, ToolOutcome, ToolType};
use crate::tools::create_tool;
use std::path::{Path, PathBuf};
use zframe_core::entity::{EntityId, EntityType};
use zframe_core::error::LayerError;
use zframe_core::layer::Layer;
use zframe_core::math::Point3;
use zframe_core::repository::{Removability, Repository};
use zframe_file::FileError;

/// 编辑会话
pub struct Editor {
    repo: Repository,
    config: EditorConfig,
    tool: Box<dyn Tool>,
    /// 待显示给用户的消息
    notices: Vec<String>,
    /// 待打开属性编辑器的实体
    pending_edits: Vec<EntityId>,
    /// 当前文档路径
    path: Option<PathBuf>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            repo: Repository::new(),
            config,
            tool: create_tool(ToolType::Select),
            notices: Vec::new(),
            pending_edits: Vec::new(),
            path: None,
        }
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// 属性编辑器、监听器注册等直接访问仓库
    pub fn repo_mut(&mut self) -> &mut Repository {
        &mut self.repo
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // ========== 工具 ==========

    pub fn tool_type(&self) -> ToolType {
        self.tool.tool_type()
    }

    /// 切换工具，放弃当前工具未完成的操作
    pub fn set_tool(&mut self, tool_type: ToolType) {
        if self.tool.tool_type() == tool_type {
            self.tool.reset();
            return;
        }
        tracing::debug!("Switching tool: {} -> {}", self.tool.name(), tool_type.name());
        self.tool = create_tool(tool_type);
    }

    /// 取消当前操作
    pub fn cancel(&mut self) {
        self.tool.reset();
    }

    pub fn prompt(&self) -> &str {
        self.tool.prompt()
    }

    pub fn preview(&self) -> Vec<Preview> {
        self.tool.preview(&self.repo)
    }

    /// 对视图坐标做网格捕捉（Z 取当前图层标高）
    pub fn snap(&self, point: &Point3) -> Point3 {
        if self.config.snap_enabled {
            self.repo.snap(point, self.config.snap_spacing)
        } else {
            Point3::new(point.x, point.y, self.repo.shown_elevation())
        }
    }

    // ========== 指针事件 ==========

    pub fn click(&mut self, point: Point3, modifier_mask: u32) -> ToolOutcome {
        let point = self.snap(&point);
        let modifiers = Modifiers::from_mask(modifier_mask);
        let mut ctx = ToolContext::new(&mut self.repo, self.config.member_tolerance);
        let outcome = self.tool.on_click(&mut ctx, point, modifiers);
        self.handle(outcome)
    }

    pub fn mouse_move(&mut self, point: Point3) -> ToolOutcome {
        let point = self.snap(&point);
        let mut ctx = ToolContext::new(&mut self.repo, self.config.member_tolerance);
        let outcome = self.tool.on_mouse_move(&mut ctx, point);
        self.handle(outcome)
    }

    pub fn begin_drag(&mut self, point: Point3, modifier_mask: u32) -> ToolOutcome {
        let point = self.snap(&point);
        let modifiers = Modifiers::from_mask(modifier_mask);
        let mut ctx = ToolContext::new(&mut self.repo, self.config.member_tolerance);
        let outcome = self.tool.on_begin_drag(&mut ctx, point, modifiers);
        self.handle(outcome)
    }

    pub fn end_drag(&mut self, point: Point3, modifier_mask: u32) -> ToolOutcome {
        let point = self.snap(&point);
        let modifiers = Modifiers::from_mask(modifier_mask);
        let mut ctx = ToolContext::new(&mut self.repo, self.config.member_tolerance);
        let outcome = self.tool.on_end_drag(&mut ctx, point, modifiers);
        self.handle(outcome)
    }

    pub fn double_click(&mut self, point: Point3) -> ToolOutcome {
        let point = self.snap(&point);
        let mut ctx = ToolContext::new(&mut self.repo, self.config.member_tolerance);
        let outcome = self.tool.on_double_click(&mut ctx, point);
        self.handle(outcome)
    }

    /// 把工具结果转成消息或属性编辑请求
    fn handle(&mut self, outcome: ToolOutcome) -> ToolOutcome {
        match &outcome {
            ToolOutcome::Created { id, edit: true } | ToolOutcome::Edit(id) => {
                self.pending_edits.push(*id);
            }
            ToolOutcome::Conflict(conflict) => {
                tracing::debug!("Tool conflict: {}", conflict);
                self.notices.push(conflict.to_string());
            }
            _ => {}
        }
        outcome
    }

    /// 取走待显示的消息
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    /// 取走待打开属性编辑器的实体（已被删除的会被过滤）
    pub fn take_pending_edits(&mut self) -> Vec<EntityId> {
        let repo = &self.repo;
        std::mem::take(&mut self.pending_edits)
            .into_iter()
            .filter(|id| repo.contains(*id))
            .collect()
    }

    // ========== 文档 ==========

    /// 新建空文档
    pub fn new_document(&mut self) {
        self.tool.reset();
        self.repo.reset();
        self.pending_edits.clear();
        self.path = None;
    }

    /// 从文本打开文档，失败时当前文档不变
    pub fn open_text(&mut self, text: &str) -> Result<(), FileError> {
        zframe_file::decode_into(&mut self.repo, text)?;
        self.tool.reset();
        self.pending_edits.clear();
        self.path = None;
        Ok(())
    }

    /// 编码当前文档
    pub fn save_text(&self) -> String {
        zframe_file::encode(&self.repo)
    }

    /// 从文件打开文档，失败时当前文档不变
    pub fn open(&mut self, path: &Path) -> Result<(), FileError> {
        zframe_file::load_into(&mut self.repo, path)?;
        self.tool.reset();
        self.pending_edits.clear();
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// 保存到文件并记住路径
    pub fn save(&mut self, path: &Path) -> Result<(), FileError> {
        zframe_file::save(&self.repo, path)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    // ========== 编辑命令 ==========

    /// 删除选中的实体
    ///
    /// 先删构件和面构件，再删节点；仍被引用的节点保留并生成消息。
    /// 返回删除的数量。
    pub fn delete_selection(&mut self) -> usize {
        self.tool.reset();
        let selected = self.repo.selected();
        let (nodes, others): (Vec<EntityId>, Vec<EntityId>) = selected
            .into_iter()
            .partition(|id| self.repo.get(*id).map(|e| e.entity_type()) == Some(EntityType::Node));

        let mut removed = 0;
        for id in others.into_iter().chain(nodes) {
            if let Removability::Blocked { reason } = self.repo.check_node_removable(id) {
                let number = self.repo.number(id).unwrap_or(0);
                self.notices
                    .push(format!("Node {number} cannot be removed: {reason}"));
                continue;
            }
            match self.repo.remove(id) {
                Ok(Some(_)) => removed += 1,
                Ok(None) => {}
                Err(e) => self.notices.push(e.to_string()),
            }
        }

        tracing::debug!("Deleted {} selected entities", removed);
        removed
    }

    // ========== 显示 ==========

    pub fn toggle_grid(&mut self) -> bool {
        self.config.grid_visible = !self.config.grid_visible;
        self.config.grid_visible
    }

    pub fn toggle_snap(&mut self) -> bool {
        self.config.snap_enabled = !self.config.snap_enabled;
        self.config.snap_enabled
    }

    pub fn toggle_3d(&mut self) -> bool {
        self.config.view_3d = !self.config.view_3d;
        self.config.view_3d
    }

    /// 设置网格间距（非正值忽略）
    pub fn set_grid_spacing(&mut self, spacing: f64) -> bool {
        if spacing <= 0.0 {
            tracing::warn!("Ignoring non-positive grid spacing {}", spacing);
            return false;
        }
        self.config.grid_spacing = spacing;
        true
    }

    /// 设置捕捉间距（非正值忽略）
    pub fn set_snap_spacing(&mut self, spacing: f64) -> bool {
        if spacing <= 0.0 {
            tracing::warn!("Ignoring non-positive snap spacing {}", spacing);
            return false;
        }
        self.config.snap_spacing = spacing;
        true
    }

    // ========== 图层 ==========

    pub fn add_layer(&mut self, name: &str, elevation: f64) -> Result<usize, LayerError> {
        self.repo.add_layer(Layer::new(name, elevation))
    }

    pub fn remove_layer(&mut self, index: usize) -> Result<Layer, LayerError> {
        self.repo.remove_layer(index)
    }

    /// 切换显示图层，放弃未完成的操作（标高已变化）
    pub fn show_layer(&mut self, index: usize) -> Result<(), LayerError> {
        self.repo.show_layer(index)?;
        self.tool.reset();
        Ok(())
    }
}
