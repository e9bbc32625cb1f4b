//! ZFrame 交互层
//!
//! - `tool`: 工具接口、修饰键、工具结果和预览
//! - `tools`: 选择、移动和各类建模工具
//! - `state`: 编辑会话，宿主 UI 的命令入口
//! - `config`: 编辑器配置

pub mod config;
pub mod state;
pub mod tool;
pub mod tools;

pub use config::{ConfigError, EditorConfig};
pub use state::Editor;
pub use tool::{Conflict, Modifiers, Preview, Tool, ToolContext, ToolOutcome, ToolType};
