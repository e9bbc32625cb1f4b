//! 记录类型名
//!
//! 文件中的类型名有两代写法：旧版 `frame.<Kind>` 和当前的 `zframe.model.<Kind>`。
//! 读取时两者都识别，写出时只用当前写法。旧版的 `frame.FrameType` 记录可以识别但会被丢弃。

use zframe_core::entity::EntityType;

/// 记录的含义
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Entity(EntityType),
    Layer,
    /// 已废弃，读入后丢弃
    Discarded,
}

/// 当前写法前缀
pub const CURRENT_PREFIX: &str = "zframe.model.";

/// 旧版写法前缀
pub const LEGACY_PREFIX: &str = "frame.";

const LAYER: &str = "Layer";
const FRAME_TYPE: &str = "FrameType";

/// 解析类型名（两代写法都接受）
pub fn lookup(type_name: &str) -> Option<RecordKind> {
    let short = type_name
        .strip_prefix(CURRENT_PREFIX)
        .or_else(|| type_name.strip_prefix(LEGACY_PREFIX))?;

    if short == LAYER {
        return Some(RecordKind::Layer);
    }
    if short == FRAME_TYPE {
        return Some(RecordKind::Discarded);
    }
    EntityType::ALL
        .into_iter()
        .find(|t| t.name() == short)
        .map(RecordKind::Entity)
}

/// 写出用的类型名
pub fn type_name(kind: RecordKind) -> String {
    let short = match kind {
        RecordKind::Entity(entity_type) => entity_type.name(),
        RecordKind::Layer => LAYER,
        RecordKind::Discarded => FRAME_TYPE,
    };
    format!("{CURRENT_PREFIX}{short}")
}
