//! 结构实体定义
//!
//! 实体种类是一个封闭集合：节点、梁、柱、楼板、墙、剪力墙。
//! 构件（梁/柱）和面构件（楼板/墙/剪力墙）通过 [`EntityId`] 句柄引用节点，
//! 节点本身由 [`Repository`](crate::repository::Repository) 持有。
//!
//! 每种实体提供：
//! - 同类排序比较（决定编号）
//! - 字段读写协议（文件编解码和属性编辑共用）
//! - 节点引用查询（删除检查、图层可见性）

use crate::error::ModelError;
use crate::math::Point3;
use std::cmp::Ordering;

slotmap::new_key_type! {
    /// 实体句柄
    ///
    /// 在仓库内稳定，不随重新编号变化。
    pub struct EntityId;
}

/// 平面投影判定为"水平"的容差（方向向量 y 分量）
const PLAN_HORIZONTAL_TOLERANCE: f64 = 0.01;

/// 实体类型
///
/// 声明顺序即排序优先级。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityType {
    Node,
    Beam,
    Column,
    ShearWall,
    Wall,
    Floor,
}

impl EntityType {
    pub const ALL: [EntityType; 6] = [
        EntityType::Node,
        EntityType::Beam,
        EntityType::Column,
        EntityType::ShearWall,
        EntityType::Wall,
        EntityType::Floor,
    ];

    /// 排序优先级
    pub fn precedence(self) -> usize {
        self as usize
    }

    /// 获取类型名称
    pub fn name(self) -> &'static str {
        match self {
            EntityType::Node => "Node",
            EntityType::Beam => "Beam",
            EntityType::Column => "Column",
            EntityType::ShearWall => "ShearWall",
            EntityType::Wall => "Wall",
            EntityType::Floor => "Floor",
        }
    }

    /// 所属编号族
    pub fn family(self) -> Family {
        match self {
            EntityType::Node => Family::Node,
            EntityType::Beam | EntityType::Column => Family::Member,
            EntityType::ShearWall | EntityType::Wall | EntityType::Floor => Family::Planar,
        }
    }
}

/// 编号族：同一族内的实体共享一套连续编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Node,
    Member,
    Planar,
}

/// 节点
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub position: Point3,
}

impl Node {
    pub fn new(position: Point3) -> Self {
        Self { position }
    }
}

/// 线构件（梁或柱）
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub end_a: EntityId,
    pub end_b: EntityId,
    /// 截面名称
    pub section: String,
    /// 创建时端点是否被交换过
    pub ends_swapped: bool,
}

impl Member {
    /// 按节点规范顺序创建构件
    ///
    /// `end_a` 总是规范顺序靠前的节点；若与传入顺序相反则记录 `ends_swapped`。
    pub fn between(a: EntityId, position_a: &Point3, b: EntityId, position_b: &Point3) -> Self {
        let swapped = compare_positions(position_a, position_b) == Ordering::Greater;
        let (end_a, end_b) = if swapped { (b, a) } else { (a, b) };
        Self {
            end_a,
            end_b,
            section: String::new(),
            ends_swapped: swapped,
        }
    }

    /// 是否连接给定的两个节点（不分方向）
    pub fn connects(&self, a: EntityId, b: EntityId) -> bool {
        (self.end_a == a && self.end_b == b) || (self.end_a == b && self.end_b == a)
    }
}

/// 楼板传力方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpanDirection {
    #[default]
    X,
    Y,
    XY,
    None,
}

impl SpanDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SpanDirection::X => "X",
            SpanDirection::Y => "Y",
            SpanDirection::XY => "XY",
            SpanDirection::None => "NONE",
        }
    }

    /// 解析方向文本，无法识别时为 X
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "Y" => SpanDirection::Y,
            "XY" => SpanDirection::XY,
            "NONE" => SpanDirection::None,
            _ => SpanDirection::X,
        }
    }

    /// X 与 Y 之间切换
    pub fn toggled(self) -> Self {
        match self {
            SpanDirection::X => SpanDirection::Y,
            _ => SpanDirection::X,
        }
    }
}

/// 面构件（楼板、墙、剪力墙）
#[derive(Debug, Clone, PartialEq)]
pub struct Planar {
    /// 有序节点（决定多边形绕向）
    pub nodes: Vec<EntityId>,
    pub section: String,
    /// 荷载（仅楼板和墙）
    pub load: f64,
    /// 传力方向（仅楼板）
    pub span: SpanDirection,
}

impl Planar {
    pub fn new(nodes: Vec<EntityId>) -> Self {
        Self {
            nodes,
            section: String::new(),
            load: 0.0,
            span: SpanDirection::default(),
        }
    }

    /// 节点集合是否相同（忽略顺序）
    pub fn same_node_set(&self, nodes: &[EntityId]) -> bool {
        if self.nodes.len() != nodes.len() {
            return false;
        }
        let mut mine = self.nodes.clone();
        let mut theirs = nodes.to_vec();
        mine.sort();
        theirs.sort();
        mine == theirs
    }
}

/// 实体数据
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Node(Node),
    Beam(Member),
    Column(Member),
    Floor(Planar),
    Wall(Planar),
    ShearWall(Planar),
}

impl EntityKind {
    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityKind::Node(_) => EntityType::Node,
            EntityKind::Beam(_) => EntityType::Beam,
            EntityKind::Column(_) => EntityType::Column,
            EntityKind::Floor(_) => EntityType::Floor,
            EntityKind::Wall(_) => EntityType::Wall,
            EntityKind::ShearWall(_) => EntityType::ShearWall,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            EntityKind::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_member(&self) -> Option<&Member> {
        match self {
            EntityKind::Beam(member) | EntityKind::Column(member) => Some(member),
            _ => None,
        }
    }

    pub fn as_planar(&self) -> Option<&Planar> {
        match self {
            EntityKind::Floor(planar) | EntityKind::Wall(planar) | EntityKind::ShearWall(planar) => {
                Some(planar)
            }
            _ => None,
        }
    }

    pub fn as_planar_mut(&mut self) -> Option<&mut Planar> {
        match self {
            EntityKind::Floor(planar) | EntityKind::Wall(planar) | EntityKind::ShearWall(planar) => {
                Some(planar)
            }
            _ => None,
        }
    }

    /// 引用的节点（按顺序）
    pub fn node_refs(&self) -> Vec<EntityId> {
        match self {
            EntityKind::Node(_) => Vec::new(),
            EntityKind::Beam(m) | EntityKind::Column(m) => vec![m.end_a, m.end_b],
            EntityKind::Floor(p) | EntityKind::Wall(p) | EntityKind::ShearWall(p) => p.nodes.clone(),
        }
    }

    /// 是否引用指定节点
    pub fn references(&self, node: EntityId) -> bool {
        match self {
            EntityKind::Node(_) => false,
            EntityKind::Beam(m) | EntityKind::Column(m) => m.end_a == node || m.end_b == node,
            EntityKind::Floor(p) | EntityKind::Wall(p) | EntityKind::ShearWall(p) => {
                p.nodes.contains(&node)
            }
        }
    }
}

/// 仓库中的实体
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    pub selected: bool,
    /// 族内编号，由仓库在每次结构变化后重新计算
    pub(crate) number: usize,
}

impl Entity {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            selected: false,
            number: 0,
        }
    }

    /// 族内编号（非稳定标识）
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn entity_type(&self) -> EntityType {
        self.kind.entity_type()
    }

    /// 写出字段
    ///
    /// `number_of` 把节点句柄解析为节点编号。截面为空时省略。
    pub fn save(
        &self,
        number_of: &dyn Fn(EntityId) -> usize,
        emit: &mut dyn FnMut(&str, String),
    ) {
        emit("id", self.number.to_string());
        emit("selected", self.selected.to_string());

        match &self.kind {
            EntityKind::Node(node) => {
                emit("position", crate::math::format_point3(&node.position));
            }
            EntityKind::Beam(member) | EntityKind::Column(member) => {
                emit("end_a", number_of(member.end_a).to_string());
                emit("end_b", number_of(member.end_b).to_string());
                if !member.section.is_empty() {
                    emit("section", member.section.clone());
                }
            }
            EntityKind::Floor(planar) | EntityKind::Wall(planar) | EntityKind::ShearWall(planar) => {
                emit("node_count", planar.nodes.len().to_string());
                for (i, node) in planar.nodes.iter().enumerate() {
                    emit(&format!("node_{i}"), number_of(*node).to_string());
                }
                if !planar.section.is_empty() {
                    emit("section", planar.section.clone());
                }
            }
        }

        match &self.kind {
            EntityKind::Floor(planar) => {
                emit("load", planar.load.to_string());
                emit("direction", planar.span.as_str().to_string());
            }
            EntityKind::Wall(planar) => {
                emit("load", planar.load.to_string());
            }
            _ => {}
        }
    }

    /// 读入可编辑字段
    ///
    /// 缺失的字段保持当前值。节点引用不在此处理（由调用方按编号解析）。
    pub fn load(&mut self, read: &dyn Fn(&str) -> Option<String>) -> Result<(), ModelError> {
        match &mut self.kind {
            EntityKind::Node(node) => {
                if let Some(text) = read("position") {
                    node.position = crate::math::parse_point3(&text)
                        .ok_or_else(|| invalid_field("position", &text))?;
                }
            }
            EntityKind::Beam(member) | EntityKind::Column(member) => {
                if let Some(section) = read("section") {
                    member.section = section;
                }
            }
            EntityKind::Floor(planar) | EntityKind::Wall(planar) | EntityKind::ShearWall(planar) => {
                if let Some(section) = read("section") {
                    planar.section = section;
                }
            }
        }

        match &mut self.kind {
            EntityKind::Floor(planar) => {
                planar.load = read_f64(read, "load", planar.load)?;
                if let Some(text) = read("direction") {
                    planar.span = SpanDirection::parse(&text);
                }
            }
            EntityKind::Wall(planar) => {
                planar.load = read_f64(read, "load", planar.load)?;
            }
            _ => {}
        }

        Ok(())
    }
}

fn invalid_field(key: &str, value: &str) -> ModelError {
    ModelError::InvalidField {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn read_f64(
    read: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: f64,
) -> Result<f64, ModelError> {
    match read(key) {
        Some(text) => text.trim().parse().map_err(|_| invalid_field(key, &text)),
        None => Ok(default),
    }
}

/// 节点规范顺序：(z, y, x) 升序
pub fn compare_positions(a: &Point3, b: &Point3) -> Ordering {
    a.z.total_cmp(&b.z)
        .then_with(|| a.y.total_cmp(&b.y))
        .then_with(|| a.x.total_cmp(&b.x))
}

/// 按类型优先级和同类排序键比较两个实体
///
/// `position` 把节点句柄解析为坐标。
pub fn compare_entities(
    a: &EntityKind,
    b: &EntityKind,
    position: &dyn Fn(EntityId) -> Point3,
) -> Ordering {
    a.entity_type()
        .precedence()
        .cmp(&b.entity_type().precedence())
        .then_with(|| match (a, b) {
            (EntityKind::Node(na), EntityKind::Node(nb)) => {
                compare_positions(&na.position, &nb.position)
            }
            (EntityKind::Beam(ma), EntityKind::Beam(mb)) => beam_key(ma, position)
                .partial_cmp(&beam_key(mb, position))
                .unwrap_or(Ordering::Equal),
            (EntityKind::Column(ma), EntityKind::Column(mb)) => column_key(ma, position)
                .partial_cmp(&column_key(mb, position))
                .unwrap_or(Ordering::Equal),
            (EntityKind::Floor(pa), EntityKind::Floor(pb)) => floor_key(pa, position)
                .partial_cmp(&floor_key(pb, position))
                .unwrap_or(Ordering::Equal),
            // 墙和剪力墙没有排序键，依赖稳定排序保持插入顺序
            _ => Ordering::Equal,
        })
}

/// 梁排序键：平面投影水平者优先，然后按两端最大 z、y、x
fn beam_key(member: &Member, position: &dyn Fn(EntityId) -> Point3) -> (u8, f64, f64, f64) {
    let a = position(member.end_a);
    let b = position(member.end_b);
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let plan_length = (dx * dx + dy * dy).sqrt();
    let horizontal = plan_length > 0.0 && (dy / plan_length).abs() < PLAN_HORIZONTAL_TOLERANCE;
    (
        u8::from(!horizontal),
        a.z.max(b.z),
        a.y.max(b.y),
        a.x.max(b.x),
    )
}

/// 柱排序键：较低端点的 z、y、x
fn column_key(member: &Member, position: &dyn Fn(EntityId) -> Point3) -> (f64, f64, f64) {
    let a = position(member.end_a);
    let b = position(member.end_b);
    let lower = if b.z < a.z { b } else { a };
    (lower.z, lower.y, lower.x)
}

/// 楼板排序键：第一与第三节点中点的标高，然后是中点到原点的距离
fn floor_key(planar: &Planar, position: &dyn Fn(EntityId) -> Point3) -> (f64, f64) {
    match (planar.nodes.first(), planar.nodes.get(2)) {
        (Some(&first), Some(&third)) => {
            let mid = nalgebra::center(&position(first), &position(third));
            (mid.z, mid.coords.norm())
        }
        _ => (0.0, 0.0),
    }
}
