//! 模型仓库
//!
//! 所有实体和图层的唯一数据源。实体存放在 slotmap 中，构件通过句柄引用节点，
//! 并维护"节点 -> 引用它的实体"反向索引，使删除检查只需遍历实际引用。
//!
//! 每次结构变化后仓库按 (类型优先级, 同类排序键) 做稳定排序，
//! 并为节点、构件、面构件三个编号族重新分配连续编号。

use crate::entity::{
    compare_entities, Entity, EntityId, EntityKind, EntityType, Family, Member, Node, Planar,
    SpanDirection,
};
use crate::error::{LayerError, ModelError};
use crate::layer::{Layer, LayerStack};
use crate::math::{Point3, Vector3};
use slotmap::SlotMap;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// 仓库变化通知
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    /// 实体增删、几何或属性变化
    Changed { revision: u64 },
    /// 选择状态变化
    SelectionChanged,
    /// 图层列表或显示图层变化
    LayersChanged,
}

/// 变化监听器
pub type Listener = Box<dyn FnMut(&ModelEvent)>;

/// 节点删除检查结果
#[derive(Debug, Clone, PartialEq)]
pub enum Removability {
    Removable,
    Blocked { reason: String },
}

/// 模型仓库
pub struct Repository {
    entities: SlotMap<EntityId, Entity>,
    /// 全局排序后的实体列表
    order: Vec<EntityId>,
    /// 节点 -> 引用该节点的构件/面构件
    references: HashMap<EntityId, HashSet<EntityId>>,
    layers: LayerStack,
    /// 批量装载时暂停逐个排序
    deferred: bool,
    revision: u64,
    listeners: Vec<Listener>,
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("nodes", &self.node_count())
            .field("members", &self.member_count())
            .field("planars", &self.planar_count())
            .field("layers", &self.layers.len())
            .field("revision", &self.revision)
            .finish()
    }
}

impl Repository {
    /// 创建空仓库
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            order: Vec::new(),
            references: HashMap::new(),
            layers: LayerStack::new(),
            deferred: false,
            revision: 0,
            listeners: Vec::new(),
        }
    }

    /// 创建用于批量装载的暂存仓库
    ///
    /// 暂存仓库的 `add` 不排序、不编号、不通知，装载完成后交给 [`Repository::bulk_install`]。
    pub fn staging() -> Self {
        Self {
            deferred: true,
            ..Self::new()
        }
    }

    /// 注册变化监听器
    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// 变化计数（每次结构或属性变化递增）
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ========== 增删 ==========

    /// 添加实体
    ///
    /// 所有节点引用必须指向仓库中现有的节点。
    pub fn add(&mut self, entity: Entity) -> Result<EntityId, ModelError> {
        self.validate(&entity.kind)?;
        let id = self.insert(entity);
        if !self.deferred {
            self.restructure();
        }
        Ok(id)
    }

    /// 添加节点
    pub fn add_node(&mut self, position: Point3) -> EntityId {
        let id = self.insert(Entity::new(EntityKind::Node(Node::new(position))));
        if !self.deferred {
            self.restructure();
        }
        id
    }

    /// 在两个节点之间添加梁（端点按规范顺序排列）
    pub fn add_beam(&mut self, a: EntityId, b: EntityId) -> Result<EntityId, ModelError> {
        let member = self.canonical_member(a, b)?;
        self.add(Entity::new(EntityKind::Beam(member)))
    }

    /// 在两个节点之间添加柱（端点按规范顺序排列）
    pub fn add_column(&mut self, a: EntityId, b: EntityId) -> Result<EntityId, ModelError> {
        let member = self.canonical_member(a, b)?;
        self.add(Entity::new(EntityKind::Column(member)))
    }

    /// 按节点规范顺序构造构件
    pub fn canonical_member(&self, a: EntityId, b: EntityId) -> Result<Member, ModelError> {
        let pa = self.position(a).ok_or(ModelError::DanglingReference(a))?;
        let pb = self.position(b).ok_or(ModelError::DanglingReference(b))?;
        Ok(Member::between(a, &pa, b, &pb))
    }

    /// 删除实体
    ///
    /// 不存在时返回 `Ok(None)`。仍被构件引用的节点不能删除。
    pub fn remove(&mut self, id: EntityId) -> Result<Option<Entity>, ModelError> {
        let Some(entity) = self.entities.get(id) else {
            return Ok(None);
        };

        if entity.entity_type() == EntityType::Node {
            if let Removability::Blocked { reason } = self.check_node_removable(id) {
                return Err(ModelError::NodeInUse {
                    number: entity.number,
                    reason,
                });
            }
        }

        let Some(entity) = self.entities.remove(id) else {
            return Ok(None);
        };
        self.order.retain(|e| *e != id);
        self.references.remove(&id);
        for node in entity.kind.node_refs() {
            if let Some(users) = self.references.get_mut(&node) {
                users.remove(&id);
            }
        }

        if !self.deferred {
            self.restructure();
        }
        Ok(Some(entity))
    }

    /// 检查节点能否删除
    pub fn check_node_removable(&self, node: EntityId) -> Removability {
        let users = match self.references.get(&node) {
            Some(users) if !users.is_empty() => users,
            _ => return Removability::Removable,
        };

        let first = users
            .iter()
            .filter_map(|id| self.entities.get(*id))
            .min_by_key(|e| (e.entity_type().precedence(), e.number));

        let reason = match first {
            Some(user) if users.len() == 1 => {
                format!("used by {} {}", user.entity_type().name(), user.number)
            }
            Some(user) => format!(
                "used by {} {} and {} other element(s)",
                user.entity_type().name(),
                user.number,
                users.len() - 1
            ),
            None => "used by another element".to_string(),
        };
        Removability::Blocked { reason }
    }

    /// 用暂存仓库整体替换当前内容
    ///
    /// 只做一次排序、编号和图层排序，显示最低图层，并且只发出一次通知。
    pub fn bulk_install(&mut self, staged: Repository) {
        self.entities = staged.entities;
        self.order = staged.order;
        self.references = staged.references;
        self.layers = LayerStack::from_layers(staged.layers.layers().to_vec());
        self.deferred = false;

        tracing::debug!(
            "Bulk install: {} entities, {} layers",
            self.order.len(),
            self.layers.len()
        );

        self.restructure();
        self.notify(ModelEvent::LayersChanged);
    }

    /// 清空为新文档
    pub fn reset(&mut self) {
        self.entities.clear();
        self.order.clear();
        self.references.clear();
        self.layers = LayerStack::new();
        self.restructure();
        self.notify(ModelEvent::LayersChanged);
    }

    fn validate(&self, kind: &EntityKind) -> Result<(), ModelError> {
        match kind {
            EntityKind::Node(_) => {}
            EntityKind::Beam(m) | EntityKind::Column(m) => {
                if m.end_a == m.end_b {
                    return Err(ModelError::DegenerateMember);
                }
            }
            EntityKind::Floor(p) | EntityKind::Wall(p) | EntityKind::ShearWall(p) => {
                if p.nodes.len() < 3 {
                    return Err(ModelError::TooFewNodes(p.nodes.len()));
                }
            }
        }

        for node in kind.node_refs() {
            if self.node(node).is_none() {
                return Err(ModelError::DanglingReference(node));
            }
        }
        Ok(())
    }

    fn insert(&mut self, entity: Entity) -> EntityId {
        let refs = entity.kind.node_refs();
        let id = self.entities.insert(entity);
        self.order.push(id);
        for node in refs {
            self.references.entry(node).or_default().insert(id);
        }
        id
    }

    /// 稳定排序、重新编号并通知
    fn restructure(&mut self) {
        let entities = &self.entities;
        let position = |id: EntityId| match entities.get(id).map(|e| &e.kind) {
            Some(EntityKind::Node(node)) => node.position,
            _ => Point3::origin(),
        };
        self.order
            .sort_by(|a, b| compare_entities(&entities[*a].kind, &entities[*b].kind, &position));

        let mut counters: HashMap<Family, usize> = HashMap::new();
        for id in &self.order {
            let entity = &mut self.entities[*id];
            let counter = counters.entry(entity.entity_type().family()).or_insert(0);
            entity.number = *counter;
            *counter += 1;
        }

        self.revision += 1;
        tracing::debug!(
            "Renumbered model: {} nodes, {} members, {} planars (revision {})",
            counters.get(&Family::Node).copied().unwrap_or(0),
            counters.get(&Family::Member).copied().unwrap_or(0),
            counters.get(&Family::Planar).copied().unwrap_or(0),
            self.revision
        );
        self.notify(ModelEvent::Changed {
            revision: self.revision,
        });
    }

    fn notify(&mut self, event: ModelEvent) {
        if self.deferred {
            return;
        }
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    // ========== 查询 ==========

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    pub fn node(&self, id: EntityId) -> Option<&Node> {
        self.entities.get(id).and_then(|e| e.kind.as_node())
    }

    pub fn member(&self, id: EntityId) -> Option<&Member> {
        self.entities.get(id).and_then(|e| e.kind.as_member())
    }

    pub fn planar(&self, id: EntityId) -> Option<&Planar> {
        self.entities.get(id).and_then(|e| e.kind.as_planar())
    }

    /// 节点坐标
    pub fn position(&self, id: EntityId) -> Option<Point3> {
        self.node(id).map(|n| n.position)
    }

    /// 实体的族内编号
    pub fn number(&self, id: EntityId) -> Option<usize> {
        self.entities.get(id).map(Entity::number)
    }

    /// 按全局顺序遍历所有实体
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.order.iter().map(move |id| (*id, &self.entities[*id]))
    }

    /// 按规范顺序遍历节点
    pub fn nodes(&self) -> impl Iterator<Item = (EntityId, &Node)> + '_ {
        self.iter().filter_map(|(id, e)| e.kind.as_node().map(|n| (id, n)))
    }

    /// 按编号顺序遍历构件
    pub fn members(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.iter()
            .filter(|(_, e)| e.entity_type().family() == Family::Member)
    }

    /// 按编号顺序遍历面构件
    pub fn planars(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.iter()
            .filter(|(_, e)| e.entity_type().family() == Family::Planar)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn count(&self, family: Family) -> usize {
        self.iter()
            .filter(|(_, e)| e.entity_type().family() == family)
            .count()
    }

    pub fn node_count(&self) -> usize {
        self.count(Family::Node)
    }

    pub fn member_count(&self) -> usize {
        self.count(Family::Member)
    }

    pub fn planar_count(&self) -> usize {
        self.count(Family::Planar)
    }

    /// 查找连接两个节点的构件（不分方向）
    pub fn find_member(&self, a: EntityId, b: EntityId) -> Option<EntityId> {
        let users = self.references.get(&a)?;
        self.iter()
            .filter(|(id, _)| users.contains(id))
            .find(|(_, e)| e.kind.as_member().is_some_and(|m| m.connects(a, b)))
            .map(|(id, _)| id)
    }

    /// 查找节点集合完全相同的面构件（不分顺序）
    pub fn find_planar(&self, nodes: &[EntityId]) -> Option<EntityId> {
        let users = self.references.get(nodes.first()?)?;
        self.iter()
            .filter(|(id, _)| users.contains(id))
            .find(|(_, e)| e.kind.as_planar().is_some_and(|p| p.same_node_set(nodes)))
            .map(|(id, _)| id)
    }

    /// 实体是否存在于指定标高的图层上
    ///
    /// 节点标高相等；构件标高介于两端之间；面构件标高介于节点最低和最高之间（均含边界）。
    pub fn exists_on_layer(&self, id: EntityId, elevation: f64) -> bool {
        let Some(entity) = self.entities.get(id) else {
            return false;
        };
        match &entity.kind {
            EntityKind::Node(node) => node.position.z == elevation,
            kind => {
                let zs: Vec<f64> = kind
                    .node_refs()
                    .into_iter()
                    .filter_map(|n| self.position(n))
                    .map(|p| p.z)
                    .collect();
                if zs.is_empty() {
                    return false;
                }
                let min = zs.iter().copied().fold(f64::INFINITY, f64::min);
                let max = zs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                elevation >= min && elevation <= max
            }
        }
    }

    // ========== 编辑 ==========

    /// 平移节点
    pub fn translate_nodes(&mut self, nodes: &[EntityId], delta: Vector3) {
        let mut moved = 0;
        for id in nodes {
            if let Some(EntityKind::Node(node)) = self.entities.get_mut(*id).map(|e| &mut e.kind) {
                node.position += delta;
                moved += 1;
            }
        }
        if moved > 0 && !self.deferred {
            self.restructure();
        }
    }

    /// 属性编辑器读取的字段
    pub fn properties(&self, id: EntityId) -> Option<Vec<(String, String)>> {
        let entity = self.entities.get(id)?;
        let mut fields = Vec::new();
        let number_of = |node: EntityId| self.number(node).unwrap_or(0);
        entity.save(&number_of, &mut |key, value| fields.push((key.to_string(), value)));
        Some(fields)
    }

    /// 写回属性编辑器修改的字段
    pub fn apply_properties(
        &mut self,
        id: EntityId,
        fields: &[(String, String)],
    ) -> Result<(), ModelError> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or(ModelError::EntityNotFound(id))?;
        let read = |key: &str| {
            fields
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };
        entity.load(&read)?;
        self.restructure();
        Ok(())
    }

    /// 设置楼板传力方向
    pub fn set_span_direction(
        &mut self,
        id: EntityId,
        span: SpanDirection,
    ) -> Result<(), ModelError> {
        match self.entities.get_mut(id).map(|e| &mut e.kind) {
            Some(EntityKind::Floor(floor)) => floor.span = span,
            _ => return Err(ModelError::EntityNotFound(id)),
        }
        self.revision += 1;
        self.notify(ModelEvent::Changed {
            revision: self.revision,
        });
        Ok(())
    }

    // ========== 选择 ==========

    pub fn is_selected(&self, id: EntityId) -> bool {
        self.entities.get(id).is_some_and(|e| e.selected)
    }

    pub fn set_selected(&mut self, id: EntityId, selected: bool) {
        if let Some(entity) = self.entities.get_mut(id) {
            if entity.selected != selected {
                entity.selected = selected;
                self.notify(ModelEvent::SelectionChanged);
            }
        }
    }

    pub fn toggle_selected(&mut self, id: EntityId) {
        if let Some(entity) = self.entities.get_mut(id) {
            entity.selected = !entity.selected;
            self.notify(ModelEvent::SelectionChanged);
        }
    }

    /// 清除所有选择
    pub fn clear_selection(&mut self) {
        let mut changed = false;
        for entity in self.entities.values_mut() {
            changed |= entity.selected;
            entity.selected = false;
        }
        if changed {
            self.notify(ModelEvent::SelectionChanged);
        }
    }

    /// 选中的实体（全局顺序）
    pub fn selected(&self) -> Vec<EntityId> {
        self.iter()
            .filter(|(_, e)| e.selected)
            .map(|(id, _)| id)
            .collect()
    }

    // ========== 图层 ==========

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// 添加图层，标高重复时失败
    pub fn add_layer(&mut self, layer: Layer) -> Result<usize, LayerError> {
        let index = self.layers.insert(layer)?;
        self.notify(ModelEvent::LayersChanged);
        Ok(index)
    }

    pub fn remove_layer(&mut self, index: usize) -> Result<Layer, LayerError> {
        let layer = self.layers.remove(index)?;
        self.notify(ModelEvent::LayersChanged);
        Ok(layer)
    }

    pub fn show_layer(&mut self, index: usize) -> Result<(), LayerError> {
        self.layers.show(index)?;
        self.notify(ModelEvent::LayersChanged);
        Ok(())
    }

    /// 当前显示图层的标高，没有图层时为 0
    pub fn shown_elevation(&self) -> f64 {
        self.layers.shown_elevation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// 检查三个编号族都是 0..n 且符合排序规则
    fn assert_numbering(repo: &Repository) {
        for family in [Family::Node, Family::Member, Family::Planar] {
            let numbers: Vec<usize> = repo
                .iter()
                .filter(|(_, e)| e.entity_type().family() == family)
                .map(|(_, e)| e.number())
                .collect();
            let expected: Vec<usize> = (0..numbers.len()).collect();
            assert_eq!(numbers, expected, "{family:?} numbering");
        }

        let positions: Vec<Point3> = repo.nodes().map(|(_, n)| n.position).collect();
        for pair in positions.windows(2) {
            assert_ne!(
                crate::entity::compare_positions(&pair[0], &pair[1]),
                std::cmp::Ordering::Greater
            );
        }

        for (_, entity) in repo.iter() {
            for node in entity.kind.node_refs() {
                assert!(repo.node(node).is_some());
            }
        }
    }

    #[test]
    fn test_numbering_invariant_across_add_remove() {
        let mut repo = Repository::new();
        let n0 = repo.add_node(p(0.0, 0.0, 3.0));
        let n1 = repo.add_node(p(0.0, 0.0, 0.0));
        let n2 = repo.add_node(p(5.0, 0.0, 3.0));
        let n3 = repo.add_node(p(5.0, 5.0, 3.0));
        assert_numbering(&repo);
        assert_eq!(repo.number(n1), Some(0));

        let col = repo.add_column(n0, n1).expect("column");
        let beam = repo.add_beam(n0, n2).expect("beam");
        assert_numbering(&repo);
        // 梁优先于柱
        assert_eq!(repo.number(beam), Some(0));
        assert_eq!(repo.number(col), Some(1));

        let floor = repo
            .add(Entity::new(EntityKind::Floor(Planar::new(vec![n0, n2, n3]))))
            .expect("floor");
        assert_numbering(&repo);

        repo.remove(beam).expect("remove beam");
        assert_numbering(&repo);
        assert_eq!(repo.number(col), Some(0));

        repo.remove(floor).expect("remove floor");
        repo.remove(n3).expect("remove node");
        assert_numbering(&repo);
        assert_eq!(repo.node_count(), 3);
    }

    #[test]
    fn test_walls_keep_insertion_order() {
        let mut repo = Repository::new();
        let nodes: Vec<_> = [
            p(0.0, 0.0, 0.0),
            p(5.0, 0.0, 0.0),
            p(5.0, 0.0, 3.0),
            p(0.0, 0.0, 3.0),
            p(0.0, 5.0, 0.0),
            p(0.0, 5.0, 3.0),
        ]
        .into_iter()
        .map(|pt| repo.add_node(pt))
        .collect();

        // 第二面墙的坐标更小，但墙没有排序键
        let w1 = repo
            .add(Entity::new(EntityKind::Wall(Planar::new(vec![
                nodes[1], nodes[4], nodes[5], nodes[2],
            ]))))
            .expect("w1");
        let w2 = repo
            .add(Entity::new(EntityKind::Wall(Planar::new(vec![
                nodes[0], nodes[1], nodes[2], nodes[3],
            ]))))
            .expect("w2");
        assert!(repo.number(w1) < repo.number(w2));

        // 任意重排后仍保持
        repo.add_node(p(-1.0, -1.0, -1.0));
        repo.translate_nodes(&[nodes[0]], Vector3::new(0.0, 0.0, 10.0));
        assert!(repo.number(w1) < repo.number(w2));
        assert_numbering(&repo);
    }

    #[test]
    fn test_member_endpoint_canonicalization() {
        let mut repo = Repository::new();
        let top = repo.add_node(p(0.0, 0.0, 3.0));
        let bottom = repo.add_node(p(0.0, 0.0, 0.0));
        let col = repo.add_column(top, bottom).expect("column");
        let member = repo.member(col).expect("member");
        assert_eq!(member.end_a, bottom);
        assert!(member.ends_swapped);
        assert_eq!(repo.find_member(bottom, top), Some(col));
        assert_eq!(repo.find_member(top, bottom), Some(col));
    }

    #[test]
    fn test_add_rejects_dangling_and_degenerate() {
        let mut repo = Repository::new();
        let a = repo.add_node(p(0.0, 0.0, 0.0));
        let b = repo.add_node(p(1.0, 0.0, 0.0));
        repo.remove(b).expect("remove");

        assert_eq!(repo.add_beam(a, b), Err(ModelError::DanglingReference(b)));
        assert_eq!(repo.add_beam(a, a), Err(ModelError::DegenerateMember));
        assert_eq!(
            repo.add(Entity::new(EntityKind::Floor(Planar::new(vec![a, a])))),
            Err(ModelError::TooFewNodes(2))
        );
    }

    #[test]
    fn test_remove_guards_referenced_node() {
        let mut repo = Repository::new();
        let a = repo.add_node(p(0.0, 0.0, 0.0));
        let b = repo.add_node(p(4.0, 0.0, 0.0));
        let beam = repo.add_beam(a, b).expect("beam");

        assert_eq!(
            repo.check_node_removable(a),
            Removability::Blocked {
                reason: "used by Beam 0".to_string()
            }
        );
        assert!(matches!(
            repo.remove(a),
            Err(ModelError::NodeInUse { number: 0, .. })
        ));
        assert!(repo.contains(a));

        repo.remove(beam).expect("remove beam");
        assert_eq!(repo.check_node_removable(a), Removability::Removable);
        assert!(repo.remove(a).expect("remove node").is_some());
        // 再次删除是空操作
        assert_eq!(repo.remove(a), Ok(None));
    }

    #[test]
    fn test_bulk_install_notifies_once() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut repo = Repository::new();
        let sink = Rc::clone(&events);
        repo.subscribe(Box::new(move |e: &ModelEvent| sink.borrow_mut().push(e.clone())));

        let mut staged = Repository::staging();
        let a = staged.add_node(p(0.0, 0.0, 3.0));
        let b = staged.add_node(p(0.0, 0.0, 0.0));
        staged.add_column(a, b).expect("column");
        staged.add_layer(Layer::new("2F", 3.0)).expect("layer");
        staged.add_layer(Layer::new("1F", 0.0)).expect("layer");
        assert_eq!(staged.revision(), 0);

        repo.bulk_install(staged);

        let events = events.borrow();
        let changed = events
            .iter()
            .filter(|e| matches!(e, ModelEvent::Changed { .. }))
            .count();
        let layers = events
            .iter()
            .filter(|e| matches!(e, ModelEvent::LayersChanged))
            .count();
        assert_eq!((changed, layers), (1, 1));
        assert_eq!(repo.number(b), Some(0));
        assert_eq!(repo.layers().shown().map(|l| l.name.as_str()), Some("1F"));
        assert_numbering(&repo);
    }

    #[test]
    fn test_exists_on_layer() {
        let mut repo = Repository::new();
        let a = repo.add_node(p(0.0, 0.0, 0.0));
        let b = repo.add_node(p(0.0, 0.0, 3.0));
        let col = repo.add_column(a, b).expect("column");

        assert!(repo.exists_on_layer(a, 0.0));
        assert!(!repo.exists_on_layer(a, 3.0));
        assert!(repo.exists_on_layer(col, 0.0));
        assert!(repo.exists_on_layer(col, 1.5));
        assert!(repo.exists_on_layer(col, 3.0));
        assert!(!repo.exists_on_layer(col, 3.5));
    }

    #[test]
    fn test_properties_round_trip() {
        let mut repo = Repository::new();
        let a = repo.add_node(p(0.0, 0.0, 0.0));
        let b = repo.add_node(p(4.0, 0.0, 0.0));
        let beam = repo.add_beam(a, b).expect("beam");

        repo.apply_properties(beam, &[("section".to_string(), "H400x200".to_string())])
            .expect("apply");
        let fields = repo.properties(beam).expect("fields");
        assert!(fields.contains(&("section".to_string(), "H400x200".to_string())));
        assert!(fields.contains(&("end_b".to_string(), "1".to_string())));

        repo.apply_properties(a, &[("position".to_string(), "10 0 0".to_string())])
            .expect("move node");
        // 节点移动后重新编号
        assert_eq!(repo.number(a), Some(1));
    }

    #[test]
    fn test_selection() {
        let mut repo = Repository::new();
        let a = repo.add_node(p(0.0, 0.0, 0.0));
        let b = repo.add_node(p(1.0, 0.0, 0.0));
        repo.set_selected(a, true);
        repo.toggle_selected(b);
        assert_eq!(repo.selected(), vec![a, b]);
        repo.toggle_selected(b);
        assert_eq!(repo.selected(), vec![a]);
        repo.clear_selection();
        assert!(repo.selected().is_empty());
    }
}
