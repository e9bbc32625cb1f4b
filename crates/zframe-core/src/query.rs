//! 空间查询
//!
//! 交互建模用到的几何查询：
//! - 按位置查找节点
//! - 点击测试（节点 > 构件 > 面构件）
//! - 竖向"正上方"投影，用于定位柱顶和墙顶
//! - 矩形框选

use crate::entity::{EntityId, EntityKind};
use crate::math::{distance_to_segment, point_in_polygon, xy, BoundingBox2, Point2, Point3};
use crate::repository::Repository;

/// 节点拾取容差（世界单位）
pub const NODE_TOLERANCE: f64 = 0.5;

/// 平面投影方向一致性阈值（单位向量点积）
const DIRECTION_AGREEMENT: f64 = 0.999;

impl Repository {
    /// 查找距离不超过 `tolerance` 的第一个节点（按规范顺序）
    pub fn find_node_at(&self, point: &Point3, tolerance: f64) -> Option<EntityId> {
        self.nodes()
            .find(|(_, node)| (node.position - point).norm() <= tolerance)
            .map(|(id, _)| id)
    }

    /// 复用该位置的节点，没有则新建
    pub fn node_at_or_insert(&mut self, point: &Point3) -> EntityId {
        match self.find_node_at(point, NODE_TOLERANCE) {
            Some(id) => id,
            None => self.add_node(*point),
        }
    }

    /// 点击测试
    ///
    /// 优先级：节点 > 构件（点到线段距离不超过 `member_tolerance`）> 面构件（XY 投影内）。
    pub fn hit_test(&self, point: &Point3, member_tolerance: f64) -> Option<EntityId> {
        if let Some(node) = self.find_node_at(point, NODE_TOLERANCE) {
            return Some(node);
        }

        let member = self.members().find(|(_, entity)| {
            entity.kind.as_member().is_some_and(|m| {
                match (self.position(m.end_a), self.position(m.end_b)) {
                    (Some(a), Some(b)) => distance_to_segment(point, &a, &b) <= member_tolerance,
                    _ => false,
                }
            })
        });
        if let Some((id, _)) = member {
            return Some(id);
        }

        let target = xy(point);
        self.planars()
            .find(|(_, entity)| {
                entity
                    .kind
                    .as_planar()
                    .is_some_and(|p| point_in_polygon(&target, &self.outline(&p.nodes)))
            })
            .map(|(id, _)| id)
    }

    /// 面构件节点的 XY 投影
    fn outline(&self, nodes: &[EntityId]) -> Vec<Point2> {
        nodes
            .iter()
            .filter_map(|n| self.position(*n))
            .map(|p| xy(&p))
            .collect()
    }

    /// 查找正上方最近的位置
    ///
    /// 先找 X、Y 完全相同且在上方的节点；没有时沿构件的平面轴线投影，
    /// 取构件在该水平距离处的点。两种情况都取高差最小者，相同时先找到的优先。
    pub fn position_above(&self, point: &Point3) -> Option<Point3> {
        let mut best: Option<(f64, Point3)> = None;

        for (_, node) in self.nodes() {
            if node.position.x == point.x && node.position.y == point.y {
                keep_nearest_above(&mut best, point, node.position);
            }
        }
        if let Some((_, found)) = best {
            return Some(found);
        }

        for (_, entity) in self.members() {
            let Some(member) = entity.kind.as_member() else {
                continue;
            };
            let (Some(a), Some(b)) = (self.position(member.end_a), self.position(member.end_b))
            else {
                continue;
            };

            let axis = xy(&b) - xy(&a);
            let offset = xy(point) - xy(&a);
            let plan_length = axis.norm();
            let offset_length = offset.norm();
            if plan_length == 0.0 || offset_length == 0.0 {
                continue;
            }

            if axis.dot(&offset) / (plan_length * offset_length) <= DIRECTION_AGREEMENT {
                continue;
            }
            let distance = axis.dot(&offset) / plan_length;
            if distance > plan_length {
                continue;
            }

            keep_nearest_above(&mut best, point, a + (b - a) * (distance / plan_length));
        }

        best.map(|(_, found)| found)
    }

    /// 正上方的节点：复用已有节点或新建
    pub fn node_above(&mut self, point: &Point3) -> Option<EntityId> {
        let above = self.position_above(point)?;
        Some(self.node_at_or_insert(&above))
    }

    /// 框选：所有节点都在矩形内，且存在于指定标高上的实体
    pub fn entities_in_rect(&self, rect: &BoundingBox2, elevation: f64) -> Vec<EntityId> {
        self.iter()
            .filter(|(id, entity)| {
                let positions: Vec<Point3> = match &entity.kind {
                    EntityKind::Node(node) => vec![node.position],
                    kind => kind
                        .node_refs()
                        .into_iter()
                        .filter_map(|n| self.position(n))
                        .collect(),
                };
                !positions.is_empty()
                    && positions.iter().all(|p| rect.contains(&xy(p)))
                    && self.exists_on_layer(*id, elevation)
            })
            .map(|(id, _)| id)
            .collect()
    }
}

/// 候选点在上方且高差严格小于当前最优时替换
fn keep_nearest_above(best: &mut Option<(f64, Point3)>, point: &Point3, candidate: Point3) {
    let dz = candidate.z - point.z;
    if dz > 0.0 && best.map_or(true, |(d, _)| dz < d) {
        *best = Some((dz, candidate));
    }
}

#[cfg(test)]
mod tests {
    use crate::entity::{Entity, EntityKind, Planar};
    use crate::math::{BoundingBox2, Point2, Point3};
    use crate::repository::Repository;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn square_floor(repo: &mut Repository, z: f64) -> crate::entity::EntityId {
        let nodes = vec![
            repo.add_node(p(0.0, 0.0, z)),
            repo.add_node(p(10.0, 0.0, z)),
            repo.add_node(p(10.0, 10.0, z)),
            repo.add_node(p(0.0, 10.0, z)),
        ];
        repo.add(Entity::new(EntityKind::Floor(Planar::new(nodes))))
            .expect("floor")
    }

    #[test]
    fn test_find_node_at() {
        let mut repo = Repository::new();
        let a = repo.add_node(p(0.0, 0.0, 0.0));
        assert_eq!(repo.find_node_at(&p(0.3, 0.4, 0.0), 0.5), Some(a));
        assert_eq!(repo.find_node_at(&p(0.4, 0.4, 0.0), 0.5), None);
    }

    #[test]
    fn test_hit_test_prefers_node_over_member() {
        let mut repo = Repository::new();
        let a = repo.add_node(p(0.0, 0.0, 0.0));
        let b = repo.add_node(p(10.0, 0.0, 0.0));
        let beam = repo.add_beam(a, b).expect("beam");

        assert_eq!(repo.hit_test(&p(0.1, 0.1, 0.0), 1.0), Some(a));
        assert_eq!(repo.hit_test(&p(5.0, 0.5, 0.0), 1.0), Some(beam));
        assert_eq!(repo.hit_test(&p(5.0, 2.0, 0.0), 1.0), None);
    }

    #[test]
    fn test_hit_test_point_in_polygon() {
        let mut repo = Repository::new();
        let floor = square_floor(&mut repo, 0.0);
        assert_eq!(repo.hit_test(&p(5.0, 5.0, 0.0), 0.5), Some(floor));
        assert_eq!(repo.hit_test(&p(15.0, 5.0, 0.0), 0.5), None);
    }

    #[test]
    fn test_position_above_nearest_node() {
        let mut repo = Repository::new();
        repo.add_node(p(0.0, 0.0, 0.0));
        repo.add_node(p(0.0, 0.0, 5.0));
        assert_eq!(repo.position_above(&p(0.0, 0.0, 0.0)), Some(p(0.0, 0.0, 5.0)));

        repo.add_node(p(0.0, 0.0, 3.0));
        assert_eq!(repo.position_above(&p(0.0, 0.0, 0.0)), Some(p(0.0, 0.0, 3.0)));
        assert_eq!(repo.position_above(&p(0.0, 0.0, 5.0)), None);
    }

    #[test]
    fn test_position_above_on_member() {
        let mut repo = Repository::new();
        let a = repo.add_node(p(0.0, 0.0, 3.0));
        let b = repo.add_node(p(10.0, 0.0, 5.0));
        repo.add_beam(a, b).expect("beam");

        // 斜梁中点正下方
        assert_eq!(repo.position_above(&p(5.0, 0.0, 0.0)), Some(p(5.0, 0.0, 4.0)));
        // 超出梁的水平长度
        assert_eq!(repo.position_above(&p(12.0, 0.0, 0.0)), None);
        // 不在梁轴线上
        assert_eq!(repo.position_above(&p(5.0, 3.0, 0.0)), None);
    }

    #[test]
    fn test_position_above_equal_height_members_first_wins() {
        let mut repo = Repository::new();
        // 两根同高的平行梁都在方向容差内
        for y in [0.02, 0.0] {
            let a = repo.add_node(p(0.0, y, 3.0));
            let b = repo.add_node(p(10.0, y, 3.0));
            repo.add_beam(a, b).expect("beam");
        }
        let c = repo.add_node(p(0.0, 0.01, 6.0));
        let d = repo.add_node(p(10.0, 0.01, 6.0));
        repo.add_beam(c, d).expect("beam");

        let first_y = repo
            .members()
            .filter_map(|(_, e)| e.kind.as_member())
            .filter_map(|m| repo.position(m.end_a))
            .find(|pt| pt.z == 3.0)
            .map(|pt| pt.y)
            .expect("beam at 3");

        let point = p(5.0, 0.01, 0.0);
        assert_eq!(repo.position_above(&point), Some(p(5.0, first_y, 3.0)));
        assert_eq!(repo.position_above(&point), repo.position_above(&point));
    }

    #[test]
    fn test_node_above_reuses_or_creates() {
        let mut repo = Repository::new();
        repo.add_node(p(0.0, 0.0, 0.0));
        let top = repo.add_node(p(0.0, 0.0, 3.0));
        assert_eq!(repo.node_above(&p(0.0, 0.0, 0.0)), Some(top));

        let a = repo.add_node(p(0.0, 5.0, 3.0));
        let b = repo.add_node(p(10.0, 5.0, 3.0));
        repo.add_beam(a, b).expect("beam");
        let count = repo.node_count();
        let created = repo.node_above(&p(4.0, 5.0, 0.0)).expect("node on beam");
        assert_eq!(repo.position(created), Some(p(4.0, 5.0, 3.0)));
        assert_eq!(repo.node_count(), count + 1);

        assert_eq!(repo.node_above(&p(50.0, 50.0, 0.0)), None);
    }

    #[test]
    fn test_entities_in_rect() {
        let mut repo = Repository::new();
        let floor = square_floor(&mut repo, 3.0);
        let outside = repo.add_node(p(20.0, 0.0, 3.0));

        let rect = BoundingBox2::new(Point2::new(-1.0, -1.0), Point2::new(11.0, 11.0));
        let found = repo.entities_in_rect(&rect, 3.0);
        assert_eq!(found.len(), 5);
        assert!(found.contains(&floor));
        assert!(!found.contains(&outside));

        // 其他标高上什么都没有
        assert!(repo.entities_in_rect(&rect, 0.0).is_empty());
    }
}
