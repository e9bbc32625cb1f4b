//! 数学基础类型
//!
//! 基于 nalgebra 的 2D/3D 点和向量，以及框架模型需要的几个几何工具：
//! - 点的文本格式 `"x y [z]"`
//! - 点到线段距离（钳制投影）
//! - 射线法点在多边形内判断
//! - 轴对齐包围盒

use std::str::FromStr;

/// 2D 点
pub type Point2 = nalgebra::Point2<f64>;
/// 3D 点
pub type Point3 = nalgebra::Point3<f64>;
/// 3D 向量
pub type Vector3 = nalgebra::Vector3<f64>;

/// 将 3D 点格式化为 `"x y z"`
pub fn format_point3(point: &Point3) -> String {
    format!("{} {} {}", point.x, point.y, point.z)
}

/// 解析 `"x y"` 或 `"x y z"`，缺省的 z 为 0
pub fn parse_point3(text: &str) -> Option<Point3> {
    let mut parts = text.split_whitespace().map(f64::from_str);
    let x = parts.next()?.ok()?;
    let y = parts.next()?.ok()?;
    let z = match parts.next() {
        Some(v) => v.ok()?,
        None => 0.0,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(Point3::new(x, y, z))
}

/// 点到线段的距离（钳制投影）
pub fn distance_to_segment(point: &Point3, start: &Point3, end: &Point3) -> f64 {
    let v = end - start;
    let w = point - start;

    let c1 = w.dot(&v);
    if c1 <= 0.0 {
        return (point - start).norm();
    }

    let c2 = v.dot(&v);
    if c2 <= c1 {
        return (point - end).norm();
    }

    let b = c1 / c2;
    let pb = start + v * b;
    (point - pb).norm()
}

/// 射线法（交叉数）判断点是否在 XY 平面投影多边形内
pub fn point_in_polygon(point: &Point2, polygon: &[Point2]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// 2D 轴对齐包围盒
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox2 {
    pub min: Point2,
    pub max: Point2,
}

impl BoundingBox2 {
    /// 由两个对角点创建（自动规范化）
    pub fn new(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// 检查点是否在包围盒内（含边界）
    pub fn contains(&self, point: &Point2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// 取 XY 投影
pub fn xy(point: &Point3) -> Point2 {
    Point2::new(point.x, point.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-10;

    #[test]
    fn test_point_text() {
        let p = Point3::new(1.5, -2.0, 3.0);
        assert_eq!(format_point3(&p), "1.5 -2 3");
        assert_eq!(parse_point3("1.5 -2 3"), Some(p));
        assert_eq!(parse_point3("4 5"), Some(Point3::new(4.0, 5.0, 0.0)));
        assert_eq!(parse_point3("4"), None);
        assert_eq!(parse_point3("1 2 3 4"), None);
        assert_eq!(parse_point3("  7   8 "), Some(Point3::new(7.0, 8.0, 0.0)));
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(10.0, 0.0, 0.0);
        assert!((distance_to_segment(&Point3::new(5.0, 3.0, 0.0), &a, &b) - 3.0).abs() < EPSILON);
        // 投影落在线段外侧时取端点距离
        assert!((distance_to_segment(&Point3::new(-3.0, 4.0, 0.0), &a, &b) - 5.0).abs() < EPSILON);
        assert!((distance_to_segment(&Point3::new(13.0, 4.0, 0.0), &a, &b) - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_point_in_polygon() {
        let square = [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(&Point2::new(5.0, 5.0), &square));
        assert!(!point_in_polygon(&Point2::new(15.0, 5.0), &square));
        assert!(!point_in_polygon(&Point2::new(5.0, -1.0), &square));
    }

    #[test]
    fn test_bounding_box() {
        let bbox = BoundingBox2::new(Point2::new(10.0, 0.0), Point2::new(0.0, 5.0));
        assert_eq!(bbox.min, Point2::new(0.0, 0.0));
        assert_eq!(bbox.width(), 10.0);
        assert_eq!(bbox.height(), 5.0);
        assert!(bbox.contains(&Point2::new(10.0, 5.0)));
        assert!(!bbox.contains(&Point2::new(10.1, 5.0)));
    }
}
