//! 网格捕捉
//!
//! X、Y 分别就近取整到网格，Z 固定为当前显示图层的标高。

use crate::math::Point3;
use crate::repository::Repository;

/// 将单个坐标捕捉到网格
///
/// 余数绝对值小于半格时向下取整，否则远离零方向进一格。
pub fn snap_value(value: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 {
        return value;
    }
    let remainder = value % grid_size;
    if remainder.abs() < grid_size / 2.0 {
        value - remainder
    } else {
        value - remainder + grid_size * sign(value)
    }
}

/// 捕捉到网格并把 Z 设为给定标高
pub fn snap_to_grid(point: &Point3, grid_size: f64, elevation: f64) -> Point3 {
    Point3::new(
        snap_value(point.x, grid_size),
        snap_value(point.y, grid_size),
        elevation,
    )
}

fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl Repository {
    /// 捕捉到网格，Z 取当前显示图层标高（没有图层时为 0）
    pub fn snap(&self, point: &Point3, grid_size: f64) -> Point3 {
        snap_to_grid(point, grid_size, self.shown_elevation())
    }
}
