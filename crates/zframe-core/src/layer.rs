//! 楼层图层
//!
//! 图层是按标高划分的水平切片，始终按标高升序排列，标高互不相同。

use crate::error::LayerError;

/// 图层
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub elevation: f64,
}

impl Layer {
    pub fn new(name: impl Into<String>, elevation: f64) -> Self {
        Self {
            name: name.into(),
            elevation,
        }
    }
}

/// 图层列表和当前显示图层
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
    shown: Option<usize>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从任意顺序的图层列表构建（不检查标高重复），显示最低图层
    pub fn from_layers(mut layers: Vec<Layer>) -> Self {
        layers.sort_by(|a, b| a.elevation.total_cmp(&b.elevation));
        let shown = if layers.is_empty() { None } else { Some(0) };
        Self { layers, shown }
    }

    /// 按标高插入图层
    pub fn insert(&mut self, layer: Layer) -> Result<usize, LayerError> {
        if self.layers.iter().any(|l| l.elevation == layer.elevation) {
            return Err(LayerError::Collision(layer.elevation));
        }

        let index = self
            .layers
            .partition_point(|l| l.elevation < layer.elevation);
        self.layers.insert(index, layer);

        // 保持显示的仍是同一个图层；没有显示图层时显示新图层
        match self.shown.as_mut() {
            Some(shown) if *shown >= index => *shown += 1,
            Some(_) => {}
            None => self.shown = Some(index),
        }
        Ok(index)
    }

    /// 删除图层
    pub fn remove(&mut self, index: usize) -> Result<Layer, LayerError> {
        if index >= self.layers.len() {
            return Err(LayerError::NotFound(index));
        }
        let layer = self.layers.remove(index);

        self.shown = match self.shown {
            _ if self.layers.is_empty() => None,
            Some(shown) if shown == index => Some(index.min(self.layers.len() - 1)),
            Some(shown) if shown > index => Some(shown - 1),
            other => other,
        };
        Ok(layer)
    }

    /// 设置显示图层
    pub fn show(&mut self, index: usize) -> Result<(), LayerError> {
        if index >= self.layers.len() {
            return Err(LayerError::NotFound(index));
        }
        self.shown = Some(index);
        Ok(())
    }

    pub fn shown_index(&self) -> Option<usize> {
        self.shown
    }

    pub fn shown(&self) -> Option<&Layer> {
        self.shown.and_then(|i| self.layers.get(i))
    }

    /// 当前显示图层的标高，没有图层时为 0
    pub fn shown_elevation(&self) -> f64 {
        self.shown().map_or(0.0, |l| l.elevation)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
