//! 顶点权重组

use std::collections::BTreeMap;

/// 权重写入模式（对应 VertexGroup.add 的 type 参数）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeightMode {
    /// 覆盖原权重
    Replace,
    /// 累加，上限 1.0
    Add,
    /// 扣减，降到 0 以下则移出组
    Subtract,
}

/// 命名顶点权重组：顶点索引 → 权重 [0, 1]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexGroup {
    name: String,
    weights: BTreeMap<u32, f32>,
}

impl VertexGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weights: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 顶点权重，不在组内时返回 None
    #[inline]
    pub fn weight(&self, vertex: u32) -> Option<f32> {
        self.weights.get(&vertex).copied()
    }

    #[inline]
    pub fn contains(&self, vertex: u32) -> bool {
        self.weights.contains_key(&vertex)
    }

    /// 设置单个顶点权重
    pub fn set(&mut self, vertex: u32, weight: f32) {
        self.weights.insert(vertex, weight.clamp(0.0, 1.0));
    }

    /// 批量写入权重
    pub fn add(&mut self, vertices: &[u32], weight: f32, mode: WeightMode) {
        for &v in vertices {
            match mode {
                WeightMode::Replace => self.set(v, weight),
                WeightMode::Add => {
                    let w = self.weight(v).unwrap_or(0.0) + weight;
                    self.set(v, w);
                }
                WeightMode::Subtract => {
                    if let Some(w) = self.weight(v) {
                        let w = w - weight;
                        if w <= 0.0 {
                            self.weights.remove(&v);
                        } else {
                            self.set(v, w);
                        }
                    }
                }
            }
        }
    }

    /// 按顶点索引升序遍历 (顶点, 权重)
    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.weights.iter().map(|(&v, &w)| (v, w))
    }

    /// 组内顶点索引（升序）
    pub fn vertices(&self) -> impl Iterator<Item = u32> + '_ {
        self.weights.keys().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// 整体替换权重表（焊接重映射使用）
    pub(crate) fn replace_weights(&mut self, weights: BTreeMap<u32, f32>) {
        self.weights = weights;
    }
}

// ============================================================================
// 顶点组集合
// ============================================================================

/// 网格上的顶点组集合，保持创建顺序
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexGroups {
    groups: Vec<VertexGroup>,
}

impl VertexGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// 通过名称查找
    pub fn get(&self, name: &str) -> Option<&VertexGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut VertexGroup> {
        self.groups.iter_mut().find(|g| g.name == name)
    }

    /// 获取组，不存在则新建
    pub fn ensure(&mut self, name: &str) -> &mut VertexGroup {
        let index = match self.groups.iter().position(|g| g.name == name) {
            Some(index) => index,
            None => {
                self.groups.push(VertexGroup::new(name));
                self.groups.len() - 1
            }
        };
        &mut self.groups[index]
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// 删除组，返回被删除的组
    pub fn remove(&mut self, name: &str) -> Option<VertexGroup> {
        let index = self.groups.iter().position(|g| g.name == name)?;
        Some(self.groups.remove(index))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.groups.iter().map(|g| g.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &VertexGroup> + '_ {
        self.groups.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut VertexGroup> + '_ {
        self.groups.iter_mut()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
