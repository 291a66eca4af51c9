//! 网格系统
//!
//! 宿主网格编辑缓冲区的最小实现：
//! - Mesh: 顶点 + 多边形面 + 顶点组，边由面推导
//! - KdTree: 只写一次的最近点查询结构
//! - connectivity: 沿网格边的广度优先连通遍历
//! - merge: 网格合并（join）与近重复顶点焊接（weld）

pub mod kdtree;
pub mod connectivity;
pub mod merge;
pub mod primitive;
mod vertex_group;

pub use kdtree::{KdTree, KdTreeBuilder, Nearest};
pub use connectivity::{connected_component, vertex_adjacency};
pub use merge::{join, weld, WeldReport};
pub use vertex_group::{VertexGroup, VertexGroups, WeightMode};

use std::collections::HashSet;

use glam::{Mat4, Vec3};

// ============================================================================
// 网格
// ============================================================================

/// 多边形网格
///
/// 面以顶点索引环表示（逆时针为正面），边不单独存储。
/// 顶点组按名称挂在网格上，与 Blender 的 deform layer 对应。
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    /// 网格数据名称
    pub name: String,
    /// 顶点位置（网格局部空间）
    pub vertices: Vec<Vec3>,
    /// 多边形面
    pub faces: Vec<Vec<u32>>,
    /// 顶点权重组
    pub groups: VertexGroups,
}

impl Mesh {
    /// 创建空网格
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// 追加顶点，返回新索引
    pub fn add_vertex(&mut self, position: Vec3) -> u32 {
        self.vertices.push(position);
        (self.vertices.len() - 1) as u32
    }

    /// 追加面
    pub fn add_face(&mut self, face: Vec<u32>) {
        self.faces.push(face);
    }

    /// 由面推导的无向边（按首次出现顺序，端点升序）
    pub fn edges(&self) -> Vec<[u32; 2]> {
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for face in &self.faces {
            let n = face.len();
            for i in 0..n {
                let key = edge_key(face[i], face[(i + 1) % n]);
                if key[0] != key[1] && seen.insert(key) {
                    edges.push(key);
                }
            }
        }
        edges
    }

    /// 面的包围盒中心（对应 calc_center_bounds）
    pub fn face_center_bounds(&self, face_index: usize) -> Option<Vec3> {
        let face = self.faces.get(face_index)?;
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for &v in face {
            let p = *self.vertices.get(v as usize)?;
            min = min.min(p);
            max = max.max(p);
        }
        if face.is_empty() {
            return None;
        }
        Some((min + max) * 0.5)
    }

    /// 将矩阵烘焙进顶点位置
    pub fn apply_transform(&mut self, matrix: Mat4) {
        for v in &mut self.vertices {
            *v = matrix.transform_point3(*v);
        }
    }

    /// 构建覆盖全部顶点的 KD 树（id 即顶点索引）
    pub fn kdtree(&self) -> KdTree {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (*v, i))
            .collect::<KdTreeBuilder>()
            .balance()
    }
}

/// 无向边规范化键
#[inline]
pub(crate) fn edge_key(a: u32, b: u32) -> [u32; 2] {
    if a <= b { [a, b] } else { [b, a] }
}
