//! 连通性遍历
//!
//! 沿网格边做广度优先扩展，用于把权重从一个种子顶点
//! 洪泛到与之物理相连的整块区域。

use std::collections::{BTreeSet, VecDeque};

use super::Mesh;

/// 顶点邻接表（由面推导的边）
pub fn vertex_adjacency(mesh: &Mesh) -> Vec<Vec<u32>> {
    let mut adjacency = vec![Vec::new(); mesh.vertex_count()];
    for [a, b] in mesh.edges() {
        let (ai, bi) = (a as usize, b as usize);
        if ai < adjacency.len() && bi < adjacency.len() {
            adjacency[ai].push(b);
            adjacency[bi].push(a);
        }
    }
    adjacency
}

/// 从起点出发可达的全部顶点（含起点），每个顶点只访问一次
///
/// 起点越界时返回空集。
pub fn connected_component(mesh: &Mesh, start: u32) -> BTreeSet<u32> {
    let mut visited = BTreeSet::new();
    if start as usize >= mesh.vertex_count() {
        return visited;
    }

    let adjacency = vertex_adjacency(mesh);
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(v) = queue.pop_front() {
        for &other in &adjacency[v as usize] {
            if visited.insert(other) {
                queue.push_back(other);
            }
        }
    }

    visited
}
