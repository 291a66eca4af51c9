//! 网格合并与焊接
//!
//! join: 按顺序拼接多个网格，顶点组按名称取并集。
//! weld: 合并距离阈值内的重复顶点，保留先出现的顶点。

use std::collections::BTreeMap;

use glam::Mat4;

use super::{KdTreeBuilder, Mesh};
use crate::{BonePhysError, Result};

/// 焊接时判定两组权重一致的容差
const WEIGHT_EPSILON: f32 = 1e-6;

/// 焊接结果
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WeldReport {
    /// 被合并掉的顶点数
    pub removed: usize,
    /// 被丢弃的退化面数
    pub dropped_faces: usize,
}

/// 将源网格拼接进目标网格
///
/// 每个源网格先经各自矩阵变换到目标空间。
/// 同名顶点组取并集，组顺序按首次出现。
pub fn join(target: &mut Mesh, sources: &[(&Mesh, Mat4)]) {
    for (source, matrix) in sources {
        let offset = target.vertices.len() as u32;

        target
            .vertices
            .extend(source.vertices.iter().map(|v| matrix.transform_point3(*v)));
        target.faces.extend(
            source
                .faces
                .iter()
                .map(|face| face.iter().map(|&v| v + offset).collect::<Vec<_>>()),
        );

        for group in source.groups.iter() {
            let merged = target.groups.ensure(group.name());
            for (v, w) in group.iter() {
                merged.set(v + offset, w);
            }
        }
    }
}

/// 焊接距离阈值内的重复顶点
///
/// 顶点按索引顺序访问；后出现且落在已保留顶点阈值内的顶点并入该顶点，
/// 位置不做插值。被并入顶点的组成员关系并入保留顶点；
/// 若两者同属某组但权重不一致，返回 WeldWeightConflict 且网格不变。
pub fn weld(mesh: &mut Mesh, tolerance: f32) -> Result<WeldReport> {
    let count = mesh.vertex_count();
    let tree = mesh.kdtree();

    let mut remap: Vec<Option<u32>> = vec![None; count];
    let mut kept: Vec<usize> = Vec::with_capacity(count);
    let mut merges: Vec<(u32, u32)> = Vec::new();

    for i in 0..count {
        if remap[i].is_some() {
            continue;
        }
        let new_index = kept.len() as u32;
        kept.push(i);
        remap[i] = Some(new_index);

        for hit in tree.find_range(mesh.vertices[i], tolerance) {
            if hit.id > i && remap[hit.id].is_none() {
                remap[hit.id] = Some(new_index);
                merges.push((i as u32, hit.id as u32));
            }
        }
    }

    if merges.is_empty() {
        return Ok(WeldReport::default());
    }

    // 先校验，再修改
    for &(keep, merged) in &merges {
        for group in mesh.groups.iter() {
            if let (Some(a), Some(b)) = (group.weight(keep), group.weight(merged)) {
                if (a - b).abs() > WEIGHT_EPSILON {
                    return Err(BonePhysError::WeldWeightConflict {
                        group: group.name().to_string(),
                        kept: keep,
                        merged,
                    });
                }
            }
        }
    }

    let index_of = |v: u32| remap[v as usize].unwrap_or(v);

    mesh.vertices = kept.iter().map(|&i| mesh.vertices[i]).collect();

    let mut dropped_faces = 0;
    let faces = std::mem::take(&mut mesh.faces);
    for face in faces {
        let mut ring: Vec<u32> = Vec::with_capacity(face.len());
        for &v in &face {
            let nv = index_of(v);
            if ring.last() != Some(&nv) {
                ring.push(nv);
            }
        }
        while ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        let mut distinct = ring.clone();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() < 3 {
            dropped_faces += 1;
            continue;
        }
        mesh.faces.push(ring);
    }

    for group in mesh.groups.iter_mut() {
        let mut weights = BTreeMap::new();
        // 升序遍历：保留顶点的索引总是小于被并入顶点
        for (v, w) in group.iter() {
            weights.entry(index_of(v)).or_insert(w);
        }
        group.replace_weights(weights);
    }

    let report = WeldReport {
        removed: count - kept.len(),
        dropped_faces,
    };
    log::debug!(
        "[BonePhys] weld '{}': 合并 {} 个顶点, 丢弃 {} 个退化面",
        mesh.name, report.removed, report.dropped_faces
    );
    Ok(report)
}
