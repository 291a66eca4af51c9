//! 顶点组分配
//!
//! - assign_stiff / assign_pole: 单个碰撞盒上按最近点定位地标
//! - assign_ik_targets: 合并后按骨骼头尾位置划分 IK 目标与 pin 点，并洪泛父骨骼影响
//! - finalize_partition: stiff / pin 严格二分
//!
//! 查找不到的组一律跳过，不视为错误。

use std::collections::BTreeSet;

use super::{ik_group_name, pole_name, HEAD_CO, PIN_GROUP, POLE_CO, STIFF_GROUP, TAIL_CO};
use crate::mesh::{connected_component, KdTreeBuilder, Mesh, WeightMode};
use crate::physics::get_config;
use crate::skeleton::{Armature, BoneLink};

/// IK 分组统计
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IkAssignment {
    /// 写入 `<bone>_bonephys_ik` 的顶点数
    pub ik_targets: usize,
    /// 作为 pin 点处理的 stiff 顶点数
    pub pins: usize,
    /// 洪泛写入父骨骼组的顶点数
    pub propagated: usize,
}

/// 标记头尾地标为 stiff，返回 [头, 尾] 顶点索引
pub fn assign_stiff(mesh: &mut Mesh) -> Option<[u32; 2]> {
    mesh.groups.ensure(STIFF_GROUP);

    let tree = mesh.kdtree();
    let head = tree.find_nearest(HEAD_CO)?.id as u32;
    let tail = tree.find_nearest(TAIL_CO)?.id as u32;

    let group = mesh.groups.ensure(STIFF_GROUP);
    group.set(head, 1.0);
    group.set(tail, 1.0);
    Some([head, tail])
}

/// 标记极向地标，组名为碰撞盒名去掉 `_col` 后接 `_pt`
pub fn assign_pole(mesh: &mut Mesh, box_name: &str) -> Option<u32> {
    let stem = box_name.strip_suffix("_col").unwrap_or(box_name);
    let group_name = format!("{stem}_pt");
    mesh.groups.ensure(&group_name);

    let pole = mesh.kdtree().find_nearest(POLE_CO)?.id as u32;
    mesh.groups.ensure(&group_name).set(pole, 1.0);
    Some(pole)
}

/// 在空的合并载体上预建顶点组
///
/// 顺序：stiff、pin，然后每根骨骼依次为父骨骼组（如有）、IK 组、极向组。
pub fn init_collider_groups(mesh: &mut Mesh, armature: &Armature, bone_names: &[String]) {
    mesh.groups.ensure(STIFF_GROUP);
    mesh.groups.ensure(PIN_GROUP);
    for name in bone_names {
        if let Some(parent) = armature.parent_of(name) {
            mesh.groups.ensure(&parent.name);
        }
        mesh.groups.ensure(&ik_group_name(name));
        mesh.groups.ensure(&pole_name(name));
    }
}

/// 合并碰撞体上的 IK 目标分配
///
/// 对每个 stiff 满权重顶点：
/// - 与某骨骼尾端重合 → 写入该骨骼的 IK 组
/// - 否则为 pin 点：找最近骨骼头部，若其父骨骼有同名组，
///   从该顶点洪泛整块连通区域写入父骨骼组
pub fn assign_ik_targets(mesh: &mut Mesh, armature: &Armature, bone_names: &[String]) -> IkAssignment {
    let config = get_config();
    let tolerance = config.landmark_tolerance;
    let mut report = IkAssignment::default();

    let stiff: Vec<u32> = match mesh.groups.get(STIFF_GROUP) {
        Some(group) => group
            .iter()
            .filter(|(_, w)| (w - 1.0).abs() < tolerance)
            .map(|(v, _)| v)
            .collect(),
        None => {
            log::debug!("[BonePhys] '{}' 没有 stiff 组，跳过 IK 分配", mesh.name);
            return report;
        }
    };

    let bones: Vec<&BoneLink> = bone_names.iter().filter_map(|n| armature.bone(n)).collect();
    let tail_tree = bones
        .iter()
        .enumerate()
        .map(|(i, b)| (b.tail, i))
        .collect::<KdTreeBuilder>()
        .balance();
    let head_tree = bones
        .iter()
        .enumerate()
        .map(|(i, b)| (b.head, i))
        .collect::<KdTreeBuilder>()
        .balance();

    for v in stiff {
        let Some(&co) = mesh.vertices.get(v as usize) else {
            continue;
        };
        let Some(tail_hit) = tail_tree.find_nearest(co) else {
            continue;
        };

        if tail_hit.distance() < tolerance {
            let group_name = ik_group_name(&bones[tail_hit.id].name);
            match mesh.groups.get_mut(&group_name) {
                Some(group) => {
                    group.set(v, 1.0);
                    report.ik_targets += 1;
                }
                None => log::debug!("[BonePhys] 缺少 IK 组 '{}'，跳过顶点 {}", group_name, v),
            }
            continue;
        }

        mesh.groups.ensure(PIN_GROUP).set(v, 1.0);
        report.pins += 1;

        let Some(head_hit) = head_tree.find_nearest(co) else {
            continue;
        };
        let Some(parent) = armature.parent_of(&bones[head_hit.id].name) else {
            continue;
        };
        if !mesh.groups.contains(&parent.name) {
            log::debug!("[BonePhys] 缺少父骨骼组 '{}'，跳过影响传播", parent.name);
            continue;
        }

        let component = connected_component(mesh, v);
        if let Some(group) = mesh.groups.get_mut(&parent.name) {
            for &c in &component {
                group.set(c, 1.0);
            }
            report.propagated += component.len();
        }
        if config.debug_log {
            log::debug!(
                "[BonePhys] pin 顶点 {} → 父骨骼 '{}' 影响 {} 个顶点",
                v, parent.name, component.len()
            );
        }
    }

    report
}

/// stiff / pin 二分：stiff 成员 pin = 0，其余顶点 pin = 1
pub fn finalize_partition(mesh: &mut Mesh) {
    let stiff: BTreeSet<u32> = mesh
        .groups
        .get(STIFF_GROUP)
        .map(|g| g.vertices().collect())
        .unwrap_or_default();
    let (members, others): (Vec<u32>, Vec<u32>) =
        (0..mesh.vertex_count() as u32).partition(|v| stiff.contains(v));

    let pin = mesh.groups.ensure(PIN_GROUP);
    pin.add(&members, 0.0, WeightMode::Replace);
    pin.add(&others, 1.0, WeightMode::Replace);
}

/// 删除烘焙过程中的临时组，返回被删除的组名
///
/// - `<bone>_bonephys_pt` 无条件删除
/// - 父骨骼组为空且父骨骼不参与本次烘焙时删除
pub fn strip_transient_groups(mesh: &mut Mesh, armature: &Armature, bone_names: &[String]) -> Vec<String> {
    let mut removed = Vec::new();

    for name in bone_names {
        if let Some(group) = mesh.groups.remove(&pole_name(name)) {
            removed.push(group.name().to_string());
        }
    }

    for name in bone_names {
        let Some(parent) = armature.parent_of(name) else {
            continue;
        };
        if bone_names.iter().any(|b| *b == parent.name) {
            continue;
        }
        if mesh.groups.get(&parent.name).is_some_and(|g| g.is_empty()) {
            if let Some(group) = mesh.groups.remove(&parent.name) {
                removed.push(group.name().to_string());
            }
        }
    }

    removed
}
