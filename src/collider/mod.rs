//! 骨骼碰撞体流水线
//!
//! 流程：生成碰撞盒 → 分配顶点组 → 合并焊接 → 合并后 IK 分组 → 配置 IK 与布料
//!
//! - registry: 骨架上的碰撞盒登记表
//! - box_gen: 碰撞盒生成、放置与地标回贴
//! - groups: stiff / pin / IK / 极向 / 父骨骼影响组分配
//! - pipeline: initialize / delete / bake 三个入口

mod box_gen;
mod groups;
mod pipeline;
mod registry;

pub use box_gen::{box_armature_matrix, fit_bone, generate_box, init_box, place_box};
pub use groups::{
    assign_ik_targets, assign_pole, assign_stiff, finalize_partition, init_collider_groups,
    strip_transient_groups, IkAssignment,
};
pub use pipeline::{bake, delete, initialize, state, BakeOptions, BakeReport, PipelineState};
pub use registry::{BonePhysEntry, BonePhysRegistry};

use glam::Vec3;

use crate::physics::get_config;
use crate::{BonePhysError, NameKind, Result};

// ============================================================================
// 命名
// ============================================================================

/// 碰撞盒 / 合并碰撞体对象后缀
pub const COL_SUFFIX: &str = "_bonephys_col";
/// 碰撞盒网格数据后缀
pub const BOX_MESH_SUFFIX: &str = "_bonephys_box";
/// IK 目标顶点组后缀
pub const IK_SUFFIX: &str = "_bonephys_ik";
/// 极向目标顶点组 / 空物体后缀
pub const PT_SUFFIX: &str = "_bonephys_pt";

/// 刚性关节锚点组
pub const STIFF_GROUP: &str = "stiff";
/// 质量固定组
pub const PIN_GROUP: &str = "pin";

pub fn box_name(bone: &str) -> String {
    format!("{bone}{COL_SUFFIX}")
}

pub fn collider_name(armature: &str) -> String {
    format!("{armature}{COL_SUFFIX}")
}

pub fn ik_group_name(bone: &str) -> String {
    format!("{bone}{IK_SUFFIX}")
}

pub fn pole_name(bone: &str) -> String {
    format!("{bone}{PT_SUFFIX}")
}

/// 名称长度检查：追加 `_bonephys_col` 后不得超出宿主上限
///
/// 按字符计数，日文骨骼名不会因 UTF-8 字节数被误拒。
pub fn check_name_length(kind: NameKind, name: &str) -> Result<()> {
    let limit = get_config().max_name_len.saturating_sub(COL_SUFFIX.len());
    if name.chars().count() >= limit {
        return Err(BonePhysError::NameTooLong {
            kind,
            name: name.to_string(),
            limit,
        });
    }
    Ok(())
}

// ============================================================================
// 地标
// ============================================================================

/// 碰撞盒规范坐标系中的骨骼头部地标（按最近顶点查找）
pub const HEAD_CO: Vec3 = Vec3::new(0.0, -1.0, 0.0);
/// 骨骼尾部地标
pub const TAIL_CO: Vec3 = Vec3::new(0.0, 1.0, 0.0);
/// 极向目标地标
pub const POLE_CO: Vec3 = Vec3::new(1.0, 1.0, 0.0);
