//! BonePhys - 骨骼布料碰撞体生成
//!
//! 为选中的骨骼生成代理碰撞盒，合并为单一网格，
//! 分配 stiff / pin / IK 顶点组，并配置 IK 约束与布料修改器参数。
//!
//! 模块结构：
//! - mesh: 网格数据、KD 树、连通性遍历、合并与焊接
//! - scene: 宿主场景对象存储（对象、父子关系、变换锁定）
//! - skeleton: 骨架、骨骼、IK 约束
//! - physics: 布料/骨架修改器与全局配置
//! - collider: 碰撞盒生成、顶点组分配、初始化/删除/烘焙流程
//! - operators: 面向宿主的薄适配层

pub mod mesh;
pub mod scene;
pub mod skeleton;
pub mod physics;
pub mod collider;
pub mod operators;

use std::fmt;

pub use collider::{BakeOptions, BakeReport, BonePhysEntry, BonePhysRegistry, PipelineState};
pub use mesh::{Mesh, VertexGroup, VertexGroups};
pub use scene::{Object, ObjectData, Scene};
pub use skeleton::{Armature, Bone, IkConstraint};

/// 名称超长时的名称类别
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameKind {
    Bone,
    Armature,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameKind::Bone => f.write_str("bone"),
            NameKind::Armature => f.write_str("armature"),
        }
    }
}

/// 错误类型
#[derive(Debug, thiserror::Error)]
pub enum BonePhysError {
    #[error("Excessively long {kind} name '{name}' (must be shorter than {limit} characters)")]
    NameTooLong {
        kind: NameKind,
        name: String,
        limit: usize,
    },

    #[error("Bone '{0}' not found in armature")]
    BoneNotFound(String),

    #[error("No collision boxes registered for the selected bones")]
    NoCollisionBoxes,

    #[error("Weld conflict in group '{group}': vertex {merged} disagrees with vertex {kept}")]
    WeldWeightConflict {
        group: String,
        kept: u32,
        merged: u32,
    },

    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),
}

pub type Result<T> = std::result::Result<T, BonePhysError>;
