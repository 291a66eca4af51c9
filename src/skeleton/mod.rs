//! 骨架系统
//!
//! 核心设计思想：
//! - BoneLink: 单个骨骼节点（静止姿态 + 姿态约束）
//! - Armature: 骨骼层次 + 碰撞盒登记表
//! - IkConstraint: 交给宿主 IK 求解器的约束参数

mod armature;
mod bone_link;
mod ik_constraint;

pub use armature::Armature;
pub use bone_link::BoneLink;
pub use ik_constraint::IkConstraint;

// ============================================================================
// 类型别名
// ============================================================================

/// Bone 别名
pub type Bone = BoneLink;
