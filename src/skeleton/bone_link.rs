//! 骨骼节点
//!
//! BoneLink 表示骨架层次中的一个节点，只保存静止姿态数据
//! （头尾位置、滚转、父子关系）与姿态骨骼上的约束列表。

use glam::{Mat4, Quat, Vec3};

use super::ik_constraint::IkConstraint;

/// 骨骼节点
///
/// 坐标均在骨架局部空间。骨骼静止坐标系：
/// - 原点：骨骼头部
/// - +Y：从头部指向尾部
/// - 滚转：绕 +Y 旋转 `roll` 弧度
#[derive(Clone, Debug)]
pub struct BoneLink {
    // ========================================
    // 静止姿态
    // ========================================

    /// 骨骼名称（骨架内唯一）
    pub name: String,

    /// 骨骼内部索引
    pub(crate) internal_id: usize,

    /// 父骨骼索引 (-1 表示根骨骼)
    pub parent_index: i32,

    /// 头部位置
    pub head: Vec3,

    /// 尾部位置
    pub tail: Vec3,

    /// 滚转角（弧度）
    pub roll: f32,

    // ========================================
    // 姿态数据
    // ========================================

    /// 姿态骨骼上的 IK 约束
    pub constraints: Vec<IkConstraint>,
}

impl BoneLink {
    /// 创建新骨骼
    pub fn new(name: impl Into<String>, head: Vec3, tail: Vec3) -> Self {
        Self {
            name: name.into(),
            internal_id: 0,
            parent_index: -1,
            head,
            tail,
            roll: 0.0,
            constraints: Vec::new(),
        }
    }

    /// 设置滚转角
    pub fn with_roll(mut self, roll: f32) -> Self {
        self.roll = roll;
        self
    }

    // ========================================
    // 访问器
    // ========================================

    /// 骨骼索引
    #[inline]
    pub fn link_id(&self) -> usize {
        self.internal_id
    }

    /// 父骨骼索引
    #[inline]
    pub fn parent_id(&self) -> Option<usize> {
        if self.parent_index >= 0 {
            Some(self.parent_index as usize)
        } else {
            None
        }
    }

    /// 是否为根骨骼
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_index < 0
    }

    /// 骨骼长度
    #[inline]
    pub fn length(&self) -> f32 {
        (self.tail - self.head).length()
    }

    /// 骨骼方向（头 → 尾），零长度骨骼返回 +Y
    #[inline]
    pub fn direction(&self) -> Vec3 {
        let dir = (self.tail - self.head).normalize_or_zero();
        if dir == Vec3::ZERO { Vec3::Y } else { dir }
    }

    /// 骨骼中点
    #[inline]
    pub fn midpoint(&self) -> Vec3 {
        (self.head + self.tail) * 0.5
    }

    // ========================================
    // 静止坐标系
    // ========================================

    /// 静止姿态旋转：+Y 对齐骨骼方向后再绕 Y 滚转
    pub fn rest_rotation(&self) -> Quat {
        Quat::from_rotation_arc(Vec3::Y, self.direction()) * Quat::from_rotation_y(self.roll)
    }

    /// 以头部为原点的骨骼坐标系
    #[inline]
    pub fn rest_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rest_rotation(), self.head)
    }

    /// 骨骼父级坐标系：原点在尾部，朝向与 rest_matrix 相同
    ///
    /// 以骨骼为父级的对象，其局部变换相对此坐标系。
    #[inline]
    pub fn tail_frame(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rest_rotation(), self.tail)
    }
}

impl Default for BoneLink {
    fn default() -> Self {
        Self::new(String::new(), Vec3::ZERO, Vec3::Y)
    }
}
