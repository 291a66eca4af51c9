//! 对象变换与变换锁定

use bitflags::bitflags;
use glam::{EulerRot, Mat4, Quat, Vec3};

// ============================================================================
// 变换锁定标志
// ============================================================================

bitflags! {
    /// 变换锁定标志位（UI 中不可编辑的分量）
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TransformLocks: u32 {
        const LOCATION_X = 1 << 0;
        const LOCATION_Y = 1 << 1;
        const LOCATION_Z = 1 << 2;
        const ROTATION_X = 1 << 3;
        const ROTATION_Y = 1 << 4;
        const ROTATION_Z = 1 << 5;
        const SCALE_X = 1 << 6;
        const SCALE_Y = 1 << 7;
        const SCALE_Z = 1 << 8;

        const LOCATION = Self::LOCATION_X.bits() | Self::LOCATION_Y.bits() | Self::LOCATION_Z.bits();
        /// 只保留绕 Y 轴（骨骼轴）的滚转
        const ROLL_ONLY = Self::ROTATION_X.bits() | Self::ROTATION_Z.bits();
    }
}

// ============================================================================
// 对象变换
// ============================================================================

/// 对象局部变换（相对父空间）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectTransform {
    pub location: Vec3,
    /// 欧拉角 XYZ（弧度）
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self {
            location: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl ObjectTransform {
    #[inline]
    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// 转换为 4x4 矩阵
    #[inline]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.location)
    }

    /// 从矩阵分解
    #[inline]
    pub fn from_matrix(m: Mat4) -> Self {
        let (scale, rotation, location) = m.to_scale_rotation_translation();
        let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
        Self {
            location,
            rotation: Vec3::new(x, y, z),
            scale,
        }
    }

    /// 旋转 + 缩放部分的矩阵（不含平移）
    #[inline]
    pub fn rotation_scale_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), Vec3::ZERO)
    }
}
