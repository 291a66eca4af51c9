//! 布料修改器参数
//!
//! 核心只配置参数，布料求解由宿主完成。

use super::config::get_config;

/// 布料设置（与宿主 ClothSettings 字段一一对应的子集）
#[derive(Clone, Debug, PartialEq)]
pub struct ClothSettings {
    /// 质量固定（pin）顶点组
    pub vertex_group_mass: String,
    /// 动态网格：允许形状随骨骼变化
    pub use_dynamic_mesh: bool,
    /// 内部弹簧
    pub use_internal_springs: bool,
    /// 内部弹簧顶点组
    pub vertex_group_intern: String,
    pub internal_tension_stiffness: f32,
    pub internal_compression_stiffness: f32,
    /// 内部弹簧最大偏转角（弧度）
    pub internal_spring_max_diversion: f32,
}

impl Default for ClothSettings {
    /// 宿主新建布料修改器时的默认值
    fn default() -> Self {
        Self {
            vertex_group_mass: String::new(),
            use_dynamic_mesh: false,
            use_internal_springs: false,
            vertex_group_intern: String::new(),
            internal_tension_stiffness: 15.0,
            internal_compression_stiffness: 15.0,
            internal_spring_max_diversion: std::f32::consts::FRAC_PI_4,
        }
    }
}

impl ClothSettings {
    /// 骨骼碰撞体使用的布料设置
    ///
    /// pin 组固定质量，stiff 组作为内部弹簧，刚度取自全局配置。
    pub fn collider_default(pin_group: &str, stiff_group: &str) -> Self {
        let config = get_config();
        Self {
            vertex_group_mass: pin_group.to_string(),
            use_dynamic_mesh: config.use_dynamic_mesh,
            use_internal_springs: true,
            vertex_group_intern: stiff_group.to_string(),
            internal_tension_stiffness: config.internal_tension_stiffness,
            internal_compression_stiffness: config.internal_compression_stiffness,
            internal_spring_max_diversion: config.internal_spring_max_diversion_deg.to_radians(),
        }
    }
}
