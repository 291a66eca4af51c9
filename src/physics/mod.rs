//! 物理修改器配置
//!
//! - Modifier: 挂在合并碰撞体上的修改器（骨架变形 + 布料）
//! - ClothSettings: 布料参数
//! - config: 全局可调参数

pub mod config;
mod cloth;

pub use cloth::ClothSettings;
pub use config::{get_config, reset_config, set_config, ColliderConfig};

/// 对象修改器（按添加顺序求值）
#[derive(Clone, Debug, PartialEq)]
pub enum Modifier {
    /// 骨架变形：按与骨骼同名的顶点组变形
    Armature { object: String },
    /// 布料模拟
    Cloth(ClothSettings),
}

impl Modifier {
    /// 宿主中的修改器名称
    pub fn name(&self) -> &'static str {
        match self {
            Modifier::Armature { .. } => "Armature",
            Modifier::Cloth(_) => "Cloth",
        }
    }
}
