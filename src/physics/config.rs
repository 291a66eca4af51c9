//! 碰撞体生成配置
//!
//! 所有参数扁平化，直接在代码中修改默认值即可。

use once_cell::sync::Lazy;
use std::sync::RwLock;

/// 碰撞体配置（扁平化，不嵌套）
#[derive(Debug, Clone)]
pub struct ColliderConfig {
    // ========== 命名 ==========
    /// 宿主对象名长度上限（字节），默认 60
    pub max_name_len: usize,

    // ========== 几何容差 ==========
    /// 合并后焊接重复顶点的距离，默认 1e-4
    pub weld_distance: f32,
    /// 地标匹配容差（stiff 满权重判定、骨骼尾端距离），默认 1e-4
    pub landmark_tolerance: f32,

    // ========== IK ==========
    /// 每根骨骼 IK 链长度，默认 1（只驱动骨骼自身）
    pub ik_chain_count: u32,

    // ========== 布料内部弹簧 ==========
    /// 内部弹簧拉伸刚度，默认 0.0
    pub internal_tension_stiffness: f32,
    /// 内部弹簧压缩刚度，默认 0.0
    pub internal_compression_stiffness: f32,
    /// 内部弹簧最大偏转角（度），默认 1.0
    pub internal_spring_max_diversion_deg: f32,
    /// 布料是否允许动态网格，默认 true
    pub use_dynamic_mesh: bool,

    // ========== 调试 ==========
    /// 是否输出逐顶点调试日志，默认 false
    pub debug_log: bool,
}

impl Default for ColliderConfig {
    fn default() -> Self {
        Self {
            // ====== 命名 ======
            // Blender 对象名最多 63 字节，这里与旧版插件保持 60
            max_name_len: 60,

            // ====== 几何容差 ======
            // 相邻骨骼碰撞盒在关节处共享地标顶点，按此距离焊接
            weld_distance: 1e-4,
            landmark_tolerance: 1e-4,

            // ====== IK ======
            ik_chain_count: 1,

            // ====== 布料内部弹簧 ======
            // 刚度接近 0、偏转角 1°：内部弹簧只约束方向，不抵抗长度变化
            internal_tension_stiffness: 0.0,
            internal_compression_stiffness: 0.0,
            internal_spring_max_diversion_deg: 1.0,
            // 骨骼驱动下网格形状会变化，必须启用
            use_dynamic_mesh: true,

            // ====== 调试 ======
            debug_log: false,
        }
    }
}

/// 全局配置实例
static COLLIDER_CONFIG: Lazy<RwLock<ColliderConfig>> = Lazy::new(|| {
    RwLock::new(ColliderConfig::default())
});

/// 获取当前配置（只读）
pub fn get_config() -> ColliderConfig {
    COLLIDER_CONFIG.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// 手动设置配置（用于运行时调试）
pub fn set_config(config: ColliderConfig) {
    *COLLIDER_CONFIG.write().unwrap_or_else(|e| e.into_inner()) = config;
}

/// 重置为默认配置
pub fn reset_config() {
    *COLLIDER_CONFIG.write().unwrap_or_else(|e| e.into_inner()) = ColliderConfig::default();
}
