//! IK 约束
//!
//! 核心不求解 IK，只生成宿主 IK 约束的参数：
//! 目标对象 + 目标顶点组 + 可选极向目标 + 链长度。

/// IK 约束配置
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IkConstraint {
    /// 目标对象名（合并后的碰撞体）
    pub target: String,
    /// 目标顶点组（`<bone>_bonephys_ik`）
    pub subtarget: String,
    /// 极向目标对象名
    pub pole_target: Option<String>,
    /// IK 链长度
    pub chain_count: u32,
}

impl IkConstraint {
    /// 创建单骨骼 IK 约束
    pub fn new(target: impl Into<String>, subtarget: impl Into<String>, chain_count: u32) -> Self {
        Self {
            target: target.into(),
            subtarget: subtarget.into(),
            pole_target: None,
            chain_count,
        }
    }

    /// 设置极向目标
    pub fn with_pole_target(mut self, pole_target: Option<String>) -> Self {
        self.pole_target = pole_target;
        self
    }
}
