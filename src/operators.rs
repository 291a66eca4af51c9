//! 宿主操作适配层
//!
//! 对应插件的三个按钮与列表过滤。选择状态由调用方显式传入，
//! 错误转为 CANCELLED 并写入日志。

use crate::collider::{self, BakeOptions};
use crate::scene::Scene;
use crate::skeleton::Armature;

/// 操作结果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorResult {
    Finished,
    Cancelled,
}

impl OperatorResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorResult::Finished => "FINISHED",
            OperatorResult::Cancelled => "CANCELLED",
        }
    }
}

/// 初始化碰撞盒
pub fn init_collision_box(scene: &mut Scene, armature: &mut Armature, selected: &[&str]) -> OperatorResult {
    match collider::initialize(scene, armature, selected) {
        Ok(_) => OperatorResult::Finished,
        Err(e) => {
            log::error!("[BonePhys] {}", e);
            OperatorResult::Cancelled
        }
    }
}

/// 删除碰撞盒
pub fn delete_collision_box(scene: &mut Scene, armature: &mut Armature, selected: &[&str]) -> OperatorResult {
    let removed = collider::delete(scene, armature, selected);
    log::info!("[BonePhys] 删除碰撞盒: {:?}", removed);
    OperatorResult::Finished
}

/// 烘焙碰撞体，极向目标开关取自骨架
pub fn bake_collision_box(scene: &mut Scene, armature: &mut Armature, selected: &[&str]) -> OperatorResult {
    let options = BakeOptions::from_armature(armature);
    match collider::bake(scene, armature, selected, options) {
        Ok(_) => OperatorResult::Finished,
        Err(e) => {
            log::error!("[BonePhys] {}", e);
            OperatorResult::Cancelled
        }
    }
}

/// 登记表列表过滤
///
/// 编辑模式下只显示选中骨骼的登记项，其余模式不过滤。
pub fn filter_registry(armature: &Armature, selected: &[&str], edit_mode: bool) -> Vec<bool> {
    armature
        .bonephys
        .iter()
        .map(|entry| !edit_mode || selected.contains(&entry.bone_name.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::BoneLink;
    use glam::Vec3;

    fn rig() -> (Scene, Armature) {
        let mut armature = Armature::new("Rig");
        armature
            .add_bone(BoneLink::new("hip", Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0)), None)
            .unwrap();
        armature
            .add_bone(
                BoneLink::new("tail", Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, -1.0)),
                Some("hip"),
            )
            .unwrap();
        (Scene::new(), armature)
    }

    #[test]
    fn test_operator_flow() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (mut scene, mut armature) = rig();

        assert_eq!(init_collision_box(&mut scene, &mut armature, &["hip", "tail"]), OperatorResult::Finished);
        assert_eq!(filter_registry(&armature, &["tail"], true), vec![false, true]);
        assert_eq!(filter_registry(&armature, &["tail"], false), vec![true, true]);

        assert_eq!(bake_collision_box(&mut scene, &mut armature, &["hip", "tail"]), OperatorResult::Finished);
        assert!(scene.contains("Rig_bonephys_col"));
        assert!(!scene.contains("hip_bonephys_pt"));

        // 没有碰撞盒可烘焙
        let result = bake_collision_box(&mut scene, &mut armature, &["hip"]);
        assert_eq!(result, OperatorResult::Cancelled);
        assert_eq!(result.as_str(), "CANCELLED");
    }

    #[test]
    fn test_init_cancelled_on_unknown_bone() {
        let (mut scene, mut armature) = rig();
        let result = init_collision_box(&mut scene, &mut armature, &["hip", "wing"]);
        assert_eq!(result, OperatorResult::Cancelled);
        assert!(scene.is_empty());
        assert!(armature.bonephys.is_empty());

        assert_eq!(delete_collision_box(&mut scene, &mut armature, &["hip"]), OperatorResult::Finished);
    }
}
