//! 初始化 / 删除 / 烘焙流程
//!
//! 每个入口都是全有或全无：先校验，失败的工作只作用于拷贝，
//! 最后的提交阶段不会失败。

use glam::Mat4;

use super::groups::{
    assign_ik_targets, assign_pole, assign_stiff, finalize_partition, init_collider_groups,
    strip_transient_groups,
};
use super::{
    box_armature_matrix, check_name_length, collider_name, fit_bone, init_box, pole_name,
    BonePhysEntry, IK_SUFFIX, PIN_GROUP, STIFF_GROUP,
};
use crate::mesh::{join, weld, Mesh, WeldReport};
use crate::physics::{get_config, ClothSettings, Modifier};
use crate::scene::{Object, Parent, Scene};
use crate::skeleton::{Armature, IkConstraint};
use crate::{BonePhysError, NameKind, Result};

// ============================================================================
// 状态与选项
// ============================================================================

/// 流程状态
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    /// 无碰撞盒也无碰撞体
    Empty,
    /// 已有登记的碰撞盒
    Boxed,
    /// 已烘焙出合并碰撞体
    Baked,
}

/// 根据登记表与场景推断当前状态
pub fn state(scene: &Scene, armature: &Armature) -> PipelineState {
    if !armature.bonephys.is_empty() {
        PipelineState::Boxed
    } else if scene.contains(&collider_name(&armature.name)) {
        PipelineState::Baked
    } else {
        PipelineState::Empty
    }
}

/// 烘焙选项
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BakeOptions {
    /// 为每个 IK 组生成隐藏的极向目标空物体
    pub with_pole_targets: bool,
}

impl BakeOptions {
    /// 取骨架上的 bake_with_pt 开关
    pub fn from_armature(armature: &Armature) -> Self {
        Self {
            with_pole_targets: armature.bake_with_pt,
        }
    }
}

/// 烘焙结果
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BakeReport {
    /// 合并碰撞体对象名
    pub collider: String,
    /// 参与烘焙的骨骼（选择顺序）
    pub bones: Vec<String>,
    /// 生成的极向目标空物体
    pub pole_targets: Vec<String>,
    pub welded: WeldReport,
    /// 新增的 IK 约束数
    pub constraints: usize,
}

// ============================================================================
// 初始化 / 删除
// ============================================================================

fn validate_bones(armature: &Armature, selected: &[&str]) -> Result<()> {
    for &name in selected {
        check_name_length(NameKind::Bone, name)?;
        if armature.bone(name).is_none() {
            return Err(BonePhysError::BoneNotFound(name.to_string()));
        }
    }
    Ok(())
}

/// 为选中骨骼创建碰撞盒并登记，返回新建的骨骼名
///
/// 已登记的骨骼跳过。任一名称校验失败时不做任何修改。
pub fn initialize(scene: &mut Scene, armature: &mut Armature, selected: &[&str]) -> Result<Vec<String>> {
    validate_bones(armature, selected)?;

    let mut created = Vec::new();
    for &bone in selected {
        if armature.bonephys.contains(bone) {
            continue;
        }
        let collision_box = init_box(scene, armature, bone)?;
        armature.bonephys.add(BonePhysEntry {
            bone_name: bone.to_string(),
            collision_box,
        });
        created.push(bone.to_string());
    }

    if !created.is_empty() {
        log::info!("[BonePhys] 初始化碰撞盒: {:?}", created);
    }
    Ok(created)
}

/// 删除选中骨骼的碰撞盒与登记项，返回移除的骨骼名
pub fn delete(scene: &mut Scene, armature: &mut Armature, selected: &[&str]) -> Vec<String> {
    let mut removed = Vec::new();
    for &bone in selected {
        let Some(entry) = armature.bonephys.remove(bone) else {
            continue;
        };
        if scene.remove(&entry.collision_box).is_none() {
            log::warn!("[BonePhys] 碰撞盒 '{}' 已不在场景中", entry.collision_box);
        }
        removed.push(entry.bone_name);
    }
    armature.bonephys.active_index = 0;
    removed
}

// ============================================================================
// 烘焙
// ============================================================================

/// 烘焙：合并选中骨骼的碰撞盒为一个布料碰撞体
pub fn bake(
    scene: &mut Scene,
    armature: &mut Armature,
    selected: &[&str],
    options: BakeOptions,
) -> Result<BakeReport> {
    let config = get_config();

    // ====== 校验 ======
    check_name_length(NameKind::Armature, &armature.name)?;
    validate_bones(armature, selected)?;

    // ====== 收集碰撞盒拷贝 ======
    let mut bones: Vec<String> = Vec::new();
    let mut boxes: Vec<(String, Object)> = Vec::new();
    for &bone in selected {
        if bones.iter().any(|b| b == bone) {
            continue;
        }
        let Some(entry) = armature.bonephys.get_by_bone(bone) else {
            continue;
        };
        let Some(object) = scene.get(&entry.collision_box) else {
            log::warn!("[BonePhys] 登记的碰撞盒 '{}' 不在场景中，跳过", entry.collision_box);
            continue;
        };
        if object.mesh().is_none() {
            return Err(BonePhysError::InvalidMesh(entry.collision_box.clone()));
        }
        if box_armature_matrix(armature, object).is_none() {
            return Err(BonePhysError::InvalidMesh(format!(
                "'{}' is not parented to a bone or object",
                entry.collision_box
            )));
        }
        bones.push(bone.to_string());
        boxes.push((entry.collision_box.clone(), object.clone()));
    }
    if boxes.is_empty() {
        return Err(BonePhysError::NoCollisionBoxes);
    }

    // ====== 单盒处理 ======
    let name = collider_name(&armature.name);
    let mut collider = Mesh::new(name.clone());
    init_collider_groups(&mut collider, armature, &bones);

    let mut sources: Vec<(Mesh, Mat4)> = Vec::with_capacity(boxes.len());
    for ((box_name, mut object), bone_name) in boxes.into_iter().zip(&bones) {
        if let Some(mesh) = object.mesh_mut() {
            assign_pole(mesh, &box_name);
        }
        object.apply_rotation_scale();

        let matrix = box_armature_matrix(armature, &object);
        let (Some(matrix), Some(bone), Some(mesh)) =
            (matrix, armature.bone(bone_name), object.mesh_mut())
        else {
            continue;
        };
        assign_stiff(mesh);
        fit_bone(mesh, bone);
        sources.push((std::mem::take(mesh), matrix));
    }

    // ====== 合并与焊接 ======
    let refs: Vec<(&Mesh, Mat4)> = sources.iter().map(|(m, x)| (m, *x)).collect();
    join(&mut collider, &refs);
    let welded = weld(&mut collider, config.weld_distance)?;

    // ====== 极向目标 ======
    let mut empties = Vec::new();
    if options.with_pole_targets {
        for bone in &bones {
            let pt = pole_name(bone);
            let Some(vertex) = collider.groups.get(&pt).and_then(|g| g.vertices().next()) else {
                log::warn!("[BonePhys] 顶点组 '{}' 为空，跳过极向目标", pt);
                continue;
            };
            let mut empty = Object::new_empty(pt);
            empty.parent = Some(Parent::Vertex {
                object: name.clone(),
                vertex,
            });
            empty.hide_viewport = true;
            empties.push(empty);
        }
    }

    // ====== 合并后分组 ======
    let ik = assign_ik_targets(&mut collider, armature, &bones);
    finalize_partition(&mut collider);
    let stripped = strip_transient_groups(&mut collider, armature, &bones);
    if config.debug_log {
        log::debug!(
            "[BonePhys] IK 目标 {}，pin {}，传播 {}，删除组 {:?}",
            ik.ik_targets, ik.pins, ik.propagated, stripped
        );
    }

    // ====== IK 约束 ======
    let constraints: Vec<(String, IkConstraint)> = collider
        .groups
        .names()
        .filter_map(|group| {
            let bone = group.strip_suffix(IK_SUFFIX)?;
            armature.bone(bone)?;
            let pt = pole_name(bone);
            let pole = empties.iter().any(|e| e.name == pt).then_some(pt);
            let constraint = IkConstraint::new(name.clone(), group, config.ik_chain_count)
                .with_pole_target(pole);
            Some((bone.to_string(), constraint))
        })
        .collect();

    let mut object = Object::new_mesh(name.clone(), collider);
    object.parent = Some(Parent::Object(armature.name.clone()));
    object.modifiers = vec![
        Modifier::Armature {
            object: armature.name.clone(),
        },
        Modifier::Cloth(ClothSettings::collider_default(PIN_GROUP, STIFF_GROUP)),
    ];

    // ====== 提交 ======
    for bone in &bones {
        if let Some(entry) = armature.bonephys.remove(bone) {
            scene.remove(&entry.collision_box);
        }
    }
    armature.bonephys.active_index = 0;

    if scene.link(object).is_some() {
        log::warn!("[BonePhys] 替换已存在的碰撞体 '{}'", name);
    }
    let pole_targets: Vec<String> = empties.iter().map(|e| e.name.clone()).collect();
    for empty in empties {
        scene.link(empty);
    }

    let constraint_count = constraints.len();
    for (bone, constraint) in constraints {
        if let Some(bone) = armature.bone_mut(&bone) {
            bone.constraints.push(constraint);
        }
    }

    log::info!(
        "[BonePhys] 烘焙完成: '{}'，{} 根骨骼，焊接 {} 个顶点，{} 个 IK 约束",
        name,
        bones.len(),
        welded.removed,
        constraint_count
    );

    Ok(BakeReport {
        collider: name,
        bones,
        pole_targets,
        welded,
        constraints: constraint_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collider::{HEAD_CO, TAIL_CO};
    use crate::skeleton::BoneLink;
    use glam::Vec3;

    fn rig() -> (Scene, Armature) {
        let mut armature = Armature::new("Rig");
        armature
            .add_bone(BoneLink::new("spine", Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0)), None)
            .unwrap();
        armature
            .add_bone(
                BoneLink::new("chest", Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 3.5, 0.0)),
                Some("spine"),
            )
            .unwrap();
        let mut scene = Scene::new();
        scene.link(Object::new_empty("Rig"));
        (scene, armature)
    }

    fn collider(scene: &Scene) -> &Mesh {
        scene.get("Rig_bonephys_col").and_then(|o| o.mesh()).unwrap()
    }

    #[test]
    fn test_spine_chest_scenario() {
        let (mut scene, mut armature) = rig();
        let created = initialize(&mut scene, &mut armature, &["spine", "chest"]).unwrap();
        assert_eq!(created, vec!["spine", "chest"]);
        assert!(scene.contains("spine_bonephys_col"));
        assert!(scene.contains("chest_bonephys_col"));
        assert_eq!(state(&scene, &armature), PipelineState::Boxed);

        let report = bake(&mut scene, &mut armature, &["spine", "chest"], BakeOptions::default()).unwrap();
        assert_eq!(report.collider, "Rig_bonephys_col");
        assert_eq!(report.welded.removed, 1);
        assert_eq!(report.constraints, 2);
        assert!(report.pole_targets.is_empty());

        let mesh = collider(&scene);
        assert_eq!(mesh.vertex_count(), 35);
        let mut groups: Vec<_> = mesh.groups.names().collect();
        groups.sort_unstable();
        assert_eq!(groups, vec!["chest_bonephys_ik", "pin", "spine", "spine_bonephys_ik", "stiff"]);

        for bone in ["spine", "chest"] {
            let constraints = &armature.bone(bone).unwrap().constraints;
            assert_eq!(constraints.len(), 1);
            assert_eq!(constraints[0].target, "Rig_bonephys_col");
            assert_eq!(constraints[0].subtarget, format!("{bone}_bonephys_ik"));
            assert_eq!(constraints[0].chain_count, 1);
            assert_eq!(constraints[0].pole_target, None);
        }

        // 碰撞盒与登记项已清除
        assert!(!scene.contains("spine_bonephys_col"));
        assert!(!scene.contains("chest_bonephys_col"));
        assert!(armature.bonephys.is_empty());
        assert_eq!(state(&scene, &armature), PipelineState::Baked);

        let object = scene.get("Rig_bonephys_col").unwrap();
        assert_eq!(object.parent, Some(Parent::Object("Rig".into())));
        assert_eq!(object.modifiers[0].name(), "Armature");
        assert_eq!(object.modifiers[1].name(), "Cloth");
    }

    #[test]
    fn test_stiff_pin_partition() {
        let (mut scene, mut armature) = rig();
        initialize(&mut scene, &mut armature, &["spine", "chest"]).unwrap();
        bake(&mut scene, &mut armature, &["spine", "chest"], BakeOptions::default()).unwrap();

        let mesh = collider(&scene);
        let stiff = mesh.groups.get(STIFF_GROUP).unwrap();
        let pin = mesh.groups.get(PIN_GROUP).unwrap();
        assert_eq!(stiff.len(), 3);
        for v in 0..mesh.vertex_count() as u32 {
            let s = stiff.weight(v).unwrap_or(0.0) == 1.0;
            let p = pin.weight(v).unwrap_or(0.0) == 1.0;
            assert!(s != p, "vertex {v}");
        }

        // IK 目标顶点落在骨骼尾端
        let ik = mesh.groups.get("chest_bonephys_ik").unwrap();
        let v = ik.vertices().next().unwrap();
        assert!((mesh.vertices[v as usize] - Vec3::new(0.0, 3.5, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_initialize_delete_round_trip() {
        let (mut scene, mut armature) = rig();
        let before = scene.len();

        initialize(&mut scene, &mut armature, &["spine", "chest"]).unwrap();
        armature.bonephys.active_index = 1;
        let removed = delete(&mut scene, &mut armature, &["spine", "chest", "missing"]);

        assert_eq!(removed, vec!["spine", "chest"]);
        assert!(armature.bonephys.is_empty());
        assert_eq!(armature.bonephys.active_index, 0);
        assert_eq!(scene.len(), before);
        assert_eq!(state(&scene, &armature), PipelineState::Empty);
    }

    #[test]
    fn test_initialize_skips_registered() {
        let (mut scene, mut armature) = rig();
        initialize(&mut scene, &mut armature, &["spine"]).unwrap();
        let created = initialize(&mut scene, &mut armature, &["spine", "chest"]).unwrap();
        assert_eq!(created, vec!["chest"]);
        assert_eq!(armature.bonephys.len(), 2);
    }

    #[test]
    fn test_long_name_rejected_without_mutation() {
        let (mut scene, mut armature) = rig();
        let long = "b".repeat(55);
        armature
            .add_bone(BoneLink::new(long.clone(), Vec3::ZERO, Vec3::Y), None)
            .unwrap();
        initialize(&mut scene, &mut armature, &["spine"]).unwrap();
        let objects = scene.len();

        let err = initialize(&mut scene, &mut armature, &["chest", long.as_str()]).unwrap_err();
        assert!(matches!(err, BonePhysError::NameTooLong { kind: NameKind::Bone, .. }));
        assert_eq!(scene.len(), objects);
        assert_eq!(armature.bonephys.len(), 1);

        let err = bake(&mut scene, &mut armature, &["spine", long.as_str()], BakeOptions::default()).unwrap_err();
        assert!(matches!(err, BonePhysError::NameTooLong { .. }));
        assert!(scene.contains("spine_bonephys_col"));
        assert!(!scene.contains("Rig_bonephys_col"));
        assert_eq!(armature.bonephys.len(), 1);
    }

    #[test]
    fn test_long_armature_name_rejected() {
        let (mut scene, mut armature) = rig();
        initialize(&mut scene, &mut armature, &["spine"]).unwrap();
        armature.name = "r".repeat(55);

        let err = bake(&mut scene, &mut armature, &["spine"], BakeOptions::default()).unwrap_err();
        assert!(matches!(err, BonePhysError::NameTooLong { kind: NameKind::Armature, .. }));
        assert_eq!(armature.bonephys.len(), 1);
    }

    #[test]
    fn test_bake_without_boxes() {
        let (mut scene, mut armature) = rig();
        let err = bake(&mut scene, &mut armature, &["spine"], BakeOptions::default()).unwrap_err();
        assert!(matches!(err, BonePhysError::NoCollisionBoxes));

        let err = bake(&mut scene, &mut armature, &["pelvis"], BakeOptions::default()).unwrap_err();
        assert!(matches!(err, BonePhysError::BoneNotFound(_)));
    }

    #[test]
    fn test_weld_conflict_leaves_document_untouched() {
        let (mut scene, mut armature) = rig();
        initialize(&mut scene, &mut armature, &["spine", "chest"]).unwrap();

        // spine 尾端与 chest 头部重合，但在同一组中权重不同
        for (object, landmark, weight) in [
            ("spine_bonephys_col", TAIL_CO, 0.2),
            ("chest_bonephys_col", HEAD_CO, 0.9),
        ] {
            let mesh = scene.get_mut(object).and_then(|o| o.mesh_mut()).unwrap();
            let v = mesh.kdtree().find_nearest(landmark).unwrap().id as u32;
            mesh.groups.ensure("shared").set(v, weight);
        }
        let names: Vec<String> = scene.names().map(String::from).collect();
        let registry = armature.bonephys.clone();
        let spine_box = scene.get("spine_bonephys_col").and_then(|o| o.mesh()).cloned().unwrap();
        let spine_transform = scene.get("spine_bonephys_col").unwrap().transform;

        let err = bake(&mut scene, &mut armature, &["spine", "chest"], BakeOptions::default()).unwrap_err();
        assert!(matches!(err, BonePhysError::WeldWeightConflict { ref group, .. } if group == "shared"));

        assert!(!scene.contains("Rig_bonephys_col"));
        assert_eq!(scene.names().map(String::from).collect::<Vec<_>>(), names);
        assert_eq!(armature.bonephys, registry);
        assert!(armature.bones().iter().all(|b| b.constraints.is_empty()));

        // 碰撞盒未被应用变换，也没有烘焙期的组
        let object = scene.get("spine_bonephys_col").unwrap();
        let mesh = object.mesh().unwrap();
        assert_eq!(mesh.vertices, spine_box.vertices);
        assert_eq!(mesh.groups, spine_box.groups);
        assert!(!mesh.groups.contains(STIFF_GROUP));
        assert_eq!(object.transform, spine_transform);
    }

    #[test]
    fn test_vertex_parented_box_rejected() {
        let (mut scene, mut armature) = rig();
        initialize(&mut scene, &mut armature, &["spine"]).unwrap();
        scene.get_mut("spine_bonephys_col").unwrap().parent = Some(Parent::Vertex {
            object: "Rig".into(),
            vertex: 0,
        });

        let err = bake(&mut scene, &mut armature, &["spine"], BakeOptions::default()).unwrap_err();
        assert!(matches!(err, BonePhysError::InvalidMesh(_)));
        assert!(scene.contains("spine_bonephys_col"));
        assert!(!scene.contains("Rig_bonephys_col"));
        assert_eq!(armature.bonephys.len(), 1);
    }

    #[test]
    fn test_pole_targets() {
        let (mut scene, mut armature) = rig();
        armature.bake_with_pt = true;
        initialize(&mut scene, &mut armature, &["spine", "chest"]).unwrap();

        let options = BakeOptions::from_armature(&armature);
        let report = bake(&mut scene, &mut armature, &["spine", "chest"], options).unwrap();
        assert_eq!(report.pole_targets, vec!["spine_bonephys_pt", "chest_bonephys_pt"]);

        let empty = scene.get("chest_bonephys_pt").unwrap();
        assert!(empty.hide_viewport);
        assert!(empty.mesh().is_none());
        assert!(matches!(
            &empty.parent,
            Some(Parent::Vertex { object, .. }) if object == "Rig_bonephys_col"
        ));

        let constraint = &armature.bone("chest").unwrap().constraints[0];
        assert_eq!(constraint.pole_target.as_deref(), Some("chest_bonephys_pt"));

        // _pt 组不保留在碰撞体上
        assert!(!collider(&scene).groups.contains("chest_bonephys_pt"));
    }

    #[test]
    fn test_bake_child_only_propagates_to_parent() {
        let (mut scene, mut armature) = rig();
        initialize(&mut scene, &mut armature, &["chest"]).unwrap();
        bake(&mut scene, &mut armature, &["chest"], BakeOptions::default()).unwrap();

        let mesh = collider(&scene);
        assert_eq!(mesh.vertex_count(), 18);
        assert_eq!(mesh.groups.get("spine").unwrap().len(), 18);
        assert!(armature.bone("spine").unwrap().constraints.is_empty());
        assert_eq!(armature.bone("chest").unwrap().constraints.len(), 1);
    }

    #[test]
    fn test_rolled_bone_keeps_ik_target_on_tail() {
        let mut armature = Armature::new("Rig");
        let bone = BoneLink::new("arm", Vec3::new(0.3, 1.2, 0.1), Vec3::new(1.1, 0.9, -0.2)).with_roll(0.7);
        let tail = bone.tail;
        armature.add_bone(bone, None).unwrap();
        let mut scene = Scene::new();

        initialize(&mut scene, &mut armature, &["arm"]).unwrap();
        scene
            .get_mut("arm_bonephys_col")
            .unwrap()
            .set_rotation(Vec3::new(0.0, 0.4, 0.0));
        bake(&mut scene, &mut armature, &["arm"], BakeOptions::default()).unwrap();

        let mesh = collider(&scene);
        let ik = mesh.groups.get("arm_bonephys_ik").unwrap();
        assert_eq!(ik.len(), 1);
        let v = ik.vertices().next().unwrap();
        assert!((mesh.vertices[v as usize] - tail).length() < 1e-4);
    }
}
