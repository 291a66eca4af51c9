//! 碰撞盒生成
//!
//! 规范坐标系下的碰撞盒：边长 1 的立方体，两端盖面（垂直于骨骼轴）
//! 做 2×2 网格细分。地标按最近点查找：(0,±1,0) 落到端盖中心 (0,±0.5,0)，
//! (1,1,0) 落到端盖边中点 (0.5,0.5,0)。

use glam::{Mat4, Vec3};

use super::{box_name, check_name_length, BOX_MESH_SUFFIX, HEAD_CO, TAIL_CO};
use crate::mesh::primitive::{create_cube, subdivide_edges};
use crate::mesh::Mesh;
use crate::scene::{Object, ObjectTransform, Parent, Scene, TransformLocks};
use crate::skeleton::{Armature, BoneLink};
use crate::{BonePhysError, NameKind, Result};

/// 端盖判定：面中心 |y| 超过此值
const CAP_EPSILON: f32 = 1e-4;

/// 立方体半边长（边长 1）
const HALF_EXTENT: f32 = 0.5;

/// 生成规范碰撞盒网格
pub fn generate_box(name: impl Into<String>) -> Mesh {
    let mut mesh = create_cube(name, HALF_EXTENT);

    let mut cap_edges = Vec::new();
    for (i, face) in mesh.faces.iter().enumerate() {
        let is_cap = mesh
            .face_center_bounds(i)
            .is_some_and(|c| c.y.abs() > CAP_EPSILON);
        if is_cap {
            let n = face.len();
            cap_edges.extend((0..n).map(|k| [face[k], face[(k + 1) % n]]));
        }
    }
    subdivide_edges(&mut mesh, &cap_edges);

    mesh
}

/// 把碰撞盒挂到骨骼上并缩放到骨骼长度
///
/// 骨骼父级坐标系原点在骨骼尾端，因此 Y 偏移 -L/2 使盒心落在骨骼中点。
/// 平移全部锁定，旋转只放开 Y（滚转）。
pub fn place_box(object: &mut Object, armature_name: &str, bone: &BoneLink) {
    let half = bone.length() / 2.0;

    object.parent = Some(Parent::Bone {
        armature: armature_name.to_string(),
        bone: bone.name.clone(),
    });
    object.transform = ObjectTransform {
        location: Vec3::new(0.0, -half, 0.0),
        rotation: Vec3::ZERO,
        scale: Vec3::splat(half),
    };
    object.locks = TransformLocks::LOCATION | TransformLocks::ROLL_ONLY;
}

/// 为骨骼创建并链接碰撞盒，返回对象名
///
/// 场景中已有同名碰撞盒时先删除再创建。
pub fn init_box(scene: &mut Scene, armature: &Armature, bone_name: &str) -> Result<String> {
    check_name_length(NameKind::Bone, bone_name)?;
    let bone = armature
        .bone(bone_name)
        .ok_or_else(|| BonePhysError::BoneNotFound(bone_name.to_string()))?;

    let name = box_name(bone_name);
    if scene.remove(&name).is_some() {
        log::warn!("[BonePhys] 替换已存在的碰撞盒 '{}'", name);
    }

    let mesh = generate_box(format!("{bone_name}{BOX_MESH_SUFFIX}"));
    let mut object = Object::new_mesh(name.clone(), mesh);
    place_box(&mut object, &armature.name, bone);
    scene.link(object);

    Ok(name)
}

/// 把头尾地标顶点精确放回 (0, ∓L/2, 0)
///
/// 用于应用旋转缩放之后，修正之前变换带来的漂移。返回 [头, 尾] 顶点索引。
pub fn fit_bone(mesh: &mut Mesh, bone: &BoneLink) -> Option<[u32; 2]> {
    let tree = mesh.kdtree();
    let head = tree.find_nearest(HEAD_CO)?.id;
    let tail = tree.find_nearest(TAIL_CO)?.id;

    let half = bone.length() / 2.0;
    mesh.vertices[head] = Vec3::new(0.0, -half, 0.0);
    mesh.vertices[tail] = Vec3::new(0.0, half, 0.0);

    Some([head as u32, tail as u32])
}

/// 碰撞盒局部空间 → 骨架空间的矩阵
///
/// 顶点父级的对象无法在此求值，返回 None。
pub fn box_armature_matrix(armature: &Armature, object: &Object) -> Option<Mat4> {
    match &object.parent {
        Some(Parent::Bone { bone, .. }) => armature
            .bone(bone)
            .map(|b| b.tail_frame() * object.local_matrix()),
        Some(Parent::Object(_)) | None => Some(object.local_matrix()),
        Some(Parent::Vertex { .. }) => None,
    }
}
