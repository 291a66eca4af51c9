//! 场景对象存储
//!
//! 宿主场景的最小实现：按名称唯一的对象表，
//! 对象持有网格或为空物体，可挂父对象 / 父骨骼 / 父顶点。

mod transform;

pub use transform::{ObjectTransform, TransformLocks};

use glam::{Mat4, Vec3};

use crate::mesh::Mesh;
use crate::physics::Modifier;

// ============================================================================
// 对象
// ============================================================================

/// 对象数据
#[derive(Clone, Debug)]
pub enum ObjectData {
    Mesh(Mesh),
    /// 空物体（如极向目标锚点）
    Empty,
}

/// 父子关系
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Parent {
    /// 普通对象父级
    Object(String),
    /// 骨骼父级：原点位于骨骼尾端，+Y 沿骨骼方向
    Bone { armature: String, bone: String },
    /// 顶点父级：跟随父网格上的单个顶点
    Vertex { object: String, vertex: u32 },
}

impl Parent {
    /// 父级所引用的对象名
    pub fn object_name(&self) -> &str {
        match self {
            Parent::Object(name) => name,
            Parent::Bone { armature, .. } => armature,
            Parent::Vertex { object, .. } => object,
        }
    }
}

/// 场景对象
#[derive(Clone, Debug)]
pub struct Object {
    pub name: String,
    pub data: ObjectData,
    pub parent: Option<Parent>,
    pub transform: ObjectTransform,
    pub locks: TransformLocks,
    pub modifiers: Vec<Modifier>,
    pub hide_viewport: bool,
}

impl Object {
    /// 创建网格对象
    pub fn new_mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        Self::new(name, ObjectData::Mesh(mesh))
    }

    /// 创建空物体
    pub fn new_empty(name: impl Into<String>) -> Self {
        Self::new(name, ObjectData::Empty)
    }

    fn new(name: impl Into<String>, data: ObjectData) -> Self {
        Self {
            name: name.into(),
            data,
            parent: None,
            transform: ObjectTransform::default(),
            locks: TransformLocks::empty(),
            modifiers: Vec::new(),
            hide_viewport: false,
        }
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.data {
            ObjectData::Mesh(mesh) => Some(mesh),
            ObjectData::Empty => None,
        }
    }

    pub fn mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.data {
            ObjectData::Mesh(mesh) => Some(mesh),
            ObjectData::Empty => None,
        }
    }

    /// 局部变换矩阵（相对父空间）
    #[inline]
    pub fn local_matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }

    /// 按锁定标志设置旋转：被锁定的分量保持原值
    pub fn set_rotation(&mut self, rotation: Vec3) {
        let current = self.transform.rotation;
        self.transform.rotation = Vec3::new(
            if self.locks.contains(TransformLocks::ROTATION_X) { current.x } else { rotation.x },
            if self.locks.contains(TransformLocks::ROTATION_Y) { current.y } else { rotation.y },
            if self.locks.contains(TransformLocks::ROTATION_Z) { current.z } else { rotation.z },
        );
    }

    /// 按锁定标志设置位置
    pub fn set_location(&mut self, location: Vec3) {
        let current = self.transform.location;
        self.transform.location = Vec3::new(
            if self.locks.contains(TransformLocks::LOCATION_X) { current.x } else { location.x },
            if self.locks.contains(TransformLocks::LOCATION_Y) { current.y } else { location.y },
            if self.locks.contains(TransformLocks::LOCATION_Z) { current.z } else { location.z },
        );
    }

    /// 应用旋转与缩放（对应 transform_apply(location=False, rotation=True, scale=True)）
    ///
    /// 旋转缩放烘焙进网格顶点，对象变换只保留平移。空物体直接重置。
    pub fn apply_rotation_scale(&mut self) {
        let matrix = self.transform.rotation_scale_matrix();
        if let Some(mesh) = self.mesh_mut() {
            mesh.apply_transform(matrix);
        }
        self.transform.rotation = Vec3::ZERO;
        self.transform.scale = Vec3::ONE;
    }
}

// ============================================================================
// 场景
// ============================================================================

/// 场景对象表（名称唯一，保持链接顺序）
#[derive(Clone, Debug, Default)]
pub struct Scene {
    objects: Vec<Object>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// 链接对象；同名对象被替换并返回
    pub fn link(&mut self, object: Object) -> Option<Object> {
        let replaced = self.remove(&object.name);
        self.objects.push(object);
        replaced
    }

    pub fn get(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Object> {
        self.objects.iter_mut().find(|o| o.name == name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// 删除对象（do_unlink），同时清除其他对象指向它的父级
    pub fn remove(&mut self, name: &str) -> Option<Object> {
        let index = self.objects.iter().position(|o| o.name == name)?;
        let removed = self.objects.remove(index);
        for object in &mut self.objects {
            if object.parent.as_ref().is_some_and(|p| p.object_name() == name) {
                object.parent = None;
            }
        }
        Some(removed)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.objects.iter().map(|o| o.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Object> + '_ {
        self.objects.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
