//! 骨架 - 骨骼集合
//!
//! 除骨骼层次外，还挂着按骨架持久化的碰撞盒登记表与烘焙开关。

use std::collections::HashMap;

use super::bone_link::BoneLink;
use crate::collider::BonePhysRegistry;
use crate::{BonePhysError, Result};

/// 骨架
#[derive(Clone, Debug, Default)]
pub struct Armature {
    /// 骨架对象名
    pub name: String,
    bones: Vec<BoneLink>,
    name_to_index: HashMap<String, usize>,

    /// 碰撞盒登记表（BonePhys_Collection）
    pub bonephys: BonePhysRegistry,
    /// 烘焙时是否生成极向目标
    pub bake_with_pt: bool,
}

impl Armature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// 添加骨骼
    ///
    /// 父骨骼必须已存在。同名骨骼会被覆盖静止数据并保留原索引。
    pub fn add_bone(&mut self, mut bone: BoneLink, parent: Option<&str>) -> Result<usize> {
        bone.parent_index = match parent {
            Some(parent) => self
                .bone_index(parent)
                .ok_or_else(|| BonePhysError::BoneNotFound(parent.to_string()))?
                as i32,
            None => -1,
        };

        if let Some(&index) = self.name_to_index.get(&bone.name) {
            bone.internal_id = index;
            self.bones[index] = bone;
            return Ok(index);
        }

        let index = self.bones.len();
        bone.internal_id = index;
        self.name_to_index.insert(bone.name.clone(), index);
        self.bones.push(bone);
        Ok(index)
    }

    /// 通过名称查找骨骼索引
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    pub fn bone(&self, name: &str) -> Option<&BoneLink> {
        self.bone_index(name).map(|i| &self.bones[i])
    }

    pub fn bone_mut(&mut self, name: &str) -> Option<&mut BoneLink> {
        let index = self.bone_index(name)?;
        self.bones.get_mut(index)
    }

    /// 父骨骼
    pub fn parent_of(&self, name: &str) -> Option<&BoneLink> {
        let parent = self.bone(name)?.parent_id()?;
        self.bones.get(parent)
    }

    pub fn bones(&self) -> &[BoneLink] {
        &self.bones
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}
