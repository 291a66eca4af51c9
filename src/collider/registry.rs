//! 碰撞盒登记表
//!
//! 对应骨架上持久化的 BonePhys_Collection：按骨骼名唯一、保持插入顺序，
//! 另带一个 UI 列表的选中索引。

/// 登记项：骨骼 → 碰撞盒对象
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BonePhysEntry {
    /// 骨骼名（唯一键）
    pub bone_name: String,
    /// 碰撞盒对象名
    pub collision_box: String,
}

/// 碰撞盒登记表
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BonePhysRegistry {
    entries: Vec<BonePhysEntry>,
    /// UI 列表选中索引
    pub active_index: usize,
}

impl BonePhysRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按骨骼名查找索引
    pub fn find(&self, bone_name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.bone_name == bone_name)
    }

    #[inline]
    pub fn contains(&self, bone_name: &str) -> bool {
        self.find(bone_name).is_some()
    }

    pub fn get(&self, index: usize) -> Option<&BonePhysEntry> {
        self.entries.get(index)
    }

    pub fn get_by_bone(&self, bone_name: &str) -> Option<&BonePhysEntry> {
        self.find(bone_name).map(|i| &self.entries[i])
    }

    /// 添加登记项；骨骼已登记时返回 false 且不做修改
    pub fn add(&mut self, entry: BonePhysEntry) -> bool {
        if self.contains(&entry.bone_name) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// 按骨骼名移除
    pub fn remove(&mut self, bone_name: &str) -> Option<BonePhysEntry> {
        let index = self.find(bone_name)?;
        Some(self.entries.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &BonePhysEntry> + '_ {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
