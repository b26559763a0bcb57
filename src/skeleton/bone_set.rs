//! 骨架 - 骨骼集合与层级管理
//!
//! 存储顺序即拓扑顺序：添加骨骼时父骨骼必须已经存在，
//! 因此按索引遍历总是先访问父骨骼再访问子骨骼。

use std::collections::HashMap;

use glam::{Mat4, Vec3};

use super::{Bone, BoneDef, SkeletonDef};
use crate::{Result, RigError};

/// 拓扑排序的访问标记
#[derive(Clone, Copy, Debug, PartialEq)]
enum VisitMark {
    Unvisited,
    InProgress,
    Done,
}

/// 骨架
#[derive(Clone, Debug)]
pub struct Skeleton {
    /// 骨架名称
    name: String,
    /// 骨骼列表（父先子后）
    bones: Vec<Bone>,
    /// 名称 → 索引
    name_to_index: HashMap<String, usize>,
    /// 子骨骼索引缓存
    children_cache: Vec<Vec<usize>>,
    /// armature 到世界的变换
    world_transform: Mat4,
}

impl Skeleton {
    /// 创建空骨架
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bones: Vec::new(),
            name_to_index: HashMap::new(),
            children_cache: Vec::new(),
            world_transform: Mat4::IDENTITY,
        }
    }

    /// 添加骨骼
    ///
    /// 父骨骼必须已添加，否则返回 `CyclicHierarchy`（无法建立遍历顺序）。
    /// head 与 tail 重合的骨骼允许添加，贴合阶段会单独报告。
    pub fn add_bone(
        &mut self,
        name: &str,
        parent: Option<&str>,
        head: Vec3,
        tail: Vec3,
    ) -> Result<usize> {
        if self.name_to_index.contains_key(name) {
            return Err(RigError::DuplicateBone(name.to_string()));
        }

        let parent_index = match parent {
            Some(parent_name) => Some(*self.name_to_index.get(parent_name).ok_or_else(|| {
                RigError::CyclicHierarchy {
                    bone: name.to_string(),
                    parent: parent_name.to_string(),
                }
            })?),
            None => None,
        };

        if head.distance_squared(tail) < 1e-12 {
            log::warn!("骨骼 '{}' 的 head 与 tail 重合", name);
        }

        let index = self.bones.len();
        self.bones.push(Bone::new(name.to_string(), index, parent_index, head, tail));
        self.name_to_index.insert(name.to_string(), index);
        self.children_cache.push(Vec::new());
        if let Some(p) = parent_index {
            self.children_cache[p].push(index);
        }

        Ok(index)
    }

    /// 从任意顺序的骨骼定义构建骨架
    ///
    /// 先做拓扑排序（父先子后，尽量保持输入顺序），
    /// 发现父链成环或父骨骼不存在时整体失败。
    pub fn from_defs(name: impl Into<String>, defs: &[BoneDef]) -> Result<Self> {
        let mut lookup: HashMap<&str, usize> = HashMap::with_capacity(defs.len());
        for (i, def) in defs.iter().enumerate() {
            if lookup.insert(def.name.as_str(), i).is_some() {
                return Err(RigError::DuplicateBone(def.name.clone()));
            }
        }

        let mut marks = vec![VisitMark::Unvisited; defs.len()];
        let mut order = Vec::with_capacity(defs.len());

        for start in 0..defs.len() {
            // 沿父链向上走，直到遇到已完成的骨骼或根骨骼
            let mut chain = Vec::new();
            let mut cursor = Some(start);

            while let Some(idx) = cursor {
                match marks[idx] {
                    VisitMark::Done => break,
                    VisitMark::InProgress => {
                        let bone = chain
                            .last()
                            .map(|&last: &usize| defs[last].name.clone())
                            .unwrap_or_else(|| defs[idx].name.clone());
                        return Err(RigError::CyclicHierarchy {
                            bone,
                            parent: defs[idx].name.clone(),
                        });
                    }
                    VisitMark::Unvisited => {}
                }

                marks[idx] = VisitMark::InProgress;
                chain.push(idx);

                cursor = match defs[idx].parent.as_deref() {
                    Some(parent) => Some(*lookup.get(parent).ok_or_else(|| {
                        RigError::CyclicHierarchy {
                            bone: defs[idx].name.clone(),
                            parent: parent.to_string(),
                        }
                    })?),
                    None => None,
                };
            }

            for &idx in chain.iter().rev() {
                marks[idx] = VisitMark::Done;
                order.push(idx);
            }
        }

        let mut skeleton = Self::new(name);
        for idx in order {
            let def = &defs[idx];
            skeleton.add_bone(&def.name, def.parent.as_deref(), def.head, def.tail)?;
        }

        Ok(skeleton)
    }

    /// 从骨架定义表构建
    pub fn from_def(def: &SkeletonDef) -> Result<Self> {
        Self::from_defs(def.name.clone(), &def.bones)
    }

    /// 导出为骨架定义表（存储顺序）
    pub fn to_def(&self) -> SkeletonDef {
        SkeletonDef {
            name: self.name.clone(),
            bones: self
                .bones
                .iter()
                .map(|bone| BoneDef {
                    name: bone.name.clone(),
                    parent: self.parent_of(bone).map(|p| p.name.clone()),
                    head: bone.head,
                    tail: bone.tail,
                })
                .collect(),
        }
    }

    // ========================================
    // 查询
    // ========================================

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// 全部骨骼（父先子后）
    #[inline]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// 按名称查找
    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.name_to_index.get(name).map(|&i| &self.bones[i])
    }

    /// 按名称查找，不存在时返回 `UnknownBone`
    pub fn require(&self, name: &str) -> Result<&Bone> {
        self.bone(name)
            .ok_or_else(|| RigError::UnknownBone(name.to_string()))
    }

    pub fn bone_by_index(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// 父骨骼
    pub fn parent_of(&self, bone: &Bone) -> Option<&Bone> {
        bone.parent.and_then(|p| self.bones.get(p))
    }

    /// 子骨骼索引
    pub fn children(&self, index: usize) -> &[usize] {
        self.children_cache
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 根骨骼
    pub fn roots(&self) -> impl Iterator<Item = &Bone> {
        self.bones.iter().filter(|b| b.is_root())
    }

    /// 父先子后的遍历顺序
    pub fn traversal(&self) -> impl Iterator<Item = &Bone> {
        self.bones.iter()
    }

    // ========================================
    // 世界变换
    // ========================================

    #[inline]
    pub fn world_transform(&self) -> Mat4 {
        self.world_transform
    }

    #[inline]
    pub fn set_world_transform(&mut self, transform: Mat4) {
        self.world_transform = transform;
    }

    pub fn with_world_transform(mut self, transform: Mat4) -> Self {
        self.world_transform = transform;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str, parent: Option<&str>, z0: f32, z1: f32) -> BoneDef {
        BoneDef::new(name, parent, Vec3::new(0.0, 0.0, z0), Vec3::new(0.0, 0.0, z1))
    }

    #[test]
    fn test_add_bone_requires_parent() {
        let mut skeleton = Skeleton::new("Test");
        skeleton.add_bone("Root", None, Vec3::ZERO, Vec3::Z).unwrap();

        let err = skeleton
            .add_bone("Arm", Some("Shoulder"), Vec3::ZERO, Vec3::X)
            .unwrap_err();
        assert!(matches!(err, RigError::CyclicHierarchy { ref parent, .. } if parent == "Shoulder"));
        assert_eq!(skeleton.len(), 1);
    }

    #[test]
    fn test_duplicate_bone() {
        let mut skeleton = Skeleton::new("Test");
        skeleton.add_bone("Root", None, Vec3::ZERO, Vec3::Z).unwrap();
        let err = skeleton.add_bone("Root", None, Vec3::ZERO, Vec3::Z).unwrap_err();
        assert!(matches!(err, RigError::DuplicateBone(ref n) if n == "Root"));
    }

    #[test]
    fn test_children_and_roots() {
        let mut skeleton = Skeleton::new("Test");
        let root = skeleton.add_bone("Root", None, Vec3::ZERO, Vec3::Z).unwrap();
        let a = skeleton.add_bone("A", Some("Root"), Vec3::Z, Vec3::Z * 2.0).unwrap();
        let b = skeleton.add_bone("B", Some("Root"), Vec3::Z, Vec3::X).unwrap();

        assert_eq!(skeleton.children(root), &[a, b]);
        assert!(skeleton.children(a).is_empty());
        assert_eq!(skeleton.roots().count(), 1);
        assert_eq!(skeleton.parent_of(skeleton.bone("B").unwrap()).unwrap().name, "Root");
        assert!(skeleton.children(99).is_empty());
    }

    #[test]
    fn test_from_defs_sorts_parents_first() {
        let defs = vec![
            def("Hand", Some("ForeArm"), 1.0, 0.9),
            def("ForeArm", Some("UpperArm"), 1.3, 1.0),
            def("Root", None, 0.9, 1.05),
            def("UpperArm", Some("Root"), 1.6, 1.3),
        ];

        let skeleton = Skeleton::from_defs("Test", &defs).unwrap();
        let names: Vec<&str> = skeleton.traversal().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Root", "UpperArm", "ForeArm", "Hand"]);

        for bone in skeleton.bones() {
            if let Some(p) = bone.parent_id() {
                assert!(p < bone.index());
            }
        }
    }

    #[test]
    fn test_from_defs_keeps_sorted_input_order() {
        let defs = vec![
            def("Root", None, 0.0, 1.0),
            def("B", Some("Root"), 1.0, 2.0),
            def("A", Some("Root"), 1.0, 2.0),
        ];
        let skeleton = Skeleton::from_defs("Test", &defs).unwrap();
        let names: Vec<&str> = skeleton.traversal().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Root", "B", "A"]);
    }

    #[test]
    fn test_from_defs_detects_cycle() {
        let defs = vec![
            def("Root", None, 0.0, 1.0),
            def("A", Some("C"), 1.0, 2.0),
            def("B", Some("A"), 2.0, 3.0),
            def("C", Some("B"), 3.0, 4.0),
        ];
        let err = Skeleton::from_defs("Test", &defs).unwrap_err();
        assert!(matches!(err, RigError::CyclicHierarchy { .. }));
    }

    #[test]
    fn test_from_defs_self_parent() {
        let defs = vec![def("Loop", Some("Loop"), 0.0, 1.0)];
        let err = Skeleton::from_defs("Test", &defs).unwrap_err();
        assert!(
            matches!(err, RigError::CyclicHierarchy { ref bone, ref parent } if bone == "Loop" && parent == "Loop")
        );
    }

    #[test]
    fn test_from_defs_unknown_parent() {
        let defs = vec![def("Root", None, 0.0, 1.0), def("Arm", Some("Ghost"), 1.0, 2.0)];
        let err = Skeleton::from_defs("Test", &defs).unwrap_err();
        assert!(matches!(err, RigError::CyclicHierarchy { ref parent, .. } if parent == "Ghost"));
    }

    #[test]
    fn test_from_defs_duplicate() {
        let defs = vec![def("Root", None, 0.0, 1.0), def("Root", None, 1.0, 2.0)];
        assert!(matches!(
            Skeleton::from_defs("Test", &defs),
            Err(RigError::DuplicateBone(_))
        ));
    }

    #[test]
    fn test_def_json_roundtrip() {
        let defs = vec![def("Root", None, 0.9, 1.05), def("Spine", Some("Root"), 1.05, 1.25)];
        let skeleton = Skeleton::from_defs("PlayerArmature", &defs).unwrap();

        let json = skeleton.to_def().to_json().unwrap();
        let restored = Skeleton::from_def(&SkeletonDef::from_json(&json).unwrap()).unwrap();

        assert_eq!(restored.name(), "PlayerArmature");
        assert_eq!(restored.to_def(), skeleton.to_def());
    }

    #[test]
    fn test_require_unknown() {
        let skeleton = Skeleton::new("Empty");
        assert!(skeleton.is_empty());
        assert!(matches!(skeleton.require("Head"), Err(RigError::UnknownBone(_))));
    }
}
