//! 骨骼节点
//!
//! Bone 是骨架的基本单元：一段从 head 指向 tail 的有向线段，
//! 端点位于骨架的共享坐标空间（armature 本地空间）。

use glam::{Mat4, Vec3};

/// 骨骼节点
///
/// 构建后不可变；重新调整骨架时整体重建，而不是逐根修改。
#[derive(Clone, Debug)]
pub struct Bone {
    /// 骨骼名称（骨架内唯一）
    pub name: String,

    /// 骨骼内部索引
    pub(crate) index: usize,

    /// 父骨骼索引（None 表示根骨骼）
    pub(crate) parent: Option<usize>,

    /// 起点（armature 空间）
    pub head: Vec3,

    /// 终点（armature 空间）
    pub tail: Vec3,
}

impl Bone {
    pub(crate) fn new(name: String, index: usize, parent: Option<usize>, head: Vec3, tail: Vec3) -> Self {
        Self {
            name,
            index,
            parent,
            head,
            tail,
        }
    }

    // ========================================
    // 访问器
    // ========================================

    /// 骨骼索引
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// 父骨骼索引
    #[inline]
    pub fn parent_id(&self) -> Option<usize> {
        self.parent
    }

    /// 是否为根骨骼
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// head → tail 向量（armature 空间）
    #[inline]
    pub fn vector(&self) -> Vec3 {
        self.tail - self.head
    }

    /// 骨骼长度（armature 空间）
    #[inline]
    pub fn length(&self) -> f32 {
        self.vector().length()
    }

    /// 世界空间起点
    #[inline]
    pub fn head_world(&self, world: &Mat4) -> Vec3 {
        world.transform_point3(self.head)
    }

    /// 世界空间终点
    #[inline]
    pub fn tail_world(&self, world: &Mat4) -> Vec3 {
        world.transform_point3(self.tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bone_accessors() {
        let bone = Bone::new(
            "UpperArm.L".to_string(),
            3,
            Some(2),
            Vec3::new(-0.25, 0.0, 1.55),
            Vec3::new(-0.25, 0.0, 1.25),
        );

        assert_eq!(bone.index(), 3);
        assert_eq!(bone.parent_id(), Some(2));
        assert!(!bone.is_root());
        assert!((bone.length() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_world_endpoints() {
        let bone = Bone::new("Root".to_string(), 0, None, Vec3::ZERO, Vec3::Z);
        let world = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));

        assert!(bone.is_root());
        assert!(bone.head_world(&world).abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-6));
        assert!(bone.tail_world(&world).abs_diff_eq(Vec3::new(1.0, 2.0, 4.0), 1e-6));
    }
}
