//! 图元贴合
//!
//! 变换顺序固定：局部缩放 → 旋转（先对齐再扭转）→ 平移到中心。
//! 烘焙时把组合变换直接作用在规范单位图元的顶点上。

mod config;
mod engine;

pub use config::{get_config, reset_config, set_config, FitConfig};
pub use engine::{fit_box, fit_cone, fit_cylinder, fit_sphere, PrimitiveFitter};

use glam::{Mat3, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::catalog::{ArchetypeKind, BodyPart};
use crate::mesh::{primitives, MeshData};

// ============================================================================
// 图元变换
// ============================================================================

/// 图元变换（局部缩放、旋转、平移）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for PrimitiveTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl PrimitiveTransform {
    /// 转换为 4x4 矩阵
    #[inline]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// 从矩阵分解
    #[inline]
    pub fn from_matrix(m: Mat4) -> Self {
        let (scale, rotation, translation) = m.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// 变换局部点
    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.translation + self.rotation * (self.scale * local)
    }

    /// 法线矩阵（逆转置）
    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_quat(self.rotation) * Mat3::from_diagonal(self.scale.recip())
    }

    /// 局部主轴（+Z）在世界空间的朝向
    #[inline]
    pub fn axis(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }
}

// ============================================================================
// 贴合结果
// ============================================================================

/// 贴合结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPrimitive {
    /// 输出网格名
    pub name: String,
    /// 来源骨骼名
    pub bone: String,
    pub kind: ArchetypeKind,
    pub part: BodyPart,
    pub transform: PrimitiveTransform,
    /// 锥台顶/底半径比，其他图元为 1
    pub top_ratio: f32,
}

impl FittedPrimitive {
    #[inline]
    pub fn center(&self) -> Vec3 {
        self.transform.translation
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    /// 局部尺寸（单位图元的缩放）
    #[inline]
    pub fn extents(&self) -> Vec3 {
        self.transform.scale
    }

    /// 圆柱/锥台底面半径，球为 X 向半径
    #[inline]
    pub fn radius(&self) -> f32 {
        self.transform.scale.x
    }

    /// 沿主轴的高度
    #[inline]
    pub fn height(&self) -> f32 {
        match self.kind {
            ArchetypeKind::Sphere => self.transform.scale.z * 2.0,
            _ => self.transform.scale.z,
        }
    }

    /// 烘焙到世界空间
    ///
    /// 生成规范单位图元（主轴 +Z）并施加组合变换。
    pub fn bake(&self, config: &FitConfig) -> MeshData {
        let unit = match self.kind {
            ArchetypeKind::Cylinder => primitives::unit_cylinder(config.cylinder_segments),
            ArchetypeKind::Sphere => primitives::unit_sphere(config.sphere_segments, config.sphere_rings),
            ArchetypeKind::OrientedBox => primitives::unit_cube(),
            ArchetypeKind::Cone => primitives::unit_cone(self.top_ratio, config.cone_segments),
        };

        unit.transformed(&self.transform)
    }
}
