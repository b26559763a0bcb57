//! 骨骼几何查询与对齐旋转
//!
//! - BoneGeometry: 由 head/tail 派生的中点、长度、方向（世界空间，不缓存）
//! - alignment_rotation: 把参考轴旋到骨骼方向的最小旋转
//! - twist_rotation: 绕骨骼自身轴的附加扭转

use glam::{Mat4, Quat, Vec3};

use crate::skeleton::Bone;
use crate::{Result, RigError};

/// 退化骨骼判定阈值
pub const DEGENERATE_EPSILON: f32 = 1.0e-6;

/// 叉积退化（平行/反平行）判定阈值
pub const PARALLEL_EPSILON: f32 = 1.0e-4;

/// 骨骼几何数据（世界空间）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoneGeometry {
    pub head: Vec3,
    pub tail: Vec3,
    pub midpoint: Vec3,
    pub length: f32,
    /// 单位方向 head → tail
    pub direction: Vec3,
}

impl BoneGeometry {
    /// 计算骨骼几何数据
    ///
    /// 长度低于 `epsilon` 时方向无定义，返回 `DegenerateBone`。
    pub fn compute(bone: &Bone, world: &Mat4, epsilon: f32) -> Result<Self> {
        Self::from_endpoints(
            &bone.name,
            bone.head_world(world),
            bone.tail_world(world),
            epsilon,
        )
    }

    /// 由世界空间端点计算
    pub fn from_endpoints(name: &str, head: Vec3, tail: Vec3, epsilon: f32) -> Result<Self> {
        let delta = tail - head;
        let length = delta.length();

        if !(length >= epsilon) {
            return Err(RigError::DegenerateBone {
                name: name.to_string(),
                length,
            });
        }

        Ok(Self {
            head,
            tail,
            midpoint: (head + tail) * 0.5,
            length,
            direction: delta / length,
        })
    }

    /// 沿骨骼的插值点（0 = head，1 = tail）
    #[inline]
    pub fn point_at(&self, fraction: f32) -> Vec3 {
        self.head + self.direction * (self.length * fraction)
    }
}

/// 骨骼几何查询
///
/// 返回 (midpoint, length, direction, head_world, tail_world) 所需的全部数据。
pub fn geometry_of(bone: &Bone, world: &Mat4) -> Result<BoneGeometry> {
    BoneGeometry::compute(bone, world, DEGENERATE_EPSILON)
}

// ============================================================================
// 旋转
// ============================================================================

/// 把单位向量 `reference` 旋到单位向量 `direction` 的最小旋转
///
/// 叉积长度低于 `parallel_epsilon` 时：同向返回单位旋转，
/// 反向返回绕任一垂直轴的 180° 旋转。
pub fn alignment_rotation(reference: Vec3, direction: Vec3, parallel_epsilon: f32) -> Quat {
    let axis = reference.cross(direction);

    if axis.length() < parallel_epsilon {
        if reference.dot(direction) >= 0.0 {
            return Quat::IDENTITY;
        }
        return Quat::from_axis_angle(perpendicular(reference), std::f32::consts::PI);
    }

    let angle = reference.dot(direction).clamp(-1.0, 1.0).acos();
    Quat::from_axis_angle(axis.normalize(), angle)
}

/// 绕骨骼方向的扭转
#[inline]
pub fn twist_rotation(direction: Vec3, angle: f32) -> Quat {
    if angle == 0.0 {
        Quat::IDENTITY
    } else {
        Quat::from_axis_angle(direction, angle)
    }
}

/// 对齐后再扭转：final = twist ∘ align
#[inline]
pub fn aligned_with_twist(reference: Vec3, direction: Vec3, twist: f32, parallel_epsilon: f32) -> Quat {
    let align = alignment_rotation(reference, direction, parallel_epsilon);
    (twist_rotation(direction, twist) * align).normalize()
}

/// 与 `v` 垂直的单位向量
///
/// 优先取 `v × X`，`v` 接近 X 轴时改用 `v × Y`。
/// 对 Z 参考轴得到 +Y，左右镜像下保持不变。
pub fn perpendicular(v: Vec3) -> Vec3 {
    let helper = if v.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    v.cross(helper).normalize()
}
