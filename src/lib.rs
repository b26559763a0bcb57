//! Rig Fit - 人形骨架生成与骨骼贴合代理网格
//!
//! 提供：
//! - 骨架模型（带父子关系的骨骼层级，显式 head/tail 端点）
//! - 人形骨架数据表（手工调整版与程序化镜像版）
//! - 骨骼几何查询（中点、长度、方向）
//! - 图元贴合引擎（圆柱、球、带扭转的定向盒、锥台）
//! - 原型目录（骨骼名 → 图元规则）
//! - 贴合网格装配（按骨架遍历顺序输出，并烘焙/合并顶点）
//!
//! 蒙皮权重计算、资源读写、材质都由外部流程负责。

pub mod assembly;
pub mod catalog;
pub mod fitting;
pub mod geometry;
pub mod mesh;
pub mod skeleton;

pub use assembly::{fit_skeleton, fit_skeleton_parts, fit_skeleton_with, FitFailure, FitReport};
pub use catalog::{
    ArchetypeKind, ArchetypeRule, BodyPart, BoneSelector, Catalog, CatalogEntry, PartMask, Radius, ResolvedRule,
    Side, SphereAnchor,
};
pub use fitting::{FitConfig, FittedPrimitive, PrimitiveFitter, PrimitiveTransform};
pub use geometry::{geometry_of, BoneGeometry};
pub use mesh::{merge, MergedMesh, MeshData};
pub use skeleton::{Bone, BoneDef, Skeleton, SkeletonDef};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RigError {
    #[error("degenerate bone '{name}': length {length} is below epsilon")]
    DegenerateBone { name: String, length: f32 },

    #[error("unknown bone: {0}")]
    UnknownBone(String),

    #[error("invalid hierarchy: bone '{bone}' cannot resolve parent '{parent}'")]
    CyclicHierarchy { bone: String, parent: String },

    #[error("duplicate bone: {0}")]
    DuplicateBone(String),

    #[error("invalid rule for '{selector}': {reason}")]
    InvalidRule { selector: String, reason: String },

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RigError>;
