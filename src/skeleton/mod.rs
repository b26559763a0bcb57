//! 骨架模型
//!
//! 核心设计思想：
//! - Bone: 单个骨骼，父骨骼以索引形式回指（不拥有）
//! - Skeleton: 拥有全部骨骼，维护名称查找与父先子后的存储顺序
//! - humanoid: 人形骨架数据表（配置数据，不是算法）
//! - analysis: 按身体部位分组的骨架报告

mod analysis;
mod bone;
mod bone_set;
pub mod humanoid;

pub use analysis::{analyze, BoneEntry, BoneGroup, SkeletonReport};
pub use bone::Bone;
pub use bone_set::Skeleton;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::Result;

// ============================================================================
// 骨架数据表（序列化格式）
// ============================================================================

/// 单根骨骼的定义
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoneDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub head: Vec3,
    pub tail: Vec3,
}

impl BoneDef {
    pub fn new(name: impl Into<String>, parent: Option<&str>, head: Vec3, tail: Vec3) -> Self {
        Self {
            name: name.into(),
            parent: parent.map(str::to_owned),
            head,
            tail,
        }
    }
}

/// 骨架定义表
///
/// 骨骼顺序任意，`Skeleton::from_def` 会做拓扑排序。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonDef {
    pub name: String,
    pub bones: Vec<BoneDef>,
}

impl SkeletonDef {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
