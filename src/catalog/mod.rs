//! 原型目录 - 骨骼名称到图元规则的映射
//!
//! 匹配策略：
//! - 精确名称优先
//! - 成对肢体用基础名 + 侧后缀（`.L` / `.R`）匹配，两侧共享同一组比例
//!
//! 新增身体部位只需添加目录条目，贴合引擎不需要改动。

mod humanoid;

pub use humanoid::{humanoid, HAND_TWIST_DEGREES};

use std::collections::HashSet;
use std::fmt;

use bitflags::bitflags;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{Result, RigError};

// ============================================================================
// 原型与尺寸参数
// ============================================================================

/// 图元原型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchetypeKind {
    Cylinder,
    Sphere,
    OrientedBox,
    /// 锥台（躯干）
    Cone,
}

/// 半径：骨骼长度的比例或绝对值
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Radius {
    Ratio(f32),
    Absolute(f32),
}

impl Radius {
    /// 按骨骼长度求实际半径
    #[inline]
    pub fn resolve(&self, length: f32) -> f32 {
        match *self {
            Radius::Ratio(k) => length * k,
            Radius::Absolute(r) => r,
        }
    }

    #[inline]
    fn value(&self) -> f32 {
        match *self {
            Radius::Ratio(v) | Radius::Absolute(v) => v,
        }
    }
}

/// 球心位置
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SphereAnchor {
    #[default]
    Midpoint,
    Head,
}

fn unit_squash() -> Vec3 {
    Vec3::ONE
}

fn is_unit_squash(v: &Vec3) -> bool {
    *v == Vec3::ONE
}

/// 图元规则
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArchetypeRule {
    /// 圆柱：中心在骨骼中点，高度等于骨骼长度
    Cylinder { radius: Radius },

    /// 球：`reference_bone` 存在时半径比例取该骨骼长度
    Sphere {
        radius: Radius,
        #[serde(default)]
        anchor: SphereAnchor,
        #[serde(default = "unit_squash", skip_serializing_if = "is_unit_squash")]
        squash: Vec3,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reference_bone: Option<String>,
    },

    /// 定向盒：尺寸为骨骼长度的比例，中心位于 `placement`（0 = head，1 = tail），
    /// 对齐后再绕骨骼轴扭转 `twist`（弧度）
    OrientedBox {
        width_ratio: f32,
        depth_ratio: f32,
        length_ratio: f32,
        placement: f32,
        #[serde(default)]
        twist: f32,
    },

    /// 锥台：从本骨骼 head 延伸到 `end_bone` 的 tail
    Cone {
        end_bone: String,
        bottom_radius: f32,
        top_radius: f32,
        #[serde(default = "unit_squash", skip_serializing_if = "is_unit_squash")]
        squash: Vec3,
    },
}

impl ArchetypeRule {
    pub fn cylinder(radius: Radius) -> Self {
        ArchetypeRule::Cylinder { radius }
    }

    pub fn sphere(radius: Radius) -> Self {
        ArchetypeRule::Sphere {
            radius,
            anchor: SphereAnchor::Midpoint,
            squash: Vec3::ONE,
            reference_bone: None,
        }
    }

    pub fn oriented_box(width_ratio: f32, depth_ratio: f32, length_ratio: f32, placement: f32, twist: f32) -> Self {
        ArchetypeRule::OrientedBox {
            width_ratio,
            depth_ratio,
            length_ratio,
            placement,
            twist,
        }
    }

    pub fn kind(&self) -> ArchetypeKind {
        match self {
            ArchetypeRule::Cylinder { .. } => ArchetypeKind::Cylinder,
            ArchetypeRule::Sphere { .. } => ArchetypeKind::Sphere,
            ArchetypeRule::OrientedBox { .. } => ArchetypeKind::OrientedBox,
            ArchetypeRule::Cone { .. } => ArchetypeKind::Cone,
        }
    }

    /// 检查参数范围
    pub fn validate(&self, selector: &str) -> Result<()> {
        let invalid = |reason: String| RigError::InvalidRule {
            selector: selector.to_string(),
            reason,
        };
        let positive = |v: f32| v.is_finite() && v > 0.0;

        match self {
            ArchetypeRule::Cylinder { radius } => {
                if !positive(radius.value()) {
                    return Err(invalid(format!("radius must be > 0, got {}", radius.value())));
                }
            }
            ArchetypeRule::Sphere { radius, squash, .. } => {
                if !positive(radius.value()) {
                    return Err(invalid(format!("radius must be > 0, got {}", radius.value())));
                }
                if !squash.to_array().iter().all(|&s| positive(s)) {
                    return Err(invalid(format!("squash must be > 0, got {}", squash)));
                }
            }
            ArchetypeRule::OrientedBox {
                width_ratio,
                depth_ratio,
                length_ratio,
                placement,
                twist,
            } => {
                if ![*width_ratio, *depth_ratio, *length_ratio].iter().all(|&r| positive(r)) {
                    return Err(invalid("box ratios must be > 0".to_string()));
                }
                if !(0.0..=1.0).contains(placement) {
                    return Err(invalid(format!("placement must be in [0, 1], got {}", placement)));
                }
                if !twist.is_finite() {
                    return Err(invalid("twist must be finite".to_string()));
                }
            }
            ArchetypeRule::Cone {
                bottom_radius,
                top_radius,
                squash,
                ..
            } => {
                if !positive(*bottom_radius) {
                    return Err(invalid(format!("bottom radius must be > 0, got {}", bottom_radius)));
                }
                if !(top_radius.is_finite() && *top_radius >= 0.0) {
                    return Err(invalid(format!("top radius must be >= 0, got {}", top_radius)));
                }
                if !squash.to_array().iter().all(|&s| positive(s)) {
                    return Err(invalid(format!("squash must be > 0, got {}", squash)));
                }
            }
        }

        Ok(())
    }

    /// 为某一侧生成规则
    ///
    /// 引用的骨骼名加上侧后缀；`mirror_twist` 时右侧扭转角取反，
    /// 使左右两侧的图元互为 X 镜像。
    pub fn for_side(&self, side: Side, mirror_twist: bool) -> Self {
        let mut rule = self.clone();
        match &mut rule {
            ArchetypeRule::Sphere {
                reference_bone: Some(bone),
                ..
            } => *bone = side.apply(bone),
            ArchetypeRule::Cone { end_bone, .. } => *end_bone = side.apply(end_bone),
            ArchetypeRule::OrientedBox { twist, .. } => {
                if mirror_twist && side == Side::Right {
                    *twist = -*twist;
                }
            }
            _ => {}
        }
        rule
    }
}

// ============================================================================
// 选择器
// ============================================================================

/// 身体侧
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    #[inline]
    pub fn suffix(&self) -> &'static str {
        match self {
            Side::Left => ".L",
            Side::Right => ".R",
        }
    }

    /// 基础名加侧后缀
    #[inline]
    pub fn apply(&self, base: &str) -> String {
        format!("{}{}", base, self.suffix())
    }

    /// 拆分骨骼名为 (基础名, 侧)
    pub fn split(name: &str) -> Option<(&str, Side)> {
        Side::BOTH
            .iter()
            .find_map(|&side| name.strip_suffix(side.suffix()).map(|base| (base, side)))
    }

    /// X 镜像系数（左侧为 -1）
    #[inline]
    pub fn mirror(&self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// 骨骼选择器
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoneSelector {
    /// 精确骨骼名
    Exact(String),
    /// 成对肢体基础名，展开为 `.L` 与 `.R`
    Paired(String),
}

impl BoneSelector {
    /// 展开为具体骨骼名（成对时先左后右）
    pub fn bone_names(&self) -> Vec<(String, Option<Side>)> {
        match self {
            BoneSelector::Exact(name) => vec![(name.clone(), None)],
            BoneSelector::Paired(base) => Side::BOTH
                .iter()
                .map(|&side| (side.apply(base), Some(side)))
                .collect(),
        }
    }
}

impl fmt::Display for BoneSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoneSelector::Exact(name) => write!(f, "{}", name),
            BoneSelector::Paired(base) => write!(f, "{}.[L|R]", base),
        }
    }
}

// ============================================================================
// 身体部位
// ============================================================================

/// 身体部位
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Pelvis,
    Torso,
    Head,
    Arm,
    Hand,
    Finger,
    Leg,
    Foot,
}

bitflags! {
    /// 参与生成的身体部位
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PartMask: u32 {
        const PELVIS = 1 << 0;
        const TORSO = 1 << 1;
        const HEAD = 1 << 2;
        const ARMS = 1 << 3;
        const HANDS = 1 << 4;
        const FINGERS = 1 << 5;
        const LEGS = 1 << 6;
        const FEET = 1 << 7;
    }
}

impl Default for PartMask {
    fn default() -> Self {
        PartMask::all()
    }
}

impl BodyPart {
    pub fn mask(&self) -> PartMask {
        match self {
            BodyPart::Pelvis => PartMask::PELVIS,
            BodyPart::Torso => PartMask::TORSO,
            BodyPart::Head => PartMask::HEAD,
            BodyPart::Arm => PartMask::ARMS,
            BodyPart::Hand => PartMask::HANDS,
            BodyPart::Finger => PartMask::FINGERS,
            BodyPart::Leg => PartMask::LEGS,
            BodyPart::Foot => PartMask::FEET,
        }
    }
}

// ============================================================================
// 目录
// ============================================================================

fn default_true() -> bool {
    true
}

fn is_true(v: &bool) -> bool {
    *v
}

/// 目录条目
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub selector: BoneSelector,
    /// 输出网格名（缺省用骨骼名）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub part: BodyPart,
    /// 成对时右侧扭转取反
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub mirror_twist: bool,
    pub rule: ArchetypeRule,
}

impl CatalogEntry {
    pub fn exact(bone: &str, part: BodyPart, rule: ArchetypeRule) -> Self {
        Self {
            selector: BoneSelector::Exact(bone.to_string()),
            label: None,
            part,
            mirror_twist: true,
            rule,
        }
    }

    pub fn paired(base: &str, part: BodyPart, rule: ArchetypeRule) -> Self {
        Self {
            selector: BoneSelector::Paired(base.to_string()),
            label: None,
            part,
            mirror_twist: true,
            rule,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    fn resolve_for(&self, entry: usize, bone: String, side: Option<Side>) -> ResolvedRule {
        let rule = match side {
            Some(s) => self.rule.for_side(s, self.mirror_twist),
            None => self.rule.clone(),
        };
        let stem = match (&self.label, side) {
            (Some(label), Some(s)) => s.apply(label),
            (Some(label), None) => label.clone(),
            (None, _) => bone.clone(),
        };

        ResolvedRule {
            entry,
            mesh_name: format!("{}_Mesh", stem),
            bone,
            side,
            part: self.part,
            rule,
        }
    }
}

/// 展开到具体骨骼的规则
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRule {
    /// 目录条目序号
    pub entry: usize,
    pub bone: String,
    pub side: Option<Side>,
    pub mesh_name: String,
    pub part: BodyPart,
    pub rule: ArchetypeRule,
}

/// 原型目录
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: CatalogEntry) {
        self.entries.push(entry);
    }

    pub fn with(mut self, entry: CatalogEntry) -> Self {
        self.entries.push(entry);
        self
    }

    #[inline]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 检查全部规则；同一选择器只能出现一次
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !seen.insert(&entry.selector) {
                return Err(RigError::InvalidRule {
                    selector: entry.selector.to_string(),
                    reason: "duplicate selector".to_string(),
                });
            }
            entry.rule.validate(&entry.selector.to_string())?;
        }
        Ok(())
    }

    /// 按目录顺序展开全部规则
    pub fn resolve(&self) -> Vec<ResolvedRule> {
        self.entries
            .iter()
            .enumerate()
            .flat_map(|(i, entry)| {
                entry
                    .selector
                    .bone_names()
                    .into_iter()
                    .map(move |(bone, side)| entry.resolve_for(i, bone, side))
            })
            .collect()
    }

    /// 查找某根骨骼的规则：精确名称优先，其次按侧后缀匹配成对条目
    pub fn lookup(&self, bone_name: &str) -> Option<ResolvedRule> {
        let exact = self.entries.iter().enumerate().find(|(_, e)| {
            matches!(&e.selector, BoneSelector::Exact(name) if name == bone_name)
        });
        if let Some((i, entry)) = exact {
            return Some(entry.resolve_for(i, bone_name.to_string(), None));
        }

        let (base, side) = Side::split(bone_name)?;
        self.entries
            .iter()
            .enumerate()
            .find(|(_, e)| matches!(&e.selector, BoneSelector::Paired(b) if b == base))
            .map(|(i, entry)| entry.resolve_for(i, bone_name.to_string(), Some(side)))
    }

    /// 从 JSON 加载（加载后立即校验）
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
