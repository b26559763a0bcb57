//! 骨架分析 - 按身体部位分组列出骨骼
//!
//! 报告使用世界空间坐标，导出的定义表可直接作为新骨架的数据表。

use std::fmt;

use glam::Vec3;

use super::{BoneDef, Skeleton, SkeletonDef};

/// 骨骼分组
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoneGroup {
    Spine,
    Head,
    ArmsLeft,
    ArmsRight,
    FingersLeft,
    FingersRight,
    LegsLeft,
    LegsRight,
    Other,
}

impl BoneGroup {
    /// 报告中的分组顺序
    pub const ALL: [BoneGroup; 9] = [
        BoneGroup::Spine,
        BoneGroup::Head,
        BoneGroup::ArmsLeft,
        BoneGroup::ArmsRight,
        BoneGroup::FingersLeft,
        BoneGroup::FingersRight,
        BoneGroup::LegsLeft,
        BoneGroup::LegsRight,
        BoneGroup::Other,
    ];

    /// 按骨骼名称分类（子串匹配，先匹配者优先）
    pub fn classify(name: &str) -> Self {
        let has = |keys: &[&str]| keys.iter().any(|k| name.contains(k));
        let left = name.contains(".L");
        let right = name.contains(".R");

        if has(&["Root", "Spine", "Neck"]) {
            BoneGroup::Spine
        } else if name.contains("Head") {
            BoneGroup::Head
        } else if has(&["Shoulder", "Arm", "Hand"]) && left {
            BoneGroup::ArmsLeft
        } else if has(&["Shoulder", "Arm", "Hand"]) && right {
            BoneGroup::ArmsRight
        } else if has(&["Thumb", "Index", "Middle", "Ring", "Pinky"]) && left {
            BoneGroup::FingersLeft
        } else if has(&["Thumb", "Index", "Middle", "Ring", "Pinky"]) && right {
            BoneGroup::FingersRight
        } else if has(&["Leg", "Foot", "Toe"]) && left {
            BoneGroup::LegsLeft
        } else if has(&["Leg", "Foot", "Toe"]) && right {
            BoneGroup::LegsRight
        } else {
            BoneGroup::Other
        }
    }

    /// 在 `ALL` 中的位置，也是贴合输出的分组顺序
    #[inline]
    pub fn rank(&self) -> usize {
        *self as usize
    }

    pub fn label(&self) -> &'static str {
        match self {
            BoneGroup::Spine => "Spine",
            BoneGroup::Head => "Head",
            BoneGroup::ArmsLeft => "Arms_L",
            BoneGroup::ArmsRight => "Arms_R",
            BoneGroup::FingersLeft => "Fingers_L",
            BoneGroup::FingersRight => "Fingers_R",
            BoneGroup::LegsLeft => "Legs_L",
            BoneGroup::LegsRight => "Legs_R",
            BoneGroup::Other => "Other",
        }
    }
}

/// 报告中的单根骨骼（世界空间）
#[derive(Clone, Debug)]
pub struct BoneEntry {
    pub name: String,
    pub parent: Option<String>,
    pub head: Vec3,
    pub tail: Vec3,
}

/// 骨架分析报告
#[derive(Clone, Debug)]
pub struct SkeletonReport {
    pub armature: String,
    pub bone_count: usize,
    /// 非空分组，按 `BoneGroup::ALL` 顺序
    pub groups: Vec<(BoneGroup, Vec<BoneEntry>)>,
}

impl SkeletonReport {
    /// 指定分组的骨骼
    pub fn group(&self, group: BoneGroup) -> &[BoneEntry] {
        self.groups
            .iter()
            .find(|(g, _)| *g == group)
            .map(|(_, entries)| entries.as_slice())
            .unwrap_or(&[])
    }

    /// 导出为骨架定义表（分组顺序，世界坐标）
    pub fn to_def(&self) -> SkeletonDef {
        SkeletonDef {
            name: self.armature.clone(),
            bones: self
                .groups
                .iter()
                .flat_map(|(_, entries)| entries)
                .map(|e| BoneDef {
                    name: e.name.clone(),
                    parent: e.parent.clone(),
                    head: e.head,
                    tail: e.tail,
                })
                .collect(),
        }
    }
}

/// 分析骨架
pub fn analyze(skeleton: &Skeleton) -> SkeletonReport {
    let world = skeleton.world_transform();

    let groups = BoneGroup::ALL
        .iter()
        .filter_map(|&group| {
            let entries: Vec<BoneEntry> = skeleton
                .bones()
                .iter()
                .filter(|bone| BoneGroup::classify(&bone.name) == group)
                .map(|bone| BoneEntry {
                    name: bone.name.clone(),
                    parent: skeleton.parent_of(bone).map(|p| p.name.clone()),
                    head: bone.head_world(&world),
                    tail: bone.tail_world(&world),
                })
                .collect();
            (!entries.is_empty()).then_some((group, entries))
        })
        .collect();

    SkeletonReport {
        armature: skeleton.name().to_string(),
        bone_count: skeleton.len(),
        groups,
    }
}

impl fmt::Display for SkeletonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let point = |v: Vec3| format!("({:.4}, {:.4}, {:.4})", v.x, v.y, v.z);

        writeln!(f, "Armature: {}", self.armature)?;
        writeln!(f, "Total bones: {}", self.bone_count)?;

        for (group, entries) in &self.groups {
            writeln!(f)?;
            writeln!(f, "### {} ###", group.label())?;
            for entry in entries {
                writeln!(f, "  {}:", entry.name)?;
                writeln!(f, "    Head: {}", point(entry.head))?;
                writeln!(f, "    Tail: {}", point(entry.tail))?;
                if let Some(ref parent) = entry.parent {
                    writeln!(f, "    Parent: {}", parent)?;
                }
            }
        }

        Ok(())
    }
}
