//! 人形默认目录
//!
//! 肢体半径为绝对值（米），头部球半径为骨长一半。
//! 条目顺序：骨盆、躯干、头、手臂、手指、腿，同组图元按此顺序输出。

use glam::Vec3;

use super::{ArchetypeRule, BodyPart, Catalog, CatalogEntry, Radius, SphereAnchor};
use crate::skeleton::humanoid::{FINGERS, FINGER_JOINTS};

/// 手掌盒扭转角（度），左侧为正，右侧镜像
pub const HAND_TWIST_DEGREES: f32 = 75.0;

const UPPER_ARM_RADIUS: f32 = 0.06;
const FORE_ARM_RADIUS: f32 = 0.05;
const UPPER_LEG_RADIUS: f32 = 0.08;
const LOWER_LEG_RADIUS: f32 = 0.06;
const TOE_RADIUS: f32 = 0.04;
const FINGER_RADIUS: f32 = 0.01;

/// 默认人形目录
pub fn humanoid() -> Catalog {
    let mut catalog = Catalog::new()
        .with(
            CatalogEntry::exact(
                "Root",
                BodyPart::Pelvis,
                ArchetypeRule::Sphere {
                    radius: Radius::Absolute(0.15),
                    anchor: SphereAnchor::Midpoint,
                    squash: Vec3::new(1.3, 0.5, 0.55),
                    reference_bone: None,
                },
            )
            .with_label("Pelvis"),
        )
        .with(
            CatalogEntry::exact(
                "Spine_01",
                BodyPart::Torso,
                ArchetypeRule::Cone {
                    end_bone: "Spine_03".to_string(),
                    bottom_radius: 0.15,
                    top_radius: 0.25,
                    squash: Vec3::new(1.0, 0.65, 1.0),
                },
            )
            .with_label("Torso"),
        )
        .with(CatalogEntry::exact("Head", BodyPart::Head, ArchetypeRule::sphere(Radius::Ratio(0.5))))
        .with(CatalogEntry::paired(
            "UpperArm",
            BodyPart::Arm,
            ArchetypeRule::cylinder(Radius::Absolute(UPPER_ARM_RADIUS)),
        ))
        .with(CatalogEntry::paired(
            "ForeArm",
            BodyPart::Arm,
            ArchetypeRule::cylinder(Radius::Absolute(FORE_ARM_RADIUS)),
        ))
        .with(CatalogEntry::paired(
            "Hand",
            BodyPart::Hand,
            ArchetypeRule::oriented_box(0.7, 0.4, 1.0, 0.7, HAND_TWIST_DEGREES.to_radians()),
        ));

    for finger in FINGERS {
        for joint in FINGER_JOINTS {
            catalog.push(CatalogEntry::paired(
                &format!("{}_{}", finger, joint),
                BodyPart::Finger,
                ArchetypeRule::cylinder(Radius::Absolute(FINGER_RADIUS)),
            ));
        }
    }

    catalog
        .with(CatalogEntry::paired(
            "UpperLeg",
            BodyPart::Leg,
            ArchetypeRule::cylinder(Radius::Absolute(UPPER_LEG_RADIUS)),
        ))
        .with(CatalogEntry::paired(
            "LowerLeg",
            BodyPart::Leg,
            ArchetypeRule::cylinder(Radius::Absolute(LOWER_LEG_RADIUS)),
        ))
        .with(CatalogEntry::paired(
            "Foot",
            BodyPart::Foot,
            ArchetypeRule::oriented_box(0.55, 0.28, 0.9, 0.6, 0.0),
        ))
        .with(CatalogEntry::paired(
            "Toe",
            BodyPart::Foot,
            ArchetypeRule::cylinder(Radius::Absolute(TOE_RADIUS)),
        ))
}
