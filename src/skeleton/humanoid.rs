//! 人形骨架数据表
//!
//! - `extracted`: 手工调整后提取的精确骨骼坐标（52 根）
//! - `procedural`: 由比例参数程序化生成的镜像骨架
//!
//! 坐标系：Z 向上，+Y 为脚尖朝向，角色左侧为 -X。

use glam::Vec3;

use super::Skeleton;
use crate::catalog::Side;
use crate::Result;

/// 默认骨架名称
pub const ARMATURE_NAME: &str = "PlayerArmature";

/// 手指名称（拇指到小指）
pub const FINGERS: [&str; 5] = ["Thumb", "Index", "Middle", "Ring", "Pinky"];

/// 指节编号
pub const FINGER_JOINTS: [&str; 3] = ["01", "02", "03"];

// ============================================================================
// 手工调整骨架
// ============================================================================

type BoneRow = (&'static str, Option<&'static str>, [f32; 3], [f32; 3]);

#[rustfmt::skip]
const EXTRACTED_BONES: &[BoneRow] = &[
    // 脊柱
    ("Root", None, [0.0000, 0.0000, 0.9000], [0.0000, 0.0000, 1.0500]),
    ("Spine_01", Some("Root"), [0.0000, 0.0000, 1.0500], [0.0000, 0.0000, 1.2500]),
    ("Spine_02", Some("Spine_01"), [0.0000, 0.0000, 1.2500], [0.0000, 0.0000, 1.4500]),
    ("Spine_03", Some("Spine_02"), [0.0000, 0.0000, 1.4500], [0.0000, 0.0000, 1.6500]),
    ("Neck", Some("Spine_03"), [0.0000, 0.0000, 1.6500], [0.0000, 0.0000, 1.7000]),
    // 头
    ("Head", Some("Neck"), [0.0000, 0.0000, 1.7000], [0.0000, 0.0000, 1.9500]),
    // 左臂
    ("Shoulder.L", Some("Spine_03"), [-0.1000, 0.0000, 1.6132], [-0.2541, 0.0072, 1.6121]),
    ("UpperArm.L", Some("Shoulder.L"), [-0.2541, 0.0072, 1.6121], [-0.2693, 0.0041, 1.3125]),
    ("ForeArm.L", Some("UpperArm.L"), [-0.2693, 0.0041, 1.3125], [-0.2870, -0.0024, 1.0131]),
    ("Hand.L", Some("ForeArm.L"), [-0.2870, -0.0024, 1.0131], [-0.2921, -0.0034, 0.9132]),
    // 右臂
    ("Shoulder.R", Some("Spine_03"), [0.1000, 0.0000, 1.6132], [0.2579, 0.0109, 1.6095]),
    ("UpperArm.R", Some("Shoulder.R"), [0.2585, 0.0084, 1.6096], [0.2895, 0.0034, 1.3112]),
    ("ForeArm.R", Some("UpperArm.R"), [0.2895, 0.0034, 1.3112], [0.3206, -0.0017, 1.0129]),
    ("Hand.R", Some("ForeArm.R"), [0.3206, -0.0017, 1.0129], [0.3310, -0.0034, 0.9134]),
    // 左手指
    ("Thumb_01.L", Some("Hand.L"), [-0.2982, 0.0259, 0.9333], [-0.3050, 0.0449, 0.8934]),
    ("Thumb_02.L", Some("Thumb_01.L"), [-0.3050, 0.0449, 0.8934], [-0.3111, 0.0620, 0.8575]),
    ("Thumb_03.L", Some("Thumb_02.L"), [-0.3111, 0.0620, 0.8575], [-0.3166, 0.0772, 0.8255]),
    ("Index_01.L", Some("Hand.L"), [-0.2968, 0.0160, 0.9133], [-0.2991, 0.0155, 0.8683]),
    ("Index_02.L", Some("Index_01.L"), [-0.2991, 0.0155, 0.8683], [-0.3012, 0.0151, 0.8279]),
    ("Index_03.L", Some("Index_02.L"), [-0.3012, 0.0151, 0.8279], [-0.3030, 0.0147, 0.7919]),
    ("Middle_01.L", Some("Hand.L"), [-0.2921, -0.0034, 0.9132], [-0.2946, -0.0039, 0.8633]),
    ("Middle_02.L", Some("Middle_01.L"), [-0.2946, -0.0039, 0.8633], [-0.2969, -0.0044, 0.8184]),
    ("Middle_03.L", Some("Middle_02.L"), [-0.2969, -0.0044, 0.8184], [-0.2989, -0.0048, 0.7784]),
    ("Ring_01.L", Some("Hand.L"), [-0.2873, -0.0229, 0.9132], [-0.2896, -0.0233, 0.8683]),
    ("Ring_02.L", Some("Ring_01.L"), [-0.2896, -0.0233, 0.8683], [-0.2916, -0.0237, 0.8278]),
    ("Ring_03.L", Some("Ring_02.L"), [-0.2916, -0.0237, 0.8278], [-0.2934, -0.0241, 0.7919]),
    ("Pinky_01.L", Some("Hand.L"), [-0.2825, -0.0423, 0.9132], [-0.2845, -0.0427, 0.8732]),
    ("Pinky_02.L", Some("Pinky_01.L"), [-0.2845, -0.0427, 0.8732], [-0.2864, -0.0431, 0.8373]),
    ("Pinky_03.L", Some("Pinky_02.L"), [-0.2864, -0.0431, 0.8373], [-0.2880, -0.0434, 0.8053]),
    // 右手指
    ("Thumb_01.R", Some("Hand.R"), [0.3223, 0.0270, 0.9321], [0.3221, 0.0463, 0.8915]),
    ("Thumb_02.R", Some("Thumb_01.R"), [0.3221, 0.0463, 0.8915], [0.3219, 0.0637, 0.8550]),
    ("Thumb_03.R", Some("Thumb_02.R"), [0.3219, 0.0637, 0.8550], [0.3217, 0.0792, 0.8225]),
    ("Index_01.R", Some("Hand.R"), [0.3266, 0.0166, 0.9126], [0.3313, 0.0159, 0.8679]),
    ("Index_02.R", Some("Index_01.R"), [0.3313, 0.0159, 0.8679], [0.3355, 0.0152, 0.8276]),
    ("Index_03.R", Some("Index_02.R"), [0.3355, 0.0152, 0.8276], [0.3377, 0.0139, 0.7916]),
    ("Middle_01.R", Some("Hand.R"), [0.3310, -0.0034, 0.9134], [0.3362, -0.0042, 0.8637]),
    ("Middle_02.R", Some("Middle_01.R"), [0.3362, -0.0042, 0.8637], [0.3408, -0.0050, 0.8189]),
    ("Middle_03.R", Some("Middle_02.R"), [0.3408, -0.0050, 0.8189], [0.3450, -0.0056, 0.7792]),
    ("Ring_01.R", Some("Hand.R"), [0.3354, -0.0234, 0.9142], [0.3400, -0.0241, 0.8695]),
    ("Ring_02.R", Some("Ring_01.R"), [0.3400, -0.0241, 0.8695], [0.3442, -0.0248, 0.8292]),
    ("Ring_03.R", Some("Ring_02.R"), [0.3442, -0.0248, 0.8292], [0.3480, -0.0254, 0.7934]),
    ("Pinky_01.R", Some("Hand.R"), [0.3398, -0.0434, 0.9150], [0.3439, -0.0441, 0.8752]),
    ("Pinky_02.R", Some("Pinky_01.R"), [0.3439, -0.0441, 0.8752], [0.3515, -0.0428, 0.8398]),
    ("Pinky_03.R", Some("Pinky_02.R"), [0.3476, -0.0447, 0.8394], [0.3510, -0.0452, 0.8076]),
    // 左腿
    ("UpperLeg.L", Some("Root"), [-0.1500, 0.0000, 0.9000], [-0.1500, 0.0000, 0.4500]),
    ("LowerLeg.L", Some("UpperLeg.L"), [-0.1500, 0.0000, 0.4500], [-0.1500, 0.0000, 0.0500]),
    ("Foot.L", Some("LowerLeg.L"), [-0.1500, 0.0000, 0.0500], [-0.1500, 0.1500, 0.0000]),
    ("Toe.L", Some("Foot.L"), [-0.1500, 0.1500, 0.0000], [-0.1500, 0.2500, 0.0000]),
    // 右腿
    ("UpperLeg.R", Some("Root"), [0.1500, 0.0000, 0.9000], [0.1500, 0.0000, 0.4500]),
    ("LowerLeg.R", Some("UpperLeg.R"), [0.1500, 0.0000, 0.4500], [0.1500, 0.0000, 0.0500]),
    ("Foot.R", Some("LowerLeg.R"), [0.1500, 0.0000, 0.0500], [0.1500, 0.1500, 0.0000]),
    ("Toe.R", Some("Foot.R"), [0.1500, 0.1500, 0.0000], [0.1500, 0.2500, 0.0000]),
];

/// 手工调整后的人形骨架
pub fn extracted() -> Result<Skeleton> {
    let mut skeleton = Skeleton::new(ARMATURE_NAME);
    for &(name, parent, head, tail) in EXTRACTED_BONES {
        skeleton.add_bone(name, parent, Vec3::from_array(head), Vec3::from_array(tail))?;
    }
    log::debug!("手工骨架构建完成: {} 根骨骼", skeleton.len());
    Ok(skeleton)
}

// ============================================================================
// 程序化骨架
// ============================================================================

/// 人形比例（单位：米，角色站立于原点）
#[derive(Debug, Clone)]
pub struct Proportions {
    /// 髋部（Root head）高度
    pub hip_height: f32,
    /// 各脊柱节段顶端高度（Root tail, Spine_01..03 tail）
    pub spine_heights: [f32; 4],
    /// 颈部顶端高度
    pub neck_top: f32,
    /// 头顶高度
    pub head_top: f32,

    /// 锁骨内侧 X 偏移
    pub shoulder_inner: f32,
    /// 手臂所在 X 偏移
    pub arm_offset: f32,
    /// 肩高
    pub shoulder_height: f32,
    /// 肘高
    pub elbow_height: f32,
    /// 腕高
    pub wrist_height: f32,
    /// 手掌末端高度
    pub hand_tip: f32,

    /// 髋关节 X 偏移
    pub hip_offset: f32,
    /// 膝高
    pub knee_height: f32,
    /// 踝高
    pub ankle_height: f32,
    /// 脚掌前伸距离（Foot tail 的 Y）
    pub foot_forward: f32,
    /// 脚尖前伸距离（Toe tail 的 Y）
    pub toe_forward: f32,
}

impl Default for Proportions {
    fn default() -> Self {
        Self {
            hip_height: 0.9,
            spine_heights: [1.05, 1.25, 1.45, 1.65],
            neck_top: 1.70,
            head_top: 1.95,

            shoulder_inner: 0.1,
            arm_offset: 0.25,
            shoulder_height: 1.55,
            elbow_height: 1.25,
            wrist_height: 0.95,
            hand_tip: 0.85,

            hip_offset: 0.15,
            knee_height: 0.45,
            ankle_height: 0.05,
            foot_forward: 0.15,
            toe_forward: 0.25,
        }
    }
}

/// 手指布局：名称、相对手臂的 X 偏移、相对手掌末端的 Z 偏移、指节方向
///
/// X 分量在左侧取镜像。
#[rustfmt::skip]
const FINGER_LAYOUT: [(&str, f32, f32, [f32; 3]); 5] = [
    ("Thumb", 0.03, 0.02, [0.02, 0.0, -0.04]),
    ("Index", 0.02, 0.0, [0.0, 0.0, -0.045]),
    ("Middle", 0.0, 0.0, [0.0, 0.0, -0.05]),
    ("Ring", -0.02, 0.0, [0.0, 0.0, -0.045]),
    ("Pinky", -0.04, 0.0, [0.0, 0.0, -0.04]),
];

/// 第二、三节指节终点相对方向向量的倍数
const FINGER_SPANS: [f32; 3] = [1.0, 1.9, 2.7];

/// 程序化人形骨架（左右严格镜像）
pub fn procedural(p: &Proportions) -> Result<Skeleton> {
    let mut skeleton = Skeleton::new(ARMATURE_NAME);

    build_spine_chain(&mut skeleton, p)?;
    for side in Side::BOTH {
        build_arm_chain(&mut skeleton, p, side)?;
    }
    for side in Side::BOTH {
        build_leg_chain(&mut skeleton, p, side)?;
    }

    log::debug!("程序化骨架构建完成: {} 根骨骼", skeleton.len());
    Ok(skeleton)
}

fn build_spine_chain(skeleton: &mut Skeleton, p: &Proportions) -> Result<()> {
    let up = |z: f32| Vec3::new(0.0, 0.0, z);
    let [root_top, spine1_top, spine2_top, spine3_top] = p.spine_heights;

    skeleton.add_bone("Root", None, up(p.hip_height), up(root_top))?;
    skeleton.add_bone("Spine_01", Some("Root"), up(root_top), up(spine1_top))?;
    skeleton.add_bone("Spine_02", Some("Spine_01"), up(spine1_top), up(spine2_top))?;
    skeleton.add_bone("Spine_03", Some("Spine_02"), up(spine2_top), up(spine3_top))?;
    skeleton.add_bone("Neck", Some("Spine_03"), up(spine3_top), up(p.neck_top))?;
    skeleton.add_bone("Head", Some("Neck"), up(p.neck_top), up(p.head_top))?;
    Ok(())
}

/// 手臂链：锁骨 → 上臂 → 前臂 → 手 → 五指（手臂自然下垂）
fn build_arm_chain(skeleton: &mut Skeleton, p: &Proportions, side: Side) -> Result<()> {
    let m = side.mirror();
    let shoulder = side.apply("Shoulder");
    let upper_arm = side.apply("UpperArm");
    let fore_arm = side.apply("ForeArm");
    let hand = side.apply("Hand");
    let arm_x = m * p.arm_offset;

    skeleton.add_bone(
        &shoulder,
        Some("Spine_03"),
        Vec3::new(m * p.shoulder_inner, 0.0, p.shoulder_height),
        Vec3::new(arm_x, 0.0, p.shoulder_height),
    )?;
    skeleton.add_bone(
        &upper_arm,
        Some(shoulder.as_str()),
        Vec3::new(arm_x, 0.0, p.shoulder_height),
        Vec3::new(arm_x, 0.0, p.elbow_height),
    )?;
    skeleton.add_bone(
        &fore_arm,
        Some(upper_arm.as_str()),
        Vec3::new(arm_x, 0.0, p.elbow_height),
        Vec3::new(arm_x, 0.0, p.wrist_height),
    )?;
    skeleton.add_bone(
        &hand,
        Some(fore_arm.as_str()),
        Vec3::new(arm_x, 0.0, p.wrist_height),
        Vec3::new(arm_x, 0.0, p.hand_tip),
    )?;

    for (finger, dx, dz, dir) in FINGER_LAYOUT {
        let start = Vec3::new(m * (p.arm_offset + dx), 0.0, p.hand_tip + dz);
        let direction = Vec3::new(m * dir[0], dir[1], dir[2]);
        build_finger(skeleton, &hand, finger, side, start, direction)?;
    }

    Ok(())
}

/// 三节手指
fn build_finger(
    skeleton: &mut Skeleton,
    hand: &str,
    finger: &str,
    side: Side,
    start: Vec3,
    direction: Vec3,
) -> Result<()> {
    let mut parent = hand.to_string();
    let mut head = start;

    for (joint, span) in FINGER_JOINTS.iter().zip(FINGER_SPANS) {
        let name = side.apply(&format!("{finger}_{joint}"));
        let tail = start + direction * span;
        skeleton.add_bone(&name, Some(parent.as_str()), head, tail)?;
        parent = name;
        head = tail;
    }

    Ok(())
}

/// 腿部链：大腿 → 小腿 → 脚 → 脚趾
fn build_leg_chain(skeleton: &mut Skeleton, p: &Proportions, side: Side) -> Result<()> {
    let x = side.mirror() * p.hip_offset;
    let upper_leg = side.apply("UpperLeg");
    let lower_leg = side.apply("LowerLeg");
    let foot = side.apply("Foot");
    let toe = side.apply("Toe");

    skeleton.add_bone(
        &upper_leg,
        Some("Root"),
        Vec3::new(x, 0.0, p.hip_height),
        Vec3::new(x, 0.0, p.knee_height),
    )?;
    skeleton.add_bone(
        &lower_leg,
        Some(upper_leg.as_str()),
        Vec3::new(x, 0.0, p.knee_height),
        Vec3::new(x, 0.0, p.ankle_height),
    )?;
    skeleton.add_bone(
        &foot,
        Some(lower_leg.as_str()),
        Vec3::new(x, 0.0, p.ankle_height),
        Vec3::new(x, p.foot_forward, 0.0),
    )?;
    skeleton.add_bone(
        &toe,
        Some(foot.as_str()),
        Vec3::new(x, p.foot_forward, 0.0),
        Vec3::new(x, p.toe_forward, 0.0),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracted_bone_count() {
        let skeleton = extracted().unwrap();
        assert_eq!(skeleton.len(), 52);
        assert_eq!(skeleton.name(), ARMATURE_NAME);
        assert_eq!(skeleton.roots().count(), 1);
    }

    #[test]
    fn test_extracted_hand_tail_meets_middle_finger() {
        let skeleton = extracted().unwrap();
        let hand = skeleton.bone("Hand.L").unwrap();
        let middle = skeleton.bone("Middle_01.L").unwrap();
        assert!(hand.tail.abs_diff_eq(middle.head, 1e-6));
        assert_eq!(skeleton.parent_of(middle).unwrap().name, "Hand.L");
    }

    #[test]
    fn test_procedural_matches_extracted_names() {
        let extracted = extracted().unwrap();
        let procedural = procedural(&Proportions::default()).unwrap();

        assert_eq!(procedural.len(), extracted.len());
        for bone in extracted.bones() {
            let other = procedural.bone(&bone.name).unwrap();
            let parent = extracted.parent_of(bone).map(|b| b.name.as_str());
            let other_parent = procedural.parent_of(other).map(|b| b.name.as_str());
            assert_eq!(parent, other_parent, "{}", bone.name);
        }
    }

    #[test]
    fn test_procedural_is_mirrored() {
        let skeleton = procedural(&Proportions::default()).unwrap();
        let flip = |v: Vec3| Vec3::new(-v.x, v.y, v.z);

        for bone in skeleton.bones().iter().filter(|b| b.name.ends_with(".L")) {
            let right_name = format!("{}.R", bone.name.trim_end_matches(".L"));
            let right = skeleton.bone(&right_name).unwrap();
            assert!(flip(bone.head).abs_diff_eq(right.head, 1e-6), "{}", bone.name);
            assert!(flip(bone.tail).abs_diff_eq(right.tail, 1e-6), "{}", bone.name);
        }

        // 左侧位于 -X
        for side in Side::BOTH {
            let leg = skeleton.bone(&side.apply("UpperLeg")).unwrap();
            assert_eq!(leg.head.x.signum(), side.mirror());
        }
    }

    #[test]
    fn test_procedural_finger_chain() {
        let skeleton = procedural(&Proportions::default()).unwrap();
        let tip = skeleton.bone("Middle_03.R").unwrap();
        // start + direction * 2.7
        assert!(tip.tail.abs_diff_eq(Vec3::new(0.25, 0.0, 0.85 - 0.05 * 2.7), 1e-5));
        let thumb = skeleton.bone("Thumb_01.L").unwrap();
        assert!(thumb.head.abs_diff_eq(Vec3::new(-0.28, 0.0, 0.87), 1e-6));
    }
}
