//! 贴合引擎 - 骨骼 + 规则 → 图元变换
//!
//! 每次贴合只读取该骨骼自身的几何与规则，互不依赖，可任意并行。

use glam::{Quat, Vec3};

use super::{get_config, FitConfig, FittedPrimitive, PrimitiveTransform};
use crate::catalog::{ArchetypeRule, ResolvedRule, SphereAnchor};
use crate::geometry::{aligned_with_twist, alignment_rotation, BoneGeometry};
use crate::skeleton::Skeleton;
use crate::Result;

// ============================================================================
// 纯函数
// ============================================================================

/// 局部 +Z 到参考轴的基变换，参考轴为 +Z 时为单位旋转
#[inline]
fn reference_basis(config: &FitConfig) -> Quat {
    Quat::from_rotation_arc(Vec3::Z, config.reference_axis)
}

/// 圆柱：中心在骨骼中点，缩放 (r, r, length)
pub fn fit_cylinder(geom: &BoneGeometry, radius: f32, config: &FitConfig) -> PrimitiveTransform {
    let align = alignment_rotation(config.reference_axis, geom.direction, config.parallel_epsilon);

    PrimitiveTransform {
        translation: geom.midpoint,
        rotation: (align * reference_basis(config)).normalize(),
        scale: Vec3::new(radius, radius, geom.length),
    }
}

/// 球：各向同性，不旋转
pub fn fit_sphere(center: Vec3, radius: f32, squash: Vec3) -> PrimitiveTransform {
    PrimitiveTransform {
        translation: center,
        rotation: Quat::IDENTITY,
        scale: squash * radius,
    }
}

/// 定向盒
///
/// `ratios` 为 (宽, 深, 长) 相对骨长的比例；中心位于
/// `head + direction * length * placement`；旋转为 twist ∘ align。
pub fn fit_box(geom: &BoneGeometry, ratios: Vec3, placement: f32, twist: f32, config: &FitConfig) -> PrimitiveTransform {
    let rotation = aligned_with_twist(config.reference_axis, geom.direction, twist, config.parallel_epsilon);

    PrimitiveTransform {
        translation: geom.point_at(placement),
        rotation: (rotation * reference_basis(config)).normalize(),
        scale: ratios * geom.length,
    }
}

/// 锥台：`span` 为从底面中心到顶面中心的线段
pub fn fit_cone(span: &BoneGeometry, bottom_radius: f32, squash: Vec3, config: &FitConfig) -> PrimitiveTransform {
    let align = alignment_rotation(config.reference_axis, span.direction, config.parallel_epsilon);

    PrimitiveTransform {
        translation: span.midpoint,
        rotation: (align * reference_basis(config)).normalize(),
        scale: Vec3::new(bottom_radius * squash.x, bottom_radius * squash.y, span.length * squash.z),
    }
}

// ============================================================================
// 引擎
// ============================================================================

/// 图元贴合器
#[derive(Debug, Clone)]
pub struct PrimitiveFitter {
    config: FitConfig,
}

impl Default for PrimitiveFitter {
    fn default() -> Self {
        Self::new()
    }
}

impl PrimitiveFitter {
    /// 使用全局配置
    pub fn new() -> Self {
        Self::with_config(get_config())
    }

    pub fn with_config(mut config: FitConfig) -> Self {
        config.reference_axis = config.reference_axis.try_normalize().unwrap_or(Vec3::Z);
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// 骨骼世界空间几何
    pub fn geometry(&self, skeleton: &Skeleton, bone_name: &str) -> Result<BoneGeometry> {
        let bone = skeleton.require(bone_name)?;
        BoneGeometry::compute(bone, &skeleton.world_transform(), self.config.degenerate_epsilon)
    }

    /// 为一条展开后的规则贴合图元
    ///
    /// 规则引用的骨骼不存在时返回 `UnknownBone`，骨骼退化时返回 `DegenerateBone`。
    pub fn fit(&self, skeleton: &Skeleton, resolved: &ResolvedRule) -> Result<FittedPrimitive> {
        resolved.rule.validate(&resolved.bone)?;

        let (transform, top_ratio) = self.fit_rule(skeleton, &resolved.bone, &resolved.rule)?;

        if self.config.debug_log {
            log::debug!(
                "[Fit] {} ← {} ({:?}): center={:?}, scale={:?}",
                resolved.mesh_name,
                resolved.bone,
                resolved.rule.kind(),
                transform.translation,
                transform.scale
            );
        }

        Ok(FittedPrimitive {
            name: resolved.mesh_name.clone(),
            bone: resolved.bone.clone(),
            kind: resolved.rule.kind(),
            part: resolved.part,
            transform,
            top_ratio,
        })
    }

    /// 按规则计算变换，返回 (变换, 锥台顶底比)
    pub fn fit_rule(&self, skeleton: &Skeleton, bone_name: &str, rule: &ArchetypeRule) -> Result<(PrimitiveTransform, f32)> {
        let geom = self.geometry(skeleton, bone_name)?;
        let config = &self.config;

        let fitted = match rule {
            ArchetypeRule::Cylinder { radius } => (fit_cylinder(&geom, radius.resolve(geom.length), config), 1.0),

            ArchetypeRule::Sphere {
                radius,
                anchor,
                squash,
                reference_bone,
            } => {
                let length = match reference_bone {
                    Some(name) => self.geometry(skeleton, name)?.length,
                    None => geom.length,
                };
                let center = match anchor {
                    SphereAnchor::Midpoint => geom.midpoint,
                    SphereAnchor::Head => geom.head,
                };
                (fit_sphere(center, radius.resolve(length), *squash), 1.0)
            }

            ArchetypeRule::OrientedBox {
                width_ratio,
                depth_ratio,
                length_ratio,
                placement,
                twist,
            } => {
                let ratios = Vec3::new(*width_ratio, *depth_ratio, *length_ratio);
                (fit_box(&geom, ratios, *placement, *twist, config), 1.0)
            }

            ArchetypeRule::Cone {
                end_bone,
                bottom_radius,
                top_radius,
                squash,
            } => {
                let end = self.geometry(skeleton, end_bone)?;
                let span = BoneGeometry::from_endpoints(
                    &format!("{}..{}", bone_name, end_bone),
                    geom.head,
                    end.tail,
                    config.degenerate_epsilon,
                )?;
                (fit_cone(&span, *bottom_radius, *squash, config), top_radius / bottom_radius)
            }
        };

        Ok(fitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{humanoid, ArchetypeKind, BodyPart, Catalog, CatalogEntry, Radius, Side};
    use crate::skeleton::humanoid::{extracted, procedural, Proportions};
    use crate::RigError;
    use glam::Mat3;
    use std::f32::consts::PI;

    fn fitter() -> PrimitiveFitter {
        PrimitiveFitter::with_config(FitConfig::default())
    }

    fn arm_skeleton() -> Skeleton {
        let mut skeleton = Skeleton::new("Arm");
        skeleton
            .add_bone("UpperArm.L", None, Vec3::new(-0.25, 0.0, 1.55), Vec3::new(-0.25, 0.0, 1.25))
            .unwrap();
        skeleton
    }

    fn resolved(bone: &str, rule: ArchetypeRule) -> ResolvedRule {
        ResolvedRule {
            entry: 0,
            bone: bone.to_string(),
            side: None,
            mesh_name: format!("{}_Mesh", bone),
            part: BodyPart::Arm,
            rule,
        }
    }

    #[test]
    fn test_upper_arm_cylinder() {
        let skeleton = arm_skeleton();
        let rule = resolved("UpperArm.L", ArchetypeRule::cylinder(Radius::Ratio(0.2)));
        let p = fitter().fit(&skeleton, &rule).unwrap();

        assert_eq!(p.kind, ArchetypeKind::Cylinder);
        assert_eq!(p.bone, "UpperArm.L");
        assert!(p.center().abs_diff_eq(Vec3::new(-0.25, 0.0, 1.40), 1e-5));
        assert!((p.radius() - 0.06).abs() < 1e-5);
        assert!((p.height() - 0.30).abs() < 1e-5);
        assert!(p.transform.axis().abs_diff_eq(Vec3::NEG_Z, 1e-5));

        let (axis, angle) = p.rotation().to_axis_angle();
        assert!((angle - PI).abs() < 1e-4);
        assert!(axis.dot(Vec3::Z).abs() < 1e-5);
    }

    #[test]
    fn test_direction_correctness_on_rig() {
        let skeleton = extracted().unwrap();
        let fitter = fitter();

        for rule in humanoid().resolve() {
            let p = fitter.fit(&skeleton, &rule).unwrap();
            if matches!(p.kind, ArchetypeKind::Cylinder | ArchetypeKind::OrientedBox) {
                let dir = fitter.geometry(&skeleton, &rule.bone).unwrap().direction;
                assert!(p.transform.axis().dot(dir) > 1.0 - 1e-5, "{}", rule.bone);
            }
        }
    }

    #[test]
    fn test_box_placement_fraction() {
        let mut skeleton = Skeleton::new("Hand");
        let head = Vec3::new(0.3, 0.0, 1.0);
        let tail = Vec3::new(0.3, 0.0, 0.9);
        skeleton.add_bone("Hand.R", None, head, tail).unwrap();
        let fitter = fitter();

        for (placement, expected) in [(0.0, head), (1.0, tail), (0.7, head.lerp(tail, 0.7))] {
            let rule = resolved("Hand.R", ArchetypeRule::oriented_box(0.7, 0.4, 1.0, placement, 0.3));
            let p = fitter.fit(&skeleton, &rule).unwrap();
            assert!(p.center().abs_diff_eq(expected, 1e-5), "{}", placement);
        }
    }

    #[test]
    fn test_box_extents() {
        let skeleton = arm_skeleton();
        let rule = resolved("UpperArm.L", ArchetypeRule::oriented_box(0.7, 0.4, 1.0, 0.5, 0.0));
        let p = fitter().fit(&skeleton, &rule).unwrap();
        assert!(p.extents().abs_diff_eq(Vec3::new(0.21, 0.12, 0.30), 1e-5));
    }

    #[test]
    fn test_zero_twist_matches_cylinder() {
        let skeleton = extracted().unwrap();
        let fitter = fitter();
        for bone in ["Hand.L", "Foot.R", "UpperArm.R"] {
            let cyl = fitter
                .fit(&skeleton, &resolved(bone, ArchetypeRule::cylinder(Radius::Absolute(0.05))))
                .unwrap();
            let cube = fitter
                .fit(&skeleton, &resolved(bone, ArchetypeRule::oriented_box(0.5, 0.5, 1.0, 0.5, 0.0)))
                .unwrap();
            assert!(cyl.rotation().abs_diff_eq(cube.rotation(), 1e-6), "{}", bone);
        }
    }

    #[test]
    fn test_twist_rotates_about_bone_axis() {
        let skeleton = extracted().unwrap();
        let fitter = fitter();
        let twist = 75f32.to_radians();

        let plain = fitter
            .fit(&skeleton, &resolved("Hand.L", ArchetypeRule::oriented_box(0.7, 0.4, 1.0, 0.7, 0.0)))
            .unwrap();
        let twisted = fitter
            .fit(&skeleton, &resolved("Hand.L", ArchetypeRule::oriented_box(0.7, 0.4, 1.0, 0.7, twist)))
            .unwrap();

        assert!(plain.transform.axis().abs_diff_eq(twisted.transform.axis(), 1e-5));
        let cos = (plain.rotation() * Vec3::X).dot(twisted.rotation() * Vec3::X);
        assert!((cos - twist.cos()).abs() < 1e-4);
    }

    #[test]
    fn test_mirrored_pairs_are_symmetric() {
        let skeleton = procedural(&Proportions::default()).unwrap();
        let fitter = fitter();
        let mirror = Mat3::from_diagonal(Vec3::new(-1.0, 1.0, 1.0));
        let catalog = humanoid();

        let mut checked = 0;
        for left in catalog.resolve().into_iter().filter(|r| r.side == Some(Side::Left)) {
            let (base, _) = Side::split(&left.bone).unwrap();
            let right = catalog.lookup(&Side::Right.apply(base)).unwrap();

            let l = fitter.fit(&skeleton, &left).unwrap();
            let r = fitter.fit(&skeleton, &right).unwrap();

            assert!(r.extents().abs_diff_eq(l.extents(), 1e-5), "{}", base);
            assert!(r.center().abs_diff_eq(mirror * l.center(), 1e-5), "{}", base);

            let (lx, ly, lz) = (l.rotation() * Vec3::X, l.rotation() * Vec3::Y, l.rotation() * Vec3::Z);
            let (rx, ry, rz) = (r.rotation() * Vec3::X, r.rotation() * Vec3::Y, r.rotation() * Vec3::Z);
            assert!(rx.abs_diff_eq(-(mirror * lx), 1e-4), "{}", base);
            assert!(ry.abs_diff_eq(mirror * ly, 1e-4), "{}", base);
            assert!(rz.abs_diff_eq(mirror * lz, 1e-4), "{}", base);
            checked += 1;
        }
        assert_eq!(checked, 22);
    }

    #[test]
    fn test_degenerate_bone_not_fitted() {
        let mut skeleton = Skeleton::new("Broken");
        skeleton.add_bone("Hand.L", None, Vec3::ONE, Vec3::ONE).unwrap();

        for rule in [
            ArchetypeRule::cylinder(Radius::Ratio(0.2)),
            ArchetypeRule::sphere(Radius::Absolute(0.1)),
            ArchetypeRule::oriented_box(0.7, 0.4, 1.0, 0.7, 1.0),
        ] {
            let err = fitter().fit(&skeleton, &resolved("Hand.L", rule)).unwrap_err();
            assert!(matches!(err, RigError::DegenerateBone { .. }));
        }
    }

    #[test]
    fn test_unknown_bone() {
        let skeleton = arm_skeleton();
        let err = fitter()
            .fit(&skeleton, &resolved("Hand.Missing", ArchetypeRule::cylinder(Radius::Ratio(0.2))))
            .unwrap_err();
        assert!(matches!(err, RigError::UnknownBone(ref name) if name == "Hand.Missing"));
    }

    #[test]
    fn test_invalid_rule_rejected() {
        let skeleton = arm_skeleton();
        let rule = resolved("UpperArm.L", ArchetypeRule::oriented_box(0.7, 0.4, 1.0, -0.1, 0.0));
        assert!(matches!(fitter().fit(&skeleton, &rule), Err(RigError::InvalidRule { .. })));
    }

    #[test]
    fn test_sphere_rules() {
        let skeleton = extracted().unwrap();
        let fitter = fitter();
        let catalog = humanoid();

        let head = fitter.fit(&skeleton, &catalog.lookup("Head").unwrap()).unwrap();
        assert!(head.center().abs_diff_eq(Vec3::new(0.0, 0.0, 1.825), 1e-5));
        assert!((head.radius() - 0.125).abs() < 1e-5);
        assert_eq!(head.rotation(), Quat::IDENTITY);

        let pelvis = fitter.fit(&skeleton, &catalog.lookup("Root").unwrap()).unwrap();
        assert_eq!(pelvis.name, "Pelvis_Mesh");
        assert!(pelvis.extents().abs_diff_eq(Vec3::new(0.195, 0.075, 0.0825), 1e-5));

        let anchored = ArchetypeRule::Sphere {
            radius: Radius::Ratio(0.5),
            anchor: SphereAnchor::Head,
            squash: Vec3::ONE,
            reference_bone: Some("Neck".to_string()),
        };
        let p = fitter.fit(&skeleton, &resolved("Head", anchored)).unwrap();
        assert!(p.center().abs_diff_eq(Vec3::new(0.0, 0.0, 1.70), 1e-5));
        assert!((p.radius() - 0.025).abs() < 1e-5);
    }

    #[test]
    fn test_torso_cone() {
        let skeleton = extracted().unwrap();
        let torso = fitter().fit(&skeleton, &humanoid().lookup("Spine_01").unwrap()).unwrap();

        assert_eq!(torso.kind, ArchetypeKind::Cone);
        assert!(torso.center().abs_diff_eq(Vec3::new(0.0, 0.0, 1.35), 1e-5));
        assert!(torso.extents().abs_diff_eq(Vec3::new(0.15, 0.0975, 0.60), 1e-5));
        assert!((torso.top_ratio - 0.25 / 0.15).abs() < 1e-5);
        assert!(torso.transform.axis().abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn test_cone_unknown_end_bone() {
        let skeleton = arm_skeleton();
        let rule = ArchetypeRule::Cone {
            end_bone: "Spine_03".to_string(),
            bottom_radius: 0.15,
            top_radius: 0.25,
            squash: Vec3::ONE,
        };
        let err = fitter().fit(&skeleton, &resolved("UpperArm.L", rule)).unwrap_err();
        assert!(matches!(err, RigError::UnknownBone(ref name) if name == "Spine_03"));
    }

    #[test]
    fn test_custom_reference_axis_keeps_local_z_on_bone() {
        let config = FitConfig {
            reference_axis: Vec3::Y,
            ..FitConfig::default()
        };
        let fitter = PrimitiveFitter::with_config(config);
        let skeleton = extracted().unwrap();
        let catalog = Catalog::new().with(CatalogEntry::paired(
            "Foot",
            BodyPart::Foot,
            ArchetypeRule::oriented_box(0.55, 0.28, 0.9, 0.6, 0.0),
        ));

        for rule in catalog.resolve() {
            let p = fitter.fit(&skeleton, &rule).unwrap();
            let dir = fitter.geometry(&skeleton, &rule.bone).unwrap().direction;
            assert!(p.transform.axis().dot(dir) > 1.0 - 1e-5);
        }
    }

    #[test]
    fn test_world_transform_applied() {
        let skeleton = arm_skeleton().with_world_transform(glam::Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)));
        let p = fitter()
            .fit(&skeleton, &resolved("UpperArm.L", ArchetypeRule::cylinder(Radius::Ratio(0.2))))
            .unwrap();
        assert!(p.center().abs_diff_eq(Vec3::new(-0.25, 1.0, 1.40), 1e-5));
    }
}
