//! 贴合网格装配
//!
//! 对骨架中每根骨骼查目录、调用贴合引擎，按身体部位分组输出。
//! 单条规则失败只记录诊断并跳过，不中断整批生成。

use rayon::prelude::*;

use crate::catalog::{Catalog, PartMask, ResolvedRule};
use crate::fitting::{FittedPrimitive, PrimitiveFitter};
use crate::mesh::{self, MergedMesh};
use crate::skeleton::{BoneGroup, Skeleton};
use crate::RigError;

/// 单条规则的失败记录
#[derive(Debug)]
pub struct FitFailure {
    pub bone: String,
    pub mesh_name: String,
    pub error: RigError,
}

/// 一次贴合的结果
#[derive(Debug, Default)]
pub struct FitReport {
    /// 脊柱、头、左右臂、左右手指、左右腿
    pub primitives: Vec<FittedPrimitive>,
    pub failures: Vec<FitFailure>,
}

impl FitReport {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn primitive(&self, name: &str) -> Option<&FittedPrimitive> {
        self.primitives.iter().find(|p| p.name == name)
    }

    pub fn for_bone<'a>(&'a self, bone: &'a str) -> impl Iterator<Item = &'a FittedPrimitive> + 'a {
        self.primitives.iter().filter(move |p| p.bone == bone)
    }

    /// 合并请求（全局配置）
    pub fn merge(&self) -> MergedMesh {
        mesh::merge(&self.primitives)
    }
}

/// 为骨架贴合全部部位
pub fn fit_skeleton(skeleton: &Skeleton, catalog: &Catalog) -> FitReport {
    fit_skeleton_parts(skeleton, catalog, PartMask::all())
}

/// 只贴合 `mask` 中的部位
pub fn fit_skeleton_parts(skeleton: &Skeleton, catalog: &Catalog, mask: PartMask) -> FitReport {
    fit_skeleton_with(&PrimitiveFitter::new(), skeleton, catalog, mask)
}

/// 使用指定贴合器
pub fn fit_skeleton_with(fitter: &PrimitiveFitter, skeleton: &Skeleton, catalog: &Catalog, mask: PartMask) -> FitReport {
    let rules = ordered_rules(skeleton, catalog, mask);

    let results: Vec<_> = if fitter.config().parallel_fitting {
        rules.par_iter().map(|rule| fitter.fit(skeleton, rule)).collect()
    } else {
        rules.iter().map(|rule| fitter.fit(skeleton, rule)).collect()
    };

    let mut report = FitReport::default();
    report.primitives.reserve(rules.len());

    for (rule, result) in rules.into_iter().zip(results) {
        match result {
            Ok(primitive) => report.primitives.push(primitive),
            Err(error) => {
                log::warn!("[Fit] '{}' ({}) 贴合失败，跳过: {}", rule.mesh_name, rule.bone, error);
                report.failures.push(FitFailure {
                    bone: rule.bone,
                    mesh_name: rule.mesh_name,
                    error,
                });
            }
        }
    }

    log::info!(
        "[Fit] 骨架 '{}': {} 个图元, {} 个失败",
        skeleton.name(),
        report.primitives.len(),
        report.failures.len()
    );

    report
}

/// 规则顺序：有规则的骨骼按身体部位分组（脊柱、头、左右臂、左右手指、左右腿），
/// 组内按目录条目顺序，与骨架的存储顺序无关；
/// 随后按目录顺序列出引用了缺失骨骼的规则（它们将以 `UnknownBone` 失败）
fn ordered_rules(skeleton: &Skeleton, catalog: &Catalog, mask: PartMask) -> Vec<ResolvedRule> {
    let in_mask = |rule: &ResolvedRule| mask.contains(rule.part.mask());

    let mut present: Vec<((usize, usize, usize), ResolvedRule)> = skeleton
        .traversal()
        .filter_map(|bone| {
            let rank = BoneGroup::classify(&bone.name).rank();
            catalog
                .lookup(&bone.name)
                .map(|rule| ((rank, rule.entry, bone.index()), rule))
        })
        .filter(|(_, rule)| in_mask(rule))
        .collect();
    present.sort_by_key(|(key, _)| *key);

    let missing = catalog
        .resolve()
        .into_iter()
        .filter(|rule| !skeleton.contains(&rule.bone))
        .filter(in_mask);

    present.into_iter().map(|(_, rule)| rule).chain(missing).collect()
}
