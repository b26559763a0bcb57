//! 合并请求 - 烘焙后的图元拼接为单一网格
//!
//! 每个顶点记录来源骨骼的顶点组，供外部蒙皮流程使用。

use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

use super::MeshData;
use crate::catalog::BodyPart;
use crate::fitting::{get_config, FitConfig, FittedPrimitive};

/// 合并网格中某个图元占用的区间
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartRange {
    pub name: String,
    pub bone: String,
    pub part: BodyPart,
    pub vertex_start: u32,
    pub vertex_count: u32,
    pub index_start: u32,
    pub index_count: u32,
}

/// 合并后的网格
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergedMesh {
    pub mesh: MeshData,
    /// 顶点组名（骨骼名，按首次出现排序）
    pub vertex_groups: Vec<String>,
    /// 每个顶点所属的顶点组
    pub vertex_group_index: Vec<u32>,
    /// 按输入顺序
    pub parts: Vec<PartRange>,
}

impl MergedMesh {
    /// 顶点所属骨骼名
    pub fn group_of(&self, vertex: usize) -> Option<&str> {
        let group = *self.vertex_group_index.get(vertex)?;
        self.vertex_groups.get(group as usize).map(String::as_str)
    }

    pub fn part(&self, name: &str) -> Option<&PartRange> {
        self.parts.iter().find(|p| p.name == name)
    }
}

/// 使用全局配置合并
pub fn merge(primitives: &[FittedPrimitive]) -> MergedMesh {
    merge_with(primitives, &get_config())
}

/// 烘焙并合并图元
pub fn merge_with(primitives: &[FittedPrimitive], config: &FitConfig) -> MergedMesh {
    let baked: Vec<MeshData> = if config.parallel_fitting {
        primitives.par_iter().map(|p| p.bake(config)).collect()
    } else {
        primitives.iter().map(|p| p.bake(config)).collect()
    };

    let mut merged = MergedMesh::default();
    let total_vertices: usize = baked.iter().map(MeshData::vertex_count).sum();
    merged.mesh.positions.reserve(total_vertices);
    merged.mesh.normals.reserve(total_vertices);
    merged.vertex_group_index.reserve(total_vertices);

    let mut group_ids: HashMap<&str, u32> = HashMap::new();

    for (primitive, mesh) in primitives.iter().zip(&baked) {
        let group = *group_ids.entry(primitive.bone.as_str()).or_insert_with(|| {
            merged.vertex_groups.push(primitive.bone.clone());
            (merged.vertex_groups.len() - 1) as u32
        });

        let index_start = merged.mesh.indices.len() as u32;
        let vertex_start = merged.mesh.append(mesh);
        merged
            .vertex_group_index
            .extend(std::iter::repeat(group).take(mesh.vertex_count()));

        merged.parts.push(PartRange {
            name: primitive.name.clone(),
            bone: primitive.bone.clone(),
            part: primitive.part,
            vertex_start,
            vertex_count: mesh.vertex_count() as u32,
            index_start,
            index_count: mesh.indices.len() as u32,
        });
    }

    log::info!(
        "[Merge] {} 个图元 → {} 顶点, {} 三角形, {} 个顶点组",
        primitives.len(),
        merged.mesh.vertex_count(),
        merged.mesh.triangle_count(),
        merged.vertex_groups.len()
    );

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ArchetypeKind;
    use crate::fitting::PrimitiveTransform;
    use glam::Vec3;

    fn primitive(name: &str, bone: &str, kind: ArchetypeKind, at: Vec3) -> FittedPrimitive {
        FittedPrimitive {
            name: name.to_string(),
            bone: bone.to_string(),
            kind,
            part: BodyPart::Hand,
            transform: PrimitiveTransform {
                translation: at,
                ..Default::default()
            },
            top_ratio: 1.0,
        }
    }

    #[test]
    fn test_merge_ranges_and_groups() {
        let config = FitConfig {
            parallel_fitting: false,
            ..FitConfig::default()
        };
        let primitives = [
            primitive("A_Mesh", "A", ArchetypeKind::OrientedBox, Vec3::ZERO),
            primitive("B_Mesh", "B", ArchetypeKind::Cylinder, Vec3::X),
            primitive("A2_Mesh", "A", ArchetypeKind::OrientedBox, Vec3::Y),
        ];
        let merged = merge_with(&primitives, &config);

        assert_eq!(merged.vertex_groups, vec!["A", "B"]);
        assert_eq!(merged.parts.len(), 3);
        assert_eq!(merged.mesh.vertex_count(), merged.vertex_group_index.len());

        let b = merged.part("B_Mesh").unwrap();
        assert_eq!(b.vertex_start, 24);
        assert_eq!(merged.group_of(b.vertex_start as usize), Some("B"));

        let a2 = merged.part("A2_Mesh").unwrap();
        assert_eq!(merged.group_of(a2.vertex_start as usize), Some("A"));
        assert_eq!(a2.vertex_count, 24);

        let max_index = *merged.mesh.indices.iter().max().unwrap();
        assert_eq!(max_index as usize, merged.mesh.vertex_count() - 1);
        assert!(merged.mesh.positions[a2.vertex_start as usize].y > 0.4);
    }

    #[test]
    fn test_parallel_and_serial_agree() {
        let primitives: Vec<_> = (0..8)
            .map(|i| primitive(&format!("P{i}"), &format!("B{i}"), ArchetypeKind::Sphere, Vec3::splat(i as f32)))
            .collect();
        let serial = merge_with(
            &primitives,
            &FitConfig {
                parallel_fitting: false,
                ..FitConfig::default()
            },
        );
        let parallel = merge_with(&primitives, &FitConfig::default());
        assert_eq!(serial.mesh, parallel.mesh);
        assert_eq!(serial.vertex_group_index, parallel.vertex_group_index);
    }

    #[test]
    fn test_merge_empty() {
        let merged = merge_with(&[], &FitConfig::default());
        assert!(merged.mesh.is_empty());
        assert!(merged.parts.is_empty());
    }
}
