//! 网格数据 - 规范单位图元与合并请求
//!
//! 单位图元都在局部空间生成，主轴为 +Z，中心在原点。

mod merge;
pub mod primitives;

pub use merge::{merge, merge_with, MergedMesh, PartRange};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::fitting::PrimitiveTransform;

/// 三角网格（位置 + 法线）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加顶点，返回索引
    #[inline]
    pub fn add_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        index
    }

    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// 施加图元变换（位置：缩放 → 旋转 → 平移；法线：逆转置后归一化）
    pub fn transformed(&self, transform: &PrimitiveTransform) -> Self {
        let normal_matrix = transform.normal_matrix();

        Self {
            positions: self.positions.iter().map(|&p| transform.transform_point(p)).collect(),
            normals: self
                .normals
                .iter()
                .map(|&n| (normal_matrix * n).normalize_or_zero())
                .collect(),
            indices: self.indices.clone(),
        }
    }

    /// 追加另一网格，返回其顶点偏移
    pub fn append(&mut self, other: &MeshData) -> u32 {
        let offset = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|&i| offset + i));
        offset
    }

    /// 轴对齐包围盒 (min, max)，空网格返回原点
    pub fn bounds(&self) -> (Vec3, Vec3) {
        if self.positions.is_empty() {
            return (Vec3::ZERO, Vec3::ZERO);
        }
        self.positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), &p| (min.min(p), max.max(p)),
        )
    }
}
