//! 贴合配置
//!
//! 参数扁平化，全局实例可在运行时替换。

use glam::Vec3;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

use crate::geometry::{DEGENERATE_EPSILON, PARALLEL_EPSILON};
use crate::Result;

/// 贴合配置（扁平化，不嵌套）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    // ========== 数值阈值 ==========
    /// 退化骨骼长度阈值，默认 1e-6
    pub degenerate_epsilon: f32,
    /// 平行判定的叉积长度阈值，默认 1e-4
    pub parallel_epsilon: f32,

    // ========== 朝向 ==========
    /// 图元局部主轴，默认 +Z
    pub reference_axis: Vec3,

    // ========== 网格分段 ==========
    /// 圆柱周向分段，默认 32
    pub cylinder_segments: u32,
    /// 球经向分段，默认 32
    pub sphere_segments: u32,
    /// 球纬向分段，默认 16
    pub sphere_rings: u32,
    /// 锥台周向分段，默认 8
    pub cone_segments: u32,

    // ========== 执行 ==========
    /// 批量贴合是否并行
    pub parallel_fitting: bool,

    // ========== 调试 ==========
    /// 是否输出每个图元的调试日志，默认 false
    pub debug_log: bool,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            degenerate_epsilon: DEGENERATE_EPSILON,
            parallel_epsilon: PARALLEL_EPSILON,

            reference_axis: Vec3::Z,

            cylinder_segments: 32,
            sphere_segments: 32,
            sphere_rings: 16,
            // 躯干锥台保持低多边形
            cone_segments: 8,

            parallel_fitting: true,

            debug_log: false,
        }
    }
}

impl FitConfig {
    /// 从 JSON 读取，缺省字段取默认值
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        config.reference_axis = config.reference_axis.try_normalize().unwrap_or(Vec3::Z);
        Ok(config)
    }
}

/// 全局配置实例
static FIT_CONFIG: Lazy<RwLock<FitConfig>> = Lazy::new(|| RwLock::new(FitConfig::default()));

/// 获取当前配置（只读）
pub fn get_config() -> FitConfig {
    FIT_CONFIG.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// 手动设置配置
pub fn set_config(config: FitConfig) {
    *FIT_CONFIG.write().unwrap_or_else(|e| e.into_inner()) = config;
}

/// 重置为默认配置
pub fn reset_config() {
    *FIT_CONFIG.write().unwrap_or_else(|e| e.into_inner()) = FitConfig::default();
}
