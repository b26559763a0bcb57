//! Rig Fit - 命令行驱动
//!
//! 构建人形骨架，按目录贴合图元，输出骨架报告或 JSON。
//!
//! # 用法
//!
//! ```bash
//! rig-fit                              # 手工骨架 + 默认目录，打印摘要
//! rig-fit --procedural --json          # 程序化骨架，图元输出为 JSON
//! rig-fit --report                     # 骨架分组报告
//! rig-fit --skeleton rig.json --catalog parts.json --only arms --only hands
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use rig_fit::fitting::{set_config, FitConfig};
use rig_fit::skeleton::{analyze, humanoid};
use rig_fit::{fit_skeleton_parts, Catalog, PartMask, Skeleton, SkeletonDef};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PartArg {
    Pelvis,
    Torso,
    Head,
    Arms,
    Hands,
    Fingers,
    Legs,
    Feet,
}

impl PartArg {
    fn mask(self) -> PartMask {
        match self {
            PartArg::Pelvis => PartMask::PELVIS,
            PartArg::Torso => PartMask::TORSO,
            PartArg::Head => PartMask::HEAD,
            PartArg::Arms => PartMask::ARMS,
            PartArg::Hands => PartMask::HANDS,
            PartArg::Fingers => PartMask::FINGERS,
            PartArg::Legs => PartMask::LEGS,
            PartArg::Feet => PartMask::FEET,
        }
    }
}

#[derive(Parser)]
#[command(name = "rig-fit")]
#[command(author, version, about = "Humanoid skeleton authoring and bone-fitted proxy meshes")]
struct Args {
    /// 骨架定义 JSON（缺省使用内置人形骨架）
    #[arg(long)]
    skeleton: Option<PathBuf>,

    /// 使用程序化镜像骨架代替手工骨架
    #[arg(long, conflicts_with = "skeleton")]
    procedural: bool,

    /// 原型目录 JSON（缺省使用内置人形目录）
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// 贴合配置 JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// 只生成指定部位（可重复）
    #[arg(long = "only", value_enum)]
    only: Vec<PartArg>,

    /// 打印骨架分组报告
    #[arg(long)]
    report: bool,

    /// 以 JSON 输出贴合结果
    #[arg(long)]
    json: bool,

    /// 输出合并网格统计（配合 --json 时输出完整合并网格）
    #[arg(long)]
    merge: bool,
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_skeleton(args: &Args) -> Result<Skeleton> {
    let skeleton = match &args.skeleton {
        Some(path) => Skeleton::from_def(&SkeletonDef::from_json(&read(path)?)?)?,
        None if args.procedural => humanoid::procedural(&humanoid::Proportions::default())?,
        None => humanoid::extracted()?,
    };
    Ok(skeleton)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Some(path) = &args.config {
        set_config(FitConfig::from_json(&read(path)?)?);
    }

    let skeleton = load_skeleton(&args)?;

    if args.report {
        print!("{}", analyze(&skeleton));
        return Ok(());
    }

    let catalog = match &args.catalog {
        Some(path) => Catalog::from_json(&read(path)?)?,
        None => rig_fit::catalog::humanoid(),
    };

    let mask = if args.only.is_empty() {
        PartMask::all()
    } else {
        args.only.iter().fold(PartMask::empty(), |mask, part| mask | part.mask())
    };

    let report = fit_skeleton_parts(&skeleton, &catalog, mask);

    if args.merge {
        let merged = report.merge();
        if args.json {
            println!("{}", serde_json::to_string_pretty(&merged)?);
        } else {
            println!(
                "merged: {} vertices, {} triangles, {} vertex groups",
                merged.mesh.vertex_count(),
                merged.mesh.triangle_count(),
                merged.vertex_groups.len()
            );
        }
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&report.primitives)?);
    } else {
        for p in &report.primitives {
            let c = p.center();
            let e = p.extents();
            println!(
                "{:<18} {:<12} {:?} center=({:.4}, {:.4}, {:.4}) scale=({:.4}, {:.4}, {:.4})",
                p.name, p.bone, p.kind, c.x, c.y, c.z, e.x, e.y, e.z
            );
        }
    }

    for failure in &report.failures {
        eprintln!("skipped {} ({}): {}", failure.mesh_name, failure.bone, failure.error);
    }

    Ok(())
}
