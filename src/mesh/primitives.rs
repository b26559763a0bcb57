//! 规范单位图元
//!
//! - 立方体：边长 1
//! - 圆柱：半径 1，高度 1，沿 +Z
//! - UV 球：半径 1，极轴 +Z
//! - 锥台：底面半径 1（z = -0.5），顶面半径 `top_ratio`（z = +0.5）

use glam::Vec3;
use std::f32::consts::{PI, TAU};

use super::MeshData;

/// 边长 1 的立方体（每面 4 顶点，平直法线）
pub fn unit_cube() -> MeshData {
    let mut mesh = MeshData::new();
    let h = 0.5;

    // 面法线与面内两条切向轴 (u, v)，u × v = normal
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];

    for (normal, u, v) in faces {
        let center = normal * h;
        let corners = [
            center - u * h - v * h,
            center + u * h - v * h,
            center + u * h + v * h,
            center - u * h + v * h,
        ];
        let i0 = mesh.add_vertex(corners[0], normal);
        let i1 = mesh.add_vertex(corners[1], normal);
        let i2 = mesh.add_vertex(corners[2], normal);
        let i3 = mesh.add_vertex(corners[3], normal);
        mesh.add_triangle(i0, i1, i2);
        mesh.add_triangle(i0, i2, i3);
    }

    mesh
}

/// 半径 1、高度 1 的圆柱（沿 +Z，带端盖）
pub fn unit_cylinder(segments: u32) -> MeshData {
    unit_cone(1.0, segments)
}

/// 锥台：底面半径 1，顶面半径 `top_ratio`，高度 1
///
/// `top_ratio` 为 0 时退化为圆锥，省略顶盖。
pub fn unit_cone(top_ratio: f32, segments: u32) -> MeshData {
    let segments = segments.clamp(3, 256);
    let top = top_ratio.max(0.0);
    let mut mesh = MeshData::new();

    // 侧面法线沿母线倾斜
    let slope = 1.0 - top;
    for i in 0..segments {
        let theta = i as f32 / segments as f32 * TAU;
        let radial = Vec3::new(theta.cos(), theta.sin(), 0.0);
        let normal = (radial + Vec3::new(0.0, 0.0, slope)).normalize();

        mesh.add_vertex(Vec3::new(radial.x, radial.y, -0.5), normal);
        mesh.add_vertex(Vec3::new(radial.x * top, radial.y * top, 0.5), normal);
    }

    for i in 0..segments {
        let next = (i + 1) % segments;
        let b0 = i * 2;
        let t0 = b0 + 1;
        let b1 = next * 2;
        let t1 = b1 + 1;
        mesh.add_triangle(b0, b1, t1);
        mesh.add_triangle(b0, t1, t0);
    }

    add_cap(&mut mesh, 1.0, -0.5, segments);
    if top > 0.0 {
        add_cap(&mut mesh, top, 0.5, segments);
    }

    mesh
}

/// 端盖（z < 0 朝 -Z，否则朝 +Z）
fn add_cap(mesh: &mut MeshData, radius: f32, z: f32, segments: u32) {
    let normal = if z < 0.0 { Vec3::NEG_Z } else { Vec3::Z };
    let center = mesh.add_vertex(Vec3::new(0.0, 0.0, z), normal);
    let first = center + 1;

    for i in 0..segments {
        let theta = i as f32 / segments as f32 * TAU;
        mesh.add_vertex(Vec3::new(radius * theta.cos(), radius * theta.sin(), z), normal);
    }

    for i in 0..segments {
        let a = first + i;
        let b = first + (i + 1) % segments;
        if z < 0.0 {
            mesh.add_triangle(center, b, a);
        } else {
            mesh.add_triangle(center, a, b);
        }
    }
}

/// 半径 1 的 UV 球（极轴 +Z，平滑法线）
///
/// 两极各一个顶点，与相邻环以扇形三角形相连。
pub fn unit_sphere(segments: u32, rings: u32) -> MeshData {
    let segments = segments.clamp(3, 256);
    let rings = rings.clamp(2, 256);
    let mut mesh = MeshData::new();

    let top = mesh.add_vertex(Vec3::Z, Vec3::Z);
    for ring in 1..rings {
        let phi = ring as f32 / rings as f32 * PI;
        let z = phi.cos();
        let r = phi.sin();

        for seg in 0..segments {
            let theta = seg as f32 / segments as f32 * TAU;
            let p = Vec3::new(r * theta.cos(), r * theta.sin(), z);
            mesh.add_vertex(p, p.normalize_or_zero());
        }
    }
    let bottom = mesh.add_vertex(Vec3::NEG_Z, Vec3::NEG_Z);

    // 第 ring 环（1..rings）的首个顶点
    let ring_start = |ring: u32| 1 + (ring - 1) * segments;

    for seg in 0..segments {
        let next = (seg + 1) % segments;
        mesh.add_triangle(top, ring_start(1) + seg, ring_start(1) + next);
    }

    for ring in 1..rings - 1 {
        for seg in 0..segments {
            let next = (seg + 1) % segments;
            let i0 = ring_start(ring) + seg;
            let i1 = ring_start(ring) + next;
            let i2 = ring_start(ring + 1) + seg;
            let i3 = ring_start(ring + 1) + next;
            mesh.add_triangle(i0, i2, i3);
            mesh.add_triangle(i0, i3, i1);
        }
    }

    let last = ring_start(rings - 1);
    for seg in 0..segments {
        let next = (seg + 1) % segments;
        mesh.add_triangle(last + seg, bottom, last + next);
    }

    mesh
}
