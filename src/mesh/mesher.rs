//! Greedy Mesher (C9): converts a chunk plus up to four neighbor chunks
//! into solid and fluid vertex arrays, one merged quad per maximal
//! same-block rectangle per Y-slab per face direction.

use cgmath::{Point3, Vector3};

use crate::block::{is_fluid, is_opaque, material_class, BlockId, BLOCK_CATALOG};
use crate::chunk::{Chunk, MAX_LIGHT, CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z};

use super::vertex::TerrainVertex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

const ALL_FACES: [Face; 6] = [
    Face::PosX,
    Face::NegX,
    Face::PosY,
    Face::NegY,
    Face::PosZ,
    Face::NegZ,
];

impl Face {
    fn normal(self) -> Vector3<f32> {
        match self {
            Face::PosX => Vector3::new(1.0, 0.0, 0.0),
            Face::NegX => Vector3::new(-1.0, 0.0, 0.0),
            Face::PosY => Vector3::new(0.0, 1.0, 0.0),
            Face::NegY => Vector3::new(0.0, -1.0, 0.0),
            Face::PosZ => Vector3::new(0.0, 0.0, 1.0),
            Face::NegZ => Vector3::new(0.0, 0.0, -1.0),
        }
    }

    /// Directional shade applied to the block's base color.
    fn shade(self) -> f32 {
        match self {
            Face::PosY => 1.0,
            Face::PosZ | Face::NegZ => 0.8,
            Face::PosX | Face::NegX => 0.7,
            Face::NegY => 0.5,
        }
    }
}

/// Borrowed read-only views of the four cardinal neighbor chunks. Missing
/// neighbors cause boundary faces to be emitted conservatively (treated as
/// transparent) and corner taps past them fall back to the spec's default
/// light values.
#[derive(Default, Clone, Copy)]
pub struct Neighbors<'a> {
    pub north: Option<&'a Chunk>,
    pub south: Option<&'a Chunk>,
    pub east: Option<&'a Chunk>,
    pub west: Option<&'a Chunk>,
}

pub struct MeshOutput {
    pub solid: Vec<TerrainVertex>,
    pub fluid: Vec<TerrainVertex>,
}

/// `(sky, r, g, b)` as read at a world-local cell, or the spec's fallback
/// values when the cell is opaque (`0` everywhere, producing AO) or lies
/// past a missing neighbor chunk (`MAX_LIGHT` sky, `0` block).
fn sample_tap(chunk: &Chunk, neighbors: &Neighbors, x: i32, y: i32, z: i32) -> (u8, u8, u8, u8) {
    if !(0..CHUNK_SIZE_Y).contains(&y) {
        return (MAX_LIGHT, 0, 0, 0);
    }
    let resolved = if (0..CHUNK_SIZE_X).contains(&x) && (0..CHUNK_SIZE_Z).contains(&z) {
        Some((chunk, x, z))
    } else if x < 0 {
        neighbors.west.map(|c| (c, x + CHUNK_SIZE_X, z))
    } else if x >= CHUNK_SIZE_X {
        neighbors.east.map(|c| (c, x - CHUNK_SIZE_X, z))
    } else if z < 0 {
        neighbors.south.map(|c| (c, x, z + CHUNK_SIZE_Z))
    } else {
        neighbors.north.map(|c| (c, x, z - CHUNK_SIZE_Z))
    };

    match resolved {
        None => (MAX_LIGHT, 0, 0, 0),
        Some((c, lx, lz)) => {
            let block = c.block_local(lx, y, lz);
            if is_opaque(block) {
                (0, 0, 0, 0)
            } else {
                let l = c.light_local(lx, y, lz);
                (l.sky(), l.r(), l.g(), l.b())
            }
        }
    }
}

/// Four-tap smooth-lighting average over the cells touching a lattice
/// corner. A fully opaque corner contributes `(0, 0, 0, 0)`, darkening the
/// average and producing ambient occlusion at concave corners.
fn corner_average(chunk: &Chunk, neighbors: &Neighbors, taps: [(i32, i32, i32); 4]) -> (f32, f32) {
    let mut sky_sum = 0u32;
    let mut block_sum = 0u32;
    for (x, y, z) in taps {
        let (sky, r, g, b) = sample_tap(chunk, neighbors, x, y, z);
        sky_sum += sky as u32;
        block_sum += r.max(g).max(b) as u32;
    }
    (
        sky_sum as f32 / (4.0 * MAX_LIGHT as f32),
        block_sum as f32 / (4.0 * MAX_LIGHT as f32),
    )
}

/// Exposed if the neighbor is transparent, a different material class, or
/// `a` is flagged to always show its face against same-class neighbors
/// (glass-on-glass, leaves-on-leaves).
fn is_face_exposed(a: BlockId, b: BlockId) -> bool {
    if !is_opaque(b) {
        return true;
    }
    if material_class(a) != material_class(b) {
        return true;
    }
    crate::block::is_transparent(a)
}

struct Quad {
    origin_a: i32,
    origin_b: i32,
    width: i32,
    height: i32,
    block: BlockId,
}

/// Sweeps a 16x16 mask, merging each maximal same-id rectangle into one
/// quad. `width` grows along the mask's first (`a`) axis, `height` along
/// its second (`b`) axis.
fn greedy_sweep(mask: &mut [[Option<BlockId>; 16]; 16], mut emit: impl FnMut(Quad)) {
    for b in 0..16usize {
        let mut a = 0usize;
        while a < 16 {
            let id = match mask[a][b] {
                Some(id) => id,
                None => {
                    a += 1;
                    continue;
                }
            };
            let mut width = 1;
            while a + width < 16 && mask[a + width][b] == Some(id) {
                width += 1;
            }
            let mut height = 1;
            'grow: while b + height < 16 {
                for k in 0..width {
                    if mask[a + k][b + height] != Some(id) {
                        break 'grow;
                    }
                }
                height += 1;
            }
            for da in 0..width {
                for db in 0..height {
                    mask[a + da][b + db] = None;
                }
            }
            emit(Quad {
                origin_a: a as i32,
                origin_b: b as i32,
                width: width as i32,
                height: height as i32,
                block: id,
            });
            a += width;
        }
    }
}

/// `u` scales with `width` (the mask's `a` axis), `v` scales with `height`
/// (the `b` axis). Winding is chosen so the triangles face `normal`
/// regardless of which way `u x v` happens to point.
#[allow(clippy::too_many_arguments)]
fn push_quad(
    out: &mut Vec<TerrainVertex>,
    origin: Point3<f32>,
    u: Vector3<f32>,
    v: Vector3<f32>,
    width: f32,
    height: f32,
    normal: Vector3<f32>,
    color: [f32; 3],
    tile_id: f32,
    corner_light: [(f32, f32); 4],
) {
    let p0 = origin;
    let p1 = origin + u * width;
    let p2 = origin + u * width + v * height;
    let p3 = origin + v * height;
    let positions = [p0, p1, p2, p3];
    let uvs = [[0.0, 0.0], [width, 0.0], [width, height], [0.0, height]];

    let vertex_at = |i: usize| TerrainVertex {
        position: [positions[i].x, positions[i].y, positions[i].z],
        color,
        normal: [normal.x, normal.y, normal.z],
        uv: uvs[i],
        tile_id,
        skylight: corner_light[i].0,
        blocklight: corner_light[i].1,
    };

    let cross = Vector3::new(
        u.y * v.z - u.z * v.y,
        u.z * v.x - u.x * v.z,
        u.x * v.y - u.y * v.x,
    );
    let facing_forward = cross.x * normal.x + cross.y * normal.y + cross.z * normal.z >= 0.0;
    let order: [usize; 6] = if facing_forward {
        [0, 1, 2, 0, 2, 3]
    } else {
        [0, 3, 2, 0, 2, 1]
    };
    for i in order {
        out.push(vertex_at(i));
    }
}

fn mesh_y_faces(
    chunk: &Chunk,
    neighbors: &Neighbors,
    pos_dir: bool,
    tile_resolver: &dyn Fn(BlockId, Face) -> f32,
    solid: &mut Vec<TerrainVertex>,
    fluid: &mut Vec<TerrainVertex>,
) {
    let face = if pos_dir { Face::PosY } else { Face::NegY };
    let normal = face.normal();
    let shade = face.shade();
    let u = Vector3::unit_x();
    let v = Vector3::unit_z();

    for y in 0..CHUNK_SIZE_Y {
        // mask[a=lx][b=lz]
        let mut mask = [[None; 16]; 16];
        for lx in 0..16 {
            for lz in 0..16 {
                let block = chunk.block_local(lx, y, lz);
                if block == BlockId::AIR {
                    continue;
                }
                let neighbor_y = if pos_dir { y + 1 } else { y - 1 };
                let neighbor = if (0..CHUNK_SIZE_Y).contains(&neighbor_y) {
                    chunk.block_local(lx, neighbor_y, lz)
                } else {
                    BlockId::AIR
                };
                if is_face_exposed(block, neighbor) {
                    mask[lx as usize][lz as usize] = Some(block);
                }
            }
        }

        greedy_sweep(&mut mask, |quad| {
            let plane_y = if pos_dir { y + 1 } else { y };
            let outside_y = if pos_dir { y + 1 } else { y - 1 };
            let origin = Point3::new(quad.origin_a as f32, plane_y as f32, quad.origin_b as f32);

            let def = BLOCK_CATALOG.get(quad.block);
            let color = [
                def.default_color[0] * shade,
                def.default_color[1] * shade,
                def.default_color[2] * shade,
            ];
            let tile_id = tile_resolver(quad.block, face);

            let corner_light = |da: i32, db: i32| -> (f32, f32) {
                let x0 = quad.origin_a + da;
                let z0 = quad.origin_b + db;
                corner_average(
                    chunk,
                    neighbors,
                    [
                        (x0 - 1, outside_y, z0 - 1),
                        (x0, outside_y, z0 - 1),
                        (x0 - 1, outside_y, z0),
                        (x0, outside_y, z0),
                    ],
                )
            };
            let corners = [
                corner_light(0, 0),
                corner_light(quad.width, 0),
                corner_light(quad.width, quad.height),
                corner_light(0, quad.height),
            ];

            let target = if is_fluid(quad.block) { &mut *fluid } else { &mut *solid };
            push_quad(
                target,
                origin,
                u,
                v,
                quad.width as f32,
                quad.height as f32,
                normal,
                color,
                tile_id,
                corners,
            );
        });
    }
}

fn neighbor_block_for(
    chunk: &Chunk,
    neighbors: &Neighbors,
    along_x: bool,
    pos_dir: bool,
    w: i32,
    b: i32,
    y: i32,
) -> BlockId {
    if !(0..CHUNK_SIZE_Y).contains(&y) {
        return BlockId::AIR;
    }
    let nw = if pos_dir { w + 1 } else { w - 1 };
    if (0..CHUNK_SIZE_X).contains(&nw) {
        let (lx, lz) = if along_x { (nw, b) } else { (b, nw) };
        return chunk.block_local(lx, y, lz);
    }
    let neighbor_chunk = if along_x {
        if pos_dir { neighbors.east } else { neighbors.west }
    } else if pos_dir {
        neighbors.north
    } else {
        neighbors.south
    };
    match neighbor_chunk {
        None => BlockId::AIR,
        Some(c) => {
            let wrapped = if pos_dir { 0 } else { CHUNK_SIZE_X - 1 };
            let (lx, lz) = if along_x { (wrapped, b) } else { (b, wrapped) };
            c.block_local(lx, y, lz)
        }
    }
}

/// Shared implementation for the four horizontal directions. Mask axes are
/// always `(a = y_local within a 16-tall slab, b = the other horizontal
/// axis)`, iterated once per value of the face's own horizontal axis `w`
/// and once per 16-tall Y slab, bounding every mask at 16x16.
#[allow(clippy::too_many_arguments)]
fn mesh_horizontal_faces(
    chunk: &Chunk,
    neighbors: &Neighbors,
    along_x: bool,
    pos_dir: bool,
    tile_resolver: &dyn Fn(BlockId, Face) -> f32,
    solid: &mut Vec<TerrainVertex>,
    fluid: &mut Vec<TerrainVertex>,
) {
    let face = match (along_x, pos_dir) {
        (true, true) => Face::PosX,
        (true, false) => Face::NegX,
        (false, true) => Face::PosZ,
        (false, false) => Face::NegZ,
    };
    let normal = face.normal();
    let shade = face.shade();
    let u = Vector3::unit_y();
    let v = if along_x { Vector3::unit_z() } else { Vector3::unit_x() };

    for w in 0..16 {
        for slab in 0..16 {
            let y0 = slab * 16;
            let mut mask = [[None; 16]; 16];

            for a in 0..16 {
                let y = y0 + a;
                for b in 0..16 {
                    let (lx, lz) = if along_x { (w, b) } else { (b, w) };
                    let block = chunk.block_local(lx, y, lz);
                    if block == BlockId::AIR {
                        continue;
                    }
                    let neighbor_block = neighbor_block_for(chunk, neighbors, along_x, pos_dir, w, b, y);
                    if is_face_exposed(block, neighbor_block) {
                        mask[a as usize][b as usize] = Some(block);
                    }
                }
            }

            greedy_sweep(&mut mask, |quad| {
                let y_start = y0 + quad.origin_a;
                let plane_w = if pos_dir { w + 1 } else { w };
                let outside_w = if pos_dir { w + 1 } else { w - 1 };

                let origin = if along_x {
                    Point3::new(plane_w as f32, y_start as f32, quad.origin_b as f32)
                } else {
                    Point3::new(quad.origin_b as f32, y_start as f32, plane_w as f32)
                };

                let def = BLOCK_CATALOG.get(quad.block);
                let color = [
                    def.default_color[0] * shade,
                    def.default_color[1] * shade,
                    def.default_color[2] * shade,
                ];
                let tile_id = tile_resolver(quad.block, face);

                let corner_light = |dy: i32, db: i32| -> (f32, f32) {
                    let y_lat = y_start + dy;
                    let other = quad.origin_b + db;
                    let taps = if along_x {
                        [
                            (outside_w, y_lat - 1, other - 1),
                            (outside_w, y_lat, other - 1),
                            (outside_w, y_lat - 1, other),
                            (outside_w, y_lat, other),
                        ]
                    } else {
                        [
                            (other - 1, y_lat - 1, outside_w),
                            (other, y_lat - 1, outside_w),
                            (other - 1, y_lat, outside_w),
                            (other, y_lat, outside_w),
                        ]
                    };
                    corner_average(chunk, neighbors, taps)
                };
                let corners = [
                    corner_light(0, 0),
                    corner_light(quad.width, 0),
                    corner_light(quad.width, quad.height),
                    corner_light(0, quad.height),
                ];

                let target = if is_fluid(quad.block) { &mut *fluid } else { &mut *solid };
                push_quad(
                    target,
                    origin,
                    u,
                    v,
                    quad.width as f32,
                    quad.height as f32,
                    normal,
                    color,
                    tile_id,
                    corners,
                );
            });
        }
    }
}

pub fn mesh_chunk(
    chunk: &Chunk,
    neighbors: Neighbors,
    tile_resolver: &dyn Fn(BlockId, Face) -> f32,
) -> MeshOutput {
    let mut solid = Vec::new();
    let mut fluid = Vec::new();

    for face in ALL_FACES {
        match face {
            Face::PosY => mesh_y_faces(chunk, &neighbors, true, tile_resolver, &mut solid, &mut fluid),
            Face::NegY => mesh_y_faces(chunk, &neighbors, false, tile_resolver, &mut solid, &mut fluid),
            Face::PosX => mesh_horizontal_faces(chunk, &neighbors, true, true, tile_resolver, &mut solid, &mut fluid),
            Face::NegX => mesh_horizontal_faces(chunk, &neighbors, true, false, tile_resolver, &mut solid, &mut fluid),
            Face::PosZ => mesh_horizontal_faces(chunk, &neighbors, false, true, tile_resolver, &mut solid, &mut fluid),
            Face::NegZ => mesh_horizontal_faces(chunk, &neighbors, false, false, tile_resolver, &mut solid, &mut fluid),
        }
    }

    MeshOutput { solid, fluid }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkPos;

    fn flat_tile_resolver(_: BlockId, _: Face) -> f32 {
        0.0
    }

    #[test]
    fn solid_cube_region_merges_into_six_quads() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        for lz in 0..16 {
            for lx in 0..16 {
                for ly in 0..=63 {
                    chunk.set_block_local(lx, ly, lz, BlockId::STONE);
                }
            }
        }
        chunk.recompute_height_map();

        let output = mesh_chunk(&chunk, Neighbors::default(), &flat_tile_resolver);
        assert_eq!(output.solid.len(), 6 * 6, "6 quads of 6 vertices each");
        assert_eq!(output.fluid.len(), 0);
    }

    #[test]
    fn meshing_is_idempotent() {
        let mut chunk = Chunk::new(ChunkPos::new(2, -1));
        chunk.set_block_local(3, 10, 3, BlockId::STONE);
        chunk.set_block_local(3, 11, 3, BlockId::GLOWSTONE);
        chunk.recompute_height_map();
        crate::lighting::SkylightPass::run(&mut chunk);
        crate::lighting::BlockLightPass::run(&mut chunk);

        let a = mesh_chunk(&chunk, Neighbors::default(), &flat_tile_resolver);
        let b = mesh_chunk(&chunk, Neighbors::default(), &flat_tile_resolver);
        assert_eq!(a.solid, b.solid);
        assert_eq!(a.fluid, b.fluid);
    }

    #[test]
    fn single_block_emits_exactly_six_faces() {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        chunk.set_block_local(8, 64, 8, BlockId::STONE);
        chunk.recompute_height_map();
        let output = mesh_chunk(&chunk, Neighbors::default(), &flat_tile_resolver);
        assert_eq!(output.solid.len(), 6 * 6);
    }

    #[test]
    fn no_face_crosses_a_boundary_between_two_matching_opaque_blocks() {
        let mut center = Chunk::new(ChunkPos::new(0, 0));
        center.set_block_local(0, 10, 0, BlockId::STONE);
        center.recompute_height_map();

        let mut west = Chunk::new(ChunkPos::new(-1, 0));
        west.set_block_local(15, 10, 0, BlockId::STONE);
        west.recompute_height_map();

        let neighbors = Neighbors {
            west: Some(&west),
            ..Neighbors::default()
        };
        let output = mesh_chunk(&center, neighbors, &flat_tile_resolver);
        // The -X face is suppressed by the matching stone block just across
        // the boundary; the other five faces are still exposed to air.
        assert_eq!(output.solid.len(), 5 * 6);
    }
}
