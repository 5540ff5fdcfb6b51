//! Frustum culling (C11): six clip planes extracted from a view-projection
//! matrix via the Gribb-Hartmann method.

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Vector3, Vector4};

use crate::chunk::{CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z};
use crate::math::Aabb;

#[derive(Debug, Clone, Copy)]
struct Plane {
    normal: Vector3<f32>,
    d: f32,
}

impl Plane {
    fn from_row(row: Vector4<f32>) -> Self {
        let normal = Vector3::new(row.x, row.y, row.z);
        let length = normal.magnitude();
        Plane {
            normal: normal / length,
            d: row.w / length,
        }
    }

    fn distance_to_point(&self, p: Point3<f32>) -> f32 {
        self.normal.dot(p.to_vec()) + self.d
    }
}

fn row(m: &Matrix4<f32>, r: usize) -> Vector4<f32> {
    Vector4::new(m[0][r], m[1][r], m[2][r], m[3][r])
}

pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the six planes (left, right, bottom, top, near, far) from a
    /// combined view-projection matrix assuming OpenGL-style clip space
    /// (NDC z in `[-1, 1]`).
    pub fn from_view_projection(view_proj: &Matrix4<f32>) -> Self {
        let r0 = row(view_proj, 0);
        let r1 = row(view_proj, 1);
        let r2 = row(view_proj, 2);
        let r3 = row(view_proj, 3);

        let planes = [
            Plane::from_row(r3 + r0), // left
            Plane::from_row(r3 - r0), // right
            Plane::from_row(r3 + r1), // bottom
            Plane::from_row(r3 - r1), // top
            Plane::from_row(r3 + r2), // near
            Plane::from_row(r3 - r2), // far
        ];
        Frustum { planes }
    }

    pub fn contains_point(&self, p: Point3<f32>) -> bool {
        self.planes.iter().all(|plane| plane.distance_to_point(p) >= 0.0)
    }

    pub fn intersects_sphere(&self, center: Point3<f32>, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(center) >= -radius)
    }

    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.planes.iter().all(|plane| {
            let positive = aabb.positive_vertex(plane.normal);
            plane.distance_to_point(positive) >= 0.0
        })
    }

    /// Builds the chunk's world AABB relative to `camera_origin` (the
    /// floating-origin rendering convention: everything the renderer sees
    /// is expressed relative to the camera) and tests it against the
    /// frustum.
    pub fn intersects_chunk(&self, cx: i32, cz: i32, camera_origin: Point3<f32>) -> bool {
        let world_min = Point3::new(
            (cx * CHUNK_SIZE_X) as f32,
            0.0,
            (cz * CHUNK_SIZE_Z) as f32,
        );
        let world_max = world_min
            + Vector3::new(
                CHUNK_SIZE_X as f32,
                CHUNK_SIZE_Y as f32,
                CHUNK_SIZE_Z as f32,
            );
        let aabb = Aabb::new(world_min, world_max).translated(-camera_origin.to_vec());
        self.intersects_aabb(&aabb)
    }

    /// Same test as [`Self::intersects_chunk`] but for an outer-LOD region
    /// spanning `region_size_chunks x region_size_chunks` native chunks.
    pub fn intersects_region(
        &self,
        rx: i32,
        rz: i32,
        region_size_chunks: i32,
        camera_origin: Point3<f32>,
    ) -> bool {
        let size_blocks = region_size_chunks * CHUNK_SIZE_X;
        let world_min = Point3::new((rx * size_blocks) as f32, 0.0, (rz * size_blocks) as f32);
        let world_max = world_min
            + Vector3::new(size_blocks as f32, CHUNK_SIZE_Y as f32, size_blocks as f32);
        let aabb = Aabb::new(world_min, world_max).translated(-camera_origin.to_vec());
        self.intersects_aabb(&aabb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{perspective, Deg};

    fn looking_down_negative_z() -> Frustum {
        let proj = perspective(Deg(90.0), 1.0, 0.1, 100.0);
        Frustum::from_view_projection(&proj)
    }

    #[test]
    fn point_in_front_within_range_is_contained() {
        let frustum = looking_down_negative_z();
        assert!(frustum.contains_point(Point3::new(0.0, 0.0, -10.0)));
    }

    #[test]
    fn point_behind_the_camera_is_excluded() {
        let frustum = looking_down_negative_z();
        assert!(!frustum.contains_point(Point3::new(0.0, 0.0, 10.0)));
    }

    #[test]
    fn point_beyond_the_far_plane_is_excluded() {
        let frustum = looking_down_negative_z();
        assert!(!frustum.contains_point(Point3::new(0.0, 0.0, -1000.0)));
    }

    #[test]
    fn chunk_far_off_to_the_side_is_culled() {
        let frustum = looking_down_negative_z();
        assert!(!frustum.intersects_chunk(500, 0, Point3::new(0.0, 64.0, 0.0)));
    }

    #[test]
    fn chunk_under_the_camera_is_visible() {
        let frustum = looking_down_negative_z();
        assert!(frustum.intersects_chunk(0, -1, Point3::new(8.0, 64.0, 8.0)));
    }

    #[test]
    fn region_far_off_to_the_side_is_culled() {
        let frustum = looking_down_negative_z();
        assert!(!frustum.intersects_region(500, 0, 8, Point3::new(0.0, 64.0, 0.0)));
    }

    #[test]
    fn region_under_the_camera_is_visible() {
        let frustum = looking_down_negative_z();
        assert!(frustum.intersects_region(0, -1, 8, Point3::new(8.0, 64.0, 8.0)));
    }
}
