//! Shared math types: axis-aligned bounding boxes and plane tests used by
//! the frustum culler and the mesh allocator's bounds checks.

mod aabb;

pub use aabb::Aabb;
