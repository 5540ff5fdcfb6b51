//! Frustum culling (C11).

mod frustum;

pub use frustum::Frustum;
