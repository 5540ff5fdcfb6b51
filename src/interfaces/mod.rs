//! External interfaces (§6): the render hardware interface is consumed
//! purely through this capability-set trait. No concrete graphics crate is
//! touched inside the world subsystem.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct BufferHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct TextureHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    Vertex,
    Index,
    Uniform,
    Storage,
    Indirect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    Rgba8Unorm,
    Rgba8Srgb,
    R8,
    Rgba32F,
    Depth32F,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureConfig {
    pub filter_linear: bool,
    pub wrap_repeat: bool,
    pub mipmaps: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    Triangles,
    Lines,
    Points,
}

/// Capability set the world calls into the render hardware interface
/// through. Internals (Vulkan/OpenGL/wgpu backends) are an external
/// collaborator and are never named here.
pub trait RhiDevice: Send + Sync {
    fn create_buffer(&self, size_bytes: usize, usage: BufferUsage) -> BufferHandle;
    fn upload_buffer(&self, handle: BufferHandle, bytes: &[u8]);
    fn update_buffer(&self, handle: BufferHandle, offset: usize, bytes: &[u8]);
    fn destroy_buffer(&self, handle: BufferHandle);

    fn create_texture(
        &self,
        w: u32,
        h: u32,
        format: TextureFormat,
        config: TextureConfig,
        bytes: Option<&[u8]>,
    ) -> TextureHandle;
    fn update_texture(&self, handle: TextureHandle, bytes: &[u8]);
    fn destroy_texture(&self, handle: TextureHandle);

    fn draw(&self, vertex_buffer: BufferHandle, count: u32, mode: DrawMode);
    fn draw_offset(&self, vertex_buffer: BufferHandle, first: u32, count: u32, mode: DrawMode);

    fn set_model_matrix(&self, m: [[f32; 4]; 4], color: [f32; 4], mask_radius: f32);
    fn set_lod_instance_buffer(&self, handle: BufferHandle);

    fn wait_idle(&self);
    fn get_frame_index(&self) -> usize;
    fn get_max_frames_in_flight(&self) -> usize;

    /// Polled once per frame by the facade. A backend sets this from its
    /// own background watcher (surface loss, driver reset); the facade
    /// never blocks waiting for it to change.
    fn is_device_lost(&self) -> bool;
}

/// Test double: records nothing but handle allocation counts, used by unit
/// and integration tests that exercise the facade without a real RHI.
pub struct NullRhi {
    next_buffer: AtomicU64,
    next_texture: AtomicU64,
    frame_index: Mutex<usize>,
    device_lost: AtomicBool,
}

impl NullRhi {
    pub fn new() -> Self {
        NullRhi {
            next_buffer: AtomicU64::new(1),
            next_texture: AtomicU64::new(1),
            frame_index: Mutex::new(0),
            device_lost: AtomicBool::new(false),
        }
    }

    pub fn advance_frame(&self) {
        let mut index = self.frame_index.lock().unwrap();
        *index = (*index + 1) % self.get_max_frames_in_flight();
    }

    /// Test hook: simulates a backend's watcher thread flipping the device
    /// to a lost state, so the facade's recovery path can be exercised
    /// without a real GPU.
    pub fn set_device_lost(&self, lost: bool) {
        self.device_lost.store(lost, Ordering::Relaxed);
    }
}

impl Default for NullRhi {
    fn default() -> Self {
        Self::new()
    }
}

impl RhiDevice for NullRhi {
    fn create_buffer(&self, _size_bytes: usize, _usage: BufferUsage) -> BufferHandle {
        BufferHandle(self.next_buffer.fetch_add(1, Ordering::Relaxed))
    }

    fn upload_buffer(&self, _handle: BufferHandle, _bytes: &[u8]) {}
    fn update_buffer(&self, _handle: BufferHandle, _offset: usize, _bytes: &[u8]) {}
    fn destroy_buffer(&self, _handle: BufferHandle) {}

    fn create_texture(
        &self,
        _w: u32,
        _h: u32,
        _format: TextureFormat,
        _config: TextureConfig,
        _bytes: Option<&[u8]>,
    ) -> TextureHandle {
        TextureHandle(self.next_texture.fetch_add(1, Ordering::Relaxed))
    }

    fn update_texture(&self, _handle: TextureHandle, _bytes: &[u8]) {}
    fn destroy_texture(&self, _handle: TextureHandle) {}

    fn draw(&self, _vertex_buffer: BufferHandle, _count: u32, _mode: DrawMode) {}
    fn draw_offset(&self, _vertex_buffer: BufferHandle, _first: u32, _count: u32, _mode: DrawMode) {}

    fn set_model_matrix(&self, _m: [[f32; 4]; 4], _color: [f32; 4], _mask_radius: f32) {}
    fn set_lod_instance_buffer(&self, _handle: BufferHandle) {}

    fn wait_idle(&self) {}
    fn get_frame_index(&self) -> usize {
        *self.frame_index.lock().unwrap()
    }
    fn get_max_frames_in_flight(&self) -> usize {
        2
    }
    fn is_device_lost(&self) -> bool {
        self.device_lost.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_rhi_hands_out_unique_buffer_handles() {
        let rhi = NullRhi::new();
        let a = rhi.create_buffer(1024, BufferUsage::Vertex);
        let b = rhi.create_buffer(1024, BufferUsage::Vertex);
        assert_ne!(a, b);
    }

    #[test]
    fn device_lost_flag_is_off_until_a_test_flips_it() {
        let rhi = NullRhi::new();
        assert!(!rhi.is_device_lost());
        rhi.set_device_lost(true);
        assert!(rhi.is_device_lost());
    }

    #[test]
    fn frame_index_wraps_at_max_frames_in_flight() {
        let rhi = NullRhi::new();
        assert_eq!(rhi.get_frame_index(), 0);
        rhi.advance_frame();
        assert_eq!(rhi.get_frame_index(), 1);
        rhi.advance_frame();
        assert_eq!(rhi.get_frame_index(), 0);
    }
}
