//! Uniform blocks shared with the WGSL shaders.
//!
//! Field order and sizes mirror the `struct` declarations in the shader
//! sources; both blocks are multiples of 16 bytes so no padding is needed.

use crate::math::Mat4;

/// Uniforms of the triangle program: transform and flat fill colour.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TriangleUniforms {
    pub mvp: Mat4,
    pub color: [f32; 4],
}

impl TriangleUniforms {
    pub fn new(color: [f32; 4]) -> Self {
        Self {
            mvp: Mat4::identity(),
            color,
        }
    }
}

/// Uniforms of the textured quad program.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TextureUniforms {
    pub mvp: Mat4,
}

impl Default for TextureUniforms {
    fn default() -> Self {
        Self {
            mvp: Mat4::identity(),
        }
    }
}
