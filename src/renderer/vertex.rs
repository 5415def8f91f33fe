//! Vertex definitions and the fixed geometry of both scenes.
//!
//! The triangle uses one buffer of 3D positions. The quad uses two parallel
//! buffers, positions in slot 0 and texture coordinates in slot 1, drawn as a
//! four-vertex triangle strip.

use std::mem;

/// Triangle vertex: position in clip space (before the optional camera).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TriangleVertex {
    pub position: [f32; 3],
}

impl TriangleVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<TriangleVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

/// Top, bottom-left, bottom-right. Counter-clockwise.
pub const TRIANGLE_VERTICES: [TriangleVertex; 3] = [
    TriangleVertex {
        position: [0.5, 0.5, 0.0],
    },
    TriangleVertex {
        position: [-0.5, -0.5, 0.0],
    },
    TriangleVertex {
        position: [0.5, -0.5, 0.0],
    },
];

/// Quad corner position in model space.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadPosition {
    pub position: [f32; 2],
}

impl QuadPosition {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<QuadPosition>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            }],
        }
    }
}

/// Texture coordinate; `(0, 0)` is the first texel row, i.e. the image top.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadTexCoord {
    pub uv: [f32; 2],
}

impl QuadTexCoord {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<QuadTexCoord>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            }],
        }
    }
}

/// Top-left, bottom-left, top-right, bottom-right.
pub const QUAD_POSITIONS: [QuadPosition; 4] = [
    QuadPosition { position: [-1.0, 1.0] },
    QuadPosition { position: [-1.0, -1.0] },
    QuadPosition { position: [1.0, 1.0] },
    QuadPosition { position: [1.0, -1.0] },
];

pub const QUAD_TEX_COORDS: [QuadTexCoord; 4] = [
    QuadTexCoord { uv: [0.0, 0.0] },
    QuadTexCoord { uv: [0.0, 1.0] },
    QuadTexCoord { uv: [1.0, 0.0] },
    QuadTexCoord { uv: [1.0, 1.0] },
];
