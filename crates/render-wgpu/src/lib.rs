//! wgpu render backend for the ring train.
//!
//! Draws a flat track disc, one textured cube per car and a textured overlay
//! quad in the top-left corner, in that order.
//!
//! # Invariants
//! - The renderer only reads [`ringtrain_kernel::FrameTransforms`].
//! - Culling applies to the cube draw alone and is picked per frame.
//! - A pass whose shader fails validation is skipped, never fatal.

mod gpu;
mod mesh;
mod shaders;

pub use gpu::WgpuRenderer;
pub use shaders::{ShaderPass, ShaderSources};

/// Errors creating GPU resources.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("texture {label} is {width}x{height}, device limit is {max}")]
    TextureTooLarge {
        label: String,
        width: u32,
        height: u32,
        max: u32,
    },
    #[error("texture {label} has {actual} bytes of pixel data, expected {expected}")]
    TextureData {
        label: String,
        expected: usize,
        actual: usize,
    },
}
