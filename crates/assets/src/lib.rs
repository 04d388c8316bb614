//! Asset loading for the ring train demo.
//!
//! Two kinds of external inputs are consumed, both opaque to the kernel:
//! the overlay texture (decoded to RGBA8) and WGSL shader source text.
//!
//! A texture that cannot be read or decoded is an error the caller treats as
//! fatal. A shader file that cannot be read is only logged: the caller gets
//! empty source and the affected pass fails to compile downstream.

mod shader;
mod texture;

pub use shader::{load_shader_source, shader_path};
pub use texture::TextureImage;

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("image {path} has zero size")]
    Empty { path: String },
}
