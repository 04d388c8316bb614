use ringtrain_assets::{load_shader_source, shader_path};
use std::path::Path;

/// The three draw passes, in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderPass {
    Track,
    Cube,
    Overlay,
}

impl ShaderPass {
    pub const ALL: [ShaderPass; 3] = [ShaderPass::Track, ShaderPass::Cube, ShaderPass::Overlay];

    /// File stem looked up in a shader directory.
    pub fn file_stem(self) -> &'static str {
        match self {
            ShaderPass::Track => "track",
            ShaderPass::Cube => "cube",
            ShaderPass::Overlay => "overlay",
        }
    }

    /// Entry points a replacement shader must export.
    pub fn vertex_entry(self) -> &'static str {
        match self {
            ShaderPass::Track => "vs_track",
            ShaderPass::Cube => "vs_main",
            ShaderPass::Overlay => "vs_overlay",
        }
    }

    pub fn fragment_entry(self) -> &'static str {
        match self {
            ShaderPass::Track => "fs_track",
            ShaderPass::Cube => "fs_main",
            ShaderPass::Overlay => "fs_overlay",
        }
    }

    fn embedded(self) -> &'static str {
        match self {
            ShaderPass::Track => include_str!("shaders/track.wgsl"),
            ShaderPass::Cube => include_str!("shaders/cube.wgsl"),
            ShaderPass::Overlay => include_str!("shaders/overlay.wgsl"),
        }
    }
}

/// WGSL source for every pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    track: String,
    cube: String,
    overlay: String,
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self::embedded()
    }
}

impl ShaderSources {
    /// Sources compiled into the binary.
    pub fn embedded() -> Self {
        Self {
            track: ShaderPass::Track.embedded().to_string(),
            cube: ShaderPass::Cube.embedded().to_string(),
            overlay: ShaderPass::Overlay.embedded().to_string(),
        }
    }

    /// Read `track.wgsl`, `cube.wgsl` and `overlay.wgsl` from `dir`.
    /// Unreadable files come back empty and their pass is later skipped.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let mut sources = Self::embedded();
        for pass in ShaderPass::ALL {
            sources.set(pass, load_shader_source(shader_path(dir, pass.file_stem())));
        }
        sources
    }

    pub fn get(&self, pass: ShaderPass) -> &str {
        match pass {
            ShaderPass::Track => &self.track,
            ShaderPass::Cube => &self.cube,
            ShaderPass::Overlay => &self.overlay,
        }
    }

    pub fn set(&mut self, pass: ShaderPass, source: String) {
        match pass {
            ShaderPass::Track => self.track = source,
            ShaderPass::Cube => self.cube = source,
            ShaderPass::Overlay => self.overlay = source,
        }
    }
}
