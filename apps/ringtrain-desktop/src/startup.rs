use ringtrain_assets::{AssetError, TextureImage};
use ringtrain_common::SceneConfig;
use ringtrain_kernel::{Scene, TimeStep};
use ringtrain_render_wgpu::{RenderError, ShaderSources};
use std::path::Path;

/// Failures that stop the program before or while the window comes up.
/// Each maps to its own process exit code.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("GPU initialisation failed: {0}")]
    Gpu(String),
    #[error("failed to load overlay texture: {0}")]
    Texture(#[from] AssetError),
    #[error("failed to upload overlay texture: {0}")]
    TextureUpload(#[from] RenderError),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StartupError {
    pub fn exit_code(&self) -> u8 {
        match self {
            StartupError::EventLoop(_) => 1,
            StartupError::Window(_) => 2,
            StartupError::Gpu(_) => 3,
            StartupError::Texture(_) | StartupError::TextureUpload(_) => 4,
            StartupError::Config(_) => 5,
        }
    }
}

/// Everything the window needs that can be prepared without a GPU.
pub struct Prepared {
    pub config: SceneConfig,
    pub scene: Scene,
    pub texture: TextureImage,
    pub shaders: ShaderSources,
}

/// Load config, build the scene, decode the texture and read shaders.
pub fn prepare(
    config_path: Option<&Path>,
    texture_path: &Path,
    shader_dir: Option<&Path>,
    wall_clock: bool,
) -> Result<Prepared, StartupError> {
    let config = match config_path {
        Some(path) => {
            SceneConfig::load(path).map_err(|e| StartupError::Config(e.to_string()))?
        }
        None => SceneConfig::default(),
    };

    let step = if wall_clock {
        TimeStep::WallClock
    } else {
        TimeStep::Fixed(config.motion.frame_duration)
    };
    let scene = Scene::new(&config, step).map_err(|e| StartupError::Config(e.to_string()))?;

    let texture = TextureImage::load(texture_path)?;

    let shaders = match shader_dir {
        Some(dir) => {
            tracing::info!("loading shaders from {}", dir.display());
            ShaderSources::from_dir(dir)
        }
        None => ShaderSources::embedded(),
    };

    Ok(Prepared {
        config,
        scene,
        texture,
        shaders,
    })
}
