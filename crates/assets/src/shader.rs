use std::path::{Path, PathBuf};

/// `dir/<name>.wgsl`
pub fn shader_path(dir: impl AsRef<Path>, name: &str) -> PathBuf {
    dir.as_ref().join(format!("{name}.wgsl"))
}

/// Read shader source text.
///
/// A missing or unreadable file is logged and yields an empty string; the
/// pipeline built from it then fails validation and is skipped at draw time.
pub fn load_shader_source(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(source) => {
            tracing::info!("read shader source {}", path.display());
            source
        }
        Err(e) => {
            tracing::error!("failed to read shader source {}: {e}", path.display());
            String::new()
        }
    }
}
