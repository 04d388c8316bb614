/// Errors from constructing kernel objects with invalid parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    #[error("formation needs at least 2 elements, got {0}")]
    TooFewElements(usize),
    #[error("radius must be finite and non-negative, got {0}")]
    InvalidRadius(f32),
    #[error("invalid field of view range [{min}, {max}]")]
    InvalidFovRange { min: f32, max: f32 },
    #[error("invalid projection: {0}")]
    InvalidProjection(String),
    #[error("configuration rejected: {0}")]
    Config(String),
}
