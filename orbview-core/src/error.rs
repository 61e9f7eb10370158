/// Error types shared by the core and the front-ends
use thiserror::Error;

/// Failures while building or checking mesh data
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("{shape}: grid resolution must be at least 1x1, got {longitudes}x{latitudes}")]
    InvalidResolution {
        shape: &'static str,
        longitudes: u32,
        latitudes: u32,
    },

    #[error("{shape}: {name} must be finite and positive, got {value}")]
    InvalidDimension {
        shape: &'static str,
        name: &'static str,
        value: f32,
    },

    #[error("{shape}: {count} vertices do not fit in 16-bit indices")]
    TooManyVertices { shape: &'static str, count: usize },

    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u16, vertex_count: usize },

    #[error("{normals} normals for {positions} positions")]
    NormalCountMismatch { positions: usize, normals: usize },
}

/// A shader that failed to compile or link, with the compiler's diagnostic
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{name}: {log}")]
pub struct ShaderError {
    pub name: String,
    pub log: String,
}

impl ShaderError {
    pub fn new(name: impl Into<String>, log: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            log: log.into(),
        }
    }
}

/// Bad values coming from configuration or the command line
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown projection '{0}' (expected perspective, ortho or frustum)")]
    UnknownProjection(String),

    #[error("unknown fill style '{0}' (expected fill, wireframe or fillwireframe)")]
    UnknownFillStyle(String),

    #[error("unknown shape '{0}' (expected cube, sphere or cone)")]
    UnknownShape(String),

    #[error("missing value for {0}")]
    MissingValue(String),

    #[error("unrecognized argument '{0}'")]
    UnknownArgument(String),
}

/// Failures reported by a rendering backend
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("failed to allocate {0} buffer")]
    BufferAllocation(&'static str),

    #[error("rendering context unavailable: {0}")]
    Context(String),
}
