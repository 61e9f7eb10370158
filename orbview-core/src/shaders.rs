/// Shader sources and the CPU mirror of their shading rule
use nalgebra::Vector3;

/// Logical name of the vertex stage
pub const VERTEX_SHADER: &str = "vertexshader";
/// Logical name of the fragment stage
pub const FRAGMENT_SHADER: &str = "fragmentshader";

pub static SCENE_VERT: &str = include_str!("../shaders/scene.vert");
pub static SCENE_FRAG: &str = include_str!("../shaders/scene.frag");

/// Share of the base colour kept on surfaces facing away from the viewer
pub const AMBIENT: f32 = 0.6;

/// Supplies shader program text by logical name
pub trait ShaderSourceProvider {
    fn source(&self, name: &str) -> Option<String>;
}

/// The GLSL ES 3.00 sources compiled into the crate
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinShaders;

impl ShaderSourceProvider for BuiltinShaders {
    fn source(&self, name: &str) -> Option<String> {
        match name {
            VERTEX_SHADER => Some(SCENE_VERT.to_string()),
            FRAGMENT_SHADER => Some(SCENE_FRAG.to_string()),
            _ => None,
        }
    }
}

/// Brightness in `[AMBIENT, 1]` for an eye-space normal. Surfaces facing
/// the eye keep their full colour; a zero normal (normal attribute
/// disabled) is left unshaded.
pub fn shade_factor(normal: &Vector3<f32>) -> f32 {
    let len = normal.norm();
    if len > 0.0 && len.is_finite() {
        AMBIENT + (1.0 - AMBIENT) * (normal.z / len).abs()
    } else {
        1.0
    }
}
