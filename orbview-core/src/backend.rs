/// The graphics API seen by the frame renderer
use nalgebra::{Matrix3, Matrix4};

use crate::error::{RenderError, ShaderError};
use crate::model::Color;

/// Primitive topology of an indexed draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
}

/// Fixed-function state applied once at startup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineState {
    pub clear_color: Color,
    /// Counter-clockwise triangles face the viewer
    pub front_face_ccw: bool,
    pub cull_back_faces: bool,
    pub depth_test: bool,
    /// `(factor, units)` depth bias for filled polygons, so coincident
    /// edges drawn afterwards win the depth test
    pub polygon_offset: Option<(f32, f32)>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            clear_color: [0.95, 0.95, 0.95, 1.0],
            front_face_ccw: true,
            cull_back_faces: true,
            depth_test: true,
            polygon_offset: Some((0.5, 0.0)),
        }
    }
}

/// Text of one shader stage, tagged with its logical name
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderSource {
    pub name: String,
    pub text: String,
}

impl ShaderSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Immediate-mode rendering backend.
///
/// Uniform setters and draws act on the program last passed to
/// [`use_program`](RenderBackend::use_program); with no program bound the
/// backend accepts the calls and draws nothing.
pub trait RenderBackend {
    type Program;
    type Buffer;

    /// Compile both stages and link them. Errors carry the logical name of
    /// the failing stage and the compiler log.
    fn compile_program(
        &mut self,
        vertex: &ShaderSource,
        fragment: &ShaderSource,
    ) -> Result<Self::Program, ShaderError>;

    fn use_program(&mut self, program: Option<&Self::Program>);

    fn create_vertex_buffer(&mut self, data: &[f32]) -> Result<Self::Buffer, RenderError>;

    fn create_index_buffer(&mut self, data: &[u16]) -> Result<Self::Buffer, RenderError>;

    fn apply_pipeline(&mut self, state: &PipelineState);

    fn set_viewport(&mut self, width: u32, height: u32);

    /// Clear colour and depth
    fn clear(&mut self);

    fn set_projection(&mut self, matrix: &Matrix4<f32>);

    fn set_view_model(&mut self, matrix: &Matrix4<f32>);

    fn set_normal_matrix(&mut self, matrix: &Matrix3<f32>);

    fn set_color(&mut self, color: Color);

    /// Bind vertex streams. `None` for normals disables that attribute and
    /// feeds a constant zero normal instead.
    fn bind_attributes(&mut self, positions: &Self::Buffer, normals: Option<&Self::Buffer>);

    fn draw_indexed(&mut self, topology: Topology, indices: &Self::Buffer, count: usize);
}
