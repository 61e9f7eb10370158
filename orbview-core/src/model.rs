/// Placed, coloured instances of a shared mesh
use nalgebra::{Matrix3, Matrix4};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::geometry::Mesh;
use crate::transform::{normal_matrix, Transform};

/// RGBA, each channel in `[0, 1]`
pub type Color = [f32; 4];

pub const BLACK: Color = [0.0, 0.0, 0.0, 1.0];

/// Which primitives are drawn for a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillStyle {
    Fill,
    Wireframe,
    #[default]
    FillWireframe,
}

impl FillStyle {
    pub fn has_fill(&self) -> bool {
        matches!(self, FillStyle::Fill | FillStyle::FillWireframe)
    }

    pub fn has_wireframe(&self) -> bool {
        matches!(self, FillStyle::Wireframe | FillStyle::FillWireframe)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FillStyle::Fill => "fill",
            FillStyle::Wireframe => "wireframe",
            FillStyle::FillWireframe => "fillwireframe",
        }
    }
}

impl fmt::Display for FillStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FillStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fill" => Ok(FillStyle::Fill),
            "wireframe" => Ok(FillStyle::Wireframe),
            "fillwireframe" | "fill+wireframe" => Ok(FillStyle::FillWireframe),
            _ => Err(ConfigError::UnknownFillStyle(s.to_string())),
        }
    }
}

/// One occurrence of a mesh in the scene.
///
/// The matrices are derived state, rebuilt by [`Model::update_transforms`]
/// every frame.
#[derive(Debug, Clone)]
pub struct Model {
    pub mesh: Arc<Mesh>,
    pub color: Color,
    pub fill_style: FillStyle,
    pub transform: Transform,
    world: Matrix4<f32>,
    view_model: Matrix4<f32>,
    normal: Matrix3<f32>,
}

impl Model {
    pub fn new(mesh: Arc<Mesh>, color: Color, fill_style: FillStyle, transform: Transform) -> Self {
        Self {
            mesh,
            color,
            fill_style,
            transform,
            world: Matrix4::identity(),
            view_model: Matrix4::identity(),
            normal: Matrix3::identity(),
        }
    }

    /// Rebuild world, view-model and normal matrices against `view`.
    pub fn update_transforms(&mut self, view: &Matrix4<f32>) {
        self.world = self.transform.world_matrix();
        self.view_model = view * self.world;
        self.normal = normal_matrix(&self.view_model);
    }

    pub fn world_matrix(&self) -> &Matrix4<f32> {
        &self.world
    }

    pub fn view_model_matrix(&self) -> &Matrix4<f32> {
        &self.view_model
    }

    pub fn normal_matrix(&self) -> &Matrix3<f32> {
        &self.normal
    }
}
