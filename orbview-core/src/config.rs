/// Startup parameters for the scene and its camera
use std::str::FromStr;

use crate::controls::CameraLimits;
use crate::error::ConfigError;
use crate::geometry::Shape;
use crate::model::{Color, FillStyle};
use crate::projection::{CameraDrive, ProjectionMode};

/// One model to place at startup
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub shape: Shape,
    pub fill_style: FillStyle,
    pub color: Color,
    pub translate: [f32; 3],
    /// Euler angles in radians
    pub rotate: [f32; 3],
    pub scale: [f32; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub center: [f32; 3],
    pub up: [f32; 3],
    /// Degrees
    pub fovy_degrees: f32,
    pub distance: f32,
    pub z_angle: f32,
    pub projection: ProjectionMode,
    pub drive: CameraDrive,
    pub limits: Option<CameraLimits>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 1.0, 4.0],
            center: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            fovy_degrees: 60.0,
            distance: 4.0,
            z_angle: 0.0,
            projection: ProjectionMode::Perspective,
            drive: CameraDrive::Orbit,
            limits: None,
        }
    }
}

/// Everything needed to build a [`Scene`](crate::scene::Scene)
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub models: Vec<ModelConfig>,
    pub camera: CameraConfig,
}

impl Default for SceneConfig {
    /// Three boxes of different colour and proportions, filled with
    /// wireframe outlines.
    fn default() -> Self {
        let cube = |color: Color, translate: [f32; 3], scale: [f32; 3]| ModelConfig {
            shape: Shape::Cube,
            fill_style: FillStyle::FillWireframe,
            color,
            translate,
            rotate: [0.0, 0.0, 0.0],
            scale,
        };

        Self {
            models: vec![
                cube([1.0, 0.0, 0.0, 1.0], [-1.2, 0.1, 0.4], [0.8, 0.5, 0.5]),
                cube([0.0, 1.0, 0.0, 1.0], [0.0, 0.0, -0.2], [0.5, 0.35, 0.8]),
                cube([0.0, 0.0, 1.0, 1.0], [0.5, 0.0, -1.2], [0.5, 0.8, 0.5]),
            ],
            camera: CameraConfig::default(),
        }
    }
}

impl SceneConfig {
    pub fn with_projection(mut self, projection: ProjectionMode) -> Self {
        self.camera.projection = projection;
        self
    }

    /// Use the same fill style for every model
    pub fn with_fill_style(mut self, fill_style: FillStyle) -> Self {
        for model in &mut self.models {
            model.fill_style = fill_style;
        }
        self
    }

    /// Swap the mesh of every model
    pub fn with_shape(mut self, shape: Shape) -> Self {
        for model in &mut self.models {
            model.shape = shape;
        }
        self
    }
}

impl FromStr for Shape {
    type Err = ConfigError;

    /// Shape names map to their default resolution and size
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cube" => Ok(Shape::Cube),
            "sphere" => Ok(Shape::sphere()),
            "cone" => Ok(Shape::cone()),
            _ => Err(ConfigError::UnknownShape(s.to_string())),
        }
    }
}
