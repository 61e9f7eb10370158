/// Application context: the camera, its controls and the ordered models
use nalgebra::{Point3, Vector3};
use std::sync::Arc;

use crate::config::SceneConfig;
use crate::controls::{CameraController, KeyEvent};
use crate::error::GeometryError;
use crate::geometry::{self, Mesh, Shape};
use crate::model::Model;
use crate::projection::Camera;
use crate::transform::Transform;

#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    pub controller: CameraController,
    pub models: Vec<Model>,
}

impl Scene {
    /// Build the scene for a `width` x `height` viewport. Models with the
    /// same shape share one mesh.
    pub fn from_config(config: &SceneConfig, width: u32, height: u32) -> Result<Self, GeometryError> {
        let mut meshes: Vec<(Shape, Arc<Mesh>)> = Vec::new();
        let mut models = Vec::with_capacity(config.models.len());

        for model in &config.models {
            let mesh = match meshes.iter().find(|(shape, _)| *shape == model.shape) {
                Some((_, mesh)) => Arc::clone(mesh),
                None => {
                    let mesh = Arc::new(geometry::generate(&model.shape)?);
                    log::debug!(
                        "generated {} mesh: {} vertices, {} triangles, {} edges",
                        model.shape.name(),
                        mesh.vertex_count(),
                        mesh.triangles().len(),
                        mesh.lines().len()
                    );
                    meshes.push((model.shape, Arc::clone(&mesh)));
                    mesh
                }
            };

            models.push(Model::new(
                mesh,
                model.color,
                model.fill_style,
                Transform::new(model.translate, model.rotate, model.scale),
            ));
        }

        let cam = &config.camera;
        let mut camera = Camera::new(width, height);
        camera.eye = Point3::from(cam.eye);
        camera.center = Point3::from(cam.center);
        camera.up = Vector3::from(cam.up);
        camera.fovy = cam.fovy_degrees.to_radians();
        camera.distance = cam.distance;
        camera.z_angle = cam.z_angle;
        camera.mode = cam.projection;
        camera.drive = cam.drive;

        Ok(Self {
            camera,
            controller: CameraController::new(cam.limits.clone()),
            models,
        })
    }

    /// Feed one key press to the camera controls. Returns `true` when the
    /// scene needs to be redrawn.
    pub fn handle_key(&mut self, event: KeyEvent) -> bool {
        self.controller.handle_key(&mut self.camera, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::Key;
    use crate::model::FillStyle;
    use crate::projection::ProjectionMode;

    #[test]
    fn test_default_scene_shares_one_cube_mesh() {
        let scene = Scene::from_config(&SceneConfig::default(), 800, 600).unwrap();
        assert_eq!(scene.models.len(), 3);
        assert!(Arc::ptr_eq(&scene.models[0].mesh, &scene.models[1].mesh));
        assert!(Arc::ptr_eq(&scene.models[1].mesh, &scene.models[2].mesh));
        assert_eq!(scene.models[0].mesh.vertex_count(), 24);
        assert_eq!(scene.models[0].color, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_camera_from_config() {
        let config = SceneConfig::default().with_projection(ProjectionMode::Orthographic);
        let scene = Scene::from_config(&config, 400, 200).unwrap();
        assert_eq!(scene.camera.mode, ProjectionMode::Orthographic);
        assert_eq!(scene.camera.aspect, 2.0);
        assert_eq!(scene.camera.eye, Point3::new(0.0, 1.0, 4.0));
    }

    #[test]
    fn test_bad_shape_fails_fast() {
        let mut config = SceneConfig::default();
        config.models[1].shape = Shape::Sphere {
            longitudes: 0,
            latitudes: 10,
            radius: 1.0,
        };
        assert!(matches!(
            Scene::from_config(&config, 800, 600),
            Err(GeometryError::InvalidResolution { .. })
        ));
    }

    #[test]
    fn test_handle_key_reports_redraw() {
        let mut scene = Scene::from_config(&SceneConfig::default(), 800, 600).unwrap();
        assert!(scene.handle_key(KeyEvent::new(Key::Left)));
        assert!(!scene.handle_key(KeyEvent::new(Key::Char('q'))));
        assert_eq!(scene.models[0].fill_style, FillStyle::FillWireframe);
    }
}
