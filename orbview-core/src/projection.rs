/// Camera state, orbit recomputation and projection matrices
use nalgebra::{Matrix4, Point3, Vector3};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Near/far planes per projection mode
pub const PERSPECTIVE_CLIP: (f32, f32) = (1.0, 10.0);
pub const ORTHOGRAPHIC_CLIP: (f32, f32) = (-10.0, 10.0);
pub const FRUSTUM_CLIP: (f32, f32) = (1.0, 10.0);

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthographic,
    Frustum,
}

impl ProjectionMode {
    pub fn name(&self) -> &'static str {
        match self {
            ProjectionMode::Perspective => "perspective",
            ProjectionMode::Orthographic => "ortho",
            ProjectionMode::Frustum => "frustum",
        }
    }
}

impl fmt::Display for ProjectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProjectionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "perspective" => Ok(ProjectionMode::Perspective),
            "ortho" | "orthographic" => Ok(ProjectionMode::Orthographic),
            "frustum" => Ok(ProjectionMode::Frustum),
            _ => Err(ConfigError::UnknownProjection(s.to_string())),
        }
    }
}

/// How the eye position is driven between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraDrive {
    /// `eye.x` / `eye.z` are rederived from the orbit angle and distance
    /// every frame; only `eye.y` is free.
    #[default]
    Orbit,
    /// The eye stays wherever the key handlers put it.
    Free,
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub eye: Point3<f32>,
    pub center: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fovy: f32,
    pub aspect: f32,
    /// Half extent of the orthographic box (the frustum uses half of it)
    pub lrtb: f32,
    /// Azimuth around `center`, measured from +Z towards +X
    pub z_angle: f32,
    pub distance: f32,
    pub mode: ProjectionMode,
    pub drive: CameraDrive,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self {
            eye: Point3::new(0.0, 1.0, 4.0),
            center: Point3::origin(),
            up: Vector3::y(),
            fovy: 60f32.to_radians(),
            aspect: 1.0,
            lrtb: 2.0,
            z_angle: 0.0,
            distance: 4.0,
            mode: ProjectionMode::Perspective,
            drive: CameraDrive::Orbit,
        };
        camera.set_viewport(width, height);
        camera
    }

    /// Update the aspect ratio from a viewport size. An empty viewport keeps
    /// the previous aspect.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn set_projection(&mut self, mode: ProjectionMode) {
        if self.mode != mode {
            log::debug!("projection {} -> {}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Put the eye back on the orbit circle around `center`. Leaves `eye.y`
    /// alone. Does nothing in [`CameraDrive::Free`].
    pub fn update_orbit(&mut self) {
        if self.drive != CameraDrive::Orbit {
            return;
        }
        self.eye.x = self.center.x + self.distance * self.z_angle.sin();
        self.eye.z = self.center.z + self.distance * self.z_angle.cos();
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.eye, &self.center, &self.up)
    }

    /// Create the projection matrix for the current mode
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                let (near, far) = PERSPECTIVE_CLIP;
                Matrix4::new_perspective(self.aspect, self.fovy, near, far)
            }
            ProjectionMode::Orthographic => {
                let (near, far) = ORTHOGRAPHIC_CLIP;
                let v = self.lrtb;
                Matrix4::new_orthographic(-v, v, -v, v, near, far)
            }
            ProjectionMode::Frustum => {
                let (near, far) = FRUSTUM_CLIP;
                let v = self.lrtb / 2.0;
                frustum(-v, v, -v, v, near, far)
            }
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Off-centre perspective projection, as `glFrustum` builds it
pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Matrix4<f32> {
    let rl = right - left;
    let tb = top - bottom;
    let nf = far - near;

    #[rustfmt::skip]
    let m = Matrix4::new(
        2.0 * near / rl, 0.0,             (right + left) / rl, 0.0,
        0.0,             2.0 * near / tb, (top + bottom) / tb, 0.0,
        0.0,             0.0,             -(far + near) / nf,  -2.0 * far * near / nf,
        0.0,             0.0,             -1.0,                0.0,
    );
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert_eq!(camera.mode, ProjectionMode::Perspective);
        assert_eq!(camera.drive, CameraDrive::Orbit);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert!((camera.fovy - std::f32::consts::FRAC_PI_3).abs() < 1e-6);
    }

    #[test]
    fn test_empty_viewport_keeps_aspect() {
        let mut camera = Camera::new(400, 200);
        camera.set_viewport(100, 0);
        assert_eq!(camera.aspect, 2.0);

        camera.set_viewport(0, 600);
        assert_eq!(camera.aspect, 2.0);
        for mode in [
            ProjectionMode::Perspective,
            ProjectionMode::Orthographic,
            ProjectionMode::Frustum,
        ] {
            camera.set_projection(mode);
            assert!(camera.projection_matrix().iter().all(|v| v.is_finite()));
        }

        // Starting from an empty viewport falls back to a square aspect
        assert_eq!(Camera::new(0, 0).aspect, 1.0);
    }

    #[test]
    fn test_orbit_at_zero_angle() {
        let mut camera = Camera::default();
        camera.eye.y = 0.7;
        camera.update_orbit();
        assert!((camera.eye - Point3::new(0.0, 0.7, 4.0)).norm() < 1e-6);
    }

    #[test]
    fn test_orbit_at_quarter_turn() {
        let mut camera = Camera::default();
        camera.z_angle = FRAC_PI_2;
        camera.update_orbit();
        assert!((camera.eye - Point3::new(4.0, 1.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_orbit_overwrites_direct_x_but_not_in_free_drive() {
        let mut camera = Camera::default();
        camera.eye.x = 3.0;
        camera.update_orbit();
        assert!(camera.eye.x.abs() < 1e-6);

        camera.drive = CameraDrive::Free;
        camera.eye.x = 3.0;
        camera.update_orbit();
        assert_eq!(camera.eye.x, 3.0);
    }

    #[test]
    fn test_view_matrix_moves_center_in_front() {
        let mut camera = Camera::default();
        camera.update_orbit();
        let view = camera.view_matrix();
        let center = view.transform_point(&camera.center);
        // Right-handed view space looks down -Z
        assert!(center.z < 0.0);
        assert!(center.x.abs() < 1e-6);
    }

    #[test]
    fn test_projection_modes_map_center_to_origin() {
        let mut camera = Camera::new(100, 100);
        camera.update_orbit();
        let view = camera.view_matrix();

        for mode in [
            ProjectionMode::Perspective,
            ProjectionMode::Orthographic,
            ProjectionMode::Frustum,
        ] {
            camera.set_projection(mode);
            let ndc = camera
                .projection_matrix()
                .transform_point(&view.transform_point(&camera.center));
            assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5, "{mode}");
            assert!(ndc.z > -1.0 && ndc.z < 1.0, "{mode}");
        }
    }

    #[test]
    fn test_frustum_matches_symmetric_perspective() {
        // A symmetric frustum with half extent = near * tan(fovy / 2) is a
        // perspective projection with aspect 1.
        let fovy = 1.0f32;
        let v = (fovy / 2.0).tan();
        let a = frustum(-v, v, -v, v, 1.0, 10.0);
        let b = Matrix4::new_perspective(1.0, fovy, 1.0, 10.0);
        assert!((a - b).norm() < 1e-5);
    }

    #[test]
    fn test_projection_mode_parsing() {
        assert_eq!("ortho".parse::<ProjectionMode>(), Ok(ProjectionMode::Orthographic));
        assert_eq!("Frustum".parse::<ProjectionMode>(), Ok(ProjectionMode::Frustum));
        assert_eq!("perspective".parse::<ProjectionMode>(), Ok(ProjectionMode::Perspective));
        assert_eq!(
            "fisheye".parse::<ProjectionMode>(),
            Err(ConfigError::UnknownProjection("fisheye".into()))
        );
    }
}
