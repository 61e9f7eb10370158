/// Keyboard camera controls.
///
/// Every recognised key applies one fixed-size step to one camera
/// parameter. Front-ends translate their native key events into
/// [`KeyEvent`] and re-render when [`CameraController::handle_key`] returns
/// `true`.
use std::f32::consts::PI;
use std::ops::RangeInclusive;

use crate::projection::Camera;

/// Step for eye pans and orbit distance
pub const DELTA_TRANSLATE: f32 = 0.05;
/// Step for the orbit angle (5 degrees)
pub const DELTA_ROTATE: f32 = PI / 36.0;
/// Step for the field of view (5 degrees)
pub const DELTA_FOVY: f32 = 5.0 * PI / 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Char(char),
}

/// A discrete key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub shift: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

/// Optional bounds for the zoom and field-of-view parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CameraLimits {
    pub distance: RangeInclusive<f32>,
    pub fovy: RangeInclusive<f32>,
}

impl Default for CameraLimits {
    fn default() -> Self {
        Self {
            distance: 0.5..=9.0,
            fovy: 5f32.to_radians()..=175f32.to_radians(),
        }
    }
}

impl CameraLimits {
    pub fn apply(&self, camera: &mut Camera) {
        camera.distance = camera
            .distance
            .clamp(*self.distance.start(), *self.distance.end());
        camera.fovy = camera.fovy.clamp(*self.fovy.start(), *self.fovy.end());
    }
}

/// Maps key events onto camera parameter steps
#[derive(Debug, Clone, Default)]
pub struct CameraController {
    pub limits: Option<CameraLimits>,
}

impl CameraController {
    pub fn new(limits: Option<CameraLimits>) -> Self {
        Self { limits }
    }

    /// Apply `event` to `camera`. Returns `false` for keys without a binding.
    ///
    /// Shift flips the sign of the `C`, `H`, `E` and `V` steps; the other
    /// bindings ignore it.
    pub fn handle_key(&self, camera: &mut Camera, event: KeyEvent) -> bool {
        let sign = if event.shift { -1.0 } else { 1.0 };

        match event.key {
            Key::Up => camera.eye.y += DELTA_TRANSLATE,
            Key::Down => camera.eye.y -= DELTA_TRANSLATE,
            Key::Left => camera.z_angle -= DELTA_ROTATE,
            Key::Right => camera.z_angle += DELTA_ROTATE,
            Key::Char(c) => match c.to_ascii_uppercase() {
                'W' => camera.eye.y += DELTA_TRANSLATE,
                'S' => camera.eye.y -= DELTA_TRANSLATE,
                'A' => camera.eye.x -= DELTA_TRANSLATE,
                'D' => camera.eye.x += DELTA_TRANSLATE,
                'H' => camera.eye.y += sign * DELTA_TRANSLATE,
                'C' => camera.z_angle += sign * DELTA_ROTATE,
                'E' => camera.distance += sign * DELTA_TRANSLATE,
                'V' => camera.fovy += sign * DELTA_FOVY,
                _ => return false,
            },
        }

        if let Some(limits) = &self.limits {
            limits.apply(camera);
        }

        log::trace!(
            "{:?} -> eye {:?} angle {:.3} distance {:.2} fovy {:.3}",
            event,
            camera.eye,
            camera.z_angle,
            camera.distance,
            camera.fovy
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::CameraDrive;

    const EPS: f32 = 1e-6;

    fn press(camera: &mut Camera, event: KeyEvent) -> bool {
        CameraController::default().handle_key(camera, event)
    }

    #[test]
    fn test_vertical_pan() {
        let mut camera = Camera::default();
        let y = camera.eye.y;
        assert!(press(&mut camera, KeyEvent::new(Key::Up)));
        assert!(press(&mut camera, KeyEvent::new(Key::Char('w'))));
        assert!((camera.eye.y - (y + 0.1)).abs() < EPS);

        assert!(press(&mut camera, KeyEvent::new(Key::Down)));
        assert!(press(&mut camera, KeyEvent::new(Key::Char('S'))));
        assert!((camera.eye.y - y).abs() < EPS);
    }

    #[test]
    fn test_h_pan_honours_shift() {
        let mut camera = Camera::default();
        let y = camera.eye.y;
        press(&mut camera, KeyEvent::new(Key::Char('h')));
        assert!((camera.eye.y - (y + DELTA_TRANSLATE)).abs() < EPS);
        press(&mut camera, KeyEvent::shifted(Key::Char('H')));
        press(&mut camera, KeyEvent::shifted(Key::Char('H')));
        assert!((camera.eye.y - (y - DELTA_TRANSLATE)).abs() < EPS);
    }

    #[test]
    fn test_wasd_ignore_shift() {
        let mut camera = Camera::default();
        let y = camera.eye.y;
        press(&mut camera, KeyEvent::shifted(Key::Char('W')));
        assert!((camera.eye.y - (y + DELTA_TRANSLATE)).abs() < EPS);
    }

    #[test]
    fn test_horizontal_pan() {
        let mut camera = Camera::default();
        camera.drive = CameraDrive::Free;
        press(&mut camera, KeyEvent::new(Key::Char('d')));
        press(&mut camera, KeyEvent::new(Key::Char('d')));
        press(&mut camera, KeyEvent::new(Key::Char('a')));
        assert!((camera.eye.x - DELTA_TRANSLATE).abs() < EPS);

        camera.update_orbit();
        assert!((camera.eye.x - DELTA_TRANSLATE).abs() < EPS);
    }

    #[test]
    fn test_orbit_keys() {
        let mut camera = Camera::default();
        press(&mut camera, KeyEvent::new(Key::Right));
        assert!((camera.z_angle - DELTA_ROTATE).abs() < EPS);
        press(&mut camera, KeyEvent::new(Key::Left));
        press(&mut camera, KeyEvent::new(Key::Left));
        assert!((camera.z_angle + DELTA_ROTATE).abs() < EPS);

        // Arrows ignore shift, C honours it
        press(&mut camera, KeyEvent::shifted(Key::Right));
        assert!(camera.z_angle.abs() < EPS);
        press(&mut camera, KeyEvent::shifted(Key::Char('C')));
        assert!((camera.z_angle + DELTA_ROTATE).abs() < EPS);
        press(&mut camera, KeyEvent::new(Key::Char('c')));
        assert!(camera.z_angle.abs() < EPS);
    }

    #[test]
    fn test_zoom_and_fov() {
        let mut camera = Camera::default();
        press(&mut camera, KeyEvent::new(Key::Char('e')));
        assert!((camera.distance - 4.05).abs() < 1e-5);
        press(&mut camera, KeyEvent::shifted(Key::Char('E')));
        press(&mut camera, KeyEvent::shifted(Key::Char('E')));
        assert!((camera.distance - 3.95).abs() < 1e-5);

        let fovy = camera.fovy;
        press(&mut camera, KeyEvent::new(Key::Char('v')));
        assert!((camera.fovy - fovy - 5f32.to_radians()).abs() < 1e-5);
        press(&mut camera, KeyEvent::shifted(Key::Char('V')));
        assert!((camera.fovy - fovy).abs() < 1e-5);
    }

    #[test]
    fn test_unbound_key_is_ignored() {
        let mut camera = Camera::default();
        let before = camera.clone();
        assert!(!press(&mut camera, KeyEvent::new(Key::Char('x'))));
        assert_eq!(camera, before);
    }

    #[test]
    fn test_unclamped_by_default() {
        let mut camera = Camera::default();
        camera.distance = 0.02;
        press(&mut camera, KeyEvent::shifted(Key::Char('E')));
        assert!(camera.distance < 0.0);
    }

    #[test]
    fn test_limits_clamp() {
        let controller = CameraController::new(Some(CameraLimits::default()));
        let mut camera = Camera::default();
        camera.distance = 0.52;
        controller.handle_key(&mut camera, KeyEvent::shifted(Key::Char('E')));
        assert_eq!(camera.distance, 0.5);

        camera.fovy = 175f32.to_radians();
        controller.handle_key(&mut camera, KeyEvent::new(Key::Char('V')));
        assert_eq!(camera.fovy, 175f32.to_radians());
    }
}
