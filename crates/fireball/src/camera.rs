use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat4, Vec3};
use renderer::Camera;

const DEFAULT_DISTANCE: f32 = 5.0;
const MIN_DISTANCE: f32 = 1.5;
const MAX_DISTANCE: f32 = 50.0;
const MAX_ELEVATION: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Perspective camera orbiting a target point.
///
/// Orientation is kept as azimuth/elevation around `target`, so the default
/// eye sits at `(0, 0, 5)` looking at the origin.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    target: Vec3,
    up: Vec3,
    distance: f32,
    azimuth: f32,
    elevation: f32,
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
    view: Mat4,
    projection: Mat4,
}

impl OrbitCamera {
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self {
            target: Vec3::ZERO,
            up: Vec3::Y,
            distance: DEFAULT_DISTANCE,
            azimuth: 0.0,
            elevation: 0.0,
            fov_y: 45f32.to_radians(),
            aspect,
            near: 0.1,
            far: 1000.0,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.update();
        camera.update_projection_matrix();
        camera
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let (sin_el, cos_el) = self.elevation.sin_cos();
        self.target + self.distance * Vec3::new(cos_el * sin_az, sin_el, cos_el * cos_az)
    }

    /// Rotates around the target by the given angles in radians.
    pub fn orbit(&mut self, delta_azimuth: f32, delta_elevation: f32) {
        self.azimuth = (self.azimuth + delta_azimuth).rem_euclid(std::f32::consts::TAU);
        self.elevation = (self.elevation + delta_elevation).clamp(-MAX_ELEVATION, MAX_ELEVATION);
    }

    /// Scales the eye distance; values below 1 move closer.
    pub fn zoom(&mut self, factor: f32) {
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

impl Camera for OrbitCamera {
    fn view_matrix(&self) -> Mat4 {
        self.view
    }

    fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    fn update(&mut self) {
        self.view = Mat4::look_at_rh(self.eye(), self.target, self.up);
    }

    fn set_aspect_ratio(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far);
    }
}

/// Camera handle shared between the frame loop and the input handlers.
#[derive(Debug, Clone)]
pub struct SharedCamera(Rc<RefCell<OrbitCamera>>);

impl SharedCamera {
    pub fn new(camera: OrbitCamera) -> Self {
        Self(Rc::new(RefCell::new(camera)))
    }

    pub fn orbit(&self, delta_azimuth: f32, delta_elevation: f32) {
        self.0.borrow_mut().orbit(delta_azimuth, delta_elevation);
    }

    pub fn zoom(&self, factor: f32) {
        self.0.borrow_mut().zoom(factor);
    }
}

impl Camera for SharedCamera {
    fn view_matrix(&self) -> Mat4 {
        self.0.borrow().view_matrix()
    }

    fn projection_matrix(&self) -> Mat4 {
        self.0.borrow().projection_matrix()
    }

    fn update(&mut self) {
        self.0.borrow_mut().update();
    }

    fn set_aspect_ratio(&mut self, aspect: f32) {
        self.0.borrow_mut().set_aspect_ratio(aspect);
    }

    fn update_projection_matrix(&mut self) {
        self.0.borrow_mut().update_projection_matrix();
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4;

    use super::*;

    #[test]
    fn default_eye_looks_down_negative_z() {
        let camera = OrbitCamera::new(1.0);
        assert!(camera.eye().abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-6));
        let origin = camera.view_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(origin.abs_diff_eq(Vec4::new(0.0, 0.0, -5.0, 1.0), 1e-5));
    }

    #[test]
    fn projection_follows_aspect() {
        let mut camera = OrbitCamera::new(1.0);
        let square = camera.projection_matrix();
        camera.set_aspect_ratio(2.0);
        assert_eq!(camera.projection_matrix(), square);
        camera.update_projection_matrix();
        let wide = camera.projection_matrix();
        assert!((wide.x_axis.x * 2.0 - square.x_axis.x).abs() < 1e-6);
        assert_eq!(wide.y_axis.y, square.y_axis.y);
    }

    #[test]
    fn degenerate_aspect_is_ignored() {
        let mut camera = OrbitCamera::new(1.5);
        camera.set_aspect_ratio(0.0);
        camera.set_aspect_ratio(f32::NAN);
        camera.update_projection_matrix();
        assert_eq!(
            camera.projection_matrix(),
            OrbitCamera::new(1.5).projection_matrix()
        );
    }

    #[test]
    fn orbit_keeps_distance_and_clamps_elevation() {
        let mut camera = OrbitCamera::new(1.0);
        camera.orbit(std::f32::consts::FRAC_PI_2, 10.0);
        assert!((camera.eye().length() - 5.0).abs() < 1e-4);
        assert!(camera.eye().y < 5.0);
        camera.zoom(100.0);
        assert_eq!(camera.eye().length().round(), MAX_DISTANCE);
    }

    #[test]
    fn shared_handle_moves_the_frame_loop_camera() {
        let input = SharedCamera::new(OrbitCamera::new(1.0));
        let mut frame_side = input.clone();
        input.orbit(std::f32::consts::PI, 0.0);
        frame_side.update();
        let origin = frame_side.view_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(origin.abs_diff_eq(Vec4::new(0.0, 0.0, -5.0, 1.0), 1e-4));
        let eye = input.0.borrow().eye();
        assert!(eye.abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), 1e-4));
    }
}
