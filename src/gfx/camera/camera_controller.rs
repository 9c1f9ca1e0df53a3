use std::time::Duration;

use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, MouseScrollDelta},
};

use super::orbit_camera::OrbitCamera;

/// Orbit controls with inertial damping.
///
/// Dragging rotates the camera directly and records the drag velocity.
/// Once the button is released, [`CameraController::update`] keeps applying
/// the residual velocity and decays it exponentially, so the orbit glides to
/// a stop instead of halting the moment the pointer stops.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    /// Fraction of residual velocity removed per reference frame (~60 Hz).
    pub damping: f32,
    is_mouse_pressed: bool,
    yaw_velocity: f32,
    pitch_velocity: f32,
    zoom_velocity: f32,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            damping: 0.08,
            is_mouse_pressed: false,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            zoom_velocity: 0.0,
        }
    }

    pub fn process_events(&mut self, event: &DeviceEvent, camera: &mut OrbitCamera) {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
            }
            DeviceEvent::MouseWheel { delta, .. } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32
                    }
                };
                self.zoom_velocity += scroll_amount * self.zoom_speed;
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.is_mouse_pressed {
                    let yaw_delta = -delta.0 as f32 * self.rotate_speed;
                    let pitch_delta = delta.1 as f32 * self.rotate_speed;
                    camera.add_yaw(yaw_delta);
                    camera.add_pitch(pitch_delta);
                    self.yaw_velocity = yaw_delta;
                    self.pitch_velocity = pitch_delta;
                }
            }
            _ => (),
        }
    }

    /// Advances the damping state by one step.
    ///
    /// Must run once per frame, before the frame is rendered.
    pub fn update(&mut self, camera: &mut OrbitCamera, dt: Duration) {
        if !self.is_mouse_pressed {
            camera.add_yaw(self.yaw_velocity);
            camera.add_pitch(self.pitch_velocity);
        }
        if self.zoom_velocity.abs() > 0.0 {
            camera.add_distance(self.zoom_velocity);
        }

        // Exponential decay, normalized to a 60 Hz reference frame so the
        // feel does not depend on the refresh rate.
        let decay = (1.0 - self.damping).powf(dt.as_secs_f32() * 60.0);
        self.yaw_velocity *= decay;
        self.pitch_velocity *= decay;
        self.zoom_velocity *= decay;

        if self.yaw_velocity.abs() < 1e-5 {
            self.yaw_velocity = 0.0;
        }
        if self.pitch_velocity.abs() < 1e-5 {
            self.pitch_velocity = 0.0;
        }
        if self.zoom_velocity.abs() < 1e-5 {
            self.zoom_velocity = 0.0;
        }
    }

    /// Returns true while a drag-rotate is in progress.
    pub fn is_rotating(&self) -> bool {
        self.is_mouse_pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector3, Zero};

    fn camera() -> OrbitCamera {
        OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0)
    }

    #[test]
    fn released_drag_keeps_gliding_then_stops() {
        let mut controller = CameraController::new(0.005, 0.1);
        let mut camera = camera();

        controller.process_events(
            &DeviceEvent::Button {
                button: 0,
                state: ElementState::Pressed,
            },
            &mut camera,
        );
        controller.process_events(&DeviceEvent::MouseMotion { delta: (40.0, 0.0) }, &mut camera);
        controller.process_events(
            &DeviceEvent::Button {
                button: 0,
                state: ElementState::Released,
            },
            &mut camera,
        );

        let yaw_after_drag = camera.yaw;
        let dt = Duration::from_millis(16);

        controller.update(&mut camera, dt);
        assert!(camera.yaw < yaw_after_drag, "inertia should keep rotating");

        // A few seconds of updates must bleed the velocity off entirely.
        for _ in 0..300 {
            controller.update(&mut camera, dt);
        }
        let settled = camera.yaw;
        controller.update(&mut camera, dt);
        assert_eq!(camera.yaw, settled);
    }

    #[test]
    fn scroll_zoom_decays_to_zero() {
        let mut controller = CameraController::new(0.005, 0.1);
        let mut camera = camera();
        let start_distance = camera.distance;

        controller.process_events(
            &DeviceEvent::MouseWheel {
                delta: MouseScrollDelta::LineDelta(0.0, -1.0),
            },
            &mut camera,
        );

        let dt = Duration::from_millis(16);
        for _ in 0..300 {
            controller.update(&mut camera, dt);
        }
        assert!(camera.distance > start_distance);

        let settled = camera.distance;
        controller.update(&mut camera, dt);
        assert_eq!(camera.distance, settled);
    }
}
