use bevy::prelude::*;

use crate::scene::Scene;

/// The figure presented in the window.
#[derive(Resource, Clone)]
pub struct SceneRes(pub Scene);

impl SceneRes {
    pub fn new(scene: Scene) -> Self {
        Self(scene)
    }
}

/// Camera orbit around the origin of the normalized 3-D cube. Angles in
/// radians; elevation is clamped short of the poles.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct Orbit {
    pub azimuth: f32,
    pub elevation: f32,
    pub distance: f32,
}

impl Default for Orbit {
    fn default() -> Self {
        Self {
            azimuth: (-60.0f32).to_radians(),
            elevation: 30.0f32.to_radians(),
            distance: 5.5,
        }
    }
}

impl Orbit {
    pub const MIN_DISTANCE: f32 = 2.0;
    pub const MAX_DISTANCE: f32 = 20.0;

    pub fn rotate(&mut self, delta: Vec2) {
        self.azimuth -= delta.x * 0.008;
        self.elevation = (self.elevation + delta.y * 0.008).clamp(-1.5, 1.5);
    }

    pub fn zoom(&mut self, scroll: f32) {
        self.distance = (self.distance * (1.0 - scroll * 0.1)).clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
    }

    /// Camera transform looking at the origin with world +Y up.
    pub fn transform(&self) -> Transform {
        let (sa, ca) = self.azimuth.sin_cos();
        let (se, ce) = self.elevation.sin_cos();
        // Data x runs along world +X and data y along world -Z.
        let eye = Vec3::new(ce * ca, se, -ce * sa) * self.distance;
        Transform::from_translation(eye).looking_at(Vec3::ZERO, Vec3::Y)
    }
}

/// Marks the camera driven by [`Orbit`].
#[derive(Component)]
pub struct OrbitCamera;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_is_clamped() {
        let mut orbit = Orbit::default();
        orbit.rotate(Vec2::new(0.0, 10_000.0));
        assert_eq!(orbit.elevation, 1.5);
        orbit.zoom(-1_000.0);
        assert_eq!(orbit.distance, Orbit::MAX_DISTANCE);
        orbit.zoom(9.0);
        assert_eq!(orbit.distance, Orbit::MIN_DISTANCE);
    }

    #[test]
    fn orbit_camera_looks_at_origin() {
        let orbit = Orbit::default();
        let transform = orbit.transform();
        assert!((transform.translation.length() - orbit.distance).abs() < 1e-4);
        let toward_origin = -transform.translation.normalize();
        assert!(transform.forward().dot(toward_origin) > 0.999);
    }
}
