//! Viewer configuration: ambient occlusion controls, lighting, materials.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Runtime controls for the ambient occlusion post-process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AoSettings {
    /// When false the frame renders directly without the occlusion passes.
    pub enabled: bool,
    /// Depth-discontinuity sampling radius in view space.
    pub radius: f32,
}

impl Default for AoSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            radius: 0.01,
        }
    }
}

impl AoSettings {
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn double_radius(&mut self) {
        self.radius *= 2.0;
    }

    pub fn halve_radius(&mut self) {
        self.radius *= 0.5;
    }
}

/// Phong material coefficients for one surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

/// Single point light shared by every surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 0.5),
            ambient: Vec3::ONE,
            diffuse: Vec3::ONE,
            specular: Vec3::new(0.3, 0.3, 0.3),
        }
    }
}

/// Everything the frame loop needs that the user can influence.
///
/// Passed by reference into input handling and rendering; there is no
/// global state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub ao: AoSettings,
    pub light: Light,
    pub model_material: Material,
    pub floor_material: Material,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            ao: AoSettings::default(),
            light: Light::default(),
            model_material: Material {
                ambient: Vec3::new(0.2, 0.1, 0.0),
                diffuse: Vec3::new(0.6, 0.2, 0.1),
                specular: Vec3::ZERO,
                shininess: 0.0,
            },
            floor_material: Material {
                ambient: Vec3::ONE,
                diffuse: Vec3::ONE,
                specular: Vec3::ONE,
                shininess: 2.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ao_starts_disabled_with_default_radius() {
        let ao = AoSettings::default();
        assert!(!ao.enabled);
        assert!((ao.radius - 0.01).abs() < f32::EPSILON);
    }

    #[test]
    fn toggling_twice_restores_state() {
        let mut ao = AoSettings::default();
        ao.toggle();
        assert!(ao.enabled);
        ao.toggle();
        assert_eq!(ao, AoSettings::default());
    }

    #[test]
    fn radius_doubles_and_halves() {
        let mut ao = AoSettings::default();
        ao.double_radius();
        assert!((ao.radius - 0.02).abs() < f32::EPSILON);
        ao.halve_radius();
        ao.halve_radius();
        assert!((ao.radius - 0.005).abs() < f32::EPSILON);
    }

    #[test]
    fn settings_round_trip_through_serde() {
        let settings = ViewerSettings::default();
        let text = serde_json::to_string(&settings).unwrap();
        let back: ViewerSettings = serde_json::from_str(&text).unwrap();
        assert_eq!(settings, back);
    }
}
