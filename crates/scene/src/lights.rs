//! Three-point light rig.

use std::f32::consts::TAU;

use corelib::{Vec3, vec3};
use renderer::{LightUniform, MAX_LIGHTS};

use crate::config::LightConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightRole {
    Principal,
    Fill,
    Back,
}

impl LightRole {
    pub const ALL: [LightRole; MAX_LIGHTS] = [LightRole::Principal, LightRole::Fill, LightRole::Back];

    /// Multiplier on the light's contribution in the shader.
    pub fn weight(self) -> f32 {
        match self {
            LightRole::Principal => 1.0,
            LightRole::Fill => 0.4,
            LightRole::Back => 0.65,
        }
    }

    pub fn default_position(self) -> Vec3 {
        match self {
            LightRole::Principal => vec3(2.0, 3.0, 4.0),
            LightRole::Fill => vec3(-2.0, 1.0, 2.0),
            LightRole::Back => vec3(0.0, 1.0, -3.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub role: LightRole,
    pub position: Vec3,
    pub intensity: f32,
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightRig {
    lights: [Light; MAX_LIGHTS],
}

impl Default for LightRig {
    fn default() -> Self {
        Self::from_config(&[])
    }
}

impl LightRig {
    /// Configured lights fill the slots in order; missing slots use the role defaults.
    pub fn from_config(configs: &[LightConfig]) -> Self {
        let lights = LightRole::ALL.map(|role| Light {
            role,
            position: role.default_position(),
            intensity: 1.0,
            enabled: true,
        });
        let mut rig = Self { lights };
        for (light, config) in rig.lights.iter_mut().zip(configs) {
            light.position = config.position;
            light.intensity = config.intensity;
            light.enabled = config.enabled;
        }
        rig
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Flip a light on or off. Returns the new state, `None` for a bad index.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let light = self.lights.get_mut(index)?;
        light.enabled = !light.enabled;
        log::info!(
            "Light {} ({:?}) {}",
            index + 1,
            light.role,
            if light.enabled { "on" } else { "off" }
        );
        Some(light.enabled)
    }

    /// Per-frame uniforms. `time` drives the flicker; `None` means steady light.
    pub fn uniforms(&self, time: Option<f32>) -> [LightUniform; MAX_LIGHTS] {
        std::array::from_fn(|i| {
            let light = &self.lights[i];
            let flicker = time.map_or(1.0, |t| flicker_intensity(i, t));
            LightUniform::new(
                light.position,
                light.intensity * flicker,
                light.role.weight(),
                light.enabled,
            )
        })
    }
}

/// Two-frequency flicker in `[0.3, 1.0]`.
pub fn flicker_intensity(index: usize, time: f32) -> f32 {
    let i = index as f32;
    let f1 = 2.0 + 0.5 * i;
    let f2 = 1.5 + 0.3 * i;
    let a = ((TAU * f1 * time).sin() + 1.0) * 0.5;
    let b = ((TAU * f2 * time).cos() + 1.0) * 0.5;
    0.3 + 0.7 * (0.7 * a + 0.3 * b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_lights_use_role_defaults() {
        let rig = LightRig::from_config(&[LightConfig {
            position: Vec3::ONE,
            intensity: 0.5,
            enabled: true,
        }]);
        assert_eq!(rig.lights()[0].position, Vec3::ONE);
        assert_eq!(rig.lights()[0].intensity, 0.5);
        assert_eq!(rig.lights()[1].position, vec3(-2.0, 1.0, 2.0));
        assert_eq!(rig.lights()[2].position, vec3(0.0, 1.0, -3.0));
        assert_eq!(rig.lights()[2].intensity, 1.0);
    }

    #[test]
    fn role_weights() {
        let u = LightRig::default().uniforms(None);
        assert_eq!(u.map(|l| l.weight), [1.0, 0.4, 0.65]);
        assert_eq!(u.map(|l| l.intensity), [1.0; 3]);
    }

    #[test]
    fn toggle_flips_enabled() {
        let mut rig = LightRig::default();
        assert_eq!(rig.toggle(1), Some(false));
        assert!(!rig.uniforms(None)[1].is_enabled());
        assert_eq!(rig.toggle(1), Some(true));
        assert_eq!(rig.toggle(3), None);
    }

    #[test]
    fn flicker_stays_in_range() {
        for i in 0..MAX_LIGHTS {
            for step in 0..500 {
                let f = flicker_intensity(i, step as f32 * 0.013);
                assert!((0.3..=1.0).contains(&f), "flicker {f} out of range");
            }
        }
        // t = 0: a = 0.5, b = 1.0
        assert!((flicker_intensity(0, 0.0) - (0.3 + 0.7 * (0.35 + 0.3))).abs() < 1e-6);
    }

    #[test]
    fn flicker_scales_base_intensity() {
        let rig = LightRig::from_config(&[LightConfig {
            position: Vec3::ZERO,
            intensity: 2.0,
            enabled: true,
        }]);
        let u = rig.uniforms(Some(0.0));
        assert!((u[0].intensity - 2.0 * flicker_intensity(0, 0.0)).abs() < 1e-6);
    }
}
