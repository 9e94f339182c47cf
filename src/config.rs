//! Tunable constants for the field.
//!
//! Every field has a serde default, so a JSON file only needs to list the
//! values it changes:
//!
//! ```json
//! { "particle_count": 120, "physics": { "damping": 0.97 } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest magnitude the attractor strength can take.
pub const ATTRACTOR_STRENGTH_LIMIT: f32 = 2.0;

/// Complete field configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of particles seeded on attach. Fixed for the session.
    pub particle_count: usize,
    /// RNG seed for reproducible layouts. `None` seeds from entropy.
    pub seed: Option<u64>,
    pub physics: PhysicsConfig,
    pub render: RenderConfig,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 80,
            seed: None,
            physics: PhysicsConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

/// Force solver and integrator constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Pair coupling. Positive attracts, negative repels.
    pub pair_strength: f32,
    /// Pairs at or below this distance exert no force.
    pub pair_min_distance: f32,
    /// Pairs at or beyond this distance exert no force.
    pub pair_max_distance: f32,
    pub attractor_gain: f32,
    /// Particles farther than this from the attractor ignore it.
    pub attractor_radius: f32,
    /// Added to the attractor distance before dividing.
    pub attractor_softening: f32,
    /// Attractor strength set by pointer movement.
    pub pointer_strength: f32,
    pub drift_amplitude: f32,
    /// Radians the drift phase advances per frame.
    pub drift_rate: f32,
    /// Width of the edge band where the restoring force applies.
    pub boundary_margin: f32,
    pub boundary_stiffness: f32,
    /// Per-frame velocity multiplier, in (0, 1).
    pub damping: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            pair_strength: 0.5,
            pair_min_distance: 5.0,
            pair_max_distance: 150.0,
            attractor_gain: 0.6,
            attractor_radius: 300.0,
            attractor_softening: 20.0,
            pointer_strength: 1.0,
            drift_amplitude: 0.01,
            drift_rate: 0.02,
            boundary_margin: 50.0,
            boundary_stiffness: 0.002,
            damping: 0.98,
        }
    }
}

/// Drawing constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Pairs closer than this get a connecting line.
    pub connection_distance: f32,
    /// Line alpha at zero distance.
    pub line_alpha: f32,
    /// Disc radius is `mass * disc_radius_per_mass`.
    pub disc_radius_per_mass: f32,
    /// Speed above which a disc switches to the accent colour.
    pub accent_speed: f32,
    pub palette: Palette,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            connection_distance: 150.0,
            line_alpha: 0.1,
            disc_radius_per_mass: 2.0,
            accent_speed: 1.0,
            palette: Palette::default(),
        }
    }
}

/// sRGB colours used by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Background behind the field.
    pub void: [u8; 3],
    /// Lines and idle particles.
    pub signal: [u8; 3],
    /// Fast particles.
    pub accent: [u8; 3],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            void: [0x12, 0x12, 0x12],
            signal: [0xF8, 0xF6, 0xF2],
            accent: [0x8B, 0x6F, 0x4C],
        }
    }
}

impl FieldConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the solver cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::Invalid("particle_count must be at least 1".into()));
        }
        self.physics.validate()?;
        self.render.validate()
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            ("pair_strength", self.pair_strength),
            ("pair_min_distance", self.pair_min_distance),
            ("pair_max_distance", self.pair_max_distance),
            ("attractor_gain", self.attractor_gain),
            ("attractor_radius", self.attractor_radius),
            ("attractor_softening", self.attractor_softening),
            ("pointer_strength", self.pointer_strength),
            ("drift_amplitude", self.drift_amplitude),
            ("drift_rate", self.drift_rate),
            ("boundary_margin", self.boundary_margin),
            ("boundary_stiffness", self.boundary_stiffness),
            ("damping", self.damping),
        ];
        ensure_finite(&values)?;

        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "damping must be in (0, 1), got {}",
                self.damping
            )));
        }
        if self.attractor_softening <= 0.0 {
            return Err(ConfigError::Invalid(
                "attractor_softening must be positive".into(),
            ));
        }
        if self.pair_min_distance <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "pair_min_distance must be positive, got {}",
                self.pair_min_distance
            )));
        }
        if self.pair_min_distance >= self.pair_max_distance {
            return Err(ConfigError::Invalid(format!(
                "pair band ({}, {}) is empty",
                self.pair_min_distance, self.pair_max_distance
            )));
        }
        for (name, value) in [
            ("attractor_radius", self.attractor_radius),
            ("boundary_margin", self.boundary_margin),
            ("boundary_stiffness", self.boundary_stiffness),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must not be negative")));
            }
        }
        Ok(())
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_finite(&[
            ("connection_distance", self.connection_distance),
            ("line_alpha", self.line_alpha),
            ("disc_radius_per_mass", self.disc_radius_per_mass),
            ("accent_speed", self.accent_speed),
        ])?;
        for (name, value) in [
            ("connection_distance", self.connection_distance),
            ("line_alpha", self.line_alpha),
            ("disc_radius_per_mass", self.disc_radius_per_mass),
            ("accent_speed", self.accent_speed),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must not be negative")));
            }
        }
        Ok(())
    }
}

fn ensure_finite(values: &[(&str, f32)]) -> Result<(), ConfigError> {
    match values.iter().find(|(_, v)| !v.is_finite()) {
        Some((name, v)) => Err(ConfigError::Invalid(format!("{name} is not finite ({v})"))),
        None => Ok(()),
    }
}
