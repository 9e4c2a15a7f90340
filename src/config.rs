//! Controller configuration.
//!
//! [`ControllerConfig`] is the immutable tuning record read by the controller
//! every tick. It is validated once when loaded; the per-tick code assumes a
//! valid config and never checks it again.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use ron::Options;
use serde::Deserialize;

/// Horizontal input below this magnitude is treated as zero.
pub const HORIZONTAL_DEADZONE: f32 = 0.1;

/// Vertical input below this magnitude is treated as zero.
pub const VERTICAL_DEADZONE: f32 = 0.3;

/// Tuning parameters for a platformer character.
///
/// All speeds are in world units per second, accelerations in units per
/// second squared and windows in seconds. The defaults match
/// [`ControllerConfig::player`].
#[derive(Component, Reflect, Deserialize, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
#[serde(default)]
pub struct ControllerConfig {
    // === Movement ===
    /// Top horizontal speed.
    pub max_speed: f32,

    /// Horizontal acceleration toward the input target speed.
    pub acceleration: f32,

    /// Deceleration with no horizontal input while grounded.
    pub ground_deceleration: f32,

    /// Deceleration with no horizontal input while airborne.
    pub air_deceleration: f32,

    // === Jump ===
    /// Vertical velocity set when a jump executes.
    pub jump_power: f32,

    /// Terminal fall speed (positive; the controller falls toward `-max_fall_speed`).
    pub max_fall_speed: f32,

    /// Airborne gravity.
    pub fall_acceleration: f32,

    /// Gravity multiplier applied while rising after the jump input was released early.
    pub jump_end_early_gravity_modifier: f32,

    /// Grace window after leaving ground during which a jump still executes.
    pub coyote_time: f32,

    /// Grace window before landing during which a jump press is remembered.
    pub jump_buffer: f32,

    // === Collision ===
    /// Cast distance for the ground and ceiling probes.
    pub grounder_distance: f32,

    /// Snap velocity applied while grounded so the character adheres to slopes.
    pub grounding_force: f32,

    /// Cast distance for the left and right wall probes.
    pub wall_detection_distance: f32,

    /// Collision group filter bits the probes test against.
    pub environment_mask: u32,

    // === Input ===
    pub horizontal_deadzone: f32,
    pub vertical_deadzone: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_speed: 14.0,
            acceleration: 120.0,
            ground_deceleration: 60.0,
            air_deceleration: 30.0,

            jump_power: 36.0,
            max_fall_speed: 40.0,
            fall_acceleration: 110.0,
            jump_end_early_gravity_modifier: 3.0,
            coyote_time: 0.15,
            jump_buffer: 0.2,

            grounder_distance: 0.05,
            grounding_force: -1.5,
            wall_detection_distance: 0.1,
            environment_mask: u32::MAX,

            horizontal_deadzone: HORIZONTAL_DEADZONE,
            vertical_deadzone: VERTICAL_DEADZONE,
        }
    }
}

impl ControllerConfig {
    /// Snappy tuning for a player character.
    pub fn player() -> Self {
        Self::default()
    }

    /// Low-gravity tuning with wider forgiveness windows.
    pub fn floaty() -> Self {
        Self {
            fall_acceleration: 60.0,
            max_fall_speed: 25.0,
            jump_power: 26.0,
            air_deceleration: 15.0,
            coyote_time: 0.2,
            jump_buffer: 0.25,
            ..default()
        }
    }

    /// Builder: set movement parameters.
    pub fn with_movement(mut self, max_speed: f32, acceleration: f32) -> Self {
        self.max_speed = max_speed;
        self.acceleration = acceleration;
        self
    }

    /// Builder: set max speed.
    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed;
        self
    }

    /// Builder: set deceleration with no input, grounded and airborne.
    pub fn with_deceleration(mut self, ground: f32, air: f32) -> Self {
        self.ground_deceleration = ground;
        self.air_deceleration = air;
        self
    }

    /// Builder: set jump power.
    pub fn with_jump_power(mut self, power: f32) -> Self {
        self.jump_power = power;
        self
    }

    /// Builder: set airborne gravity and terminal fall speed.
    pub fn with_gravity(mut self, fall_acceleration: f32, max_fall_speed: f32) -> Self {
        self.fall_acceleration = fall_acceleration;
        self.max_fall_speed = max_fall_speed;
        self
    }

    /// Builder: set the early-release gravity multiplier.
    pub fn with_early_release_modifier(mut self, modifier: f32) -> Self {
        self.jump_end_early_gravity_modifier = modifier;
        self
    }

    /// Builder: set coyote time.
    pub fn with_coyote_time(mut self, time: f32) -> Self {
        self.coyote_time = time;
        self
    }

    /// Builder: set jump buffer window.
    pub fn with_jump_buffer(mut self, time: f32) -> Self {
        self.jump_buffer = time;
        self
    }

    /// Builder: set ground/ceiling and wall probe distances.
    pub fn with_probe_distances(mut self, ground: f32, wall: f32) -> Self {
        self.grounder_distance = ground;
        self.wall_detection_distance = wall;
        self
    }

    /// Builder: set the collision group filter used by the probes.
    pub fn with_environment_mask(mut self, mask: u32) -> Self {
        self.environment_mask = mask;
        self
    }

    /// Builder: set input deadzones.
    pub fn with_deadzones(mut self, horizontal: f32, vertical: f32) -> Self {
        self.horizontal_deadzone = horizontal;
        self.vertical_deadzone = vertical;
        self
    }

    /// Check the config for values the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("max_speed", self.max_speed),
            ("acceleration", self.acceleration),
            ("ground_deceleration", self.ground_deceleration),
            ("air_deceleration", self.air_deceleration),
            ("jump_power", self.jump_power),
            ("max_fall_speed", self.max_fall_speed),
            ("fall_acceleration", self.fall_acceleration),
            (
                "jump_end_early_gravity_modifier",
                self.jump_end_early_gravity_modifier,
            ),
            ("coyote_time", self.coyote_time),
            ("jump_buffer", self.jump_buffer),
            ("grounder_distance", self.grounder_distance),
            ("grounding_force", self.grounding_force),
            ("wall_detection_distance", self.wall_detection_distance),
            ("horizontal_deadzone", self.horizontal_deadzone),
            ("vertical_deadzone", self.vertical_deadzone),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }

        for (field, value) in [
            ("max_speed", self.max_speed),
            ("acceleration", self.acceleration),
            ("ground_deceleration", self.ground_deceleration),
            ("air_deceleration", self.air_deceleration),
            ("jump_power", self.jump_power),
            ("max_fall_speed", self.max_fall_speed),
            ("fall_acceleration", self.fall_acceleration),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        for (field, value) in [
            ("coyote_time", self.coyote_time),
            ("jump_buffer", self.jump_buffer),
            ("grounder_distance", self.grounder_distance),
            ("wall_detection_distance", self.wall_detection_distance),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        if self.jump_end_early_gravity_modifier < 1.0 {
            return Err(ConfigError::OutOfRange {
                field: "jump_end_early_gravity_modifier",
                value: self.jump_end_early_gravity_modifier,
                expected: ">= 1.0",
            });
        }
        if self.grounding_force > 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "grounding_force",
                value: self.grounding_force,
                expected: "<= 0.0",
            });
        }
        for (field, value) in [
            ("horizontal_deadzone", self.horizontal_deadzone),
            ("vertical_deadzone", self.vertical_deadzone),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value,
                    expected: "in [0.0, 1.0)",
                });
            }
        }

        Ok(())
    }

    /// Parse a config from RON text and validate it.
    ///
    /// Fields missing from the text keep their default values.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron_options()
            .from_str(text)
            .map_err(|e| ConfigError::Parse(None, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a RON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_ron_str(&text).map_err(|e| match e {
            ConfigError::Parse(None, message) => {
                ConfigError::Parse(Some(path.to_path_buf()), message)
            }
            other => other,
        })
    }
}

fn ron_options() -> Options {
    Options::default().with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
}

/// Errors produced while loading or validating a [`ControllerConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(Option<PathBuf>, String),
    NotFinite {
        field: &'static str,
        value: f32,
    },
    Negative {
        field: &'static str,
        value: f32,
    },
    NonPositive {
        field: &'static str,
        value: f32,
    },
    OutOfRange {
        field: &'static str,
        value: f32,
        expected: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Failed to read {}: {}", path.display(), e),
            ConfigError::Parse(Some(path), message) => {
                write!(f, "Failed to parse {}: {}", path.display(), message)
            }
            ConfigError::Parse(None, message) => {
                write!(f, "Failed to parse controller config: {}", message)
            }
            ConfigError::NotFinite { field, value } => {
                write!(f, "{} must be finite, got {}", field, value)
            }
            ConfigError::Negative { field, value } => {
                write!(f, "{} must not be negative, got {}", field, value)
            }
            ConfigError::NonPositive { field, value } => {
                write!(f, "{} must be greater than zero, got {}", field, value)
            }
            ConfigError::OutOfRange {
                field,
                value,
                expected,
            } => write!(f, "{} must be {}, got {}", field, expected, value),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            _ => None,
        }
    }
}
