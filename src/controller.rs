//! The character controller component.
//!
//! [`CharacterController`] owns all mutable per-character state and runs the
//! fixed-tick pipeline in a fixed order:
//!
//! 1. Collision step: clamp the previous tick's velocity against contacts and
//!    update ground/wall state.
//! 2. Jump state machine: may override vertical velocity.
//! 3. Horizontal integrator.
//! 4. Vertical integrator.
//!
//! The result is returned as a single velocity; nothing partial is observable
//! from outside.
//!
//! The controller does not read any global clock. The caller advances
//! [`CharacterController::advance_clock`] once per visual frame and passes the
//! fixed timestep into [`CharacterController::fixed_update`], so runs are
//! reproducible at any tick rate.
//!
//! # Example
//!
//! ```rust
//! use bevy::prelude::*;
//! use msg_platformer_controller::prelude::*;
//!
//! let config = ControllerConfig::default();
//! let mut controller = CharacterController::new();
//! let mut events = Vec::new();
//!
//! // Land on the ground.
//! controller.fixed_update(&config, &ProbeHits::grounded(), 1.0 / 50.0, &mut events);
//! assert!(controller.is_grounded());
//!
//! // Press jump: the jump executes on the next fixed tick.
//! controller.advance_clock(1.0 / 60.0);
//! controller.press_jump();
//! controller.fixed_update(&config, &ProbeHits::grounded(), 1.0 / 50.0, &mut events);
//! assert!(events.contains(&ControllerEvent::Jumped));
//! assert!(controller.velocity().y > 0.0);
//! ```

use bevy::prelude::*;

use crate::config::ControllerConfig;
use crate::detection::{EnvironmentProbe, ProbeHits, WallTouchState};
use crate::events::EventSink;
use crate::intent::{InputSnapshot, MovementIntent};
use crate::jump::JumpTimers;

/// Which way the character faces.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// -1.0 for left, 1.0 for right.
    pub fn sign(&self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// Per-character controller state.
///
/// One instance per character, created at spawn and mutated only by the
/// controller itself.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
#[require(ControllerConfig, MovementIntent, ProbeHits)]
pub struct CharacterController {
    /// Authoritative velocity, combining horizontal and vertical motion.
    pub(crate) velocity: Vec2,
    /// Simulation clock in seconds. Advanced once per visual frame, never reset.
    pub(crate) time: f32,
    pub(crate) grounded: bool,
    /// Clock value when ground contact was last lost. Meaningful only while airborne.
    pub(crate) frame_left_grounded: f32,
    pub(crate) wall_touch: WallTouchState,
    pub(crate) facing: Facing,
    pub(crate) input: InputSnapshot,
    pub(crate) jump: JumpTimers,
}

impl Default for CharacterController {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            time: 0.0,
            grounded: false,
            frame_left_grounded: f32::MIN,
            wall_touch: WallTouchState::None,
            facing: Facing::Right,
            input: InputSnapshot::default(),
            jump: JumpTimers::default(),
        }
    }
}

impl CharacterController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Builder: set the initial facing.
    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    // === Visual tick ===

    /// Advance the simulation clock by one visual frame.
    pub fn advance_clock(&mut self, delta: f32) {
        if delta > 0.0 {
            self.time += delta;
        }
    }

    /// Replace the input snapshot with a deadzone-filtered raw axis.
    pub fn sample_input(&mut self, raw_axis: Vec2, config: &ControllerConfig) -> InputSnapshot {
        self.input = InputSnapshot::from_raw(raw_axis, self.input.jump_held, config);
        self.input
    }

    /// Jump press edge: raise a one-shot request and stamp the press time.
    pub fn press_jump(&mut self) {
        self.input.jump_held = true;
        self.jump.jump_requested = true;
        self.jump.time_jump_was_pressed = Some(self.time);
    }

    /// Jump release edge: rising while airborne cuts the jump short.
    pub fn release_jump(&mut self) {
        self.input.jump_held = false;
        if !self.grounded && self.velocity.y > 0.0 {
            self.jump.ended_jump_early = true;
        }
    }

    // === Fixed tick ===

    /// Run one fixed physics tick and return the velocity to commit.
    pub fn fixed_update(
        &mut self,
        config: &ControllerConfig,
        probe: &impl EnvironmentProbe,
        dt: f32,
        sink: &mut impl EventSink,
    ) -> Vec2 {
        self.check_collisions(probe, sink);
        self.handle_jump(config, sink);
        self.handle_direction(config, dt);
        self.handle_gravity(config, dt);
        self.velocity
    }

    // === Polled state ===

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Overwrite the velocity, e.g. for knockback or respawn.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    pub fn simulation_time(&self) -> f32 {
        self.time
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Clock value when the ground was last left, if currently airborne.
    pub fn time_left_ground(&self) -> Option<f32> {
        (!self.grounded && self.frame_left_grounded > f32::MIN).then_some(self.frame_left_grounded)
    }

    pub fn wall_touch(&self) -> WallTouchState {
        self.wall_touch
    }

    /// -1.0 facing left, 1.0 facing right.
    pub fn facing_sign(&self) -> f32 {
        self.facing.sign()
    }

    /// The deadzone-filtered input of the current visual frame.
    pub fn input(&self) -> InputSnapshot {
        self.input
    }

    /// The deadzone-filtered move axis of the current visual frame.
    pub fn move_input(&self) -> Vec2 {
        self.input.move_axis
    }

    pub fn jump_timers(&self) -> &JumpTimers {
        &self.jump
    }
}
