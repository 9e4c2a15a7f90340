//! Movement intent and input sampling.
//!
//! Game code writes raw input into [`MovementIntent`]. Once per visual tick
//! the controller turns it into an [`InputSnapshot`] (deadzones applied) and
//! derives jump press/release edges from the held state.

use bevy::prelude::*;

use crate::config::ControllerConfig;

/// Raw movement input for a character.
///
/// This is just data: you handle input detection in your code (keyboard,
/// gamepad, touch, AI, network) and the controller handles the rest.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use msg_platformer_controller::prelude::*;
///
/// let mut intent = MovementIntent::new();
/// intent.set_move_axis(Vec2::new(-1.0, 0.0));
/// intent.set_jump_pressed(true);
/// assert!(intent.is_moving());
/// assert!(intent.is_jump_pressed());
/// ```
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct MovementIntent {
    /// Move axis, each component in [-1, 1].
    pub move_axis: Vec2,
    /// Whether the jump input is currently held.
    ///
    /// The controller detects `false -> true` (press) and `true -> false`
    /// (release) transitions itself.
    pub jump_pressed: bool,
    /// Held state seen at the previous visual tick, for edge detection.
    pub(crate) jump_pressed_prev: bool,
}

impl MovementIntent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the move axis. Each component is clamped to [-1, 1].
    pub fn set_move_axis(&mut self, axis: Vec2) {
        self.move_axis = axis.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Set only the horizontal component (-1.0 = left, 1.0 = right).
    pub fn set_horizontal(&mut self, direction: f32) {
        self.move_axis.x = direction.clamp(-1.0, 1.0);
    }

    /// Clear the move axis.
    pub fn clear(&mut self) {
        self.move_axis = Vec2::ZERO;
    }

    /// Check if there is any raw horizontal input.
    pub fn is_moving(&self) -> bool {
        self.move_axis.x != 0.0
    }

    /// Set the jump held state. Call this every frame with the current state.
    pub fn set_jump_pressed(&mut self, pressed: bool) {
        self.jump_pressed = pressed;
    }

    pub fn is_jump_pressed(&self) -> bool {
        self.jump_pressed
    }

    /// Consume the held-state transition since the last call.
    pub(crate) fn take_jump_edge(&mut self) -> Option<JumpEdge> {
        let edge = match (self.jump_pressed_prev, self.jump_pressed) {
            (false, true) => Some(JumpEdge::Pressed),
            (true, false) => Some(JumpEdge::Released),
            _ => None,
        };
        self.jump_pressed_prev = self.jump_pressed;
        edge
    }
}

/// A discrete change of the jump input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpEdge {
    Pressed,
    Released,
}

/// Filtered input for one visual tick.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    /// Move axis with deadzones applied.
    pub move_axis: Vec2,
    /// Whether the jump input is held.
    pub jump_held: bool,
}

impl InputSnapshot {
    /// Build a snapshot from a raw axis, zeroing components inside the deadzones.
    pub fn from_raw(raw: Vec2, jump_held: bool, config: &ControllerConfig) -> Self {
        Self {
            move_axis: apply_deadzone(raw, config.horizontal_deadzone, config.vertical_deadzone),
            jump_held,
        }
    }
}

/// Zero each axis whose magnitude is below its deadzone.
pub fn apply_deadzone(raw: Vec2, horizontal: f32, vertical: f32) -> Vec2 {
    let mut axis = raw.clamp(Vec2::NEG_ONE, Vec2::ONE);
    if axis.x.abs() < horizontal {
        axis.x = 0.0;
    }
    if axis.y.abs() < vertical {
        axis.y = 0.0;
    }
    axis
}
