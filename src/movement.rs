//! Horizontal and vertical velocity integration.

use crate::config::ControllerConfig;
use crate::controller::{CharacterController, Facing};

/// Move `current` toward `target` by at most `max_delta`, never overshooting.
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let difference = target - current;
    if difference.abs() <= max_delta {
        target
    } else {
        current + difference.signum() * max_delta
    }
}

impl CharacterController {
    /// Horizontal integrator.
    ///
    /// With no input, decelerates toward zero (ground or air rate). Otherwise
    /// accelerates toward `input.x * max_speed`. Facing follows input unless
    /// the character is touching a wall.
    pub(crate) fn handle_direction(&mut self, config: &ControllerConfig, dt: f32) {
        let input_x = self.input.move_axis.x;
        if input_x == 0.0 {
            let deceleration = if self.grounded {
                config.ground_deceleration
            } else {
                config.air_deceleration
            };
            self.velocity.x = move_towards(self.velocity.x, 0.0, deceleration * dt);
        } else {
            self.velocity.x = move_towards(
                self.velocity.x,
                input_x * config.max_speed,
                config.acceleration * dt,
            );

            if !self.wall_touch.is_touching() {
                self.facing = if input_x < 0.0 {
                    Facing::Left
                } else {
                    Facing::Right
                };
            }
        }
    }

    /// Vertical integrator.
    ///
    /// Grounded and not rising: snap to the grounding force. Otherwise fall
    /// toward `-max_fall_speed`, with extra gravity while rising after an
    /// early jump release.
    pub(crate) fn handle_gravity(&mut self, config: &ControllerConfig, dt: f32) {
        if self.grounded && self.velocity.y <= 0.0 {
            self.velocity.y = config.grounding_force;
        } else {
            let mut gravity = config.fall_acceleration;
            if self.jump.ended_jump_early && self.velocity.y > 0.0 {
                gravity *= config.jump_end_early_gravity_modifier;
            }
            self.velocity.y = move_towards(self.velocity.y, -config.max_fall_speed, gravity * dt);
        }
    }
}
