//! Jump state machine.
//!
//! Jump eligibility is time-windowed, not counted in ticks, so coyote time and
//! jump buffering behave the same at any tick rate:
//! - **Coyote time**: a jump still executes for `coyote_time` seconds after
//!   walking off a ledge.
//! - **Jump buffer**: a press up to `jump_buffer` seconds before landing
//!   executes on the landing tick.
//!
//! Both are re-armed once per landing and consumed once per executed jump.

use bevy::prelude::*;

use crate::config::ControllerConfig;
use crate::controller::CharacterController;
use crate::events::{ControllerEvent, EventSink};

/// Jump bookkeeping owned by the controller.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct JumpTimers {
    /// One-shot request raised by a press, cleared at the end of every fixed tick.
    pub jump_requested: bool,
    /// Simulation time of the last press. Cleared when a jump executes.
    pub time_jump_was_pressed: Option<f32>,
    /// Whether a buffered press may still execute on landing.
    pub buffered_jump_usable: bool,
    /// Whether coyote time may still be used since the last landing.
    pub coyote_usable: bool,
    /// Whether the jump input was released while rising.
    pub ended_jump_early: bool,
}

impl JumpTimers {
    /// A press is buffered if it happened less than `jump_buffer` seconds ago
    /// and the buffer has not been consumed since the last landing.
    pub fn has_buffered_jump(&self, time: f32, config: &ControllerConfig) -> bool {
        self.buffered_jump_usable
            && self
                .time_jump_was_pressed
                .is_some_and(|pressed| time < pressed + config.jump_buffer)
    }

    /// Coyote time applies while airborne, less than `coyote_time` seconds
    /// after leaving the ground, and only once per landing.
    pub fn can_use_coyote(
        &self,
        grounded: bool,
        frame_left_grounded: f32,
        time: f32,
        config: &ControllerConfig,
    ) -> bool {
        self.coyote_usable && !grounded && time < frame_left_grounded + config.coyote_time
    }
}

/// Observable jump state, derived from the controller on demand.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpPhase {
    /// Grounded with nothing pending.
    Idle,
    /// A fresh or buffered request is waiting to be evaluated.
    Pending,
    /// Airborne and moving up with the jump input held.
    Rising,
    /// Airborne after an early release; extra gravity applies while still rising.
    FallingEarlyRelease,
    /// Airborne and not rising.
    Falling,
}

impl CharacterController {
    /// Jump step, evaluated once per fixed tick after the collision step.
    pub(crate) fn handle_jump(&mut self, config: &ControllerConfig, sink: &mut impl EventSink) {
        if !self.jump.ended_jump_early
            && !self.grounded
            && !self.input.jump_held
            && self.velocity.y > 0.0
        {
            self.jump.ended_jump_early = true;
        }

        let buffered = self.jump.has_buffered_jump(self.time, config);
        if self.jump.jump_requested || buffered {
            let coyote = self.jump.can_use_coyote(
                self.grounded,
                self.frame_left_grounded,
                self.time,
                config,
            );
            if self.grounded || coyote {
                let kind = if !self.jump.jump_requested {
                    "buffered"
                } else if self.grounded {
                    "grounded"
                } else {
                    "coyote"
                };
                self.execute_jump(config, sink);
                debug!("{} jump at t={:.3}", kind, self.time);
            }
        }

        self.jump.jump_requested = false;
    }

    fn execute_jump(&mut self, config: &ControllerConfig, sink: &mut impl EventSink) {
        self.jump.ended_jump_early = false;
        self.jump.time_jump_was_pressed = None;
        self.jump.buffered_jump_usable = false;
        self.jump.coyote_usable = false;
        self.velocity.y = config.jump_power;
        sink.publish(ControllerEvent::Jumped);
    }

    /// Current jump phase.
    pub fn jump_phase(&self, config: &ControllerConfig) -> JumpPhase {
        if self.jump.jump_requested || self.jump.has_buffered_jump(self.time, config) {
            JumpPhase::Pending
        } else if self.grounded {
            JumpPhase::Idle
        } else if self.jump.ended_jump_early {
            JumpPhase::FallingEarlyRelease
        } else if self.velocity.y > 0.0 {
            JumpPhase::Rising
        } else {
            JumpPhase::Falling
        }
    }
}
