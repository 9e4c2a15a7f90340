//! Environment probing and the collision step.
//!
//! Each fixed tick the controller asks an [`EnvironmentProbe`] four yes/no
//! questions (ground, ceiling, left wall, right wall) and reduces the answers
//! to velocity clamps and ground/wall transitions.

use bevy::prelude::*;

use crate::controller::{CharacterController, Facing};
use crate::events::{ControllerEvent, EventSink};

/// Capability interface over the geometry query service.
///
/// Each method answers whether a cast of the character's own shape, moved a
/// small distance in that direction, hits the environment. Geometry the
/// character already overlaps at the start of the cast must not count as a
/// hit, and a query that cannot be executed answers `false`.
pub trait EnvironmentProbe {
    fn ground(&self) -> bool;
    fn ceiling(&self) -> bool;
    fn left_wall(&self) -> bool;
    fn right_wall(&self) -> bool;
}

/// The four probe answers for one fixed tick.
///
/// Physics backends write this component before the controller step. It also
/// serves as a deterministic probe in tests.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[reflect(Component)]
pub struct ProbeHits {
    pub ground: bool,
    pub ceiling: bool,
    pub left_wall: bool,
    pub right_wall: bool,
}

impl ProbeHits {
    /// No contact in any direction.
    pub fn none() -> Self {
        Self::default()
    }

    /// Standing on ground, nothing else.
    pub fn grounded() -> Self {
        Self {
            ground: true,
            ..default()
        }
    }

    /// Builder: set the ground hit.
    pub fn with_ground(mut self, hit: bool) -> Self {
        self.ground = hit;
        self
    }

    /// Builder: set the ceiling hit.
    pub fn with_ceiling(mut self, hit: bool) -> Self {
        self.ceiling = hit;
        self
    }

    /// Builder: set both wall hits.
    pub fn with_walls(mut self, left: bool, right: bool) -> Self {
        self.left_wall = left;
        self.right_wall = right;
        self
    }

    /// Copy the answers of any probe.
    pub fn sample(probe: &impl EnvironmentProbe) -> Self {
        Self {
            ground: probe.ground(),
            ceiling: probe.ceiling(),
            left_wall: probe.left_wall(),
            right_wall: probe.right_wall(),
        }
    }
}

impl EnvironmentProbe for ProbeHits {
    fn ground(&self) -> bool {
        self.ground
    }

    fn ceiling(&self) -> bool {
        self.ceiling
    }

    fn left_wall(&self) -> bool {
        self.left_wall
    }

    fn right_wall(&self) -> bool {
        self.right_wall
    }
}

/// Which side, if any, the character is touching a wall on.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WallTouchState {
    #[default]
    None,
    Left,
    Right,
}

impl WallTouchState {
    pub fn is_touching(&self) -> bool {
        !matches!(self, WallTouchState::None)
    }
}

/// Reduce the two wall hits to a single side.
///
/// When both sides hit (narrow corridor), non-zero horizontal input decides;
/// with no input the current facing decides.
pub fn resolve_wall_touch(left: bool, right: bool, input_x: f32, facing: Facing) -> WallTouchState {
    match (left, right) {
        (false, false) => WallTouchState::None,
        (true, false) => WallTouchState::Left,
        (false, true) => WallTouchState::Right,
        (true, true) => {
            if input_x < 0.0 {
                WallTouchState::Left
            } else if input_x > 0.0 {
                WallTouchState::Right
            } else {
                match facing {
                    Facing::Left => WallTouchState::Left,
                    Facing::Right => WallTouchState::Right,
                }
            }
        }
    }
}

impl CharacterController {
    /// Collision step: clamp velocity against contacts, then update ground
    /// and wall state, publishing only actual transitions.
    pub(crate) fn check_collisions(
        &mut self,
        probe: &impl EnvironmentProbe,
        sink: &mut impl EventSink,
    ) {
        let hits = ProbeHits::sample(probe);
        trace!(
            "probe: ground={} ceiling={} left={} right={}",
            hits.ground,
            hits.ceiling,
            hits.left_wall,
            hits.right_wall
        );

        if hits.ceiling {
            self.velocity.y = self.velocity.y.min(0.0);
        }
        if hits.left_wall {
            self.velocity.x = self.velocity.x.max(0.0);
        }
        if hits.right_wall {
            self.velocity.x = self.velocity.x.min(0.0);
        }

        if !self.grounded && hits.ground {
            let impact_speed = self.velocity.y.abs();
            self.grounded = true;
            self.jump.coyote_usable = true;
            self.jump.buffered_jump_usable = true;
            self.jump.ended_jump_early = false;
            debug!("landed at t={:.3}, impact speed {:.2}", self.time, impact_speed);
            sink.publish(ControllerEvent::GroundedChanged {
                grounded: true,
                impact_speed,
            });
        } else if self.grounded && !hits.ground {
            self.grounded = false;
            self.frame_left_grounded = self.time;
            debug!("left ground at t={:.3}", self.time);
            sink.publish(ControllerEvent::GroundedChanged {
                grounded: false,
                impact_speed: 0.0,
            });
        }

        let wall_touch = resolve_wall_touch(
            hits.left_wall,
            hits.right_wall,
            self.input.move_axis.x,
            self.facing,
        );
        if wall_touch != self.wall_touch {
            self.wall_touch = wall_touch;
            debug!("wall touch changed to {:?}", wall_touch);
            sink.publish(ControllerEvent::WallTouchChanged(wall_touch));
        }
    }
}
