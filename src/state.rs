//! State marker components.
//!
//! These components mirror the controller's discrete state so other systems
//! (animation, audio) can filter on it in queries. They are added and removed
//! automatically after each fixed tick; never insert them yourself.

use bevy::prelude::*;

use crate::detection::WallTouchState;

/// Marker component indicating the character is grounded.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use msg_platformer_controller::prelude::*;
///
/// // Grounded is a marker component - just use it in queries
/// fn check_grounded(grounded: Option<&Grounded>) -> bool {
///     grounded.is_some()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the character is airborne.
///
/// Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Wall side the character is currently touching.
///
/// Present only while the resolved wall-touch state is not `None`.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Eq)]
#[reflect(Component)]
pub struct TouchingWall {
    pub side: WallSide,
}

/// A wall side.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WallSide {
    Left,
    Right,
}

impl TouchingWall {
    /// Marker for a wall-touch state, `None` when not touching.
    pub fn from_state(state: WallTouchState) -> Option<Self> {
        match state {
            WallTouchState::None => None,
            WallTouchState::Left => Some(Self {
                side: WallSide::Left,
            }),
            WallTouchState::Right => Some(Self {
                side: WallSide::Right,
            }),
        }
    }

    pub fn is_left(&self) -> bool {
        self.side == WallSide::Left
    }

    pub fn is_right(&self) -> bool {
        self.side == WallSide::Right
    }
}
