//! # `msg_platformer_controller`
//!
//! A deterministic, fixed-timestep kinematic character controller for 2D
//! platformers, with physics backend abstraction.
//!
//! This crate turns raw directional/jump input into a velocity and:
//! - Probes the environment with four directional shape casts per tick
//! - Forgives input timing with coyote time and jump buffering
//! - Shortens the jump arc when the jump input is released early
//! - Accelerates and decelerates horizontally with asymmetric rates
//! - Publishes grounded, jumped and wall-touch transitions
//! - Abstracts the physics backend (Rapier2D included)
//!
//! ## Architecture
//!
//! Two tick rates drive each character:
//! 1. Every visual frame (`Update`) the simulation clock advances and input
//!    is sampled: deadzones are applied and jump press/release edges recorded.
//! 2. Every fixed tick (`FixedUpdate`) the backend probes the environment,
//!    then the controller runs collision → jump → horizontal → vertical and
//!    the resulting velocity is committed to the body.
//!
//! All timers compare against the controller's own clock, never a global
//! one, so the core can also be driven directly without Bevy's scheduler
//! (see [`CharacterController`](controller::CharacterController)).
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use msg_platformer_controller::prelude::*;
//!
//! // Components for a player character. `CharacterController` pulls in
//! // `ControllerConfig`, `MovementIntent` and `ProbeHits` when spawned.
//! let controller = CharacterController::new();
//! let config = ControllerConfig::player();
//! let intent = MovementIntent::default();
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod config;
pub mod controller;
pub mod detection;
pub mod events;
pub mod intent;
pub mod jump;
pub mod movement;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier2d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::CharacterPhysicsBackend;
    pub use crate::config::{ConfigError, ControllerConfig};
    pub use crate::controller::{CharacterController, Facing};
    pub use crate::detection::{EnvironmentProbe, ProbeHits, WallTouchState};
    pub use crate::events::{
        ControllerEvent, ControllerListener, EventSink, FnListener, GroundedChanged, Jumped,
        ListenerId, StatePublisher, WallTouchChanged,
    };
    pub use crate::intent::{InputSnapshot, MovementIntent};
    pub use crate::jump::{JumpPhase, JumpTimers};
    pub use crate::state::{Airborne, Grounded, TouchingWall, WallSide};
    pub use crate::{PlatformerControllerPlugin, PlatformerControllerSet};

    #[cfg(feature = "rapier2d")]
    pub use crate::rapier::{Rapier2dBackend, Rapier2dCharacterBundle};
}

/// System sets for ordering against the controller.
///
/// `Input` runs in `Update`. The others run in `FixedUpdate`, in this order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformerControllerSet {
    /// Clock advance and input sampling (visual frame).
    Input,
    /// Backend probe systems fill `ProbeHits`.
    Sensors,
    /// Controller pipeline and event publishing.
    Simulation,
    /// Velocity committed to the physics body.
    Commit,
    /// State marker components synced.
    Sync,
}

/// Main plugin for the platformer controller.
///
/// Generic over a physics backend `B` which commits velocities and provides
/// environment probes.
///
/// # Examples
///
/// With Rapier2D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use msg_platformer_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(PlatformerControllerPlugin::<Rapier2dBackend>::default())
///     .run();
/// ```
pub struct PlatformerControllerPlugin<B: backend::CharacterPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::CharacterPhysicsBackend> Default for PlatformerControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::CharacterPhysicsBackend> Plugin for PlatformerControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::ControllerConfig>();
        app.register_type::<controller::CharacterController>();
        app.register_type::<intent::MovementIntent>();
        app.register_type::<detection::ProbeHits>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::TouchingWall>();

        app.add_event::<events::GroundedChanged>();
        app.add_event::<events::Jumped>();
        app.add_event::<events::WallTouchChanged>();

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.add_systems(
            Update,
            systems::sample_movement_intent.in_set(PlatformerControllerSet::Input),
        );

        app.configure_sets(
            FixedUpdate,
            (
                PlatformerControllerSet::Sensors,
                PlatformerControllerSet::Simulation,
                PlatformerControllerSet::Commit,
                PlatformerControllerSet::Sync,
            )
                .chain(),
        );

        app.add_systems(
            FixedUpdate,
            (
                systems::step_controllers.in_set(PlatformerControllerSet::Simulation),
                systems::commit_velocity::<B>.in_set(PlatformerControllerSet::Commit),
                systems::sync_state_markers.in_set(PlatformerControllerSet::Sync),
            ),
        );
    }
}
