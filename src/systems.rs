//! Core controller systems.
//!
//! `sample_movement_intent` runs once per visual frame. The rest run in
//! `FixedUpdate`, chained after the backend's probe systems. They are generic
//! over the physics backend where they touch the body.

use bevy::prelude::*;

use crate::backend::CharacterPhysicsBackend;
use crate::config::ControllerConfig;
use crate::controller::CharacterController;
use crate::detection::ProbeHits;
use crate::events::{ControllerEvent, GroundedChanged, Jumped, WallTouchChanged};
use crate::intent::{JumpEdge, MovementIntent};
use crate::state::{Airborne, Grounded, TouchingWall};

/// Advance each controller's clock and sample its movement intent.
///
/// Jump press/release edges are derived from the held state and applied after
/// the clock advance, so a press is stamped with this frame's time.
pub fn sample_movement_intent(
    time: Res<Time>,
    mut q_controllers: Query<(
        &mut CharacterController,
        &mut MovementIntent,
        &ControllerConfig,
    )>,
) {
    let delta = time.delta_secs();
    for (mut controller, mut intent, config) in &mut q_controllers {
        controller.advance_clock(delta);
        controller.sample_input(intent.move_axis, config);

        match intent.take_jump_edge() {
            Some(JumpEdge::Pressed) => controller.press_jump(),
            Some(JumpEdge::Released) => controller.release_jump(),
            None => {}
        }
    }
}

/// Run one fixed tick of every controller against its probe results and
/// forward the transitions as Bevy events.
pub fn step_controllers(
    time: Res<Time<Fixed>>,
    mut q_controllers: Query<(
        Entity,
        &mut CharacterController,
        &ControllerConfig,
        &ProbeHits,
    )>,
    mut grounded_events: EventWriter<GroundedChanged>,
    mut jumped_events: EventWriter<Jumped>,
    mut wall_events: EventWriter<WallTouchChanged>,
) {
    let dt = time.timestep().as_secs_f32();
    let mut events = Vec::new();

    for (entity, mut controller, config, hits) in &mut q_controllers {
        events.clear();
        controller.fixed_update(config, hits, dt, &mut events);

        for event in events.drain(..) {
            match event {
                ControllerEvent::GroundedChanged {
                    grounded,
                    impact_speed,
                } => {
                    grounded_events.write(GroundedChanged {
                        entity,
                        grounded,
                        impact_speed,
                    });
                }
                ControllerEvent::Jumped => {
                    jumped_events.write(Jumped { entity });
                }
                ControllerEvent::WallTouchChanged(state) => {
                    wall_events.write(WallTouchChanged { entity, state });
                }
            }
        }
    }
}

/// Commit each controller's velocity to its physics body.
pub fn commit_velocity<B: CharacterPhysicsBackend>(world: &mut World) {
    let velocities: Vec<(Entity, Vec2)> = world
        .query::<(Entity, &CharacterController)>()
        .iter(world)
        .map(|(entity, controller)| (entity, controller.velocity()))
        .collect();

    for (entity, velocity) in velocities {
        B::set_velocity(world, entity, velocity);
    }
}

/// Sync state marker components with the controller state.
pub fn sync_state_markers(
    mut commands: Commands,
    q_controllers: Query<(
        Entity,
        &CharacterController,
        Has<Grounded>,
        Has<Airborne>,
        Option<&TouchingWall>,
    )>,
) {
    for (entity, controller, has_grounded, has_airborne, wall) in &q_controllers {
        // Sync Grounded/Airborne
        if controller.is_grounded() && !has_grounded {
            commands.entity(entity).insert(Grounded).remove::<Airborne>();
        } else if !controller.is_grounded() && !has_airborne {
            commands.entity(entity).insert(Airborne).remove::<Grounded>();
        }

        // Sync TouchingWall
        let desired = TouchingWall::from_state(controller.wall_touch());
        if desired.as_ref() != wall {
            match desired {
                Some(marker) => {
                    commands.entity(entity).insert(marker);
                }
                None => {
                    commands.entity(entity).remove::<TouchingWall>();
                }
            }
        }
    }
}
