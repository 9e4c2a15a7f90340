//! Physics backend abstraction.
//!
//! The controller computes a velocity; a backend commits it to a physical
//! body and fills [`ProbeHits`](crate::detection::ProbeHits) from its own
//! geometry queries. This allows swapping physics engines (Rapier2D, a custom
//! tile collider, a headless test double).

use bevy::prelude::*;

/// Trait for physics backend implementations.
///
/// The plugin returned by [`plugin`](CharacterPhysicsBackend::plugin) is
/// expected to add its probe systems to
/// [`PlatformerControllerSet::Sensors`](crate::PlatformerControllerSet::Sensors)
/// so they run before the controller step of the same fixed tick.
///
/// For an example implementation, see the `rapier` module's `Rapier2dBackend`.
pub trait CharacterPhysicsBackend: 'static + Send + Sync {
    /// The velocity component type used by this backend.
    type VelocityComponent: Component;

    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Get the current velocity of an entity's body.
    fn get_velocity(world: &World, entity: Entity) -> Vec2;

    /// Commit a velocity to an entity's body.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2);

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.timestep().as_secs_f32())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 64.0)
    }
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}
