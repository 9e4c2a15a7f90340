//! Rapier2D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier2D.
//! Enable with the `rapier2d` feature.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::backend::CharacterPhysicsBackend;
use crate::config::ControllerConfig;
use crate::controller::CharacterController;
use crate::detection::ProbeHits;

/// Rapier2D physics backend for the platformer controller.
///
/// The controller's velocity is written into `Velocity::linvel` each fixed
/// tick. Environment probes are shape casts of the character's own collider,
/// run by a dedicated system that receives the Rapier context as a system
/// parameter.
pub struct Rapier2dBackend;

impl CharacterPhysicsBackend for Rapier2dBackend {
    type VelocityComponent = Velocity;

    fn plugin() -> impl Plugin {
        Rapier2dBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec2::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }
}

/// Plugin that sets up Rapier2D-specific systems for the controller.
pub struct Rapier2dBackendPlugin;

impl Plugin for Rapier2dBackendPlugin {
    fn build(&self, app: &mut App) {
        use crate::PlatformerControllerSet;

        app.add_systems(
            FixedUpdate,
            rapier_environment_probe.in_set(PlatformerControllerSet::Sensors),
        );
    }
}

/// Cast `collider` from `origin` along `direction` for `distance`.
///
/// Geometry the shape already overlaps at the start of the cast is not
/// reported unless the cast moves further into it.
fn rapier_shapecast(
    context: &RapierContext,
    collider: &Collider,
    origin: Vec2,
    rotation: f32,
    direction: Vec2,
    distance: f32,
    filter: QueryFilter,
) -> bool {
    context
        .cast_shape(
            origin,
            rotation,
            direction,
            collider,
            ShapeCastOptions {
                max_time_of_impact: distance,
                stop_at_penetration: false,
                ..default()
            },
            filter,
        )
        .is_some()
}

/// Build the probe filter: skip the character itself and sensors, and only
/// test colliders in the configured environment groups.
fn probe_filter(
    entity: Entity,
    config: &ControllerConfig,
    collision_groups: Option<&CollisionGroups>,
) -> QueryFilter<'static> {
    let memberships = collision_groups
        .map(|cg| cg.memberships)
        .unwrap_or(Group::ALL);
    let filters = Group::from_bits_truncate(config.environment_mask);

    QueryFilter::default()
        .exclude_rigid_body(entity)
        .exclude_collider(entity)
        .exclude_sensors()
        .groups(CollisionGroups::new(memberships, filters))
}

/// Rapier-specific environment probe system.
///
/// Casts the character's collider down, up, left and right. Ground and
/// ceiling use `grounder_distance`, walls use `wall_detection_distance`.
/// Characters without a collider, or with a non-finite transform, get no hits.
pub fn rapier_environment_probe(
    rapier_context: ReadRapierContext,
    mut q_controllers: Query<
        (
            Entity,
            &GlobalTransform,
            &ControllerConfig,
            &mut ProbeHits,
            Option<&Collider>,
            Option<&CollisionGroups>,
        ),
        With<CharacterController>,
    >,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, transform, config, mut hits, collider, collision_groups) in &mut q_controllers {
        let Some(collider) = collider else {
            *hits = ProbeHits::none();
            continue;
        };

        let (_, rotation, translation) = transform.to_scale_rotation_translation();
        let origin = translation.xy();
        if !origin.is_finite() {
            warn!("skipping environment probe for {:?}: non-finite position", entity);
            *hits = ProbeHits::none();
            continue;
        }
        let (_, _, angle) = rotation.to_euler(EulerRot::XYZ);

        let filter = probe_filter(entity, config, collision_groups);
        let cast = |direction: Vec2, distance: f32| {
            rapier_shapecast(&context, collider, origin, angle, direction, distance, filter)
        };

        *hits = ProbeHits {
            ground: cast(Vec2::NEG_Y, config.grounder_distance),
            ceiling: cast(Vec2::Y, config.grounder_distance),
            left_wall: cast(Vec2::NEG_X, config.wall_detection_distance),
            right_wall: cast(Vec2::X, config.wall_detection_distance),
        };
    }
}

/// Bundle for creating a platformer character with Rapier2D physics.
///
/// The body is dynamic so Rapier resolves penetration, but the controller
/// owns its velocity: gravity scale is zero, rotation is locked, damping and
/// friction are zero and the body never sleeps.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use msg_platformer_controller::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn((
///         Transform::from_xyz(0.0, 2.0, 0.0),
///         CharacterController::new(),
///         ControllerConfig::player(),
///         Rapier2dCharacterBundle::new(),
///         Collider::capsule_y(0.5, 0.4),
///     ));
/// }
/// ```
#[derive(Bundle)]
pub struct Rapier2dCharacterBundle {
    /// The rigid body type. [`RigidBody::Dynamic`] by default.
    pub rigid_body: RigidBody,
    /// Linear velocity, overwritten by the controller every fixed tick.
    pub velocity: Velocity,
    /// Zero: the controller applies its own gravity.
    pub gravity_scale: GravityScale,
    /// Rotation locked so the character stays upright.
    pub locked_axes: LockedAxes,
    pub damping: Damping,
    /// Zero friction so the character does not stick to walls.
    pub friction: Friction,
    pub sleeping: Sleeping,
}

impl Default for Rapier2dCharacterBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier2dCharacterBundle {
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            gravity_scale: GravityScale(0.0),
            locked_axes: LockedAxes::ROTATION_LOCKED,
            damping: Damping {
                linear_damping: 0.0,
                angular_damping: 0.0,
            },
            friction: Friction {
                coefficient: 0.0,
                combine_rule: CoefficientCombineRule::Min,
            },
            sleeping: Sleeping::disabled(),
        }
    }

    /// Set the rigid body type for the character.
    ///
    /// [`RigidBody::KinematicVelocityBased`] moves the body by velocity
    /// without collision response; useful for scripted characters.
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }

    /// Set the friction coefficient against the environment.
    pub fn with_friction(mut self, coefficient: f32) -> Self {
        self.friction.coefficient = coefficient;
        self
    }
}
