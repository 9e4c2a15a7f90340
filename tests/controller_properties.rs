//! Behavioral properties of the controller, driven directly with an explicit
//! clock and scripted probe results. No Bevy scheduling is involved.

use bevy::prelude::*;
use msg_platformer_controller::prelude::*;

const DT: f32 = 1.0 / 50.0;
const EPS: f32 = 0.01;

/// A controller with its config and a collected event log.
struct Rig {
    controller: CharacterController,
    config: ControllerConfig,
    events: Vec<ControllerEvent>,
    height: f32,
}

impl Rig {
    fn new(config: ControllerConfig) -> Self {
        Self {
            controller: CharacterController::new(),
            config,
            events: Vec::new(),
            height: 0.0,
        }
    }

    /// Rig standing on the ground with its landing event discarded.
    fn grounded() -> Self {
        let mut rig = Self::new(ControllerConfig::default());
        rig.tick(ProbeHits::grounded());
        rig.events.clear();
        rig
    }

    /// One visual frame followed by one fixed tick.
    fn frame(&mut self, axis: Vec2, hits: ProbeHits) -> Vec2 {
        self.controller.advance_clock(DT);
        self.controller.sample_input(axis, &self.config);
        self.tick(hits)
    }

    fn tick(&mut self, hits: ProbeHits) -> Vec2 {
        let velocity = self
            .controller
            .fixed_update(&self.config, &hits, DT, &mut self.events);
        // Grounding force does not move the character into the floor.
        if !self.controller.is_grounded() || velocity.y > 0.0 {
            self.height += velocity.y * DT;
        }
        velocity
    }

    fn jumps(&self) -> usize {
        self.events
            .iter()
            .filter(|e| **e == ControllerEvent::Jumped)
            .count()
    }
}

// ==================== Idempotence ====================

#[test]
fn unchanged_contacts_publish_nothing_more() {
    let mut rig = Rig::new(ControllerConfig::default());
    let hits = ProbeHits::grounded().with_walls(true, false);

    rig.tick(hits);
    let first = rig.events.len();
    assert_eq!(first, 2, "landing and wall touch: {:?}", rig.events);

    for _ in 0..10 {
        rig.tick(hits);
    }
    assert_eq!(rig.events.len(), first, "events: {:?}", rig.events);
}

// ==================== Buffer window ====================

fn buffered_press_then_land_after(delay: f32) -> Rig {
    let mut rig = Rig::new(ControllerConfig::default());
    rig.controller.set_velocity(Vec2::new(0.0, -10.0));
    rig.controller.advance_clock(1.0);

    // Press in the air: no ground, no coyote. The request is dropped but the
    // press time is remembered.
    rig.controller.press_jump();
    rig.tick(ProbeHits::none());
    assert_eq!(rig.jumps(), 0);

    rig.controller.advance_clock(delay);
    rig.tick(ProbeHits::grounded());
    rig
}

#[test]
fn press_just_inside_buffer_jumps_on_landing() {
    let config = ControllerConfig::default();
    let rig = buffered_press_then_land_after(config.jump_buffer - EPS);

    assert_eq!(rig.jumps(), 1, "events: {:?}", rig.events);
    assert!(rig.controller.velocity().y > 0.0);
    assert!(matches!(
        rig.events[0],
        ControllerEvent::GroundedChanged { grounded: true, impact_speed } if impact_speed > 10.0
    ));
}

#[test]
fn press_just_outside_buffer_does_not_jump() {
    let config = ControllerConfig::default();
    let rig = buffered_press_then_land_after(config.jump_buffer + EPS);

    assert_eq!(rig.jumps(), 0, "events: {:?}", rig.events);
    assert!(rig.controller.is_grounded());
    assert_eq!(rig.controller.velocity().y, config.grounding_force);
}

#[test]
fn buffered_jump_is_consumed_once() {
    let config = ControllerConfig::default();
    let mut rig = buffered_press_then_land_after(config.jump_buffer - EPS);
    assert_eq!(rig.jumps(), 1);

    // Fall back down within the first press's buffer window: no second jump.
    rig.controller.set_velocity(Vec2::new(0.0, -1.0));
    rig.tick(ProbeHits::none());
    rig.tick(ProbeHits::grounded());
    assert_eq!(rig.jumps(), 1, "events: {:?}", rig.events);
}

// ==================== Coyote window ====================

fn walk_off_then_press_after(delay: f32) -> Rig {
    let mut rig = Rig::grounded();
    rig.controller.advance_clock(1.0);
    rig.tick(ProbeHits::none());
    assert_eq!(rig.controller.time_left_ground(), Some(1.0));

    rig.controller.advance_clock(delay);
    rig.controller.press_jump();
    rig.tick(ProbeHits::none());
    rig
}

#[test]
fn press_just_inside_coyote_jumps() {
    let config = ControllerConfig::default();
    let rig = walk_off_then_press_after(config.coyote_time - EPS);

    assert_eq!(rig.jumps(), 1, "events: {:?}", rig.events);
    assert!(rig.controller.velocity().y > 0.0);
    assert!(!rig.controller.jump_timers().coyote_usable);
}

#[test]
fn press_just_outside_coyote_free_falls() {
    let config = ControllerConfig::default();
    let rig = walk_off_then_press_after(config.coyote_time + EPS);

    assert_eq!(rig.jumps(), 0, "events: {:?}", rig.events);
    assert!(rig.controller.velocity().y < 0.0);
}

#[test]
fn coyote_is_usable_once_per_landing() {
    let config = ControllerConfig::default();
    let mut rig = walk_off_then_press_after(config.coyote_time / 2.0);
    assert_eq!(rig.jumps(), 1);

    rig.controller.press_jump();
    rig.tick(ProbeHits::none());
    assert_eq!(rig.jumps(), 1, "no double jump from coyote time");
}

// ==================== Early release ====================

fn jump_apex(release_after_frames: Option<usize>) -> f32 {
    let mut rig = Rig::grounded();
    rig.controller.press_jump();
    rig.frame(Vec2::ZERO, ProbeHits::grounded());
    assert_eq!(rig.jumps(), 1);

    let mut apex = rig.height;
    for frame in 0..200 {
        if release_after_frames == Some(frame) {
            rig.controller.release_jump();
        }
        let velocity = rig.frame(Vec2::ZERO, ProbeHits::none());
        apex = apex.max(rig.height);
        if velocity.y <= 0.0 {
            break;
        }
    }
    apex
}

#[test]
fn early_release_lowers_apex() {
    let held = jump_apex(None);
    let released = jump_apex(Some(3));
    assert!(
        released < held,
        "released apex {} must be below held apex {}",
        released,
        held
    );
}

#[test]
fn release_while_falling_changes_nothing() {
    let config = ControllerConfig::default();
    let mut rig = Rig::new(config);
    rig.controller.set_velocity(Vec2::new(0.0, -3.0));
    rig.controller.release_jump();
    rig.tick(ProbeHits::none());

    assert!(!rig.controller.jump_timers().ended_jump_early);
    assert!((rig.controller.velocity().y - (-3.0 - config.fall_acceleration * DT)).abs() < 1e-4);
}

#[test]
fn landing_clears_early_release() {
    let mut rig = Rig::grounded();
    rig.controller.press_jump();
    rig.frame(Vec2::ZERO, ProbeHits::grounded());
    rig.controller.release_jump();
    rig.frame(Vec2::ZERO, ProbeHits::none());
    assert!(rig.controller.jump_timers().ended_jump_early);

    rig.frame(Vec2::ZERO, ProbeHits::grounded());
    assert!(!rig.controller.jump_timers().ended_jump_early);
}

// ==================== Wall tie-break ====================

fn pinched_with_input(input_x: f32, facing: Facing) -> WallTouchState {
    let mut rig = Rig::new(ControllerConfig::default());
    rig.controller = CharacterController::new().with_facing(facing);
    rig.frame(Vec2::new(input_x, 0.0), ProbeHits::none().with_walls(true, true));
    rig.controller.wall_touch()
}

#[test]
fn pinch_resolves_by_input_then_facing() {
    assert_eq!(pinched_with_input(-1.0, Facing::Right), WallTouchState::Left);
    assert_eq!(pinched_with_input(1.0, Facing::Left), WallTouchState::Right);
    assert_eq!(pinched_with_input(0.0, Facing::Left), WallTouchState::Left);
    assert_eq!(pinched_with_input(0.0, Facing::Right), WallTouchState::Right);
}

#[test]
fn input_inside_deadzone_falls_back_to_facing() {
    assert_eq!(pinched_with_input(-0.05, Facing::Right), WallTouchState::Right);
}

#[test]
fn facing_is_frozen_while_touching_a_wall() {
    let mut rig = Rig::grounded();
    let hits = ProbeHits::grounded().with_walls(false, true);
    rig.frame(Vec2::X, hits);
    assert_eq!(rig.controller.facing(), Facing::Right);

    rig.frame(Vec2::NEG_X, hits);
    assert_eq!(rig.controller.facing(), Facing::Right);

    rig.frame(Vec2::NEG_X, ProbeHits::grounded());
    assert_eq!(rig.controller.facing(), Facing::Left);
}

// ==================== Monotonic clamp ====================

#[test]
fn horizontal_speed_never_exceeds_max() {
    let config = ControllerConfig::default();
    for direction in [Vec2::X, Vec2::NEG_X] {
        let mut rig = Rig::grounded();
        for _ in 0..120 {
            let velocity = rig.frame(direction, ProbeHits::grounded());
            assert!(
                velocity.x.abs() <= config.max_speed,
                "speed {} exceeds {}",
                velocity.x,
                config.max_speed
            );
        }
        assert_eq!(rig.controller.velocity().x, direction.x * config.max_speed);
    }
}

#[test]
fn fall_speed_is_capped() {
    let config = ControllerConfig::default();
    let mut rig = Rig::new(config);
    for _ in 0..200 {
        let velocity = rig.frame(Vec2::ZERO, ProbeHits::none());
        assert!(velocity.y >= -config.max_fall_speed);
    }
    assert_eq!(rig.controller.velocity().y, -config.max_fall_speed);
}

// ==================== End-to-end scenarios ====================

#[test]
fn grounded_press_jumps_in_the_same_tick() {
    let config = ControllerConfig::default();
    let mut rig = Rig::grounded();
    assert_eq!(rig.controller.velocity(), Vec2::new(0.0, config.grounding_force));
    rig.controller.set_velocity(Vec2::ZERO);

    rig.controller.press_jump();
    let velocity = rig.tick(ProbeHits::grounded());

    assert_eq!(rig.events, vec![ControllerEvent::Jumped]);
    // Gravity integrates after the jump within the tick.
    assert!((velocity.y - (config.jump_power - config.fall_acceleration * DT)).abs() < 1e-4);
    assert!(!rig.controller.jump_timers().buffered_jump_usable);
    assert!(!rig.controller.jump_timers().coyote_usable);
}

#[test]
fn late_press_after_walking_off_free_falls() {
    let config = ControllerConfig::default();
    let mut rig = Rig::grounded();

    rig.frame(Vec2::ZERO, ProbeHits::none());
    let frames = (config.coyote_time / DT).ceil() as usize + 1;
    for _ in 0..frames {
        rig.frame(Vec2::ZERO, ProbeHits::none());
    }

    rig.controller.press_jump();
    let mut last = rig.frame(Vec2::ZERO, ProbeHits::none()).y;
    for _ in 0..10 {
        let vy = rig.frame(Vec2::ZERO, ProbeHits::none()).y;
        assert!(vy <= last, "free fall must keep accelerating down");
        last = vy;
    }
    assert_eq!(rig.jumps(), 0);
}

#[test]
fn run_jump_and_land_publishes_in_order() {
    let mut rig = Rig::grounded();
    for _ in 0..10 {
        rig.frame(Vec2::X, ProbeHits::grounded());
    }

    rig.controller.press_jump();
    rig.frame(Vec2::X, ProbeHits::grounded());
    for _ in 0..200 {
        rig.frame(Vec2::X, ProbeHits::none());
        if rig.height <= 0.0 {
            break;
        }
    }
    rig.frame(Vec2::X, ProbeHits::grounded());

    let kinds: Vec<_> = rig
        .events
        .iter()
        .map(|e| match e {
            ControllerEvent::GroundedChanged { grounded, .. } => {
                if *grounded {
                    "landed"
                } else {
                    "left"
                }
            }
            ControllerEvent::Jumped => "jumped",
            ControllerEvent::WallTouchChanged(_) => "wall",
        })
        .collect();
    assert_eq!(kinds, vec!["jumped", "left", "landed"]);
    assert!(rig.controller.velocity().x > 0.0);
}

#[test]
fn publisher_delivers_to_attached_listeners() {
    use std::sync::{Arc, Mutex};

    let config = ControllerConfig::default();
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut publisher = StatePublisher::new();
    let sink = log.clone();
    let id = publisher.attach(FnListener(move |event: ControllerEvent| {
        if let Ok(mut log) = sink.lock() {
            log.push(event);
        }
    }));

    let mut controller = CharacterController::new();
    controller.fixed_update(&config, &ProbeHits::grounded(), DT, &mut publisher);
    controller.press_jump();
    controller.fixed_update(&config, &ProbeHits::grounded(), DT, &mut publisher);

    assert!(publisher.detach(id));
    controller.fixed_update(&config, &ProbeHits::none(), DT, &mut publisher);

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 2, "detached listener saw: {:?}", *log);
    assert_eq!(log[1], ControllerEvent::Jumped);
}

#[test]
fn simulation_is_deterministic() {
    let run = || {
        let mut rig = Rig::grounded();
        let mut trace = Vec::new();
        for frame in 0..120 {
            let axis = if frame % 40 < 20 { Vec2::X } else { Vec2::NEG_X };
            if frame % 30 == 0 {
                rig.controller.press_jump();
            } else if frame % 30 == 5 {
                rig.controller.release_jump();
            }
            let hits = if rig.height <= 0.0 {
                ProbeHits::grounded()
            } else {
                ProbeHits::none()
            };
            trace.push(rig.frame(axis, hits));
        }
        trace
    };
    assert_eq!(run(), run());
}
