//! State change notifications.
//!
//! The controller raises a [`ControllerEvent`] at the exact point a transition
//! is detected and hands it to an [`EventSink`]. Delivery is synchronous and
//! in-process: nothing is queued beyond the sink itself.
//!
//! Two ways to consume them:
//! - Outside the ECS, attach listeners to a [`StatePublisher`] and pass it as
//!   the sink.
//! - With the plugin, read the [`GroundedChanged`], [`Jumped`] and
//!   [`WallTouchChanged`] Bevy events.
//!
//! Listeners must not mutate the controller from inside a notification.

use bevy::prelude::*;

use crate::detection::WallTouchState;

/// A discrete transition observed during a fixed tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerEvent {
    /// Ground contact changed. `impact_speed` is `|velocity.y|` at landing, 0 when leaving.
    GroundedChanged { grounded: bool, impact_speed: f32 },
    /// A jump executed this tick.
    Jumped,
    /// The resolved wall-touch side changed.
    WallTouchChanged(WallTouchState),
}

/// Receives events as the controller raises them.
pub trait EventSink {
    fn publish(&mut self, event: ControllerEvent);
}

impl EventSink for Vec<ControllerEvent> {
    fn publish(&mut self, event: ControllerEvent) {
        self.push(event);
    }
}

/// Observer of controller transitions. All methods default to doing nothing.
pub trait ControllerListener {
    fn on_grounded_changed(&mut self, _grounded: bool, _impact_speed: f32) {}
    fn on_jumped(&mut self) {}
    fn on_wall_touch_changed(&mut self, _state: WallTouchState) {}
}

/// Adapter that turns a closure over [`ControllerEvent`] into a listener.
pub struct FnListener<F>(pub F);

impl<F: FnMut(ControllerEvent)> ControllerListener for FnListener<F> {
    fn on_grounded_changed(&mut self, grounded: bool, impact_speed: f32) {
        (self.0)(ControllerEvent::GroundedChanged {
            grounded,
            impact_speed,
        });
    }

    fn on_jumped(&mut self) {
        (self.0)(ControllerEvent::Jumped);
    }

    fn on_wall_touch_changed(&mut self, state: WallTouchState) {
        (self.0)(ControllerEvent::WallTouchChanged(state));
    }
}

/// Handle returned by [`StatePublisher::attach`], used to detach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Explicit listener registry. Events are dispatched immediately, in
/// attachment order.
#[derive(Default)]
pub struct StatePublisher {
    listeners: Vec<(ListenerId, Box<dyn ControllerListener + Send + Sync>)>,
    next_id: u64,
}

impl StatePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It receives every event published after this call.
    pub fn attach(&mut self, listener: impl ControllerListener + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if the id was not attached.
    pub fn detach(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl EventSink for StatePublisher {
    fn publish(&mut self, event: ControllerEvent) {
        for (_, listener) in &mut self.listeners {
            match event {
                ControllerEvent::GroundedChanged {
                    grounded,
                    impact_speed,
                } => listener.on_grounded_changed(grounded, impact_speed),
                ControllerEvent::Jumped => listener.on_jumped(),
                ControllerEvent::WallTouchChanged(state) => listener.on_wall_touch_changed(state),
            }
        }
    }
}

/// Bevy event: a character's ground contact changed.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct GroundedChanged {
    pub entity: Entity,
    pub grounded: bool,
    /// `|velocity.y|` at the instant of landing; 0 when leaving the ground.
    pub impact_speed: f32,
}

/// Bevy event: a character executed a jump.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jumped {
    pub entity: Entity,
}

/// Bevy event: a character's wall-touch side changed.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallTouchChanged {
    pub entity: Entity,
    pub state: WallTouchState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Counter {
        jumps: u32,
        landings: Vec<f32>,
        walls: Vec<WallTouchState>,
    }

    impl ControllerListener for Arc<Mutex<Counter>> {
        fn on_grounded_changed(&mut self, grounded: bool, impact_speed: f32) {
            if grounded {
                self.lock().unwrap().landings.push(impact_speed);
            }
        }

        fn on_jumped(&mut self) {
            self.lock().unwrap().jumps += 1;
        }

        fn on_wall_touch_changed(&mut self, state: WallTouchState) {
            self.lock().unwrap().walls.push(state);
        }
    }

    #[test]
    fn vec_sink_collects_in_order() {
        let mut sink: Vec<ControllerEvent> = Vec::new();
        sink.publish(ControllerEvent::Jumped);
        sink.publish(ControllerEvent::WallTouchChanged(WallTouchState::Left));
        assert_eq!(
            sink,
            vec![
                ControllerEvent::Jumped,
                ControllerEvent::WallTouchChanged(WallTouchState::Left)
            ]
        );
    }

    #[test]
    fn publisher_dispatches_to_attached_listeners() {
        let counter = Arc::new(Mutex::new(Counter::default()));
        let mut publisher = StatePublisher::new();
        publisher.attach(counter.clone());

        publisher.publish(ControllerEvent::GroundedChanged {
            grounded: true,
            impact_speed: 12.0,
        });
        publisher.publish(ControllerEvent::Jumped);
        publisher.publish(ControllerEvent::WallTouchChanged(WallTouchState::Right));

        let counter = counter.lock().unwrap();
        assert_eq!(counter.jumps, 1);
        assert_eq!(counter.landings, vec![12.0]);
        assert_eq!(counter.walls, vec![WallTouchState::Right]);
    }

    #[test]
    fn detached_listener_stops_receiving() {
        let counter = Arc::new(Mutex::new(Counter::default()));
        let mut publisher = StatePublisher::new();
        let id = publisher.attach(counter.clone());

        publisher.publish(ControllerEvent::Jumped);
        assert!(publisher.detach(id));
        assert!(!publisher.detach(id), "second detach is a no-op");
        assert!(publisher.is_empty());

        publisher.publish(ControllerEvent::Jumped);
        assert_eq!(counter.lock().unwrap().jumps, 1);
    }

    #[test]
    fn fn_listener_forwards_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut publisher = StatePublisher::new();
        publisher.attach(FnListener(move |event: ControllerEvent| sink.lock().unwrap().push(event)));

        publisher.publish(ControllerEvent::Jumped);
        publisher.publish(ControllerEvent::GroundedChanged {
            grounded: false,
            impact_speed: 0.0,
        });

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ControllerEvent::Jumped,
                ControllerEvent::GroundedChanged {
                    grounded: false,
                    impact_speed: 0.0
                }
            ]
        );
    }

    #[test]
    fn listener_ids_are_unique() {
        let mut publisher = StatePublisher::new();
        let a = publisher.attach(FnListener(|_: ControllerEvent| {}));
        let b = publisher.attach(FnListener(|_: ControllerEvent| {}));
        assert_ne!(a, b);
        assert_eq!(publisher.len(), 2);
    }
}
