//! One-to-many event dispatch keyed by event kind

use crate::event::{FanoutEvent, InputEvent, LifecycleEvent};
use std::collections::HashMap;
use wrath_core::{ListenerId, Result, WrathError};

type Listener<E> = Box<dyn FnMut(&E) -> Result<()>>;

/// What happens when a listener returns an error mid-dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the failing listener and return its error; later listeners do not run
    #[default]
    Abort,
    /// Run every listener, log each failure, then report all failures together
    Isolate,
}

/// Dispatch table: for each event kind, the listeners in registration order.
///
/// Dispatch is synchronous on the calling thread. Registration needs
/// `&mut self`, so the listener list cannot change while a dispatch over it
/// is in progress.
pub struct EventFanout<E: FanoutEvent> {
    name: &'static str,
    listeners: HashMap<E::Kind, Vec<(ListenerId, Listener<E>)>>,
    policy: FailurePolicy,
}

impl<E: FanoutEvent> EventFanout<E> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            listeners: HashMap::new(),
            policy: FailurePolicy::default(),
        }
    }

    pub fn set_policy(&mut self, policy: FailurePolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Add a listener for one event kind. It runs after every listener
    /// already registered for that kind.
    pub fn register<F>(&mut self, kind: E::Kind, listener: F) -> ListenerId
    where
        F: FnMut(&E) -> Result<()> + 'static,
    {
        let id = ListenerId::next();
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(listener)));
        log::trace!("{}: registered listener {id} for {kind:?}", self.name);
        id
    }

    /// Remove a listener. Returns false if the handle is unknown.
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        for list in self.listeners.values_mut() {
            if let Some(pos) = list.iter().position(|(lid, _)| *lid == id) {
                drop(list.remove(pos));
                return true;
            }
        }
        false
    }

    /// Number of listeners registered for `kind`
    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Invoke every listener registered for the event's kind, in order.
    pub fn dispatch(&mut self, event: &E) -> Result<()> {
        let kind = event.kind();
        let Some(list) = self.listeners.get_mut(&kind) else {
            return Ok(());
        };

        match self.policy {
            FailurePolicy::Abort => {
                for (_, listener) in list.iter_mut() {
                    listener(event)?;
                }
                Ok(())
            }
            FailurePolicy::Isolate => {
                let mut failures = Vec::new();
                for (id, listener) in list.iter_mut() {
                    if let Err(e) = listener(event) {
                        log::error!("{}: listener {id} failed on {kind:?}: {e}", self.name);
                        failures.push(e.to_string());
                    }
                }
                if failures.is_empty() {
                    Ok(())
                } else {
                    Err(WrathError::ListenerFailures(failures))
                }
            }
        }
    }
}

/// The root handlers: the only fan-outs the rest of the client calls.
/// External subscribers register through them.
pub struct RootHandlers {
    pub lifecycle: EventFanout<LifecycleEvent>,
    pub input: EventFanout<InputEvent>,
}

impl RootHandlers {
    pub fn new() -> Self {
        Self {
            lifecycle: EventFanout::new("lifecycle"),
            input: EventFanout::new("input"),
        }
    }
}

impl Default for RootHandlers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{InputKind, LifecycleKind};
    use std::cell::RefCell;
    use std::rc::Rc;
    use winit::event::ElementState;
    use winit::keyboard::KeyCode;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Box<dyn FnMut(&LifecycleEvent) -> Result<()>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_for_make = log.clone();
        let make = move |name: &str| -> Box<dyn FnMut(&LifecycleEvent) -> Result<()>> {
            let log = log_for_make.clone();
            let name = name.to_string();
            Box::new(move |_| {
                log.borrow_mut().push(name.clone());
                Ok(())
            })
        };
        (log, make)
    }

    #[test]
    fn test_dispatch_runs_in_registration_order() {
        let (log, make) = recorder();
        let mut fanout = EventFanout::<LifecycleEvent>::new("test");
        fanout.register(LifecycleKind::Tick, make("a"));
        fanout.register(LifecycleKind::Tick, make("b"));
        fanout.register(LifecycleKind::Tick, make("c"));

        fanout.dispatch(&LifecycleEvent::Tick { tick: 1 }).unwrap();
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_only_matching_kind_is_invoked() {
        let (log, make) = recorder();
        let mut fanout = EventFanout::<LifecycleEvent>::new("test");
        fanout.register(LifecycleKind::Opened, make("open"));
        fanout.register(LifecycleKind::Closing, make("close"));

        fanout.dispatch(&LifecycleEvent::Closing).unwrap();
        assert_eq!(*log.borrow(), vec!["close"]);
        // no listeners for this kind is fine
        fanout.dispatch(&LifecycleEvent::Reopened).unwrap();
    }

    #[test]
    fn test_unregister_removes_listener() {
        let (log, make) = recorder();
        let mut fanout = EventFanout::<LifecycleEvent>::new("test");
        let a = fanout.register(LifecycleKind::Tick, make("a"));
        fanout.register(LifecycleKind::Tick, make("b"));

        assert!(fanout.unregister(a));
        assert!(!fanout.unregister(a));
        assert_eq!(fanout.listener_count(LifecycleKind::Tick), 1);

        fanout.dispatch(&LifecycleEvent::Tick { tick: 1 }).unwrap();
        assert_eq!(*log.borrow(), vec!["b"]);
    }

    #[test]
    fn test_abort_policy_stops_at_failure() {
        let (log, make) = recorder();
        let mut fanout = EventFanout::<LifecycleEvent>::new("test");
        fanout.register(LifecycleKind::Tick, make("a"));
        fanout.register(LifecycleKind::Tick, |_| {
            Err(WrathError::Listener("boom".into()))
        });
        fanout.register(LifecycleKind::Tick, make("c"));

        let err = fanout.dispatch(&LifecycleEvent::Tick { tick: 1 }).unwrap_err();
        assert!(matches!(err, WrathError::Listener(ref m) if m == "boom"));
        assert_eq!(*log.borrow(), vec!["a"]);
    }

    #[test]
    fn test_isolate_policy_runs_everyone() {
        let (log, make) = recorder();
        let mut fanout = EventFanout::<LifecycleEvent>::new("test");
        fanout.set_policy(FailurePolicy::Isolate);
        assert_eq!(fanout.policy(), FailurePolicy::Isolate);
        fanout.register(LifecycleKind::Tick, |_| Err(WrathError::Listener("first".into())));
        fanout.register(LifecycleKind::Tick, make("b"));
        fanout.register(LifecycleKind::Tick, |_| Err(WrathError::Listener("third".into())));

        let err = fanout.dispatch(&LifecycleEvent::Tick { tick: 1 }).unwrap_err();
        match err {
            WrathError::ListenerFailures(failures) => assert_eq!(failures.len(), 2),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(*log.borrow(), vec!["b"]);
    }

    #[test]
    fn test_listeners_see_event_payload() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut roots = RootHandlers::new();
        let sink = seen.clone();
        roots.input.register(InputKind::Key, move |event| {
            if let InputEvent::Key { key, state } = event {
                sink.borrow_mut().push((*key, *state));
            }
            Ok(())
        });

        roots
            .input
            .dispatch(&InputEvent::Key {
                key: KeyCode::KeyW,
                state: ElementState::Pressed,
            })
            .unwrap();
        roots
            .input
            .dispatch(&InputEvent::CursorMoved { x: 1.0, y: 2.0 })
            .unwrap();
        assert_eq!(*seen.borrow(), vec![(KeyCode::KeyW, ElementState::Pressed)]);
    }
}
