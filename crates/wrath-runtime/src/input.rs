//! Key and mouse-button bindings with held-down (persistent) callbacks

use crate::event::InputEvent;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

/// When a bound callback runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Once, when the input goes down
    Press,
    /// Once, when the input goes up
    Release,
    /// On press, then again every time the input cadence fires until release
    HoldDown,
}

/// A physical input a callback can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputTrigger {
    Key(KeyCode),
    Mouse(MouseButton),
}

type Callback = Rc<RefCell<dyn FnMut()>>;

struct Binding {
    action: KeyAction,
    callback: Callback,
}

/// One callback per trigger, plus the set of held-down callbacks the input
/// cadence re-runs.
pub struct InputBindings {
    bindings: HashMap<InputTrigger, Binding>,
    /// Held-down callbacks, in the order their triggers were pressed
    persistent: Vec<(InputTrigger, Callback)>,
    /// Triggers currently down (filters out key repeat)
    held: HashSet<InputTrigger>,
    /// Current cursor position in window pixels
    cursor_position: (f64, f64),
}

impl Default for InputBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBindings {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            persistent: Vec::new(),
            held: HashSet::new(),
            cursor_position: (0.0, 0.0),
        }
    }

    /// Bind a callback to a trigger, replacing any previous binding for it
    pub fn bind<F>(&mut self, trigger: InputTrigger, action: KeyAction, callback: F)
    where
        F: FnMut() + 'static,
    {
        self.persistent.retain(|(t, _)| *t != trigger);
        self.bindings.insert(
            trigger,
            Binding {
                action,
                callback: Rc::new(RefCell::new(callback)),
            },
        );
    }

    /// Remove the binding for a trigger (and stop it repeating if held)
    pub fn unbind(&mut self, trigger: InputTrigger) -> bool {
        self.persistent.retain(|(t, _)| *t != trigger);
        self.bindings.remove(&trigger).is_some()
    }

    pub fn is_bound(&self, trigger: InputTrigger) -> bool {
        self.bindings.contains_key(&trigger)
    }

    /// Feed one raw input event, running any press/release callbacks
    pub fn handle(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::Key { key, state } => self.process(InputTrigger::Key(key), state),
            InputEvent::MouseButton { button, state } => {
                self.process(InputTrigger::Mouse(button), state)
            }
            InputEvent::CursorMoved { x, y } => self.cursor_position = (x, y),
        }
    }

    fn process(&mut self, trigger: InputTrigger, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.held.insert(trigger) {
                    return;
                }
                let Some(binding) = self.bindings.get(&trigger) else {
                    return;
                };
                match binding.action {
                    KeyAction::Press => invoke(&binding.callback),
                    KeyAction::HoldDown => {
                        let callback = binding.callback.clone();
                        self.persistent.push((trigger, callback.clone()));
                        invoke(&callback);
                    }
                    KeyAction::Release => {}
                }
            }
            ElementState::Released => {
                self.held.remove(&trigger);
                self.persistent.retain(|(t, _)| *t != trigger);
                if let Some(binding) = self.bindings.get(&trigger) {
                    if binding.action == KeyAction::Release {
                        invoke(&binding.callback);
                    }
                }
            }
        }
    }

    /// Run every held-down callback once. Called when the input cadence fires.
    pub fn run_persistent(&mut self) -> usize {
        let callbacks: Vec<Callback> = self.persistent.iter().map(|(_, c)| c.clone()).collect();
        for callback in &callbacks {
            invoke(callback);
        }
        callbacks.len()
    }

    /// Number of held-down callbacks currently repeating
    pub fn persistent_count(&self) -> usize {
        self.persistent.len()
    }

    pub fn is_held(&self, trigger: InputTrigger) -> bool {
        self.held.contains(&trigger)
    }

    pub fn cursor_position(&self) -> (f64, f64) {
        self.cursor_position
    }
}

fn invoke(callback: &Callback) {
    match callback.try_borrow_mut() {
        Ok(mut f) => (*f)(),
        Err(_) => log::warn!("Input callback re-entered itself, skipping"),
    }
}
