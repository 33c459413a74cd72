//! Hardware abstraction boundary
//!
//! The protocol adapters (MIDI, HID) translate raw input into button events
//! and move bound parameters when a knob turns. This module only defines the
//! handles the core consumes, plus in-memory implementations the adapters
//! can drive directly.

use crate::parameter::Parameter;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Logical button identifier
///
/// Independent of the physical address a button has on a given device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonId {
    Shift,
    Select,
    Delete,
    Duplicate,
    Alt,
    Control,
    Mute,
    Solo,
    RecArm,
    Play,
    Record,
    Stop,
    Left,
    Right,
    Up,
    Down,
    PageLeft,
    PageRight,
    BankLeft,
    BankRight,
    Track,
    Volume,
    Pan,
    Sends,
    Device,
    Browse,
    Session,
    Note,
    Scales,
    Accent,
    Layout,
    User,
}

/// Button event delivered to handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonEvent {
    /// Button went down
    Down,
    /// Button went up
    Up,
    /// Button held past the long-press threshold
    Long,
}

/// Callback attached to a button event
pub type ButtonHandler = Rc<dyn Fn(ButtonEvent)>;

/// A physical button
pub trait Button {
    /// Check if the button is currently held down
    fn is_pressed(&self) -> bool;

    /// Attach a handler that runs whenever `event` is delivered
    fn add_event_handler(&self, event: ButtonEvent, handler: ButtonHandler);
}

/// A physical continuous control (knob, fader, encoder)
///
/// Binding routes hardware movement to the parameter; `None` unbinds.
pub trait Control {
    fn bind(&self, parameter: Option<Rc<dyn Parameter>>);
}

/// Resolves logical button IDs to the hardware buttons of a surface
pub trait ButtonLookup {
    fn button(&self, id: ButtonId) -> Option<Rc<dyn Button>>;

    /// Check if a button exists and is held down
    fn is_pressed(&self, id: ButtonId) -> bool {
        self.button(id).map(|b| b.is_pressed()).unwrap_or(false)
    }
}

/// In-memory button driven by an input adapter
#[derive(Default)]
pub struct VirtualButton {
    pressed: Cell<bool>,
    handlers: RefCell<Vec<(ButtonEvent, ButtonHandler)>>,
}

impl VirtualButton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an event
    ///
    /// The pressed state is updated before handlers run, so handlers observe
    /// the new state through `is_pressed()`.
    pub fn trigger(&self, event: ButtonEvent) {
        match event {
            ButtonEvent::Down => self.pressed.set(true),
            ButtonEvent::Up => self.pressed.set(false),
            ButtonEvent::Long => {}
        }

        // Handlers may attach further handlers
        let handlers: Vec<ButtonHandler> = self
            .handlers
            .borrow()
            .iter()
            .filter(|(e, _)| *e == event)
            .map(|(_, h)| Rc::clone(h))
            .collect();
        for handler in handlers {
            handler(event);
        }
    }

    pub fn press(&self) {
        self.trigger(ButtonEvent::Down);
    }

    pub fn release(&self) {
        self.trigger(ButtonEvent::Up);
    }

    /// Number of handlers attached for an event
    pub fn handler_count(&self, event: ButtonEvent) -> usize {
        self.handlers
            .borrow()
            .iter()
            .filter(|(e, _)| *e == event)
            .count()
    }
}

impl Button for VirtualButton {
    fn is_pressed(&self) -> bool {
        self.pressed.get()
    }

    fn add_event_handler(&self, event: ButtonEvent, handler: ButtonHandler) {
        self.handlers.borrow_mut().push((event, handler));
    }
}

impl fmt::Debug for VirtualButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualButton")
            .field("pressed", &self.pressed.get())
            .field("handlers", &self.handlers.borrow().len())
            .finish()
    }
}

/// In-memory continuous control remembering its binding
#[derive(Default)]
pub struct VirtualControl {
    bound: RefCell<Option<Rc<dyn Parameter>>>,
}

impl VirtualControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently bound parameter
    pub fn bound(&self) -> Option<Rc<dyn Parameter>> {
        self.bound.borrow().clone()
    }

    /// Check if this control is bound to exactly `parameter`
    pub fn is_bound_to(&self, parameter: &Rc<dyn Parameter>) -> bool {
        self.bound
            .borrow()
            .as_ref()
            .map(|p| Rc::ptr_eq(p, parameter))
            .unwrap_or(false)
    }

    /// Forward an absolute hardware value to the bound parameter
    pub fn move_to(&self, value: i32) {
        if let Some(parameter) = self.bound() {
            parameter.set_value(value);
        }
    }
}

impl Control for VirtualControl {
    fn bind(&self, parameter: Option<Rc<dyn Parameter>>) {
        *self.bound.borrow_mut() = parameter;
    }
}

impl fmt::Debug for VirtualControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = self.bound.borrow().as_ref().map(|p| p.name());
        f.debug_struct("VirtualControl").field("bound", &bound).finish()
    }
}

/// Button set of one surface unit
#[derive(Debug, Default)]
pub struct ButtonRegistry {
    buttons: HashMap<ButtonId, Rc<VirtualButton>>,
}

impl ButtonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with one virtual button per ID
    pub fn with_buttons(ids: &[ButtonId]) -> Self {
        let mut registry = Self::new();
        for &id in ids {
            registry.add(id);
        }
        registry
    }

    /// Add a button, returning the existing one if already present
    pub fn add(&mut self, id: ButtonId) -> Rc<VirtualButton> {
        Rc::clone(
            self.buttons
                .entry(id)
                .or_insert_with(|| Rc::new(VirtualButton::new())),
        )
    }

    /// Get the concrete virtual button (for input adapters)
    pub fn virtual_button(&self, id: ButtonId) -> Option<Rc<VirtualButton>> {
        self.buttons.get(&id).cloned()
    }
}

impl ButtonLookup for ButtonRegistry {
    fn button(&self, id: ButtonId) -> Option<Rc<dyn Button>> {
        self.buttons
            .get(&id)
            .map(|b| Rc::clone(b) as Rc<dyn Button>)
    }
}
