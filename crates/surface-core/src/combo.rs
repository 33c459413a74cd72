//! Button-combination dispatch
//!
//! A button release often means different things depending on what else is
//! held (Shift+Play, Select+Mute, ...). Combinations are checked in the order
//! they were declared; the first one whose predicate holds runs and consumes
//! the event.

use crate::hardware::{ButtonEvent, ButtonId, ButtonLookup};
use std::rc::Rc;

type ComboPredicate = Box<dyn Fn() -> bool>;
type ComboHandler = Box<dyn Fn(ButtonEvent)>;

struct Combo {
    name: String,
    predicate: ComboPredicate,
    handler: ComboHandler,
}

/// Ordered list of `(predicate, handler)` pairs
#[derive(Default)]
pub struct ButtonCombos {
    combos: Vec<Combo>,
}

impl ButtonCombos {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a combination checked after all previously added ones
    pub fn add(
        &mut self,
        name: &str,
        predicate: impl Fn() -> bool + 'static,
        handler: impl Fn(ButtonEvent) + 'static,
    ) -> &mut Self {
        self.combos.push(Combo {
            name: name.to_string(),
            predicate: Box::new(predicate),
            handler: Box::new(handler),
        });
        self
    }

    /// Add a combination that matches while all `held` buttons are pressed
    pub fn add_held(
        &mut self,
        name: &str,
        surface: Rc<dyn ButtonLookup>,
        held: &[ButtonId],
        handler: impl Fn(ButtonEvent) + 'static,
    ) -> &mut Self {
        let held = held.to_vec();
        self.add(
            name,
            move || held.iter().all(|id| surface.is_pressed(*id)),
            handler,
        )
    }

    pub fn len(&self) -> usize {
        self.combos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combos.is_empty()
    }

    /// Run the first matching handler
    ///
    /// Returns true if the event was consumed.
    pub fn dispatch(&self, event: ButtonEvent) -> bool {
        match self.combos.iter().find(|combo| (combo.predicate)()) {
            Some(combo) => {
                log::debug!("ButtonCombos: '{}' consumed {:?}", combo.name, event);
                (combo.handler)(event);
                true
            }
            None => false,
        }
    }
}
