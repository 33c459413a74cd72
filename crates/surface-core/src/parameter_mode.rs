//! Mode binding a fixed set of controls to switchable parameter providers
//!
//! # Provider selection
//!
//! ```text
//! controls c0..cN ──bind──► current provider
//!                               │
//!   [Shift held]  ──────────────┼──► provider registered for Shift
//!   [Select held] ──────────────┼──► provider registered for Select
//!   (nothing held) ─────────────┴──► default provider
//! ```
//!
//! Providers are selected by button state, never replaced: pressing or
//! releasing a modifier just triggers a rebind, and the current provider is
//! recomputed from the registration order each time.

use crate::bank::Bank;
use crate::error::{SurfaceError, SurfaceResult};
use crate::feature_group::FeatureGroup;
use crate::hardware::{ButtonEvent, ButtonId, ButtonLookup, Control};
use crate::mode::Mode;
use crate::parameter::{Parameter, ParameterProvider, ParametersObserver};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Predicate = Box<dyn Fn() -> bool>;

/// A mode whose controls reach the parameters of the current provider
pub struct ParameterBindingMode {
    name: String,
    surface: Rc<dyn ButtonLookup>,
    controls: Vec<Rc<dyn Control>>,
    bank: RefCell<Option<Rc<dyn Bank>>>,
    default_provider: RefCell<Option<Rc<dyn ParameterProvider>>>,
    /// Alternate providers in registration order
    providers_by_button: RefCell<Vec<(ButtonId, Rc<dyn ParameterProvider>)>>,
    is_active: Cell<bool>,
    is_absolute: Cell<bool>,
    alternative_function: RefCell<Predicate>,
    self_ref: Weak<ParameterBindingMode>,
}

impl ParameterBindingMode {
    /// Create a mode over `controls`
    ///
    /// The alternative function (page-wise navigation) defaults to Shift
    /// being held.
    pub fn new(
        name: &str,
        surface: Rc<dyn ButtonLookup>,
        controls: Vec<Rc<dyn Control>>,
        bank: Option<Rc<dyn Bank>>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|self_ref: &Weak<Self>| {
            let shift_surface = Rc::clone(&surface);
            Self {
                name: name.to_string(),
                surface,
                controls,
                bank: RefCell::new(bank),
                default_provider: RefCell::new(None),
                providers_by_button: RefCell::new(Vec::new()),
                is_active: Cell::new(false),
                is_absolute: Cell::new(true),
                alternative_function: RefCell::new(Box::new(move || {
                    shift_surface.is_pressed(ButtonId::Shift)
                })),
                self_ref: self_ref.clone(),
            }
        })
    }

    /// Number of bound controls
    pub fn control_count(&self) -> usize {
        self.controls.len()
    }

    pub fn is_active(&self) -> bool {
        self.is_active.get()
    }

    /// Absolute controls set values, relative ones (encoders) change them
    pub fn set_absolute(&self, absolute: bool) {
        self.is_absolute.set(absolute);
    }

    pub fn is_absolute(&self) -> bool {
        self.is_absolute.get()
    }

    /// Replace the check that turns item navigation into page navigation
    pub fn set_alternative_function(&self, predicate: impl Fn() -> bool + 'static) {
        *self.alternative_function.borrow_mut() = Box::new(predicate);
    }

    fn is_alternative_function(&self) -> bool {
        (*self.alternative_function.borrow())()
    }

    /// Register the default provider (`None`) or the provider for a modifier
    ///
    /// The provider must have exactly one parameter per control. On error
    /// nothing changes.
    pub fn set_parameter_provider(
        &self,
        button: Option<ButtonId>,
        provider: Rc<dyn ParameterProvider>,
    ) -> SurfaceResult<()> {
        let expected = self.controls.len();
        if provider.size() != expected {
            log::warn!(
                "ParameterBindingMode[{}]: Provider has {} parameters, expected {}",
                self.name,
                provider.size(),
                expected
            );
            return Err(SurfaceError::ProviderSizeMismatch {
                expected,
                actual: provider.size(),
            });
        }

        // The modifier and its hardware button, or None for the default provider
        let modifier = match button {
            Some(id) => match self.surface.button(id) {
                Some(hardware_button) => Some((id, hardware_button)),
                None => {
                    log::warn!(
                        "ParameterBindingMode[{}]: No button {:?} on this surface",
                        self.name,
                        id
                    );
                    return Err(SurfaceError::UnknownButtonBinding(id));
                }
            },
            None => None,
        };

        let was_active = self.is_active();
        if was_active {
            self.unsubscribe();
        }

        match modifier {
            Some((id, hardware_button)) => {
                let is_new = {
                    let mut providers = self.providers_by_button.borrow_mut();
                    match providers.iter().position(|(b, _)| *b == id) {
                        Some(existing) => {
                            providers[existing].1 = provider;
                            false
                        }
                        None => {
                            providers.push((id, provider));
                            true
                        }
                    }
                };
                if is_new {
                    for event in [ButtonEvent::Down, ButtonEvent::Up] {
                        let mode = self.self_ref.clone();
                        hardware_button.add_event_handler(
                            event,
                            Rc::new(move |_: ButtonEvent| {
                                if let Some(mode) = mode.upgrade() {
                                    mode.bind_controls();
                                }
                            }),
                        );
                    }
                }
                log::debug!("ParameterBindingMode[{}]: Provider for {:?} set", self.name, id);
            }
            None => {
                *self.default_provider.borrow_mut() = Some(provider);
                log::debug!("ParameterBindingMode[{}]: Default provider set", self.name);
            }
        }

        if was_active {
            self.subscribe();
            self.bind_controls();
        }
        Ok(())
    }

    /// The provider of the first held modifier, else the default provider
    pub fn parameter_provider(&self) -> Option<Rc<dyn ParameterProvider>> {
        let pressed = self
            .providers_by_button
            .borrow()
            .iter()
            .find(|(button, _)| self.surface.is_pressed(*button))
            .map(|(_, provider)| Rc::clone(provider));
        pressed.or_else(|| self.default_provider.borrow().clone())
    }

    /// Parameter currently reached by control `index`
    pub fn parameter(&self, index: usize) -> Option<Rc<dyn Parameter>> {
        if index >= self.controls.len() {
            return None;
        }
        self.parameter_provider().map(|p| p.get(index))
    }

    /// Bind every control to the current provider's parameter at its index
    ///
    /// Does nothing while inactive or without a default provider.
    pub fn bind_controls(&self) {
        if !self.is_active() || self.default_provider.borrow().is_none() {
            return;
        }
        let Some(provider) = self.parameter_provider() else {
            return;
        };
        log::debug!(
            "ParameterBindingMode[{}]: Binding {} controls",
            self.name,
            self.controls.len()
        );
        for (index, control) in self.controls.iter().enumerate() {
            control.bind(Some(provider.get(index)));
        }
    }

    fn unbind_controls(&self) {
        for control in &self.controls {
            control.bind(None);
        }
    }

    /// Providers to observe: the default one plus every alternate
    fn providers(&self) -> Vec<Rc<dyn ParameterProvider>> {
        let mut providers: Vec<Rc<dyn ParameterProvider>> =
            self.default_provider.borrow().iter().cloned().collect();
        providers.extend(
            self.providers_by_button
                .borrow()
                .iter()
                .map(|(_, p)| Rc::clone(p)),
        );
        providers
    }

    fn as_observer(&self) -> Weak<dyn ParametersObserver> {
        self.self_ref.clone()
    }

    fn subscribe(&self) {
        let observer = self.as_observer();
        for provider in self.providers() {
            provider.add_parameters_observer(observer.clone());
        }
    }

    fn unsubscribe(&self) {
        let observer = self.as_observer();
        for provider in self.providers() {
            provider.remove_parameters_observer(&observer);
        }
    }

    pub fn bank(&self) -> Option<Rc<dyn Bank>> {
        self.bank.borrow().clone()
    }

    /// Replace the bank; callers rebind if parameter identities changed
    pub fn switch_banks(&self, bank: Rc<dyn Bank>) {
        *self.bank.borrow_mut() = Some(bank);
    }

    fn with_bank<R>(&self, default: R, f: impl FnOnce(&dyn Bank) -> R) -> R {
        match self.bank() {
            Some(bank) => f(bank.as_ref()),
            None => default,
        }
    }
}

impl ParametersObserver for ParameterBindingMode {
    fn parameters_adjusted(&self) {
        self.bind_controls();
    }
}

impl FeatureGroup for ParameterBindingMode {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_activate(&self) {
        self.is_active.set(true);
        if self.default_provider.borrow().is_some() {
            self.subscribe();
            self.bind_controls();
        }
    }

    fn on_deactivate(&self) {
        self.is_active.set(false);
        self.unsubscribe();
        self.unbind_controls();
    }
}

impl Mode for ParameterBindingMode {
    fn on_knob_value(&self, index: usize, value: i32) {
        let Some(parameter) = self.parameter(index) else {
            return;
        };
        if self.is_absolute() {
            parameter.set_value(value);
        } else {
            parameter.change_value(value);
        }
    }

    /// Touching a knob while Delete is held resets its parameter
    fn on_knob_touch(&self, index: usize, touched: bool) {
        let Some(parameter) = self.parameter(index) else {
            return;
        };
        if touched && self.surface.is_pressed(ButtonId::Delete) {
            parameter.reset_value();
            return;
        }
        parameter.touch_value(touched);
    }

    fn knob_value(&self, index: usize) -> Option<i32> {
        self.parameter(index)
            .filter(|p| p.does_exist())
            .map(|p| p.value())
    }

    fn select_previous_item(&self) {
        if self.is_alternative_function() {
            self.select_previous_item_page();
        } else {
            self.with_bank((), |bank| bank.select_previous_item());
        }
    }

    fn select_next_item(&self) {
        if self.is_alternative_function() {
            self.select_next_item_page();
        } else {
            self.with_bank((), |bank| bank.select_next_item());
        }
    }

    fn select_previous_item_page(&self) {
        self.with_bank((), |bank| bank.select_previous_page());
    }

    fn select_next_item_page(&self) {
        self.with_bank((), |bank| bank.select_next_page());
    }

    fn has_previous_item(&self) -> bool {
        self.with_bank(false, |bank| bank.can_scroll_backwards())
    }

    fn has_next_item(&self) -> bool {
        self.with_bank(false, |bank| bank.can_scroll_forwards())
    }

    fn has_previous_item_page(&self) -> bool {
        self.with_bank(false, |bank| bank.can_scroll_page_backwards())
    }

    fn has_next_item_page(&self) -> bool {
        self.with_bank(false, |bank| bank.can_scroll_page_forwards())
    }

    fn selected_item_name(&self) -> Option<String> {
        self.with_bank(None, |bank| bank.selected_item().map(|item| item.name()))
    }
}
