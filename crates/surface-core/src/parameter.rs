//! Parameters and parameter providers
//!
//! A provider is a fixed-size ordered source of parameters. Its size never
//! changes, but the parameter behind an index may (e.g. after a bank page
//! scroll); providers announce that to their observers so bound controls can
//! be rebound.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// A controllable value in the host application
pub trait Parameter {
    /// Display name
    fn name(&self) -> String;

    /// Check if there is a real value behind this parameter
    fn does_exist(&self) -> bool {
        true
    }

    /// Current value in hardware resolution
    fn value(&self) -> i32;

    /// Set an absolute value
    fn set_value(&self, value: i32);

    /// Change the value by a relative amount
    fn change_value(&self, delta: i32);

    /// Reset to the parameter's default
    fn reset_value(&self);

    /// Signal that the control driving this parameter was touched or released
    fn touch_value(&self, _touched: bool) {}
}

/// Stand-in for an index that has no parameter
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyParameter;

impl Parameter for EmptyParameter {
    fn name(&self) -> String {
        String::new()
    }

    fn does_exist(&self) -> bool {
        false
    }

    fn value(&self) -> i32 {
        0
    }

    fn set_value(&self, _value: i32) {}

    fn change_value(&self, _delta: i32) {}

    fn reset_value(&self) {}
}

/// Receives notifications when a provider's parameter set changes
pub trait ParametersObserver {
    fn parameters_adjusted(&self);
}

/// Fixed-size ordered source of parameters
pub trait ParameterProvider {
    /// Number of parameters; constant for the provider's lifetime
    fn size(&self) -> usize;

    /// Parameter at `index`; out-of-range indices yield an [`EmptyParameter`]
    fn get(&self, index: usize) -> Rc<dyn Parameter>;

    fn add_parameters_observer(&self, observer: Weak<dyn ParametersObserver>);

    fn remove_parameters_observer(&self, observer: &Weak<dyn ParametersObserver>);
}

/// Observer bookkeeping shared by provider implementations
///
/// Holds weak references so a provider never keeps a mode alive.
#[derive(Default)]
pub struct ObserverList {
    observers: RefCell<Vec<Weak<dyn ParametersObserver>>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer; adding the same observer twice is ignored
    pub fn add(&self, observer: Weak<dyn ParametersObserver>) {
        let mut observers = self.observers.borrow_mut();
        if !observers.iter().any(|o| Weak::ptr_eq(o, &observer)) {
            observers.push(observer);
        }
    }

    pub fn remove(&self, observer: &Weak<dyn ParametersObserver>) {
        self.observers
            .borrow_mut()
            .retain(|o| !Weak::ptr_eq(o, observer));
    }

    /// Number of live observers
    pub fn len(&self) -> usize {
        self.observers
            .borrow()
            .iter()
            .filter(|o| o.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notify all live observers in registration order
    ///
    /// Dropped observers are pruned. Observers may add or remove observers
    /// while being notified.
    pub fn notify(&self) {
        let live: Vec<Rc<dyn ParametersObserver>> = {
            let mut observers = self.observers.borrow_mut();
            observers.retain(|o| o.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        for observer in live {
            observer.parameters_adjusted();
        }
    }
}

fn empty_parameter() -> Rc<dyn Parameter> {
    Rc::new(EmptyParameter)
}

/// Provider over a fixed list of parameters
pub struct FixedParameterProvider {
    parameters: Vec<Rc<dyn Parameter>>,
    observers: ObserverList,
}

impl FixedParameterProvider {
    pub fn new(parameters: Vec<Rc<dyn Parameter>>) -> Self {
        Self {
            parameters,
            observers: ObserverList::new(),
        }
    }

    /// Tell observers that the parameters behind the indices changed
    pub fn notify_parameters_adjusted(&self) {
        self.observers.notify();
    }
}

impl ParameterProvider for FixedParameterProvider {
    fn size(&self) -> usize {
        self.parameters.len()
    }

    fn get(&self, index: usize) -> Rc<dyn Parameter> {
        self.parameters
            .get(index)
            .cloned()
            .unwrap_or_else(empty_parameter)
    }

    fn add_parameters_observer(&self, observer: Weak<dyn ParametersObserver>) {
        self.observers.add(observer);
    }

    fn remove_parameters_observer(&self, observer: &Weak<dyn ParametersObserver>) {
        self.observers.remove(observer);
    }
}

/// Provider of `size` empty parameters
///
/// Used to leave a set of controls deliberately unbound in a modifier layer.
pub struct EmptyParameterProvider {
    size: usize,
    parameter: Rc<dyn Parameter>,
}

impl EmptyParameterProvider {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            parameter: empty_parameter(),
        }
    }
}

impl ParameterProvider for EmptyParameterProvider {
    fn size(&self) -> usize {
        self.size
    }

    fn get(&self, _index: usize) -> Rc<dyn Parameter> {
        Rc::clone(&self.parameter)
    }

    // Never changes, nothing to notify
    fn add_parameters_observer(&self, _observer: Weak<dyn ParametersObserver>) {}

    fn remove_parameters_observer(&self, _observer: &Weak<dyn ParametersObserver>) {}
}

/// Concatenation of several providers
///
/// Index `i` addresses the providers in order. A change in any part is
/// forwarded to this provider's observers.
pub struct CombinedParameterProvider {
    providers: Vec<Rc<dyn ParameterProvider>>,
    observers: ObserverList,
    self_ref: Weak<CombinedParameterProvider>,
}

impl CombinedParameterProvider {
    pub fn new(providers: Vec<Rc<dyn ParameterProvider>>) -> Rc<Self> {
        let combined = Rc::new_cyclic(|self_ref: &Weak<Self>| Self {
            providers,
            observers: ObserverList::new(),
            self_ref: self_ref.clone(),
        });
        let as_observer: Weak<dyn ParametersObserver> = combined.self_ref.clone();
        for provider in &combined.providers {
            provider.add_parameters_observer(as_observer.clone());
        }
        combined
    }
}

impl ParametersObserver for CombinedParameterProvider {
    fn parameters_adjusted(&self) {
        self.observers.notify();
    }
}

impl ParameterProvider for CombinedParameterProvider {
    fn size(&self) -> usize {
        self.providers.iter().map(|p| p.size()).sum()
    }

    fn get(&self, index: usize) -> Rc<dyn Parameter> {
        let mut offset = index;
        for provider in &self.providers {
            let size = provider.size();
            if offset < size {
                return provider.get(offset);
            }
            offset -= size;
        }
        empty_parameter()
    }

    fn add_parameters_observer(&self, observer: Weak<dyn ParametersObserver>) {
        self.observers.add(observer);
    }

    fn remove_parameters_observer(&self, observer: &Weak<dyn ParametersObserver>) {
        self.observers.remove(observer);
    }
}
