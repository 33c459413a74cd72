//! In-memory doubles shared by the unit tests

use crate::bank::{Bank, BankItem};
use crate::feature_group::FeatureGroup;
use crate::mode::Mode;
use crate::parameter::{
    EmptyParameter, ObserverList, Parameter, ParameterProvider, ParametersObserver,
};
use crate::view::View;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Ordered record of activation callbacks ("+name" / "-name")
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Rc<RefCell<Vec<String>>>,
}

impl CallLog {
    pub fn push(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    /// Return and clear the recorded calls
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }
}

/// Group that only records its callbacks
pub struct TestGroup {
    name: String,
    log: CallLog,
}

impl TestGroup {
    pub fn new(name: &str, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
        }
    }
}

impl FeatureGroup for TestGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_activate(&self) {
        self.log.push(format!("+{}", self.name));
    }

    fn on_deactivate(&self) {
        self.log.push(format!("-{}", self.name));
    }
}

impl Mode for TestGroup {}

impl View for TestGroup {}

pub struct TestParameter {
    name: String,
    value: Cell<i32>,
    touched: Cell<bool>,
}

impl TestParameter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: Cell::new(0),
            touched: Cell::new(false),
        }
    }

    pub fn is_touched(&self) -> bool {
        self.touched.get()
    }
}

impl Parameter for TestParameter {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn value(&self) -> i32 {
        self.value.get()
    }

    fn set_value(&self, value: i32) {
        self.value.set(value);
    }

    fn change_value(&self, delta: i32) {
        self.value.set(self.value.get() + delta);
    }

    fn reset_value(&self) {
        self.value.set(0);
    }

    fn touch_value(&self, touched: bool) {
        self.touched.set(touched);
    }
}

/// `count` parameters named "<prefix> 1" .. "<prefix> <count>"
pub fn test_parameters(prefix: &str, count: usize) -> Vec<Rc<dyn Parameter>> {
    (0..count)
        .map(|i| Rc::new(TestParameter::new(&format!("{} {}", prefix, i + 1))) as Rc<dyn Parameter>)
        .collect()
}

#[derive(Default)]
pub struct CountingObserver {
    count: Cell<usize>,
}

impl CountingObserver {
    pub fn count(&self) -> usize {
        self.count.get()
    }
}

impl ParametersObserver for CountingObserver {
    fn parameters_adjusted(&self) {
        self.count.set(self.count.get() + 1);
    }
}

/// Provider whose parameters can be swapped, like a bank page scroll
pub struct SwitchableProvider {
    parameters: RefCell<Vec<Rc<dyn Parameter>>>,
    observers: ObserverList,
}

impl SwitchableProvider {
    pub fn new(parameters: Vec<Rc<dyn Parameter>>) -> Self {
        Self {
            parameters: RefCell::new(parameters),
            observers: ObserverList::new(),
        }
    }

    pub fn replace(&self, index: usize, parameter: Rc<dyn Parameter>) {
        self.parameters.borrow_mut()[index] = parameter;
        self.observers.notify();
    }
}

impl ParameterProvider for SwitchableProvider {
    fn size(&self) -> usize {
        self.parameters.borrow().len()
    }

    fn get(&self, index: usize) -> Rc<dyn Parameter> {
        self.parameters
            .borrow()
            .get(index)
            .cloned()
            .unwrap_or_else(|| Rc::new(EmptyParameter))
    }

    fn add_parameters_observer(&self, observer: Weak<dyn ParametersObserver>) {
        self.observers.add(observer);
    }

    fn remove_parameters_observer(&self, observer: &Weak<dyn ParametersObserver>) {
        self.observers.remove(observer);
    }
}

struct ListState {
    items: Vec<String>,
    page_size: usize,
    scroll: Cell<usize>,
    selected: Cell<Option<usize>>,
}

/// Bank over a list of names with a movable page window
pub struct ListBank {
    state: Rc<ListState>,
}

impl ListBank {
    pub fn new(items: &[&str], page_size: usize) -> Self {
        Self {
            state: Rc::new(ListState {
                items: items.iter().map(|s| s.to_string()).collect(),
                page_size,
                scroll: Cell::new(0),
                selected: Cell::new(None),
            }),
        }
    }

    pub fn select(&self, position: usize) {
        self.state.selected.set(Some(position));
    }

    pub fn selected_position(&self) -> Option<usize> {
        self.state.selected.get()
    }

    pub fn scroll_position(&self) -> usize {
        self.state.scroll.get()
    }

    fn len(&self) -> usize {
        self.state.items.len()
    }
}

struct ListItem {
    state: Rc<ListState>,
    index: usize,
}

impl ListItem {
    fn absolute(&self) -> usize {
        self.state.scroll.get() + self.index
    }
}

impl BankItem for ListItem {
    fn index(&self) -> usize {
        self.index
    }

    fn position(&self) -> usize {
        self.absolute()
    }

    fn name(&self) -> String {
        self.state
            .items
            .get(self.absolute())
            .cloned()
            .unwrap_or_default()
    }

    fn does_exist(&self) -> bool {
        self.absolute() < self.state.items.len()
    }

    fn is_selected(&self) -> bool {
        self.state.selected.get() == Some(self.absolute())
    }

    fn select(&self) {
        self.state.selected.set(Some(self.absolute()));
    }
}

impl Bank for ListBank {
    fn page_size(&self) -> usize {
        self.state.page_size
    }

    fn item(&self, index: usize) -> Option<Rc<dyn BankItem>> {
        if index >= self.state.page_size {
            return None;
        }
        Some(Rc::new(ListItem {
            state: Rc::clone(&self.state),
            index,
        }))
    }

    fn select_previous_item(&self) {
        let scroll = self.state.scroll.get();
        match self.state.selected.get() {
            Some(selected) if selected > 0 => {
                self.state.selected.set(Some(selected - 1));
                if selected - 1 < scroll {
                    self.state
                        .scroll
                        .set(scroll.saturating_sub(self.state.page_size));
                }
            }
            Some(_) => {}
            None => self.state.selected.set(Some(scroll)),
        }
    }

    fn select_next_item(&self) {
        let scroll = self.state.scroll.get();
        match self.state.selected.get() {
            Some(selected) if selected + 1 < self.len() => {
                self.state.selected.set(Some(selected + 1));
                if selected + 1 >= scroll + self.state.page_size {
                    self.state.scroll.set(scroll + self.state.page_size);
                }
            }
            Some(_) => {}
            None => self.state.selected.set(Some(scroll)),
        }
    }

    fn select_previous_page(&self) {
        if self.can_scroll_page_backwards() {
            let scroll = self.state.scroll.get();
            self.state
                .scroll
                .set(scroll.saturating_sub(self.state.page_size));
        }
    }

    fn select_next_page(&self) {
        if self.can_scroll_page_forwards() {
            let scroll = self.state.scroll.get();
            self.state.scroll.set(scroll + self.state.page_size);
        }
    }

    fn can_scroll_backwards(&self) -> bool {
        match self.state.selected.get() {
            Some(selected) => selected > 0,
            None => self.state.scroll.get() > 0,
        }
    }

    fn can_scroll_forwards(&self) -> bool {
        match self.state.selected.get() {
            Some(selected) => selected + 1 < self.len(),
            None => self.state.scroll.get() + self.state.page_size < self.len(),
        }
    }

    fn can_scroll_page_backwards(&self) -> bool {
        self.state.scroll.get() > 0
    }

    fn can_scroll_page_forwards(&self) -> bool {
        self.state.scroll.get() + self.state.page_size < self.len()
    }

    fn scroll_to(&self, position: usize) {
        if position < self.len() {
            self.state.scroll.set(position);
        }
    }
}
