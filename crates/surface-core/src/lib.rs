//! Mode/view activation and parameter binding for hardware control surfaces
//!
//! This crate provides:
//! - Feature group managers with default, previous and temporary activation
//! - Mode and view managers that stay in lockstep across a main unit and its extenders
//! - Parameter binding modes that rebind knobs/faders while modifier buttons are held
//! - Parameter providers, banks and button combinations as hardware-agnostic seams
//! - YAML surface profiles
//!
//! # Architecture
//!
//! ```text
//! button press → ButtonHandler → ParameterBindingMode::bind_controls → Control::bind
//!                                        ▲
//! mode button → ModeManager::set_active ─┘  (on_activate / on_deactivate)
//!                     │
//!                     └─► sibling managers (one hop) → change listeners
//! ```
//!
//! Everything runs on the single control-surface event thread. Managers and
//! modes use interior mutability so that callbacks may call back into them.

mod bank;
mod combo;
mod config;
mod error;
mod feature_group;
mod hardware;
mod mode;
mod parameter;
mod parameter_mode;
mod scheduler;
mod units;
mod view;

#[cfg(test)]
mod testing;

pub use bank::{Bank, BankItem};
pub use combo::ButtonCombos;
pub use config::{
    default_surface_config_path, load_surface_config, save_surface_config, SurfaceConfig,
};
pub use error::{SurfaceError, SurfaceResult};
pub use feature_group::{
    connect_siblings, Activation, ChangeListener, FeatureGroup, FeatureGroupManager,
};
pub use hardware::{
    Button, ButtonEvent, ButtonHandler, ButtonId, ButtonLookup, ButtonRegistry, Control,
    VirtualButton, VirtualControl,
};
pub use mode::{Mode, ModeManager, Modes};
pub use parameter::{
    CombinedParameterProvider, EmptyParameter, EmptyParameterProvider, FixedParameterProvider,
    ObserverList, Parameter, ParameterProvider, ParametersObserver,
};
pub use parameter_mode::ParameterBindingMode;
pub use scheduler::TaskQueue;
pub use units::{SurfaceUnit, SurfaceUnits};
pub use view::{View, ViewManager, Views};
