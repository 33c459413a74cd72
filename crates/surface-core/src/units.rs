//! Main unit plus extenders as one logical surface
//!
//! ```text
//! ┌────────┐   ┌────────────┐   ┌────────────┐
//! │  Main  │◄─►│ Extender 1 │◄─►│ Extender 2 │   modes: sibling clique
//! └────────┘   └────────────┘   └────────────┘   views: sibling clique
//! ```
//!
//! Each unit has its own buttons, controls, mode manager and view manager.
//! Switching a mode or view on any unit switches it on all of them.

use crate::bank::Bank;
use crate::config::SurfaceConfig;
use crate::error::SurfaceResult;
use crate::feature_group::connect_siblings;
use crate::hardware::{ButtonId, ButtonLookup, ButtonRegistry, Control, VirtualControl};
use crate::mode::{Mode, ModeManager, Modes};
use crate::parameter::ParameterProvider;
use crate::parameter_mode::ParameterBindingMode;
use crate::view::{View, ViewManager, Views};
use std::rc::Rc;

/// One physical controller unit
pub struct SurfaceUnit {
    /// 0 = main unit, 1.. = extenders
    pub index: usize,
    pub buttons: Rc<ButtonRegistry>,
    pub controls: Vec<Rc<VirtualControl>>,
    pub modes: Rc<ModeManager>,
    pub views: ViewManager,
}

impl SurfaceUnit {
    fn new(index: usize, config: &SurfaceConfig) -> Self {
        let buttons = Rc::new(ButtonRegistry::with_buttons(&config.required_buttons()));
        let controls = (0..config.controls_per_unit)
            .map(|_| Rc::new(VirtualControl::new()))
            .collect();

        Self {
            index,
            buttons,
            controls,
            modes: Rc::new(ModeManager::new()),
            views: ViewManager::new(),
        }
    }

    pub fn is_extender(&self) -> bool {
        self.index > 0
    }

    /// Controls of this unit as bindable handles
    pub fn control_handles(&self) -> Vec<Rc<dyn Control>> {
        self.controls
            .iter()
            .map(|c| Rc::clone(c) as Rc<dyn Control>)
            .collect()
    }
}

/// All units of a surface, kept in lockstep
pub struct SurfaceUnits {
    config: SurfaceConfig,
    units: Vec<SurfaceUnit>,
}

impl SurfaceUnits {
    pub fn from_config(config: &SurfaceConfig) -> Self {
        let units: Vec<SurfaceUnit> = (0..config.unit_count())
            .map(|index| SurfaceUnit::new(index, config))
            .collect();

        let modes: Vec<_> = units.iter().map(|u| Rc::clone(&u.modes)).collect();
        connect_siblings(&modes);
        let views: Vec<_> = units.iter().map(|u| Rc::clone(u.views.manager())).collect();
        connect_siblings(&views);

        log::info!(
            "SurfaceUnits: '{}' with {} extender(s), {} controls per unit",
            config.name,
            config.extenders,
            config.controls_per_unit
        );

        Self {
            config: config.clone(),
            units,
        }
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn main(&self) -> &SurfaceUnit {
        &self.units[0]
    }

    pub fn extenders(&self) -> &[SurfaceUnit] {
        &self.units[1..]
    }

    pub fn units(&self) -> &[SurfaceUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Register a mode on every unit, built per unit by `create`
    pub fn register_mode(&self, id: Modes, create: impl Fn(&SurfaceUnit) -> Rc<dyn Mode>) {
        for unit in &self.units {
            unit.modes.register(id, create(unit));
        }
    }

    /// Register a view on every unit, built per unit by `create`
    pub fn register_view(&self, id: Views, create: impl Fn(&SurfaceUnit) -> Rc<dyn View>) {
        for unit in &self.units {
            unit.views.register(id, create(unit));
        }
    }

    /// Create a parameter binding mode over a unit's controls
    ///
    /// Page-wise navigation follows the configured alternative function
    /// button of that unit.
    pub fn parameter_mode(
        &self,
        unit: &SurfaceUnit,
        name: &str,
        bank: Option<Rc<dyn Bank>>,
    ) -> Rc<ParameterBindingMode> {
        let mode = ParameterBindingMode::new(
            name,
            Rc::clone(&unit.buttons) as Rc<dyn ButtonLookup>,
            unit.control_handles(),
            bank,
        );
        let buttons = Rc::clone(&unit.buttons);
        let alternative = self.config.alternative_function;
        mode.set_alternative_function(move || buttons.is_pressed(alternative));
        mode
    }

    /// Register providers on a mode, modifiers ordered by configured priority
    pub fn set_parameter_providers(
        &self,
        mode: &ParameterBindingMode,
        default: Option<Rc<dyn ParameterProvider>>,
        mut alternates: Vec<(ButtonId, Rc<dyn ParameterProvider>)>,
    ) -> SurfaceResult<()> {
        if let Some(default) = default {
            mode.set_parameter_provider(None, default)?;
        }
        alternates.sort_by_key(|(id, _)| self.config.modifier_rank(*id));
        for (id, provider) in alternates {
            mode.set_parameter_provider(Some(id), provider)?;
        }
        Ok(())
    }

    /// Set the configured default mode and view on every unit and activate them
    ///
    /// Call after registering the groups. Activation runs on the main unit;
    /// the extenders follow as siblings.
    pub fn activate_defaults(&self) -> SurfaceResult<()> {
        for unit in &self.units {
            if let Some(mode) = self.config.default_mode {
                unit.modes.set_default_id(mode)?;
            }
            if let Some(view) = self.config.default_view {
                unit.views.set_default_id(view)?;
            }
        }

        let main = self.main();
        if main.modes.default_id().is_some() {
            main.modes.set_active(None)?;
        }
        if main.views.default_id().is_some() {
            main.views.set_active(None)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SurfaceError;
    use crate::feature_group::FeatureGroup;
    use crate::parameter::{FixedParameterProvider, Parameter};
    use crate::testing::{test_parameters, CallLog, ListBank, TestGroup};

    fn config(extenders: usize) -> SurfaceConfig {
        SurfaceConfig {
            name: "Test".to_string(),
            extenders,
            controls_per_unit: 4,
            default_mode: Some(Modes::Volume),
            default_view: Some(Views::Play),
            ..SurfaceConfig::default()
        }
    }

    fn fixed(parameters: Vec<Rc<dyn Parameter>>) -> Rc<dyn ParameterProvider> {
        Rc::new(FixedParameterProvider::new(parameters))
    }

    fn register_test_groups(units: &SurfaceUnits, log: &CallLog) {
        let modes = [
            (Modes::Volume, "Volume"),
            (Modes::Pan, "Pan"),
            (Modes::Browser, "Browser"),
        ];
        for (id, name) in modes {
            units.register_mode(id, |unit| {
                Rc::new(TestGroup::new(&format!("{}{}", name, unit.index), log)) as Rc<dyn Mode>
            });
        }
        for (id, name) in [(Views::Play, "Play"), (Views::Session, "Session")] {
            units.register_view(id, |unit| {
                Rc::new(TestGroup::new(&format!("{}{}", name, unit.index), log)) as Rc<dyn View>
            });
        }
    }

    #[test]
    fn test_units_from_config() {
        let units = SurfaceUnits::from_config(&config(2));
        assert_eq!(units.len(), 3);
        assert!(!units.main().is_extender());
        assert_eq!(units.extenders().len(), 2);
        assert!(units.extenders().iter().all(|u| u.is_extender()));
        for unit in units.units() {
            assert_eq!(unit.controls.len(), 4);
            assert!(unit.buttons.button(ButtonId::Shift).is_some());
            assert_eq!(unit.modes.default_id(), None);
        }
    }

    #[test]
    fn test_defaults_follow_on_extenders() {
        let log = CallLog::default();
        let units = SurfaceUnits::from_config(&config(2));
        register_test_groups(&units, &log);

        units.activate_defaults().unwrap();
        for unit in units.units() {
            assert_eq!(unit.modes.default_id(), Some(Modes::Volume));
            assert_eq!(unit.modes.active_id(), Some(Modes::Volume));
            assert_eq!(unit.views.active_id(), Some(Views::Play));
        }
        assert_eq!(log.take().len(), 6);
    }

    #[test]
    fn test_extender_drives_main_unit() {
        let log = CallLog::default();
        let units = SurfaceUnits::from_config(&config(2));
        register_test_groups(&units, &log);
        units.activate_defaults().unwrap();
        log.take();

        // Each unit sees exactly one activation cycle
        units.extenders()[1].modes.set_temporary(Modes::Browser).unwrap();
        let mut calls = log.take();
        calls.sort();
        assert_eq!(
            calls,
            vec!["+Browser0", "+Browser1", "+Browser2", "-Volume0", "-Volume1", "-Volume2"]
        );

        units.main().modes.restore().unwrap();
        for unit in units.units() {
            assert_eq!(unit.modes.active_id(), Some(Modes::Volume));
            assert!(!unit.modes.is_temporary());
        }
    }

    #[test]
    fn test_activate_defaults_without_defaults() {
        let units = SurfaceUnits::from_config(&SurfaceConfig::default());
        units.activate_defaults().unwrap();
        assert_eq!(units.main().modes.active_id(), None);
        assert_eq!(units.main().modes.set_active(None), Err(SurfaceError::MissingDefaultGroup));
    }

    #[test]
    fn test_unregistered_default_is_rejected() {
        let log = CallLog::default();
        let units = SurfaceUnits::from_config(&SurfaceConfig {
            default_mode: Some(Modes::Clip),
            ..config(1)
        });
        register_test_groups(&units, &log);

        assert_eq!(
            units.activate_defaults(),
            Err(SurfaceError::UnknownGroup("Clip".to_string()))
        );
        assert_eq!(units.main().modes.active_id(), None);
        assert!(log.take().is_empty());
    }

    #[test]
    fn test_parameter_modes_per_unit() {
        let units = SurfaceUnits::from_config(&config(1));
        let volumes: Vec<Vec<Rc<dyn Parameter>>> = units
            .units()
            .iter()
            .map(|u| test_parameters(&format!("Vol{}", u.index), 4))
            .collect();
        let sends: Vec<Vec<Rc<dyn Parameter>>> = units
            .units()
            .iter()
            .map(|u| test_parameters(&format!("Send{}", u.index), 4))
            .collect();

        let modes: Vec<Rc<ParameterBindingMode>> = units
            .units()
            .iter()
            .map(|unit| {
                let mode = units.parameter_mode(unit, "Volume", None);
                units
                    .set_parameter_providers(
                        &mode,
                        Some(fixed(volumes[unit.index].clone())),
                        vec![(ButtonId::Shift, fixed(sends[unit.index].clone()))],
                    )
                    .unwrap();
                mode
            })
            .collect();
        for (unit, mode) in units.units().iter().zip(&modes) {
            unit.modes.register(Modes::Volume, Rc::clone(mode) as Rc<dyn Mode>);
        }

        units.main().modes.set_active(Some(Modes::Volume)).unwrap();
        for unit in units.units() {
            for (i, control) in unit.controls.iter().enumerate() {
                assert!(control.is_bound_to(&volumes[unit.index][i]));
            }
        }

        // Shift on the extender only rebinds the extender
        units.extenders()[0]
            .buttons
            .virtual_button(ButtonId::Shift)
            .unwrap()
            .press();
        assert!(units.extenders()[0].controls[0].is_bound_to(&sends[1][0]));
        assert!(units.main().controls[0].is_bound_to(&volumes[0][0]));
        assert_eq!(modes[1].name(), "Volume");
    }

    #[test]
    fn test_providers_registered_by_priority() {
        let config = SurfaceConfig {
            controls_per_unit: 2,
            modifier_priority: vec![ButtonId::Select, ButtonId::Shift],
            ..SurfaceConfig::default()
        };
        let units = SurfaceUnits::from_config(&config);
        let unit = units.main();
        let mode = units.parameter_mode(unit, "Device", None);
        let shift = test_parameters("Shift", 2);
        let select = test_parameters("Select", 2);
        units
            .set_parameter_providers(
                &mode,
                Some(fixed(test_parameters("D", 2))),
                vec![
                    (ButtonId::Shift, fixed(shift)),
                    (ButtonId::Select, fixed(select.clone())),
                ],
            )
            .unwrap();
        mode.on_activate();

        unit.buttons.virtual_button(ButtonId::Shift).unwrap().press();
        unit.buttons.virtual_button(ButtonId::Select).unwrap().press();
        assert!(unit.controls[0].is_bound_to(&select[0]));
    }

    #[test]
    fn test_parameter_mode_alternative_function() {
        let config = SurfaceConfig {
            controls_per_unit: 2,
            alternative_function: ButtonId::Select,
            ..SurfaceConfig::default()
        };
        let units = SurfaceUnits::from_config(&config);
        let unit = units.main();
        let bank = Rc::new(ListBank::new(&["a", "b", "c", "d"], 2));
        let mode = units.parameter_mode(unit, "Track", Some(Rc::clone(&bank) as Rc<dyn Bank>));

        unit.buttons.virtual_button(ButtonId::Select).unwrap().press();
        mode.select_next_item();
        assert_eq!(bank.scroll_position(), 2);
    }
}
