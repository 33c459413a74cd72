//! Surface profile schema and loader
//!
//! Configuration is stored as YAML.
//! Default location: <config dir>/surface/surface.yaml

use crate::hardware::ButtonId;
use crate::mode::Modes;
use crate::view::Views;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root surface configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Human-readable surface name
    pub name: String,

    /// Number of extender units next to the main unit
    pub extenders: usize,

    /// Knobs/faders per unit
    pub controls_per_unit: usize,

    /// Mode activated by `set_active(None)`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_mode: Option<Modes>,

    /// View activated by `set_active(None)`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_view: Option<Views>,

    /// Buttons present on every unit
    pub buttons: Vec<ButtonId>,

    /// Modifiers in provider priority order (first held wins)
    pub modifier_priority: Vec<ButtonId>,

    /// Modifier that turns item navigation into page navigation
    pub alternative_function: ButtonId,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            name: "Surface".to_string(),
            extenders: 0,
            controls_per_unit: 8,
            default_mode: None,
            default_view: None,
            buttons: vec![ButtonId::Shift, ButtonId::Select, ButtonId::Delete],
            modifier_priority: vec![ButtonId::Shift, ButtonId::Select],
            alternative_function: ButtonId::Shift,
        }
    }
}

impl SurfaceConfig {
    /// Total number of units (main unit plus extenders)
    pub fn unit_count(&self) -> usize {
        1 + self.extenders
    }

    /// All buttons a unit needs: the configured ones plus every modifier
    pub fn required_buttons(&self) -> Vec<ButtonId> {
        let mut buttons = self.buttons.clone();
        for id in self
            .modifier_priority
            .iter()
            .chain(std::iter::once(&self.alternative_function))
        {
            if !buttons.contains(id) {
                buttons.push(*id);
            }
        }
        buttons
    }

    /// Priority of a modifier; unlisted modifiers sort last
    pub fn modifier_rank(&self, id: ButtonId) -> usize {
        self.modifier_priority
            .iter()
            .position(|m| *m == id)
            .unwrap_or(self.modifier_priority.len())
    }
}

/// Get the default surface config file path
///
/// Returns: <config dir>/surface/surface.yaml
pub fn default_surface_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("surface")
        .join("surface.yaml")
}

/// Load surface configuration from a YAML file
///
/// If the file doesn't exist, returns the default config.
/// If the file exists but is invalid, logs a warning and returns the default config.
pub fn load_surface_config(path: &Path) -> SurfaceConfig {
    log::info!("load_surface_config: Loading from {:?}", path);

    if !path.exists() {
        log::info!("load_surface_config: Config file doesn't exist, using defaults");
        return SurfaceConfig::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<SurfaceConfig>(&contents) {
            Ok(config) => {
                log::info!(
                    "load_surface_config: Loaded '{}' ({} unit(s), {} controls each)",
                    config.name,
                    config.unit_count(),
                    config.controls_per_unit
                );
                config
            }
            Err(e) => {
                log::warn!("load_surface_config: Failed to parse config: {}", e);
                SurfaceConfig::default()
            }
        },
        Err(e) => {
            log::warn!("load_surface_config: Failed to read config file: {}", e);
            SurfaceConfig::default()
        }
    }
}

/// Save surface configuration to a YAML file
///
/// Creates parent directories if they don't exist.
pub fn save_surface_config(config: &SurfaceConfig, path: &Path) -> anyhow::Result<()> {
    use anyhow::Context;

    log::info!("save_surface_config: Saving to {:?}", path);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let yaml =
        serde_yaml::to_string(config).context("Failed to serialize surface config to YAML")?;

    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write surface config file: {:?}", path))?;

    log::info!("save_surface_config: Config saved successfully");
    Ok(())
}
