//! Modes: feature groups for knob/fader banks

use crate::feature_group::{FeatureGroup, FeatureGroupManager};
use serde::{Deserialize, Serialize};

/// Mode identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modes {
    Track,
    TrackDetails,
    Volume,
    Pan,
    Crossfader,
    Send1,
    Send2,
    Send3,
    Send4,
    Send5,
    Send6,
    Send7,
    Send8,
    Master,
    DeviceParams,
    DeviceChains,
    DevicePresets,
    DeviceLayer,
    DeviceLayerVolume,
    DeviceLayerPan,
    DeviceLayerSend1,
    DeviceLayerSend2,
    DeviceLayerSend3,
    DeviceLayerSend4,
    DeviceLayerSend5,
    DeviceLayerSend6,
    DeviceLayerSend7,
    DeviceLayerSend8,
    Browser,
    Clip,
    Note,
    Markers,
    Scales,
    ScaleLayout,
    Automation,
    Transport,
    Groove,
    RepeatNote,
    Accent,
    FixedLength,
    Session,
    Project,
    User,
}

const SENDS: [Modes; 8] = [
    Modes::Send1,
    Modes::Send2,
    Modes::Send3,
    Modes::Send4,
    Modes::Send5,
    Modes::Send6,
    Modes::Send7,
    Modes::Send8,
];

const LAYER_SENDS: [Modes; 8] = [
    Modes::DeviceLayerSend1,
    Modes::DeviceLayerSend2,
    Modes::DeviceLayerSend3,
    Modes::DeviceLayerSend4,
    Modes::DeviceLayerSend5,
    Modes::DeviceLayerSend6,
    Modes::DeviceLayerSend7,
    Modes::DeviceLayerSend8,
];

impl Modes {
    /// Send mode for send slot `index` (0-7)
    pub fn send(index: usize) -> Option<Self> {
        SENDS.get(index).copied()
    }

    /// Device layer send mode for send slot `index` (0-7)
    pub fn device_layer_send(index: usize) -> Option<Self> {
        LAYER_SENDS.get(index).copied()
    }

    /// Send slot of a (layer) send mode
    pub fn send_index(self) -> Option<usize> {
        SENDS
            .iter()
            .position(|m| *m == self)
            .or_else(|| LAYER_SENDS.iter().position(|m| *m == self))
    }

    pub fn is_send_mode(self) -> bool {
        SENDS.contains(&self)
    }

    /// Modes whose parameters follow the track bank
    pub fn is_track_mode(self) -> bool {
        matches!(
            self,
            Self::Track | Self::Volume | Self::Pan | Self::Crossfader
        ) || self.is_send_mode()
    }

    pub fn is_device_mode(self) -> bool {
        matches!(
            self,
            Self::DeviceParams | Self::DeviceChains | Self::DevicePresets
        )
    }

    /// Modes whose parameters follow the device layer bank
    pub fn is_layer_mode(self) -> bool {
        matches!(
            self,
            Self::DeviceLayer | Self::DeviceLayerVolume | Self::DeviceLayerPan
        ) || LAYER_SENDS.contains(&self)
    }
}

/// A feature group governing a bank of knobs or faders
///
/// Navigation defaults to no-ops so modes without a bank need not implement it.
pub trait Mode: FeatureGroup {
    /// A knob or fader moved
    fn on_knob_value(&self, _index: usize, _value: i32) {}

    /// A touch-sensitive knob was touched or released
    fn on_knob_touch(&self, _index: usize, _touched: bool) {}

    /// Value to display for knob `index`
    fn knob_value(&self, _index: usize) -> Option<i32> {
        None
    }

    fn select_previous_item(&self) {}

    fn select_next_item(&self) {}

    fn select_previous_item_page(&self) {}

    fn select_next_item_page(&self) {}

    fn has_previous_item(&self) -> bool {
        false
    }

    fn has_next_item(&self) -> bool {
        false
    }

    fn has_previous_item_page(&self) -> bool {
        false
    }

    fn has_next_item_page(&self) -> bool {
        false
    }

    fn selected_item_name(&self) -> Option<String> {
        None
    }
}

/// Manager for the knob/fader family
pub type ModeManager = FeatureGroupManager<Modes, dyn Mode>;
