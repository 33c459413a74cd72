//! Views: feature groups for pad grids
//!
//! Besides the shared activation state machine, the view manager remembers
//! which view was last used on each track position, so selecting a track can
//! bring back its view (drums on the drum track, a keyboard on the synth).

use crate::error::SurfaceResult;
use crate::feature_group::{FeatureGroup, FeatureGroupManager};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Deref;
use std::rc::Rc;

/// View identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Views {
    Play,
    Chords,
    Piano,
    Drum,
    Drum4,
    Drum8,
    Drum64,
    Sequencer,
    Raindrops,
    PolySequencer,
    Session,
    ScenePlay,
    Clip,
    Track,
    TrackSelect,
    TrackMute,
    TrackSolo,
    TrackRecArm,
    TrackStop,
    Device,
    Browser,
    Control,
    Shift,
    Tempo,
    Shuffle,
    ProgramChange,
    RepeatNote,
    Palette,
}

impl Views {
    /// Views playing notes live on the grid
    pub fn is_note_view(self) -> bool {
        matches!(self, Self::Play | Self::Chords | Self::Piano | Self::Drum64)
    }

    /// Views editing notes in a clip
    pub fn is_sequencer_view(self) -> bool {
        matches!(
            self,
            Self::Sequencer
                | Self::Raindrops
                | Self::PolySequencer
                | Self::Drum
                | Self::Drum4
                | Self::Drum8
        )
    }

    pub fn is_drum_view(self) -> bool {
        matches!(self, Self::Drum | Self::Drum4 | Self::Drum8 | Self::Drum64)
    }

    /// Views whose buttons act on the tracks of the bank
    pub fn is_track_view(self) -> bool {
        matches!(
            self,
            Self::TrackSelect
                | Self::TrackMute
                | Self::TrackSolo
                | Self::TrackRecArm
                | Self::TrackStop
        )
    }
}

/// A feature group governing the pad grid
pub trait View: FeatureGroup {
    /// A grid pad was hit (velocity 0 = release)
    fn on_grid_note(&self, _note: u8, _velocity: u8) {}

    /// Recompute which notes the pads send, e.g. after a scale change
    fn update_note_mapping(&self) {}
}

/// Manager for the pad grid family
pub struct ViewManager {
    views: Rc<FeatureGroupManager<Views, dyn View>>,
    preferred_views: RefCell<HashMap<usize, Views>>,
}

impl Default for ViewManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewManager {
    pub fn new() -> Self {
        Self {
            views: Rc::new(FeatureGroupManager::new()),
            preferred_views: RefCell::new(HashMap::new()),
        }
    }

    /// The underlying manager, for sibling wiring
    pub fn manager(&self) -> &Rc<FeatureGroupManager<Views, dyn View>> {
        &self.views
    }

    /// Remember the view to use for a track position
    pub fn set_preferred_view(&self, position: usize, view: Views) {
        log::debug!("ViewManager: Preferred view for track {} is {:?}", position, view);
        self.preferred_views.borrow_mut().insert(position, view);
    }

    pub fn preferred_view(&self, position: usize) -> Option<Views> {
        self.preferred_views.borrow().get(&position).copied()
    }

    /// Remember the current (non-temporary) view for a track position
    pub fn remember_active_view(&self, position: usize) {
        if let Some(view) = self.views.active_id_ignoring_temporary() {
            self.set_preferred_view(position, view);
        }
    }

    /// Activate the remembered view of a track position
    ///
    /// Returns false if nothing is remembered for the position or the view
    /// is not registered.
    pub fn activate_preferred_view(&self, position: usize) -> SurfaceResult<bool> {
        match self.preferred_view(position) {
            Some(view) if self.views.is_registered(view) => {
                self.views.set_active(Some(view))?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl Deref for ViewManager {
    type Target = FeatureGroupManager<Views, dyn View>;

    fn deref(&self) -> &Self::Target {
        &self.views
    }
}
