//! Exclusive activation of feature groups (modes and views)
//!
//! A [`FeatureGroupManager`] owns a registry of groups keyed by an enumerated
//! ID and guarantees that exactly the effective group is active: every
//! `on_activate` is paired with an `on_deactivate` before another group
//! becomes effective.
//!
//! # States
//!
//! ```text
//!            set_active                set_temporary
//!   Idle ───────────────► Active ◄──────────────────► Temporary
//!     │                     ▲  │        restore           ▲
//!     └─────────────────────┼──┼──────────────────────────┘
//!                set_active │  │ restore (swap with previous)
//!                           └──┘
//! ```
//!
//! Managers of physically separate units (main unit plus extenders) are kept
//! in lockstep by connecting them as siblings. Every mutator takes a
//! `sync_siblings` flag that is cleared on the sibling call, so propagation
//! is exactly one hop deep regardless of how the siblings are connected.

use crate::error::{SurfaceError, SurfaceResult};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::rc::{Rc, Weak};

/// A unit of exclusive activation
pub trait FeatureGroup {
    fn name(&self) -> &str;

    fn on_activate(&self);

    fn on_deactivate(&self);
}

/// Activation state of a manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation<I> {
    /// No group chosen yet
    Idle { previous: Option<I> },
    /// A group is active
    Active { id: I, previous: Option<I> },
    /// A temporary group overrides `under` until restored
    Temporary {
        id: I,
        under: Option<I>,
        previous: Option<I>,
    },
}

impl<I: Copy> Default for Activation<I> {
    fn default() -> Self {
        Self::Idle { previous: None }
    }
}

impl<I: Copy> Activation<I> {
    /// The group that is actually active (temporary wins)
    pub fn effective(&self) -> Option<I> {
        match *self {
            Self::Idle { .. } => None,
            Self::Active { id, .. } | Self::Temporary { id, .. } => Some(id),
        }
    }

    /// The group that was set with `set_active`
    pub fn active_ignoring_temporary(&self) -> Option<I> {
        match *self {
            Self::Idle { .. } => None,
            Self::Active { id, .. } => Some(id),
            Self::Temporary { under, .. } => under,
        }
    }

    pub fn temporary(&self) -> Option<I> {
        match *self {
            Self::Temporary { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn previous(&self) -> Option<I> {
        match *self {
            Self::Idle { previous }
            | Self::Active { previous, .. }
            | Self::Temporary { previous, .. } => previous,
        }
    }

    fn with_previous(self, new_previous: Option<I>) -> Self {
        match self {
            Self::Idle { .. } => Self::Idle {
                previous: new_previous,
            },
            Self::Active { id, .. } => Self::Active {
                id,
                previous: new_previous,
            },
            Self::Temporary { id, under, .. } => Self::Temporary {
                id,
                under,
                previous: new_previous,
            },
        }
    }
}

/// Called with `(old effective ID, new effective ID)` after a change commits
pub type ChangeListener<I> = Rc<dyn Fn(Option<I>, Option<I>)>;

/// Registry and activation state machine for one family of feature groups
///
/// All methods take `&self`; state lives in `RefCell`s whose borrows are
/// released before any group callback, sibling or listener runs, so those
/// may query the manager re-entrantly.
pub struct FeatureGroupManager<I, G: ?Sized> {
    registry: RefCell<BTreeMap<I, Rc<G>>>,
    state: RefCell<Activation<I>>,
    default_id: RefCell<Option<I>>,
    siblings: RefCell<Vec<Weak<FeatureGroupManager<I, G>>>>,
    listeners: RefCell<Vec<ChangeListener<I>>>,
}

impl<I, G> Default for FeatureGroupManager<I, G>
where
    I: Copy + Ord + Debug,
    G: FeatureGroup + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<I, G> FeatureGroupManager<I, G>
where
    I: Copy + Ord + Debug,
    G: FeatureGroup + ?Sized,
{
    pub fn new() -> Self {
        Self {
            registry: RefCell::new(BTreeMap::new()),
            state: RefCell::new(Activation::default()),
            default_id: RefCell::new(None),
            siblings: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Register a group
    ///
    /// Has no effect on activation state. Registering an ID twice replaces
    /// the group.
    pub fn register(&self, id: I, group: Rc<G>) {
        log::debug!("FeatureGroupManager: Registered {:?} ({})", id, group.name());
        self.registry.borrow_mut().insert(id, group);
    }

    pub fn get(&self, id: I) -> Option<Rc<G>> {
        self.registry.borrow().get(&id).cloned()
    }

    /// Look up an ID by group name
    pub fn get_by_name(&self, name: &str) -> Option<I> {
        self.registry
            .borrow()
            .iter()
            .find(|(_, group)| group.name() == name)
            .map(|(id, _)| *id)
    }

    /// All registered IDs in key order
    pub fn ids(&self) -> Vec<I> {
        self.registry.borrow().keys().copied().collect()
    }

    pub fn is_registered(&self, id: I) -> bool {
        self.registry.borrow().contains_key(&id)
    }

    /// Fallback used by `set_active(None)`
    ///
    /// The group must already be registered.
    pub fn set_default_id(&self, id: I) -> SurfaceResult<()> {
        self.lookup(id)?;
        *self.default_id.borrow_mut() = Some(id);
        Ok(())
    }

    pub fn default_id(&self) -> Option<I> {
        *self.default_id.borrow()
    }

    /// Connect a sibling manager that mirrors every change of this one
    ///
    /// The connection is one-directional; connect both ways (or use
    /// [`connect_siblings`]) for a symmetric group.
    pub fn add_connected_manager_listener(&self, sibling: &Rc<Self>) {
        self.siblings.borrow_mut().push(Rc::downgrade(sibling));
    }

    pub fn add_change_listener(&self, listener: impl Fn(Option<I>, Option<I>) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Snapshot of the activation state
    pub fn activation(&self) -> Activation<I> {
        *self.state.borrow()
    }

    /// The effective group ID (temporary if set, else active)
    pub fn active_id(&self) -> Option<I> {
        self.state.borrow().effective()
    }

    pub fn active_id_ignoring_temporary(&self) -> Option<I> {
        self.state.borrow().active_ignoring_temporary()
    }

    /// The effective group
    pub fn active(&self) -> Option<Rc<G>> {
        self.active_id().and_then(|id| self.get(id))
    }

    pub fn previous_id(&self) -> Option<I> {
        self.state.borrow().previous()
    }

    pub fn is_temporary(&self) -> bool {
        self.state.borrow().temporary().is_some()
    }

    /// Check if any of the given IDs is the effective group
    pub fn is_active(&self, ids: &[I]) -> bool {
        match self.active_id() {
            Some(active) => ids.contains(&active),
            None => false,
        }
    }

    /// Activate a group, or the default group for `None`
    ///
    /// Clears any temporary group. Selecting the already effective group is
    /// a no-op without callbacks.
    pub fn set_active(&self, id: Option<I>) -> SurfaceResult<()> {
        self.set_active_synced(id, true)
    }

    fn set_active_synced(&self, id: Option<I>, sync_siblings: bool) -> SurfaceResult<()> {
        let id = match id.or(self.default_id()) {
            Some(id) => id,
            None => {
                log::warn!("FeatureGroupManager: set_active without an ID and no default");
                return Err(SurfaceError::MissingDefaultGroup);
            }
        };
        let new_group = self.lookup(id)?;

        let old = self.activation();
        let old_effective = old.effective();
        if old_effective == Some(id) {
            return Ok(());
        }
        if sync_siblings {
            self.check_siblings_accept(id)?;
        }

        self.deactivate(old_effective);
        let previous = old.active_ignoring_temporary();
        *self.state.borrow_mut() = Activation::Active { id, previous };
        log::debug!(
            "FeatureGroupManager: {:?} -> {:?} (previous {:?})",
            old_effective,
            id,
            previous
        );
        new_group.on_activate();

        if sync_siblings {
            for sibling in self.live_siblings() {
                sibling.set_active_synced(Some(id), false)?;
            }
        }
        self.notify(previous, Some(id));
        Ok(())
    }

    /// Temporarily override the active group until `restore()`
    ///
    /// The active and previous groups are kept.
    pub fn set_temporary(&self, id: I) -> SurfaceResult<()> {
        self.set_temporary_synced(id, true)
    }

    fn set_temporary_synced(&self, id: I, sync_siblings: bool) -> SurfaceResult<()> {
        let new_group = self.get(id).ok_or_else(|| {
            log::warn!("FeatureGroupManager: Temporary group {:?} is not registered", id);
            SurfaceError::MissingTemporaryGroup(format!("{:?}", id))
        })?;

        let old = self.activation();
        let old_effective = old.effective();
        if old_effective == Some(id) {
            return Ok(());
        }
        if sync_siblings {
            self.check_siblings_accept(id)?;
        }

        self.deactivate(old_effective);
        *self.state.borrow_mut() = Activation::Temporary {
            id,
            under: old.active_ignoring_temporary(),
            previous: old.previous(),
        };
        log::debug!("FeatureGroupManager: Temporary {:?} over {:?}", id, old_effective);
        new_group.on_activate();

        if sync_siblings {
            for sibling in self.live_siblings() {
                sibling.set_temporary_synced(id, false)?;
            }
        }
        self.notify(old_effective, Some(id));
        Ok(())
    }

    /// Undo the last temporary activation, or swap back to the previous group
    ///
    /// Does not update the previous ID, so a second `restore()` right after a
    /// swap is a no-op. An unregistered previous ID falls back to the default;
    /// without a usable target the active group stays. Siblings resolve their
    /// own fallback, so propagation cannot fail on them.
    pub fn restore(&self) -> SurfaceResult<()> {
        self.restore_synced(true)
    }

    fn restore_synced(&self, sync_siblings: bool) -> SurfaceResult<()> {
        let old = self.activation();
        let (old_id, new_id) = match old {
            Activation::Temporary {
                id,
                under,
                previous,
            } => {
                self.deactivate(Some(id));
                let target = self.fallback_to_default(under);
                *self.state.borrow_mut() = match target {
                    Some(target) => Activation::Active {
                        id: target,
                        previous,
                    },
                    None => Activation::Idle { previous },
                };
                (Some(id), target)
            }
            Activation::Active {
                id,
                previous: Some(previous),
            } if previous != id => {
                let target = match self.fallback_to_default(Some(previous)) {
                    Some(target) if target != id => target,
                    _ => return Ok(()),
                };
                self.deactivate(Some(id));
                *self.state.borrow_mut() = Activation::Active {
                    id: target,
                    previous: Some(previous),
                };
                (Some(id), Some(target))
            }
            Activation::Idle {
                previous: Some(previous),
            } => {
                let Some(target) = self.fallback_to_default(Some(previous)) else {
                    return Ok(());
                };
                *self.state.borrow_mut() = Activation::Active {
                    id: target,
                    previous: Some(previous),
                };
                (None, Some(target))
            }
            _ => return Ok(()),
        };

        log::debug!("FeatureGroupManager: Restored {:?} -> {:?}", old_id, new_id);
        if let Some(group) = new_id.and_then(|id| self.get(id)) {
            group.on_activate();
        }

        if sync_siblings {
            for sibling in self.live_siblings() {
                sibling.restore_synced(false)?;
            }
        }
        self.notify(old_id, new_id);
        Ok(())
    }

    /// Overwrite the previous ID (mirrored to siblings)
    pub fn set_previous_id(&self, id: Option<I>) {
        self.set_previous_id_synced(id, true);
    }

    fn set_previous_id_synced(&self, id: Option<I>, sync_siblings: bool) {
        let state = self.activation().with_previous(id);
        *self.state.borrow_mut() = state;
        if sync_siblings {
            for sibling in self.live_siblings() {
                sibling.set_previous_id_synced(id, false);
            }
        }
    }

    /// Check if `id` can become the effective group here
    pub fn can_accept(&self, id: I) -> bool {
        self.is_registered(id)
    }

    /// Fails before any state changes if a sibling lacks `id`
    fn check_siblings_accept(&self, id: I) -> SurfaceResult<()> {
        match self.live_siblings().iter().find(|s| !s.can_accept(id)) {
            Some(_) => {
                log::warn!("FeatureGroupManager: A sibling has no group {:?}", id);
                Err(SurfaceError::UnknownGroup(format!("{:?}", id)))
            }
            None => Ok(()),
        }
    }

    fn lookup(&self, id: I) -> SurfaceResult<Rc<G>> {
        self.get(id).ok_or_else(|| {
            log::warn!("FeatureGroupManager: Group {:?} is not registered", id);
            SurfaceError::UnknownGroup(format!("{:?}", id))
        })
    }

    /// `id` if still registered, else the default
    fn fallback_to_default(&self, id: Option<I>) -> Option<I> {
        match id {
            Some(id) if self.is_registered(id) => Some(id),
            _ => self.default_id().filter(|d| self.is_registered(*d)),
        }
    }

    fn deactivate(&self, id: Option<I>) {
        if let Some(group) = id.and_then(|id| self.get(id)) {
            group.on_deactivate();
        }
    }

    fn live_siblings(&self) -> Vec<Rc<Self>> {
        self.siblings
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }

    fn notify(&self, old: Option<I>, new: Option<I>) {
        let listeners: Vec<ChangeListener<I>> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(old, new);
        }
    }
}

/// Connect managers as a clique: each one mirrors every other
pub fn connect_siblings<I, G>(managers: &[Rc<FeatureGroupManager<I, G>>])
where
    I: Copy + Ord + Debug,
    G: FeatureGroup + ?Sized,
{
    for (i, manager) in managers.iter().enumerate() {
        for (j, sibling) in managers.iter().enumerate() {
            if i != j {
                manager.add_connected_manager_listener(sibling);
            }
        }
    }
}
