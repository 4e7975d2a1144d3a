//! Per-call object identity bookkeeping.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use graft_utils::hash::HashMap;

// -----------------------------------------------------------------------------
// RefId

/// A small integer naming one live object (serialize side) or one emitted
/// node (revive side) within a single call.
///
/// Ids are assigned on first encounter, counting up from `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefId(pub u32);

impl RefId {
    /// Returns the raw id.
    #[inline(always)]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RefId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u32> for RefId {
    #[inline(always)]
    fn from(value: u32) -> Self {
        Self(value)
    }
}

// -----------------------------------------------------------------------------
// Visit

/// Outcome of [`IdentityTracker::visit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// First time this allocation is seen in the current call.
    New(RefId),
    /// The allocation was seen before and already owns this id.
    Seen(RefId),
}

impl Visit {
    /// The id, regardless of whether it was just assigned.
    #[inline]
    pub const fn id(self) -> RefId {
        match self {
            Visit::New(id) | Visit::Seen(id) => id,
        }
    }

    #[inline]
    pub const fn is_new(self) -> bool {
        matches!(self, Visit::New(_))
    }
}

// -----------------------------------------------------------------------------
// IdentityTracker

/// Assigns stable ids to shared allocations by address.
///
/// The tracker never touches the tracked values and never keeps them alive:
/// it only holds [`Weak`] anchors, which pin the allocation (not the value)
/// so that an address cannot be reused by another object while the tracker
/// lives.
///
/// Create one per call and drop it on return.
///
/// ```
/// use std::rc::Rc;
/// use graft_serial::identity::{IdentityTracker, RefId, Visit};
///
/// let a = Rc::new(1_u8);
/// let b = Rc::new(1_u8);
///
/// let mut tracker = IdentityTracker::new();
/// assert_eq!(tracker.visit(&a), Visit::New(RefId(0)));
/// assert_eq!(tracker.visit(&b), Visit::New(RefId(1)));
/// assert_eq!(tracker.visit(&a.clone()), Visit::Seen(RefId(0)));
/// ```
#[derive(Default)]
pub struct IdentityTracker {
    next: u32,
    ids: HashMap<usize, RefId>,
    anchors: Vec<Weak<dyn Any>>,
}

impl IdentityTracker {
    /// Creates an empty tracker whose first id will be `0`.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    fn address<T: Any>(rc: &Rc<T>) -> usize {
        Rc::as_ptr(rc).addr()
    }

    /// Returns the id of `rc`, assigning the next one on first encounter.
    pub fn visit<T: Any>(&mut self, rc: &Rc<T>) -> Visit {
        let address = Self::address(rc);
        if let Some(id) = self.ids.get(&address) {
            return Visit::Seen(*id);
        }

        let id = RefId(self.next);
        self.next += 1;
        self.ids.insert(address, id);
        self.anchors.push(Rc::downgrade(rc) as Weak<dyn Any>);
        log::trace!("assigned ref id {id} to {}", core::any::type_name::<T>());
        Visit::New(id)
    }

    /// Returns the id of `rc` if it has been visited.
    #[inline]
    pub fn get<T: Any>(&self, rc: &Rc<T>) -> Option<RefId> {
        self.ids.get(&Self::address(rc)).copied()
    }

    /// Returns `true` if `rc` has been visited.
    #[inline]
    pub fn contains<T: Any>(&self, rc: &Rc<T>) -> bool {
        self.ids.contains_key(&Self::address(rc))
    }

    /// Number of distinct allocations seen so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl fmt::Debug for IdentityTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityTracker")
            .field("next", &self.next)
            .field("len", &self.ids.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
