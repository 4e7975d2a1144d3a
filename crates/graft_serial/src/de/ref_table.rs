use graft_utils::hash::HashMap;

use crate::error::SerialError;
use crate::identity::RefId;
use crate::value::Value;

/// Values revived from records that carried a `__refId`, by id.
///
/// Slots are filled during the construct pass and read during the patch
/// pass. A table lives for one revive call.
#[derive(Debug, Default)]
pub struct RefTable {
    slots: HashMap<RefId, Value>,
}

impl RefTable {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the value defined under `ref_id`.
    ///
    /// A later definition of the same id replaces the earlier one.
    pub fn define(&mut self, ref_id: RefId, value: Value) {
        log::trace!("defined ref id {ref_id}");
        if self.slots.insert(ref_id, value).is_some() {
            log::warn!("ref id {ref_id} is defined more than once, the last definition wins");
        }
    }

    #[inline]
    pub fn get(&self, ref_id: RefId) -> Option<&Value> {
        self.slots.get(&ref_id)
    }

    /// Returns the value defined under `ref_id`, or [`SerialError::DanglingReference`].
    pub fn resolve(&self, ref_id: RefId) -> Result<Value, SerialError> {
        self.slots
            .get(&ref_id)
            .cloned()
            .ok_or(SerialError::DanglingReference { ref_id })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
