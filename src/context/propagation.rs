//! Propagation context snapshot.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::context::caller::CallingUnit;
use crate::context::keys::{PropagationKey, PropagationValue};
use crate::context::strand::MainStrandDetector;

/// The caller's propagated values, captured once per dispatch.
#[derive(Clone, Default)]
pub struct PropagationContext {
    values: HashMap<PropagationKey, PropagationValue>,
}

impl PropagationContext {
    /// Snapshot the caller's values for every propagated key.
    ///
    /// Keys the caller has no value for are left out. When the detector
    /// places the caller on the main strand, `MAIN_STRAND` is forced to
    /// `true` even if the caller already carried a value for it.
    pub fn capture<U: CallingUnit + ?Sized>(unit: &U, detector: &MainStrandDetector) -> Self {
        let mut values = HashMap::with_capacity(PropagationKey::ALL.len());
        for key in PropagationKey::ALL {
            if let Some(value) = unit.local(key) {
                values.insert(key, value);
            }
        }
        if detector.is_main_strand(unit) {
            values.insert(PropagationKey::MainStrand, Arc::new(true) as PropagationValue);
        }
        Self { values }
    }

    pub fn get(&self, key: PropagationKey) -> Option<&PropagationValue> {
        self.values.get(&key)
    }

    /// Typed view of a value, `None` if absent or of another type.
    pub fn get_as<T: 'static>(&self, key: PropagationKey) -> Option<&T> {
        self.values.get(&key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn contains(&self, key: PropagationKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Present keys, in capture order.
    pub fn keys(&self) -> Vec<PropagationKey> {
        PropagationKey::ALL
            .into_iter()
            .filter(|key| self.values.contains_key(key))
            .collect()
    }

    pub fn is_main_strand(&self) -> bool {
        self.get_as::<bool>(PropagationKey::MainStrand)
            .copied()
            .unwrap_or(false)
    }
}

impl fmt::Debug for PropagationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropagationContext")
            .field("keys", &self.keys())
            .finish()
    }
}
