//! Identifier values carried by a measurement, and the maps that hold them.
//!
//! `global_ids` are always single-valued: they are a hard filter on which journey a measurement
//! can join. `local_ids` may be multi-valued at a segmentation point, where the duck-typed
//! scalar-or-list field of the upstream tool becomes the [`IdValue`] tagged variant below.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

/// A single identifier value, or the several candidate values left by a segmentation fork.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IdValue {
    /// A resolved, unambiguous value.
    Single(u64),
    /// Several candidate values, in the order they were observed. Resolved to a `Single` the
    /// first time a successor's matching value is found among them.
    Multi(Vec<u64>),
}

impl IdValue {
    /// The value if already resolved, or the first candidate of a `Multi` (used only for
    /// display; matching always goes through [`IdValue::resolve_against`]).
    pub fn representative(&self) -> Option<u64> {
        match self {
            IdValue::Single(v) => Some(*v),
            IdValue::Multi(vs) => vs.first().copied(),
        }
    }

    /// True if `candidate` is consistent with this value: equal to it if `Single`, or present
    /// among the list if `Multi`.
    pub fn resolve_against(&self, candidate: u64) -> Option<IdValue> {
        match self {
            IdValue::Single(v) => (*v == candidate).then_some(IdValue::Single(*v)),
            IdValue::Multi(vs) => vs
                .iter()
                .find(|v| **v == candidate)
                .map(|v| IdValue::Single(*v)),
        }
    }

    /// Append a newly observed value, growing a `Single` into a `Multi` or extending one.
    pub fn push(&mut self, value: u64) {
        match self {
            IdValue::Single(existing) => {
                *self = IdValue::Multi(vec![*existing, value]);
            }
            IdValue::Multi(vs) => vs.push(value),
        }
    }
}

impl std::fmt::Display for IdValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdValue::Single(v) => write!(f, "{}", v),
            IdValue::Multi(vs) => write!(
                f,
                "[{}]",
                vs.iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            ),
        }
    }
}

/// A flat, single-valued identifier map (used for `properties` and `global_ids`).
pub type FlatIdMap = BTreeMap<String, u64>;

/// A possibly multi-valued identifier map (used for `local_ids`).
pub type LocalIdMap = BTreeMap<String, IdValue>;

/// Render a flat id map as `key=value` entries dot-joined, in key order.
///
/// ```
/// use latseq_core::ids::{dict_ids_to_str, FlatIdMap};
///
/// let mut ids = FlatIdMap::new();
/// ids.insert("rnti".to_string(), 1);
/// ids.insert("drb".to_string(), 2);
/// assert_eq!(dict_ids_to_str(&ids), "drb=2.rnti=1");
/// ```
pub fn dict_ids_to_str(ids: &FlatIdMap) -> String {
    ids.iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(".")
}

/// Render a local id map the same way, using each value's current (possibly unresolved) form.
pub fn local_ids_to_str(ids: &LocalIdMap) -> String {
    ids.iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_resolves_only_against_equal_value() {
        let v = IdValue::Single(3);
        assert_eq!(v.resolve_against(3), Some(IdValue::Single(3)));
        assert_eq!(v.resolve_against(4), None);
    }

    #[test]
    fn multi_resolves_against_member_and_collapses() {
        let v = IdValue::Multi(vec![3, 4]);
        assert_eq!(v.resolve_against(4), Some(IdValue::Single(4)));
        assert_eq!(v.resolve_against(5), None);
    }

    #[test]
    fn push_grows_single_into_multi() {
        let mut v = IdValue::Single(1);
        v.push(2);
        assert_eq!(v, IdValue::Multi(vec![1, 2]));
        v.push(3);
        assert_eq!(v, IdValue::Multi(vec![1, 2, 3]));
    }

    #[test]
    fn dict_ids_to_str_sorts_by_key() {
        let mut ids = FlatIdMap::new();
        ids.insert("rnti".to_string(), 1);
        ids.insert("drb".to_string(), 2);
        assert_eq!(dict_ids_to_str(&ids), "drb=2.rnti=1");
    }
}
