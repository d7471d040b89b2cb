//! Determinism utilities: the canonical party order.
//!
//! Every stage of the engine receives one `PartyUniverse` and uses it for two
//! things only:
//! - breaking ties (earlier registry position wins, then `PartyId` ascending),
//! - making output maps **total** (every party present, explicit zeros).
//!
//! Map iteration order is never consulted for tie-breaks.

use core::cmp::Ordering;
use std::collections::BTreeMap;

use crate::tokens::PartyId;

/// Canonical ordered set of party identifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartyUniverse {
    order: Vec<PartyId>,
    index: BTreeMap<PartyId, usize>,
}

impl PartyUniverse {
    /// Build from registry order. Duplicates keep their first position.
    pub fn from_registry<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = PartyId>,
    {
        let mut u = PartyUniverse::default();
        for id in ids {
            u.push(id);
        }
        u
    }

    /// Append ids that are not yet known, in ascending `PartyId` order.
    ///
    /// Used for parties that appear in vote or mandate inputs but not in the
    /// registry, so that they still receive a stable position.
    pub fn extended_with<'a, I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = &'a PartyId>,
    {
        let mut extra: Vec<&PartyId> = ids
            .into_iter()
            .filter(|id| !self.index.contains_key(*id))
            .collect();
        extra.sort();
        extra.dedup();
        for id in extra {
            self.push(id.clone());
        }
        self
    }

    fn push(&mut self, id: PartyId) {
        if !self.index.contains_key(&id) {
            self.index.insert(id.clone(), self.order.len());
            self.order.push(id);
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &PartyId) -> bool {
        self.index.contains_key(id)
    }

    /// Parties in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &PartyId> + '_ {
        self.order.iter()
    }

    pub fn as_slice(&self) -> &[PartyId] {
        &self.order
    }

    /// Registry position; unknown ids sort after every known id.
    pub fn position(&self, id: &PartyId) -> usize {
        self.index.get(id).copied().unwrap_or(usize::MAX)
    }

    /// Total order: registry position, then `PartyId` ascending.
    pub fn cmp_parties(&self, a: &PartyId, b: &PartyId) -> Ordering {
        self.position(a)
            .cmp(&self.position(b))
            .then_with(|| a.cmp(b))
    }

    /// A map with every party set to `T::default()`.
    pub fn zeroed<T: Default>(&self) -> BTreeMap<PartyId, T> {
        self.order.iter().map(|id| (id.clone(), T::default())).collect()
    }

    /// Copy `map` into a map that is total over this universe.
    /// Keys outside the universe are kept as well (nothing silently vanishes).
    pub fn total<T: Copy + Default>(&self, map: &BTreeMap<PartyId, T>) -> BTreeMap<PartyId, T> {
        let mut out = self.zeroed::<T>();
        for (k, v) in map {
            out.insert(k.clone(), *v);
        }
        out
    }
}
