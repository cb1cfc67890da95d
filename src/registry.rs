use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::{any::Instance, config::ReplacePolicy, provider::Provider, token::Token};

/// Identity of a registry entry. Unique for the lifetime of the registry, including across resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct EntryId(u64);

pub(crate) struct Entry {
    pub(crate) id: EntryId,
    pub(crate) provider: Provider,
    pub(crate) value: Option<Instance>,
}

#[derive(Default)]
pub(crate) struct Registry {
    entries: BTreeMap<Token, Entry>,
    next_id: u64,
}

impl Registry {
    #[inline]
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Registers `provider` for `token` or replaces the provider of the existing entry.
    ///
    /// The entry keeps its identity on replacement. Its memoized value is kept or dropped depending on `policy`.
    pub(crate) fn provide(&mut self, token: Token, provider: Provider, policy: ReplacePolicy) {
        use std::collections::btree_map::Entry::{Occupied, Vacant};

        match self.entries.entry(token) {
            Vacant(vacant) => {
                debug!(token = %vacant.key(), ?provider, "Provider registered");

                let id = EntryId(self.next_id);
                self.next_id += 1;
                vacant.insert(Entry {
                    id,
                    provider,
                    value: None,
                });
            }
            Occupied(occupied) => {
                let entry = occupied.into_mut();
                entry.provider = provider;
                if entry.value.is_none() {
                    debug!(provider = ?entry.provider, "Provider replaced");
                    return;
                }
                match policy {
                    ReplacePolicy::KeepMemoized => {
                        warn!(provider = ?entry.provider, "Provider replaced, but the memoized value is kept");
                    }
                    ReplacePolicy::Invalidate => {
                        entry.value = None;
                        debug!(provider = ?entry.provider, "Provider replaced, memoized value dropped");
                    }
                }
            }
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn get(&self, token: &Token) -> Option<&Entry> {
        self.entries.get(token)
    }

    /// Stores `value` in the entry of `token` if it's still the entry identified by `id`.
    pub(crate) fn memoize(&mut self, token: &Token, id: EntryId, value: Instance) -> bool {
        match self.entries.get_mut(token) {
            Some(entry) if entry.id == id => {
                entry.value = Some(value);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.entries.clear();
    }

    #[inline]
    #[must_use]
    pub(crate) fn contains(&self, token: &Token) -> bool {
        self.entries.contains_key(token)
    }

    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
