use parking_lot::Mutex;
use std::{
    any::{type_name, Any, TypeId},
    collections::BTreeMap,
    sync::Arc,
};
use tracing::debug;

use crate::autowire::{Injectable, Members};

/// Side table of declared autowired members, keyed by type identity.
///
/// A type's table is built from [`Injectable::autowire`] on first use and lives as long as the cache.
#[derive(Default)]
pub(crate) struct MetadataCache {
    tables: Mutex<BTreeMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl MetadataCache {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            tables: Mutex::new(BTreeMap::new()),
        }
    }

    #[must_use]
    pub(crate) fn members<T: Injectable>(&self) -> Arc<Members<T>> {
        let type_id = TypeId::of::<T>();

        let cached = self.tables.lock().get(&type_id).cloned();
        if let Some(members) = cached.and_then(|table| table.downcast::<Members<T>>().ok()) {
            return members;
        }

        // Declared without the lock held, `autowire` is user code
        let members = Arc::new(Members::<T>::declared());
        self.tables.lock().insert(type_id, members.clone());
        debug!(r#type = type_name::<T>(), members = members.len(), "Members declared");

        members
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.tables.lock().len()
    }
}
