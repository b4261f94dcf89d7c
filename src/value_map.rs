use serde::{Deserialize, Serialize};

use crate::error::{RegressionError, Result};
use crate::event::InputTag;

/// Reference to one element of a collection stored in the event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElectronRef {
    pub collection: InputTag,
    pub key: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueMapEntry<V> {
    pub item: ElectronRef,
    pub value: V,
}

/// Values associated with the elements of one or more collections, in
/// collection order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueMap<V> {
    entries: Vec<ValueMapEntry<V>>,
}

impl<V> Default for ValueMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> ValueMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `values[i]` with element `i` of `collection`.
    ///
    /// `values` must have exactly one entry per element and a collection can
    /// be inserted only once.
    pub fn insert(&mut self, collection: &InputTag, items: usize, values: Vec<V>) -> Result<()> {
        if values.len() != items {
            return Err(RegressionError::SizeMismatch {
                tag: collection.clone(),
                items,
                values: values.len(),
            });
        }
        if self.entries.iter().any(|e| &e.item.collection == collection) {
            return Err(RegressionError::DuplicateProduct(collection.clone()));
        }
        self.entries.reserve(values.len());
        for (key, value) in values.into_iter().enumerate() {
            self.entries.push(ValueMapEntry {
                item: ElectronRef {
                    collection: collection.clone(),
                    key,
                },
                value,
            });
        }
        Ok(())
    }

    pub fn get(&self, item: &ElectronRef) -> Option<&V> {
        self.entries
            .iter()
            .find(|e| &e.item == item)
            .map(|e| &e.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ElectronRef, &V)> {
        self.entries.iter().map(|e| (&e.item, &e.value))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|e| &e.value)
    }
}
