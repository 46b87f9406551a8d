//! Ordered lists of repeatable sub-records addressed by stable ids.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry of a repeatable list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item<T> {
    pub id: Uuid,
    #[serde(flatten)]
    pub value: T,
}

/// Ordered list of sub-records (contacts, invoices, cost estimates...).
///
/// Items are identified by id, never by position: removing one entry leaves
/// the ids and relative order of the others untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Repeatable<T> {
    items: Vec<Item<T>>,
}

impl<T> Default for Repeatable<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Repeatable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under a fresh id and return that id.
    pub fn push(&mut self, value: T) -> Uuid {
        let id = Uuid::new_v4();
        self.push_with_id(id, value);
        id
    }

    /// Append a value whose id was assigned elsewhere (e.g. by the backend).
    pub fn push_with_id(&mut self, id: Uuid, value: T) {
        self.items.push(Item { id, value });
    }

    pub fn remove(&mut self, id: Uuid) -> Option<T> {
        let position = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(position).value)
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .map(|item| &item.value)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut T> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .map(|item| &mut item.value)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item<T>> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Item<T>> {
        self.items.iter_mut()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.iter().map(|item| &item.value)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut().map(|item| &mut item.value)
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.items.iter().map(|item| item.id).collect()
    }
}

impl<T> FromIterator<T> for Repeatable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        for value in iter {
            list.push(value);
        }
        list
    }
}
