use thiserror::Error;

use crate::{sequence_less_than, types::SequenceNumber};

/// Errors that can occur during SequenceList operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// Attempted to insert a duplicate ID into the sequence list
    #[error("Duplicate sequence ID {id} not allowed in SequenceList")]
    DuplicateId { id: SequenceNumber },
}

/// A list of items kept sorted by wrapping sequence number.
///
/// Items almost always arrive in increasing order, so lookups and inserts
/// scan from the back and stop as soon as they pass the target id.
pub struct SequenceList<T> {
    list: Vec<(SequenceNumber, T)>,
}

impl<T> Default for SequenceList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SequenceList<T> {
    pub fn new() -> Self {
        Self { list: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn front(&self) -> Option<&(SequenceNumber, T)> {
        self.list.first()
    }

    pub fn pop_front(&mut self) -> Option<(SequenceNumber, T)> {
        if self.list.is_empty() {
            return None;
        }
        Some(self.list.remove(0))
    }

    pub fn iter(&self) -> impl Iterator<Item = &(SequenceNumber, T)> {
        self.list.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut (SequenceNumber, T)> {
        self.list.iter_mut()
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }

    pub fn contains_scan_from_back(&self, id: &SequenceNumber) -> bool {
        self.index_scan_from_back(id).is_some()
    }

    pub fn get_mut_scan_from_back(&mut self, id: &SequenceNumber) -> Option<&mut T> {
        let index = self.index_scan_from_back(id)?;
        self.list.get_mut(index).map(|(_, item)| item)
    }

    /// Attempts to insert an item with the given ID, scanning from the back.
    /// Returns an error if the ID already exists.
    pub fn try_insert_scan_from_back(
        &mut self,
        id: SequenceNumber,
        item: T,
    ) -> Result<(), SequenceError> {
        let mut index = self.list.len();

        while index > 0 {
            let old_id = self.list[index - 1].0;
            if old_id == id {
                return Err(SequenceError::DuplicateId { id });
            }
            if sequence_less_than(old_id, id) {
                break;
            }
            index -= 1;
        }

        self.list.insert(index, (id, item));
        Ok(())
    }

    pub fn remove_scan_from_back(&mut self, id: &SequenceNumber) -> Option<T> {
        let index = self.index_scan_from_back(id)?;
        Some(self.list.remove(index).1)
    }

    /// Removes every item for which `keep` returns false
    pub fn retain(&mut self, mut keep: impl FnMut(SequenceNumber, &T) -> bool) {
        self.list.retain(|(id, item)| keep(*id, item));
    }

    fn index_scan_from_back(&self, id: &SequenceNumber) -> Option<usize> {
        for index in (0..self.list.len()).rev() {
            let old_id = self.list[index].0;
            if old_id == *id {
                return Some(index);
            }
            if sequence_less_than(old_id, *id) {
                return None;
            }
        }
        None
    }
}
