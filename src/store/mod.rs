//! In-memory record store split across per-schema submodules. The generic
//! container lives here; `medicines` and `equipment` teach it how to compare
//! and filter their rows.

mod equipment;
mod medicines;

use std::cmp::Ordering;

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::RecordId;

/// Failures the store reports. Lookups that find nothing return `None` or an
/// empty result instead of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Index {position} is out of bounds for a store of size {len}.")]
    OutOfBounds { position: usize, len: usize },
}

/// Row shape understood by [`RecordStore`].
pub trait Record: Clone {
    /// Every field except the id.
    type Fields;
    /// Columns the rows can be sorted by.
    type SortField: Copy;
    /// Predicates the rows can be filtered by.
    type Filter;

    fn from_fields(id: RecordId, fields: Self::Fields) -> Self;
    fn id(&self) -> RecordId;
    fn set_id(&mut self, id: RecordId);
    fn name(&self) -> &str;
    /// Replace every field except the id.
    fn overwrite(&mut self, fields: Self::Fields);
    /// Ascending comparison on a single column.
    fn compare_by(&self, other: &Self, field: Self::SortField) -> Ordering;
    fn matches(&self, filter: &Self::Filter) -> bool;
}

/// Ordered collection of rows with sequential ids.
///
/// Ids follow the positional scheme the clinic tables have always used:
/// `append` hands out `len + 1`, and `insert_at` renumbers every row to
/// `index + 1`. Removals leave the remaining ids untouched, so after a removal
/// ids may have gaps, and a later append can reuse an id that is still in the
/// table. Every id-based operation acts on the first matching row. The same
/// first-match rule applies to names, which may repeat.
#[derive(Debug, Clone)]
pub struct RecordStore<R> {
    rows: Vec<R>,
}

impl<R> Default for RecordStore<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<R: Record> RecordStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row at the end with id `len + 1`.
    pub fn append(&mut self, fields: R::Fields) -> R {
        let id = next_id(self.rows.len());
        let record = R::from_fields(id, fields);
        self.rows.push(record.clone());
        debug!(id, name = record.name(), "appended row");
        record
    }

    /// Insert a row at `position` (`0..=len`) and renumber every row to its
    /// index plus one. The returned snapshot carries the renumbered id.
    pub fn insert_at(&mut self, position: usize, fields: R::Fields) -> Result<R, StoreError> {
        let len = self.rows.len();
        if position > len {
            warn!(position, len, "rejected positional insert");
            return Err(StoreError::OutOfBounds { position, len });
        }
        Ok(self.insert_unchecked(position, fields))
    }

    /// `insert_at(0, ..)`, which is always in bounds.
    pub fn prepend(&mut self, fields: R::Fields) -> R {
        self.insert_unchecked(0, fields)
    }

    pub fn remove_by_id(&mut self, id: RecordId) -> Option<R> {
        let index = self.position_of(id)?;
        let removed = self.rows.remove(index);
        debug!(id, index, "removed row by id");
        Some(removed)
    }

    /// Remove the first row whose name matches, ignoring case.
    pub fn remove_by_name(&mut self, name: &str) -> Option<R> {
        let index = self.position_of_name(name)?;
        let removed = self.rows.remove(index);
        debug!(id = removed.id(), index, "removed row by name");
        Some(removed)
    }

    pub fn remove_last(&mut self) -> Option<R> {
        let removed = self.rows.pop()?;
        debug!(id = removed.id(), "removed last row");
        Some(removed)
    }

    pub fn find_by_id(&self, id: RecordId) -> Option<R> {
        self.rows.iter().find(|row| row.id() == id).cloned()
    }

    pub fn find_by_name(&self, name: &str) -> Option<R> {
        self.position_of_name(name).map(|index| self.rows[index].clone())
    }

    /// Overwrite everything but the id of the first row with `id`. Returns
    /// whether a row was found.
    pub fn update(&mut self, id: RecordId, fields: R::Fields) -> bool {
        match self.rows.iter_mut().find(|row| row.id() == id) {
            Some(row) => {
                row.overwrite(fields);
                debug!(id, "updated row");
                true
            }
            None => false,
        }
    }

    pub fn get_by_index(&self, index: usize) -> Option<R> {
        self.rows.get(index).cloned()
    }

    /// Overwrite everything but the id of the row at `index`. Use this when
    /// the caller already knows which row it means, since ids can repeat.
    pub fn update_at(&mut self, index: usize, fields: R::Fields) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.overwrite(fields);
                debug!(id = row.id(), index, "updated row at index");
                true
            }
            None => false,
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Option<R> {
        if index >= self.rows.len() {
            return None;
        }
        let removed = self.rows.remove(index);
        debug!(id = removed.id(), index, "removed row at index");
        Some(removed)
    }

    /// Rows in `start..end`, clamped to the store size. Never fails.
    pub fn slice(&self, start: usize, end: usize) -> Vec<R> {
        let end = end.min(self.rows.len());
        if start >= end {
            return Vec::new();
        }
        self.rows[start..end].to_vec()
    }

    pub fn last(&self) -> Option<R> {
        self.rows.last().cloned()
    }

    /// Stable in-place sort. Descending order flips the comparator, so rows
    /// that compare equal keep their previous relative order either way.
    pub fn sort_by(&mut self, field: R::SortField, ascending: bool) -> Vec<R> {
        if ascending {
            self.rows.sort_by(|a, b| a.compare_by(b, field));
        } else {
            self.rows.sort_by(|a, b| b.compare_by(a, field));
        }
        debug!(ascending, rows = self.rows.len(), "sorted rows");
        self.rows.clone()
    }

    /// Matching rows in store order. Does not mutate.
    pub fn filter(&self, filter: &R::Filter) -> Vec<R> {
        self.filter_with(|row| row.matches(filter))
    }

    pub fn filter_with<P>(&self, predicate: P) -> Vec<R>
    where
        P: Fn(&R) -> bool,
    {
        self.rows.iter().filter(|row| predicate(row)).cloned().collect()
    }

    pub fn position_of(&self, id: RecordId) -> Option<usize> {
        self.rows.iter().position(|row| row.id() == id)
    }

    /// How many rows carry `id`. More than one only after an append follows a
    /// removal.
    pub fn count_by_id(&self, id: RecordId) -> usize {
        self.rows.iter().filter(|row| row.id() == id).count()
    }

    /// How many rows carry this name, ignoring case.
    pub fn count_by_name(&self, name: &str) -> usize {
        self.rows
            .iter()
            .filter(|row| eq_ignore_case(row.name(), name))
            .count()
    }

    /// Borrowed view for renderers that only need to read.
    pub fn records(&self) -> &[R] {
        &self.rows
    }

    pub fn count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        debug!("cleared rows");
    }

    fn position_of_name(&self, name: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| eq_ignore_case(row.name(), name))
    }

    fn insert_unchecked(&mut self, position: usize, fields: R::Fields) -> R {
        let provisional = self.rows.last().map_or(1, |row| row.id().saturating_add(1));
        self.rows.insert(position, R::from_fields(provisional, fields));
        self.renumber();

        let record = self.rows[position].clone();
        debug!(position, id = record.id(), name = record.name(), "inserted row");
        record
    }

    fn renumber(&mut self) {
        for (index, row) in self.rows.iter_mut().enumerate() {
            row.set_id(next_id(index));
        }
    }
}

fn next_id(index: usize) -> RecordId {
    RecordId::try_from(index + 1).unwrap_or(RecordId::MAX)
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Case-insensitive ordering used for every text column.
pub(crate) fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Case-insensitive substring test used by every text filter.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
