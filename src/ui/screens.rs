use crate::store::{Record, RecordStore};

/// The two tabs of the main screen.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum Tab {
    Medicines,
    Equipment,
}

impl Tab {
    pub(crate) fn toggle(self) -> Self {
        match self {
            Tab::Medicines => Tab::Equipment,
            Tab::Equipment => Tab::Medicines,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Tab::Medicines => 0,
            Tab::Equipment => 1,
        }
    }

    /// Plural noun used in status messages.
    pub(crate) fn noun(self) -> &'static str {
        match self {
            Tab::Medicines => "medicines",
            Tab::Equipment => "equipment",
        }
    }

    pub(crate) fn singular(self) -> &'static str {
        match self {
            Tab::Medicines => "medicine",
            Tab::Equipment => "equipment",
        }
    }

    /// Capitalized singular used in popup titles.
    pub(crate) fn title(self) -> &'static str {
        match self {
            Tab::Medicines => "Medicine",
            Tab::Equipment => "Equipment",
        }
    }
}

/// Filter currently narrowing a table, with the text shown in its title.
pub(crate) struct ActiveFilter<F> {
    pub(crate) filter: F,
    pub(crate) label: String,
}

/// Snapshot of one store as displayed in a table: the visible rows, where
/// each sits in the store, an optional filter and the highlighted row.
///
/// Ids can repeat, so edits and removals address the highlighted row by its
/// store position rather than by id.
pub(crate) struct TableView<R: Record> {
    pub(crate) rows: Vec<R>,
    positions: Vec<usize>,
    pub(crate) filter: Option<ActiveFilter<R::Filter>>,
    /// Filter set aside while a search runs.
    stashed: Option<ActiveFilter<R::Filter>>,
    pub(crate) selected: usize,
}

impl<R: Record> TableView<R> {
    pub(crate) fn new() -> Self {
        Self {
            rows: Vec::new(),
            positions: Vec::new(),
            filter: None,
            stashed: None,
            selected: 0,
        }
    }

    /// Re-read the store, applying the active filter.
    pub(crate) fn refresh(&mut self, store: &RecordStore<R>) {
        let filter = self.filter.as_ref().map(|active| &active.filter);
        (self.positions, self.rows) = store
            .records()
            .iter()
            .enumerate()
            .filter(|(_, row)| filter.map_or(true, |filter| row.matches(filter)))
            .map(|(position, row)| (position, row.clone()))
            .unzip();
        self.ensure_in_bounds();
    }

    /// Refresh and move the highlight onto the row stored at `position`, if
    /// it is visible.
    pub(crate) fn refresh_focus(&mut self, store: &RecordStore<R>, position: usize) {
        self.refresh(store);
        if let Some(index) = self.positions.iter().position(|&p| p == position) {
            self.selected = index;
        }
    }

    /// Apply a filter and return how many rows matched.
    pub(crate) fn set_filter(
        &mut self,
        store: &RecordStore<R>,
        filter: R::Filter,
        label: impl Into<String>,
    ) -> usize {
        self.filter = Some(ActiveFilter {
            filter,
            label: label.into(),
        });
        self.selected = 0;
        self.refresh(store);
        self.rows.len()
    }

    /// Drop the filter. Returns whether one was active.
    pub(crate) fn clear_filter(&mut self, store: &RecordStore<R>) -> bool {
        let had_filter = self.filter.take().is_some();
        self.refresh(store);
        had_filter
    }

    /// Set the active filter aside so a search starts from the whole table.
    pub(crate) fn stash_filter(&mut self, store: &RecordStore<R>) {
        self.stashed = self.filter.take();
        self.refresh(store);
    }

    /// Put the stashed filter back, replacing whatever the search applied.
    /// Returns whether there was one.
    pub(crate) fn restore_filter(&mut self, store: &RecordStore<R>) -> bool {
        self.filter = self.stashed.take();
        self.selected = 0;
        self.refresh(store);
        self.filter.is_some()
    }

    pub(crate) fn drop_stash(&mut self) {
        self.stashed = None;
    }

    pub(crate) fn filter_label(&self) -> Option<&str> {
        self.filter.as_ref().map(|active| active.label.as_str())
    }

    pub(crate) fn current(&self) -> Option<&R> {
        self.rows.get(self.selected)
    }

    /// Highlighted row together with its position in the store.
    pub(crate) fn current_with_position(&self) -> Option<(usize, &R)> {
        let row = self.rows.get(self.selected)?;
        Some((self.positions[self.selected], row))
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, last) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.rows.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.rows.len() {
            self.selected = self.rows.len() - 1;
        }
    }
}

/// Read-only popup used for "view last" and "view first three".
pub(crate) struct InfoPopup {
    pub(crate) title: String,
    pub(crate) lines: Vec<String>,
}

impl InfoPopup {
    pub(crate) fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Equipment, EquipmentFields, EquipmentFilter};

    fn store() -> RecordStore<Equipment> {
        let mut store = RecordStore::new();
        store.append(EquipmentFields::new("Gloves", 40, "boxed"));
        store.append(EquipmentFields::new("Scale", 1, "calibrate"));
        store.append(EquipmentFields::new("Glucometer", 2, ""));
        store
    }

    #[test]
    fn filter_narrows_and_clear_restores() {
        let store = store();
        let mut view = TableView::new();
        view.refresh(&store);
        assert_eq!(view.rows.len(), 3);

        let matched = view.set_filter(
            &store,
            EquipmentFilter::NameContains("gl".into()),
            "name: gl",
        );
        assert_eq!(matched, 2);
        assert_eq!(view.filter_label(), Some("name: gl"));

        assert!(view.clear_filter(&store));
        assert!(!view.clear_filter(&store));
        assert_eq!(view.rows.len(), 3);
    }

    #[test]
    fn selection_clamps_after_rows_shrink() {
        let mut store = store();
        let mut view = TableView::new();
        view.refresh(&store);
        view.select_last();
        assert_eq!(view.current().unwrap().name, "Glucometer");

        store.remove_last();
        view.refresh(&store);
        assert_eq!(view.current().unwrap().name, "Scale");

        view.move_selection(-10);
        assert_eq!(view.selected, 0);
        view.move_selection(10);
        assert_eq!(view.selected, 1);
    }

    #[test]
    fn refresh_focus_follows_store_position() {
        let store = store();
        let mut view = TableView::new();
        view.set_filter(&store, EquipmentFilter::NameContains("gl".into()), "gl");
        view.refresh_focus(&store, 2);
        assert_eq!(view.current().unwrap().name, "Glucometer");
        assert_eq!(view.current_with_position().unwrap().0, 2);
    }

    #[test]
    fn positions_tell_apart_rows_with_the_same_id() {
        let mut store = store();
        store.remove_by_id(1);
        store.append(EquipmentFields::new("Mask", 9, ""));
        let mut view = TableView::new();
        view.refresh(&store);
        view.select_last();

        let (position, row) = view.current_with_position().unwrap();
        assert_eq!((position, row.id, row.name.as_str()), (2, 3, "Mask"));
        assert_eq!(store.position_of(row.id), Some(1));
    }

    #[test]
    fn stashed_filter_comes_back() {
        let store = store();
        let mut view = TableView::new();
        view.set_filter(&store, EquipmentFilter::NameContains("gl".into()), "name: gl");
        view.stash_filter(&store);
        assert_eq!(view.rows.len(), 3);

        view.set_filter(&store, EquipmentFilter::StatusContains("cal".into()), "search: cal");
        assert_eq!(view.rows.len(), 1);
        assert!(view.restore_filter(&store));
        assert_eq!(view.filter_label(), Some("name: gl"));
        assert_eq!(view.rows.len(), 2);

        view.drop_stash();
        assert!(!view.restore_filter(&store));
        assert_eq!(view.rows.len(), 3);
    }

    #[test]
    fn tab_toggles() {
        assert_eq!(Tab::Medicines.toggle(), Tab::Equipment);
        assert_eq!(Tab::Equipment.toggle().index(), 0);
    }
}
