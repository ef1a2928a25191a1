//! Checkbox-style multi-selection over grid records.

use crate::domain::record::PropertyResolver;
use crate::domain::value::CellValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A record wrapped with a selection flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selectable<T> {
    pub id: usize,
    pub is_selected: bool,
    pub data: T,
}

impl<T> Selectable<T> {
    pub fn new(id: usize, data: T) -> Self {
        Self {
            id,
            is_selected: false,
            data,
        }
    }

    pub fn into_inner(self) -> T {
        self.data
    }
}

impl<T: fmt::Display> fmt::Display for Selectable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.data.fmt(f)
    }
}

/// Resolves properties of the wrapped record, plus `isSelected`
#[derive(Debug, Clone, Copy)]
pub struct SelectableResolver<P>(pub P);

impl<T, P> PropertyResolver<Selectable<T>> for SelectableResolver<P>
where
    P: PropertyResolver<T>,
{
    fn resolve(&self, record: &Selectable<T>, property: &str) -> Option<CellValue> {
        if property == Selection::<T>::SELECTED_PROPERTY {
            return Some(CellValue::Boolean(record.is_selected));
        }
        self.0.resolve(&record.data, property)
    }
}

/// Ordered records with per-record selection
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection<T> {
    items: Vec<Selectable<T>>,
    // Ids are never reused, even after items are reordered
    next_id: usize,
}

impl<T> Selection<T> {
    pub const SELECTED_PROPERTY: &'static str = "isSelected";

    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 0,
        }
    }

    /// Appends a record and returns its id
    pub fn push(&mut self, data: T) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Selectable::new(id, data));
        id
    }

    pub fn items(&self) -> &[Selectable<T>] {
        &self.items
    }

    /// Mutable access for sorting or reordering in place
    pub fn items_mut(&mut self) -> &mut [Selectable<T>] {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn set_selected(&mut self, id: usize, is_selected: bool) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.is_selected = is_selected;
                true
            }
            None => false,
        }
    }

    /// Flips an item's flag and returns the new value
    pub fn toggle(&mut self, id: usize) -> Option<bool> {
        let item = self.items.iter_mut().find(|i| i.id == id)?;
        item.is_selected = !item.is_selected;
        Some(item.is_selected)
    }

    pub fn select_all(&mut self) {
        self.items.iter_mut().for_each(|i| i.is_selected = true);
    }

    pub fn clear(&mut self) {
        self.items.iter_mut().for_each(|i| i.is_selected = false);
    }

    pub fn selected(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter(|i| i.is_selected).map(|i| &i.data)
    }

    pub fn selected_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_selected).count()
    }

    pub fn is_all_selected(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|i| i.is_selected)
    }
}

impl<T> FromIterator<T> for Selection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let items: Vec<Selectable<T>> = iter
            .into_iter()
            .enumerate()
            .map(|(id, data)| Selectable::new(id, data))
            .collect();
        let next_id = items.len();
        Self { items, next_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{Row, RowResolver};
    use crate::domain::sorting::{sort_records, SortCriterion};

    #[test]
    fn test_select_toggle_and_clear() {
        let mut selection: Selection<&str> = ["bolt", "nut", "washer"].into_iter().collect();

        assert!(selection.set_selected(1, true));
        assert_eq!(selection.toggle(2), Some(true));
        assert_eq!(selection.toggle(2), Some(false));
        assert_eq!(selection.toggle(9), None);
        assert_eq!(selection.selected().collect::<Vec<_>>(), vec![&"nut"]);

        selection.select_all();
        assert!(selection.is_all_selected());
        assert_eq!(selection.selected_count(), 3);

        selection.clear();
        assert_eq!(selection.selected_count(), 0);
    }

    #[test]
    fn test_push_assigns_increasing_ids() {
        let mut selection = Selection::new();
        assert_eq!(selection.push("a"), 0);
        assert_eq!(selection.push("b"), 1);
        assert!(!selection.is_all_selected());
    }

    #[test]
    fn test_sort_by_selection_flag() {
        let mut selection: Selection<Row> = vec![
            Row::new().with("name", "a"),
            Row::new().with("name", "b"),
            Row::new().with("name", "c"),
        ]
        .into_iter()
        .collect();
        selection.set_selected(2, true);

        let criteria = vec![SortCriterion::descending("isSelected", 0)];
        sort_records(selection.items_mut(), &criteria, &SelectableResolver(RowResolver));

        assert_eq!(selection.items()[0].id, 2);
        assert_eq!(selection.items()[1].id, 0);
    }

    #[test]
    fn test_push_after_sort_never_reuses_ids() {
        let mut selection: Selection<Row> = vec![
            Row::new().with("name", "a"),
            Row::new().with("name", "b"),
            Row::new().with("name", "c"),
        ]
        .into_iter()
        .collect();
        selection.set_selected(0, true);

        let criteria = vec![SortCriterion::descending("name", 0)];
        sort_records(selection.items_mut(), &criteria, &SelectableResolver(RowResolver));
        assert_eq!(selection.items().last().map(|i| i.id), Some(0));

        let id = selection.push(Row::new().with("name", "d"));
        assert_eq!(id, 3);
        let mut ids: Vec<usize> = selection.items().iter().map(|i| i.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2, 3]);

        assert_eq!(selection.toggle(id), Some(true));
        assert_eq!(selection.selected_count(), 2);
    }
}
