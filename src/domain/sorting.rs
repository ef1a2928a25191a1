use crate::domain::record::PropertyResolver;
use crate::domain::value::{total_cmp, CellValue};
use crate::settings::GridSettings;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::{fmt, str::FromStr};
use tracing::{debug, warn};

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    None,
    Ascending,
    Descending,
}

impl SortDirection {
    /// Header-click cycle: none → ascending → descending → none
    pub fn next(self) -> Self {
        match self {
            SortDirection::None => SortDirection::Ascending,
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::None,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Descending => ordering.reverse(),
            _ => ordering,
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            "none" => Ok(SortDirection::None),
            _ => Err(format!(
                "Invalid sort direction '{}'. Valid directions: asc, desc, none",
                s
            )),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// A single sort rule attached to one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortCriterion {
    pub column_id: String,
    pub direction: SortDirection,
    pub precedence: usize,
}

impl SortCriterion {
    pub fn new(column_id: impl Into<String>, direction: SortDirection, precedence: usize) -> Self {
        Self {
            column_id: column_id.into(),
            direction,
            precedence,
        }
    }

    pub fn ascending(column_id: impl Into<String>, precedence: usize) -> Self {
        Self::new(column_id, SortDirection::Ascending, precedence)
    }

    pub fn descending(column_id: impl Into<String>, precedence: usize) -> Self {
        Self::new(column_id, SortDirection::Descending, precedence)
    }

    pub fn is_active(&self) -> bool {
        self.direction != SortDirection::None
    }
}

impl FromStr for SortCriterion {
    type Err = String;

    /// Parses `column` or `column:direction` (direction defaults to ascending)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, direction) = match s.split_once(':') {
            Some((column, direction)) => (column.trim(), direction.parse()?),
            None => (s.trim(), SortDirection::Ascending),
        };
        if column.is_empty() {
            return Err(format!("Invalid sort criterion '{}': missing column", s));
        }
        Ok(SortCriterion::new(column, direction, 0))
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) [Priority: {}]",
            self.column_id, self.direction, self.precedence
        )
    }
}

/// Per-record key: resolved values paired with their criterion's direction
struct SortKey(Vec<(CellValue, SortDirection)>);

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|((a, direction), (b, _))| direction.apply(total_cmp(a, b)))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

/// Active criteria ordered by precedence
fn active_in_precedence(criteria: &[SortCriterion]) -> Vec<&SortCriterion> {
    let mut active: Vec<&SortCriterion> = criteria.iter().filter(|c| c.is_active()).collect();
    active.sort_by_key(|c| c.precedence);
    active
}

fn sort_with<T, R, P, F>(items: &mut [T], project: F, criteria: &[SortCriterion], resolver: &P)
where
    R: ?Sized,
    P: PropertyResolver<R> + ?Sized,
    F: Fn(&T) -> &R,
{
    let active = active_in_precedence(criteria);
    if active.is_empty() || items.len() < 2 {
        return;
    }

    let mut unresolved = vec![0usize; active.len()];
    let mut non_finite = 0usize;

    // Keys are extracted once per record; sort_by_cached_key is stable.
    items.sort_by_cached_key(|item| {
        let record = project(item);
        let parts = active
            .iter()
            .enumerate()
            .map(|(i, criterion)| {
                let value = match resolver.resolve(record, &criterion.column_id) {
                    Some(value) => value.sort_normalized(),
                    None => {
                        unresolved[i] += 1;
                        CellValue::Null
                    }
                };
                let value = match value {
                    CellValue::Number(n) if n.is_nan() => {
                        non_finite += 1;
                        CellValue::Null
                    }
                    other => other,
                };
                (value, criterion.direction)
            })
            .collect();
        SortKey(parts)
    });

    for (criterion, count) in active.iter().zip(unresolved) {
        if count > 0 {
            warn!(
                "Sort: property '{}' could not be resolved for {} of {} records; treating as empty",
                criterion.column_id,
                count,
                items.len()
            );
        }
    }
    if non_finite > 0 {
        warn!("Sort: {} NaN values compared as empty", non_finite);
    }

    debug!(
        "Sorted {} records by {} criteria",
        items.len(),
        active.len()
    );
}

/// Stable in-place sort of records by the active criteria
///
/// Criteria are applied in precedence order (lexicographically). Fully
/// numeric text compares as a number, so "90" < "100" < "110". Values that
/// cannot be resolved compare as the lowest value. Criteria with direction
/// `None` are ignored; if none remain the slice is left untouched.
///
/// # Examples
/// ```
/// use gridview_core::domain::record::{Row, RowResolver};
/// use gridview_core::domain::sorting::{sort_records, SortCriterion};
///
/// let mut rows = vec![
///     Row::new().with("operation", "110"),
///     Row::new().with("operation", "90"),
///     Row::new().with("operation", "100"),
/// ];
///
/// sort_records(&mut rows, &[SortCriterion::ascending("operation", 0)], &RowResolver);
/// let ops: Vec<String> = rows.iter().map(|r| r.get("operation").unwrap().to_string()).collect();
/// assert_eq!(ops, vec!["90", "100", "110"]);
/// ```
pub fn sort_records<R, P>(records: &mut [R], criteria: &[SortCriterion], resolver: &P)
where
    P: PropertyResolver<R> + ?Sized,
{
    sort_with(records, |r| r, criteria, resolver);
}

/// Like [`sort_records`] over a slice of borrowed records
pub fn sort_refs<R, P>(records: &mut [&R], criteria: &[SortCriterion], resolver: &P)
where
    R: ?Sized,
    P: PropertyResolver<R> + ?Sized,
{
    sort_with(records, |r| *r, criteria, resolver);
}

/// Returns a sorted copy, leaving the input untouched
pub fn sorted<R, P>(records: &[R], criteria: &[SortCriterion], resolver: &P) -> Vec<R>
where
    R: Clone,
    P: PropertyResolver<R> + ?Sized,
{
    let mut out = records.to_vec();
    sort_records(&mut out, criteria, resolver);
    out
}

/// Manages the active sort criteria for a grid
///
/// Active criteria always carry contiguous precedence starting at 0 and
/// never exceed `max_sort_columns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortConfiguration {
    criteria: Vec<SortCriterion>,
    pub multi_column_enabled: bool,
    max_sort_columns: usize,
}

impl SortConfiguration {
    pub fn new() -> Self {
        Self::with_settings(&GridSettings::default())
    }

    pub fn with_settings(settings: &GridSettings) -> Self {
        Self {
            criteria: Vec::new(),
            multi_column_enabled: settings.multi_column_sort,
            max_sort_columns: settings.max_sort_columns.max(1),
        }
    }

    pub fn max_sort_columns(&self) -> usize {
        self.max_sort_columns
    }

    /// Clears existing sorts and sorts by a single column
    pub fn apply_single_column_sort(&mut self, column_id: &str, direction: SortDirection) {
        self.criteria.clear();
        if direction != SortDirection::None {
            self.criteria.push(SortCriterion::new(column_id, direction, 0));
        }
        debug!("Single-column sort: {} {}", column_id, direction);
    }

    /// Adds, updates or removes one column's criterion, keeping the others
    ///
    /// A new column beyond `max_sort_columns` evicts the lowest-precedence
    /// criterion and takes its slot.
    pub fn apply_multi_column_sort(&mut self, column_id: &str, direction: SortDirection) {
        if !self.multi_column_enabled {
            self.apply_single_column_sort(column_id, direction);
            return;
        }

        if let Some(pos) = self.criteria.iter().position(|c| c.column_id == column_id) {
            if direction == SortDirection::None {
                self.criteria.remove(pos);
                self.compact_precedence();
            } else {
                self.criteria[pos].direction = direction;
            }
        } else if direction != SortDirection::None {
            if self.criteria.len() >= self.max_sort_columns {
                if let Some(evicted) = self
                    .criteria
                    .iter()
                    .enumerate()
                    .max_by_key(|(_, c)| c.precedence)
                    .map(|(i, _)| i)
                {
                    let removed = self.criteria.remove(evicted);
                    debug!(
                        "Sort limit {} reached; evicted {}",
                        self.max_sort_columns, removed.column_id
                    );
                }
            }
            let precedence = self.criteria.len();
            self.criteria
                .push(SortCriterion::new(column_id, direction, precedence));
        }

        debug!("Multi-column sort: {} {}", column_id, direction);
    }

    /// Removes a column's criterion; remaining criteria move up in precedence
    pub fn remove_sort(&mut self, column_id: &str) -> bool {
        let before = self.criteria.len();
        self.criteria.retain(|c| c.column_id != column_id);
        let removed = self.criteria.len() != before;
        if removed {
            self.compact_precedence();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.criteria.clear();
    }

    pub fn direction_of(&self, column_id: &str) -> SortDirection {
        self.criteria
            .iter()
            .find(|c| c.column_id == column_id)
            .map(|c| c.direction)
            .unwrap_or(SortDirection::None)
    }

    pub fn precedence_of(&self, column_id: &str) -> Option<usize> {
        self.criteria
            .iter()
            .find(|c| c.column_id == column_id && c.is_active())
            .map(|c| c.precedence)
    }

    pub fn is_column_sorted(&self, column_id: &str) -> bool {
        self.precedence_of(column_id).is_some()
    }

    /// Active criteria in precedence order
    pub fn active_criteria(&self) -> Vec<SortCriterion> {
        active_in_precedence(&self.criteria)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn has_active_sorts(&self) -> bool {
        self.criteria.iter().any(SortCriterion::is_active)
    }

    /// Sorts records in place by the current criteria
    pub fn sort<R, P>(&self, records: &mut [R], resolver: &P)
    where
        P: PropertyResolver<R> + ?Sized,
    {
        sort_records(records, &self.criteria, resolver);
    }

    fn compact_precedence(&mut self) {
        self.criteria.retain(SortCriterion::is_active);
        self.criteria.sort_by_key(|c| c.precedence);
        for (i, criterion) in self.criteria.iter_mut().enumerate() {
            criterion.precedence = i;
        }
    }
}

impl Default for SortConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{AccessorMap, Row, RowResolver};

    fn values(rows: &[Row], property: &str) -> Vec<String> {
        rows.iter()
            .map(|r| r.get(property).map(|v| v.to_string()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_numeric_strings_sort_numerically() {
        let mut rows = vec![
            Row::new().with("operation", "110"),
            Row::new().with("operation", "90"),
            Row::new().with("operation", "100"),
        ];

        sort_records(&mut rows, &[SortCriterion::ascending("operation", 0)], &RowResolver);

        assert_eq!(values(&rows, "operation"), vec!["90", "100", "110"]);
    }

    #[test]
    fn test_sort_descending() {
        let mut rows = vec![
            Row::new().with("n", 1),
            Row::new().with("n", 3),
            Row::new().with("n", 2),
        ];

        sort_records(&mut rows, &[SortCriterion::descending("n", 0)], &RowResolver);

        assert_eq!(values(&rows, "n"), vec!["3", "2", "1"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut rows = vec![
            Row::new().with("group", "b").with("id", 1),
            Row::new().with("group", "a").with("id", 2),
            Row::new().with("group", "b").with("id", 3),
            Row::new().with("group", "a").with("id", 4),
            Row::new().with("group", "b").with("id", 5),
        ];

        sort_records(&mut rows, &[SortCriterion::ascending("group", 0)], &RowResolver);
        assert_eq!(values(&rows, "id"), vec!["2", "4", "1", "3", "5"]);

        // Descending keeps original order among equals too
        sort_records(&mut rows, &[SortCriterion::descending("group", 0)], &RowResolver);
        assert_eq!(values(&rows, "id"), vec!["1", "3", "5", "2", "4"]);
    }

    #[test]
    fn test_multi_column_scenario() {
        let mut rows = vec![
            Row::new().with("A", 2).with("B", "x"),
            Row::new().with("A", 1).with("B", "y"),
            Row::new().with("A", 1).with("B", "z"),
        ];

        let criteria = vec![
            SortCriterion::ascending("A", 0),
            SortCriterion::descending("B", 1),
        ];
        sort_records(&mut rows, &criteria, &RowResolver);

        assert_eq!(values(&rows, "A"), vec!["1", "1", "2"]);
        assert_eq!(values(&rows, "B"), vec!["z", "y", "x"]);
    }

    #[test]
    fn test_precedence_not_slice_order() {
        let mut rows = vec![
            Row::new().with("A", 2).with("B", "x"),
            Row::new().with("A", 1).with("B", "x"),
            Row::new().with("A", 3).with("B", "a"),
        ];

        // B is primary even though it is listed second
        let criteria = vec![
            SortCriterion::ascending("A", 1),
            SortCriterion::ascending("B", 0),
        ];
        sort_records(&mut rows, &criteria, &RowResolver);

        assert_eq!(values(&rows, "A"), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_missing_values_sort_first() {
        let mut rows = vec![
            Row::new().with("n", 5),
            Row::new(),
            Row::new().with("n", 1),
        ];

        sort_records(&mut rows, &[SortCriterion::ascending("n", 0)], &RowResolver);

        assert_eq!(values(&rows, "n"), vec!["", "1", "5"]);
    }

    #[test]
    fn test_nan_sorts_as_empty() {
        let mut rows = vec![
            Row::new().with("id", "five").with("qty", 5),
            Row::new().with("id", "nan").with("qty", CellValue::Number(f64::NAN)),
            Row::new().with("id", "missing"),
            Row::new().with("id", "one").with("qty", 1),
        ];

        sort_records(&mut rows, &[SortCriterion::ascending("qty", 0)], &RowResolver);
        assert_eq!(values(&rows, "id"), vec!["nan", "missing", "one", "five"]);

        sort_records(&mut rows, &[SortCriterion::descending("qty", 0)], &RowResolver);
        assert_eq!(values(&rows, "id"), vec!["five", "one", "nan", "missing"]);
    }

    #[test]
    fn test_none_direction_leaves_input_unchanged() {
        let mut rows = vec![Row::new().with("n", 3), Row::new().with("n", 1)];
        let criteria = vec![SortCriterion::new("n", SortDirection::None, 0)];

        sort_records(&mut rows, &criteria, &RowResolver);

        assert_eq!(values(&rows, "n"), vec!["3", "1"]);
    }

    #[test]
    fn test_sort_refs_and_accessor_map() {
        struct Part {
            id: &'static str,
            qty: i64,
        }
        let parts = [
            Part { id: "p1", qty: 7 },
            Part { id: "p2", qty: 2 },
        ];
        let accessors = AccessorMap::new().with("qty", |p: &Part| CellValue::from(p.qty));

        let mut view: Vec<&Part> = parts.iter().collect();
        sort_refs(&mut view, &[SortCriterion::ascending("qty", 0)], &accessors);

        assert_eq!(view[0].id, "p2");
        assert_eq!(view[1].id, "p1");
    }

    #[test]
    fn test_sorted_returns_copy() {
        let rows = vec![Row::new().with("n", 2), Row::new().with("n", 1)];
        let out = sorted(&rows, &[SortCriterion::ascending("n", 0)], &RowResolver);
        assert_eq!(values(&out, "n"), vec!["1", "2"]);
        assert_eq!(values(&rows, "n"), vec!["2", "1"]);
    }

    #[test]
    fn test_removing_primary_promotes_secondary() {
        let mut config = SortConfiguration::new();
        config.apply_multi_column_sort("A", SortDirection::Ascending);
        config.apply_multi_column_sort("B", SortDirection::Descending);
        assert_eq!(config.precedence_of("B"), Some(1));

        config.remove_sort("A");

        assert_eq!(config.precedence_of("B"), Some(0));
        assert_eq!(config.active_criteria().len(), 1);
    }

    #[test]
    fn test_multi_sort_none_removes_and_compacts() {
        let mut config = SortConfiguration::new();
        config.apply_multi_column_sort("A", SortDirection::Ascending);
        config.apply_multi_column_sort("B", SortDirection::Ascending);
        config.apply_multi_column_sort("C", SortDirection::Ascending);

        config.apply_multi_column_sort("B", SortDirection::None);

        let active = config.active_criteria();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].column_id, "A");
        assert_eq!(active[1].column_id, "C");
        assert_eq!(active[1].precedence, 1);
    }

    #[test]
    fn test_multi_sort_evicts_lowest_precedence() {
        let mut config = SortConfiguration::new();
        for column in ["A", "B", "C", "D"] {
            config.apply_multi_column_sort(column, SortDirection::Ascending);
        }

        let ids: Vec<String> = config
            .active_criteria()
            .into_iter()
            .map(|c| c.column_id)
            .collect();
        assert_eq!(ids, vec!["A", "B", "D"]);
        assert_eq!(config.precedence_of("D"), Some(2));
    }

    #[test]
    fn test_multi_sort_updates_existing_direction() {
        let mut config = SortConfiguration::new();
        config.apply_multi_column_sort("A", SortDirection::Ascending);
        config.apply_multi_column_sort("A", SortDirection::Descending);

        assert_eq!(config.direction_of("A"), SortDirection::Descending);
        assert_eq!(config.active_criteria().len(), 1);
    }

    #[test]
    fn test_single_sort_replaces_all() {
        let mut config = SortConfiguration::new();
        config.apply_multi_column_sort("A", SortDirection::Ascending);
        config.apply_multi_column_sort("B", SortDirection::Ascending);

        config.apply_single_column_sort("C", SortDirection::Descending);

        assert!(!config.is_column_sorted("A"));
        assert_eq!(config.precedence_of("C"), Some(0));

        config.apply_single_column_sort("C", SortDirection::None);
        assert!(!config.has_active_sorts());
    }

    #[test]
    fn test_multi_disabled_behaves_as_single() {
        let mut config = SortConfiguration::new();
        config.multi_column_enabled = false;
        config.apply_multi_column_sort("A", SortDirection::Ascending);
        config.apply_multi_column_sort("B", SortDirection::Ascending);

        assert!(!config.is_column_sorted("A"));
        assert!(config.is_column_sorted("B"));
    }

    #[test]
    fn test_direction_cycle() {
        assert_eq!(SortDirection::None.next(), SortDirection::Ascending);
        assert_eq!(SortDirection::Ascending.next(), SortDirection::Descending);
        assert_eq!(SortDirection::Descending.next(), SortDirection::None);
    }

    #[test]
    fn test_parse_sort_criterion() {
        let criterion: SortCriterion = "qty:desc".parse().unwrap();
        assert_eq!(criterion.column_id, "qty");
        assert_eq!(criterion.direction, SortDirection::Descending);

        let criterion: SortCriterion = "name".parse().unwrap();
        assert_eq!(criterion.direction, SortDirection::Ascending);

        assert!("qty:sideways".parse::<SortCriterion>().is_err());
        assert!(":asc".parse::<SortCriterion>().is_err());
    }
}
