//! Typed filter predicates and their AND/OR combination.
//!
//! Filtering never fails. A criterion that is inactive or malformed passes
//! every record, and a property that cannot be resolved for a record lets
//! that record through for that criterion.

use crate::domain::column::ColumnModel;
use crate::domain::record::PropertyResolver;
use crate::domain::value::{natural_cmp, CellValue, DataType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::{fmt, str::FromStr};
use tracing::{debug, warn};
use uuid::Uuid;

/// Filter comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    Between,
    IsEmpty,
    IsNotEmpty,
    InList,
    NotInList,
}

impl FilterOperator {
    const STRING_OPERATORS: &'static [FilterOperator] = &[
        FilterOperator::Contains,
        FilterOperator::Equals,
        FilterOperator::StartsWith,
        FilterOperator::EndsWith,
        FilterOperator::NotEquals,
        FilterOperator::NotContains,
        FilterOperator::IsEmpty,
        FilterOperator::IsNotEmpty,
        FilterOperator::InList,
        FilterOperator::NotInList,
    ];

    const NUMBER_OPERATORS: &'static [FilterOperator] = &[
        FilterOperator::Equals,
        FilterOperator::GreaterThan,
        FilterOperator::GreaterOrEqual,
        FilterOperator::LessThan,
        FilterOperator::LessOrEqual,
        FilterOperator::NotEquals,
        FilterOperator::Between,
        FilterOperator::IsEmpty,
        FilterOperator::IsNotEmpty,
        FilterOperator::InList,
        FilterOperator::NotInList,
    ];

    const DATE_OPERATORS: &'static [FilterOperator] = &[
        FilterOperator::Equals,
        FilterOperator::GreaterThan,
        FilterOperator::GreaterOrEqual,
        FilterOperator::LessThan,
        FilterOperator::LessOrEqual,
        FilterOperator::NotEquals,
        FilterOperator::Between,
        FilterOperator::IsEmpty,
        FilterOperator::IsNotEmpty,
    ];

    const EQUALITY_OPERATORS: &'static [FilterOperator] = &[
        FilterOperator::Equals,
        FilterOperator::NotEquals,
        FilterOperator::IsEmpty,
        FilterOperator::IsNotEmpty,
    ];

    /// Operators offered for a column of the given type
    pub fn available_for(data_type: DataType) -> &'static [FilterOperator] {
        match data_type {
            DataType::String => Self::STRING_OPERATORS,
            DataType::Number => Self::NUMBER_OPERATORS,
            DataType::Date => Self::DATE_OPERATORS,
            DataType::Boolean | DataType::Other => Self::EQUALITY_OPERATORS,
        }
    }

    pub fn is_valid_for(self, data_type: DataType) -> bool {
        Self::available_for(data_type).contains(&self)
    }

    pub fn default_for(data_type: DataType) -> Self {
        match data_type {
            DataType::String => FilterOperator::Contains,
            _ => FilterOperator::Equals,
        }
    }

    pub fn is_text_operator(self) -> bool {
        matches!(
            self,
            FilterOperator::Contains
                | FilterOperator::NotContains
                | FilterOperator::StartsWith
                | FilterOperator::EndsWith
        )
    }

    pub fn is_list_operator(self) -> bool {
        matches!(self, FilterOperator::InList | FilterOperator::NotInList)
    }

    fn needs_value(self) -> bool {
        !matches!(
            self,
            FilterOperator::IsEmpty
                | FilterOperator::IsNotEmpty
                | FilterOperator::InList
                | FilterOperator::NotInList
        )
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::Contains => "contains",
            Self::NotContains => "notContains",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
            Self::GreaterThan => "greaterThan",
            Self::GreaterOrEqual => "greaterOrEqual",
            Self::LessThan => "lessThan",
            Self::LessOrEqual => "lessOrEqual",
            Self::Between => "between",
            Self::IsEmpty => "isEmpty",
            Self::IsNotEmpty => "isNotEmpty",
            Self::InList => "inList",
            Self::NotInList => "notInList",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for FilterOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "equals" | "eq" | "=" => Ok(FilterOperator::Equals),
            "notequals" | "ne" | "!=" => Ok(FilterOperator::NotEquals),
            "contains" => Ok(FilterOperator::Contains),
            "notcontains" => Ok(FilterOperator::NotContains),
            "startswith" => Ok(FilterOperator::StartsWith),
            "endswith" => Ok(FilterOperator::EndsWith),
            "greaterthan" | "gt" | ">" => Ok(FilterOperator::GreaterThan),
            "greaterorequal" | "ge" | ">=" => Ok(FilterOperator::GreaterOrEqual),
            "lessthan" | "lt" | "<" => Ok(FilterOperator::LessThan),
            "lessorequal" | "le" | "<=" => Ok(FilterOperator::LessOrEqual),
            "between" => Ok(FilterOperator::Between),
            "isempty" => Ok(FilterOperator::IsEmpty),
            "isnotempty" => Ok(FilterOperator::IsNotEmpty),
            "inlist" | "in" => Ok(FilterOperator::InList),
            "notinlist" => Ok(FilterOperator::NotInList),
            _ => Err(format!("Invalid filter operator '{}'", s)),
        }
    }
}

/// How multiple active criteria combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    #[default]
    And,
    Or,
}

/// A single filter rule attached to one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriterion {
    pub property_name: String,
    pub operator: FilterOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<CellValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<CellValue>,
    /// Candidates for `inList` / `notInList`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<CellValue>,
    #[serde(default)]
    pub is_case_sensitive: bool,
    pub is_active: bool,
    #[serde(default)]
    pub data_type: DataType,
}

/// Result of testing one record against one criterion
enum Outcome {
    Pass,
    Fail,
    Unresolved,
}

impl FilterCriterion {
    /// An active criterion on a string column
    pub fn new(
        property_name: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<CellValue>,
    ) -> Self {
        Self {
            property_name: property_name.into(),
            operator,
            value: Some(value.into()),
            value2: None,
            values: Vec::new(),
            is_case_sensitive: false,
            is_active: true,
            data_type: DataType::String,
        }
    }

    /// An inactive criterion using the default operator for the data type
    pub fn for_column(property_name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            property_name: property_name.into(),
            operator: FilterOperator::default_for(data_type),
            value: None,
            value2: None,
            values: Vec::new(),
            is_case_sensitive: false,
            is_active: false,
            data_type,
        }
    }

    /// Inclusive range on a number column
    pub fn between(
        property_name: impl Into<String>,
        low: impl Into<CellValue>,
        high: impl Into<CellValue>,
    ) -> Self {
        let mut criterion = Self::new(property_name, FilterOperator::Between, low);
        criterion.value2 = Some(high.into());
        criterion.data_type = DataType::Number;
        criterion
    }

    pub fn empty(property_name: impl Into<String>, data_type: DataType) -> Self {
        let mut criterion = Self::for_column(property_name, data_type);
        criterion.operator = FilterOperator::IsEmpty;
        criterion.is_active = true;
        criterion
    }

    pub fn in_list<V: Into<CellValue>>(
        property_name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let mut criterion = Self::for_column(property_name, DataType::String);
        criterion.operator = FilterOperator::InList;
        criterion.values = values.into_iter().map(Into::into).collect();
        criterion.is_active = true;
        criterion
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.is_case_sensitive = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Why this criterion cannot participate, if it cannot
    pub fn invalid_reason(&self) -> Option<String> {
        if !self.operator.is_valid_for(self.data_type) {
            return Some(format!(
                "operator {} is not valid for {} columns",
                self.operator, self.data_type
            ));
        }

        let present = |v: &Option<CellValue>| v.as_ref().is_some_and(|v| !v.is_null());

        if self.operator.needs_value() && !present(&self.value) {
            return Some(format!("operator {} requires a value", self.operator));
        }
        if self.operator == FilterOperator::Between && !present(&self.value2) {
            return Some("between requires both bounds".to_string());
        }
        if self.operator.is_list_operator() && self.values.is_empty() {
            return Some(format!("operator {} requires at least one value", self.operator));
        }
        None
    }

    pub fn is_valid(&self) -> bool {
        self.invalid_reason().is_none()
    }

    /// Active and well-formed
    pub fn participates(&self) -> bool {
        self.is_active && self.is_valid()
    }

    /// Deactivates and clears the operands, keeping the column binding
    pub fn clear(&mut self) {
        self.is_active = false;
        self.value = None;
        self.value2 = None;
        self.values.clear();
        self.operator = FilterOperator::default_for(self.data_type);
    }

    /// Short human-readable description, e.g. `contains 'bolt'`
    pub fn summary(&self) -> String {
        if !self.participates() {
            return String::new();
        }

        let v = self.value.as_ref().map(|v| v.to_string()).unwrap_or_default();
        let v2 = self.value2.as_ref().map(|v| v.to_string()).unwrap_or_default();

        match self.operator {
            FilterOperator::Equals => format!("= '{}'", v),
            FilterOperator::NotEquals => format!("!= '{}'", v),
            FilterOperator::Contains => format!("contains '{}'", v),
            FilterOperator::NotContains => format!("not contains '{}'", v),
            FilterOperator::StartsWith => format!("starts with '{}'", v),
            FilterOperator::EndsWith => format!("ends with '{}'", v),
            FilterOperator::GreaterThan => format!("> {}", v),
            FilterOperator::GreaterOrEqual => format!(">= {}", v),
            FilterOperator::LessThan => format!("< {}", v),
            FilterOperator::LessOrEqual => format!("<= {}", v),
            FilterOperator::Between => format!("between {} and {}", v, v2),
            FilterOperator::IsEmpty => "is empty".to_string(),
            FilterOperator::IsNotEmpty => "is not empty".to_string(),
            FilterOperator::InList => format!("in ({} values)", self.values.len()),
            FilterOperator::NotInList => format!("not in ({} values)", self.values.len()),
        }
    }

    /// Tests a single (already resolved) value; assumes the criterion is valid
    pub fn matches_value(&self, value: &CellValue) -> bool {
        let value = value.coerce_to(self.data_type);
        let operand = self
            .value
            .as_ref()
            .map(|v| v.coerce_to(self.data_type))
            .unwrap_or_default();

        match self.operator {
            FilterOperator::Equals => self.values_equal(&value, &operand),
            FilterOperator::NotEquals => !self.values_equal(&value, &operand),
            FilterOperator::Contains => self.text_test(&value, &operand, |v, o| v.contains(o)),
            FilterOperator::NotContains => {
                !self.text_test(&value, &operand, |v, o| v.contains(o))
            }
            FilterOperator::StartsWith => {
                self.text_test(&value, &operand, |v, o| v.starts_with(o))
            }
            FilterOperator::EndsWith => self.text_test(&value, &operand, |v, o| v.ends_with(o)),
            FilterOperator::GreaterThan => {
                compare_for_filter(&value, &operand).is_some_and(|o| o == Ordering::Greater)
            }
            FilterOperator::GreaterOrEqual => {
                compare_for_filter(&value, &operand).is_some_and(|o| o != Ordering::Less)
            }
            FilterOperator::LessThan => {
                compare_for_filter(&value, &operand).is_some_and(|o| o == Ordering::Less)
            }
            FilterOperator::LessOrEqual => {
                compare_for_filter(&value, &operand).is_some_and(|o| o != Ordering::Greater)
            }
            FilterOperator::Between => {
                let high = self
                    .value2
                    .as_ref()
                    .map(|v| v.coerce_to(self.data_type))
                    .unwrap_or_default();
                compare_for_filter(&value, &operand).is_some_and(|o| o != Ordering::Less)
                    && compare_for_filter(&value, &high).is_some_and(|o| o != Ordering::Greater)
            }
            FilterOperator::IsEmpty => value.is_empty(),
            FilterOperator::IsNotEmpty => !value.is_empty(),
            FilterOperator::InList => self.matches_any(&value),
            FilterOperator::NotInList => !self.matches_any(&value),
        }
    }

    fn outcome(&self, value: Option<CellValue>) -> Outcome {
        match value {
            None => Outcome::Unresolved,
            Some(value) if self.matches_value(&value) => Outcome::Pass,
            Some(_) => Outcome::Fail,
        }
    }

    fn values_equal(&self, value: &CellValue, operand: &CellValue) -> bool {
        match (value, operand) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Null, _) | (_, CellValue::Null) => false,
            (CellValue::Text(a), CellValue::Text(b)) => self.text_equal(a, b),
            (CellValue::Number(a), CellValue::Number(b)) => a == b,
            (CellValue::Boolean(a), CellValue::Boolean(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            (a, b) => self.text_equal(&a.to_string(), &b.to_string()),
        }
    }

    fn text_equal(&self, a: &str, b: &str) -> bool {
        if self.is_case_sensitive {
            a == b
        } else {
            a.to_lowercase() == b.to_lowercase()
        }
    }

    fn text_test(&self, value: &CellValue, operand: &CellValue, test: fn(&str, &str) -> bool) -> bool {
        if value.is_null() {
            return false;
        }
        let (v, o) = (value.to_string(), operand.to_string());
        if self.is_case_sensitive {
            test(&v, &o)
        } else {
            test(&v.to_lowercase(), &o.to_lowercase())
        }
    }

    fn matches_any(&self, value: &CellValue) -> bool {
        self.values
            .iter()
            .any(|candidate| self.values_equal(value, &candidate.coerce_to(self.data_type)))
    }
}

/// Natural ordering where possible, otherwise case-insensitive text order
///
/// `None` when the record value is missing or a NaN.
fn compare_for_filter(value: &CellValue, operand: &CellValue) -> Option<Ordering> {
    if value.is_null() || operand.is_null() {
        return None;
    }
    if let (CellValue::Text(a), CellValue::Text(b)) = (value, operand) {
        return Some(a.to_lowercase().cmp(&b.to_lowercase()));
    }
    if let Some(ordering) = natural_cmp(value, operand) {
        return Some(ordering);
    }
    if let (Some(a), Some(b)) = (value.as_number(), operand.as_number()) {
        return a.partial_cmp(&b);
    }
    Some(
        value
            .to_string()
            .to_lowercase()
            .cmp(&operand.to_string().to_lowercase()),
    )
}

/// Tests one record against one criterion
///
/// Inactive or malformed criteria pass every record, as does a record whose
/// property cannot be resolved.
pub fn evaluate<R, P>(record: &R, criterion: &FilterCriterion, resolver: &P) -> bool
where
    R: ?Sized,
    P: PropertyResolver<R> + ?Sized,
{
    if !criterion.is_active {
        return true;
    }
    if let Some(reason) = criterion.invalid_reason() {
        warn!(
            "Filter on '{}' ignored: {}",
            criterion.property_name, reason
        );
        return true;
    }

    match criterion.outcome(resolver.resolve(record, &criterion.property_name)) {
        Outcome::Pass => true,
        Outcome::Fail => false,
        Outcome::Unresolved => {
            debug!(
                "Filter: property '{}' unresolved; record passes",
                criterion.property_name
            );
            true
        }
    }
}

/// Filters records by the participating criteria, preserving order
///
/// # Examples
/// ```
/// use gridview_core::domain::filter::{filter_records, Combinator, FilterCriterion};
/// use gridview_core::domain::record::{Row, RowResolver};
///
/// let rows = vec![
///     Row::new().with("qty", 4),
///     Row::new().with("qty", 5),
///     Row::new().with("qty", 11),
/// ];
/// let criteria = vec![FilterCriterion::between("qty", 5, 10)];
///
/// let kept = filter_records(&rows, &criteria, Combinator::And, &RowResolver);
/// assert_eq!(kept.len(), 1);
/// ```
pub fn filter_records<'a, R, P>(
    records: &'a [R],
    criteria: &[FilterCriterion],
    combinator: Combinator,
    resolver: &P,
) -> Vec<&'a R>
where
    P: PropertyResolver<R> + ?Sized,
{
    let participating: Vec<&FilterCriterion> = criteria
        .iter()
        .filter(|c| c.is_active)
        .filter(|c| match c.invalid_reason() {
            Some(reason) => {
                warn!("Filter on '{}' ignored: {}", c.property_name, reason);
                false
            }
            None => true,
        })
        .collect();

    if participating.is_empty() {
        return records.iter().collect();
    }

    let mut unresolved = vec![0usize; participating.len()];
    let kept: Vec<&R> = records
        .iter()
        .filter(|record| {
            let mut results = participating.iter().enumerate().map(|(i, criterion)| {
                match criterion.outcome(resolver.resolve(record, &criterion.property_name)) {
                    Outcome::Pass => true,
                    Outcome::Fail => false,
                    Outcome::Unresolved => {
                        unresolved[i] += 1;
                        true
                    }
                }
            });
            match combinator {
                Combinator::And => results.all(|passed| passed),
                Combinator::Or => results.any(|passed| passed),
            }
        })
        .collect();

    for (criterion, count) in participating.iter().zip(unresolved) {
        if count > 0 {
            warn!(
                "Filter: property '{}' could not be resolved for {} records; they pass",
                criterion.property_name, count
            );
        }
    }

    debug!(
        "Filtered {} records to {} with {} criteria ({:?})",
        records.len(),
        kept.len(),
        participating.len(),
        combinator
    );
    kept
}

/// Owned-result form of [`filter_records`]
pub fn apply<R, P>(
    records: &[R],
    criteria: &[FilterCriterion],
    combinator: Combinator,
    resolver: &P,
) -> Vec<R>
where
    R: Clone,
    P: PropertyResolver<R> + ?Sized,
{
    filter_records(records, criteria, combinator, resolver)
        .into_iter()
        .cloned()
        .collect()
}

/// Counts describing the outcome of a filter pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterStatistics {
    pub total_count: usize,
    pub filtered_count: usize,
    pub has_active_filters: bool,
}

impl FilterStatistics {
    pub fn hidden_count(&self) -> usize {
        self.total_count.saturating_sub(self.filtered_count)
    }

    pub fn visibility_percentage(&self) -> f64 {
        if self.total_count == 0 {
            100.0
        } else {
            self.filtered_count as f64 / self.total_count as f64 * 100.0
        }
    }

    pub fn result_summary(&self) -> String {
        if !self.has_active_filters {
            format!("Showing all {} items", self.total_count)
        } else if self.filtered_count == 0 {
            "No items match the current filters".to_string()
        } else {
            format!(
                "Showing {} of {} items ({:.0}% visible)",
                self.filtered_count,
                self.total_count,
                self.visibility_percentage()
            )
        }
    }
}

/// Complete filtering state for a grid: per-column criteria plus global search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfiguration {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub combinator: Combinator,
    pub global_search_text: String,
    pub is_global_search_case_sensitive: bool,
    pub criteria: Vec<FilterCriterion>,
    pub is_active: bool,
    pub is_preset: bool,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl FilterConfiguration {
    pub fn new(display_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            display_name: display_name.into(),
            description: String::new(),
            combinator: Combinator::And,
            global_search_text: String::new(),
            is_global_search_case_sensitive: false,
            criteria: Vec::new(),
            is_active: true,
            is_preset: false,
            created_at: now,
            last_modified: now,
        }
    }

    /// One inactive criterion per filterable column, in display order
    pub fn initialize_from_columns(&mut self, columns: &ColumnModel) {
        self.criteria = columns
            .columns()
            .iter()
            .filter(|c| c.can_filter)
            .map(|c| FilterCriterion::for_column(c.property_name.clone(), c.data_type))
            .collect();
        self.touch();
    }

    pub fn criterion(&self, property_name: &str) -> Option<&FilterCriterion> {
        self.criteria
            .iter()
            .find(|c| c.property_name == property_name)
    }

    pub fn criterion_mut(&mut self, property_name: &str) -> Option<&mut FilterCriterion> {
        self.criteria
            .iter_mut()
            .find(|c| c.property_name == property_name)
    }

    /// Replaces the criterion for the same column, or appends it
    pub fn set_criterion(&mut self, criterion: FilterCriterion) {
        match self.criterion_mut(&criterion.property_name) {
            Some(existing) => *existing = criterion,
            None => self.criteria.push(criterion),
        }
        self.touch();
    }

    pub fn set_global_search(&mut self, text: impl Into<String>) {
        self.global_search_text = text.into();
        self.touch();
    }

    pub fn clear_all(&mut self) {
        self.global_search_text.clear();
        for criterion in &mut self.criteria {
            criterion.clear();
        }
        self.touch();
    }

    pub fn active_filter_count(&self) -> usize {
        self.criteria.iter().filter(|c| c.participates()).count()
    }

    pub fn has_active_filters(&self) -> bool {
        !self.global_search_text.trim().is_empty() || self.active_filter_count() > 0
    }

    /// Whether a record passes global search and the column criteria
    pub fn matches<R, P>(&self, record: &R, resolver: &P) -> bool
    where
        R: ?Sized,
        P: PropertyResolver<R> + ?Sized,
    {
        if !self.is_active || !self.has_active_filters() {
            return true;
        }
        if !self.matches_global_search(record, resolver) {
            return false;
        }

        let mut results = self
            .criteria
            .iter()
            .filter(|c| c.participates())
            .map(|c| evaluate(record, c, resolver));
        match self.combinator {
            Combinator::And => results.all(|passed| passed),
            Combinator::Or => {
                if self.active_filter_count() == 0 {
                    true
                } else {
                    results.any(|passed| passed)
                }
            }
        }
    }

    /// Records passing [`FilterConfiguration::matches`], in input order
    pub fn apply<'a, R, P>(&self, records: &'a [R], resolver: &P) -> Vec<&'a R>
    where
        P: PropertyResolver<R> + ?Sized,
    {
        if !self.is_active || !self.has_active_filters() {
            return records.iter().collect();
        }

        let searched: Vec<&R> = records
            .iter()
            .filter(|r| self.matches_global_search(*r, resolver))
            .collect();
        let mut kept = Vec::with_capacity(searched.len());
        let criteria = filter_records(&searched, &self.criteria, self.combinator, &RefResolver(resolver));
        kept.extend(criteria.into_iter().copied());
        kept
    }

    pub fn statistics(&self, total_count: usize, filtered_count: usize) -> FilterStatistics {
        FilterStatistics {
            total_count,
            filtered_count,
            has_active_filters: self.is_active && self.has_active_filters(),
        }
    }

    /// e.g. `Global: 'bolt', 2 column filters`
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if !self.global_search_text.trim().is_empty() {
            parts.push(format!("Global: '{}'", self.global_search_text));
        }

        let active: Vec<&FilterCriterion> =
            self.criteria.iter().filter(|c| c.participates()).collect();
        match active.as_slice() {
            [] => {}
            [only] => parts.push(format!("{}: {}", only.property_name, only.summary())),
            many => parts.push(format!("{} column filters", many.len())),
        }

        if parts.is_empty() {
            "No active filters".to_string()
        } else {
            parts.join(", ")
        }
    }

    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }

    /// Global search matches text in any string-typed criterion column
    ///
    /// With no string-typed criteria there is nothing to search, so every
    /// record passes.
    fn matches_global_search<R, P>(&self, record: &R, resolver: &P) -> bool
    where
        R: ?Sized,
        P: PropertyResolver<R> + ?Sized,
    {
        let needle = self.global_search_text.trim();
        if needle.is_empty() {
            return true;
        }
        if !self.criteria.iter().any(|c| c.data_type == DataType::String) {
            debug!("Global search '{}' ignored: no string columns", needle);
            return true;
        }
        let needle = if self.is_global_search_case_sensitive {
            needle.to_string()
        } else {
            needle.to_lowercase()
        };

        self.criteria
            .iter()
            .filter(|c| c.data_type == DataType::String)
            .filter_map(|c| resolver.resolve(record, &c.property_name))
            .filter(|v| !v.is_empty())
            .any(|v| {
                let text = v.to_string();
                if self.is_global_search_case_sensitive {
                    text.contains(&needle)
                } else {
                    text.to_lowercase().contains(&needle)
                }
            })
    }
}

impl Default for FilterConfiguration {
    fn default() -> Self {
        Self::new("Default Filters")
    }
}

/// Lifts a resolver over `R` to one over `&R`
struct RefResolver<'p, P: ?Sized>(&'p P);

impl<'p, 'r, R, P> PropertyResolver<&'r R> for RefResolver<'p, P>
where
    R: ?Sized,
    P: PropertyResolver<R> + ?Sized,
{
    fn resolve(&self, record: &&'r R, property: &str) -> Option<CellValue> {
        self.0.resolve(*record, property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::column::Column;
    use crate::domain::record::{Row, RowResolver};
    use chrono::TimeZone;

    fn qty_rows() -> Vec<Row> {
        [4, 5, 7, 10, 11]
            .into_iter()
            .map(|q| Row::new().with("qty", q))
            .collect()
    }

    fn qtys(rows: &[&Row]) -> Vec<String> {
        rows.iter()
            .map(|r| r.get("qty").map(|v| v.to_string()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_between_is_inclusive() {
        let rows = qty_rows();
        let criteria = vec![FilterCriterion::between("qty", 5, 10)];

        let kept = filter_records(&rows, &criteria, Combinator::And, &RowResolver);

        assert_eq!(qtys(&kept), vec!["5", "7", "10"]);
    }

    #[test]
    fn test_between_without_upper_bound_is_ignored() {
        let rows = qty_rows();
        let mut criterion = FilterCriterion::between("qty", 5, 10);
        criterion.value2 = None;

        let kept = filter_records(&rows, &[criterion], Combinator::And, &RowResolver);

        assert_eq!(kept.len(), rows.len());
    }

    #[test]
    fn test_inactive_and_invalid_criteria_fail_open() {
        let rows = qty_rows();

        let inactive = FilterCriterion::new("qty", FilterOperator::Equals, 4)
            .with_data_type(DataType::Number)
            .inactive();
        assert_eq!(
            filter_records(&rows, &[inactive], Combinator::And, &RowResolver).len(),
            5
        );

        // contains is not a number operator
        let invalid = FilterCriterion::new("qty", FilterOperator::Contains, "1")
            .with_data_type(DataType::Number);
        assert!(!invalid.is_valid());
        assert_eq!(
            filter_records(&rows, &[invalid.clone()], Combinator::And, &RowResolver).len(),
            5
        );
        assert!(evaluate(&rows[0], &invalid, &RowResolver));
    }

    #[test]
    fn test_equals_honors_case_sensitivity() {
        let row = Row::new().with("name", "Bolt");

        let insensitive = FilterCriterion::new("name", FilterOperator::Equals, "bolt");
        assert!(evaluate(&row, &insensitive, &RowResolver));

        let sensitive = insensitive.clone().case_sensitive();
        assert!(!evaluate(&row, &sensitive, &RowResolver));

        let not_equals = FilterCriterion::new("name", FilterOperator::NotEquals, "nut");
        assert!(evaluate(&row, &not_equals, &RowResolver));
    }

    #[test]
    fn test_text_operators() {
        let row = Row::new().with("name", "Hex Bolt M8");

        let contains = FilterCriterion::new("name", FilterOperator::Contains, "bolt");
        let starts = FilterCriterion::new("name", FilterOperator::StartsWith, "hex");
        let ends = FilterCriterion::new("name", FilterOperator::EndsWith, "m8");
        let not_contains = FilterCriterion::new("name", FilterOperator::NotContains, "nut");

        assert!(evaluate(&row, &contains, &RowResolver));
        assert!(evaluate(&row, &starts, &RowResolver));
        assert!(evaluate(&row, &ends, &RowResolver));
        assert!(evaluate(&row, &not_contains, &RowResolver));
        assert!(!evaluate(&row, &starts.case_sensitive(), &RowResolver));
    }

    #[test]
    fn test_text_operators_stringify_numbers() {
        let row = Row::new().with("operation", 110);
        let criterion = FilterCriterion::new("operation", FilterOperator::StartsWith, "11");
        assert!(evaluate(&row, &criterion, &RowResolver));
    }

    #[test]
    fn test_comparisons_coerce_numeric_text() {
        let rows = vec![
            Row::new().with("qty", "90"),
            Row::new().with("qty", "100"),
            Row::new().with("qty", "110"),
        ];
        let criterion = FilterCriterion::new("qty", FilterOperator::GreaterThan, "95")
            .with_data_type(DataType::Number);

        let kept = filter_records(&rows, &[criterion], Combinator::And, &RowResolver);

        assert_eq!(qtys(&kept), vec!["100", "110"]);
    }

    #[test]
    fn test_comparison_falls_back_to_text() {
        let row = Row::new().with("code", "beta");
        let criterion = FilterCriterion::new("code", FilterOperator::GreaterThan, "ALPHA")
            .with_data_type(DataType::Number);
        // text value on a number column is not directly comparable
        assert!(criterion.matches_value(&CellValue::text("beta")));
        assert!(evaluate(&row, &criterion, &RowResolver));
    }

    #[test]
    fn test_date_comparisons() {
        let row = Row::new().with("created", Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
        let criterion = FilterCriterion::new("created", FilterOperator::GreaterOrEqual, "2024-06-01")
            .with_data_type(DataType::Date);
        assert!(evaluate(&row, &criterion, &RowResolver));

        let before = FilterCriterion::new("created", FilterOperator::LessThan, "2024-06-01")
            .with_data_type(DataType::Date);
        assert!(!evaluate(&row, &before, &RowResolver));
    }

    #[test]
    fn test_empty_operators() {
        let rows = vec![
            Row::new().with("notes", "   "),
            Row::new().with("notes", CellValue::Null),
            Row::new().with("notes", CellValue::List(vec![])),
            Row::new().with("notes", "check"),
        ];

        let empty = FilterCriterion::empty("notes", DataType::String);
        assert_eq!(
            filter_records(&rows, &[empty.clone()], Combinator::And, &RowResolver).len(),
            3
        );

        let mut not_empty = empty;
        not_empty.operator = FilterOperator::IsNotEmpty;
        assert_eq!(
            filter_records(&rows, &[not_empty], Combinator::And, &RowResolver).len(),
            1
        );
    }

    #[test]
    fn test_list_operators() {
        let rows = vec![
            Row::new().with("loc", "A1"),
            Row::new().with("loc", "B2"),
            Row::new().with("loc", "C3"),
        ];
        let criterion = FilterCriterion::in_list("loc", ["a1", "C3"]);
        let kept = filter_records(&rows, &[criterion.clone()], Combinator::And, &RowResolver);
        assert_eq!(kept.len(), 2);

        let mut not_in = criterion;
        not_in.operator = FilterOperator::NotInList;
        let kept = filter_records(&rows, &[not_in], Combinator::And, &RowResolver);
        assert_eq!(kept.len(), 1);

        let empty_list = FilterCriterion::in_list("loc", Vec::<String>::new());
        assert!(!empty_list.is_valid());
    }

    #[test]
    fn test_and_or_combinators() {
        let rows = vec![
            Row::new().with("name", "bolt").with("qty", 5),
            Row::new().with("name", "nut").with("qty", 50),
            Row::new().with("name", "washer").with("qty", 1),
        ];
        let criteria = vec![
            FilterCriterion::new("name", FilterOperator::Contains, "o"),
            FilterCriterion::new("qty", FilterOperator::GreaterThan, 10)
                .with_data_type(DataType::Number),
        ];

        let and = filter_records(&rows, &criteria, Combinator::And, &RowResolver);
        assert!(and.is_empty());

        let or = filter_records(&rows, &criteria, Combinator::Or, &RowResolver);
        assert_eq!(or.len(), 2);
    }

    #[test]
    fn test_empty_criteria_is_identity() {
        let rows = qty_rows();
        let kept = apply(&rows, &[], Combinator::Or, &RowResolver);
        assert_eq!(kept, rows);
    }

    #[test]
    fn test_unresolved_property_passes() {
        let rows = vec![Row::new().with("qty", 1), Row::new()];
        let criterion = FilterCriterion::new("qty", FilterOperator::GreaterThan, 5)
            .with_data_type(DataType::Number);

        let kept = filter_records(&rows, &[criterion], Combinator::And, &RowResolver);

        assert_eq!(kept.len(), 1);
        assert!(kept[0].get("qty").is_none());
    }

    #[test]
    fn test_operator_sets() {
        assert!(FilterOperator::Contains.is_valid_for(DataType::String));
        assert!(!FilterOperator::GreaterThan.is_valid_for(DataType::String));
        assert!(FilterOperator::Between.is_valid_for(DataType::Date));
        assert!(!FilterOperator::Between.is_valid_for(DataType::Boolean));
        assert_eq!(FilterOperator::default_for(DataType::String), FilterOperator::Contains);
        assert_eq!(FilterOperator::default_for(DataType::Number), FilterOperator::Equals);
        assert_eq!(">=".parse::<FilterOperator>().unwrap(), FilterOperator::GreaterOrEqual);
    }

    #[test]
    fn test_summaries() {
        assert_eq!(
            FilterCriterion::new("name", FilterOperator::Contains, "bolt").summary(),
            "contains 'bolt'"
        );
        assert_eq!(FilterCriterion::between("qty", 5, 10).summary(), "between 5 and 10");
        assert_eq!(
            FilterCriterion::in_list("loc", ["A", "B"]).summary(),
            "in (2 values)"
        );
    }

    fn parts_model() -> ColumnModel {
        ColumnModel::from_columns(vec![
            Column::text("part", "Part"),
            Column::text("location", "Location"),
            Column::numeric("qty", "Quantity"),
            Column::boolean("active", "Active"),
        ])
        .unwrap()
    }

    fn parts() -> Vec<Row> {
        vec![
            Row::new().with("part", "BOLT-1").with("location", "A1").with("qty", 5),
            Row::new().with("part", "NUT-2").with("location", "B7").with("qty", 12),
            Row::new().with("part", "WASHER").with("location", "bolt bin").with("qty", 40),
        ]
    }

    #[test]
    fn test_configuration_initializes_from_filterable_columns() {
        let mut config = FilterConfiguration::new("Parts");
        config.initialize_from_columns(&parts_model());

        assert_eq!(config.criteria.len(), 3);
        assert!(config.criterion("active").is_none());
        assert_eq!(
            config.criterion("qty").unwrap().operator,
            FilterOperator::Equals
        );
        assert!(!config.has_active_filters());
        assert_eq!(config.summary(), "No active filters");
    }

    #[test]
    fn test_configuration_global_search() {
        let mut config = FilterConfiguration::new("Parts");
        config.initialize_from_columns(&parts_model());
        config.set_global_search("BOLT");

        let records = parts();
        let kept = config.apply(&records, &RowResolver);

        assert_eq!(kept.len(), 2);
        assert_eq!(config.summary(), "Global: 'BOLT'");
    }

    #[test]
    fn test_configuration_column_filters_and_statistics() {
        let mut config = FilterConfiguration::new("Parts");
        config.initialize_from_columns(&parts_model());
        config.set_criterion(
            FilterCriterion::new("qty", FilterOperator::GreaterOrEqual, 10)
                .with_data_type(DataType::Number),
        );

        let records = parts();
        let kept = config.apply(&records, &RowResolver);
        assert_eq!(kept.len(), 2);
        assert!(config.matches(&records[1], &RowResolver));
        assert!(!config.matches(&records[0], &RowResolver));
        assert_eq!(config.summary(), "qty: >= 10");

        let stats = config.statistics(records.len(), kept.len());
        assert_eq!(stats.hidden_count(), 1);
        assert_eq!(stats.result_summary(), "Showing 2 of 3 items (67% visible)");

        config.clear_all();
        assert_eq!(config.active_filter_count(), 0);
        assert_eq!(config.apply(&records, &RowResolver).len(), 3);
        assert_eq!(
            config.statistics(3, 3).result_summary(),
            "Showing all 3 items"
        );
    }

    #[test]
    fn test_global_search_without_string_columns_passes_all() {
        let mut config = FilterConfiguration::new("Bare");
        config.set_global_search("bolt");

        let records = parts();
        assert_eq!(config.apply(&records, &RowResolver).len(), 3);
        assert!(config.matches(&records[0], &RowResolver));

        config.set_criterion(FilterCriterion::for_column("part", DataType::String));
        assert_eq!(config.apply(&records, &RowResolver).len(), 1);
    }

    #[test]
    fn test_statistics_no_matches() {
        let stats = FilterStatistics {
            total_count: 4,
            filtered_count: 0,
            has_active_filters: true,
        };
        assert_eq!(stats.result_summary(), "No items match the current filters");
        assert_eq!(stats.visibility_percentage(), 0.0);
    }
}
