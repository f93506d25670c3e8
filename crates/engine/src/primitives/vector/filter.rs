//! Metadata and document filtering
//!
//! A [`MetadataFilter`] is parsed from a JSON object whose top-level entries
//! are AND-ed:
//!
//! | Entry | Meaning |
//! |-------|---------|
//! | `"$and": [f, ...]` | every sub-filter matches (`[]` matches) |
//! | `"$or": [f, ...]` | some sub-filter matches (`[]` never matches) |
//! | `"field": {"$op": v, ...}` | every operator holds on `metadata[field]` |
//! | `"field": v` | `metadata[field]` equals `v` |
//!
//! Operators: `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`, `$nin`.
//!
//! A [`DocumentFilter`] tests the document text with `$contains` and
//! `$not_contains`.
//!
//! Numbers compare by value (`1` equals `1.0`). Ordering operators only hold
//! between two numbers or two strings. A missing field satisfies `$ne` and
//! `$nin` and nothing else. Items without metadata behave like items with an
//! empty metadata object.

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::cmp::Ordering;

use crate::primitives::vector::{VectorError, VectorItem, VectorResult};

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
    /// `$eq`
    Eq,
    /// `$ne`
    Ne,
    /// `$gt`
    Gt,
    /// `$gte`
    Gte,
    /// `$lt`
    Lt,
    /// `$lte`
    Lte,
    /// `$in`: operand is an array
    In,
    /// `$nin`: operand is an array
    Nin,
}

impl FilterOp {
    /// Parse an operator key such as `"$gte"`
    pub fn parse(key: &str) -> Option<Self> {
        Some(match key {
            "$eq" => FilterOp::Eq,
            "$ne" => FilterOp::Ne,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$in" => FilterOp::In,
            "$nin" => FilterOp::Nin,
            _ => return None,
        })
    }

    /// The operator key
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "$eq",
            FilterOp::Ne => "$ne",
            FilterOp::Gt => "$gt",
            FilterOp::Gte => "$gte",
            FilterOp::Lt => "$lt",
            FilterOp::Lte => "$lte",
            FilterOp::In => "$in",
            FilterOp::Nin => "$nin",
        }
    }

    fn is_ordering(&self) -> bool {
        matches!(
            self,
            FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte
        )
    }

    fn is_membership(&self) -> bool {
        matches!(self, FilterOp::In | FilterOp::Nin)
    }
}

/// One operator applied to a field
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    /// Operator
    pub op: FilterOp,
    /// Operand
    pub value: JsonValue,
}

impl FilterCondition {
    /// Build a condition, checking the operand shape
    pub fn new(op: FilterOp, value: impl Into<JsonValue>) -> VectorResult<Self> {
        let value = value.into();
        if op.is_membership() && !value.is_array() {
            return Err(VectorError::InvalidFilter(format!(
                "{} expects an array operand",
                op.as_str()
            )));
        }
        if op.is_ordering() && !(value.is_number() || value.is_string()) {
            return Err(VectorError::InvalidFilter(format!(
                "{} expects a number or string operand",
                op.as_str()
            )));
        }
        Ok(FilterCondition { op, value })
    }

    /// Evaluate against a field value (`None` when the field is missing)
    pub fn holds(&self, actual: Option<&JsonValue>) -> bool {
        match self.op {
            FilterOp::Eq => actual.is_some_and(|a| json_eq(a, &self.value)),
            FilterOp::Ne => !actual.is_some_and(|a| json_eq(a, &self.value)),
            FilterOp::Gt => ordering(actual, &self.value).is_some_and(|o| o == Ordering::Greater),
            FilterOp::Gte => ordering(actual, &self.value).is_some_and(|o| o != Ordering::Less),
            FilterOp::Lt => ordering(actual, &self.value).is_some_and(|o| o == Ordering::Less),
            FilterOp::Lte => ordering(actual, &self.value).is_some_and(|o| o != Ordering::Greater),
            FilterOp::In => member(actual, &self.value),
            FilterOp::Nin => !member(actual, &self.value),
        }
    }
}

/// One top-level entry of a metadata filter
#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    /// `$and`: every sub-filter matches
    And(Vec<MetadataFilter>),
    /// `$or`: at least one sub-filter matches
    Or(Vec<MetadataFilter>),
    /// `field: {"$op": value, ...}`: every condition holds
    Compare {
        /// Metadata key
        field: String,
        /// Conditions on that key
        conditions: Vec<FilterCondition>,
    },
    /// `field: value`: plain equality
    Equals {
        /// Metadata key
        field: String,
        /// Expected value
        value: JsonValue,
    },
}

impl FilterClause {
    fn matches(&self, metadata: &JsonMap<String, JsonValue>) -> bool {
        match self {
            FilterClause::And(filters) => filters.iter().all(|f| f.matches_object(metadata)),
            FilterClause::Or(filters) => filters.iter().any(|f| f.matches_object(metadata)),
            FilterClause::Compare { field, conditions } => {
                let actual = metadata.get(field);
                conditions.iter().all(|c| c.holds(actual))
            }
            FilterClause::Equals { field, value } => {
                metadata.get(field).is_some_and(|a| json_eq(a, value))
            }
        }
    }

    fn key(&self) -> &str {
        match self {
            FilterClause::And(_) => "$and",
            FilterClause::Or(_) => "$or",
            FilterClause::Compare { field, .. } | FilterClause::Equals { field, .. } => field,
        }
    }

    fn value_json(&self) -> JsonValue {
        match self {
            FilterClause::And(filters) | FilterClause::Or(filters) => {
                JsonValue::Array(filters.iter().map(MetadataFilter::to_json).collect())
            }
            FilterClause::Compare { conditions, .. } => JsonValue::Object(
                conditions
                    .iter()
                    .map(|c| (c.op.as_str().to_string(), c.value.clone()))
                    .collect(),
            ),
            FilterClause::Equals { value, .. } => value.clone(),
        }
    }
}

/// Predicate over item metadata
///
/// An empty filter matches everything.
///
/// # Example
///
/// ```text
/// let filter = MetadataFilter::new()
///     .eq("category", "news")
///     .compare("year", FilterOp::Gte, 2020)?;
///
/// let same = MetadataFilter::parse(&json!({
///     "category": "news",
///     "year": {"$gte": 2020}
/// }))?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "JsonValue", into = "JsonValue")]
pub struct MetadataFilter {
    clauses: Vec<FilterClause>,
}

impl MetadataFilter {
    /// Create an empty filter (matches everything)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain equality clause
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.clauses.push(FilterClause::Equals {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Add a single-operator comparison clause
    pub fn compare(
        mut self,
        field: impl Into<String>,
        op: FilterOp,
        value: impl Into<JsonValue>,
    ) -> VectorResult<Self> {
        self.clauses.push(FilterClause::Compare {
            field: field.into(),
            conditions: vec![FilterCondition::new(op, value)?],
        });
        Ok(self)
    }

    /// Add an `$and` clause
    pub fn and(mut self, filters: Vec<MetadataFilter>) -> Self {
        self.clauses.push(FilterClause::And(filters));
        self
    }

    /// Add an `$or` clause
    pub fn or(mut self, filters: Vec<MetadataFilter>) -> Self {
        self.clauses.push(FilterClause::Or(filters));
        self
    }

    /// Top-level clauses
    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    /// Check if filter is empty (matches all)
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Number of top-level clauses
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Parse a JSON filter document
    ///
    /// # Errors
    ///
    /// `InvalidFilter` if the document is not an object, uses an unknown
    /// `$` key, or gives an operator an operand of the wrong shape.
    pub fn parse(value: &JsonValue) -> VectorResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| VectorError::InvalidFilter("filter must be a JSON object".into()))?;

        let mut clauses = Vec::with_capacity(object.len());
        for (key, value) in object {
            let clause = match key.as_str() {
                "$and" => FilterClause::And(parse_filter_list(key, value)?),
                "$or" => FilterClause::Or(parse_filter_list(key, value)?),
                other if other.starts_with('$') => {
                    return Err(VectorError::InvalidFilter(format!(
                        "unknown operator '{}'",
                        other
                    )))
                }
                field => parse_field(field, value)?,
            };
            clauses.push(clause);
        }
        Ok(MetadataFilter { clauses })
    }

    /// Evaluate against item metadata (`None` behaves as `{}`)
    pub fn matches(&self, metadata: Option<&JsonValue>) -> bool {
        match metadata.and_then(JsonValue::as_object) {
            Some(object) => self.matches_object(object),
            None => self.matches_object(&JsonMap::new()),
        }
    }

    fn matches_object(&self, metadata: &JsonMap<String, JsonValue>) -> bool {
        self.clauses.iter().all(|c| c.matches(metadata))
    }

    /// Render back to a JSON filter document
    ///
    /// Clauses sharing a key are wrapped in `$and` so none is lost.
    pub fn to_json(&self) -> JsonValue {
        let mut object = JsonMap::new();
        for clause in &self.clauses {
            if object.contains_key(clause.key()) {
                let all = self
                    .clauses
                    .iter()
                    .map(|c| {
                        let mut single = JsonMap::new();
                        single.insert(c.key().to_string(), c.value_json());
                        JsonValue::Object(single)
                    })
                    .collect();
                let mut wrapped = JsonMap::new();
                wrapped.insert("$and".to_string(), JsonValue::Array(all));
                return JsonValue::Object(wrapped);
            }
            object.insert(clause.key().to_string(), clause.value_json());
        }
        JsonValue::Object(object)
    }
}

fn parse_filter_list(key: &str, value: &JsonValue) -> VectorResult<Vec<MetadataFilter>> {
    value
        .as_array()
        .ok_or_else(|| VectorError::InvalidFilter(format!("{} expects an array of filters", key)))?
        .iter()
        .map(MetadataFilter::parse)
        .collect()
}

fn parse_field(field: &str, value: &JsonValue) -> VectorResult<FilterClause> {
    let operators = match value {
        JsonValue::Object(map) if map.keys().any(|k| k.starts_with('$')) => map,
        _ => {
            return Ok(FilterClause::Equals {
                field: field.to_string(),
                value: value.clone(),
            })
        }
    };

    let conditions = operators
        .iter()
        .map(|(key, operand)| {
            let op = FilterOp::parse(key).ok_or_else(|| {
                VectorError::InvalidFilter(format!(
                    "unknown operator '{}' on field '{}'",
                    key, field
                ))
            })?;
            FilterCondition::new(op, operand.clone())
        })
        .collect::<VectorResult<Vec<_>>>()?;

    Ok(FilterClause::Compare {
        field: field.to_string(),
        conditions,
    })
}

impl TryFrom<JsonValue> for MetadataFilter {
    type Error = VectorError;

    fn try_from(value: JsonValue) -> VectorResult<Self> {
        MetadataFilter::parse(&value)
    }
}

impl From<MetadataFilter> for JsonValue {
    fn from(filter: MetadataFilter) -> Self {
        filter.to_json()
    }
}

/// One document condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentCondition {
    /// `$contains`: substring present
    Contains(String),
    /// `$not_contains`: substring absent
    NotContains(String),
}

/// Predicate over item document text
///
/// Conditions are AND-ed. An absent document is tested as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "JsonValue", into = "JsonValue")]
pub struct DocumentFilter {
    conditions: Vec<DocumentCondition>,
}

impl DocumentFilter {
    /// Create an empty filter (matches everything)
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a substring
    pub fn contains(mut self, needle: impl Into<String>) -> Self {
        self.conditions
            .push(DocumentCondition::Contains(needle.into()));
        self
    }

    /// Forbid a substring
    pub fn not_contains(mut self, needle: impl Into<String>) -> Self {
        self.conditions
            .push(DocumentCondition::NotContains(needle.into()));
        self
    }

    /// Conditions
    pub fn conditions(&self) -> &[DocumentCondition] {
        &self.conditions
    }

    /// Check if filter is empty (matches all)
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Parse `{"$contains": "...", "$not_contains": "..."}`
    pub fn parse(value: &JsonValue) -> VectorResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            VectorError::InvalidFilter("document filter must be a JSON object".into())
        })?;

        let mut conditions = Vec::with_capacity(object.len());
        for (key, operand) in object {
            let needle = operand.as_str().ok_or_else(|| {
                VectorError::InvalidFilter(format!("{} expects a string operand", key))
            })?;
            conditions.push(match key.as_str() {
                "$contains" => DocumentCondition::Contains(needle.to_string()),
                "$not_contains" => DocumentCondition::NotContains(needle.to_string()),
                other => {
                    return Err(VectorError::InvalidFilter(format!(
                        "unknown document operator '{}'",
                        other
                    )))
                }
            });
        }
        Ok(DocumentFilter { conditions })
    }

    /// Evaluate against a document
    pub fn matches(&self, document: Option<&str>) -> bool {
        let document = document.unwrap_or("");
        self.conditions.iter().all(|c| match c {
            DocumentCondition::Contains(needle) => document.contains(needle.as_str()),
            DocumentCondition::NotContains(needle) => !document.contains(needle.as_str()),
        })
    }

    /// Render back to JSON
    ///
    /// Repeated operators are not representable in one object; the last wins.
    pub fn to_json(&self) -> JsonValue {
        let object = self
            .conditions
            .iter()
            .map(|c| match c {
                DocumentCondition::Contains(n) => ("$contains".to_string(), JsonValue::from(n.as_str())),
                DocumentCondition::NotContains(n) => {
                    ("$not_contains".to_string(), JsonValue::from(n.as_str()))
                }
            })
            .collect();
        JsonValue::Object(object)
    }
}

impl TryFrom<JsonValue> for DocumentFilter {
    type Error = VectorError;

    fn try_from(value: JsonValue) -> VectorResult<Self> {
        DocumentFilter::parse(&value)
    }
}

impl From<DocumentFilter> for JsonValue {
    fn from(filter: DocumentFilter) -> Self {
        filter.to_json()
    }
}

/// Check an item against optional metadata and document filters
///
/// An absent filter matches everything on its axis.
pub fn matches(
    item: &VectorItem,
    metadata_filter: Option<&MetadataFilter>,
    document_filter: Option<&DocumentFilter>,
) -> bool {
    metadata_filter.map_or(true, |f| f.matches(item.metadata.as_ref()))
        && document_filter.map_or(true, |f| f.matches(item.document.as_deref()))
}

/// JSON equality with numbers compared by value
fn json_eq(a: &JsonValue, b: &JsonValue) -> bool {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                x.as_f64() == y.as_f64()
            }
        }
        (JsonValue::Array(xs), JsonValue::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
        }
        (JsonValue::Object(xs), JsonValue::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| json_eq(x, y)))
        }
        _ => a == b,
    }
}

/// Ordering between a field value and an operand, if they are comparable
fn ordering(actual: Option<&JsonValue>, operand: &JsonValue) -> Option<Ordering> {
    match (actual?, operand) {
        (JsonValue::Number(x), JsonValue::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (JsonValue::String(x), JsonValue::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn member(actual: Option<&JsonValue>, operand: &JsonValue) -> bool {
    match (actual, operand.as_array()) {
        (Some(a), Some(candidates)) => candidates.iter().any(|c| json_eq(a, c)),
        _ => false,
    }
}
