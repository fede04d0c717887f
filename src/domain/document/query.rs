//! Store-independent query model
//!
//! Both storage backends load the candidate documents of one collection in
//! insertion order and hand them to [`Query::execute`], so filtering,
//! ordering and paging behave identically everywhere.

use std::cmp::Ordering;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collection::Collection;
use crate::shared::errors::{DomainError, DomainResult};

/// A document as held by a store: its id, insertion sequence and body.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    /// Assigned on first write and kept on overwrite
    pub seq: u64,
    pub body: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    ArrayContains,
    In,
}

impl FilterOp {
    fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::ArrayContains => "array-contains",
            Self::In => "in",
        }
    }
}

/// Predicate on one (possibly dotted) document field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    pub fn matches(&self, doc: &Value) -> bool {
        let Some(actual) = lookup(doc, &self.field) else {
            return false;
        };

        match self.op {
            FilterOp::Eq => values_equal(actual, &self.value),
            FilterOp::Ne => !values_equal(actual, &self.value),
            FilterOp::Lt => comparable(actual, &self.value) == Some(Ordering::Less),
            FilterOp::Lte => matches!(
                comparable(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOp::Gt => comparable(actual, &self.value) == Some(Ordering::Greater),
            FilterOp::Gte => matches!(
                comparable(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::ArrayContains => actual
                .as_array()
                .is_some_and(|items| items.iter().any(|v| values_equal(v, &self.value))),
            FilterOp::In => self
                .value
                .as_array()
                .is_some_and(|options| options.iter().any(|v| values_equal(actual, v))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// One page of query results.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<StoredDocument>,
    /// Present only when more matching documents follow this page
    pub next_cursor: Option<String>,
}

/// Query over a single collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub collection: Collection,
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

impl Query {
    pub fn collection(collection: Collection) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order_by: None,
            limit: None,
            cursor: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Filter::eq(field, value))
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by = Some(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn matches(&self, doc: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }

    /// Canonical key identifying what this query selects.
    ///
    /// Two queries with the same signature share one registry entry in the
    /// subscription hub. The cursor is not part of the key.
    pub fn signature(&self) -> String {
        let filters: Vec<String> = self
            .filters
            .iter()
            .map(|f| format!("{}{}{}", f.field, f.op.symbol(), f.value))
            .collect();
        let order = self
            .order_by
            .as_ref()
            .map(|o| format!("{}:{:?}", o.field, o.direction))
            .unwrap_or_default();
        let limit = self.limit.map(|l| l.to_string()).unwrap_or_default();
        format!(
            "{}?{}#{}#{}",
            self.collection,
            filters.join("&"),
            order,
            limit
        )
    }

    /// Filter, order and page a collection's documents.
    pub fn execute(&self, mut docs: Vec<StoredDocument>) -> DomainResult<Page> {
        docs.sort_by_key(|d| d.seq);
        docs.retain(|d| self.matches(&d.body));

        if let Some(order) = &self.order_by {
            // stable: equal keys keep insertion order
            docs.sort_by(|a, b| {
                let ord = compare_values(lookup(&a.body, &order.field), lookup(&b.body, &order.field));
                match order.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        let offset = match &self.cursor {
            Some(cursor) => decode_cursor(cursor)?,
            None => 0,
        };
        let total = docs.len();
        let items: Vec<StoredDocument> = match self.limit {
            Some(limit) => docs.into_iter().skip(offset).take(limit).collect(),
            None => docs.into_iter().skip(offset).collect(),
        };
        let consumed = offset + items.len();
        let next_cursor = (self.limit.is_some() && consumed < total).then(|| encode_cursor(consumed));

        Ok(Page { items, next_cursor })
    }
}

fn encode_cursor(offset: usize) -> String {
    URL_SAFE_NO_PAD.encode(format!("offset:{}", offset))
}

fn decode_cursor(cursor: &str) -> DomainResult<usize> {
    let invalid = || DomainError::Validation(format!("Invalid cursor: {}", cursor));
    let bytes = URL_SAFE_NO_PAD.decode(cursor).map_err(|_| invalid())?;
    let text = String::from_utf8(bytes).map_err(|_| invalid())?;
    text.strip_prefix("offset:")
        .and_then(|n| n.parse().ok())
        .ok_or_else(invalid)
}

/// Resolve a dotted field path inside a document.
pub fn lookup<'a>(doc: &'a Value, field: &str) -> Option<&'a Value> {
    field
        .split('.')
        .try_fold(doc, |current, key| current.as_object()?.get(key))
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn comparable(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(compare_strings(x, y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// RFC 3339 timestamps compare by instant, since their fractional seconds
/// vary in width; other strings compare bytewise.
fn compare_strings(a: &str, b: &str) -> Ordering {
    match (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

fn type_rank(v: Option<&Value>) -> u8 {
    match v {
        None => 0,
        Some(Value::Null) => 1,
        Some(Value::Bool(_)) => 2,
        Some(Value::Number(_)) => 3,
        Some(Value::String(_)) => 4,
        Some(Value::Array(_)) => 5,
        Some(Value::Object(_)) => 6,
    }
}

/// Total order used for sorting: missing < null < bool < number < string.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => comparable(x, y).unwrap_or_else(|| type_rank(a).cmp(&type_rank(b))),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
