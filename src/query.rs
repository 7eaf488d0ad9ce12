//! Query construction and validation.
//!
//! A [`QuerySpec`] bundles the free-text term, an optional [`Filter`]
//! expression, ordering, field projection, and a result cap. Specs are built
//! through [`QueryBuilder`], validated against the index [`Schema`] before
//! anything reaches the wire, and lowered to a request body by the search
//! engine.

use crate::error::{Result, SearchError};
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// Comparison operators usable in filter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonOp {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

impl ComparisonOp {
    /// Operator name as it appears in rendered expressions.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "eq",
            ComparisonOp::Ne => "ne",
            ComparisonOp::Lt => "lt",
            ComparisonOp::Le => "le",
            ComparisonOp::Gt => "gt",
            ComparisonOp::Ge => "ge",
        }
    }
}

/// A boolean predicate over filterable fields.
///
/// Filters are carried structurally on the wire; [`fmt::Display`] renders
/// the conventional `field op value` surface for messages and logs, e.g.
/// `baseRate lt 150` or `gender eq 'Female'`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Filter {
    /// Compare a field against a literal value.
    Compare {
        /// Field name; must be filterable.
        field: String,
        /// Comparison operator.
        op: ComparisonOp,
        /// Literal to compare against.
        value: Value,
    },
    /// All sub-filters must hold.
    And(Vec<Filter>),
    /// At least one sub-filter must hold.
    Or(Vec<Filter>),
    /// The sub-filter must not hold.
    Not(Box<Filter>),
}

impl Filter {
    /// `field eq value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ComparisonOp::Eq, value)
    }

    /// `field ne value`.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ComparisonOp::Ne, value)
    }

    /// `field lt value`.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ComparisonOp::Lt, value)
    }

    /// `field le value`.
    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ComparisonOp::Le, value)
    }

    /// `field gt value`.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ComparisonOp::Gt, value)
    }

    /// `field ge value`.
    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ComparisonOp::Ge, value)
    }

    /// Build a comparison filter.
    pub fn compare(field: impl Into<String>, op: ComparisonOp, value: impl Into<Value>) -> Self {
        Filter::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Combine with another filter under logical AND.
    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::And(mut filters) => {
                filters.push(other);
                Filter::And(filters)
            }
            first => Filter::And(vec![first, other]),
        }
    }

    /// Combine with another filter under logical OR.
    pub fn or(self, other: Filter) -> Self {
        match self {
            Filter::Or(mut filters) => {
                filters.push(other);
                Filter::Or(filters)
            }
            first => Filter::Or(vec![first, other]),
        }
    }

    /// Negate this filter.
    pub fn not(self) -> Self {
        Filter::Not(Box::new(self))
    }

    fn referenced_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Filter::Compare { field, .. } => out.push(field),
            Filter::And(filters) | Filter::Or(filters) => {
                for f in filters {
                    f.referenced_fields(out);
                }
            }
            Filter::Not(inner) => inner.referenced_fields(out),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn literal(value: &Value) -> String {
            match value {
                Value::String(s) => format!("'{s}'"),
                other => other.to_string(),
            }
        }
        match self {
            Filter::Compare { field, op, value } => {
                write!(f, "{field} {} {}", op.as_str(), literal(value))
            }
            Filter::And(filters) => {
                let parts: Vec<String> = filters.iter().map(|p| p.to_string()).collect();
                write!(f, "({})", parts.join(" and "))
            }
            Filter::Or(filters) => {
                let parts: Vec<String> = filters.iter().map(|p| p.to_string()).collect();
                write!(f, "({})", parts.join(" or "))
            }
            Filter::Not(inner) => write!(f, "not ({inner})"),
        }
    }
}

/// Sort direction for an order-by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// Structured query parameters for one search call.
///
/// Constructed per call through [`QueryBuilder`]; a spec has no persisted
/// identity and may be reused freely.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    /// Free-text query term. `"*"` matches every document.
    pub text: String,
    /// Optional predicate over filterable fields.
    pub filter: Option<Filter>,
    /// Sort keys applied in listed order, each with its own direction.
    pub order_by: Vec<(String, SortOrder)>,
    /// When present, restricts returned fields to exactly this set.
    pub select: Option<Vec<String>>,
    /// When present, caps the result count; otherwise the service default
    /// page size applies.
    pub top: Option<usize>,
}

impl QuerySpec {
    /// A query matching every document.
    pub fn match_all() -> Self {
        QueryBuilder::new().build()
    }

    /// Start building a query.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    /// Check this spec against the index schema.
    ///
    /// Filter expressions may only reference filterable fields, order-by
    /// keys only sortable fields, and every selected field must exist.
    /// Violations are [`SearchError::Query`] and are reported before the
    /// request is sent.
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        if let Some(filter) = &self.filter {
            let mut fields = Vec::new();
            filter.referenced_fields(&mut fields);
            for name in fields {
                match schema.field(name) {
                    None => {
                        return Err(SearchError::Query(format!(
                            "filter references unknown field '{name}'"
                        )));
                    }
                    Some(field) if !field.filterable => {
                        return Err(SearchError::Query(format!(
                            "filter references non-filterable field '{name}'"
                        )));
                    }
                    Some(_) => {}
                }
            }
        }

        for (name, _) in &self.order_by {
            match schema.field(name) {
                None => {
                    return Err(SearchError::Query(format!(
                        "orderBy references unknown field '{name}'"
                    )));
                }
                Some(field) if !field.sortable => {
                    return Err(SearchError::Query(format!(
                        "orderBy references non-sortable field '{name}'"
                    )));
                }
                Some(_) => {}
            }
        }

        if let Some(select) = &self.select {
            for name in select {
                if schema.field(name).is_none() {
                    return Err(SearchError::Query(format!(
                        "select references unknown field '{name}'"
                    )));
                }
            }
        }

        if self.top == Some(0) {
            return Err(SearchError::Query("top must be positive".to_string()));
        }

        Ok(())
    }

    /// Lower the spec to a request body.
    pub(crate) fn to_body(&self) -> Result<Value> {
        let mut body = serde_json::Map::new();
        body.insert("search".to_string(), json!(self.text));

        if let Some(filter) = &self.filter {
            body.insert("filter".to_string(), serde_json::to_value(filter)?);
        }

        if !self.order_by.is_empty() {
            let keys: Vec<Value> = self
                .order_by
                .iter()
                .map(|(field, order)| json!({ "field": field, "direction": order }))
                .collect();
            body.insert("orderBy".to_string(), Value::Array(keys));
        }

        if let Some(select) = &self.select {
            body.insert("select".to_string(), json!(select));
        }

        if let Some(top) = self.top {
            body.insert("top".to_string(), json!(top));
        }

        Ok(Value::Object(body))
    }
}

/// Builder for [`QuerySpec`].
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    spec: QuerySpec,
}

impl QueryBuilder {
    /// Create a builder for a match-all query.
    pub fn new() -> Self {
        Self {
            spec: QuerySpec {
                text: "*".to_string(),
                filter: None,
                order_by: Vec::new(),
                select: None,
                top: None,
            },
        }
    }

    /// Set the free-text query term.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.spec.text = text.into();
        self
    }

    /// Set the filter expression.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.spec.filter = Some(filter);
        self
    }

    /// Add a sort key. Keys apply in the order they are added.
    pub fn order_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.spec.order_by.push((field.into(), order));
        self
    }

    /// Restrict returned fields to the given set.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.select = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Cap the number of returned documents.
    pub fn top(mut self, top: usize) -> Self {
        self.spec.top = Some(top);
        self
    }

    /// Finish building.
    pub fn build(self) -> QuerySpec {
        self.spec
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
