//! Composable request nodes.
//!
//! Aggregation nodes render themselves under their type key and decode the
//! matching response fragment. Child aggregations hang off a node through
//! [`Aggregations`], which renders them under `"aggs"` and decodes them once
//! per bucket, so every variant shares the same recursion.

pub mod agg;
pub mod query;
pub mod search;

pub use agg::{
    DateHistogram, Filter, Histogram, Metric, MetricKind, Range, RangeEntry, Terms, TimeZone,
};
pub use query::{Bool, MatchAll, MatchQuery, Nested, Operator, QueryNode, RangeQuery, Term, TermsQuery};
pub use search::{Search, SortOrder};

use crate::format::Formatter;
use crate::results::{AggResult, Bucket, BucketCollection};
use crate::{Document, Error, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

/// An aggregation in a request tree.
pub trait AggNode: fmt::Debug + Send + Sync {
    /// Top-level key of the rendered fragment, e.g. `date_histogram`.
    fn agg_type(&self) -> &'static str;

    /// Engine field the aggregation reads, passed to the formatter.
    fn field(&self) -> Option<&str> {
        None
    }

    fn render(&self) -> Document;

    fn handle_result(&self, raw: &Value, formatter: &dyn Formatter) -> Result<AggResult>;
}

/// Keys every engine bucket carries alongside its child results.
const RESERVED_NAMES: &[&str] = &["key", "key_as_string", "doc_count"];

/// Named child aggregations, in registration order.
#[derive(Debug, Default)]
pub struct Aggregations {
    nodes: IndexMap<String, Box<dyn AggNode>>,
}

impl Aggregations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a child. A second node under the same name replaces the
    /// first one in place.
    ///
    /// Empty names and names equal to a bucket's own keys are rejected.
    pub fn insert(&mut self, name: impl Into<String>, node: impl AggNode + 'static) -> Result<()> {
        self.insert_boxed(name.into(), Box::new(node))
    }

    pub fn insert_boxed(&mut self, name: String, node: Box<dyn AggNode>) -> Result<()> {
        if name.is_empty() || RESERVED_NAMES.contains(&name.as_str()) {
            return Err(Error::Validation(format!(
                "'{}' cannot be used as an aggregation name",
                name
            )));
        }
        tracing::debug!(name = %name, agg_type = node.agg_type(), "registering aggregation");
        self.nodes.insert(name, node);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn AggNode> {
        self.nodes.get(name).map(|n| n.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `{name: child.render(), ...}`
    pub fn render(&self) -> Document {
        self.nodes
            .iter()
            .map(|(name, node)| (name.clone(), Value::Object(node.render())))
            .collect()
    }

    /// Add `"aggs"` to `doc` when there is at least one child.
    pub fn render_into(&self, doc: &mut Document) {
        if !self.is_empty() {
            doc.insert("aggs".to_string(), Value::Object(self.render()));
        }
    }

    /// Decode every registered child from `raw`.
    ///
    /// Object payloads are handed to the child node; anything else is
    /// already final data and goes through the formatter. Children missing
    /// from the payload are left out of the result.
    pub fn decode(
        &self,
        raw: &Document,
        formatter: &dyn Formatter,
    ) -> Result<IndexMap<String, AggResult>> {
        let mut decoded = IndexMap::with_capacity(self.nodes.len());
        for (name, node) in &self.nodes {
            let result = match raw.get(name) {
                None => {
                    tracing::debug!(name = %name, "aggregation missing from response");
                    continue;
                }
                Some(value @ Value::Object(_)) => node.handle_result(value, formatter)?,
                Some(value) => AggResult::Value(formatter.format(node.field(), value.clone())),
            };
            decoded.insert(name.clone(), result);
        }
        Ok(decoded)
    }
}

/// Render `{"<agg_type>": params, ["aggs": {...}]}`.
pub(crate) fn render_agg(agg_type: &str, params: Document, aggs: &Aggregations) -> Document {
    let mut doc = Document::new();
    doc.insert(agg_type.to_string(), Value::Object(params));
    aggs.render_into(&mut doc);
    doc
}

/// Decode `{"buckets": [...]}` into a collection, recursing into children
/// for each bucket. Bucket order follows the response.
pub(crate) fn decode_buckets(
    agg_type: &str,
    raw: &Value,
    aggs: &Aggregations,
    formatter: &dyn Formatter,
) -> Result<BucketCollection> {
    let entries = raw
        .get("buckets")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Decode(format!("{} result has no buckets array", agg_type)))?;

    let buckets = entries
        .iter()
        .map(|entry| decode_bucket(agg_type, entry, aggs, formatter))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(agg_type, buckets = buckets.len(), "decoded buckets");
    Ok(BucketCollection::new(buckets))
}

pub(crate) fn decode_bucket(
    agg_type: &str,
    entry: &Value,
    aggs: &Aggregations,
    formatter: &dyn Formatter,
) -> Result<Bucket> {
    let entry = entry
        .as_object()
        .ok_or_else(|| Error::Decode(format!("{} bucket is not an object", agg_type)))?;

    Ok(Bucket {
        key: entry.get("key").cloned().unwrap_or(Value::Null),
        key_as_string: entry
            .get("key_as_string")
            .and_then(Value::as_str)
            .map(str::to_string),
        doc_count: entry.get("doc_count").and_then(Value::as_u64),
        aggregations: aggs.decode(entry, formatter)?,
    })
}

/// Insert `value` under `key` only when it is set.
pub(crate) fn insert_opt<T: Into<Value>>(doc: &mut Document, key: &str, value: Option<T>) {
    if let Some(value) = value {
        doc.insert(key.to_string(), value.into());
    }
}
