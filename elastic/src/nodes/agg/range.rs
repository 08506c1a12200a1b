use crate::format::Formatter;
use crate::nodes::{decode_buckets, insert_opt, render_agg, AggNode, Aggregations};
use crate::results::AggResult;
use crate::{Document, Error, Result};
use serde_json::Value;

/// One `[from, to)` bucket definition.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeEntry {
    pub key: Option<String>,
    pub from: Option<f64>,
    pub to: Option<f64>,
}

impl RangeEntry {
    fn render(&self) -> Value {
        let mut entry = Document::new();
        insert_opt(&mut entry, "key", self.key.clone());
        insert_opt(&mut entry, "from", self.from);
        insert_opt(&mut entry, "to", self.to);
        Value::Object(entry)
    }
}

/// Buckets documents into user-defined numeric ranges.
#[derive(Debug)]
pub struct Range {
    field: String,
    ranges: Vec<RangeEntry>,
    aggs: Aggregations,
}

impl Range {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ranges: Vec::new(),
            aggs: Aggregations::new(),
        }
    }

    /// Add a range. At least one bound is required and `from` must not
    /// exceed `to`.
    pub fn add_range(
        &mut self,
        key: Option<&str>,
        from: Option<f64>,
        to: Option<f64>,
    ) -> Result<&mut Self> {
        match (from, to) {
            (None, None) => {
                return Err(Error::Validation(format!(
                    "range on '{}' needs at least one bound",
                    self.field
                )))
            }
            (Some(f), Some(t)) if f > t => {
                return Err(Error::Validation(format!(
                    "range on '{}' has from {} above to {}",
                    self.field, f, t
                )))
            }
            _ => {}
        }

        self.ranges.push(RangeEntry {
            key: key.map(str::to_string),
            from,
            to,
        });
        Ok(self)
    }

    pub fn ranges(&self) -> &[RangeEntry] {
        &self.ranges
    }

    pub fn aggregate(
        &mut self,
        name: impl Into<String>,
        node: impl AggNode + 'static,
    ) -> Result<&mut Self> {
        self.aggs.insert(name, node)?;
        Ok(self)
    }
}

impl AggNode for Range {
    fn agg_type(&self) -> &'static str {
        "range"
    }

    fn field(&self) -> Option<&str> {
        Some(&self.field)
    }

    fn render(&self) -> Document {
        let mut params = Document::new();
        params.insert("field".to_string(), Value::String(self.field.clone()));
        params.insert(
            "ranges".to_string(),
            Value::Array(self.ranges.iter().map(RangeEntry::render).collect()),
        );
        render_agg(self.agg_type(), params, &self.aggs)
    }

    fn handle_result(&self, raw: &Value, formatter: &dyn Formatter) -> Result<AggResult> {
        decode_buckets(self.agg_type(), raw, &self.aggs, formatter).map(AggResult::Buckets)
    }
}
