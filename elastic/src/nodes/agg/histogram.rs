use crate::format::Formatter;
use crate::nodes::{decode_buckets, insert_opt, render_agg, AggNode, Aggregations};
use crate::results::AggResult;
use crate::{Document, Error, Result};
use serde_json::Value;

/// Fixed-width numeric histogram.
#[derive(Debug)]
pub struct Histogram {
    field: String,
    interval: f64,
    min_doc_count: Option<u64>,
    aggs: Aggregations,
}

impl Histogram {
    pub fn new(field: impl Into<String>, interval: f64) -> Result<Self> {
        let mut node = Self {
            field: field.into(),
            interval: 1.0,
            min_doc_count: None,
            aggs: Aggregations::new(),
        };
        node.set_interval(interval)?;
        Ok(node)
    }

    pub fn set_interval(&mut self, interval: f64) -> Result<()> {
        if !interval.is_finite() || interval <= 0.0 {
            return Err(Error::Validation(format!(
                "histogram interval must be positive, got {}",
                interval
            )));
        }
        self.interval = interval;
        Ok(())
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn set_min_doc_count(&mut self, min_doc_count: Option<u64>) {
        self.min_doc_count = min_doc_count;
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

impl AggNode for Histogram {
    fn agg_type(&self) -> &'static str {
        "histogram"
    }

    fn field(&self) -> Option<&str> {
        Some(&self.field)
    }

    fn render(&self) -> Document {
        let mut params = Document::new();
        params.insert("field".to_string(), Value::String(self.field.clone()));
        params.insert("interval".to_string(), Value::from(self.interval));
        insert_opt(&mut params, "min_doc_count", self.min_doc_count);
        render_agg(self.agg_type(), params, &self.aggs)
    }

    fn handle_result(&self, raw: &Value, formatter: &dyn Formatter) -> Result<AggResult> {
        decode_buckets(self.agg_type(), raw, &self.aggs, formatter).map(AggResult::Buckets)
    }
}
