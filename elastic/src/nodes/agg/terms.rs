use crate::format::Formatter;
use crate::nodes::{decode_buckets, insert_opt, render_agg, AggNode, Aggregations};
use crate::results::AggResult;
use crate::{Document, Error, Result};
use serde_json::Value;

/// Top terms of a field.
#[derive(Debug)]
pub struct Terms {
    field: String,
    size: Option<usize>,
    min_doc_count: Option<u64>,
    aggs: Aggregations,
}

impl Terms {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            size: None,
            min_doc_count: None,
            aggs: Aggregations::new(),
        }
    }

    pub fn set_size(&mut self, size: Option<usize>) -> Result<()> {
        if size == Some(0) {
            return Err(Error::Validation("terms size must be at least 1".to_string()));
        }
        self.size = size;
        Ok(())
    }

    pub fn with_size(mut self, size: usize) -> Result<Self> {
        self.set_size(Some(size))?;
        Ok(self)
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

impl AggNode for Terms {
    fn agg_type(&self) -> &'static str {
        "terms"
    }

    fn field(&self) -> Option<&str> {
        Some(&self.field)
    }

    fn render(&self) -> Document {
        let mut params = Document::new();
        params.insert("field".to_string(), Value::String(self.field.clone()));
        insert_opt(&mut params, "size", self.size.map(|s| s as u64));
        insert_opt(&mut params, "min_doc_count", self.min_doc_count);
        render_agg(self.agg_type(), params, &self.aggs)
    }

    fn handle_result(&self, raw: &Value, formatter: &dyn Formatter) -> Result<AggResult> {
        decode_buckets(self.agg_type(), raw, &self.aggs, formatter).map(AggResult::Buckets)
    }
}
