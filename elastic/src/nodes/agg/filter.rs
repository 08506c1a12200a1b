use crate::format::Formatter;
use crate::nodes::{render_agg, AggNode, Aggregations, QueryNode};
use crate::results::{AggResult, Bucket};
use crate::{Document, Error, Result};
use serde_json::Value;

/// Single-bucket aggregation over the documents matching a query.
#[derive(Debug)]
pub struct Filter {
    query: Box<dyn QueryNode>,
    aggs: Aggregations,
}

impl Filter {
    pub fn new(query: impl QueryNode + 'static) -> Self {
        Self {
            query: Box::new(query),
            aggs: Aggregations::new(),
        }
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

impl AggNode for Filter {
    fn agg_type(&self) -> &'static str {
        "filter"
    }

    fn render(&self) -> Document {
        render_agg(self.agg_type(), self.query.render(), &self.aggs)
    }

    fn handle_result(&self, raw: &Value, formatter: &dyn Formatter) -> Result<AggResult> {
        let raw = raw
            .as_object()
            .ok_or_else(|| Error::Decode("filter result is not an object".to_string()))?;

        let mut bucket = Bucket::new(Value::Null);
        bucket.doc_count = raw.get("doc_count").and_then(Value::as_u64);
        bucket.aggregations = self.aggs.decode(raw, formatter)?;
        Ok(AggResult::Bucket(bucket))
    }
}
