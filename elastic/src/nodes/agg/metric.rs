use crate::format::Formatter;
use crate::nodes::AggNode;
use crate::results::AggResult;
use crate::{Document, Error, Result};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Avg,
    Sum,
    Min,
    Max,
    ValueCount,
    Cardinality,
    Stats,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Avg => "avg",
            MetricKind::Sum => "sum",
            MetricKind::Min => "min",
            MetricKind::Max => "max",
            MetricKind::ValueCount => "value_count",
            MetricKind::Cardinality => "cardinality",
            MetricKind::Stats => "stats",
        }
    }
}

/// Single-field metric aggregation. Metrics are leaves: they take no
/// children and their values are shaped by the formatter.
#[derive(Debug, Clone)]
pub struct Metric {
    kind: MetricKind,
    field: String,
}

impl Metric {
    pub fn new(kind: MetricKind, field: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
        }
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }
}

impl AggNode for Metric {
    fn agg_type(&self) -> &'static str {
        self.kind.as_str()
    }

    fn field(&self) -> Option<&str> {
        Some(&self.field)
    }

    fn render(&self) -> Document {
        let mut params = Document::new();
        params.insert("field".to_string(), Value::String(self.field.clone()));
        let mut doc = Document::new();
        doc.insert(self.agg_type().to_string(), Value::Object(params));
        doc
    }

    fn handle_result(&self, raw: &Value, formatter: &dyn Formatter) -> Result<AggResult> {
        let raw = raw
            .as_object()
            .ok_or_else(|| Error::Decode(format!("{} result is not an object", self.agg_type())))?;

        if self.kind == MetricKind::Stats {
            // count and sum are not values of the field itself
            let mut stats = raw.clone();
            for key in ["min", "max", "avg"] {
                if let Some(value) = stats.remove(key) {
                    stats.insert(key.to_string(), formatter.format(Some(&self.field), value));
                }
            }
            return Ok(AggResult::Value(Value::Object(stats)));
        }

        let value = raw
            .get("value")
            .cloned()
            .ok_or_else(|| Error::Decode(format!("{} result has no value", self.agg_type())))?;

        let value = match self.kind {
            MetricKind::ValueCount | MetricKind::Cardinality => value,
            _ => formatter.format(Some(&self.field), value),
        };
        Ok(AggResult::Value(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{DefinitionFormatter, Passthrough};
    use crate::schema::{DefinitionBuilder, Field};
    use serde_json::json;

    #[test]
    fn test_render() {
        let node = Metric::new(MetricKind::ValueCount, "id");
        assert_eq!(
            Value::Object(node.render()),
            json!({"value_count": {"field": "id"}})
        );
    }

    #[test]
    fn test_missing_value_is_decode_error() {
        let node = Metric::new(MetricKind::Sum, "price");
        assert!(matches!(
            node.handle_result(&json!({}), &Passthrough),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_field_values_use_formatter() {
        let mut builder = DefinitionBuilder::new();
        builder.register_field(Field::typed("created_at", "date"));
        let definition = builder.freeze();
        let formatter = DefinitionFormatter::new(&definition);

        let max = Metric::new(MetricKind::Max, "created_at");
        let result = max.handle_result(&json!({"value": 0}), &formatter).unwrap();
        assert_eq!(result.as_value(), Some(&json!("1970-01-01T00:00:00.000Z")));

        let count = Metric::new(MetricKind::ValueCount, "created_at");
        let result = count.handle_result(&json!({"value": 0}), &formatter).unwrap();
        assert_eq!(result.as_value(), Some(&json!(0)));
    }

    #[test]
    fn test_stats() {
        let node = Metric::new(MetricKind::Stats, "price");
        let raw = json!({"count": 2, "min": 1.0, "max": 3.0, "avg": 2.0, "sum": 4.0});
        let result = node.handle_result(&raw, &Passthrough).unwrap();
        assert_eq!(result.as_value(), Some(&raw));
    }
}
