use super::TimeZone;
use crate::format::Formatter;
use crate::nodes::{decode_buckets, insert_opt, render_agg, AggNode, Aggregations};
use crate::results::AggResult;
use crate::{Document, Error, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// `<count><unit>` (`30s`, `1d`, `2w`, `500ms`) or a calendar keyword.
fn interval_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+(ms|[smhdwMqy])|year|quarter|month|week|day|hour|minute|second)$").unwrap()
    })
}

/// Buckets documents by date intervals.
#[derive(Debug)]
pub struct DateHistogram {
    field: String,
    interval: Option<String>,
    time_zone: Option<TimeZone>,
    min_doc_count: Option<u64>,
    aggs: Aggregations,
}

impl DateHistogram {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            interval: None,
            time_zone: None,
            min_doc_count: None,
            aggs: Aggregations::new(),
        }
    }

    pub fn set_field(&mut self, field: impl Into<String>) {
        self.field = field.into();
    }

    /// Set or clear the interval. Values outside the interval grammar are
    /// rejected and leave the node unchanged.
    pub fn set_interval(&mut self, interval: Option<&str>) -> Result<()> {
        if let Some(interval) = interval {
            if !interval_pattern().is_match(interval) {
                return Err(Error::Validation(format!("invalid interval '{}'", interval)));
            }
        }
        self.interval = interval.map(str::to_string);
        Ok(())
    }

    pub fn with_interval(mut self, interval: &str) -> Result<Self> {
        self.set_interval(Some(interval))?;
        Ok(self)
    }

    pub fn set_time_zone(&mut self, time_zone: Option<TimeZone>) {
        self.time_zone = time_zone;
    }

    pub fn with_time_zone(mut self, time_zone: TimeZone) -> Self {
        self.time_zone = Some(time_zone);
        self
    }

    pub fn set_min_doc_count(&mut self, min_doc_count: Option<u64>) {
        self.min_doc_count = min_doc_count;
    }

    pub fn interval(&self) -> Option<&str> {
        self.interval.as_deref()
    }

    pub fn time_zone(&self) -> Option<&TimeZone> {
        self.time_zone.as_ref()
    }

    pub fn aggregate(
        &mut self,
        name: impl Into<String>,
        node: impl AggNode + 'static,
    ) -> Result<&mut Self> {
        self.aggs.insert(name, node)?;
        Ok(self)
    }

    pub fn aggregations(&self) -> &Aggregations {
        &self.aggs
    }
}

impl AggNode for DateHistogram {
    fn agg_type(&self) -> &'static str {
        "date_histogram"
    }

    fn field(&self) -> Option<&str> {
        Some(&self.field)
    }

    fn render(&self) -> Document {
        let mut params = Document::new();
        params.insert("field".to_string(), Value::String(self.field.clone()));
        insert_opt(&mut params, "interval", self.interval.clone());
        insert_opt(
            &mut params,
            "time_zone",
            self.time_zone.as_ref().map(TimeZone::to_offset_string),
        );
        insert_opt(&mut params, "min_doc_count", self.min_doc_count);
        render_agg(self.agg_type(), params, &self.aggs)
    }

    fn handle_result(&self, raw: &Value, formatter: &dyn Formatter) -> Result<AggResult> {
        decode_buckets(self.agg_type(), raw, &self.aggs, formatter).map(AggResult::Buckets)
    }
}
