//! Query nodes. They only render; hits are decoded by [`super::Search`].

use crate::nodes::{insert_opt, TimeZone};
use crate::Document;
use serde_json::Value;
use std::fmt;

pub trait QueryNode: fmt::Debug + Send + Sync {
    fn render(&self) -> Document;
}

fn wrap(query_type: &str, body: Document) -> Document {
    let mut doc = Document::new();
    doc.insert(query_type.to_string(), Value::Object(body));
    doc
}

fn per_field(query_type: &str, field: &str, params: Document) -> Document {
    let mut body = Document::new();
    body.insert(field.to_string(), Value::Object(params));
    wrap(query_type, body)
}

#[derive(Debug, Clone, Default)]
pub struct MatchAll {
    pub boost: Option<f64>,
}

impl QueryNode for MatchAll {
    fn render(&self) -> Document {
        let mut body = Document::new();
        insert_opt(&mut body, "boost", self.boost);
        wrap("match_all", body)
    }
}

/// Exact match on a single value.
#[derive(Debug, Clone)]
pub struct Term {
    field: String,
    value: Value,
    boost: Option<f64>,
}

impl Term {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            boost: None,
        }
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

impl QueryNode for Term {
    fn render(&self) -> Document {
        let mut params = Document::new();
        params.insert("value".to_string(), self.value.clone());
        insert_opt(&mut params, "boost", self.boost);
        per_field("term", &self.field, params)
    }
}

/// Exact match on any of several values.
#[derive(Debug, Clone)]
pub struct TermsQuery {
    field: String,
    values: Vec<Value>,
}

impl TermsQuery {
    pub fn new<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl QueryNode for TermsQuery {
    fn render(&self) -> Document {
        let mut body = Document::new();
        body.insert(self.field.clone(), Value::Array(self.values.clone()));
        wrap("terms", body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

/// Analyzed full-text match.
#[derive(Debug, Clone)]
pub struct MatchQuery {
    field: String,
    query: String,
    operator: Option<Operator>,
}

impl MatchQuery {
    pub fn new(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: query.into(),
            operator: None,
        }
    }

    pub fn operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }
}

impl QueryNode for MatchQuery {
    fn render(&self) -> Document {
        let mut params = Document::new();
        params.insert("query".to_string(), Value::String(self.query.clone()));
        insert_opt(
            &mut params,
            "operator",
            self.operator.map(|op| match op {
                Operator::And => "and",
                Operator::Or => "or",
            }),
        );
        per_field("match", &self.field, params)
    }
}

/// Bounded range over a field. Bounds are raw values so dates and date
/// math strings pass through untouched.
#[derive(Debug, Clone)]
pub struct RangeQuery {
    field: String,
    gte: Option<Value>,
    gt: Option<Value>,
    lte: Option<Value>,
    lt: Option<Value>,
    time_zone: Option<TimeZone>,
}

impl RangeQuery {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            gte: None,
            gt: None,
            lte: None,
            lt: None,
            time_zone: None,
        }
    }

    pub fn gte(mut self, value: impl Into<Value>) -> Self {
        self.gte = Some(value.into());
        self
    }

    pub fn gt(mut self, value: impl Into<Value>) -> Self {
        self.gt = Some(value.into());
        self
    }

    pub fn lte(mut self, value: impl Into<Value>) -> Self {
        self.lte = Some(value.into());
        self
    }

    pub fn lt(mut self, value: impl Into<Value>) -> Self {
        self.lt = Some(value.into());
        self
    }

    pub fn time_zone(mut self, time_zone: TimeZone) -> Self {
        self.time_zone = Some(time_zone);
        self
    }
}

impl QueryNode for RangeQuery {
    fn render(&self) -> Document {
        let mut params = Document::new();
        insert_opt(&mut params, "gte", self.gte.clone());
        insert_opt(&mut params, "gt", self.gt.clone());
        insert_opt(&mut params, "lte", self.lte.clone());
        insert_opt(&mut params, "lt", self.lt.clone());
        insert_opt(
            &mut params,
            "time_zone",
            self.time_zone.as_ref().map(TimeZone::to_offset_string),
        );
        per_field("range", &self.field, params)
    }
}

/// Query on the sub-documents of a nested field.
#[derive(Debug)]
pub struct Nested {
    path: String,
    query: Box<dyn QueryNode>,
}

impl Nested {
    pub fn new(path: impl Into<String>, query: impl QueryNode + 'static) -> Self {
        Self {
            path: path.into(),
            query: Box::new(query),
        }
    }
}

impl QueryNode for Nested {
    fn render(&self) -> Document {
        let mut body = Document::new();
        body.insert("path".to_string(), Value::String(self.path.clone()));
        body.insert("query".to_string(), Value::Object(self.query.render()));
        wrap("nested", body)
    }
}

/// Boolean combination of queries.
#[derive(Debug, Default)]
pub struct Bool {
    must: Vec<Box<dyn QueryNode>>,
    should: Vec<Box<dyn QueryNode>>,
    must_not: Vec<Box<dyn QueryNode>>,
    filter: Vec<Box<dyn QueryNode>>,
    minimum_should_match: Option<u32>,
    boost: Option<f64>,
}

impl Bool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, query: impl QueryNode + 'static) -> Self {
        self.must.push(Box::new(query));
        self
    }

    pub fn should(mut self, query: impl QueryNode + 'static) -> Self {
        self.should.push(Box::new(query));
        self
    }

    pub fn must_not(mut self, query: impl QueryNode + 'static) -> Self {
        self.must_not.push(Box::new(query));
        self
    }

    pub fn filter(mut self, query: impl QueryNode + 'static) -> Self {
        self.filter.push(Box::new(query));
        self
    }

    pub fn minimum_should_match(mut self, count: u32) -> Self {
        self.minimum_should_match = Some(count);
        self
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

impl QueryNode for Bool {
    fn render(&self) -> Document {
        let mut body = Document::new();
        for (key, clauses) in [
            ("must", &self.must),
            ("should", &self.should),
            ("must_not", &self.must_not),
            ("filter", &self.filter),
        ] {
            if !clauses.is_empty() {
                let rendered = clauses.iter().map(|q| Value::Object(q.render())).collect();
                body.insert(key.to_string(), Value::Array(rendered));
            }
        }
        insert_opt(&mut body, "minimum_should_match", self.minimum_should_match);
        insert_opt(&mut body, "boost", self.boost);
        wrap("bool", body)
    }
}
