//! Root node of a search request.

use crate::format::Formatter;
use crate::nodes::{insert_opt, AggNode, Aggregations, QueryNode};
use crate::results::{Hit, SearchResult};
use crate::transport::Transport;
use crate::{Document, Error, Result};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// A full search request: query, paging, sorting and root aggregations.
#[derive(Debug, Default)]
pub struct Search {
    query: Option<Box<dyn QueryNode>>,
    size: Option<usize>,
    from: Option<usize>,
    source: Option<Vec<String>>,
    sort: Vec<(String, SortOrder)>,
    aggs: Aggregations,
}

impl Search {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl QueryNode + 'static) -> Self {
        self.query = Some(Box::new(query));
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Number of hits to skip, rendered as `from`.
    pub fn offset(mut self, from: usize) -> Self {
        self.from = Some(from);
        self
    }

    /// Restrict `_source` to the given fields.
    pub fn source<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.source = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort.push((field.into(), order));
        self
    }

    pub fn aggregate(mut self, name: impl Into<String>, node: impl AggNode + 'static) -> Result<Self> {
        self.aggs.insert(name, node)?;
        Ok(self)
    }

    pub fn aggregations(&self) -> &Aggregations {
        &self.aggs
    }

    pub fn render(&self) -> Document {
        let mut doc = Document::new();
        if let Some(query) = &self.query {
            doc.insert("query".to_string(), Value::Object(query.render()));
        }
        insert_opt(&mut doc, "size", self.size.map(|s| s as u64));
        insert_opt(&mut doc, "from", self.from.map(|f| f as u64));
        insert_opt(&mut doc, "_source", self.source.clone());
        if !self.sort.is_empty() {
            let sort = self
                .sort
                .iter()
                .map(|(field, order)| {
                    let mut order_doc = Document::new();
                    order_doc.insert("order".to_string(), Value::String(order.as_str().to_string()));
                    let mut clause = Document::new();
                    clause.insert(field.clone(), Value::Object(order_doc));
                    Value::Object(clause)
                })
                .collect();
            doc.insert("sort".to_string(), Value::Array(sort));
        }
        self.aggs.render_into(&mut doc);
        doc
    }

    /// Decode a raw search response.
    pub fn handle_result(&self, raw: &Value, formatter: &dyn Formatter) -> Result<SearchResult> {
        let hits = raw
            .get("hits")
            .and_then(Value::as_object)
            .ok_or_else(|| Error::Decode("search response has no hits object".to_string()))?;

        // Engines report either a bare count or {"value": n, "relation": ..}
        let total = match hits.get("total") {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
            Some(Value::Object(t)) => t.get("value").and_then(Value::as_u64).unwrap_or(0),
            _ => 0,
        };

        let entries = hits
            .get("hits")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let hits_out = entries.iter().map(decode_hit).collect::<Result<Vec<_>>>()?;

        let aggregations = match raw.get("aggregations") {
            Some(Value::Object(aggs)) => self.aggs.decode(aggs, formatter)?,
            Some(_) => {
                return Err(Error::Decode(
                    "search response aggregations is not an object".to_string(),
                ))
            }
            None => Default::default(),
        };

        tracing::debug!(total, hits = hits_out.len(), "decoded search response");
        Ok(SearchResult {
            total,
            max_score: hits.get("max_score").and_then(Value::as_f64),
            hits: hits_out,
            aggregations,
        })
    }

    /// Render, send through the transport and decode the response.
    pub async fn execute(
        &self,
        transport: &dyn Transport,
        index: &str,
        formatter: &dyn Formatter,
    ) -> Result<SearchResult> {
        let body = Value::Object(self.render());
        tracing::debug!(index, "executing search");
        let raw = transport.search(index, body).await?;
        self.handle_result(&raw, formatter)
    }
}

fn decode_hit(raw: &Value) -> Result<Hit> {
    let raw = raw
        .as_object()
        .ok_or_else(|| Error::Decode("search hit is not an object".to_string()))?;

    let id = match raw.get("_id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(Error::Decode("search hit has no _id".to_string())),
    };

    Ok(Hit {
        id,
        index: raw.get("_index").and_then(Value::as_str).map(str::to_string),
        score: raw.get("_score").and_then(Value::as_f64),
        source: raw.get("_source").cloned().unwrap_or(Value::Null),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Passthrough;
    use crate::nodes::{MatchQuery, Terms};
    use crate::results::AggResult;
    use serde_json::json;

    fn search() -> Search {
        Search::new()
            .query(MatchQuery::new("title", "rust"))
            .size(10)
            .sort("created_at", SortOrder::Desc)
            .aggregate("tags", Terms::new("tag"))
            .unwrap()
    }

    #[test]
    fn test_render() {
        assert_eq!(
            Value::Object(search().render()),
            json!({
                "query": {"match": {"title": {"query": "rust"}}},
                "size": 10,
                "sort": [{"created_at": {"order": "desc"}}],
                "aggs": {"tags": {"terms": {"field": "tag"}}}
            })
        );
        assert_eq!(Value::Object(Search::new().render()), json!({}));
    }

    #[test]
    fn test_source_filter() {
        let doc = Search::new().source(["title", "tag"]).render();
        assert_eq!(doc.get("_source"), Some(&json!(["title", "tag"])));
    }

    #[test]
    fn test_handle_result() {
        let raw = json!({
            "took": 3,
            "hits": {
                "total": {"value": 2, "relation": "eq"},
                "max_score": 1.5,
                "hits": [
                    {"_index": "posts", "_id": "a", "_score": 1.5, "_source": {"title": "Rust"}},
                    {"_index": "posts", "_id": 7, "_score": 0.5}
                ]
            },
            "aggregations": {
                "tags": {"buckets": [{"key": "rust", "doc_count": 2}]}
            }
        });

        let result = search().handle_result(&raw, &Passthrough).unwrap();
        assert_eq!(result.total, 2);
        assert_eq!(result.max_score, Some(1.5));
        assert_eq!(result.ids().collect::<Vec<_>>(), vec!["a", "7"]);
        assert_eq!(result.hits[1].source, Value::Null);

        let tags = result.aggregation("tags").and_then(AggResult::as_buckets).unwrap();
        assert_eq!(tags.first().unwrap().key, json!("rust"));
    }

    #[test]
    fn test_legacy_total_and_missing_hits() {
        let result = Search::new()
            .handle_result(&json!({"hits": {"total": 4, "hits": []}}), &Passthrough)
            .unwrap();
        assert_eq!(result.total, 4);
        assert!(result.hits.is_empty());

        assert!(matches!(
            Search::new().handle_result(&json!({}), &Passthrough),
            Err(Error::Decode(_))
        ));
    }
}
