use crate::results::AggResult;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// One document returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    pub id: String,
    pub index: Option<String>,
    pub score: Option<f64>,
    pub source: Value,
}

/// Decoded search response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub total: u64,
    pub max_score: Option<f64>,
    pub hits: Vec<Hit>,
    pub aggregations: IndexMap<String, AggResult>,
}

impl SearchResult {
    pub fn aggregation(&self, name: &str) -> Option<&AggResult> {
        self.aggregations.get(name)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.hits.iter().map(|h| h.id.as_str())
    }
}
