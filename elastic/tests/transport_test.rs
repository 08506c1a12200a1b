//! Mapping and search round trips through an in-memory transport

use async_trait::async_trait;
use elastic::nodes::{DateHistogram, MatchAll, Search};
use elastic::schema::{StaticTarget, TargetRef};
use elastic::{DefinitionBuilder, ElasticMode, Error, Field, Passthrough, Result, Transport};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingTransport {
    requests: Mutex<Vec<(String, Value)>>,
    response: Value,
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn put_mapping(&self, index: &str, mapping: Value) -> Result<Value> {
        self.requests
            .lock()
            .unwrap()
            .push((format!("{}/_mapping", index), mapping));
        Ok(json!({"acknowledged": true}))
    }

    async fn search(&self, index: &str, body: Value) -> Result<Value> {
        self.requests
            .lock()
            .unwrap()
            .push((format!("{}/_search", index), body));
        Ok(self.response.clone())
    }
}

struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
    async fn put_mapping(&self, _index: &str, _mapping: Value) -> Result<Value> {
        Err(Error::Transport("connection refused".to_string()))
    }

    async fn search(&self, _index: &str, _body: Value) -> Result<Value> {
        Err(Error::Transport("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_put_mapping() {
    let post: TargetRef = Arc::new(StaticTarget::new("Post", ElasticMode::Index));
    let mut builder = DefinitionBuilder::new().with_targets(vec![post]).unwrap();
    builder.register_field(Field::typed("title", "text"));
    let definition = builder.freeze();

    let transport = RecordingTransport::default();
    let response = definition.put_mapping(&transport, "posts").await.unwrap();

    assert_eq!(response, json!({"acknowledged": true}));
    let requests = transport.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "posts/_mapping");
    assert_eq!(requests[0].1, json!({"properties": {"title": {"type": "text"}}}));
}

#[tokio::test]
async fn test_execute_search() {
    let transport = RecordingTransport {
        requests: Mutex::new(Vec::new()),
        response: json!({
            "hits": {"total": {"value": 1}, "hits": [{"_id": "1", "_source": {"title": "x"}}]},
            "aggregations": {"per_day": {"buckets": [{"key": 0, "doc_count": 1}]}}
        }),
    };

    let search = Search::new()
        .query(MatchAll::default())
        .size(1)
        .aggregate("per_day", DateHistogram::new("created_at").with_interval("day").unwrap())
        .unwrap();

    let result = search.execute(&transport, "posts", &Passthrough).await.unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(result.hits[0].source, json!({"title": "x"}));
    assert_eq!(
        result.aggregation("per_day").and_then(|a| a.as_buckets()).map(|b| b.len()),
        Some(1)
    );

    let requests = transport.requests.lock().unwrap();
    assert_eq!(
        requests[0].1,
        json!({
            "query": {"match_all": {}},
            "size": 1,
            "aggs": {"per_day": {"date_histogram": {"field": "created_at", "interval": "day"}}}
        })
    );
}

#[tokio::test]
async fn test_transport_errors_propagate() {
    let definition = DefinitionBuilder::new().freeze();
    assert!(matches!(
        definition.put_mapping(&FailingTransport, "posts").await,
        Err(Error::Transport(_))
    ));
    assert!(matches!(
        Search::new().execute(&FailingTransport, "posts", &Passthrough).await,
        Err(Error::Transport(_))
    ));
}

#[tokio::test]
async fn test_mapping_failure_skips_transport() {
    let mut builder = DefinitionBuilder::new();
    builder.register_field(Field::inferred("title"));
    let definition = builder.freeze();

    let transport = RecordingTransport::default();
    assert!(matches!(
        definition.put_mapping(&transport, "posts").await,
        Err(Error::MappingResolution { .. })
    ));
    assert!(transport.requests.lock().unwrap().is_empty());
}
