use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::ops::Index;

/// Decoded result of one aggregation node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AggResult {
    /// Multi-bucket aggregations (histograms, terms, ranges)
    Buckets(BucketCollection),
    /// Single-bucket aggregations (filter)
    Bucket(Bucket),
    /// Terminal value after formatting
    Value(Value),
}

impl AggResult {
    pub fn as_buckets(&self) -> Option<&BucketCollection> {
        match self {
            AggResult::Buckets(buckets) => Some(buckets),
            _ => None,
        }
    }

    pub fn as_bucket(&self) -> Option<&Bucket> {
        match self {
            AggResult::Bucket(bucket) => Some(bucket),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            AggResult::Value(value) => Some(value),
            _ => None,
        }
    }
}

/// One entry of a bucketed aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    /// Key exactly as the engine returned it
    pub key: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_as_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_count: Option<u64>,
    /// Child aggregation results keyed by aggregation name
    #[serde(flatten)]
    pub aggregations: IndexMap<String, AggResult>,
}

impl Bucket {
    pub fn new(key: Value) -> Self {
        Self {
            key,
            key_as_string: None,
            doc_count: None,
            aggregations: IndexMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AggResult> {
        self.aggregations.get(name)
    }
}

impl Index<&str> for Bucket {
    type Output = AggResult;

    /// Panics when no child aggregation of that name was decoded.
    fn index(&self, name: &str) -> &AggResult {
        match self.aggregations.get(name) {
            Some(result) => result,
            None => panic!("bucket has no aggregation named '{}'", name),
        }
    }
}

/// Buckets in engine response order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BucketCollection {
    buckets: Vec<Bucket>,
}

impl BucketCollection {
    pub fn new(buckets: Vec<Bucket>) -> Self {
        Self { buckets }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn first(&self) -> Option<&Bucket> {
        self.buckets.first()
    }

    pub fn get(&self, index: usize) -> Option<&Bucket> {
        self.buckets.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bucket> {
        self.buckets.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.buckets.iter().map(|b| &b.key)
    }
}

impl IntoIterator for BucketCollection {
    type Item = Bucket;
    type IntoIter = std::vec::IntoIter<Bucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.into_iter()
    }
}

impl<'a> IntoIterator for &'a BucketCollection {
    type Item = &'a Bucket;
    type IntoIter = std::slice::Iter<'a, Bucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

impl FromIterator<Bucket> for BucketCollection {
    fn from_iter<I: IntoIterator<Item = Bucket>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_preserves_order() {
        let collection: BucketCollection = [3, 1, 2].into_iter().map(|k| Bucket::new(json!(k))).collect();

        assert_eq!(collection.len(), 3);
        assert_eq!(collection.keys().cloned().collect::<Vec<_>>(), vec![json!(3), json!(1), json!(2)]);
        assert_eq!(collection.iter().count(), collection.iter().count());
    }

    #[test]
    fn test_bucket_index() {
        let mut bucket = Bucket::new(json!(100));
        bucket
            .aggregations
            .insert("bar".to_string(), AggResult::Value(json!("qux")));

        assert_eq!(bucket["bar"].as_value(), Some(&json!("qux")));
        assert!(bucket.get("missing").is_none());
    }

    #[test]
    fn test_serialize_bucket() {
        let mut bucket = Bucket::new(json!("a"));
        bucket.doc_count = Some(3);
        bucket
            .aggregations
            .insert("avg".to_string(), AggResult::Value(json!(1.5)));

        assert_eq!(
            serde_json::to_value(&bucket).unwrap(),
            json!({"key": "a", "doc_count": 3, "avg": 1.5})
        );
    }
}
