//! Property tests for target assignment and field lookup

use elastic::schema::{PlainTarget, StaticTarget, TargetRef};
use elastic::{DefinitionBuilder, ElasticMode, Error, Field};
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Kind {
    Index,
    Storage,
    Plain,
}

fn kind() -> impl Strategy<Value = Kind> {
    prop_oneof![Just(Kind::Index), Just(Kind::Storage), Just(Kind::Plain)]
}

fn target(i: usize, kind: &Kind) -> TargetRef {
    let name = format!("T{}", i);
    match kind {
        Kind::Index => Arc::new(StaticTarget::new(name, ElasticMode::Index)),
        Kind::Storage => Arc::new(StaticTarget::new(name, ElasticMode::Storage)),
        Kind::Plain => Arc::new(PlainTarget::new(name)),
    }
}

proptest! {
    #[test]
    fn targets_accepted_iff_uniform_and_indexable(kinds in prop::collection::vec(kind(), 0..6)) {
        let targets: Vec<TargetRef> = kinds.iter().enumerate().map(|(i, k)| target(i, k)).collect();
        let all_index = kinds.iter().all(|k| matches!(k, Kind::Index));
        let all_storage = kinds.iter().all(|k| matches!(k, Kind::Storage));
        let valid = !kinds.is_empty() && (all_index || all_storage);

        let mut builder = DefinitionBuilder::new();
        match builder.set_targets(targets) {
            Ok(()) => {
                prop_assert!(valid);
                prop_assert_eq!(builder.main_target().unwrap().name(), "T0");
            }
            Err(e) => {
                prop_assert!(!valid);
                prop_assert!(matches!(e, Error::Configuration(_)));
            }
        }
    }

    #[test]
    fn has_field_matches_get_field(
        registered in prop::collection::vec("[a-z]{1,6}", 0..8),
        lookup in "[a-z]{1,6}",
    ) {
        let mut builder = DefinitionBuilder::new();
        for name in &registered {
            builder.register_field(Field::typed(name.as_str(), "keyword"));
        }
        let definition = builder.freeze();

        prop_assert_eq!(definition.has_field(&lookup), definition.get_field(&lookup).is_some());
        prop_assert_eq!(definition.has_field(&lookup), registered.contains(&lookup));
    }
}
