//! Property-based tests for memoized resolution

use actx::context::{ActionDataContext, Collaborators, MapDataContext};
use actx::provider::StaticProvider;
use actx::timestamp::{Timestamp, TimestampSet};
use actx::types::{DataKey, DataValue};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Any key, resolved any number of times, yields the identical outcome; and
/// keys with a request-time entry shadow the parent.
#[test]
fn test_repeated_resolution_is_identical() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(
                prop::collection::btree_map("[a-e]", any::<i64>(), 0..5),
                prop::collection::btree_map("[c-h]", any::<i64>(), 0..5),
                prop::collection::btree_map("[f-j]", any::<i64>(), 0..5),
                prop::collection::vec("[a-k]", 1..20),
            ),
            |(request_values, parent_values, provider_values, queries)| {
                let request: TimestampSet = request_values
                    .iter()
                    .map(|(k, v)| (DataKey::from(k.clone()), Timestamp::plain(DataValue::new(*v))))
                    .collect();
                let parent = parent_values
                    .iter()
                    .fold(MapDataContext::new(), |ctx, (k, v)| ctx.with(k.clone(), DataValue::new(*v)));
                let provider = provider_values
                    .iter()
                    .fold(StaticProvider::new("static"), |p, (k, v)| p.with(k.clone(), DataValue::new(*v)));
                let ctx = ActionDataContext::builder("Prop", request, TimestampSet::new())
                    .parent(Arc::new(parent))
                    .collaborators(Collaborators::new().provider(Arc::new(provider)))
                    .build()
                    .unwrap();

                let mut first: BTreeMap<String, Option<DataValue>> = BTreeMap::new();
                for query in &queries {
                    let value = ctx.resolve(&DataKey::from(query.clone())).unwrap();
                    match first.get(query).cloned() {
                        Some(Some(seen)) => {
                            prop_assert!(value.as_ref().is_some_and(|v| v.ptr_eq(&seen)))
                        }
                        Some(None) => prop_assert!(value.is_none()),
                        None => {
                            let expected = request_values
                                .get(query)
                                .or_else(|| parent_values.get(query))
                                .or_else(|| provider_values.get(query));
                            prop_assert_eq!(
                                value.as_ref().and_then(|v| v.downcast_ref::<i64>()),
                                expected
                            );
                            first.insert(query.clone(), value);
                        }
                    }
                }
                prop_assert_eq!(ctx.cached_len(), first.len());
                Ok(())
            },
        )
        .unwrap();
}
